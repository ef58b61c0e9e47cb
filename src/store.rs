//! Arena of reference-counted meshes.
//!
//! Meshes shared across an API boundary (e.g. as entries of a GPU resource
//! table) are addressed by [`MeshHandle`]. Each live mesh carries an explicit
//! reference count and is destroyed, releasing its GPU buffers, when the last
//! reference is released.

use crate::{Device, Mesh};

/// Stable reference to a mesh in a [`MeshStore`].
///
/// Handles of destroyed meshes never alias newer ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshHandle {
    index: u32,
    generation: u32,
}

struct Entry<'d, D: Device> {
    mesh: Mesh<'d, D>,
    refcount: usize,
}

struct Slot<'d, D: Device> {
    generation: u32,
    entry: Option<Entry<'d, D>>,
}

pub struct MeshStore<'d, D: Device> {
    slots: Vec<Slot<'d, D>>,
    free: Vec<u32>,
    live: usize,
}

impl<'d, D: Device> Default for MeshStore<'d, D> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<'d, D: Device> MeshStore<'d, D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes ownership of `mesh` with a reference count of one.
    pub fn insert(&mut self, mesh: Mesh<'d, D>) -> MeshHandle {
        let entry = Some(Entry { mesh, refcount: 1 });
        self.live += 1;
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                MeshHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                MeshHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn entry(&self, handle: MeshHandle) -> Option<&Entry<'d, D>> {
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, handle: MeshHandle) -> Option<&mut Entry<'d, D>> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&Mesh<'d, D>> {
        self.entry(handle).map(|entry| &entry.mesh)
    }

    pub fn get_mut(&mut self, handle: MeshHandle) -> Option<&mut Mesh<'d, D>> {
        self.entry_mut(handle).map(|entry| &mut entry.mesh)
    }

    pub fn refcount(&self, handle: MeshHandle) -> Option<usize> {
        self.entry(handle).map(|entry| entry.refcount)
    }

    /// Adds a reference; returns the new count, or `None` for a stale handle.
    pub fn acquire(&mut self, handle: MeshHandle) -> Option<usize> {
        let entry = self.entry_mut(handle)?;
        entry.refcount += 1;
        Some(entry.refcount)
    }

    /// Drops a reference and destroys the mesh once none remain.
    ///
    /// Returns the remaining count (`Some(0)` when the mesh was destroyed),
    /// or `None` for a stale handle.
    pub fn release(&mut self, handle: MeshHandle) -> Option<usize> {
        let entry = self.entry_mut(handle)?;
        entry.refcount -= 1;
        if entry.refcount > 0 {
            return Some(entry.refcount);
        }

        let slot = &mut self.slots[handle.index as usize];
        slot.entry = None;
        // a slot whose generation is exhausted is retired for good
        if let Some(generation) = slot.generation.checked_add(1) {
            slot.generation = generation;
            self.free.push(handle.index);
        }
        self.live -= 1;
        log::trace!("MeshStore: destroyed mesh {}", handle.index);
        Some(0)
    }

    /// Number of live meshes.
    #[inline]
    pub fn len(&self) -> usize {
        self.live
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}
