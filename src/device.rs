//! Abstract GPU resource factory consumed by [`Mesh`](crate::Mesh).
//!
//! Only buffer creation and a one-shot upload are needed; concrete backends
//! live outside this crate (see [`DummyDevice`](crate::DummyDevice) for a
//! CPU-backed implementation).

use crate::Result;
use bitflags::bitflags;

bitflags! {
    /// Access and placement hints for a GPU buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct BufferUsage : u32 {
        /// Contents can be read back by the CPU.
        const READABLE = 1 << 0;
        /// Contents can be rewritten after creation.
        const WRITABLE = 1 << 1;
        /// The buffer stays mapped for its whole lifetime.
        const PERSISTENT = 1 << 2;
        /// Prefer host memory over device-local memory.
        const PREFER_CPU_STORAGE = 1 << 3;
    }
}

impl Default for BufferUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a buffer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferDescriptor {
    /// Size in bytes.
    pub size: usize,
    pub usage: BufferUsage,
}

impl BufferDescriptor {
    #[inline]
    pub fn new(size: usize, usage: BufferUsage) -> Self {
        Self { size, usage }
    }
}

/// A buffer handle returned by a [`Device`].
pub trait GpuBuffer {
    /// Copies `data` into the buffer starting at byte `offset`.
    fn update(&mut self, data: &[u8], offset: usize) -> Result<()>;

    /// Size in bytes.
    fn size(&self) -> usize;
}

/// GPU resource factory.
///
/// Creation returns `None` when the backend cannot allocate the buffer.
pub trait Device {
    type VertexBuffer: GpuBuffer;
    type IndexBuffer: GpuBuffer;

    fn create_vertex_buffer(&self, desc: &BufferDescriptor) -> Option<Self::VertexBuffer>;

    fn create_index_buffer(&self, desc: &BufferDescriptor) -> Option<Self::IndexBuffer>;

    /// Takes back ownership of a vertex buffer the mesh no longer uses.
    fn release_vertex_buffer(&self, buffer: Self::VertexBuffer) {
        drop(buffer);
    }

    /// Takes back ownership of an index buffer the mesh no longer uses.
    fn release_index_buffer(&self, buffer: Self::IndexBuffer) {
        drop(buffer);
    }
}
