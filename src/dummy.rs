//! CPU-backed [`Device`] that keeps buffer contents in host memory.
//!
//! Useful for tests and headless tools: every allocation and release is
//! recorded, and allocations can be made to fail on demand.

use crate::{BufferDescriptor, Device, Error, GpuBuffer, Result};
use std::cell::{Cell, RefCell};

/// A host memory buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DummyBuffer {
    pub descriptor: BufferDescriptor,
    pub data: Vec<u8>,
    fail_updates: bool,
}

impl DummyBuffer {
    fn new(descriptor: BufferDescriptor, fail_updates: bool) -> Self {
        Self {
            descriptor,
            data: vec![0u8; descriptor.size],
            fail_updates,
        }
    }
}

impl GpuBuffer for DummyBuffer {
    fn update(&mut self, data: &[u8], offset: usize) -> Result<()> {
        if self.fail_updates {
            return Err(Error::Bug("injected upload failure".into()));
        }
        let end = offset
            .checked_add(data.len())
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::resource_dynamic(format!(
                    "update of {} bytes at offset {} overruns buffer of {} bytes",
                    data.len(),
                    offset,
                    self.data.len()
                ))
            })?;
        self.data[offset..end].copy_from_slice(data);
        Ok(())
    }

    fn size(&self) -> usize {
        self.data.len()
    }
}

/// Bookkeeping of everything a [`DummyDevice`] has handed out.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DummyStats {
    pub vertex_buffers_created: usize,
    pub index_buffers_created: usize,
    pub vertex_buffers_released: usize,
    pub index_buffers_released: usize,
    /// Descriptors of every successful allocation, in order.
    pub descriptors: Vec<BufferDescriptor>,
}

impl DummyStats {
    /// Buffers created and not yet released.
    pub fn live_buffers(&self) -> usize {
        (self.vertex_buffers_created + self.index_buffers_created)
            .saturating_sub(self.vertex_buffers_released + self.index_buffers_released)
    }
}

#[derive(Debug, Default)]
pub struct DummyDevice {
    fail_vertex_buffers: Cell<bool>,
    fail_index_buffers: Cell<bool>,
    fail_uploads: Cell<bool>,
    stats: RefCell<DummyStats>,
}

impl DummyDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes subsequent vertex buffer allocations fail.
    pub fn set_fail_vertex_buffers(&self, fail: bool) {
        self.fail_vertex_buffers.set(fail);
    }

    /// Makes subsequent index buffer allocations fail.
    pub fn set_fail_index_buffers(&self, fail: bool) {
        self.fail_index_buffers.set(fail);
    }

    /// Makes uploads into buffers allocated from now on fail.
    pub fn set_fail_uploads(&self, fail: bool) {
        self.fail_uploads.set(fail);
    }

    pub fn stats(&self) -> DummyStats {
        self.stats.borrow().clone()
    }
}

impl Device for DummyDevice {
    type VertexBuffer = DummyBuffer;
    type IndexBuffer = DummyBuffer;

    fn create_vertex_buffer(&self, desc: &BufferDescriptor) -> Option<DummyBuffer> {
        if self.fail_vertex_buffers.get() {
            return None;
        }
        let mut stats = self.stats.borrow_mut();
        stats.vertex_buffers_created += 1;
        stats.descriptors.push(*desc);
        Some(DummyBuffer::new(*desc, self.fail_uploads.get()))
    }

    fn create_index_buffer(&self, desc: &BufferDescriptor) -> Option<DummyBuffer> {
        if self.fail_index_buffers.get() {
            return None;
        }
        let mut stats = self.stats.borrow_mut();
        stats.index_buffers_created += 1;
        stats.descriptors.push(*desc);
        Some(DummyBuffer::new(*desc, self.fail_uploads.get()))
    }

    fn release_vertex_buffer(&self, _buffer: DummyBuffer) {
        self.stats.borrow_mut().vertex_buffers_released += 1;
    }

    fn release_index_buffer(&self, _buffer: DummyBuffer) {
        self.stats.borrow_mut().index_buffers_released += 1;
    }
}
