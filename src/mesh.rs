use crate::utilities::typed_to_bytes;
use crate::{
    layout_id, resolve_layout, validate_topology, BufferDescriptor, BufferUsage, Device,
    ElementDesc, ElementInfo, Error, GpuBuffer, LayoutId, MaterialGroups, Result, Semantic,
    SemanticFlags, VertexPacker,
};
use std::fmt;
use std::path::Path;

/// Number of vertex streams a mesh is split into.
pub const MAX_STREAMS: usize = 1;

/// Borrowed description of a mesh, in the caller's own vertex format.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct MeshData<'a> {
    /// Attributes of one interleaved input vertex, in memory order.
    pub vertex_elements: &'a [ElementDesc],
    pub vertex_data: &'a [u8],
    /// Triangle list indices.
    pub index_data: &'a [u32],
    /// First triangle of every material group; `None` means a single material.
    pub mat_ids: Option<&'a [usize]>,
}

/// Owned counterpart of [`MeshData`], as produced by a [`MeshLoader`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OwnedMeshData {
    pub vertex_elements: Vec<ElementDesc>,
    pub vertex_data: Vec<u8>,
    pub index_data: Vec<u32>,
    pub mat_ids: Option<Vec<usize>>,
}

impl OwnedMeshData {
    pub fn as_mesh_data(&self) -> MeshData<'_> {
        MeshData {
            vertex_elements: &self.vertex_elements,
            vertex_data: &self.vertex_data,
            index_data: &self.index_data,
            mat_ids: self.mat_ids.as_deref(),
        }
    }
}

/// A GPU vertex buffer together with the semantics it holds.
#[derive(Debug)]
pub struct Stream<B> {
    pub buffer: B,
    pub elements: SemanticFlags,
}

/// Buffer usage applied when a mesh allocates its GPU resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshConfig {
    pub vertex_usage: BufferUsage,
    pub index_usage: BufferUsage,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            vertex_usage: BufferUsage::PERSISTENT,
            index_usage: BufferUsage::WRITABLE,
        }
    }
}

impl MeshConfig {
    pub fn with_vertex_usage(mut self, usage: BufferUsage) -> Self {
        self.vertex_usage = usage;
        self
    }

    pub fn with_index_usage(mut self, usage: BufferUsage) -> Self {
        self.index_usage = usage;
        self
    }
}

/// Reorders packed geometry before it is uploaded, e.g. for vertex cache
/// locality.
pub trait MeshOptimizer {
    /// `vertices` holds `stride`-byte canonical vertices; `groups` delimits
    /// the triangles of every material, which must stay contiguous.
    fn optimize(
        &self,
        vertices: &mut [u8],
        stride: usize,
        indices: &mut [u32],
        groups: &MaterialGroups,
    );
}

/// Leaves geometry untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThrough;

impl MeshOptimizer for PassThrough {
    fn optimize(&self, _: &mut [u8], _: usize, _: &mut [u32], _: &MaterialGroups) {}
}

/// Produces mesh data from a file.
pub trait MeshLoader {
    fn load(&self, path: &Path) -> Result<OwnedMeshData>;
}

/// Loader that recognizes no files.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLoader;

impl MeshLoader for NoLoader {
    fn load(&self, path: &Path) -> Result<OwnedMeshData> {
        Err(Error::Path(path.to_path_buf()))
    }
}

/// Geometry normalized into the canonical packed layout and uploaded to the GPU.
///
/// A mesh borrows its device and owns the buffers it created on it. It is
/// either empty or holds a complete, validated set of buffers; a failed
/// [`update`](Mesh::update) leaves it empty.
pub struct Mesh<'d, D: Device> {
    device: &'d D,
    config: MeshConfig,
    elements: Vec<ElementInfo>,
    streams: Vec<Stream<D::VertexBuffer>>,
    index_buffer: Option<D::IndexBuffer>,
    groups: MaterialGroups,
    vertex_count: usize,
    index_count: usize,
}

/// Resets the mesh on drop unless the update reached its commit point.
struct RollbackGuard<'a, 'd, D: Device> {
    mesh: &'a mut Mesh<'d, D>,
    committed: bool,
}

impl<'a, 'd, D: Device> Drop for RollbackGuard<'a, 'd, D> {
    fn drop(&mut self) {
        if !self.committed {
            self.mesh.reset();
        }
    }
}

fn resource_failure(msg: &'static str) -> Error {
    log::warn!("Mesh: {}", msg);
    Error::resource(msg)
}

fn upload_failure(what: &str, err: Error) -> Error {
    log::warn!("Mesh: failed to upload {}: {}", what, err);
    Error::resource_dynamic(format!("failed to upload {}: {}", what, err))
}

impl<'d, D: Device> Mesh<'d, D> {
    pub fn new(device: &'d D) -> Self {
        Self::with_config(device, MeshConfig::default())
    }

    pub fn with_config(device: &'d D, config: MeshConfig) -> Self {
        Self {
            device,
            config,
            elements: Vec::new(),
            streams: Vec::with_capacity(MAX_STREAMS),
            index_buffer: None,
            groups: MaterialGroups::default(),
            vertex_count: 0,
            index_count: 0,
        }
    }

    /// Replaces all geometry with `data`.
    ///
    /// On error the mesh is left empty.
    pub fn update(&mut self, data: &MeshData<'_>) -> Result<()> {
        self.update_with(data, &PassThrough)
    }

    /// Like [`update`](Mesh::update), running `optimizer` on the packed
    /// geometry before upload.
    pub fn update_with(
        &mut self,
        data: &MeshData<'_>,
        optimizer: &dyn MeshOptimizer,
    ) -> Result<()> {
        self.reset();

        let mut guard = RollbackGuard {
            mesh: self,
            committed: false,
        };
        guard.mesh.rebuild(data, optimizer)?;
        guard.committed = true;

        log::trace!(
            "Mesh: updated, {} vertices, {} indices, layout id {:#x}",
            guard.mesh.vertex_count,
            guard.mesh.index_count,
            guard.mesh.layout_id().0
        );
        Ok(())
    }

    fn rebuild(&mut self, data: &MeshData<'_>, optimizer: &dyn MeshOptimizer) -> Result<()> {
        let layout = resolve_layout(data.vertex_elements).map_err(|err| {
            log::debug!("Mesh: rejected vertex layout: {}", err);
            err
        })?;

        let vertex_count = data.vertex_data.len() / layout.input_stride;
        if data.vertex_data.len() % layout.input_stride != 0 {
            log::debug!(
                "Mesh: ignoring {} trailing vertex bytes",
                data.vertex_data.len() % layout.input_stride
            );
        }

        validate_topology(vertex_count, data.index_data, data.mat_ids).map_err(|err| {
            log::debug!("Mesh: rejected topology: {}", err);
            err
        })?;

        let packer = VertexPacker::new(data.vertex_elements, &layout.elements)?;
        let mut packed = packer.pack(data.vertex_data, vertex_count)?;

        let groups = MaterialGroups::new(data.mat_ids, data.index_data.len() / 3);

        let mut indices = data.index_data.to_vec();
        optimizer.optimize(&mut packed, layout.internal_stride, &mut indices, &groups);

        let vb_desc = BufferDescriptor::new(packed.len(), self.config.vertex_usage);
        let ib_desc = BufferDescriptor::new(
            indices.len() * std::mem::size_of::<u32>(),
            self.config.index_usage,
        );

        // buffers are owned by the mesh as soon as they exist, so a reset
        // releases them whatever fails next
        let vb = self
            .device
            .create_vertex_buffer(&vb_desc)
            .ok_or_else(|| resource_failure("failed to create vertex buffer"))?;
        self.streams.push(Stream {
            buffer: vb,
            elements: layout.flags,
        });
        let ib = self
            .device
            .create_index_buffer(&ib_desc)
            .ok_or_else(|| resource_failure("failed to create index buffer"))?;
        let ib = self.index_buffer.insert(ib);

        ib.update(typed_to_bytes(&indices), 0)
            .map_err(|err| upload_failure("indices", err))?;
        self.streams[0]
            .buffer
            .update(&packed, 0)
            .map_err(|err| upload_failure("vertices", err))?;

        let mut offset = 0;
        self.elements = layout.elements;
        for element in &mut self.elements {
            element.stream = Some(0);
            element.offset = offset;
            offset += element.size();
        }
        self.groups = groups;
        self.vertex_count = vertex_count;
        self.index_count = indices.len();

        Ok(())
    }

    /// Loads `path` through `loader` and replaces all geometry with it.
    pub fn load(&mut self, path: &Path, loader: &dyn MeshLoader) -> Result<()> {
        match loader.load(path) {
            Ok(data) => self.update(&data.as_mesh_data()),
            Err(err) => {
                log::debug!("Mesh: failed to load {}: {}", path.display(), err);
                self.reset();
                Err(err)
            }
        }
    }

    /// Releases all GPU resources and clears the layout.
    pub fn reset(&mut self) {
        for stream in self.streams.drain(..) {
            self.device.release_vertex_buffer(stream.buffer);
        }
        if let Some(ib) = self.index_buffer.take() {
            self.device.release_index_buffer(ib);
        }
        self.elements.clear();
        self.groups.clear();
        self.vertex_count = 0;
        self.index_count = 0;
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn element(&self, semantic: Semantic) -> Option<&ElementInfo> {
        self.elements
            .iter()
            .find(|element| element.semantic == semantic)
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn elements(&self) -> &[ElementInfo] {
        &self.elements
    }

    /// Computed from the current layout on every call.
    pub fn layout_id(&self) -> LayoutId {
        let streams: Vec<SemanticFlags> =
            self.streams.iter().map(|stream| stream.elements).collect();
        layout_id(&self.elements, &streams)
    }

    #[inline]
    pub fn streams(&self) -> &[Stream<D::VertexBuffer>] {
        &self.streams
    }

    #[inline]
    pub fn index_buffer(&self) -> Option<&D::IndexBuffer> {
        self.index_buffer.as_ref()
    }

    /// Material group table; empty while the mesh is empty.
    #[inline]
    pub fn material_groups(&self) -> &MaterialGroups {
        &self.groups
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    #[inline]
    pub fn index_count(&self) -> usize {
        self.index_count
    }

    #[inline]
    pub fn config(&self) -> &MeshConfig {
        &self.config
    }

    #[inline]
    pub fn device(&self) -> &'d D {
        self.device
    }
}

impl<'d, D: Device> Drop for Mesh<'d, D> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<'d, D: Device> fmt::Debug for Mesh<'d, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("elements", &self.elements)
            .field("streams", &self.streams.len())
            .field("vertex_count", &self.vertex_count)
            .field("index_count", &self.index_count)
            .field("groups", &self.groups)
            .finish()
    }
}
