#![cfg(feature = "dummy")]

use memoffset::offset_of;
use meshpack::*;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
#[repr(C)]
struct InputVertex {
    p: [f32; 3],
    n: [f32; 3],
    t: [f32; 3],
}

const DESCS: [ElementDesc; 3] = [
    ElementDesc::new(Semantic::Position, 3),
    ElementDesc::new(Semantic::Normal, 3),
    ElementDesc::new(Semantic::Tangent, 3),
];

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn quad() -> Vec<InputVertex> {
    [[0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0]]
        .iter()
        .map(|&[x, y]| InputVertex {
            p: [x, y, 0.0],
            n: [0.0, 0.0, 1.0],
            t: [1.0, 0.0, 0.0],
        })
        .collect()
}

const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 1, 3];

#[test]
fn descriptors_match_repr_c_layout() {
    assert_eq!(offset_of!(InputVertex, n), DESCS[0].size());
    assert_eq!(offset_of!(InputVertex, t), DESCS[0].size() + DESCS[1].size());
    assert_eq!(std::mem::size_of::<InputVertex>(), input_stride(&DESCS));
}

#[test]
fn update_quad() {
    init_logger();
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();

    mesh.update(&MeshData {
        vertex_elements: &DESCS,
        vertex_data: typed_to_bytes(&vertices),
        index_data: &QUAD_INDICES,
        mat_ids: None,
    })
    .unwrap();

    let semantics: Vec<Semantic> = mesh.elements().iter().map(|e| e.semantic).collect();
    assert_eq!(
        semantics,
        vec![
            Semantic::Position,
            Semantic::Normal,
            Semantic::Tangent,
            Semantic::Bitangent
        ]
    );
    assert_eq!(mesh.element_count(), 4);
    assert_eq!(mesh.material_groups().as_slice(), &[0, 2]);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.index_count(), 6);

    let stride = internal_stride(mesh.elements());
    assert_eq!(stride, 24);
    let stats = device.stats();
    assert_eq!(
        stats.descriptors,
        vec![
            BufferDescriptor::new(4 * stride, BufferUsage::PERSISTENT),
            BufferDescriptor::new(6 * 4, BufferUsage::WRITABLE),
        ]
    );

    let offsets: Vec<(Option<usize>, usize)> =
        mesh.elements().iter().map(|e| (e.stream, e.offset)).collect();
    assert_eq!(
        offsets,
        vec![(Some(0), 0), (Some(0), 12), (Some(0), 16), (Some(0), 20)]
    );

    let vb = &mesh.streams()[0].buffer;
    assert_eq!(vb.size(), 96);
    for (i, vertex) in vertices.iter().enumerate() {
        let base = i * stride;
        assert_eq!(read_f32s::<3>(&vb.data, base), vertex.p);
        assert_eq!(read_u16s::<2>(&vb.data, base + 12), pack_unit_vector(vertex.n));
        assert_eq!(read_u16s::<2>(&vb.data, base + 16), pack_unit_vector(vertex.t));
        assert_eq!(
            read_u16s::<2>(&vb.data, base + 20),
            pack_unit_vector([0.0, 1.0, 0.0])
        );
    }
    assert_eq!(
        mesh.index_buffer().unwrap().data,
        typed_to_bytes(&QUAD_INDICES).to_vec()
    );

    let bitangent = mesh.element(Semantic::Bitangent).unwrap();
    assert_eq!((bitangent.num_components, bitangent.width), (2, 16));
    assert!(mesh.element(Semantic::Color0).is_none());
}

#[test]
fn seven_indices_leave_mesh_empty() {
    init_logger();
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();

    let err = mesh
        .update(&MeshData {
            vertex_elements: &DESCS,
            vertex_data: typed_to_bytes(&vertices),
            index_data: &[0, 1, 2, 2, 1, 3, 0],
            mat_ids: None,
        })
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Topology);
    assert!(mesh.is_empty());
    assert_eq!(mesh.element_count(), 0);
    assert!(mesh.streams().is_empty());
    assert!(mesh.index_buffer().is_none());
    assert!(mesh.material_groups().is_empty());
    assert_eq!(device.stats().vertex_buffers_created, 0);
}

#[test]
fn failed_update_discards_previous_geometry() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();
    let data = MeshData {
        vertex_elements: &DESCS,
        vertex_data: typed_to_bytes(&vertices),
        index_data: &QUAD_INDICES,
        mat_ids: None,
    };
    mesh.update(&data).unwrap();
    assert_eq!(device.stats().live_buffers(), 2);

    let err = mesh
        .update(&MeshData {
            vertex_elements: &DESCS[1..],
            ..data
        })
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Layout);
    assert!(mesh.is_empty());
    assert_eq!(device.stats().live_buffers(), 0);
}

#[test]
fn allocation_failures_roll_back() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();
    let data = MeshData {
        vertex_elements: &DESCS,
        vertex_data: typed_to_bytes(&vertices),
        index_data: &QUAD_INDICES,
        mat_ids: None,
    };

    device.set_fail_index_buffers(true);
    let err = mesh.update(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(mesh.is_empty());
    assert!(mesh.streams().is_empty());
    let stats = device.stats();
    assert_eq!(stats.vertex_buffers_created, 1);
    assert_eq!(stats.vertex_buffers_released, 1);
    assert_eq!(stats.live_buffers(), 0);

    device.set_fail_index_buffers(false);
    device.set_fail_vertex_buffers(true);
    assert_eq!(mesh.update(&data).unwrap_err().kind(), ErrorKind::Resource);
    assert!(mesh.is_empty());
    assert_eq!(device.stats().index_buffers_created, 0);

    device.set_fail_vertex_buffers(false);
    mesh.update(&data).unwrap();
    assert!(!mesh.is_empty());
}

#[test]
fn upload_failures_roll_back() {
    init_logger();
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();
    let data = MeshData {
        vertex_elements: &DESCS,
        vertex_data: typed_to_bytes(&vertices),
        index_data: &QUAD_INDICES,
        mat_ids: None,
    };

    device.set_fail_uploads(true);
    let err = mesh.update(&data).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Resource);
    assert!(mesh.is_empty());
    assert!(mesh.streams().is_empty());
    assert!(mesh.index_buffer().is_none());
    let stats = device.stats();
    assert_eq!(stats.vertex_buffers_created, 1);
    assert_eq!(stats.index_buffers_created, 1);
    assert_eq!(stats.live_buffers(), 0);

    device.set_fail_uploads(false);
    mesh.update(&data).unwrap();
    assert_eq!(device.stats().live_buffers(), 2);
}

#[test]
fn trailing_vertex_bytes_are_ignored() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();
    let mut bytes = typed_to_bytes(&vertices).to_vec();
    bytes.extend_from_slice(&[0u8; 7]);
    let stride = input_stride(&DESCS);
    assert_ne!(bytes.len() % stride, 0);

    mesh.update(&MeshData {
        vertex_elements: &DESCS,
        vertex_data: &bytes,
        index_data: &QUAD_INDICES,
        mat_ids: None,
    })
    .unwrap();
    assert_eq!(mesh.vertex_count(), bytes.len() / stride);
    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.streams()[0].buffer.size(), 4 * internal_stride(mesh.elements()));
}

#[test]
fn reset_is_idempotent() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    mesh.reset();
    assert!(mesh.is_empty());
    assert_eq!(mesh.layout_id(), LayoutId(0));

    let vertices = quad();
    mesh.update(&MeshData {
        vertex_elements: &DESCS,
        vertex_data: typed_to_bytes(&vertices),
        index_data: &QUAD_INDICES,
        mat_ids: None,
    })
    .unwrap();
    mesh.reset();
    mesh.reset();
    assert!(mesh.is_empty());
    assert_eq!(mesh.vertex_count(), 0);
    assert_eq!(device.stats().live_buffers(), 0);
}

#[test]
fn drop_releases_buffers() {
    let device = DummyDevice::new();
    {
        let mut mesh = Mesh::new(&device);
        let vertices = quad();
        mesh.update(&MeshData {
            vertex_elements: &DESCS,
            vertex_data: typed_to_bytes(&vertices),
            index_data: &QUAD_INDICES,
            mat_ids: None,
        })
        .unwrap();
        assert_eq!(device.stats().live_buffers(), 2);
    }
    assert_eq!(device.stats().live_buffers(), 0);
}

#[test]
fn material_groups_and_layout_id() {
    let device = DummyDevice::new();
    let config = MeshConfig::default()
        .with_vertex_usage(BufferUsage::PREFER_CPU_STORAGE)
        .with_index_usage(BufferUsage::READABLE | BufferUsage::WRITABLE);
    let mut mesh = Mesh::with_config(&device, config);

    let positions: [f32; 12] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0];
    let descs = [ElementDesc::new(Semantic::Position, 3)];
    mesh.update(&MeshData {
        vertex_elements: &descs,
        vertex_data: typed_to_bytes(&positions),
        index_data: &QUAD_INDICES,
        mat_ids: Some(&[0, 1, 1]),
    })
    .unwrap();

    let groups = mesh.material_groups();
    assert_eq!(groups.as_slice(), &[0, 1, 1, 2]);
    assert_eq!(groups.indices(0), Some(0..3));
    assert_eq!(groups.indices(1), Some(3..3));
    assert_eq!(groups.indices(2), Some(3..6));

    // position is implicit; one stream of one element
    assert_eq!(mesh.layout_id(), LayoutId(0));
    assert_eq!(mesh.layout_id(), mesh.layout_id());

    // position-only packing is lossless
    assert_eq!(mesh.streams()[0].buffer.data, typed_to_bytes(&positions).to_vec());
    assert_eq!(
        device.stats().descriptors[0].usage,
        BufferUsage::PREFER_CPU_STORAGE
    );
}

#[test]
fn colors_and_tex_coords_pass_through() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let descs = [
        ElementDesc::new(Semantic::TexCoord1, 2),
        ElementDesc::new(Semantic::Position, 3),
        ElementDesc::new(Semantic::Color0, 4),
    ];
    let vertex: [f32; 9] = [0.5, 0.25, 1.0, 2.0, 3.0, 0.1, 0.2, 0.3, 0.4];
    mesh.update(&MeshData {
        vertex_elements: &descs,
        vertex_data: typed_to_bytes(&vertex),
        index_data: &[0, 0, 0],
        mat_ids: None,
    })
    .unwrap();

    let data = &mesh.streams()[0].buffer.data;
    assert_eq!(data.len(), 12 + 16 + 8);
    assert_eq!(read_f32s::<3>(data, 0), [1.0, 2.0, 3.0]);
    assert_eq!(read_f32s::<4>(data, 12), [0.1, 0.2, 0.3, 0.4]);
    assert_eq!(read_f32s::<2>(data, 28), [0.5, 0.25]);

    let id = mesh.layout_id();
    assert_eq!(id.composition(), 0b11);
    assert_eq!(id.components(), 4 * 5 + 2);
}

struct Reverse;

impl MeshOptimizer for Reverse {
    fn optimize(&self, _: &mut [u8], _: usize, indices: &mut [u32], _: &MaterialGroups) {
        indices.reverse();
    }
}

#[test]
fn optimizer_runs_before_upload() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);
    let vertices = quad();
    mesh.update_with(
        &MeshData {
            vertex_elements: &DESCS,
            vertex_data: typed_to_bytes(&vertices),
            index_data: &QUAD_INDICES,
            mat_ids: None,
        },
        &Reverse,
    )
    .unwrap();
    let expected: Vec<u32> = QUAD_INDICES.iter().rev().copied().collect();
    assert_eq!(
        mesh.index_buffer().unwrap().data,
        typed_to_bytes(&expected).to_vec()
    );
}

struct Triangle;

impl MeshLoader for Triangle {
    fn load(&self, path: &Path) -> Result<OwnedMeshData> {
        if path.extension().map_or(true, |ext| ext != "tri") {
            return Err(Error::Path(path.to_path_buf()));
        }
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        Ok(OwnedMeshData {
            vertex_elements: vec![ElementDesc::new(Semantic::Position, 3)],
            vertex_data: typed_to_bytes(&positions).to_vec(),
            index_data: vec![0, 1, 2],
            mat_ids: None,
        })
    }
}

#[test]
fn loaders() {
    let device = DummyDevice::new();
    let mut mesh = Mesh::new(&device);

    mesh.load(Path::new("a.tri"), &Triangle).unwrap();
    assert_eq!(mesh.vertex_count(), 3);

    let err = mesh.load(Path::new("a.obj"), &Triangle).unwrap_err();
    assert!(matches!(err, Error::Path(_)));
    assert!(mesh.is_empty());

    assert!(mesh.load(Path::new("a.tri"), &NoLoader).is_err());
}

#[test]
fn store_destroys_on_last_release() {
    let device = DummyDevice::new();
    let mut store = MeshStore::new();
    let handle = store.insert(Mesh::new(&device));
    let vertices = quad();
    store
        .get_mut(handle)
        .unwrap()
        .update(&MeshData {
            vertex_elements: &DESCS,
            vertex_data: typed_to_bytes(&vertices),
            index_data: &QUAD_INDICES,
            mat_ids: None,
        })
        .unwrap();

    store.acquire(handle);
    assert_eq!(store.release(handle), Some(1));
    assert_eq!(device.stats().live_buffers(), 2);
    assert_eq!(store.release(handle), Some(0));
    assert_eq!(device.stats().live_buffers(), 0);
}
