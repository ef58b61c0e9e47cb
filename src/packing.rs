use crate::utilities::{quantize_u16, read_f32s, write_u16s};
use crate::{ElementDesc, ElementInfo, Error, Result, Semantic};
use glam::Vec3;

const HALF_RANGE: f32 = 32767.5;

/// Packs a unit-length direction into two 16-bit values.
///
/// `x` spans the full 16-bit range; `y` uses the lower half of its range,
/// with the upper half selected when `z` is positive. `z` itself is dropped
/// and recovered from the unit-length constraint. Input that is not unit
/// length is not clamped and saturates.
#[inline]
pub fn pack_unit_vector(v: [f32; 3]) -> [u16; 2] {
    let [x, y, z] = v;
    let hemisphere = if z > 0f32 { HALF_RANGE } else { 0f32 };
    [
        quantize_u16(65535f32 * (0.5f32 + 0.5f32 * x)),
        quantize_u16(HALF_RANGE * (0.5f32 + 0.5f32 * y) + hemisphere),
    ]
}

/// Inverse of [`pack_unit_vector`].
///
/// A `y` channel of `32768` or more selects positive `z`. Directions with
/// `y` at exactly `+1` and non-positive `z` share their encoding with `y = -1`
/// and positive `z`, and decode as the latter.
#[inline]
pub fn unpack_unit_vector(p: [u16; 2]) -> [f32; 3] {
    let x = p[0] as f32 / 65535f32 * 2f32 - 1f32;
    let (v, sign) = if p[1] >= 32768 {
        (p[1] as f32 - HALF_RANGE, 1f32)
    } else {
        (p[1] as f32, -1f32)
    };
    let y = v / HALF_RANGE * 2f32 - 1f32;
    let z = sign * (1f32 - x * x - y * y).max(0f32).sqrt();
    [x, y, z]
}

/// `normalize(normal x tangent)`; degenerate input yields the zero vector.
#[inline]
pub fn bitangent(normal: [f32; 3], tangent: [f32; 3]) -> [f32; 3] {
    Vec3::from(normal)
        .cross(Vec3::from(tangent))
        .normalize_or_zero()
        .to_array()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PackOp {
    Position {
        input: usize,
        output: usize,
    },
    Direction {
        input: usize,
        output: usize,
    },
    Bitangent {
        normal: usize,
        tangent: usize,
        output: usize,
    },
    Copy {
        input: usize,
        output: usize,
        size: usize,
    },
}

/// Converts vertices from the caller's interleaved format to the canonical
/// packed layout.
///
/// Offsets are resolved once in [`VertexPacker::new`]; packing a vertex only
/// replays the resulting list of operations.
#[derive(Debug, Clone)]
pub struct VertexPacker {
    ops: Vec<PackOp>,
    input_stride: usize,
    output_stride: usize,
}

impl VertexPacker {
    /// Plans the conversion from `input` descriptors to the canonical `layout`.
    ///
    /// Fails with [`Error::Bug`] if the layout needs a semantic the input does
    /// not carry, which cannot happen for layouts produced by
    /// [`resolve_layout`](crate::resolve_layout) from the same descriptors.
    pub fn new(input: &[ElementDesc], layout: &[ElementInfo]) -> Result<Self> {
        let mut input_offsets: [Option<usize>; Semantic::COUNT] = [None; Semantic::COUNT];
        let mut input_stride = 0;
        for desc in input {
            input_offsets[desc.semantic.index()] = Some(input_stride);
            input_stride += desc.size();
        }

        if layout.is_empty() || input_stride == 0 {
            return Err(Error::Bug("cannot pack an empty vertex layout".into()));
        }

        let find = |semantic: Semantic| {
            input_offsets[semantic.index()].ok_or_else(|| {
                Error::Bug(format!(
                    "canonical layout requires {:?}, which the input does not provide",
                    semantic
                ))
            })
        };

        let mut ops = Vec::with_capacity(layout.len());
        let mut output = 0;
        for element in layout {
            let op = match element.semantic {
                Semantic::Position => PackOp::Position {
                    input: find(Semantic::Position)?,
                    output,
                },
                Semantic::Normal | Semantic::Tangent => PackOp::Direction {
                    input: find(element.semantic)?,
                    output,
                },
                Semantic::Bitangent => PackOp::Bitangent {
                    normal: find(Semantic::Normal)?,
                    tangent: find(Semantic::Tangent)?,
                    output,
                },
                semantic => PackOp::Copy {
                    input: find(semantic)?,
                    output,
                    size: element.size(),
                },
            };
            ops.push(op);
            output += element.size();
        }
        if output == 0 {
            return Err(Error::Bug("canonical layout has a zero stride".into()));
        }

        Ok(Self {
            ops,
            input_stride,
            output_stride: output,
        })
    }

    #[inline]
    pub fn input_stride(&self) -> usize {
        self.input_stride
    }

    #[inline]
    pub fn output_stride(&self) -> usize {
        self.output_stride
    }

    /// Packs one vertex; `input` and `output` must be at least one stride long.
    pub fn pack_vertex(&self, input: &[u8], output: &mut [u8]) {
        for op in &self.ops {
            match *op {
                PackOp::Position { input: src, output: dst } => {
                    output[dst..dst + 12].copy_from_slice(&input[src..src + 12]);
                }
                PackOp::Direction { input: src, output: dst } => {
                    write_u16s(output, dst, &pack_unit_vector(read_f32s(input, src)));
                }
                PackOp::Bitangent {
                    normal,
                    tangent,
                    output: dst,
                } => {
                    let b = bitangent(read_f32s(input, normal), read_f32s(input, tangent));
                    write_u16s(output, dst, &pack_unit_vector(b));
                }
                PackOp::Copy {
                    input: src,
                    output: dst,
                    size,
                } => {
                    output[dst..dst + size].copy_from_slice(&input[src..src + size]);
                }
            }
        }
    }

    /// Packs `vertex_count` vertices into a freshly allocated buffer of
    /// `output_stride * vertex_count` bytes.
    pub fn pack(&self, input: &[u8], vertex_count: usize) -> Result<Vec<u8>> {
        if input.len() < vertex_count * self.input_stride {
            return Err(Error::Bug(format!(
                "vertex data length ({}) is too short for {} vertices of stride {}",
                input.len(),
                vertex_count,
                self.input_stride
            )));
        }

        let mut packed = vec![0u8; vertex_count * self.output_stride];
        for (src, dst) in input
            .chunks_exact(self.input_stride)
            .zip(packed.chunks_exact_mut(self.output_stride))
        {
            self.pack_vertex(src, dst);
        }
        Ok(packed)
    }
}
