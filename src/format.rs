use crate::Semantic;

/// Bytes per input component; input attributes are always 32-bit floats.
pub const INPUT_COMPONENT_SIZE: usize = std::mem::size_of::<f32>();

/// Describes one attribute of the caller's interleaved vertex data.
///
/// Attributes are laid out back to back in declaration order, each holding
/// `num_components` 32-bit floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementDesc {
    pub semantic: Semantic,
    pub num_components: u32,
}

impl ElementDesc {
    #[inline]
    pub const fn new(semantic: Semantic, num_components: u32) -> Self {
        Self {
            semantic,
            num_components,
        }
    }

    /// Size in bytes of this attribute in the input stream.
    #[inline]
    pub fn size(&self) -> usize {
        self.num_components as usize * INPUT_COMPONENT_SIZE
    }
}

/// One element of the canonical, packed vertex layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementInfo {
    pub semantic: Semantic,
    /// Number of stored components after packing.
    pub num_components: u32,
    /// Width of a single stored component, in bits.
    pub width: u32,
    /// Index of the owning stream, `None` until the mesh commits its buffers.
    pub stream: Option<usize>,
    /// Byte offset of the element inside its stream's vertex.
    pub offset: usize,
}

impl ElementInfo {
    /// Internal representation of an input attribute.
    ///
    /// Positions stay 3x32-bit floats, directions shrink to 2x16-bit
    /// normalized integers, colors and texture coordinates keep their
    /// component count as 32-bit floats.
    pub fn from_desc(desc: ElementDesc) -> Self {
        let (num_components, width) = if desc.semantic.is_direction() {
            (2, 16)
        } else {
            (desc.num_components, 32)
        };
        Self {
            semantic: desc.semantic,
            num_components,
            width,
            stream: None,
            offset: 0,
        }
    }

    /// Size in bytes of this element in the packed stream.
    #[inline]
    pub fn size(&self) -> usize {
        (self.num_components * self.width / 8) as usize
    }
}

/// Bytes per vertex in the caller's interleaved format.
pub fn input_stride(elements: &[ElementDesc]) -> usize {
    elements.iter().map(ElementDesc::size).sum()
}

/// Bytes per vertex in the canonical packed format.
pub fn internal_stride(elements: &[ElementInfo]) -> usize {
    elements.iter().map(ElementInfo::size).sum()
}
