use crate::format::{input_stride, internal_stride};
use crate::{ElementDesc, ElementInfo, LayoutError, Semantic, SemanticFlags};

/// Largest component count an element may carry.
pub const MAX_COMPONENTS: u32 = 4;

/// Canonical layout derived from a set of input descriptors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLayout {
    /// Sorted by ascending semantic; position always comes first.
    pub elements: Vec<ElementInfo>,
    /// Every semantic present in `elements`, including derived ones.
    pub flags: SemanticFlags,
    pub input_stride: usize,
    pub internal_stride: usize,
}

fn valid_component_count(semantic: Semantic, count: u32) -> bool {
    match semantic {
        Semantic::Position | Semantic::Normal | Semantic::Tangent => count == 3,
        _ => (1..=MAX_COMPONENTS).contains(&count),
    }
}

/// Validates the input descriptors and derives the canonical element list.
///
/// A bitangent is synthesized whenever a tangent is present; it is never
/// accepted from the input.
pub fn resolve_layout(input: &[ElementDesc]) -> Result<ResolvedLayout, LayoutError> {
    let mut flags = SemanticFlags::empty();
    let mut elements: Vec<ElementInfo> = Vec::with_capacity(input.len() + 1);

    for desc in input {
        if flags.contains_semantic(desc.semantic) {
            return Err(LayoutError::DuplicateSemantic(desc.semantic));
        }
        flags |= SemanticFlags::from(desc.semantic);

        if !valid_component_count(desc.semantic, desc.num_components) {
            return Err(LayoutError::InvalidComponentCount {
                semantic: desc.semantic,
                count: desc.num_components,
            });
        }

        elements.push(ElementInfo::from_desc(*desc));
    }

    if flags.contains(SemanticFlags::BITANGENT) {
        return Err(LayoutError::ExplicitBitangent);
    }
    if flags.contains(SemanticFlags::TANGENT) && !flags.contains(SemanticFlags::NORMAL) {
        return Err(LayoutError::TangentWithoutNormal);
    }
    if !flags.contains(SemanticFlags::POSITION) {
        return Err(LayoutError::MissingPosition);
    }

    if flags.contains(SemanticFlags::TANGENT) {
        elements.push(ElementInfo::from_desc(ElementDesc::new(
            Semantic::Bitangent,
            3,
        )));
        flags |= SemanticFlags::BITANGENT;
    }
    elements.sort_by_key(|element| element.semantic);

    // duplicates were rejected above, so this can only fire on a logic error
    debug_assert!(elements.len() <= Semantic::COUNT);

    Ok(ResolvedLayout {
        input_stride: input_stride(input),
        internal_stride: internal_stride(&elements),
        elements,
        flags,
    })
}
