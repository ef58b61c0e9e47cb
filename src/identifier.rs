use crate::{ElementInfo, Semantic, SemanticFlags};

/// Bits reserved for the stream composition.
pub const COMPOSITION_BITS: u32 = Semantic::COUNT as u32 - 1;

/// Bits available for the base-5 component counts.
pub const COMPONENT_BITS: u32 = 64 - COMPOSITION_BITS;

/// Compact key identifying a canonical vertex layout.
///
/// Bits `0..19` hold the composition of the element count across streams:
/// every stream contributes `elements - 1` set bits followed by one clear
/// bit. The remaining 45 bits hold the component count (`0..=4`) of every
/// element after the implicit leading position, as base-5 digits with the
/// first element most significant.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayoutId(pub u64);

impl LayoutId {
    #[inline]
    pub fn composition(self) -> u32 {
        (self.0 & ((1 << COMPOSITION_BITS) - 1)) as u32
    }

    /// The base-5 component count number.
    #[inline]
    pub fn components(self) -> u64 {
        self.0 >> COMPOSITION_BITS
    }
}

impl From<LayoutId> for u64 {
    #[inline]
    fn from(id: LayoutId) -> u64 {
        id.0
    }
}

/// Computes the layout key of a canonical element list.
///
/// `elements` must be sorted with position first; `streams` lists the
/// semantics held by each stream, in stream order.
pub fn layout_id(elements: &[ElementInfo], streams: &[SemanticFlags]) -> LayoutId {
    debug_assert!(elements.len() <= Semantic::COUNT);
    debug_assert!(elements
        .first()
        .map_or(true, |element| element.semantic == Semantic::Position));

    let mut composition = 0u32;
    let mut bit = 0u32;
    for stream in streams {
        for _ in 1..stream.count() {
            composition |= 1 << bit;
            bit += 1;
        }
        bit += 1;
    }
    debug_assert!(bit as usize <= elements.len().max(1));

    let mut components = 0u64;
    for element in elements.iter().skip(1) {
        debug_assert!(element.num_components <= 4);
        components = components
            .checked_mul(5)
            .and_then(|id| id.checked_add(u64::from(element.num_components)))
            .unwrap_or(u64::MAX);
    }
    // 5^19 - 1 needs 44.1 bits
    debug_assert!(components >> COMPONENT_BITS == 0);

    LayoutId((components << COMPOSITION_BITS) | u64::from(composition))
}
