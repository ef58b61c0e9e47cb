use bitflags::bitflags;

/// Role of a vertex attribute.
///
/// Every semantic is a distinct power of two, so a set of semantics fits in a
/// [`SemanticFlags`] mask. The declaration order matches the numeric order,
/// which is the order of the canonical element list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u32)]
pub enum Semantic {
    Position = 1 << 0,
    Normal = 1 << 1,
    Tangent = 1 << 2,
    Bitangent = 1 << 3,
    Color0 = 1 << 4,
    Color1 = 1 << 5,
    Color2 = 1 << 6,
    Color3 = 1 << 7,
    Color4 = 1 << 8,
    Color5 = 1 << 9,
    Color6 = 1 << 10,
    Color7 = 1 << 11,
    TexCoord0 = 1 << 12,
    TexCoord1 = 1 << 13,
    TexCoord2 = 1 << 14,
    TexCoord3 = 1 << 15,
    TexCoord4 = 1 << 16,
    TexCoord5 = 1 << 17,
    TexCoord6 = 1 << 18,
    TexCoord7 = 1 << 19,
}

impl Semantic {
    /// Number of distinct semantics.
    pub const COUNT: usize = 20;

    pub const ALL: [Semantic; Semantic::COUNT] = [
        Semantic::Position,
        Semantic::Normal,
        Semantic::Tangent,
        Semantic::Bitangent,
        Semantic::Color0,
        Semantic::Color1,
        Semantic::Color2,
        Semantic::Color3,
        Semantic::Color4,
        Semantic::Color5,
        Semantic::Color6,
        Semantic::Color7,
        Semantic::TexCoord0,
        Semantic::TexCoord1,
        Semantic::TexCoord2,
        Semantic::TexCoord3,
        Semantic::TexCoord4,
        Semantic::TexCoord5,
        Semantic::TexCoord6,
        Semantic::TexCoord7,
    ];

    #[inline]
    pub fn bits(self) -> u32 {
        self as u32
    }

    /// Dense slot in `0..COUNT`, i.e. `log2` of the flag value.
    #[inline]
    pub fn index(self) -> usize {
        self.bits().trailing_zeros() as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Semantic> {
        Semantic::ALL.get(index).copied()
    }

    #[inline]
    pub fn is_color(self) -> bool {
        (Semantic::Color0..=Semantic::Color7).contains(&self)
    }

    #[inline]
    pub fn is_tex_coord(self) -> bool {
        (Semantic::TexCoord0..=Semantic::TexCoord7).contains(&self)
    }

    /// Direction semantics are stored as packed unit vectors.
    #[inline]
    pub fn is_direction(self) -> bool {
        matches!(
            self,
            Semantic::Normal | Semantic::Tangent | Semantic::Bitangent
        )
    }
}

bitflags! {
    /// A set of semantics, e.g. the elements contained in one stream.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct SemanticFlags : u32 {
        const POSITION = Semantic::Position as u32;
        const NORMAL = Semantic::Normal as u32;
        const TANGENT = Semantic::Tangent as u32;
        const BITANGENT = Semantic::Bitangent as u32;
        const COLOR0 = Semantic::Color0 as u32;
        const COLOR1 = Semantic::Color1 as u32;
        const COLOR2 = Semantic::Color2 as u32;
        const COLOR3 = Semantic::Color3 as u32;
        const COLOR4 = Semantic::Color4 as u32;
        const COLOR5 = Semantic::Color5 as u32;
        const COLOR6 = Semantic::Color6 as u32;
        const COLOR7 = Semantic::Color7 as u32;
        const TEX_COORD0 = Semantic::TexCoord0 as u32;
        const TEX_COORD1 = Semantic::TexCoord1 as u32;
        const TEX_COORD2 = Semantic::TexCoord2 as u32;
        const TEX_COORD3 = Semantic::TexCoord3 as u32;
        const TEX_COORD4 = Semantic::TexCoord4 as u32;
        const TEX_COORD5 = Semantic::TexCoord5 as u32;
        const TEX_COORD6 = Semantic::TexCoord6 as u32;
        const TEX_COORD7 = Semantic::TexCoord7 as u32;
    }
}

impl Default for SemanticFlags {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Semantic> for SemanticFlags {
    #[inline]
    fn from(semantic: Semantic) -> Self {
        SemanticFlags::from_bits_retain(semantic.bits())
    }
}

impl SemanticFlags {
    #[inline]
    pub fn contains_semantic(self, semantic: Semantic) -> bool {
        self.contains(SemanticFlags::from(semantic))
    }

    /// Number of semantics in the set.
    #[inline]
    pub fn count(self) -> usize {
        self.bits().count_ones() as usize
    }
}
