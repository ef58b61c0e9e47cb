use crate::TopologyError;
use std::ops::Range;

/// Material id table substituted when the caller supplies none.
pub const IMPLICIT_MATERIAL_IDS: &[usize] = &[0];

/// Material ids to use, substituting the implicit table for missing or empty input.
#[inline]
pub fn material_ids(mat_ids: Option<&[usize]>) -> &[usize] {
    match mat_ids {
        Some(ids) if !ids.is_empty() => ids,
        _ => IMPLICIT_MATERIAL_IDS,
    }
}

/// Checks index and material id data against a vertex count.
///
/// `mat_ids` holds the first triangle of every material group; `None` or an
/// empty slice stands for a single material covering the whole mesh.
pub fn validate_topology(
    vertex_count: usize,
    indices: &[u32],
    mat_ids: Option<&[usize]>,
) -> Result<(), TopologyError> {
    if indices.len() % 3 != 0 {
        return Err(TopologyError::IndexCountNotTriangles(indices.len()));
    }

    if let Some((position, &index)) = indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(TopologyError::IndexOutOfRange {
            position,
            index,
            vertex_count,
        });
    }

    let triangle_count = indices.len() / 3;
    let mut previous = 0;
    for (position, &value) in material_ids(mat_ids).iter().enumerate() {
        // equal neighbours are empty groups
        if value < previous {
            return Err(TopologyError::MaterialIdsNotSorted {
                position,
                value,
                previous,
            });
        }
        if value > triangle_count {
            return Err(TopologyError::MaterialIdOutOfRange {
                position,
                value,
                triangle_count,
            });
        }
        previous = value;
    }

    Ok(())
}

/// Triangle boundaries of every material group.
///
/// Holds one entry per material id followed by a sentinel equal to the
/// triangle count, so group `i` spans `table[i]..table[i + 1]`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MaterialGroups {
    table: Vec<usize>,
}

impl MaterialGroups {
    /// Builds the table from validated material ids.
    pub fn new(mat_ids: Option<&[usize]>, triangle_count: usize) -> Self {
        let ids = material_ids(mat_ids);
        let mut table = Vec::with_capacity(ids.len() + 1);
        table.extend_from_slice(ids);
        table.push(triangle_count);
        Self { table }
    }

    /// Number of material groups.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len().saturating_sub(1)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw table, sentinel included.
    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.table
    }

    /// Triangles belonging to material `id`.
    pub fn triangles(&self, id: usize) -> Option<Range<usize>> {
        let end = id.checked_add(2)?;
        match self.table.get(id..end) {
            Some(&[start, end]) => Some(start..end),
            _ => None,
        }
    }

    /// Index buffer range belonging to material `id`.
    pub fn indices(&self, id: usize) -> Option<Range<usize>> {
        self.triangles(id)
            .map(|range| range.start * 3..range.end * 3)
    }

    pub fn iter(&self) -> impl Iterator<Item = Range<usize>> + '_ {
        self.table.windows(2).map(|pair| pair[0]..pair[1])
    }

    pub(crate) fn clear(&mut self) {
        self.table.clear();
    }
}
