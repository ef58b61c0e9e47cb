//! Mesh ingestion and normalization.
//!
//! Heterogeneous vertex streams described by [`ElementDesc`]s are validated,
//! converted into a canonical packed layout and uploaded through an abstract
//! [`Device`]. See [`Mesh::update`] for the full pipeline.

pub mod device;
#[cfg(feature = "dummy")]
pub mod dummy;
pub mod error;
pub mod format;
pub mod identifier;
pub mod layout;
pub mod mesh;
pub mod packing;
pub mod semantic;
pub mod store;
pub mod topology;
pub mod utilities;

pub use crate::device::*;
#[cfg(feature = "dummy")]
pub use crate::dummy::*;
pub use crate::error::*;
pub use crate::format::*;
pub use crate::identifier::*;
pub use crate::layout::*;
pub use crate::mesh::*;
pub use crate::packing::*;
pub use crate::semantic::*;
pub use crate::store::*;
pub use crate::topology::*;
pub use crate::utilities::*;
