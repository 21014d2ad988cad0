//! Best-effort mesh repair for solidprep.
//!
//! [`repair`] runs a fixed sequence of local corrective transforms:
//!
//! 1. Fill holes (triangulate closed boundary loops)
//! 2. Merge coincident vertices
//! 3. Remove duplicate faces
//! 4. Remove degenerate faces
//! 5. Drop non-finite geometry
//!
//! The order matters: hole filling introduces triangles that reference
//! pre-existing vertices and may create new coincidences, so merging
//! runs after it; face de-duplication assumes merged indices; and so on.
//!
//! Every stage takes `&Mesh` and returns a new [`Mesh`] - there is no
//! in-place mutation, so a caller can keep the original value for undo
//! or diffing. A stage with nothing to do returns an equivalent mesh.
//!
//! Repair is **best-effort**: it never fails on structurally valid
//! input, and it may leave a mesh still invalid after one pass (a hole
//! whose boundary cannot be traced into a closed loop is skipped with a
//! warning, not an error). Callers are expected to re-validate and may
//! re-invoke `repair` if issues remain; the pipeline does not loop to a
//! fixed point internally.
//!
//! Winding re-orientation is a separate, on-demand operation
//! ([`fix_normals`]), not part of the default sequence.
//!
//! [`Mesh`]: solidprep_mesh::Mesh
//!
//! # Example
//!
//! ```
//! use solidprep_mesh::unit_cube;
//! use solidprep_repair::{repair_with_summary, RepairSummary};
//!
//! // A clean mesh passes through untouched.
//! let cube = unit_cube();
//! let (repaired, summary) = repair_with_summary(&cube);
//!
//! assert_eq!(repaired.triangle_count(), cube.triangle_count());
//! assert!(!summary.had_changes());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod holes;
mod normals;
mod pipeline;

pub use holes::{detect_holes, fill_holes, BoundaryLoop};
pub use normals::fix_normals;
pub use pipeline::{
    drop_non_finite, merge_vertices, remove_degenerate_faces, remove_duplicate_faces,
    remove_duplicates, repair, repair_with_summary, RepairSummary,
};
