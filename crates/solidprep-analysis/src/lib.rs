//! Mesh analysis for solidprep: topology checks, validation, statistics.
//!
//! This crate answers the question "is this mesh printable, and if not,
//! why not" without ever modifying the mesh:
//!
//! - [`topology`] - Watertightness, manifoldness, normal orientation,
//!   degenerate and duplicate geometry queries
//! - [`validate`] - Aggregates the topology checks into a
//!   [`ValidationReport`] with a verdict and ordered issue list
//! - [`statistics`] - Geometry counts, bounding box, volume and surface
//!   area snapshots
//!
//! All functions here are pure and total: they take `&Mesh`, return
//! plain values, and have no failure mode for a structurally valid mesh.
//! Ill-defined metrics (the volume of an open mesh) come back as
//! explicit [`Volume::Undefined`] rather than an error or a fake zero.
//!
//! # Example
//!
//! ```
//! use solidprep_mesh::unit_cube;
//! use solidprep_analysis::{compute_statistics, validate};
//!
//! let cube = unit_cube();
//!
//! let report = validate(&cube);
//! assert!(report.valid);
//! assert!(report.issues.is_empty());
//!
//! let stats = compute_statistics(&cube);
//! assert!((stats.volume.value_or_zero() - 1.0).abs() < 1e-10);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod statistics;
pub mod topology;
pub mod validate;

pub use statistics::{compute_statistics, MeshStatistics, Volume};
pub use topology::{
    degenerate_face_count, duplicate_vertex_count, is_watertight, manifold_report, normals_report,
    ManifoldReport, NormalsReport, DEGENERATE_AREA_EPSILON,
};
pub use validate::{validate, validate_with_options, ValidationOptions, ValidationReport};
