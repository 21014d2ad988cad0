//! Mesh preparation toolkit for 3D printing.
//!
//! This umbrella crate re-exports the solidprep family, covering the
//! import → validate → repair → re-validate → export cycle for STL
//! models:
//!
//! - [`mesh`] - Immutable indexed mesh model and derived topology
//! - [`analysis`] - Topology queries, validation reports, statistics
//! - [`repair`] - Best-effort local repair pipeline and winding fixes
//! - [`io`] - STL import/export codec
//!
//! # Quick Start
//!
//! ```no_run
//! use solidprep::prelude::*;
//!
//! // Load a mesh
//! let mesh = solidprep::io::load_stl("model.stl").unwrap();
//!
//! // Validate it
//! let report = validate(&mesh);
//! println!("{report}");
//!
//! // Repair if needed, then re-validate
//! if !report.valid {
//!     let repaired = repair(&mesh);
//!     let after = validate(&repaired);
//!     println!("valid after repair: {}", after.valid);
//!     solidprep::io::save_stl(&repaired, "repaired.stl", true).unwrap();
//! }
//! ```
//!
//! # Concurrency
//!
//! Every operation is a pure function over immutable [`Mesh`] values,
//! so meshes can be shared across threads freely; there is no shared
//! mutable state anywhere in the family.
//!
//! [`Mesh`]: solidprep_mesh::Mesh

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

/// Immutable indexed mesh model and derived topology.
pub use solidprep_mesh as mesh;

/// Topology queries, validation reports and statistics.
pub use solidprep_analysis as analysis;

/// Best-effort repair pipeline and winding re-orientation.
pub use solidprep_repair as repair;

/// STL import/export codec.
pub use solidprep_io as io;

/// Common imports for mesh preparation.
///
/// # Usage
///
/// ```
/// use solidprep::prelude::*;
/// ```
pub mod prelude {
    pub use solidprep_analysis::{
        compute_statistics, validate, MeshStatistics, ValidationReport, Volume,
    };
    pub use solidprep_io::{load_stl, save_stl, StlError};
    pub use solidprep_mesh::{unit_cube, Aabb, Mesh, MeshError, Point3, Triangle, Vector3};
    pub use solidprep_repair::{fix_normals, repair, repair_with_summary, RepairSummary};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_imports() {
        use prelude::*;

        let cube = unit_cube();
        let report = validate(&cube);
        assert!(report.valid);
    }

    #[test]
    fn module_reexports() {
        let _ = mesh::Mesh::default();
        let _ = analysis::validate(&mesh::unit_cube());
        let _ = repair::repair(&mesh::unit_cube());
    }
}
