//! Core mesh model for solidprep.
//!
//! This crate provides the foundational types for preparing STL models
//! for 3D printing:
//!
//! - [`Mesh`] - An immutable indexed triangle mesh
//! - [`Triangle`] - A concrete triangle with vertex positions
//! - [`Aabb`] - Axis-aligned bounding box
//! - [`EdgeIncidence`] - Derived edge-to-face topology
//!
//! # Value Semantics
//!
//! A [`Mesh`] is immutable once constructed. Every transform in the
//! downstream crates takes `&Mesh` and returns a new `Mesh`, so a mesh
//! value can be shared freely across threads (for example to run
//! validation and statistics in parallel) without coordination, and
//! prior values stay usable for undo.
//!
//! # Units
//!
//! This library is **unit-agnostic**. All coordinates are `f64`, kept in
//! whatever units the source file used (STL is conventionally millimeters).
//!
//! # Coordinate System
//!
//! Right-handed; face winding is **counter-clockwise (CCW) when viewed
//! from outside**, so normals point outward by the right-hand rule.
//!
//! # Example
//!
//! ```
//! use solidprep_mesh::{Mesh, Point3};
//!
//! let positions = vec![
//!     Point3::new(0.0, 0.0, 0.0),
//!     Point3::new(1.0, 0.0, 0.0),
//!     Point3::new(0.0, 1.0, 0.0),
//! ];
//! let mesh = Mesh::new(positions, vec![[0, 1, 2]]).unwrap();
//!
//! assert_eq!(mesh.triangle_count(), 1);
//! assert!(!mesh.is_empty());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod error;
mod incidence;
mod mesh;
mod triangle;

pub use bounds::Aabb;
pub use error::{MeshError, MeshResult};
pub use incidence::{EdgeIncidence, EdgeKey};
pub use mesh::{cube, unit_cube, Mesh};
pub use triangle::{Triangle, DEGENERATE_AREA_EPSILON};

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
