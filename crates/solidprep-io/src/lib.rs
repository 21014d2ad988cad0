//! STL file I/O for solidprep.
//!
//! Loads and saves triangle meshes in STL format, binary and ASCII.
//! This is the only crate in the family that touches the filesystem;
//! the core crates exchange [`Mesh`](solidprep_mesh::Mesh) values and
//! nothing else.
//!
//! # Example
//!
//! ```no_run
//! use solidprep_io::{load_stl, save_stl};
//!
//! let mesh = load_stl("model.stl").unwrap();
//! save_stl(&mesh, "copy.stl", true).unwrap();
//! ```
//!
//! # Errors
//!
//! Failures surface as distinct, catchable [`StlError`] kinds: a missing
//! file, a non-STL extension, a file that parses to zero triangles, an
//! attempt to export an empty mesh, or an underlying I/O failure.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod error;
mod stl;

pub use error::{StlError, StlResult};
pub use stl::{load_stl, save_stl};
