//! Geometry statistics snapshots.

use nalgebra::Point3;
use solidprep_mesh::Mesh;

use crate::topology::is_watertight;

/// Enclosed volume of a mesh, or the absence of one.
///
/// An open mesh has no well-defined enclosed volume. Rather than
/// overloading zero (which is also a legitimate volume for a degenerate
/// watertight mesh), the undefined case is explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Volume {
    /// The mesh is watertight and encloses this volume.
    Defined(f64),
    /// The mesh is open; volume is not meaningful.
    Undefined,
}

impl Volume {
    /// Whether a volume value is available.
    #[must_use]
    pub const fn is_defined(&self) -> bool {
        matches!(self, Self::Defined(_))
    }

    /// The volume, or 0.0 when undefined.
    ///
    /// Convenience for display layers that want the permissive
    /// fallback-to-zero behavior.
    #[must_use]
    pub const fn value_or_zero(&self) -> f64 {
        match self {
            Self::Defined(v) => *v,
            Self::Undefined => 0.0,
        }
    }
}

/// Snapshot of mesh geometry statistics.
///
/// Pure function of a mesh; nothing here is cached or updated.
#[derive(Debug, Clone)]
pub struct MeshStatistics {
    /// Number of triangles.
    pub triangle_count: usize,
    /// Number of vertices.
    pub vertex_count: usize,
    /// Edge estimate (3 per triangle, shared edges double-counted).
    pub approx_edge_count: usize,
    /// Bounding box minimum corner.
    pub min: Point3<f64>,
    /// Bounding box maximum corner.
    pub max: Point3<f64>,
    /// Bounding box center.
    pub center: Point3<f64>,
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub depth: f64,
    /// Extent along Z.
    pub height: f64,
    /// Bounding box diagonal length.
    pub diagonal: f64,
    /// Enclosed volume, defined only for watertight meshes.
    pub volume: Volume,
    /// Total surface area (0.0 for an empty mesh).
    pub surface_area: f64,
}

impl std::fmt::Display for MeshStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Mesh Statistics:")?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(
            f,
            "  Size: {:.3} x {:.3} x {:.3} (diagonal {:.3})",
            self.width, self.depth, self.height, self.diagonal
        )?;
        match self.volume {
            Volume::Defined(v) => writeln!(f, "  Volume: {v:.3}")?,
            Volume::Undefined => writeln!(f, "  Volume: undefined (mesh is open)")?,
        }
        write!(f, "  Surface area: {:.3}", self.surface_area)
    }
}

/// Compute all statistics for a mesh.
///
/// Total function: an empty or ill-formed mesh produces zeroed counts
/// and extents and an undefined volume, never an error.
///
/// # Example
///
/// ```
/// use solidprep_mesh::cube;
/// use solidprep_analysis::{compute_statistics, Volume};
///
/// let stats = compute_statistics(&cube(2.0));
/// assert_eq!(stats.triangle_count, 12);
/// assert_eq!(stats.volume, Volume::Defined(8.0));
/// assert!((stats.surface_area - 24.0).abs() < 1e-10);
/// ```
#[must_use]
pub fn compute_statistics(mesh: &Mesh) -> MeshStatistics {
    let bounds = mesh.bounds();
    let (min, max, center) = if bounds.is_empty() {
        (Point3::origin(), Point3::origin(), Point3::origin())
    } else {
        (bounds.min, bounds.max, bounds.center())
    };

    let width = max.x - min.x;
    let depth = max.y - min.y;
    let height = max.z - min.z;

    let volume = if !mesh.is_empty() && is_watertight(mesh) {
        Volume::Defined(mesh.volume())
    } else {
        Volume::Undefined
    };

    MeshStatistics {
        triangle_count: mesh.triangle_count(),
        vertex_count: mesh.vertex_count(),
        approx_edge_count: mesh.triangle_count() * 3,
        min,
        max,
        center,
        width,
        depth,
        height,
        diagonal: (width * width + depth * depth + height * height).sqrt(),
        volume,
        surface_area: mesh.surface_area(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use solidprep_mesh::{cube, unit_cube};

    #[test]
    fn unit_cube_statistics() {
        let stats = compute_statistics(&unit_cube());

        assert_eq!(stats.triangle_count, 12);
        assert_eq!(stats.vertex_count, 8);
        assert_eq!(stats.approx_edge_count, 36);
        assert_eq!(stats.volume, Volume::Defined(1.0));
        assert_relative_eq!(stats.surface_area, 6.0, epsilon = 1e-10);
        assert_relative_eq!(stats.width, 1.0, epsilon = 1e-10);
        assert_relative_eq!(stats.diagonal, 3.0_f64.sqrt(), epsilon = 1e-10);
        assert_relative_eq!(stats.center.x, 0.5, epsilon = 1e-10);
    }

    #[test]
    fn scaled_cube_volume_is_side_cubed() {
        let stats = compute_statistics(&cube(3.0));
        assert_relative_eq!(stats.volume.value_or_zero(), 27.0, epsilon = 1e-9);
        assert_relative_eq!(stats.surface_area, 54.0, epsilon = 1e-9);
    }

    #[test]
    fn open_mesh_volume_undefined() {
        let cube = unit_cube();
        // Drop two faces to open a hole.
        let faces: Vec<[u32; 3]> = cube.faces()[2..].to_vec();
        let open = Mesh::new(cube.positions().to_vec(), faces).unwrap();

        let stats = compute_statistics(&open);
        assert_eq!(stats.volume, Volume::Undefined);
        assert!(!stats.volume.is_defined());
        assert!(stats.volume.value_or_zero().abs() < f64::EPSILON);
        // Surface area is still well-defined for an open mesh.
        assert!(stats.surface_area > 0.0);
    }

    #[test]
    fn empty_mesh_statistics() {
        let stats = compute_statistics(&Mesh::default());

        assert_eq!(stats.triangle_count, 0);
        assert_eq!(stats.vertex_count, 0);
        assert_eq!(stats.volume, Volume::Undefined);
        assert!(stats.surface_area.abs() < f64::EPSILON);
        assert!(stats.width.abs() < f64::EPSILON);
        assert!(stats.diagonal.abs() < f64::EPSILON);
    }

    #[test]
    fn statistics_display() {
        let stats = compute_statistics(&unit_cube());
        let rendered = format!("{stats}");
        assert!(rendered.contains("Triangles: 12"));
        assert!(rendered.contains("Volume: 1.000"));

        let open = compute_statistics(&Mesh::default());
        assert!(format!("{open}").contains("undefined"));
    }
}
