//! Immutable indexed triangle mesh.

use std::sync::OnceLock;

use nalgebra::{Point3, Vector3};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{Aabb, EdgeIncidence, MeshError, MeshResult, Triangle};

/// An immutable indexed triangle mesh.
///
/// Stores vertex positions and faces separately, with faces referencing
/// vertices by index. Every constructed `Mesh` satisfies the structural
/// invariant that all face indices are within bounds; [`Mesh::new`]
/// rejects anything else up front.
///
/// The mesh is a value: there is no mutating API. Repair and other
/// transforms consume `&Mesh` and produce a new `Mesh`, which keeps
/// pipeline stages composable and lets callers keep prior values around
/// for undo. Because of this, the derived edge-incidence table is
/// computed lazily once per value and then shared.
///
/// # Winding Order
///
/// Faces use **counter-clockwise (CCW) winding** when viewed from
/// outside, so geometric normals point outward by the right-hand rule.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{Mesh, Point3};
///
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
///
/// assert_eq!(mesh.vertex_count(), 3);
/// assert_eq!(mesh.triangle_count(), 1);
/// ```
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mesh {
    positions: Vec<Point3<f64>>,
    faces: Vec<[u32; 3]>,
    #[cfg_attr(feature = "serde", serde(skip))]
    incidence: OnceLock<EdgeIncidence>,
}

impl Mesh {
    /// Create a mesh from vertex positions and triangle faces.
    ///
    /// # Errors
    ///
    /// Returns [`MeshError::IndexOutOfBounds`] if any face references a
    /// vertex index outside the position array. Malformed input is never
    /// silently truncated.
    pub fn new(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> MeshResult<Self> {
        let vertex_count = positions.len();
        for (face, indices) in faces.iter().enumerate() {
            for &index in indices {
                if index as usize >= vertex_count {
                    return Err(MeshError::IndexOutOfBounds {
                        face,
                        index,
                        vertex_count,
                    });
                }
            }
        }

        Ok(Self {
            positions,
            faces,
            incidence: OnceLock::new(),
        })
    }

    /// Create a mesh without validating face indices.
    ///
    /// Intended for transform stages whose output indices are valid by
    /// construction (remaps of an already-valid mesh). The invariant is
    /// still checked in debug builds.
    #[must_use]
    pub fn from_parts_unchecked(positions: Vec<Point3<f64>>, faces: Vec<[u32; 3]>) -> Self {
        debug_assert!(
            faces
                .iter()
                .flatten()
                .all(|&i| (i as usize) < positions.len()),
            "face index out of bounds"
        );

        Self {
            positions,
            faces,
            incidence: OnceLock::new(),
        }
    }

    /// Vertex positions.
    #[inline]
    #[must_use]
    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    /// Triangle faces as vertex index triples.
    #[inline]
    #[must_use]
    pub fn faces(&self) -> &[[u32; 3]] {
        &self.faces
    }

    /// Number of vertices.
    #[inline]
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no triangles.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Get a vertex position by index.
    #[inline]
    #[must_use]
    pub fn position(&self, index: usize) -> Option<&Point3<f64>> {
        self.positions.get(index)
    }

    /// Get a triangle with resolved vertex positions.
    #[must_use]
    pub fn triangle(&self, face_index: usize) -> Option<Triangle> {
        self.faces.get(face_index).map(|&[i0, i1, i2]| {
            Triangle::new(
                self.positions[i0 as usize],
                self.positions[i1 as usize],
                self.positions[i2 as usize],
            )
        })
    }

    /// Iterate over all triangles with resolved vertex positions.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&[i0, i1, i2]| {
            Triangle::new(
                self.positions[i0 as usize],
                self.positions[i1 as usize],
                self.positions[i2 as usize],
            )
        })
    }

    /// Derived edge-incidence topology.
    ///
    /// Computed lazily on first access and cached for the lifetime of
    /// this value, which is sound because the mesh is immutable.
    #[must_use]
    pub fn edge_incidence(&self) -> &EdgeIncidence {
        self.incidence
            .get_or_init(|| EdgeIncidence::build(&self.faces))
    }

    /// Compute the axis-aligned bounding box.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(self.positions.iter())
    }

    /// Compute the signed volume via the divergence theorem.
    ///
    /// Sum of the signed volumes of the tetrahedra formed by each face
    /// and the origin. Positive for a closed mesh with outward CCW
    /// winding; negative for an inside-out mesh; meaningless for an open
    /// mesh.
    #[must_use]
    pub fn signed_volume(&self) -> f64 {
        let mut volume = 0.0;

        for &[i0, i1, i2] in &self.faces {
            let v0 = &self.positions[i0 as usize];
            let v1 = &self.positions[i1 as usize];
            let v2 = &self.positions[i2 as usize];

            let cross = Vector3::new(
                v1.y.mul_add(v2.z, -(v1.z * v2.y)),
                v1.z.mul_add(v2.x, -(v1.x * v2.z)),
                v1.x.mul_add(v2.y, -(v1.y * v2.x)),
            );
            volume += v0.z.mul_add(cross.z, v0.x.mul_add(cross.x, v0.y * cross.y));
        }

        volume / 6.0
    }

    /// Absolute enclosed volume. Only meaningful for watertight meshes.
    #[inline]
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.signed_volume().abs()
    }

    /// Check if the mesh appears inside-out (negative signed volume).
    #[inline]
    #[must_use]
    pub fn is_inside_out(&self) -> bool {
        self.signed_volume() < 0.0
    }

    /// Compute the total surface area.
    #[must_use]
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }

    /// Compute the area-weighted centroid of the surface.
    ///
    /// Mean of the triangle centroids weighted by triangle area. Falls
    /// back to the plain vertex mean when the total area is (near) zero,
    /// and to the origin for an empty mesh. This is the centroid
    /// convention used by the flipped-normal heuristic.
    #[must_use]
    pub fn area_centroid(&self) -> Point3<f64> {
        let mut weighted = Vector3::zeros();
        let mut total_area = 0.0;

        for tri in self.triangles() {
            let area = tri.area();
            weighted += tri.centroid().coords * area;
            total_area += area;
        }

        if total_area > f64::EPSILON {
            return Point3::from(weighted / total_area);
        }

        // Zero-area surface: average the vertices instead.
        if self.positions.is_empty() {
            return Point3::origin();
        }
        let sum: Vector3<f64> = self.positions.iter().map(|p| p.coords).sum();
        #[allow(clippy::cast_precision_loss)]
        let count = self.positions.len() as f64;
        Point3::from(sum / count)
    }
}

/// Create a unit cube mesh from (0,0,0) to (1,1,1).
///
/// 8 vertices, 12 triangles, CCW winding viewed from outside.
///
/// # Example
///
/// ```
/// use solidprep_mesh::unit_cube;
///
/// let cube = unit_cube();
/// assert_eq!(cube.vertex_count(), 8);
/// assert_eq!(cube.triangle_count(), 12);
/// ```
#[must_use]
pub fn unit_cube() -> Mesh {
    cube(1.0)
}

/// Create an axis-aligned cube mesh from the origin with the given side length.
#[must_use]
pub fn cube(side: f64) -> Mesh {
    let s = side;
    let positions = vec![
        Point3::new(0.0, 0.0, 0.0), // 0
        Point3::new(s, 0.0, 0.0),   // 1
        Point3::new(s, s, 0.0),     // 2
        Point3::new(0.0, s, 0.0),   // 3
        Point3::new(0.0, 0.0, s),   // 4
        Point3::new(s, 0.0, s),     // 5
        Point3::new(s, s, s),       // 6
        Point3::new(0.0, s, s),     // 7
    ];

    // Two triangles per cube face, CCW winding when viewed from outside.
    let faces = vec![
        // Bottom (z=0), normal -Z
        [0, 2, 1],
        [0, 3, 2],
        // Top (z=s), normal +Z
        [4, 5, 6],
        [4, 6, 7],
        // Front (y=0), normal -Y
        [0, 1, 5],
        [0, 5, 4],
        // Back (y=s), normal +Y
        [3, 7, 6],
        [3, 6, 2],
        // Left (x=0), normal -X
        [0, 4, 7],
        [0, 7, 3],
        // Right (x=s), normal +X
        [1, 2, 6],
        [1, 6, 5],
    ];

    Mesh::from_parts_unchecked(positions, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rejects_out_of_bounds_index() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        let result = Mesh::new(positions, vec![[0, 1, 3]]);

        match result {
            Err(MeshError::IndexOutOfBounds {
                face,
                index,
                vertex_count,
            }) => {
                assert_eq!(face, 0);
                assert_eq!(index, 3);
                assert_eq!(vertex_count, 3);
            }
            Ok(_) => panic!("out-of-bounds face must be rejected"),
        }
    }

    #[test]
    fn empty_mesh() {
        let mesh = Mesh::default();
        assert!(mesh.is_empty());
        assert_eq!(mesh.vertex_count(), 0);
        assert!(mesh.bounds().is_empty());
    }

    #[test]
    fn vertices_without_faces_is_empty() {
        let mesh = Mesh::new(vec![Point3::origin()], Vec::new()).unwrap();
        assert!(mesh.is_empty());
    }

    #[test]
    fn unit_cube_counts() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn unit_cube_volume_and_area() {
        let cube = unit_cube();
        assert_relative_eq!(cube.signed_volume(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(cube.surface_area(), 6.0, epsilon = 1e-10);
        assert!(!cube.is_inside_out());
    }

    #[test]
    fn scaled_cube_volume_and_area() {
        let c = cube(2.0);
        assert_relative_eq!(c.volume(), 8.0, epsilon = 1e-10);
        assert_relative_eq!(c.surface_area(), 24.0, epsilon = 1e-10);
    }

    #[test]
    fn cube_bounds() {
        let c = cube(3.0);
        let bounds = c.bounds();
        assert!((bounds.min.x - 0.0).abs() < f64::EPSILON);
        assert!((bounds.max.z - 3.0).abs() < f64::EPSILON);
        let center = bounds.center();
        assert!((center.x - 1.5).abs() < 1e-10);
    }

    #[test]
    fn cube_area_centroid_is_center() {
        let cube = unit_cube();
        let c = cube.area_centroid();
        assert!((c.x - 0.5).abs() < 1e-10);
        assert!((c.y - 0.5).abs() < 1e-10);
        assert!((c.z - 0.5).abs() < 1e-10);
    }

    #[test]
    fn area_centroid_zero_area_fallback() {
        // One collinear triangle: total area is zero, so the centroid
        // falls back to the vertex mean.
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let c = mesh.area_centroid();
        assert!((c.x - 1.0).abs() < 1e-10);
        assert!(c.y.abs() < 1e-10);
    }

    #[test]
    fn edge_incidence_is_cached() {
        let cube = unit_cube();
        let first = cube.edge_incidence() as *const EdgeIncidence;
        let second = cube.edge_incidence() as *const EdgeIncidence;
        assert_eq!(first, second);
    }

    #[test]
    fn cube_edge_incidence_closed() {
        let cube = unit_cube();
        let incidence = cube.edge_incidence();
        // A cube has 18 unique edges (12 perimeter + 6 face diagonals).
        assert_eq!(incidence.edge_count(), 18);
        assert!(incidence.is_watertight());
        assert!(incidence.is_manifold());
    }

    #[test]
    fn triangle_accessor() {
        let cube = unit_cube();
        assert!(cube.triangle(0).is_some());
        assert!(cube.triangle(12).is_none());
        assert_eq!(cube.triangles().count(), 12);
    }
}
