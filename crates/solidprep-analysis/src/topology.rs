//! Topology queries over a mesh.
//!
//! All queries derive their answers from the mesh buffers (through the
//! mesh's cached edge-incidence table) and never mutate anything.

use hashbrown::HashSet;
use nalgebra::Point3;
use solidprep_mesh::Mesh;

pub use solidprep_mesh::DEGENERATE_AREA_EPSILON;

/// Check if the mesh is watertight.
///
/// Watertight means every edge is shared by exactly two triangles, so
/// the surface encloses a volume with no boundary. An empty mesh is
/// vacuously watertight.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{unit_cube, Mesh, Point3};
/// use solidprep_analysis::is_watertight;
///
/// assert!(is_watertight(&unit_cube()));
///
/// let open = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
/// assert!(!is_watertight(&open));
/// ```
#[must_use]
pub fn is_watertight(mesh: &Mesh) -> bool {
    mesh.edge_incidence().is_watertight()
}

/// Result of the manifold check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManifoldReport {
    /// True iff no edge is referenced by more than two triangles.
    pub is_manifold: bool,
    /// Number of edges referenced by three or more triangles.
    pub non_manifold_edge_count: usize,
}

/// Classify the mesh as manifold or non-manifold.
///
/// Manifoldness is decided directly from edge-incidence counts: an edge
/// shared by more than two triangles is non-manifold. Boundary edges
/// (incidence one) are allowed here; they affect watertightness, not
/// manifoldness.
#[must_use]
pub fn manifold_report(mesh: &Mesh) -> ManifoldReport {
    let non_manifold_edge_count = mesh.edge_incidence().non_manifold_edge_count();
    ManifoldReport {
        is_manifold: non_manifold_edge_count == 0,
        non_manifold_edge_count,
    }
}

/// Result of the normal-orientation check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalsReport {
    /// Number of triangles whose normal points toward the mesh interior.
    pub flipped_count: usize,
    /// Total number of triangles examined.
    pub total_faces: usize,
    /// `flipped_count` as a percentage of `total_faces` (0 when empty).
    pub flipped_percentage: f64,
}

/// Count triangles whose normals appear to point inward.
///
/// A triangle is flagged as flipped when the vector from its centroid to
/// the mesh centroid has a positive dot product with its geometric
/// normal. The mesh centroid is the area-weighted mean of triangle
/// centroids ([`Mesh::area_centroid`]). Triangles without a well-defined
/// normal (zero area) are never flagged.
///
/// This is a heuristic: it is only meaningful for roughly convex,
/// single-component meshes and is not a general inside/outside test.
#[must_use]
pub fn normals_report(mesh: &Mesh) -> NormalsReport {
    let total_faces = mesh.triangle_count();
    if total_faces == 0 {
        return NormalsReport {
            flipped_count: 0,
            total_faces: 0,
            flipped_percentage: 0.0,
        };
    }

    let centroid = mesh.area_centroid();

    let flipped_count = mesh
        .triangles()
        .filter(|tri| {
            tri.normal().is_some_and(|normal| {
                let to_center = centroid - tri.centroid();
                to_center.dot(&normal) > 0.0
            })
        })
        .count();

    #[allow(clippy::cast_precision_loss)]
    let flipped_percentage = flipped_count as f64 / total_faces as f64 * 100.0;

    NormalsReport {
        flipped_count,
        total_faces,
        flipped_percentage,
    }
}

/// Count triangles with planar area below `epsilon`.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{Mesh, Point3};
/// use solidprep_analysis::{degenerate_face_count, DEGENERATE_AREA_EPSILON};
///
/// // Collinear vertices: zero area
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(2.0, 0.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
///
/// assert_eq!(degenerate_face_count(&mesh, DEGENERATE_AREA_EPSILON), 1);
/// ```
#[must_use]
pub fn degenerate_face_count(mesh: &Mesh, epsilon: f64) -> usize {
    mesh.triangles()
        .filter(|tri| tri.is_degenerate(epsilon))
        .count()
}

/// Count vertices that collapse onto another vertex under
/// exact-coordinate merging.
///
/// Returns the difference between the vertex count and the number of
/// distinct coordinate triples, i.e. how many vertices a merge pass
/// would remove. Comparison is by exact coordinate value (negative zero
/// equals positive zero); NaN coordinates never compare equal to
/// anything and are left to the non-finite repair stage.
#[must_use]
pub fn duplicate_vertex_count(mesh: &Mesh) -> usize {
    let mut seen: HashSet<[u64; 3]> = HashSet::with_capacity(mesh.vertex_count());
    for position in mesh.positions() {
        seen.insert(coordinate_key(position));
    }
    mesh.vertex_count() - seen.len()
}

/// Bit-pattern key for exact coordinate comparison, canonicalizing -0.0.
fn coordinate_key(p: &Point3<f64>) -> [u64; 3] {
    let canonical = |v: f64| if v == 0.0 { 0.0_f64 } else { v };
    [
        canonical(p.x).to_bits(),
        canonical(p.y).to_bits(),
        canonical(p.z).to_bits(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidprep_mesh::unit_cube;

    fn tetrahedron() -> Mesh {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 0.866, 0.0),
            Point3::new(0.5, 0.289, 0.816),
        ];
        let faces = vec![[0, 2, 1], [0, 1, 3], [1, 2, 3], [2, 0, 3]];
        Mesh::new(positions, faces).unwrap()
    }

    fn single_triangle() -> Mesh {
        Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap()
    }

    #[test]
    fn cube_is_watertight_and_manifold() {
        let cube = unit_cube();
        assert!(is_watertight(&cube));

        let report = manifold_report(&cube);
        assert!(report.is_manifold);
        assert_eq!(report.non_manifold_edge_count, 0);
    }

    #[test]
    fn tetrahedron_is_watertight() {
        assert!(is_watertight(&tetrahedron()));
    }

    #[test]
    fn open_triangle_is_not_watertight() {
        assert!(!is_watertight(&single_triangle()));
        // A lone triangle is still manifold.
        assert!(manifold_report(&single_triangle()).is_manifold);
    }

    #[test]
    fn fin_edge_is_non_manifold() {
        // Three triangles sharing the edge (0, 1).
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.5, 1.0, 0.0),
                Point3::new(0.5, -1.0, 0.0),
                Point3::new(0.5, 0.0, 1.0),
            ],
            vec![[0, 1, 2], [0, 1, 3], [0, 1, 4]],
        )
        .unwrap();

        let report = manifold_report(&mesh);
        assert!(!report.is_manifold);
        assert_eq!(report.non_manifold_edge_count, 1);
    }

    #[test]
    fn cube_normals_all_outward() {
        let report = normals_report(&unit_cube());
        assert_eq!(report.flipped_count, 0);
        assert_eq!(report.total_faces, 12);
        assert!(report.flipped_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_cube_normals_all_flipped() {
        let cube = unit_cube();
        let reversed: Vec<[u32; 3]> = cube.faces().iter().map(|&[a, b, c]| [a, c, b]).collect();
        let inverted = Mesh::new(cube.positions().to_vec(), reversed).unwrap();

        let report = normals_report(&inverted);
        assert_eq!(report.flipped_count, 12);
        assert!((report.flipped_percentage - 100.0).abs() < 1e-10);
    }

    #[test]
    fn empty_mesh_normals_report() {
        let report = normals_report(&Mesh::default());
        assert_eq!(report.total_faces, 0);
        assert!(report.flipped_percentage.abs() < f64::EPSILON);
    }

    #[test]
    fn degenerate_count_mixed_mesh() {
        // One valid and one collinear triangle.
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 1]],
        )
        .unwrap();

        assert_eq!(degenerate_face_count(&mesh, DEGENERATE_AREA_EPSILON), 1);
    }

    #[test]
    fn degenerate_count_zero_for_cube() {
        assert_eq!(
            degenerate_face_count(&unit_cube(), DEGENERATE_AREA_EPSILON),
            0
        );
    }

    #[test]
    fn duplicate_vertices_counted() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 0.0, 0.0), // duplicate of vertex 1
            ],
            vec![[0, 1, 2], [0, 3, 2]],
        )
        .unwrap();

        assert_eq!(duplicate_vertex_count(&mesh), 1);
    }

    #[test]
    fn no_duplicates_in_cube() {
        assert_eq!(duplicate_vertex_count(&unit_cube()), 0);
    }

    #[test]
    fn negative_zero_merges_with_zero() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(-0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        assert_eq!(duplicate_vertex_count(&mesh), 1);
    }
}
