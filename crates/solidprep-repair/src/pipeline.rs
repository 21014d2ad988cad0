//! The fixed repair pipeline and its individual stages.

use hashbrown::{HashMap, HashSet};
use nalgebra::Point3;
use solidprep_mesh::{Mesh, DEGENERATE_AREA_EPSILON};
use tracing::debug;

use crate::holes::fill_holes_with_count;

/// Merge vertices with identical coordinates into one, returning a new
/// mesh with faces remapped to the surviving vertices.
///
/// Coordinates are compared exactly (negative zero equals positive
/// zero), matching the analyzer's duplicate-vertex count, so a merged
/// mesh reports zero duplicates. Faces collapsed to fewer than three
/// distinct indices by the merge are dropped. Unique vertices are kept
/// even when unreferenced.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{Mesh, Point3};
/// use solidprep_repair::merge_vertices;
///
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0), // coincides with vertex 1
///     ],
///     vec![[0, 1, 2], [0, 3, 2]],
/// )
/// .unwrap();
///
/// let merged = merge_vertices(&mesh);
/// assert_eq!(merged.vertex_count(), 3);
/// assert_eq!(merged.triangle_count(), 2);
/// ```
#[must_use]
pub fn merge_vertices(mesh: &Mesh) -> Mesh {
    let mut key_to_index: HashMap<[u64; 3], u32> = HashMap::with_capacity(mesh.vertex_count());
    let mut positions: Vec<Point3<f64>> = Vec::with_capacity(mesh.vertex_count());
    let mut remap: Vec<u32> = Vec::with_capacity(mesh.vertex_count());

    for position in mesh.positions() {
        let key = coordinate_key(position);
        let index = match key_to_index.get(&key) {
            Some(&index) => index,
            None => {
                #[allow(clippy::cast_possible_truncation)]
                let index = positions.len() as u32;
                positions.push(*position);
                key_to_index.insert(key, index);
                index
            }
        };
        remap.push(index);
    }

    if positions.len() == mesh.vertex_count() {
        return mesh.clone();
    }

    let faces: Vec<[u32; 3]> = mesh
        .faces()
        .iter()
        .map(|&[a, b, c]| {
            [
                remap[a as usize],
                remap[b as usize],
                remap[c as usize],
            ]
        })
        .filter(|&[a, b, c]| a != b && b != c && a != c)
        .collect();

    Mesh::from_parts_unchecked(positions, faces)
}

/// Remove duplicate faces, keeping the first occurrence.
///
/// Faces are duplicates when they reference the same vertex set,
/// irrespective of starting vertex or winding direction.
#[must_use]
pub fn remove_duplicate_faces(mesh: &Mesh) -> Mesh {
    let mut seen: HashSet<[u32; 3]> = HashSet::with_capacity(mesh.triangle_count());
    let mut faces = Vec::with_capacity(mesh.triangle_count());

    for &face in mesh.faces() {
        let fwd = normalize_face(face);
        let rev = normalize_face([face[0], face[2], face[1]]);

        if seen.contains(&fwd) || seen.contains(&rev) {
            continue;
        }
        seen.insert(fwd);
        faces.push(face);
    }

    if faces.len() == mesh.triangle_count() {
        return mesh.clone();
    }

    Mesh::from_parts_unchecked(mesh.positions().to_vec(), faces)
}

/// Remove triangles with planar area below [`DEGENERATE_AREA_EPSILON`].
#[must_use]
pub fn remove_degenerate_faces(mesh: &Mesh) -> Mesh {
    let faces: Vec<[u32; 3]> = mesh
        .faces()
        .iter()
        .copied()
        .zip(mesh.triangles())
        .filter(|(_, tri)| !tri.is_degenerate(DEGENERATE_AREA_EPSILON))
        .map(|(face, _)| face)
        .collect();

    if faces.len() == mesh.triangle_count() {
        return mesh.clone();
    }

    Mesh::from_parts_unchecked(mesh.positions().to_vec(), faces)
}

/// Remove vertices with non-finite coordinates, along with every face
/// referencing them, compacting and remapping the survivors.
#[must_use]
pub fn drop_non_finite(mesh: &Mesh) -> Mesh {
    let finite: Vec<bool> = mesh
        .positions()
        .iter()
        .map(|p| p.x.is_finite() && p.y.is_finite() && p.z.is_finite())
        .collect();

    if finite.iter().all(|&keep| keep) {
        return mesh.clone();
    }

    let mut positions = Vec::with_capacity(mesh.vertex_count());
    let mut remap: Vec<Option<u32>> = Vec::with_capacity(mesh.vertex_count());

    for (position, &keep) in mesh.positions().iter().zip(&finite) {
        if keep {
            #[allow(clippy::cast_possible_truncation)]
            remap.push(Some(positions.len() as u32));
            positions.push(*position);
        } else {
            remap.push(None);
        }
    }

    let faces: Vec<[u32; 3]> = mesh
        .faces()
        .iter()
        .filter_map(|&[a, b, c]| {
            match (
                remap[a as usize],
                remap[b as usize],
                remap[c as usize],
            ) {
                (Some(a), Some(b), Some(c)) => Some([a, b, c]),
                _ => None,
            }
        })
        .collect();

    Mesh::from_parts_unchecked(positions, faces)
}

/// Merge coincident vertices and de-duplicate faces, leaving everything
/// else alone. A lighter-weight cleanup than the full [`repair`] pass.
#[must_use]
pub fn remove_duplicates(mesh: &Mesh) -> Mesh {
    remove_duplicate_faces(&merge_vertices(mesh))
}

/// Summary of one repair pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RepairSummary {
    /// Vertex count before repair.
    pub initial_vertices: usize,
    /// Triangle count before repair.
    pub initial_faces: usize,
    /// Vertex count after repair.
    pub final_vertices: usize,
    /// Triangle count after repair.
    pub final_faces: usize,
    /// Boundary loops closed by hole filling.
    pub holes_filled: usize,
    /// Vertices removed by coincident-vertex merging.
    pub vertices_merged: usize,
    /// Duplicate faces removed.
    pub duplicate_faces_removed: usize,
    /// Degenerate faces removed.
    pub degenerate_faces_removed: usize,
    /// Vertices removed for having non-finite coordinates.
    pub non_finite_vertices_removed: usize,
}

impl RepairSummary {
    /// Check if any stage changed the mesh.
    #[must_use]
    pub fn had_changes(&self) -> bool {
        self.holes_filled > 0
            || self.vertices_merged > 0
            || self.duplicate_faces_removed > 0
            || self.degenerate_faces_removed > 0
            || self.non_finite_vertices_removed > 0
    }
}

impl std::fmt::Display for RepairSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Repair: {} -> {} verts ({} merged, {} non-finite), {} -> {} faces \
             ({} holes filled, {} duplicate, {} degenerate)",
            self.initial_vertices,
            self.final_vertices,
            self.vertices_merged,
            self.non_finite_vertices_removed,
            self.initial_faces,
            self.final_faces,
            self.holes_filled,
            self.duplicate_faces_removed,
            self.degenerate_faces_removed,
        )
    }
}

/// Run the repair pipeline, returning the repaired mesh and a summary.
///
/// Stages run in fixed order: fill holes, merge coincident vertices,
/// remove duplicate faces, remove degenerate faces, drop non-finite
/// geometry. Single pass; re-validate afterwards and re-invoke if
/// issues remain.
#[must_use]
pub fn repair_with_summary(mesh: &Mesh) -> (Mesh, RepairSummary) {
    let initial_vertices = mesh.vertex_count();
    let initial_faces = mesh.triangle_count();

    let (filled, holes_filled) = fill_holes_with_count(mesh);

    let merged = merge_vertices(&filled);
    let vertices_merged = filled.vertex_count() - merged.vertex_count();

    let deduped = remove_duplicate_faces(&merged);
    let duplicate_faces_removed = merged.triangle_count() - deduped.triangle_count();

    let non_degenerate = remove_degenerate_faces(&deduped);
    let degenerate_faces_removed = deduped.triangle_count() - non_degenerate.triangle_count();

    let finite = drop_non_finite(&non_degenerate);
    let non_finite_vertices_removed = non_degenerate.vertex_count() - finite.vertex_count();

    let summary = RepairSummary {
        initial_vertices,
        initial_faces,
        final_vertices: finite.vertex_count(),
        final_faces: finite.triangle_count(),
        holes_filled,
        vertices_merged,
        duplicate_faces_removed,
        degenerate_faces_removed,
        non_finite_vertices_removed,
    };

    if summary.had_changes() {
        debug!("{summary}");
    }

    (finite, summary)
}

/// Run the repair pipeline, returning only the repaired mesh.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{Mesh, Point3};
/// use solidprep_repair::repair;
///
/// // Strip with a coincident vertex pair.
/// let mesh = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 3, 2]],
/// )
/// .unwrap();
///
/// let repaired = repair(&mesh);
/// assert_eq!(repaired.vertex_count(), 3);
/// ```
#[must_use]
pub fn repair(mesh: &Mesh) -> Mesh {
    repair_with_summary(mesh).0
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

/// Rotate a face so the smallest vertex index comes first.
fn normalize_face(face: [u32; 3]) -> [u32; 3] {
    let min_idx = if face[0] <= face[1] && face[0] <= face[2] {
        0
    } else if face[1] <= face[2] {
        1
    } else {
        2
    };

    [
        face[min_idx],
        face[(min_idx + 1) % 3],
        face[(min_idx + 2) % 3],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use solidprep_analysis::{duplicate_vertex_count, validate};
    use solidprep_mesh::unit_cube;

    fn simple_triangle() -> Mesh {
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
    fn merge_removes_coincident_pair() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 2]],
        )
        .unwrap();
        assert_eq!(duplicate_vertex_count(&mesh), 1);

        let merged = merge_vertices(&mesh);
        assert_eq!(merged.vertex_count(), 3);
        assert_eq!(duplicate_vertex_count(&merged), 0);
        // Both faces survive, now referencing the same vertex.
        assert_eq!(merged.triangle_count(), 2);
        assert_eq!(merged.faces()[1], [0, 1, 2]);
    }

    #[test]
    fn merge_drops_collapsed_faces() {
        // Face [1, 3, 2] collapses once 3 merges into 1... so use a face
        // that references both members of the coincident pair.
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let merged = merge_vertices(&mesh);
        assert_eq!(merged.vertex_count(), 2);
        assert_eq!(merged.triangle_count(), 0);
    }

    #[test]
    fn merge_is_noop_without_duplicates() {
        let cube = unit_cube();
        let merged = merge_vertices(&cube);
        assert_eq!(merged.vertex_count(), cube.vertex_count());
        assert_eq!(merged.triangle_count(), cube.triangle_count());
    }

    #[test]
    fn dedup_exact_rotated_and_reversed() {
        let base = simple_triangle();
        let mut faces = base.faces().to_vec();
        faces.push([0, 1, 2]); // exact
        faces.push([1, 2, 0]); // rotated
        faces.push([0, 2, 1]); // reversed
        let mesh = Mesh::new(base.positions().to_vec(), faces).unwrap();

        let deduped = remove_duplicate_faces(&mesh);
        assert_eq!(deduped.triangle_count(), 1);
        // First occurrence wins.
        assert_eq!(deduped.faces()[0], [0, 1, 2]);
    }

    #[test]
    fn degenerate_collinear_removed() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap();

        let cleaned = remove_degenerate_faces(&mesh);
        assert_eq!(cleaned.triangle_count(), 1);
        assert_eq!(cleaned.faces()[0], [0, 2, 3]);
    }

    #[test]
    fn non_finite_vertex_and_its_faces_removed() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(f64::NAN, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 1, 3]],
        )
        .unwrap();

        let cleaned = drop_non_finite(&mesh);
        assert_eq!(cleaned.vertex_count(), 3);
        assert_eq!(cleaned.triangle_count(), 1);
        assert_eq!(cleaned.faces()[0], [0, 1, 2]);
    }

    #[test]
    fn non_finite_infinity_removed() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, f64::INFINITY, 0.0),
            ],
            vec![[0, 1, 2]],
        )
        .unwrap();

        let cleaned = drop_non_finite(&mesh);
        assert_eq!(cleaned.vertex_count(), 2);
        assert!(cleaned.is_empty());
    }

    #[test]
    fn repair_clean_cube_is_identity_on_counts() {
        let cube = unit_cube();
        let (repaired, summary) = repair_with_summary(&cube);

        assert_eq!(repaired.vertex_count(), cube.vertex_count());
        assert_eq!(repaired.triangle_count(), cube.triangle_count());
        assert!(!summary.had_changes());
    }

    #[test]
    fn repair_closes_cube_hole() {
        let cube = unit_cube();
        let faces: Vec<[u32; 3]> = cube.faces()[2..].to_vec();
        let open = Mesh::new(cube.positions().to_vec(), faces).unwrap();
        assert!(!validate(&open).watertight);

        let (repaired, summary) = repair_with_summary(&open);
        let report = validate(&repaired);

        assert!(report.watertight);
        assert!(report.valid);
        assert_eq!(summary.holes_filled, 1);
    }

    #[test]
    fn repair_merges_then_reports_zero_duplicates() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
                Point3::new(0.0, 10.0, 0.0),
                Point3::new(10.0, 0.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 3, 2]],
        )
        .unwrap();

        let (repaired, summary) = repair_with_summary(&mesh);
        assert_eq!(summary.vertices_merged, 1);
        assert_eq!(duplicate_vertex_count(&repaired), 0);
    }

    #[test]
    fn repair_is_best_effort_never_panics_on_junk() {
        // Degenerate, duplicated and non-finite all at once.
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(f64::NAN, f64::NAN, f64::NAN),
            ],
            vec![[0, 1, 2], [0, 1, 2], [0, 1, 3]],
        )
        .unwrap();

        let (repaired, summary) = repair_with_summary(&mesh);
        assert!(summary.had_changes());
        // Everything was defective; mesh may legitimately end up empty.
        assert!(repaired.triangle_count() <= 3);
    }

    #[test]
    fn summary_display() {
        let summary = RepairSummary {
            initial_vertices: 10,
            initial_faces: 8,
            final_vertices: 9,
            final_faces: 7,
            vertices_merged: 1,
            degenerate_faces_removed: 1,
            ..Default::default()
        };

        let rendered = format!("{summary}");
        assert!(rendered.contains("1 merged"));
        assert!(rendered.contains("1 degenerate"));
    }
}
