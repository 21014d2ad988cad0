//! Mesh-wide winding re-orientation.

use std::collections::VecDeque;

use solidprep_mesh::Mesh;
use tracing::debug;

/// Re-orient triangle winding for outward consistency.
///
/// Works in two steps:
///
/// 1. Flood-fill across shared manifold edges, flipping any face whose
///    winding disagrees with its already-oriented neighbor (two faces
///    are consistent when they traverse their shared edge in opposite
///    directions).
/// 2. If the resulting mesh has negative signed volume, flip every face
///    so normals point outward.
///
/// This is an independent, on-demand operation; the default [`repair`]
/// pipeline does not invoke it. The outward decision relies on the
/// signed volume, so it is only meaningful for closed (or nearly
/// closed) surfaces.
///
/// [`repair`]: crate::repair
///
/// # Example
///
/// ```
/// use solidprep_mesh::{unit_cube, Mesh};
/// use solidprep_repair::fix_normals;
///
/// // Turn the cube inside out, then fix it.
/// let cube = unit_cube();
/// let reversed: Vec<[u32; 3]> = cube.faces().iter().map(|&[a, b, c]| [a, c, b]).collect();
/// let inverted = Mesh::new(cube.positions().to_vec(), reversed).unwrap();
/// assert!(inverted.is_inside_out());
///
/// let fixed = fix_normals(&inverted);
/// assert!(!fixed.is_inside_out());
/// ```
#[must_use]
pub fn fix_normals(mesh: &Mesh) -> Mesh {
    let face_count = mesh.triangle_count();
    if face_count == 0 {
        return mesh.clone();
    }

    let faces = mesh.faces();
    let incidence = mesh.edge_incidence();

    let mut flip = vec![false; face_count];
    let mut visited = vec![false; face_count];
    let mut queue = VecDeque::new();
    let mut flipped_count = 0usize;

    for seed in 0..face_count {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);

        while let Some(current) = queue.pop_front() {
            let [a, b, c] = oriented(faces[current], flip[current]);

            for (u, v) in [(a, b), (b, c), (c, a)] {
                let Some(adjacent) = incidence.faces_for_edge(u, v) else {
                    continue;
                };
                // Only propagate across clean two-face edges; orientation
                // is ambiguous at non-manifold junctions.
                if adjacent.len() != 2 {
                    continue;
                }

                for &neighbor in adjacent {
                    if neighbor == current || visited[neighbor] {
                        continue;
                    }
                    // Consistent neighbors traverse the shared edge in the
                    // opposite direction; same direction means flipped.
                    let inconsistent = has_directed_edge(faces[neighbor], u, v);
                    flip[neighbor] = inconsistent;
                    if inconsistent {
                        flipped_count += 1;
                    }
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }
    }

    let oriented_faces: Vec<[u32; 3]> = faces
        .iter()
        .zip(&flip)
        .map(|(&face, &flipped)| oriented(face, flipped))
        .collect();

    let candidate = Mesh::from_parts_unchecked(mesh.positions().to_vec(), oriented_faces);

    if candidate.signed_volume() >= 0.0 {
        if flipped_count > 0 {
            debug!("re-oriented {flipped_count} faces");
        }
        return candidate;
    }

    // Consistently wound but inside out: flip everything.
    debug!("mesh was inside out, flipping all {face_count} faces");
    let everted: Vec<[u32; 3]> = candidate
        .faces()
        .iter()
        .map(|&[a, b, c]| [a, c, b])
        .collect();
    Mesh::from_parts_unchecked(mesh.positions().to_vec(), everted)
}

/// A face's index triple with its pending flip applied.
#[inline]
const fn oriented(face: [u32; 3], flipped: bool) -> [u32; 3] {
    if flipped {
        [face[0], face[2], face[1]]
    } else {
        face
    }
}

/// Check if `face` traverses the directed edge `u -> v`.
#[inline]
fn has_directed_edge(face: [u32; 3], u: u32, v: u32) -> bool {
    let [a, b, c] = face;
    (a == u && b == v) || (b == u && c == v) || (c == u && a == v)
}
