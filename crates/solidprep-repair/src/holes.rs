//! Hole detection and filling.
//!
//! A hole is a closed loop of boundary edges (edges referenced by only
//! one triangle). Loops are discovered by walking boundary edges through
//! shared vertices until they close; closable loops are triangulated by
//! ear clipping with a fan fallback.

use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use solidprep_mesh::{Mesh, Triangle};
use tracing::{debug, warn};

/// A boundary loop bounding a hole in the mesh.
#[derive(Debug, Clone)]
pub struct BoundaryLoop {
    /// Ordered vertex indices around the loop.
    pub vertices: Vec<u32>,
}

impl BoundaryLoop {
    /// Number of edges (equals the number of vertices) in the loop.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }
}

/// Detect all closed boundary loops (holes) in the mesh.
///
/// Boundary edges that cannot be traced into a closed loop (open chains,
/// vertices where more than two boundary edges meet) are dropped; the
/// loops that do close are returned.
///
/// # Example
///
/// ```
/// use solidprep_mesh::{Mesh, Point3};
/// use solidprep_repair::detect_holes;
///
/// let triangle = Mesh::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap();
///
/// // A lone triangle is bounded by one 3-edge loop.
/// let holes = detect_holes(&triangle);
/// assert_eq!(holes.len(), 1);
/// assert_eq!(holes[0].edge_count(), 3);
/// ```
#[must_use]
pub fn detect_holes(mesh: &Mesh) -> Vec<BoundaryLoop> {
    let boundary_edges: Vec<(u32, u32)> = mesh.edge_incidence().boundary_edges().collect();
    if boundary_edges.is_empty() {
        return Vec::new();
    }

    debug!("found {} boundary edges", boundary_edges.len());

    // Vertex adjacency restricted to boundary edges.
    let mut neighbors: HashMap<u32, Vec<u32>> = HashMap::new();
    for &(a, b) in &boundary_edges {
        neighbors.entry(a).or_default().push(b);
        neighbors.entry(b).or_default().push(a);
    }

    let mut visited: HashSet<u32> = HashSet::new();
    let mut loops = Vec::new();

    for &(start, _) in &boundary_edges {
        if visited.contains(&start) {
            continue;
        }

        // Walk from `start` through unvisited boundary neighbors until the
        // loop closes or we hit a dead end.
        let mut loop_vertices = Vec::new();
        let mut current = start;
        let mut prev: Option<u32> = None;
        let mut closed = false;

        loop {
            visited.insert(current);
            loop_vertices.push(current);

            let candidates = neighbors.get(&current).map(Vec::as_slice).unwrap_or(&[]);

            let next = candidates
                .iter()
                .find(|&&n| Some(n) != prev && !visited.contains(&n))
                .or_else(|| {
                    candidates
                        .iter()
                        .find(|&&n| n == start && loop_vertices.len() > 2)
                });

            match next {
                Some(&n) if n == start => {
                    closed = true;
                    break;
                }
                Some(&n) => {
                    prev = Some(current);
                    current = n;
                }
                None => {
                    warn!("boundary chain starting at vertex {start} does not close, skipping");
                    break;
                }
            }
        }

        if closed && loop_vertices.len() >= 3 {
            loops.push(BoundaryLoop {
                vertices: loop_vertices,
            });
        }
    }

    debug!(
        "detected {} holes, sizes: {:?}",
        loops.len(),
        loops.iter().map(BoundaryLoop::edge_count).collect::<Vec<_>>()
    );

    loops
}

/// Fill all closable holes, returning a new mesh.
///
/// Each closed boundary loop is triangulated with new faces over the
/// existing boundary vertices; no vertices are added. Loops that cannot
/// be traced or triangulated are left open. A mesh without holes is
/// returned unchanged.
pub fn fill_holes(mesh: &Mesh) -> Mesh {
    fill_holes_with_count(mesh).0
}

pub(crate) fn fill_holes_with_count(mesh: &Mesh) -> (Mesh, usize) {
    let holes = detect_holes(mesh);
    if holes.is_empty() {
        return (mesh.clone(), 0);
    }

    let mut faces = mesh.faces().to_vec();
    let mut filled = 0;

    for hole in &holes {
        let triangles = triangulate_loop(mesh, hole);
        if triangles.is_empty() {
            warn!(
                "could not triangulate hole with {} edges, leaving it open",
                hole.edge_count()
            );
            continue;
        }
        faces.extend(triangles);
        filled += 1;
    }

    if filled == 0 {
        return (mesh.clone(), 0);
    }

    debug!("filled {filled} holes");
    (
        Mesh::from_parts_unchecked(mesh.positions().to_vec(), faces),
        filled,
    )
}

/// Triangulate a boundary loop by ear clipping, falling back to a fan.
///
/// The loop is first oriented against the adjacent surface triangles,
/// so the patch traverses each boundary edge opposite to its existing
/// face and the filled surface keeps a consistent winding.
fn triangulate_loop(mesh: &Mesh, boundary: &BoundaryLoop) -> Vec<[u32; 3]> {
    let n = boundary.vertices.len();
    if n < 3 {
        return Vec::new();
    }

    let mut loop_vertices = boundary.vertices.clone();
    orient_against_surface(mesh, &mut loop_vertices);
    let boundary = BoundaryLoop {
        vertices: loop_vertices,
    };

    let positions: Vec<Point3<f64>> = boundary
        .vertices
        .iter()
        .map(|&idx| mesh.positions()[idx as usize])
        .collect();

    let loop_normal = loop_normal(&positions);

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let mut clipped = false;

        for i in 0..remaining.len() {
            let prev = remaining[(i + remaining.len() - 1) % remaining.len()];
            let curr = remaining[i];
            let next = remaining[(i + 1) % remaining.len()];

            if is_ear(&positions, &remaining, prev, curr, next, &loop_normal) {
                triangles.push([
                    boundary.vertices[prev],
                    boundary.vertices[curr],
                    boundary.vertices[next],
                ]);
                remaining.remove(i);
                clipped = true;
                break;
            }
        }

        if !clipped {
            debug!(
                "ear clipping stuck with {} vertices remaining, falling back to fan",
                remaining.len()
            );
            break;
        }
    }

    if remaining.len() == 3 {
        triangles.push([
            boundary.vertices[remaining[0]],
            boundary.vertices[remaining[1]],
            boundary.vertices[remaining[2]],
        ]);
    } else {
        // Fan from the first remaining vertex.
        let center = remaining[0];
        for i in 1..remaining.len() - 1 {
            triangles.push([
                boundary.vertices[center],
                boundary.vertices[remaining[i]],
                boundary.vertices[remaining[i + 1]],
            ]);
        }
    }

    triangles
}

/// Reverse the loop if the face on its first boundary edge traverses
/// that edge in the same direction as the loop. Adjacent triangles are
/// consistently wound when they traverse their shared edge in opposite
/// directions, so the patch must run against the existing face.
fn orient_against_surface(mesh: &Mesh, loop_vertices: &mut [u32]) {
    let (a, b) = (loop_vertices[0], loop_vertices[1]);
    let Some(adjacent) = mesh.edge_incidence().faces_for_edge(a, b) else {
        return;
    };
    let Some(&face_idx) = adjacent.first() else {
        return;
    };

    let [f0, f1, f2] = mesh.faces()[face_idx];
    let face_traverses_ab = (f0 == a && f1 == b) || (f1 == a && f2 == b) || (f2 == a && f0 == b);
    if face_traverses_ab {
        loop_vertices.reverse();
    }
}

/// Average normal of the loop polygon, for consistent ear winding.
fn loop_normal(positions: &[Point3<f64>]) -> Vector3<f64> {
    let n = positions.len();
    #[allow(clippy::cast_precision_loss)]
    let centroid = Point3::from(
        positions.iter().map(|p| p.coords).sum::<Vector3<f64>>() / n as f64,
    );

    let mut normal = Vector3::zeros();
    for i in 0..n {
        let v0 = positions[i] - centroid;
        let v1 = positions[(i + 1) % n] - centroid;
        normal += v0.cross(&v1);
    }

    let len = normal.norm();
    if len > f64::EPSILON {
        normal / len
    } else {
        Vector3::z()
    }
}

/// Check if the vertex at `curr` forms a clippable ear.
fn is_ear(
    positions: &[Point3<f64>],
    remaining: &[usize],
    prev: usize,
    curr: usize,
    next: usize,
    loop_normal: &Vector3<f64>,
) -> bool {
    let tri = Triangle::new(positions[prev], positions[curr], positions[next]);
    let Some(tri_normal) = tri.normal() else {
        return false;
    };

    // Reflex corner: candidate triangle faces against the loop.
    if tri_normal.dot(loop_normal) < 0.0 {
        return false;
    }

    // No other loop vertex may lie inside the candidate triangle.
    for &idx in remaining {
        if idx == prev || idx == curr || idx == next {
            continue;
        }
        if point_in_triangle(
            &positions[idx],
            &positions[prev],
            &positions[curr],
            &positions[next],
            loop_normal,
        ) {
            return false;
        }
    }

    true
}

/// Point-in-triangle test in the plane most orthogonal to `normal`.
fn point_in_triangle(
    p: &Point3<f64>,
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    normal: &Vector3<f64>,
) -> bool {
    // Project to 2D by dropping the dominant normal axis.
    let (nx, ny, nz) = (normal.x.abs(), normal.y.abs(), normal.z.abs());
    let project = |p: &Point3<f64>| -> (f64, f64) {
        if nz >= nx && nz >= ny {
            (p.x, p.y)
        } else if ny >= nx {
            (p.x, p.z)
        } else {
            (p.y, p.z)
        }
    };

    let (p, a, b, c) = (project(p), project(a), project(b), project(c));

    let sign = |p1: (f64, f64), p2: (f64, f64), p3: (f64, f64)| -> f64 {
        (p1.0 - p3.0) * (p2.1 - p3.1) - (p2.0 - p3.0) * (p1.1 - p3.1)
    };

    let d1 = sign(p, a, b);
    let d2 = sign(p, b, c);
    let d3 = sign(p, c, a);

    let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
    let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;

    !(has_neg && has_pos)
}
