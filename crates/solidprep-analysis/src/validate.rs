//! Mesh validation and health reporting.
//!
//! Aggregates the topology queries into a single report with an overall
//! verdict and an ordered, human-readable issue list.

use solidprep_mesh::Mesh;

use crate::topology::{
    degenerate_face_count, duplicate_vertex_count, is_watertight, manifold_report, normals_report,
    ManifoldReport, NormalsReport, DEGENERATE_AREA_EPSILON,
};

/// Snapshot of a mesh validation run.
///
/// Created once per [`validate`] call and never mutated afterward.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    /// Overall verdict. False if the mesh is not watertight, has
    /// non-manifold edges, or contains degenerate faces. Flipped normals
    /// and duplicate vertices are reported but do not invalidate.
    pub valid: bool,
    /// Whether every edge is shared by exactly two triangles.
    pub watertight: bool,
    /// Manifold classification.
    pub manifold: ManifoldReport,
    /// Normal-orientation heuristic results.
    pub normals: NormalsReport,
    /// Number of near-zero-area triangles.
    pub degenerate_face_count: usize,
    /// Number of vertices that coincide with another vertex.
    pub duplicate_vertex_count: usize,
    /// Human-readable issue descriptions, in fixed order:
    /// watertight, manifold, flipped normals, degenerate faces,
    /// duplicate vertices.
    pub issues: Vec<String>,
}

impl ValidationReport {
    /// Check if any issue was reported, including warnings that do not
    /// affect the overall verdict.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Validation Report:")?;
        writeln!(f, "  Valid: {}", if self.valid { "Yes" } else { "No" })?;
        writeln!(
            f,
            "  Watertight: {}",
            if self.watertight { "Yes" } else { "No" }
        )?;
        writeln!(
            f,
            "  Manifold: {}",
            if self.manifold.is_manifold { "Yes" } else { "No" }
        )?;
        writeln!(
            f,
            "  Flipped normals: {}/{}",
            self.normals.flipped_count, self.normals.total_faces
        )?;

        if self.has_issues() {
            writeln!(f)?;
            writeln!(f, "  Issues:")?;
            for issue in &self.issues {
                writeln!(f, "    - {issue}")?;
            }
        }

        Ok(())
    }
}

/// Options for mesh validation.
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Area threshold below which a face is considered degenerate.
    pub degenerate_area_epsilon: f64,
    /// Whether to run the flipped-normal heuristic.
    pub check_normals: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            degenerate_area_epsilon: DEGENERATE_AREA_EPSILON,
            check_normals: true,
        }
    }
}

/// Validate a mesh and return a report of any issues.
///
/// # Example
///
/// ```
/// use solidprep_mesh::unit_cube;
/// use solidprep_analysis::validate;
///
/// let report = validate(&unit_cube());
/// assert!(report.valid);
/// assert!(report.watertight);
/// assert!(report.issues.is_empty());
/// ```
#[must_use]
pub fn validate(mesh: &Mesh) -> ValidationReport {
    validate_with_options(mesh, &ValidationOptions::default())
}

/// Validate a mesh with custom options.
#[must_use]
pub fn validate_with_options(mesh: &Mesh, options: &ValidationOptions) -> ValidationReport {
    let watertight = is_watertight(mesh);
    let manifold = manifold_report(mesh);
    let normals = if options.check_normals {
        normals_report(mesh)
    } else {
        NormalsReport {
            flipped_count: 0,
            total_faces: mesh.triangle_count(),
            flipped_percentage: 0.0,
        }
    };
    let degenerate = degenerate_face_count(mesh, options.degenerate_area_epsilon);
    let duplicates = duplicate_vertex_count(mesh);

    let mut valid = true;
    let mut issues = Vec::new();

    if !watertight {
        issues.push("mesh is not watertight".to_string());
        valid = false;
    }

    if !manifold.is_manifold {
        issues.push(format!(
            "found {} non-manifold edges",
            manifold.non_manifold_edge_count
        ));
        valid = false;
    }

    if normals.flipped_count > 0 {
        issues.push(format!("found {} flipped normals", normals.flipped_count));
    }

    if degenerate > 0 {
        issues.push(format!("found {degenerate} degenerate faces"));
        valid = false;
    }

    if duplicates > 0 {
        issues.push(format!("found {duplicates} duplicate vertices"));
    }

    ValidationReport {
        valid,
        watertight,
        manifold,
        normals,
        degenerate_face_count: degenerate,
        duplicate_vertex_count: duplicates,
        issues,
    }
}
