//! STL (Stereolithography) reading and writing.
//!
//! Supports both ASCII and binary variants.
//!
//! # Format Detection
//!
//! The loader detects the variant from the file content:
//! - ASCII files start with "solid" (after optional whitespace)
//! - Binary files have an 80-byte header followed by a triangle count;
//!   some binary files also start with "solid", so the header is
//!   additionally sniffed for NUL bytes
//!
//! # Binary Layout
//!
//! ```text
//! UINT8[80]    - Header (ignored)
//! UINT32       - Number of triangles
//! foreach triangle
//!     REAL32[3] - Normal vector (ignored, recomputed on save)
//!     REAL32[3] - Vertex 1
//!     REAL32[3] - Vertex 2
//!     REAL32[3] - Vertex 3
//!     UINT16    - Attribute byte count
//! end
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;

use solidprep_mesh::{Mesh, Point3, Vector3};
use tracing::debug;

use crate::error::{StlError, StlResult};

/// STL binary header size in bytes.
const HEADER_SIZE: usize = 80;

/// Size of one triangle record in binary STL.
const TRIANGLE_SIZE: usize = 50;

/// Load a mesh from an STL file.
///
/// Vertex positions are kept in the file's native units and triangle
/// windings as stored. Each facet contributes three fresh vertices; run
/// the repair pipeline's merge stage to weld shared corners.
///
/// # Errors
///
/// - [`StlError::FileNotFound`] if the path does not exist
/// - [`StlError::UnsupportedFormat`] if the extension is not `.stl`
/// - [`StlError::EmptyGeometry`] if the file parses to zero triangles
/// - [`StlError::Io`] / parse variants for unreadable or malformed files
pub fn load_stl<P: AsRef<Path>>(path: P) -> StlResult<Mesh> {
    let path = path.as_ref();

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("(none)");
    if !extension.eq_ignore_ascii_case("stl") {
        return Err(StlError::UnsupportedFormat {
            extension: extension.to_string(),
        });
    }

    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            StlError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            StlError::Io(e)
        }
    })?;

    let mut reader = BufReader::new(file);

    // Read enough to decide between ASCII and binary.
    let mut header = [0u8; HEADER_SIZE + 4];
    let bytes_read = read_up_to(&mut reader, &mut header)?;

    if bytes_read < 6 {
        return Err(StlError::invalid_content("file too small to be valid STL"));
    }

    let prefix = String::from_utf8_lossy(&header[..bytes_read.min(HEADER_SIZE)]);
    let mesh = if prefix.trim_start().starts_with("solid") && !looks_binary(&header[..bytes_read])
    {
        // ASCII: reopen and parse line by line.
        drop(reader);
        let reader = BufReader::new(File::open(path)?);
        load_ascii(reader)?
    } else {
        load_binary(&header[..bytes_read], reader)?
    };

    if mesh.is_empty() {
        return Err(StlError::EmptyGeometry);
    }

    debug!(
        "loaded {} triangles from {}",
        mesh.triangle_count(),
        path.display()
    );

    Ok(mesh)
}

/// Fill `buf` as far as the reader allows, returning the bytes read.
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> StlResult<usize> {
    let mut total = 0;
    while total < buf.len() {
        let n = reader.read(&mut buf[total..])?;
        if n == 0 {
            break;
        }
        total += n;
    }
    Ok(total)
}

/// Sniff binary STL despite a "solid" prefix: binary headers usually
/// contain NUL bytes, ASCII never does.
fn looks_binary(header: &[u8]) -> bool {
    header.len() >= HEADER_SIZE + 4 && header[..HEADER_SIZE].contains(&0)
}

/// Parse a binary STL given the already-consumed header bytes.
fn load_binary<R: Read>(header: &[u8], mut reader: R) -> StlResult<Mesh> {
    if header.len() < HEADER_SIZE + 4 {
        return Err(StlError::invalid_content(
            "binary STL shorter than its 84-byte header",
        ));
    }

    let triangle_count = u32::from_le_bytes([
        header[HEADER_SIZE],
        header[HEADER_SIZE + 1],
        header[HEADER_SIZE + 2],
        header[HEADER_SIZE + 3],
    ]);

    let mut positions = Vec::with_capacity(triangle_count as usize * 3);
    let mut faces = Vec::with_capacity(triangle_count as usize);

    let mut record = [0u8; TRIANGLE_SIZE];
    for i in 0..triangle_count {
        let bytes_read = read_up_to(&mut reader, &mut record)?;
        if bytes_read < TRIANGLE_SIZE {
            return Err(StlError::Truncated {
                expected: triangle_count,
                got: i,
            });
        }

        // Skip the stored normal (12 bytes); it is recomputed on save.
        #[allow(clippy::cast_possible_truncation)]
        let base = positions.len() as u32;
        positions.push(read_point(&record[12..24]));
        positions.push(read_point(&record[24..36]));
        positions.push(read_point(&record[36..48]));
        faces.push([base, base + 1, base + 2]);
    }

    Ok(Mesh::from_parts_unchecked(positions, faces))
}

/// Read a point from 12 bytes (3 little-endian f32s).
fn read_point(buf: &[u8]) -> Point3<f64> {
    let x = f32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    let y = f32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
    let z = f32::from_le_bytes([buf[8], buf[9], buf[10], buf[11]]);
    Point3::new(f64::from(x), f64::from(y), f64::from(z))
}

/// Parse an ASCII STL.
fn load_ascii<R: BufRead>(reader: R) -> StlResult<Mesh> {
    let mut positions: Vec<Point3<f64>> = Vec::new();
    let mut faces: Vec<[u32; 3]> = Vec::new();

    let mut in_facet = false;
    let mut in_loop = false;
    let mut facet_vertices: Vec<Point3<f64>> = Vec::with_capacity(3);

    for line in reader.lines() {
        let line = line?;
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        match keyword.to_ascii_lowercase().as_str() {
            "facet" => {
                in_facet = true;
                // The stored normal is ignored.
            }
            "outer" => {
                in_loop = true;
                facet_vertices.clear();
            }
            "vertex" => {
                if in_loop {
                    let coords: Vec<&str> = parts.collect();
                    if coords.len() >= 3 {
                        let x: f64 = coords[0].parse()?;
                        let y: f64 = coords[1].parse()?;
                        let z: f64 = coords[2].parse()?;
                        facet_vertices.push(Point3::new(x, y, z));
                    }
                }
            }
            "endloop" => {
                in_loop = false;
            }
            "endfacet" => {
                if in_facet && facet_vertices.len() == 3 {
                    #[allow(clippy::cast_possible_truncation)]
                    let base = positions.len() as u32;
                    positions.append(&mut facet_vertices);
                    faces.push([base, base + 1, base + 2]);
                }
                in_facet = false;
            }
            "endsolid" => break,
            _ => {}
        }
    }

    Ok(Mesh::from_parts_unchecked(positions, faces))
}

/// Save a mesh to an STL file.
///
/// # Arguments
///
/// * `mesh` - The mesh to save
/// * `path` - Output file path
/// * `binary` - True for binary STL (the preferred default), false for ASCII
///
/// # Errors
///
/// - [`StlError::EmptyMesh`] if the mesh has zero points
/// - [`StlError::Io`] if the file cannot be written (permissions, disk full)
pub fn save_stl<P: AsRef<Path>>(mesh: &Mesh, path: P, binary: bool) -> StlResult<()> {
    if mesh.vertex_count() == 0 {
        return Err(StlError::EmptyMesh);
    }

    let file = File::create(path.as_ref())?;
    let writer = BufWriter::new(file);

    if binary {
        save_binary(mesh, writer)
    } else {
        save_ascii(mesh, writer)
    }
}

/// Write a binary STL.
fn save_binary<W: Write>(mesh: &Mesh, mut writer: W) -> StlResult<()> {
    let mut header = [b' '; HEADER_SIZE];
    let text = b"Binary STL generated by solidprep";
    header[..text.len()].copy_from_slice(text);
    writer.write_all(&header)?;

    #[allow(clippy::cast_possible_truncation)]
    let triangle_count = mesh.triangle_count() as u32;
    writer.write_all(&triangle_count.to_le_bytes())?;

    for tri in mesh.triangles() {
        let normal = tri.normal().unwrap_or_else(Vector3::zeros);
        #[allow(clippy::cast_possible_truncation)]
        {
            writer.write_all(&(normal.x as f32).to_le_bytes())?;
            writer.write_all(&(normal.y as f32).to_le_bytes())?;
            writer.write_all(&(normal.z as f32).to_le_bytes())?;
        }

        for vertex in tri.vertices() {
            #[allow(clippy::cast_possible_truncation)]
            {
                writer.write_all(&(vertex.x as f32).to_le_bytes())?;
                writer.write_all(&(vertex.y as f32).to_le_bytes())?;
                writer.write_all(&(vertex.z as f32).to_le_bytes())?;
            }
        }

        writer.write_all(&0u16.to_le_bytes())?;
    }

    Ok(())
}

/// Write an ASCII STL.
fn save_ascii<W: Write>(mesh: &Mesh, mut writer: W) -> StlResult<()> {
    writeln!(writer, "solid mesh")?;

    for tri in mesh.triangles() {
        let normal = tri.normal().unwrap_or_else(Vector3::zeros);

        writeln!(
            writer,
            "  facet normal {:.6e} {:.6e} {:.6e}",
            normal.x, normal.y, normal.z
        )?;
        writeln!(writer, "    outer loop")?;
        for vertex in tri.vertices() {
            writeln!(
                writer,
                "      vertex {:.6e} {:.6e} {:.6e}",
                vertex.x, vertex.y, vertex.z
            )?;
        }
        writeln!(writer, "    endloop")?;
        writeln!(writer, "  endfacet")?;
    }

    writeln!(writer, "endsolid mesh")?;

    Ok(())
}
