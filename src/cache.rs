//! Persistent flux results, named by the parameters that produced them.
//!
//! Layout of an artifact:
//!
//! ```text
//! <net flux>
//! <curve point count>
//! <x> <y> <z>            (one line per curve point)
//! v <x> <y> <z>          (unique vertex positions)
//! vn <x> <y> <z>         (unique normals)
//! vt <flow intensity> 0  (unique flow intensities)
//! f <v>/<vt>/<vn> <v>/<vt>/<vn> <v>/<vt>/<vn>
//! ```
//!
//! Indices are 1-based and assigned in first-seen order. Every number is
//! written in shortest round-trip form, so a read gives back the exact bits.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{CacheError, Result};
use crate::geometry::{Face, Polyline};
use crate::math::{Point2, Point3, Vector3};

/// File extension of cache artifacts.
pub const CACHE_EXTENSION: &str = "mobj";

/// The persisted product of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheArtifact {
    pub net_flux: f64,
    pub curve: Polyline,
    pub mesh: Vec<Face>,
}

/// One corner of a face, expanded for rendering.
///
/// The texture coordinate carries `(flow_intensity, 0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: Point3,
    pub normal: Vector3,
    pub tex_coord: Point2,
}

impl CacheArtifact {
    /// Reads an artifact from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::read_from(&mut BufReader::new(file))
    }

    /// Writes the artifact to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let io_error = |source| CacheError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        self.write_to(&mut writer)?;
        writer.flush().map_err(io_error)?;
        Ok(())
    }

    /// Serializes the artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer fails.
    pub fn write_to<W: Write>(&self, w: &mut W) -> Result<()> {
        writeln!(w, "{}", self.net_flux).map_err(CacheError::from)?;
        write_curve(w, &self.curve).map_err(CacheError::from)?;
        write_mesh(w, &self.mesh).map_err(CacheError::from)?;
        Ok(())
    }

    /// Parses an artifact.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream cannot be read or is malformed.
    pub fn read_from<R: BufRead>(r: &mut R) -> Result<Self> {
        let mut lines = LineReader::new(r);

        let net_flux = lines.next_number::<f64>("net flux")?;
        let count = lines.next_number::<usize>("curve point count")?;
        let mut points = Vec::with_capacity(count);
        for _ in 0..count {
            points.push(lines.next_point()?);
        }

        let mesh = read_mesh(lines.into_inner())?;
        Ok(Self {
            net_flux,
            curve: Polyline { points },
            mesh,
        })
    }

    /// Expands every face into three render vertices.
    #[must_use]
    pub fn vertex_buffer(&self) -> Vec<MeshVertex> {
        self.mesh
            .iter()
            .flat_map(|face| {
                let tex_coord = Point2::new(face.flow_intensity, 0.0);
                [face.vertex1, face.vertex2, face.vertex3].map(|position| MeshVertex {
                    position,
                    normal: face.normal,
                    tex_coord,
                })
            })
            .collect()
    }
}

fn write_curve<W: Write>(w: &mut W, curve: &Polyline) -> std::io::Result<()> {
    writeln!(w, "{}", curve.points.len())?;
    for p in &curve.points {
        writeln!(w, "{} {} {}", p.x, p.y, p.z)?;
    }
    Ok(())
}

/// Insertion-ordered set of float tuples keyed by exact bit pattern.
struct IndexedValues<const N: usize> {
    ids: HashMap<[u64; N], usize>,
    values: Vec<[f64; N]>,
}

impl<const N: usize> IndexedValues<N> {
    fn new() -> Self {
        Self {
            ids: HashMap::new(),
            values: Vec::new(),
        }
    }

    /// Returns the 1-based index of `value`, inserting it if unseen.
    fn index_of(&mut self, value: [f64; N]) -> usize {
        let key = value.map(f64::to_bits);
        *self.ids.entry(key).or_insert_with(|| {
            self.values.push(value);
            self.values.len()
        })
    }
}

fn write_mesh<W: Write>(w: &mut W, mesh: &[Face]) -> std::io::Result<()> {
    let mut positions = IndexedValues::<3>::new();
    let mut normals = IndexedValues::<3>::new();
    let mut tex_coords = IndexedValues::<2>::new();

    // (position, tex coord, normal) per corner
    let mut faces: Vec<[[usize; 3]; 3]> = Vec::with_capacity(mesh.len());
    for face in mesh {
        let v1 = positions.index_of(face.vertex1.coords.into());
        let v2 = positions.index_of(face.vertex2.coords.into());
        let v3 = positions.index_of(face.vertex3.coords.into());
        let n = normals.index_of(face.normal.into());
        let t = tex_coords.index_of([face.flow_intensity, 0.0]);
        faces.push([[v1, t, n], [v2, t, n], [v3, t, n]]);
    }

    for [x, y, z] in &positions.values {
        writeln!(w, "v {x} {y} {z}")?;
    }
    for [x, y, z] in &normals.values {
        writeln!(w, "vn {x} {y} {z}")?;
    }
    for [u, v] in &tex_coords.values {
        writeln!(w, "vt {u} {v}")?;
    }
    for [a, b, c] in &faces {
        writeln!(
            w,
            "f {}/{}/{} {}/{}/{} {}/{}/{}",
            a[0], a[1], a[2], b[0], b[1], b[2], c[0], c[1], c[2]
        )?;
    }
    Ok(())
}

/// Reads the triangle section through the OBJ parser.
fn read_mesh<R: BufRead>(r: &mut R) -> std::result::Result<Vec<Face>, CacheError> {
    let options = tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ..Default::default()
    };
    let (models, _) = tobj::load_obj_buf(r, &options, |_| Err(tobj::LoadError::OpenFileFailed))?;

    let malformed = |reason: &str| CacheError::Malformed {
        line: 0,
        reason: reason.to_owned(),
    };

    let mut mesh = Vec::new();
    for model in &models {
        let m = &model.mesh;
        if m.face_arities.iter().any(|&arity| arity != 3) {
            return Err(malformed("non-triangular face"));
        }
        if m.indices.len() != m.normal_indices.len() || m.indices.len() != m.texcoord_indices.len() {
            return Err(malformed("face without normal or flow index"));
        }

        let triple = |data: &[f64], i: u32| -> std::result::Result<Vector3, CacheError> {
            let i = i as usize * 3;
            data.get(i..i + 3)
                .map(|s| Vector3::new(s[0], s[1], s[2]))
                .ok_or_else(|| malformed("index out of range"))
        };

        for k in (0..m.indices.len()).step_by(3) {
            let flow_intensity = m
                .texcoords
                .get(m.texcoord_indices[k] as usize * 2)
                .copied()
                .ok_or_else(|| malformed("flow index out of range"))?;
            mesh.push(Face {
                vertex1: triple(&m.positions, m.indices[k])?.into(),
                vertex2: triple(&m.positions, m.indices[k + 1])?.into(),
                vertex3: triple(&m.positions, m.indices[k + 2])?.into(),
                normal: triple(&m.normals, m.normal_indices[k])?,
                flow_intensity,
            });
        }
    }
    Ok(mesh)
}

/// Line-oriented reader for the artifact header.
struct LineReader<'r, R> {
    inner: &'r mut R,
    line_no: usize,
    buf: String,
}

impl<'r, R: BufRead> LineReader<'r, R> {
    fn new(inner: &'r mut R) -> Self {
        Self {
            inner,
            line_no: 0,
            buf: String::new(),
        }
    }

    fn next_line(&mut self, what: &str) -> std::result::Result<&str, CacheError> {
        self.buf.clear();
        self.line_no += 1;
        if self.inner.read_line(&mut self.buf)? == 0 {
            return Err(CacheError::Malformed {
                line: self.line_no,
                reason: format!("unexpected end of file, expected {what}"),
            });
        }
        Ok(self.buf.trim())
    }

    fn next_number<T: std::str::FromStr>(&mut self, what: &str) -> std::result::Result<T, CacheError> {
        let line_no = self.line_no + 1;
        let text = self.next_line(what)?;
        text.parse().map_err(|_| CacheError::Malformed {
            line: line_no,
            reason: format!("invalid {what} `{text}`"),
        })
    }

    fn next_point(&mut self) -> std::result::Result<Point3, CacheError> {
        let line_no = self.line_no + 1;
        let text = self.next_line("curve point")?;
        let coords: Vec<f64> = text
            .split_whitespace()
            .map(str::parse)
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| CacheError::Malformed {
                line: line_no,
                reason: format!("invalid curve point `{text}`"),
            })?;
        match coords[..] {
            [x, y, z] => Ok(Point3::new(x, y, z)),
            _ => Err(CacheError::Malformed {
                line: line_no,
                reason: format!("expected three coordinates, got `{text}`"),
            }),
        }
    }

    fn into_inner(self) -> &'r mut R {
        self.inner
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::MagneplotError;
    use crate::geometry::{LineSource, PlaneSource};

    fn sample() -> CacheArtifact {
        let mut mesh = PlaneSource::xy(2.0, 1.0, 3, 2).generate().unwrap();
        for (i, face) in mesh.iter_mut().enumerate() {
            #[allow(clippy::cast_precision_loss)]
            let k = i as f64;
            face.flow_intensity = (k * 0.1).sin() * 1e-7 / 3.0;
        }
        let curve = LineSource::new(Point3::new(0.1, 0.2, 0.3), Point3::new(-1.0 / 3.0, 2.0, 1e-9), 5)
            .generate()
            .unwrap();
        CacheArtifact {
            net_flux: -1.234_567_890_123_456_7e-8,
            curve,
            mesh,
        }
    }

    fn to_text(artifact: &CacheArtifact) -> String {
        let mut buf = Vec::new();
        artifact.write_to(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn round_trip_is_exact() {
        let artifact = sample();
        let text = to_text(&artifact);
        let back = CacheArtifact::read_from(&mut Cursor::new(text)).unwrap();
        assert_eq!(back.net_flux.to_bits(), artifact.net_flux.to_bits());
        assert_eq!(back.curve, artifact.curve);
        assert_eq!(back.mesh.len(), artifact.mesh.len());
        for (a, b) in artifact.mesh.iter().zip(&back.mesh) {
            assert_eq!(a, b);
        }
    }

    #[test]
    fn deduplicates_shared_values() {
        let artifact = CacheArtifact {
            net_flux: 0.0,
            curve: Polyline::default(),
            mesh: PlaneSource::xy(2.0, 2.0, 1, 1).generate().unwrap(),
        };
        let text = to_text(&artifact);
        let count = |prefix: &str| text.lines().filter(|l| l.starts_with(prefix)).count();
        assert_eq!(count("v "), 4);
        assert_eq!(count("vn "), 1);
        assert_eq!(count("vt "), 1);
        assert_eq!(count("f "), 2);
        assert!(text.contains("f 1/1/1 2/1/1 3/1/1\nf 3/1/1 2/1/1 4/1/1\n"));
    }

    #[test]
    fn header_layout() {
        let artifact = CacheArtifact {
            net_flux: 0.5,
            curve: Polyline::from(vec![Point3::new(1.0, 2.0, 3.0), Point3::new(0.25, -1.0, 0.0)]),
            mesh: Vec::new(),
        };
        assert_eq!(to_text(&artifact), "0.5\n2\n1 2 3\n0.25 -1 0\n");
        let back = CacheArtifact::read_from(&mut Cursor::new(to_text(&artifact))).unwrap();
        assert_eq!(back, artifact);
    }

    #[test]
    fn save_and_load_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(format!("sample.{CACHE_EXTENSION}"));
        let artifact = sample();
        artifact.save(&path).unwrap();
        assert_eq!(CacheArtifact::load(&path).unwrap(), artifact);
    }

    #[test]
    fn truncated_curve_reports_line() {
        let text = "1.5\n3\n0 0 0\n1 1 1\n";
        let r = CacheArtifact::read_from(&mut Cursor::new(text));
        assert!(matches!(
            r,
            Err(MagneplotError::Cache(CacheError::Malformed { line: 5, .. }))
        ));
    }

    #[test]
    fn bad_net_flux_rejected() {
        let r = CacheArtifact::read_from(&mut Cursor::new("flux\n0\n"));
        assert!(matches!(
            r,
            Err(MagneplotError::Cache(CacheError::Malformed { line: 1, .. }))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let r = CacheArtifact::load(Path::new("/nonexistent/cache.mobj"));
        assert!(matches!(r, Err(MagneplotError::Cache(CacheError::Io { .. }))));
    }

    #[test]
    fn vertex_buffer_carries_flow_in_tex_coord() {
        let artifact = sample();
        let vertices = artifact.vertex_buffer();
        assert_eq!(vertices.len(), artifact.mesh.len() * 3);
        for (face, corners) in artifact.mesh.iter().zip(vertices.chunks_exact(3)) {
            assert_eq!(corners[0].position, face.vertex1);
            assert_eq!(corners[2].position, face.vertex3);
            for c in corners {
                assert_eq!(c.tex_coord, Point2::new(face.flow_intensity, 0.0));
                assert_eq!(c.normal, face.normal);
            }
        }
    }
}
