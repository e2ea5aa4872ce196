use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GeometryError, Result};
use crate::geometry::face::Face;
use crate::math::{NameHasher, Point3, UnitQuaternion, Vector3};

/// Euler rotation in radians: yaw about Y, pitch about X, roll about Z.
///
/// Applied roll first, then pitch, then yaw.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct YawPitchRoll {
    #[serde(default)]
    pub yaw: f64,
    #[serde(default)]
    pub pitch: f64,
    #[serde(default)]
    pub roll: f64,
}

impl YawPitchRoll {
    /// Returns the equivalent rotation.
    #[must_use]
    pub fn to_rotation(&self) -> UnitQuaternion {
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), self.yaw)
            * UnitQuaternion::from_axis_angle(&Vector3::x_axis(), self.pitch)
            * UnitQuaternion::from_axis_angle(&Vector3::z_axis(), self.roll)
    }
}

fn unit_scale() -> Vector3 {
    Vector3::repeat(1.0)
}

/// A triangle soup read from a Wavefront OBJ file.
///
/// Vertices go through scale, then rotation, then translation. Loaded normals
/// go through scale and rotation only. Every triangle is split into four at
/// its edge midpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", deny_unknown_fields)]
pub struct ObjFileSource {
    #[serde(alias = "filepath")]
    pub file: PathBuf,
    #[serde(default = "Vector3::zeros")]
    pub translation: Vector3,
    #[serde(default = "unit_scale")]
    pub scale: Vector3,
    #[serde(default)]
    pub rotation: YawPitchRoll,
    #[serde(default, rename = "overridenormals")]
    pub override_normals: bool,
}

impl ObjFileSource {
    /// Creates a source with the identity transform.
    #[must_use]
    pub fn new(file: impl Into<PathBuf>, override_normals: bool) -> Self {
        Self {
            file: file.into(),
            translation: Vector3::zeros(),
            scale: unit_scale(),
            rotation: YawPitchRoll::default(),
            override_normals,
        }
    }

    /// Returns `Obj.<hash>`.
    #[must_use]
    pub fn name(&self) -> String {
        NameHasher::new()
            .add(&*self.file.to_string_lossy())
            .add_vector(&self.translation)
            .add_vector(&self.scale)
            .add(&self.rotation.yaw)
            .add(&self.rotation.pitch)
            .add(&self.rotation.roll)
            .add(&self.override_normals)
            .name("Obj")
    }

    /// Loads, transforms and subdivides the mesh.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed, or if it carries no
    /// normals while `override_normals` is off.
    pub fn generate(&self) -> Result<Vec<Face>> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _) =
            tobj::load_obj(&self.file, &options).map_err(|source| GeometryError::MeshLoad {
                path: self.file.clone(),
                source,
            })?;

        let rotation = self.rotation.to_rotation();
        let place = |p: Vector3| Point3::from(rotation * p.component_mul(&self.scale) + self.translation);
        let orient = |n: Vector3| rotation * n.component_mul(&self.scale);

        let mut faces = Vec::new();
        for model in &models {
            let mesh = &model.mesh;
            let position = |i: u32| {
                let i = i as usize * 3;
                Vector3::new(mesh.positions[i], mesh.positions[i + 1], mesh.positions[i + 2])
            };

            if !self.override_normals && mesh.normals.is_empty() && !mesh.indices.is_empty() {
                return Err(GeometryError::MissingNormals(self.file.clone()).into());
            }
            let normal = |i: u32| {
                let i = i as usize * 3;
                Vector3::new(mesh.normals[i], mesh.normals[i + 1], mesh.normals[i + 2])
            };

            for tri in mesh.indices.chunks_exact(3) {
                let corners = [place(position(tri[0])), place(position(tri[1])), place(position(tri[2]))];
                if self.override_normals {
                    subdivide_with_own_normals(corners, &mut faces);
                } else {
                    let normals = [orient(normal(tri[0])), orient(normal(tri[1])), orient(normal(tri[2]))];
                    subdivide_with_blended_normals(corners, normals, &mut faces);
                }
            }
        }

        tracing::debug!(
            file = %self.file.display(),
            models = models.len(),
            faces = faces.len(),
            "loaded external mesh"
        );
        Ok(faces)
    }
}

/// Edge midpoints `(v12, v13, v23)`.
fn midpoints([v1, v2, v3]: [Point3; 3]) -> (Point3, Point3, Point3) {
    (
        nalgebra::center(&v1, &v2),
        nalgebra::center(&v1, &v3),
        nalgebra::center(&v2, &v3),
    )
}

fn subdivide_with_own_normals(corners: [Point3; 3], out: &mut Vec<Face>) {
    let [v1, v2, v3] = corners;
    let (v12, v13, v23) = midpoints(corners);
    let tri = |a: Point3, b: Point3, c: Point3| Face::new(a, b, c, (a - b).cross(&(a - c)));
    out.push(tri(v1, v12, v13));
    out.push(tri(v12, v2, v23));
    out.push(tri(v13, v23, v3));
    out.push(tri(v12, v23, v13));
}

fn subdivide_with_blended_normals(corners: [Point3; 3], normals: [Vector3; 3], out: &mut Vec<Face>) {
    let [v1, v2, v3] = corners;
    let [n1, n2, n3] = normals;
    let (v12, v13, v23) = midpoints(corners);
    out.push(Face::new(v1, v12, v13, (n1 * 4.0 + n2 + n3) / 6.0));
    out.push(Face::new(v12, v2, v23, (n2 * 4.0 + n1 + n3) / 6.0));
    out.push(Face::new(v13, v23, v3, (n3 * 4.0 + n1 + n2) / 6.0));
    out.push(Face::new(v12, v23, v13, (n1 + n2 + n3) / 3.0));
}
