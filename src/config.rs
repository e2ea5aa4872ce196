//! JSON run configuration.
//!
//! ```json
//! {
//!   "model": { "type": "plane", "config": { ... } },
//!   "curve": { "type": "spiral", "config": { ... } },
//!   "I": 1.0
//! }
//! ```
//!
//! Keys match case-insensitively. Unknown keys and unknown `type` tags are
//! rejected.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{ConfigError, Result};
use crate::geometry::{
    CircleSource, CurveSource, CylinderSource, LineSource, ObjFileSource, PlaneSource,
    SpiralSource, SurfaceSource,
};
use crate::math::{NameHasher, Point3, Vector3};

/// Default current in amperes.
pub const DEFAULT_CURRENT: f64 = 1.0;

fn default_current() -> f64 {
    DEFAULT_CURRENT
}

/// A complete run description.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub model: SurfaceSource,
    pub curve: CurveSource,
    pub current: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    model: Option<RawSection>,
    curve: Option<RawSection>,
    #[serde(default = "default_current")]
    i: f64,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSection {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    config: Option<Value>,
}

impl Config {
    /// Creates a configuration with the default current.
    #[must_use]
    pub fn new(model: impl Into<SurfaceSource>, curve: impl Into<CurveSource>) -> Self {
        Self {
            model: model.into(),
            curve: curve.into(),
            current: DEFAULT_CURRENT,
        }
    }

    /// Sets the current.
    #[must_use]
    pub fn with_current(mut self, current: f64) -> Self {
        self.current = current;
        self
    }

    /// Cache key: `<model>-<curve>`, plus `-I.<hash>` for a non-default
    /// current.
    ///
    /// # Errors
    ///
    /// Returns an error if either source cannot be normalized.
    #[allow(clippy::float_cmp)]
    pub fn name(&self) -> Result<String> {
        let base = format!("{}-{}", self.model.name()?, self.curve.name()?);
        if self.current == DEFAULT_CURRENT {
            Ok(base)
        } else {
            Ok(format!("{base}-{}", NameHasher::new().add(&self.current).name("I")))
        }
    }

    /// Reads and decodes a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or decoded.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Decodes a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending field or type tag.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text).map_err(ConfigError::from)?;
        Self::from_value(value)
    }

    /// Decodes an already parsed configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending field or type tag.
    pub fn from_value(value: Value) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(lowercase_keys(value)).map_err(ConfigError::from)?;

        let model = raw.model.ok_or(ConfigError::MissingField("model"))?;
        let curve = raw.curve.ok_or(ConfigError::MissingField("curve"))?;

        Ok(Self {
            model: decode_surface(model)?,
            curve: decode_curve(curve)?,
            current: raw.i,
        })
    }

    /// Encodes the configuration, writing every optional field explicitly.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be serialized.
    pub fn to_value(&self) -> Result<Value> {
        let (model_tag, model) = match &self.model {
            SurfaceSource::Plane(s) => ("plane", encode(s)?),
            SurfaceSource::Cylinder(s) => ("cilinder", encode(s)?),
            SurfaceSource::ObjFile(s) => ("objfile", encode(s)?),
        };
        let (curve_tag, curve) = match &self.curve {
            CurveSource::Line(s) => ("line", encode(s)?),
            CurveSource::Circle(s) => ("circumference", encode(s)?),
            CurveSource::Spiral(s) => ("spiral", encode(s)?),
        };
        Ok(json!({
            "model": { "type": model_tag, "config": model },
            "curve": { "type": curve_tag, "config": curve },
            "I": self.current,
        }))
    }

    /// Encodes the configuration as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if a source cannot be serialized.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_value()?).map_err(ConfigError::from)?)
    }

    /// A tall XY plane threaded by a Y-axis helix.
    #[must_use]
    pub fn plane_preset() -> Self {
        let center = Point3::new(0.0, 10.0, 0.0);
        let mut plane = PlaneSource::xy(1.2, 20.0, 20, 200);
        plane.center = center;
        Self::new(
            plane,
            SpiralSource::new(center, Vector3::y(), 0.8, 20.0, 1.2, 1600)
                .with_start_towards(Vector3::x()),
        )
    }

    /// A thin cylinder inside a wider coaxial helix.
    #[must_use]
    pub fn cylinder_preset() -> Self {
        let center = Point3::new(0.0, 20.0, 0.0);
        Self::new(
            CylinderSource::new(center, Vector3::y(), 0.3, 40.0, 150, 2400)
                .with_start_towards(Vector3::x()),
            SpiralSource::new(center, Vector3::y(), 1.2, 40.0, 3.0, 3200)
                .with_start_towards(Vector3::x()),
        )
    }

    /// An external mesh inside a tightly wound helix.
    #[must_use]
    pub fn mesh_preset(file: impl Into<PathBuf>) -> Self {
        Self::new(
            ObjFileSource::new(file, false),
            SpiralSource::new(Point3::new(0.0, 1.0, 0.0), Vector3::y(), 5.0, 4.0, 0.2, 12_000)
                .with_start_towards(Vector3::x()),
        )
    }
}

fn encode<T: Serialize>(source: &T) -> std::result::Result<Value, ConfigError> {
    Ok(serde_json::to_value(source)?)
}

fn decode<T: DeserializeOwned>(
    section: &'static str,
    tag: &str,
    body: Option<Value>,
) -> std::result::Result<T, ConfigError> {
    let body = body.unwrap_or_else(|| Value::Object(Map::new()));
    serde_json::from_value(body).map_err(|source| ConfigError::Invalid {
        section,
        tag: tag.to_owned(),
        source,
    })
}

fn decode_surface(section: RawSection) -> std::result::Result<SurfaceSource, ConfigError> {
    let tag = section.kind.ok_or(ConfigError::MissingField("model.type"))?.to_lowercase();
    let body = section.config;
    match tag.as_str() {
        "plane" => decode("model", &tag, body).map(SurfaceSource::Plane),
        "cilinder" | "cylinder" => decode("model", &tag, body).map(SurfaceSource::Cylinder),
        "objfile" => decode("model", &tag, body).map(SurfaceSource::ObjFile),
        _ => Err(ConfigError::NotImplemented {
            section: "model",
            tag,
        }),
    }
}

fn decode_curve(section: RawSection) -> std::result::Result<CurveSource, ConfigError> {
    let tag = section.kind.ok_or(ConfigError::MissingField("curve.type"))?.to_lowercase();
    let body = section.config;
    match tag.as_str() {
        "line" => decode::<LineSource>("curve", &tag, body).map(CurveSource::Line),
        "circumference" | "circle" => {
            decode::<CircleSource>("curve", &tag, body).map(CurveSource::Circle)
        }
        "spiral" => decode::<SpiralSource>("curve", &tag, body).map(CurveSource::Spiral),
        _ => Err(ConfigError::NotImplemented {
            section: "curve",
            tag,
        }),
    }
}

/// Lowercases every object key, recursively.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(k, v)| (k.to_lowercase(), lowercase_keys(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::MagneplotError;
    use crate::geometry::YawPitchRoll;

    fn round_trip(config: &Config) -> Config {
        Config::from_json(&config.to_json().unwrap()).unwrap()
    }

    #[test]
    fn round_trips_every_variant() {
        let mut obj = ObjFileSource::new("data/mesh.obj", true);
        obj.translation = Vector3::new(1.0, -2.0, 0.5);
        obj.rotation = YawPitchRoll {
            yaw: 0.1,
            pitch: 0.2,
            roll: 0.3,
        };
        let surfaces: Vec<SurfaceSource> = vec![
            PlaneSource::xy(2.0, 3.0, 4, 5).into(),
            CylinderSource::new(Point3::origin(), Vector3::z(), 1.0, 2.0, 8, 3).into(),
            CylinderSource::new(Point3::origin(), Vector3::z(), 1.0, 2.0, 8, 3)
                .with_start_towards(Vector3::y())
                .into(),
            obj.into(),
            ObjFileSource::new("data/plain.obj", false).into(),
        ];
        let curves: Vec<CurveSource> = vec![
            LineSource::new(Point3::origin(), Point3::new(0.0, 1.0, 0.0), 2).into(),
            CircleSource::new(Point3::new(1.0, 2.0, 3.0), Vector3::x(), 0.5, 16).into(),
            CircleSource::new(Point3::origin(), Vector3::x(), 0.5, 16)
                .with_start_towards(Vector3::z())
                .into(),
            SpiralSource::new(Point3::origin(), Vector3::y(), 0.8, 1.2, 0.3, 100).into(),
        ];
        for surface in &surfaces {
            for curve in &curves {
                let config = Config::new(surface.clone(), curve.clone()).with_current(2.5);
                assert_eq!(round_trip(&config), config);
            }
        }
    }

    #[test]
    fn keys_are_case_insensitive_and_defaults_apply() {
        let config = Config::from_json(
            r#"{
                "Model": { "Type": "Plane", "Config": {
                    "HorizontalVector": [1, 0, 0], "VerticalVector": [0, 1, 0],
                    "Width": 2, "Height": 2, "HorizontalSlices": 1, "VerticalSlices": 1
                } },
                "CURVE": { "type": "circumference", "config": {
                    "Direction": [0, 0, 1], "Radius": 1, "Segments": 8
                } }
            }"#,
        )
        .unwrap();
        assert_eq!(config.current, DEFAULT_CURRENT);
        let SurfaceSource::Plane(plane) = &config.model else {
            panic!("expected plane");
        };
        assert_eq!(plane.center, Point3::origin());
        let CurveSource::Circle(circle) = &config.curve else {
            panic!("expected circle");
        };
        assert_eq!(circle.start_towards, None);
    }

    #[test]
    fn zero_start_towards_behaves_as_absent() {
        let doc = |start: &str| {
            format!(
                r#"{{
                    "model": {{ "type": "cilinder", "config": {{
                        "direction": [0, 1, 0], "startTowards": {start}, "radius": 0.3,
                        "length": 1, "rotationalSlices": 6, "verticalSlices": 2
                    }} }},
                    "curve": {{ "type": "circumference", "config": {{
                        "direction": [0, 1, 0], "startTowards": {start}, "radius": 1, "segments": 8
                    }} }}
                }}"#
            )
        };
        let zero = Config::from_json(&doc("[0, 0, 0]")).unwrap();
        let absent = Config::from_json(&doc("null")).unwrap();
        assert_eq!(zero.name().unwrap(), absent.name().unwrap());
        assert_eq!(zero.curve.generate().unwrap(), absent.curve.generate().unwrap());
        assert_eq!(zero.model.generate().unwrap(), absent.model.generate().unwrap());
    }

    #[test]
    fn unknown_type_is_not_implemented() {
        let r = Config::from_json(
            r#"{"model": {"type": "sphere", "config": {}}, "curve": {"type": "line", "config": {}}}"#,
        );
        match r {
            Err(MagneplotError::Config(ConfigError::NotImplemented { section, tag })) => {
                assert_eq!(section, "model");
                assert_eq!(tag, "sphere");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_required_field_is_named() {
        let r = Config::from_json(
            r#"{"model": {"type": "plane", "config": {"horizontalvector": [1,0,0], "verticalvector": [0,1,0], "width": 1, "height": 1, "horizontalslices": 1, "verticalslices": 1}},
                "curve": {"type": "line", "config": {"from": [0,0,0], "segments": 3}}}"#,
        );
        let err = r.unwrap_err();
        assert!(matches!(
            err,
            MagneplotError::Config(ConfigError::Invalid { section: "curve", .. })
        ));
        assert!(err.to_string().contains("`to`"));
    }

    #[test]
    fn unknown_field_rejected() {
        let r = Config::from_json(
            r#"{"model": {"type": "objfile", "config": {"file": "a.obj", "colour": 3}},
                "curve": {"type": "line", "config": {"from": [0,0,0], "to": [1,0,0], "segments": 3}}}"#,
        );
        assert!(matches!(r, Err(MagneplotError::Config(ConfigError::Invalid { .. }))));

        let r = Config::from_json(
            r#"{"model": {"type": "objfile", "config": {"file": "a.obj"}},
                "curve": {"type": "line", "config": {"from": [0,0,0], "to": [1,0,0], "segments": 3}},
                "voltage": 3}"#,
        );
        assert!(matches!(r, Err(MagneplotError::Config(ConfigError::Json(_)))));
    }

    #[test]
    fn missing_section_rejected() {
        let r = Config::from_json(r#"{"model": {"type": "objfile", "config": {"file": "a.obj"}}}"#);
        assert!(matches!(
            r,
            Err(MagneplotError::Config(ConfigError::MissingField("curve")))
        ));
    }

    #[test]
    fn name_depends_on_current() {
        let a = Config::plane_preset();
        let b = Config::plane_preset().with_current(2.0);
        assert_eq!(a.name().unwrap(), Config::plane_preset().name().unwrap());
        assert_ne!(a.name().unwrap(), b.name().unwrap());
        assert!(a.name().unwrap().starts_with("Plane."));
        assert!(a.name().unwrap().contains("-Spiral."));
    }

    #[test]
    fn presets_encode() {
        for config in [
            Config::plane_preset(),
            Config::cylinder_preset(),
            Config::mesh_preset("data/carpincho.obj"),
        ] {
            assert_eq!(round_trip(&config), config);
        }
    }
}
