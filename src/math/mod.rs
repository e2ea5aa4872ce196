pub mod hash;
pub mod summation;

pub use hash::{string_hash, NameHasher, StableHash};
pub use summation::pairwise_sum;

use crate::error::{GeometryError, Result};

/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// Unit quaternion used for rotations about arbitrary axes.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// A reference vector whose projection on the direction exceeds this share of
/// its own length is rejected as parallel.
pub const PARALLEL_THRESHOLD: f64 = 0.9;

/// Linear interpolation between `min` and `max` at `step` in `[0, 1]`.
#[must_use]
pub fn lerp(min: f64, max: f64, step: f64) -> f64 {
    min * (1.0 - step) + max * step
}

/// Signed area of a triangle projected onto the XY plane.
///
/// Positive for counter-clockwise winding when viewed from +Z. The Z
/// components are ignored entirely.
#[must_use]
pub fn signed_area_xy(v1: &Point3, v2: &Point3, v3: &Point3) -> f64 {
    (v1.x * (v2.y - v3.y) + v2.x * (v3.y - v1.y) + v3.x * (v1.y - v2.y)) / 2.0
}

/// Unsigned area of a triangle in 3D.
#[must_use]
pub fn triangle_area(v1: &Point3, v2: &Point3, v3: &Point3) -> f64 {
    (v2 - v1).cross(&(v3 - v1)).norm() * 0.5
}

/// Normalizes `v`, failing on zero length.
///
/// # Errors
///
/// Returns [`GeometryError::ZeroVector`] naming `what` if `v` has no length.
pub fn normalize(v: &Vector3, what: &'static str) -> Result<Vector3> {
    let len = v.norm();
    if len < TOLERANCE {
        return Err(GeometryError::ZeroVector(what).into());
    }
    Ok(v / len)
}

/// Finds a unit vector perpendicular to the unit vector `direction`.
///
/// Picks the standard basis vector least aligned with `direction` and removes
/// its projection (one Gram-Schmidt step).
#[must_use]
pub fn any_normal_to(direction: &Vector3) -> Vector3 {
    let abs = direction.abs();
    let basis = if abs.x <= abs.y && abs.x <= abs.z {
        Vector3::x()
    } else if abs.y <= abs.z {
        Vector3::y()
    } else {
        Vector3::z()
    };
    (basis - direction * basis.dot(direction)).normalize()
}

/// Makes `reference` a unit vector perpendicular to the unit vector
/// `direction`.
///
/// A missing or zero-length reference is derived via [`any_normal_to`].
///
/// # Errors
///
/// Returns [`GeometryError::ParallelReference`] if the reference is nearly
/// parallel to `direction`.
pub fn orthogonal_reference(
    direction: &Vector3,
    reference: Option<&Vector3>,
    names: (&'static str, &'static str),
) -> Result<Vector3> {
    let len = reference.map_or(0.0, |r| r.norm());
    let Some(reference) = reference.filter(|_| len >= TOLERANCE) else {
        return Ok(any_normal_to(direction));
    };
    let (reference_name, direction_name) = names;

    let d = reference.dot(direction);
    if d.abs() > PARALLEL_THRESHOLD * len {
        return Err(GeometryError::ParallelReference {
            reference: reference_name,
            direction: direction_name,
        }
        .into());
    }

    normalize(&(reference - direction * d), reference_name)
}

/// Rotates `v` about the unit axis `axis` by `angle` radians (right-hand rule).
#[must_use]
pub fn rotate_about(v: &Vector3, axis: &Vector3, angle: f64) -> Vector3 {
    let axis = nalgebra::Unit::new_unchecked(*axis);
    UnitQuaternion::from_axis_angle(&axis, angle) * v
}

/// Checks that a slice count is at least one.
///
/// # Errors
///
/// Returns [`GeometryError::ParameterOutOfRange`] when `value` is zero.
pub fn require_segments(parameter: &'static str, value: u32) -> Result<()> {
    if value == 0 {
        return Err(GeometryError::ParameterOutOfRange {
            parameter,
            value: 0.0,
            min: 1.0,
            max: f64::from(u32::MAX),
        }
        .into());
    }
    Ok(())
}
