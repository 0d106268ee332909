//! Additional math helpers layered on top of `glam`.

use glam::DVec2;

use crate::{
    config::{COLLINEARITY_THRESHOLD, EPSILON},
    error::{CollisionError, Result},
};

/// 2D vector used across the engine.
pub type Vector = DVec2;

pub const UP: Vector = DVec2::new(0.0, 1.0);
pub const DOWN: Vector = DVec2::new(0.0, -1.0);
pub const LEFT: Vector = DVec2::new(-1.0, 0.0);
pub const RIGHT: Vector = DVec2::new(1.0, 0.0);
pub const ZERO: Vector = DVec2::ZERO;

/// Operations the engine needs on top of [`DVec2`].
pub trait VectorExt: Sized {
    /// Rotates counter-clockwise by `angle` degrees.
    fn rotate_degrees(self, angle: f64) -> Self;
    fn rotate_radians(self, angle: f64) -> Self;
    /// Rotates the point around `base` by `angle` degrees.
    fn rotate_around_degrees(self, angle: f64, base: Self) -> Self;
    fn rotate_around_radians(self, angle: f64, base: Self) -> Self;
    /// Z component of the 3D cross product.
    fn cross(self, other: Self) -> f64;
    fn try_normalize_checked(self) -> Result<Self>;
    fn try_project_onto(self, axis: Self) -> Result<Self>;
    /// Unsigned angle between two vectors, in degrees.
    fn angle_degrees_to(self, other: Self) -> Result<f64>;
    fn collinear_to(self, other: Self) -> bool;
    fn approx_eq(self, other: Self) -> bool;
    fn is_degenerate(self) -> bool;
}

impl VectorExt for DVec2 {
    fn rotate_degrees(self, angle: f64) -> Self {
        self.rotate_radians(angle.to_radians())
    }

    fn rotate_radians(self, angle: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        DVec2::new(self.x * cos - self.y * sin, self.x * sin + self.y * cos)
    }

    fn rotate_around_degrees(self, angle: f64, base: Self) -> Self {
        self.rotate_around_radians(angle.to_radians(), base)
    }

    fn rotate_around_radians(self, angle: f64, base: Self) -> Self {
        base + (self - base).rotate_radians(angle)
    }

    fn cross(self, other: Self) -> f64 {
        self.perp_dot(other)
    }

    fn try_normalize_checked(self) -> Result<Self> {
        if self.is_degenerate() {
            return Err(CollisionError::DegenerateVector);
        }
        Ok(self / self.length())
    }

    fn try_project_onto(self, axis: Self) -> Result<Self> {
        if axis.is_degenerate() {
            return Err(CollisionError::DegenerateVector);
        }
        Ok(axis * (self.dot(axis) / axis.length_squared()))
    }

    fn angle_degrees_to(self, other: Self) -> Result<f64> {
        if self.is_degenerate() || other.is_degenerate() {
            return Err(CollisionError::DegenerateVector);
        }
        let cosine = (self.dot(other) / (self.length() * other.length())).clamp(-1.0, 1.0);
        Ok(cosine.acos().to_degrees())
    }

    fn collinear_to(self, other: Self) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }
        let sine = self.cross(other).abs() / (self.length() * other.length());
        sine < COLLINEARITY_THRESHOLD
    }

    fn approx_eq(self, other: Self) -> bool {
        (self.x - other.x).abs() < EPSILON && (self.y - other.y).abs() < EPSILON
    }

    fn is_degenerate(self) -> bool {
        self.length_squared() < EPSILON * EPSILON
    }
}

/// Wraps an angle in degrees into `[0, 360)`.
pub fn adjust_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

pub fn distance(a: Vector, b: Vector) -> f64 {
    (b - a).length()
}

pub fn squared_distance(a: Vector, b: Vector) -> f64 {
    (b - a).length_squared()
}

/// Returns the angle of `direction` measured counter-clockwise from +X, in `[0, 360)`.
pub fn heading(direction: Vector) -> Result<f64> {
    if direction.is_degenerate() {
        return Err(CollisionError::DegenerateVector);
    }
    Ok(adjust_angle(direction.y.atan2(direction.x).to_degrees()))
}
