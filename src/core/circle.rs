use serde::{Deserialize, Serialize};

use super::aabb::Aabb;
use crate::{
    error::{CollisionError, Result},
    utils::math::{squared_distance, Vector, VectorExt},
};

/// Solid circle described by its center and radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    center: Vector,
    radius: f64,
}

impl Circle {
    pub fn new(center: Vector, radius: f64) -> Result<Self> {
        if !(radius > 0.0) {
            return Err(CollisionError::InvalidRadius(radius));
        }

        Ok(Self { center, radius })
    }

    pub fn center(&self) -> Vector {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn translate(&mut self, direction: Vector) -> Vector {
        self.center += direction;
        self.center
    }

    pub fn set_position(&mut self, position: Vector) -> Vector {
        self.center = position;
        self.center
    }

    pub fn contains_point(&self, point: Vector) -> bool {
        squared_distance(self.center, point) <= self.radius * self.radius
    }

    pub fn aabb(&self) -> Aabb {
        Aabb::from_center(self.center, Vector::splat(self.radius))
    }

    /// Point of the disk closest to `point`; points inside map to themselves.
    pub fn closest_point(&self, point: Vector) -> Vector {
        if self.contains_point(point) {
            return point;
        }

        match (point - self.center).try_normalize_checked() {
            Ok(direction) => self.center + direction * self.radius,
            Err(_) => self.center,
        }
    }
}
