//! # Transforms and Materials
//!
//! Cumulative placement and surface state carried by evaluation contexts.
//!
//! A context actually holds two transforms: the block's own placement
//! (`position`/`orientation`/`size` properties) and a *cursor* that the
//! `translate`/`rotate`/`scale` commands advance between children. Geometry
//! is hierarchical, so each node only stores its local matrix.

use crate::value::{Color, Rotation, Texture};
use config::constants::DEFAULT_OPACITY;
use glam::{DMat4, DQuat, DVec3, EulerRot};

/// An offset/orientation/scale triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// Translation component.
    pub offset: DVec3,
    /// Orientation component.
    pub rotation: DQuat,
    /// Scale component; never zero in any axis.
    pub scale: DVec3,
}

impl Transform {
    /// The identity transform.
    pub fn identity() -> Self {
        Self {
            offset: DVec3::ZERO,
            rotation: DQuat::IDENTITY,
            scale: DVec3::ONE,
        }
    }

    /// True when this transform moves nothing.
    pub fn is_identity(&self) -> bool {
        *self == Self::identity()
    }

    /// The equivalent matrix.
    pub fn matrix(&self) -> DMat4 {
        DMat4::from_scale_rotation_translation(self.scale, self.rotation, self.offset)
    }

    /// Move by `v` in the local (rotated, scaled) frame.
    pub fn translate(&mut self, v: DVec3) {
        self.offset += self.rotation * (v * self.scale);
    }

    /// Compose a further rotation.
    pub fn rotate(&mut self, rotation: Rotation) {
        self.rotation *= quaternion(rotation);
    }

    /// Multiply the scale.
    pub fn scale_by(&mut self, v: DVec3) {
        self.scale *= v;
    }

    /// Apply this transform to a point.
    pub fn apply(&self, point: DVec3) -> DVec3 {
        self.offset + self.rotation * (point * self.scale)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Convert a half-turn rotation to a quaternion.
///
/// Roll turns about Z, pitch about Y, yaw about X, each negated, which makes
/// `rotate r.z r.y r.x` with `r = degrees / -180` match the source
/// dialect's `Rz·Ry·Rx` convention exactly.
pub fn quaternion(rotation: Rotation) -> DQuat {
    DQuat::from_euler(
        EulerRot::ZYX,
        -rotation.roll * std::f64::consts::PI,
        -rotation.pitch * std::f64::consts::PI,
        -rotation.yaw * std::f64::consts::PI,
    )
}

/// Surface state: color, texture, opacity.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    /// Current color, if one was set.
    pub color: Option<Color>,
    /// Current texture, if one was set.
    pub texture: Option<Texture>,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            color: None,
            texture: None,
            opacity: DEFAULT_OPACITY,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
