//! Light source description
//!
//! A light can be attached to any node in the scene graph; it illuminates in
//! the coordinate system of the node that carries it. Position and spot
//! direction are homogeneous vectors so one type covers point lights (w = 1),
//! directional lights (w = 0), and spotlights (cutoff < 180 degrees).

use crate::foundation::math::{Mat4, Vec3, Vec4};

/// A single light source: colors, a homogeneous position/direction, and the
/// spotlight cone parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    ambient: Vec3,
    diffuse: Vec3,
    specular: Vec3,
    position: Vec4,
    spot_direction: Vec4,
    spot_cutoff: f32,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            ambient: Vec3::zeros(),
            diffuse: Vec3::zeros(),
            specular: Vec3::zeros(),
            position: Vec4::new(0.0, 0.0, 0.0, 1.0),
            spot_direction: Vec4::new(0.0, 0.0, 0.0, 0.0),
            spot_cutoff: 0.0,
        }
    }
}

impl Light {
    /// Create a light with all colors black, positioned at the local origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the ambient color.
    pub fn set_ambient(&mut self, r: f32, g: f32, b: f32) {
        self.ambient = Vec3::new(r, g, b);
    }

    /// Set the diffuse color.
    pub fn set_diffuse(&mut self, r: f32, g: f32, b: f32) {
        self.diffuse = Vec3::new(r, g, b);
    }

    /// Set the specular color.
    pub fn set_specular(&mut self, r: f32, g: f32, b: f32) {
        self.specular = Vec3::new(r, g, b);
    }

    /// Place the light at a point (w = 1).
    pub fn set_position(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec4::new(x, y, z, 1.0);
    }

    /// Make the light directional (w = 0); `(x, y, z)` is the direction the
    /// light travels.
    pub fn set_direction(&mut self, x: f32, y: f32, z: f32) {
        self.position = Vec4::new(x, y, z, 0.0);
    }

    /// Set the spotlight axis (always w = 0).
    pub fn set_spot_direction(&mut self, x: f32, y: f32, z: f32) {
        self.spot_direction = Vec4::new(x, y, z, 0.0);
    }

    /// Set the spotlight half-angle in degrees. Zero means "not a spotlight";
    /// see [`Light::effective_cutoff`].
    pub fn set_spot_angle(&mut self, degrees: f32) {
        self.spot_cutoff = degrees;
    }

    /// Ambient color.
    pub fn ambient(&self) -> Vec3 {
        self.ambient
    }

    /// Diffuse color.
    pub fn diffuse(&self) -> Vec3 {
        self.diffuse
    }

    /// Specular color.
    pub fn specular(&self) -> Vec3 {
        self.specular
    }

    /// Homogeneous position: w = 1 for point lights, w = 0 for directional.
    pub fn position(&self) -> Vec4 {
        self.position
    }

    /// Spotlight axis (w = 0).
    pub fn spot_direction(&self) -> Vec4 {
        self.spot_direction
    }

    /// Raw spotlight cutoff in degrees; 0 is the "not a spotlight" sentinel.
    pub fn spot_cutoff(&self) -> f32 {
        self.spot_cutoff
    }

    /// Cutoff angle ready for shader upload: the 0 sentinel becomes a full
    /// 180-degree cone.
    pub fn effective_cutoff(&self) -> f32 {
        if self.spot_cutoff == 0.0 {
            180.0
        } else {
            self.spot_cutoff
        }
    }

    /// Copy of this light carried into the frame described by `m`.
    ///
    /// The position transforms as a homogeneous vector (its w is preserved,
    /// so directional lights stay directional); the spot direction is forced
    /// back to w = 0 so it can never pick up a translation.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let mut out = self.clone();
        out.position = m * self.position;
        let mut dir = m * self.spot_direction;
        dir.w = 0.0;
        out.spot_direction = dir;
        out
    }
}

/// Sequential light-slot allocator scoped to a single lighting pass.
///
/// A fresh allocator is created for every pass, so slot numbering restarts at
/// zero each frame by construction and cannot leak across frames.
#[derive(Debug, Default)]
pub struct LightSlots {
    next: u32,
}

impl LightSlots {
    /// Start a new pass with slot numbering at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next slot index.
    pub fn allocate(&mut self) -> u32 {
        let slot = self.next;
        self.next += 1;
        slot
    }

    /// Number of slots handed out so far.
    pub fn count(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::translation;
    use approx::assert_relative_eq;

    #[test]
    fn cutoff_sentinel_normalizes_to_half_space() {
        let mut light = Light::new();
        assert_relative_eq!(light.effective_cutoff(), 180.0);
        light.set_spot_angle(25.0);
        assert_relative_eq!(light.effective_cutoff(), 25.0);
    }

    #[test]
    fn transformed_moves_points_but_not_directions() {
        let mut point = Light::new();
        point.set_position(1.0, 0.0, 0.0);
        let moved = point.transformed(&translation(0.0, 2.0, 0.0));
        assert_relative_eq!(moved.position(), Vec4::new(1.0, 2.0, 0.0, 1.0), epsilon = 1e-6);

        let mut directional = Light::new();
        directional.set_direction(0.0, -1.0, 0.0);
        let moved = directional.transformed(&translation(0.0, 2.0, 0.0));
        // w = 0 vectors are immune to translation
        assert_relative_eq!(moved.position(), Vec4::new(0.0, -1.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn spot_direction_keeps_w_zero() {
        let mut light = Light::new();
        light.set_spot_direction(0.0, 0.0, -1.0);
        let moved = light.transformed(&translation(3.0, 3.0, 3.0));
        assert_relative_eq!(
            moved.spot_direction(),
            Vec4::new(0.0, 0.0, -1.0, 0.0),
            epsilon = 1e-6
        );
    }

    #[test]
    fn slots_are_sequential_from_zero() {
        let mut slots = LightSlots::new();
        assert_eq!(slots.allocate(), 0);
        assert_eq!(slots.allocate(), 1);
        assert_eq!(slots.allocate(), 2);
        assert_eq!(slots.count(), 3);
    }
}
