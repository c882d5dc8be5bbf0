//! Math utilities and types
//!
//! Provides the fundamental math types used by the scene graph, plus the
//! explicit modelview stack that every traversal threads through the tree.

pub use nalgebra::{Matrix3, Matrix4, Unit, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// Build a translation matrix.
pub fn translation(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_translation(&Vec3::new(x, y, z))
}

/// Build a rotation matrix from an angle in degrees and an axis.
///
/// The axis does not need to be normalized.
pub fn rotation_deg(angle_deg: f32, axis: Vec3) -> Mat4 {
    Mat4::from_axis_angle(&Unit::new_normalize(axis), angle_deg.to_radians())
}

/// Build a non-uniform scaling matrix.
pub fn scaling(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::new_nonuniform_scaling(&Vec3::new(x, y, z))
}

/// An explicit stack of 4x4 modelview matrices.
///
/// The top of the stack is the cumulative transform from the traversal root
/// down to the node currently being visited. Transform nodes duplicate the
/// top on entry, right-multiply their own matrices into it, and pop on exit
/// so siblings see the parent frame again.
///
/// The stack always holds at least one frame; [`MatrixStack::pop`] on the
/// base frame is a no-op rather than an error.
#[derive(Debug, Clone)]
pub struct MatrixStack {
    base: Mat4,
    frames: Vec<Mat4>,
}

impl MatrixStack {
    /// Create a stack seeded with the identity matrix.
    pub fn new() -> Self {
        Self::with_initial(Mat4::identity())
    }

    /// Create a stack seeded with an initial transform (typically the
    /// world-to-view matrix supplied by the caller each frame).
    pub fn with_initial(initial: Mat4) -> Self {
        Self {
            base: initial,
            frames: Vec::new(),
        }
    }

    /// Current cumulative transform.
    pub fn top(&self) -> &Mat4 {
        self.frames.last().unwrap_or(&self.base)
    }

    fn top_mut(&mut self) -> &mut Mat4 {
        self.frames.last_mut().unwrap_or(&mut self.base)
    }

    /// Duplicate the current top so it can be restored with [`MatrixStack::pop`].
    pub fn push(&mut self) {
        let top = *self.top();
        self.frames.push(top);
    }

    /// Restore the previously pushed frame. Popping the base frame does nothing.
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Right-multiply the top of the stack: `top = top * m`.
    pub fn apply(&mut self, m: &Mat4) {
        let top = self.top_mut();
        *top *= *m;
    }

    /// Replace the top of the stack.
    pub fn load(&mut self, m: Mat4) {
        *self.top_mut() = m;
    }

    /// Number of frames currently on the stack, counting the base frame.
    pub fn depth(&self) -> usize {
        self.frames.len() + 1
    }
}

impl Default for MatrixStack {
    fn default() -> Self {
        Self::new()
    }
}
