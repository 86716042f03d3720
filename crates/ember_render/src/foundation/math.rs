//! Math utilities and types
//!
//! Provides the fundamental math types used throughout the renderer.
//! Thin aliases over nalgebra keep call sites short and make it possible
//! to swap the underlying math crate without touching the rest of the code.

pub use nalgebra::{Matrix3, Matrix4, Quaternion, Unit, Vector2, Vector3, Vector4};

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

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Convert degrees to radians
#[inline]
#[must_use]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * constants::DEG_TO_RAD
}

/// Extension trait for [`Mat4`] with graphics-oriented constructors
pub trait Mat4Ext {
    /// Create a right-handed perspective projection matrix (OpenGL-style
    /// clip space, depth mapped to [-1, 1])
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed orthographic projection matrix
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Extract the translation column as a [`Vec3`]
    fn translation(&self) -> Vec3;

    /// Largest scale factor among the three basis vectors
    ///
    /// Used to turn a local-space bounding radius into a conservative
    /// world-space radius under non-uniform scaling.
    fn max_axis_scale(&self) -> f32;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_perspective(aspect, fov_y, near, far)
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        Mat4::new_orthographic(left, right, bottom, top, near, far)
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }

    fn max_axis_scale(&self) -> f32 {
        let sx = Vec3::new(self.m11, self.m21, self.m31).magnitude();
        let sy = Vec3::new(self.m12, self.m22, self.m32).magnitude();
        let sz = Vec3::new(self.m13, self.m23, self.m33).magnitude();
        sx.max(sy).max(sz)
    }
}
