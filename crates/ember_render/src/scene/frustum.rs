//! View-frustum culling
//!
//! Planes are extracted directly from a view-projection matrix (the
//! Gribb/Hartmann method), so the same code handles perspective and
//! orthographic cameras. Objects are tested as world-space bounding
//! spheres with a conservative radius under non-uniform scale.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::frame::{FrameContext, Renderable};

/// Smallest world radius an object can cull with
///
/// Keeps zero-scaled or degenerate objects from being culled while they
/// still occupy a pixel.
const MIN_WORLD_RADIUS: f32 = 0.001;

/// A plane in constant-normal form: `dot(normal, p) + distance = 0`
///
/// Normals point inward; a positive signed distance means inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrustumPlane {
    /// Inward-facing unit normal
    pub normal: Vec3,
    /// Signed distance term
    pub distance: f32,
}

impl Default for FrustumPlane {
    fn default() -> Self {
        Self {
            normal: Vec3::new(0.0, 1.0, 0.0),
            distance: 0.0,
        }
    }
}

impl FrustumPlane {
    fn from_coefficients(a: f32, b: f32, c: f32, d: f32) -> Self {
        let normal = Vec3::new(a, b, c);
        let length = normal.magnitude();
        if length <= f32::EPSILON {
            // Degenerate row combination, fall back to a harmless plane
            return Self::default();
        }
        Self {
            normal: normal / length,
            distance: d / length,
        }
    }

    /// Signed distance from `point` to the plane
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(&point) + self.distance
    }
}

/// Extracts the six frustum planes from a view-projection matrix
///
/// Order: left, right, bottom, top, near, far.
pub fn extract_planes(view_projection: &Mat4) -> [FrustumPlane; 6] {
    let row = |i: usize| {
        let r = view_projection.row(i);
        (r[0], r[1], r[2], r[3])
    };
    let (m0a, m0b, m0c, m0d) = row(0);
    let (m1a, m1b, m1c, m1d) = row(1);
    let (m2a, m2b, m2c, m2d) = row(2);
    let (m3a, m3b, m3c, m3d) = row(3);

    [
        FrustumPlane::from_coefficients(m3a + m0a, m3b + m0b, m3c + m0c, m3d + m0d),
        FrustumPlane::from_coefficients(m3a - m0a, m3b - m0b, m3c - m0c, m3d - m0d),
        FrustumPlane::from_coefficients(m3a + m1a, m3b + m1b, m3c + m1c, m3d + m1d),
        FrustumPlane::from_coefficients(m3a - m1a, m3b - m1b, m3c - m1c, m3d - m1d),
        FrustumPlane::from_coefficients(m3a + m2a, m3b + m2b, m3c + m2c, m3d + m2d),
        FrustumPlane::from_coefficients(m3a - m2a, m3b - m2b, m3c - m2c, m3d - m2d),
    ]
}

/// Whether a world-space sphere intersects or lies inside the frustum
pub fn is_sphere_visible(planes: &[FrustumPlane; 6], center: Vec3, radius: f32) -> bool {
    planes
        .iter()
        .all(|plane| plane.signed_distance(center) >= -radius)
}

/// Filters a draw list down to renderables whose bounding spheres touch
/// the camera frustum
///
/// Returns the input unchanged when culling is disabled in the context or
/// the list is empty.
pub fn cull_by_camera_frustum(context: &FrameContext, renderables: &[Renderable]) -> Vec<Renderable> {
    if !context.enable_frustum_culling || renderables.is_empty() {
        return renderables.to_vec();
    }

    let planes = extract_planes(&context.view_projection());
    let survivors: Vec<Renderable> = renderables
        .iter()
        .filter(|r| {
            let center = r.world_matrix.translation();
            let radius =
                (r.bounding_radius * r.world_matrix.max_axis_scale()).max(MIN_WORLD_RADIUS);
            is_sphere_visible(&planes, center, radius)
        })
        .cloned()
        .collect();

    log::trace!(
        "frustum culling: {} of {} renderables visible",
        survivors.len(),
        renderables.len()
    );
    survivors
}
