//! Per-frame data passed from the scene layer into the passes

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::render::material::MaterialHandle;
use crate::rhi::BufferHandle;

/// Standard interleaved vertex layout shared by every mesh in the pipeline
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// Object-space normal
    pub normal: [f32; 3],
    /// Texture coordinates
    pub texcoord: [f32; 2],
    /// Tangent for normal mapping
    pub tangent: [f32; 3],
    /// Bitangent for normal mapping
    pub bitangent: [f32; 3],
    /// Per-vertex color
    pub color: [f32; 4],
}

impl Vertex {
    /// Builds a vertex from position, normal and texcoord, with a flat
    /// tangent frame and white color
    pub fn new(position: Vec3, normal: Vec3, texcoord: Vec2) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
            texcoord: texcoord.into(),
            tangent: [1.0, 0.0, 0.0],
            bitangent: [0.0, 1.0, 0.0],
            color: [1.0, 1.0, 1.0, 1.0],
        }
    }
}

/// A single drawable: mesh buffers, material, and the world transform
/// stamped by scene collection
#[derive(Clone)]
pub struct Renderable {
    /// Vertex buffer for the mesh
    pub vertex_buffer: BufferHandle,
    /// Index buffer for the mesh
    pub index_buffer: BufferHandle,
    /// Number of indices to draw
    pub index_count: u32,
    /// Material that binds pipeline state and uniforms for this draw
    pub material: MaterialHandle,
    /// World transform, written during scene collection
    pub world_matrix: Mat4,
    /// Object-space bounding sphere radius, used for frustum culling
    pub bounding_radius: f32,
}

impl Renderable {
    /// Creates a renderable with an identity world matrix and unit
    /// bounding radius
    pub fn new(
        vertex_buffer: BufferHandle,
        index_buffer: BufferHandle,
        index_count: u32,
        material: MaterialHandle,
    ) -> Self {
        Self {
            vertex_buffer,
            index_buffer,
            index_count,
            material,
            world_matrix: Mat4::identity(),
            bounding_radius: 1.0,
        }
    }
}

/// A point light collected from the scene graph
///
/// `position` is world space; scene collection overwrites it from the
/// owning node's world matrix every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    /// World-space position
    pub position: Vec3,
    /// Linear RGB color
    pub color: Vec3,
    /// Brightness multiplier
    pub intensity: f32,
    /// Influence radius of the light volume
    pub radius: f32,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            color: Vec3::new(1.0, 1.0, 1.0),
            intensity: 1.0,
            radius: 10.0,
        }
    }
}

/// Everything a pass needs to know about the frame being rendered
#[derive(Clone)]
pub struct FrameContext {
    /// Camera view matrix
    pub view_matrix: Mat4,
    /// Camera projection matrix
    pub projection_matrix: Mat4,
    /// Camera world position
    pub camera_position: Vec3,
    /// Directional sun position (treated as a far point light by the
    /// lighting fallback)
    pub sun_position: Vec3,
    /// Sun color
    pub sun_color: Vec3,
    /// Light-space matrix for shadow mapping
    pub light_space_matrix: Mat4,
    /// Point lights collected from the scene this frame
    pub point_lights: Vec<PointLight>,
    /// Whether passes may drop draws outside the camera frustum
    pub enable_frustum_culling: bool,
}

impl Default for FrameContext {
    fn default() -> Self {
        Self {
            view_matrix: Mat4::identity(),
            projection_matrix: Mat4::identity(),
            camera_position: Vec3::zeros(),
            sun_position: Vec3::new(0.0, 100.0, 0.0),
            sun_color: Vec3::new(1.0, 1.0, 1.0),
            light_space_matrix: Mat4::identity(),
            point_lights: Vec::new(),
            enable_frustum_culling: true,
        }
    }
}

impl FrameContext {
    /// Combined view-projection matrix
    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}
