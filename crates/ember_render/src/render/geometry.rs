//! Procedural geometry used by the pipeline itself
//!
//! The lighting pass draws point lights as instanced unit spheres and the
//! post-process stage can fall back to a quad on backends without
//! bufferless fullscreen draws. Both builders upload straight to the
//! device and hand back ready-to-bind buffers.

use bytemuck::cast_slice;

use crate::foundation::math::constants::PI;
use crate::foundation::math::{Vec2, Vec3};
use crate::render::frame::Vertex;
use crate::render::RenderResult;
use crate::rhi::{BufferHandle, BufferKind, BufferUsage, Device};

/// GPU-resident mesh: the buffers plus the index count to draw
#[derive(Clone)]
pub struct GpuMesh {
    /// Vertex buffer
    pub vertex_buffer: BufferHandle,
    /// Index buffer
    pub index_buffer: BufferHandle,
    /// Number of indices
    pub index_count: u32,
}

fn upload(device: &dyn Device, vertices: &[Vertex], indices: &[u32]) -> RenderResult<GpuMesh> {
    let vertex_bytes: &[u8] = cast_slice(vertices);
    let index_bytes: &[u8] = cast_slice(indices);
    let vertex_buffer = device.create_buffer(
        BufferKind::Vertex,
        BufferUsage::Static,
        vertex_bytes.len() as u32,
        Some(vertex_bytes),
    )?;
    let index_buffer = device.create_buffer(
        BufferKind::Index,
        BufferUsage::Static,
        index_bytes.len() as u32,
        Some(index_bytes),
    )?;
    Ok(GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: indices.len() as u32,
    })
}

/// Builds a unit UV sphere (radius 1, 64 stacks x 64 slices)
///
/// The resolution matches what the lighting pass needs for light volumes
/// to read as round at any on-screen size.
pub fn create_sphere(device: &dyn Device) -> RenderResult<GpuMesh> {
    const STACKS: u32 = 64;
    const SLICES: u32 = 64;

    let mut vertices = Vec::with_capacity(((STACKS + 1) * (SLICES + 1)) as usize);
    for stack in 0..=STACKS {
        let v = stack as f32 / STACKS as f32;
        let phi = v * PI;
        for slice in 0..=SLICES {
            let u = slice as f32 / SLICES as f32;
            let theta = u * 2.0 * PI;
            let position = Vec3::new(
                phi.sin() * theta.cos(),
                phi.cos(),
                phi.sin() * theta.sin(),
            );
            // Unit sphere: the normal is the position
            vertices.push(Vertex::new(position, position, Vec2::new(u, 1.0 - v)));
        }
    }

    let mut indices = Vec::with_capacity((STACKS * SLICES * 6) as usize);
    for stack in 0..STACKS {
        for slice in 0..SLICES {
            let row0 = stack * (SLICES + 1) + slice;
            let row1 = row0 + SLICES + 1;
            indices.extend_from_slice(&[row0, row1, row0 + 1, row0 + 1, row1, row1 + 1]);
        }
    }

    upload(device, &vertices, &indices)
}

/// Builds a unit quad in the XY plane, facing +Z
pub fn create_quad(device: &dyn Device) -> RenderResult<GpuMesh> {
    let normal = Vec3::new(0.0, 0.0, 1.0);
    let vertices = [
        Vertex::new(Vec3::new(-1.0, -1.0, 0.0), normal, Vec2::new(0.0, 0.0)),
        Vertex::new(Vec3::new(1.0, -1.0, 0.0), normal, Vec2::new(1.0, 0.0)),
        Vertex::new(Vec3::new(1.0, 1.0, 0.0), normal, Vec2::new(1.0, 1.0)),
        Vertex::new(Vec3::new(-1.0, 1.0, 0.0), normal, Vec2::new(0.0, 1.0)),
    ];
    let indices = [0u32, 1, 2, 2, 3, 0];
    upload(device, &vertices, &indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::NullDevice;

    #[test]
    fn test_sphere_index_count() {
        let device = NullDevice::new();
        let mesh = create_sphere(&device).unwrap();
        assert_eq!(mesh.index_count, 64 * 64 * 6);
        assert_eq!(device.buffers_created(), 2);
    }

    #[test]
    fn test_quad_draws_two_triangles() {
        let device = NullDevice::new();
        let mesh = create_quad(&device).unwrap();
        assert_eq!(mesh.index_count, 6);
    }
}
