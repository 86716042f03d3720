//! Materials: the bridge between renderables and pipeline state
//!
//! Passes drive materials through a narrow contract: stuff per-draw
//! parameters in with [`Material::set_parameter`], then [`Material::bind`]
//! to make the pipeline state and uniforms current on the command buffer.
//! Concrete materials (textured PBR, skybox, ...) live with the
//! application; [`MaterialInstance`] is the built-in parameter-store
//! implementation used as a per-object overlay and by tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::foundation::math::{Mat4, Vec3, Vec4};
use crate::rhi::{CommandBuffer, TextureHandle, UniformValue};

/// Shared, mutable material handle
///
/// Materials are mutated every draw (matrix parameters change per object)
/// while being shared between many renderables, hence `Rc<RefCell<..>>`.
pub type MaterialHandle = Rc<RefCell<dyn Material>>;

/// A parameter value a pass can hand to a material
#[derive(Clone)]
pub enum MaterialValue {
    /// Scalar parameter
    Float(f32),
    /// 3-component vector parameter
    Vec3(Vec3),
    /// 4-component vector parameter
    Vec4(Vec4),
    /// Matrix parameter
    Mat4(Mat4),
    /// Texture parameter, bound to a sampler slot at bind time
    Texture(TextureHandle),
}

// Texture handles are trait objects without a `Debug` bound, so the
// texture variant prints opaquely.
impl std::fmt::Debug for MaterialValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Vec3(v) => f.debug_tuple("Vec3").field(v).finish(),
            Self::Vec4(v) => f.debug_tuple("Vec4").field(v).finish(),
            Self::Mat4(m) => f.debug_tuple("Mat4").field(m).finish(),
            Self::Texture(_) => f.write_str("Texture(..)"),
        }
    }
}

/// Contract every material implements
///
/// The pipeline sets the well-known parameters `"model"`, `"view"`,
/// `"projection"`, `"lightSpaceMatrix"`, `"shadowMap"`, `"lightPosition"`,
/// `"lightColor"` and `"camPos"` before binding; materials are free to
/// ignore the ones they don't consume.
pub trait Material {
    /// Makes this material's pipeline state, textures and uniforms current
    fn bind(&self, cmd: &mut dyn CommandBuffer);

    /// Stores or overwrites a named parameter
    fn set_parameter(&mut self, name: &str, value: MaterialValue);

    /// Material name, for logs
    fn name(&self) -> &str;
}

/// A material that stores parameters and defers everything else to a
/// parent material
///
/// Binding binds the parent first, then replays this instance's overrides.
/// With no parent it is a standalone parameter store, which is how the
/// null-backend tests use it.
pub struct MaterialInstance {
    name: String,
    parent: Option<MaterialHandle>,
    parameters: HashMap<String, MaterialValue>,
}

impl MaterialInstance {
    /// Creates a standalone parameter-store material
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            parameters: HashMap::new(),
        }
    }

    /// Creates an instance deriving from `parent`
    pub fn with_parent(name: impl Into<String>, parent: MaterialHandle) -> Self {
        Self {
            name: name.into(),
            parent: Some(parent),
            parameters: HashMap::new(),
        }
    }

    /// Wraps a material in the shared handle the renderer passes around
    pub fn into_handle(self) -> MaterialHandle {
        Rc::new(RefCell::new(self))
    }

    /// Reads back a stored parameter, if present
    pub fn parameter(&self, name: &str) -> Option<MaterialValue> {
        self.parameters.get(name).cloned()
    }

    fn apply_parameters(&self, cmd: &mut dyn CommandBuffer) {
        // Texture slots are assigned in insertion-independent name order so
        // repeated binds are deterministic.
        let mut names: Vec<&String> = self.parameters.keys().collect();
        names.sort();
        let mut texture_slot = 0;
        for name in names {
            match &self.parameters[name] {
                MaterialValue::Float(v) => {
                    cmd.set_uniform(uniform_location(name), UniformValue::Float(*v));
                }
                MaterialValue::Vec3(v) => {
                    cmd.set_uniform(uniform_location(name), UniformValue::Vec3(*v));
                }
                MaterialValue::Vec4(v) => {
                    cmd.set_uniform(uniform_location(name), UniformValue::Vec4(*v));
                }
                MaterialValue::Mat4(m) => {
                    cmd.set_uniform(uniform_location(name), UniformValue::Mat4(*m));
                }
                MaterialValue::Texture(texture) => {
                    cmd.bind_texture(texture_slot, texture);
                    texture_slot += 1;
                }
            }
        }
    }
}

impl Material for MaterialInstance {
    fn bind(&self, cmd: &mut dyn CommandBuffer) {
        if let Some(parent) = &self.parent {
            parent.borrow().bind(cmd);
        }
        self.apply_parameters(cmd);
    }

    fn set_parameter(&mut self, name: &str, value: MaterialValue) {
        self.parameters.insert(name.to_string(), value);
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Maps the well-known parameter names to stable uniform locations
///
/// Backends that resolve uniforms by name can ignore these; the null
/// backend journals them so tests can assert which parameter was set.
pub fn uniform_location(name: &str) -> u32 {
    match name {
        "model" => 0,
        "view" => 1,
        "projection" => 2,
        "lightSpaceMatrix" => 3,
        "lightPosition" => 4,
        "lightColor" => 5,
        "camPos" => 6,
        "exposure" => 7,
        "lightRadius" => 8,
        "lightIntensity" => 9,
        "invViewProjection" => 10,
        "shadowMap" => 11,
        other => {
            // Unknown names hash into a private range above the well-known
            // block so they never collide with it.
            let mut h: u32 = 0;
            for b in other.bytes() {
                h = h.wrapping_mul(31).wrapping_add(u32::from(b));
            }
            64 + (h % 1024)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rhi::{Device as _, NullDevice, RecordedCommand};

    #[test]
    fn test_instance_stores_and_reads_parameters() {
        let mut mat = MaterialInstance::new("test");
        mat.set_parameter("exposure", MaterialValue::Float(1.5));
        match mat.parameter("exposure") {
            Some(MaterialValue::Float(v)) => assert_eq!(v, 1.5),
            other => panic!("unexpected parameter: {other:?}"),
        }
        assert!(mat.parameter("missing").is_none());
    }

    #[test]
    fn test_bind_replays_parent_then_overrides() {
        let device = NullDevice::new();
        let mut parent = MaterialInstance::new("parent");
        parent.set_parameter("exposure", MaterialValue::Float(1.0));
        let parent = parent.into_handle();

        let mut instance = MaterialInstance::with_parent("child", parent);
        instance.set_parameter("exposure", MaterialValue::Float(2.0));

        let mut cmd = device.create_command_buffer();
        cmd.begin();
        instance.bind(cmd.as_mut());
        cmd.end();
        device.submit(cmd.as_mut());

        let journal = device.take_journal();
        let exposure_writes: Vec<_> = journal
            .iter()
            .filter_map(|c| match c {
                RecordedCommand::SetUniform(loc, crate::rhi::UniformValue::Float(v))
                    if *loc == uniform_location("exposure") =>
                {
                    Some(*v)
                }
                _ => None,
            })
            .collect();
        assert_eq!(exposure_writes, vec![1.0, 2.0]);
    }

    #[test]
    fn test_material_value_debug_renders_textures_opaquely() {
        let device = NullDevice::new();
        let tex = device
            .create_texture(2, 2, crate::rhi::PixelFormat::Rgba8Unorm, None)
            .unwrap();
        assert_eq!(format!("{:?}", MaterialValue::Texture(tex)), "Texture(..)");
        assert_eq!(format!("{:?}", MaterialValue::Float(0.5)), "Float(0.5)");
    }

    #[test]
    fn test_well_known_locations_are_distinct() {
        let names = [
            "model",
            "view",
            "projection",
            "lightSpaceMatrix",
            "lightPosition",
            "lightColor",
            "camPos",
            "exposure",
            "lightRadius",
            "lightIntensity",
            "invViewProjection",
            "shadowMap",
        ];
        let mut seen = std::collections::HashSet::new();
        for name in names {
            assert!(seen.insert(uniform_location(name)), "collision on {name}");
        }
    }
}
