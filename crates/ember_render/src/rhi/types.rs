//! Shared RHI value types
//!
//! Plain-data enums and flag sets exchanged across the resource-abstraction
//! boundary. Everything here is backend-agnostic: the concrete graphics
//! backend maps these onto its own API constants.

use bitflags::bitflags;

use crate::foundation::math::{Mat4, Vec2, Vec3, Vec4};

/// Supported texture pixel formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// Standard 8-bit per channel RGBA. Used for albedo and emissive targets.
    Rgba8Unorm,
    /// 16-bit float per channel RGBA. Used for HDR color and normals.
    Rgba16Float,
    /// Depth (24-bit) only. Used for shadow maps.
    Depth24,
    /// Depth (24-bit) + stencil (8-bit). Standard depth buffer.
    Depth24Stencil8,
}

impl PixelFormat {
    /// Whether this format describes a depth (or depth+stencil) attachment
    #[must_use]
    pub const fn is_depth(self) -> bool {
        matches!(self, Self::Depth24 | Self::Depth24Stencil8)
    }
}

/// What a GPU buffer holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Vertex attribute data
    Vertex,
    /// Index data
    Index,
    /// Shader uniform data
    Uniform,
}

/// Buffer usage hint for driver-side placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Data set once, rarely changed
    Static,
    /// Data changed frequently
    Dynamic,
}

/// Blending factors for the fixed-function blend stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    /// Factor of zero
    Zero,
    /// Factor of one (additive accumulation uses One/One)
    One,
    /// Source color
    SrcColor,
    /// One minus source color
    OneMinusSrcColor,
    /// Destination color
    DstColor,
    /// One minus destination color
    OneMinusDstColor,
    /// Source alpha
    SrcAlpha,
    /// One minus source alpha
    OneMinusSrcAlpha,
    /// Destination alpha
    DstAlpha,
    /// One minus destination alpha
    OneMinusDstAlpha,
}

/// Depth comparison functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareFunc {
    /// Never passes
    Never,
    /// Passes when incoming depth is less
    Less,
    /// Passes when depths are equal
    Equal,
    /// Passes when incoming depth is less or equal
    LessEqual,
    /// Passes when incoming depth is greater
    Greater,
    /// Passes when depths differ
    NotEqual,
    /// Passes when incoming depth is greater or equal
    GreaterEqual,
    /// Always passes
    Always,
}

/// Triangle face culling mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No face culling
    None,
    /// Cull front faces (used when shading light volumes from inside)
    Front,
    /// Cull back faces (the standard mode for opaque geometry)
    Back,
}

bitflags! {
    /// Which framebuffer aspects a clear affects
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClearFlags: u32 {
        /// Clear all color attachments
        const COLOR = 1 << 0;
        /// Clear the depth attachment
        const DEPTH = 1 << 1;
    }
}

/// A value uploaded to a numbered shader uniform location
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    /// Scalar float
    Float(f32),
    /// Scalar integer (also used for sampler slot bindings)
    Int(i32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
}
