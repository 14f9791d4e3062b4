//! Software triangle rasterizer
//!
//! Features:
//! - Viewport / projection / view matrices built from a look-at camera
//! - Bounding-box rasterization with barycentric interpolation
//! - Z-buffer where the larger depth wins
//! - Programmable shaders: Flat, Gouraud, Toon, Phong and Blinn-Phong
//!   (the last two with tangent-space normal mapping)
//! - Parametric and Bresenham lines for wireframes
//!
//! # Module Organization
//!
//! - `math` - Vec2, Vec3, Mat3, Mat4, barycentric coordinates
//! - `types` - Color, Texture, Vertex, MeshSource, ShadingMode
//! - `transform` - Transform builders
//! - `render` - Framebuffer, triangle and line rasterization, mesh passes
//! - `shader` - Shader contract and lighting models

mod math;
mod types;
mod transform;
mod render;
mod shader;

pub use math::*;
pub use types::*;
pub use transform::*;
pub use render::*;
pub use shader::*;
