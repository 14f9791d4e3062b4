//! softshade: CPU-only triangle rasterizer
//!
//! Renders Wavefront OBJ models into a single static image without a GPU:
//! - Model, view, projection and viewport transforms
//! - Bounding-box rasterization with barycentric interpolation and a z-buffer
//! - Flat, Gouraud, Toon, Phong and Blinn-Phong shaders
//! - Tangent-space normal mapping

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod model;
pub mod rasterizer;

pub use config::{load_config, save_config, ConfigError, RenderConfig};
pub use model::{Model, ModelError};
