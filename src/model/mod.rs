//! Wavefront OBJ models with their companion texture maps
//!
//! Only the records the renderer needs are read: `v`, `vt`, `vn` and `f`.
//! Texture maps sit next to the model file and share its stem:
//! `head.obj` pairs with `head_diffuse.tga`, `head_spec.tga` and
//! `head_nm_tangent.tga`.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use thiserror::Error;

use crate::rasterizer::{MaterialMaps, MeshSource, Texture, Vec2, Vec3, Vertex};

pub const DIFFUSE_SUFFIX: &str = "_diffuse.tga";
pub const SPECULAR_SUFFIX: &str = "_spec.tga";
pub const NORMAL_SUFFIX: &str = "_nm_tangent.tga";

/// Error type for model loading
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

fn parse_error(line: usize, message: impl Into<String>) -> ModelError {
    ModelError::Parse { line, message: message.into() }
}

/// Indices of one face corner into the position, uv and normal lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCorner {
    pub position: usize,
    pub uv: Option<usize>,
    pub normal: Option<usize>,
}

/// A triangle mesh and its texture maps
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    normals: Vec<Vec3>,
    faces: Vec<[FaceCorner; 3]>,
    pub diffuse: Texture,
    pub specular: Texture,
    pub normal_map: Texture,
}

impl Model {
    /// Load an OBJ file and whatever companion maps exist beside it
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path)?;
        let mut model = Self::parse(&source)?;

        model.name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        model.diffuse = load_map(path, DIFFUSE_SUFFIX);
        model.normal_map = load_map(path, NORMAL_SUFFIX);
        model.specular = load_map(path, SPECULAR_SUFFIX);

        Ok(model)
    }

    /// Parse OBJ text. Polygons are split into triangle fans.
    pub fn parse(source: &str) -> Result<Self, ModelError> {
        let mut model = Self::default();

        for (i, raw) in source.lines().enumerate() {
            let line = i + 1;
            let mut fields = raw.split_whitespace();
            match fields.next() {
                Some("v") => model.positions.push(parse_vec3(line, fields)?),
                Some("vn") => model.normals.push(parse_vec3(line, fields)?),
                Some("vt") => {
                    let u = parse_float(line, fields.next())?;
                    let v = match fields.next() {
                        Some(field) => parse_float(line, Some(field))?,
                        None => 0.0,
                    };
                    model.uvs.push(Vec2::new(u, v));
                }
                Some("f") => {
                    let corners = fields
                        .map(|f| model.parse_corner(line, f))
                        .collect::<Result<Vec<_>, _>>()?;
                    if corners.len() < 3 {
                        return Err(parse_error(line, "face needs at least three corners"));
                    }
                    for k in 1..corners.len() - 1 {
                        model.faces.push([corners[0], corners[k], corners[k + 1]]);
                    }
                }
                _ => {}
            }
        }

        debug!(
            "# v# {} f# {} vt# {} vn# {}",
            model.positions.len(),
            model.faces.len(),
            model.uvs.len(),
            model.normals.len()
        );
        Ok(model)
    }

    /// Parse `v`, `v/vt`, `v//vn` or `v/vt/vn`
    fn parse_corner(&self, line: usize, field: &str) -> Result<FaceCorner, ModelError> {
        let mut parts = field.split('/');
        let position = match parts.next() {
            Some(p) => resolve_index(line, p, self.positions.len())?,
            None => return Err(parse_error(line, "empty face corner")),
        };
        let uv = match parts.next() {
            Some(p) if !p.is_empty() => Some(resolve_index(line, p, self.uvs.len())?),
            _ => None,
        };
        let normal = match parts.next() {
            Some(p) if !p.is_empty() => Some(resolve_index(line, p, self.normals.len())?),
            _ => None,
        };
        Ok(FaceCorner { position, uv, normal })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn corner(&self, face: usize, corner: usize) -> FaceCorner {
        self.faces[face][corner]
    }

    pub fn position(&self, face: usize, corner: usize) -> Vec3 {
        self.positions[self.faces[face][corner].position]
    }

    /// Texture coordinate scaled to the diffuse map's texels
    pub fn uv(&self, face: usize, corner: usize) -> Vec2 {
        match self.faces[face][corner].uv {
            Some(idx) => {
                let uv = self.uvs[idx];
                Vec2::new(uv.x * self.diffuse.width as f32, uv.y * self.diffuse.height as f32)
            }
            None => Vec2::default(),
        }
    }

    /// Unit normal
    pub fn normal(&self, face: usize, corner: usize) -> Vec3 {
        match self.faces[face][corner].normal {
            Some(idx) => self.normals[idx].normalize(),
            None => Vec3::ZERO,
        }
    }

    pub fn maps(&self) -> MaterialMaps<'_> {
        MaterialMaps {
            diffuse: &self.diffuse,
            specular: &self.specular,
            normal: &self.normal_map,
        }
    }
}

impl MeshSource for Model {
    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn vertex(&self, face: usize, corner: usize) -> Vertex {
        Vertex::new(self.position(face, corner), self.uv(face, corner), self.normal(face, corner))
    }
}

/// `dir/name.ext` becomes `dir/name<suffix>`; paths without an extension
/// have no companions
pub fn companion_path(path: &Path, suffix: &str) -> Option<PathBuf> {
    path.extension()?;
    let stem = path.file_stem()?.to_string_lossy();
    Some(path.with_file_name(format!("{}{}", stem, suffix)))
}

/// Load a companion map, flipped so row 0 is the bottom.
/// Missing or unreadable maps come back empty.
fn load_map(model_path: &Path, suffix: &str) -> Texture {
    let Some(path) = companion_path(model_path, suffix) else {
        return Texture::empty();
    };

    match Texture::from_file(&path) {
        Ok(mut texture) => {
            debug!("texture file {} loading ok ({}x{})", path.display(), texture.width, texture.height);
            texture.flip_vertically();
            texture
        }
        Err(e) => {
            warn!("texture file {} loading failed: {}", path.display(), e);
            Texture::empty()
        }
    }
}

fn parse_float(line: usize, field: Option<&str>) -> Result<f32, ModelError> {
    let field = field.ok_or_else(|| parse_error(line, "missing coordinate"))?;
    field
        .parse()
        .map_err(|_| parse_error(line, format!("bad number '{}'", field)))
}

fn parse_vec3<'a>(line: usize, mut fields: impl Iterator<Item = &'a str>) -> Result<Vec3, ModelError> {
    let x = parse_float(line, fields.next())?;
    let y = parse_float(line, fields.next())?;
    let z = parse_float(line, fields.next())?;
    Ok(Vec3::new(x, y, z))
}

/// OBJ indices are 1-based; negative ones count back from the last entry
fn resolve_index(line: usize, field: &str, len: usize) -> Result<usize, ModelError> {
    let raw: i64 = field
        .parse()
        .map_err(|_| parse_error(line, format!("bad index '{}'", field)))?;
    let idx = if raw > 0 { raw - 1 } else { len as i64 + raw };
    if raw == 0 || idx < 0 || idx >= len as i64 {
        return Err(parse_error(line, format!("index {} out of range ({} defined)", raw, len)));
    }
    Ok(idx as usize)
}
