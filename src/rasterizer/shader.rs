//! Programmable shading stages
//!
//! A [`Shader`] runs in two steps per triangle:
//!
//! 1. `vertex` is called once per corner (0, 1, 2). It projects the corner to
//!    screen space and records its attributes in the shader's
//!    [`TriangleContext`].
//! 2. `fragment` is called by the rasterizer for every covered pixel with
//!    the pixel's barycentric weights, and interpolates whatever it needs
//!    from the context.
//!
//! The five lighting models differ only in the fragment step.

use log::warn;

use super::math::{Mat3, Vec2, Vec3};
use super::transform::Transforms;
use super::types::{clamp_channel, Color, ShadingMode, Texture, Vertex};

/// Outcome of the fragment stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    Color(Color),
    /// Skip shading; the rasterizer paints the pixel black
    Discard,
}

/// Progress of the vertex calls for the current triangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextState {
    Empty,
    /// Number of corners recorded so far (1 or 2)
    Collecting(usize),
    /// All three corners recorded, fragments may be shaded
    Ready,
}

/// Per-triangle attributes captured by the vertex stage
#[derive(Debug, Clone, Default)]
pub struct TriangleContext {
    pub positions: [Vec3; 3],
    pub uvs: [Vec2; 3],
    pub normals: [Vec3; 3],
    collected: usize,
}

impl TriangleContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ContextState {
        match self.collected {
            0 => ContextState::Empty,
            3 => ContextState::Ready,
            n => ContextState::Collecting(n),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.collected == 3
    }

    /// Record corner `idx`. Corner 0 always starts a new triangle; any other
    /// corner must follow its predecessor, otherwise the context is emptied.
    pub fn record(&mut self, idx: usize, vertex: Vertex) {
        if idx == 0 {
            self.collected = 0;
        }
        if idx > 2 || idx != self.collected {
            warn!("vertex {} out of sequence (expected {}), dropping triangle", idx, self.collected);
            self.collected = 0;
            return;
        }
        self.positions[idx] = vertex.pos;
        self.uvs[idx] = vertex.uv;
        self.normals[idx] = vertex.normal;
        self.collected += 1;
    }
}

/// The vertex/fragment contract driven by the rasterizer
pub trait Shader {
    /// Project corner `idx` of the current triangle and remember its attributes
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3;

    /// Shade one covered pixel from its barycentric weights
    fn fragment(&self, bc: Vec3) -> Fragment;

    fn context(&self) -> &TriangleContext;
}

/// Light and camera parameters shared by all lighting models
#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    /// Direction the light travels, normalized
    pub light_dir: Vec3,
    /// Direction the camera looks, normalized
    pub view_dir: Vec3,
    pub ambient: f32,
    pub shininess: f32,
}

impl Lighting {
    pub fn new(light_dir: Vec3, view_dir: Vec3, ambient: f32, shininess: f32) -> Self {
        Self {
            light_dir: light_dir.normalize(),
            view_dir: view_dir.normalize(),
            ambient,
            shininess,
        }
    }
}

/// Texture maps a shader samples from
#[derive(Debug, Clone, Copy)]
pub struct MaterialMaps<'a> {
    pub diffuse: &'a Texture,
    pub specular: &'a Texture,
    /// Tangent-space normal map
    pub normal: &'a Texture,
}

fn project_and_record(transforms: &Transforms, ctx: &mut TriangleContext, vertex: Vertex, idx: usize) -> Vec3 {
    ctx.record(idx, vertex);
    transforms.project(vertex.pos)
}

/// Build the tangent/bitangent/normal basis of a triangle.
///
/// Tangent and bitangent come from solving the uv-delta system of the two
/// edges, then Gram-Schmidt against `n`. Columns are (t, b, n). A triangle
/// with zero uv area yields NaNs.
pub fn tbn(positions: &[Vec3; 3], uvs: &[Vec2; 3], n: Vec3) -> Mat3 {
    let ab = positions[1] - positions[0];
    let ac = positions[2] - positions[0];
    let uv1 = uvs[1] - uvs[0];
    let uv2 = uvs[2] - uvs[0];

    let det = uv1.x * uv2.y - uv2.x * uv1.y;
    let tangent = (ab * uv2.y - ac * uv1.y) / det;
    let bitangent = (ac * uv1.x - ab * uv2.x) / det;

    let t = (tangent - n * tangent.dot(n)).normalize();
    let b = (bitangent - n * bitangent.dot(n) - t * bitangent.dot(t)).normalize();

    Mat3::from_columns(t, b, n)
}

/// Decode a normal-map texel into a unit vector.
/// Channel 0 lands on axis 2 (BGR storage to xyz).
pub fn decode_normal(texel: Color) -> Vec3 {
    let mut n = Vec3::ZERO;
    for i in 0..3 {
        n[2 - i] = texel.channel(i) as f32 / 255.0 * 2.0 - 1.0;
    }
    n.normalize()
}

/// Quantize a diffuse intensity into toon bands.
/// Values at or below 0.15 pass through untouched.
pub fn toon_band(intensity: f32) -> f32 {
    if intensity > 0.85 {
        1.0
    } else if intensity > 0.60 {
        0.80
    } else if intensity > 0.45 {
        0.60
    } else if intensity > 0.30 {
        0.45
    } else if intensity > 0.15 {
        0.30
    } else {
        intensity
    }
}

/// One face normal for the whole triangle
pub struct FlatShader<'a> {
    transforms: Transforms,
    light_dir: Vec3,
    texture: &'a Texture,
    ctx: TriangleContext,
}

impl<'a> FlatShader<'a> {
    pub fn new(transforms: Transforms, lighting: &Lighting, texture: &'a Texture) -> Self {
        Self {
            transforms,
            light_dir: lighting.light_dir,
            texture,
            ctx: TriangleContext::new(),
        }
    }
}

impl Shader for FlatShader<'_> {
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3 {
        project_and_record(&self.transforms, &mut self.ctx, vertex, idx)
    }

    fn fragment(&self, bc: Vec3) -> Fragment {
        let p = &self.ctx.positions;
        let normal = (p[1] - p[0]).cross(p[2] - p[0]).normalize();
        let intensity = -self.light_dir.dot(normal);
        let uv = Vec2::weighted(&self.ctx.uvs, bc);

        // Back-lit faces still shade (to black), they are never discarded
        Fragment::Color(self.texture.sample(uv).shade(intensity))
    }

    fn context(&self) -> &TriangleContext {
        &self.ctx
    }
}

/// Per-vertex intensity, interpolated across the face
pub struct GouraudShader<'a> {
    transforms: Transforms,
    light_dir: Vec3,
    texture: &'a Texture,
    ctx: TriangleContext,
}

impl<'a> GouraudShader<'a> {
    pub fn new(transforms: Transforms, lighting: &Lighting, texture: &'a Texture) -> Self {
        Self {
            transforms,
            light_dir: lighting.light_dir,
            texture,
            ctx: TriangleContext::new(),
        }
    }
}

fn interpolated_intensity(ctx: &TriangleContext, light_dir: Vec3, bc: Vec3) -> f32 {
    let n = &ctx.normals;
    let intensities = Vec3::new(
        -light_dir.dot(n[0]),
        -light_dir.dot(n[1]),
        -light_dir.dot(n[2]),
    );
    intensities.dot(bc)
}

impl Shader for GouraudShader<'_> {
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3 {
        project_and_record(&self.transforms, &mut self.ctx, vertex, idx)
    }

    fn fragment(&self, bc: Vec3) -> Fragment {
        let intensity = interpolated_intensity(&self.ctx, self.light_dir, bc);
        let uv = Vec2::weighted(&self.ctx.uvs, bc);
        Fragment::Color(self.texture.sample(uv).shade(intensity))
    }

    fn context(&self) -> &TriangleContext {
        &self.ctx
    }
}

/// Gouraud intensity quantized into flat bands of a fixed color
pub struct ToonShader {
    transforms: Transforms,
    light_dir: Vec3,
    ctx: TriangleContext,
}

impl ToonShader {
    pub fn new(transforms: Transforms, lighting: &Lighting) -> Self {
        Self {
            transforms,
            light_dir: lighting.light_dir,
            ctx: TriangleContext::new(),
        }
    }
}

impl Shader for ToonShader {
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3 {
        project_and_record(&self.transforms, &mut self.ctx, vertex, idx)
    }

    fn fragment(&self, bc: Vec3) -> Fragment {
        let intensity = interpolated_intensity(&self.ctx, self.light_dir, bc);
        Fragment::Color(Color::PINK.shade(toon_band(intensity)))
    }

    fn context(&self) -> &TriangleContext {
        &self.ctx
    }
}

/// Specular term of a normal-mapped lighting model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Highlight {
    /// Mirror reflection against the view direction
    Reflect,
    /// Half vector between light and view
    HalfVector,
}

/// Shared fragment path of [`PhongShader`] and [`BlinnPhongShader`]
fn shade_normal_mapped(
    ctx: &TriangleContext,
    lighting: &Lighting,
    maps: &MaterialMaps<'_>,
    bc: Vec3,
    highlight: Highlight,
) -> Fragment {
    let uv = Vec2::weighted(&ctx.uvs, bc);
    let n = Vec3::weighted(&ctx.normals, bc);
    let basis = tbn(&ctx.positions, &ctx.uvs, n);

    let normal = (basis * decode_normal(maps.normal.sample(uv))).normalize();
    let l = lighting.light_dir;
    let diffuse = -normal.dot(l);
    if diffuse < 0.0 {
        return Fragment::Discard;
    }

    let (specular, channels) = match highlight {
        Highlight::Reflect => {
            let r = (normal * (normal.dot(l) * 2.0) - l).normalize();
            (0.6 * r.dot(lighting.view_dir).max(0.0).powf(lighting.shininess), 3)
        }
        Highlight::HalfVector => {
            let half = (l + lighting.view_dir).normalize();
            (0.5 * (-half.dot(normal)).max(0.0).powf(lighting.shininess), 4)
        }
    };

    let texel = maps.diffuse.sample(uv);
    let spec = maps.specular.sample(uv);
    let mut color = Color::BLACK;
    for i in 0..channels {
        let value = texel.channel(i) as f32 * (lighting.ambient + diffuse)
            + spec.channel(i) as f32 * specular;
        color.set_channel(i, clamp_channel(value));
    }
    Fragment::Color(color)
}

/// Normal-mapped diffuse with mirror-reflection specular
pub struct PhongShader<'a> {
    transforms: Transforms,
    lighting: Lighting,
    maps: MaterialMaps<'a>,
    ctx: TriangleContext,
}

impl<'a> PhongShader<'a> {
    pub fn new(transforms: Transforms, lighting: Lighting, maps: MaterialMaps<'a>) -> Self {
        Self {
            transforms,
            lighting,
            maps,
            ctx: TriangleContext::new(),
        }
    }
}

impl Shader for PhongShader<'_> {
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3 {
        project_and_record(&self.transforms, &mut self.ctx, vertex, idx)
    }

    fn fragment(&self, bc: Vec3) -> Fragment {
        shade_normal_mapped(&self.ctx, &self.lighting, &self.maps, bc, Highlight::Reflect)
    }

    fn context(&self) -> &TriangleContext {
        &self.ctx
    }
}

/// Normal-mapped diffuse with half-vector specular; also shades alpha
pub struct BlinnPhongShader<'a> {
    transforms: Transforms,
    lighting: Lighting,
    maps: MaterialMaps<'a>,
    ctx: TriangleContext,
}

impl<'a> BlinnPhongShader<'a> {
    pub fn new(transforms: Transforms, lighting: Lighting, maps: MaterialMaps<'a>) -> Self {
        Self {
            transforms,
            lighting,
            maps,
            ctx: TriangleContext::new(),
        }
    }
}

impl Shader for BlinnPhongShader<'_> {
    fn vertex(&mut self, vertex: Vertex, idx: usize) -> Vec3 {
        project_and_record(&self.transforms, &mut self.ctx, vertex, idx)
    }

    fn fragment(&self, bc: Vec3) -> Fragment {
        shade_normal_mapped(&self.ctx, &self.lighting, &self.maps, bc, Highlight::HalfVector)
    }

    fn context(&self) -> &TriangleContext {
        &self.ctx
    }
}

/// Instantiate the shader for `mode`
pub fn build_shader<'a>(
    mode: ShadingMode,
    transforms: Transforms,
    lighting: Lighting,
    maps: MaterialMaps<'a>,
) -> Box<dyn Shader + 'a> {
    match mode {
        ShadingMode::Flat => Box::new(FlatShader::new(transforms, &lighting, maps.diffuse)),
        ShadingMode::Gouraud => Box::new(GouraudShader::new(transforms, &lighting, maps.diffuse)),
        ShadingMode::Toon => Box::new(ToonShader::new(transforms, &lighting)),
        ShadingMode::Phong => Box::new(PhongShader::new(transforms, lighting, maps)),
        ShadingMode::BlinnPhong => Box::new(BlinnPhongShader::new(transforms, lighting, maps)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Right triangle in the xy plane facing +z, uvs spanning 10 texels
    fn corners() -> [Vertex; 3] {
        let n = Vec3::new(0.0, 0.0, 1.0);
        [
            Vertex::new(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0), n),
            Vertex::new(Vec3::new(1.0, 0.0, 0.0), Vec2::new(10.0, 0.0), n),
            Vertex::new(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 10.0), n),
        ]
    }

    fn feed<S: Shader + ?Sized>(shader: &mut S) {
        for (i, v) in corners().into_iter().enumerate() {
            shader.vertex(v, i);
        }
    }

    const CENTER: Vec3 = Vec3 { x: 1.0 / 3.0, y: 1.0 / 3.0, z: 1.0 / 3.0 };

    fn lights() -> Vec<Vec3> {
        vec![
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(0.3, -0.7, -1.0),
            Vec3::new(-0.3, 0.7, 1.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, -1.0, 0.2),
        ]
    }

    #[test]
    fn test_context_state_machine() {
        let mut ctx = TriangleContext::new();
        let [a, b, c] = corners();
        assert_eq!(ctx.state(), ContextState::Empty);
        ctx.record(0, a);
        assert_eq!(ctx.state(), ContextState::Collecting(1));
        ctx.record(1, b);
        assert_eq!(ctx.state(), ContextState::Collecting(2));
        ctx.record(2, c);
        assert_eq!(ctx.state(), ContextState::Ready);
        assert!(ctx.is_ready());

        // Next triangle overwrites rather than accumulates
        ctx.record(0, c);
        assert_eq!(ctx.state(), ContextState::Collecting(1));
        assert_eq!(ctx.positions[0], c.pos);
    }

    #[test]
    fn test_context_out_of_sequence_empties() {
        let mut ctx = TriangleContext::new();
        let [a, _, c] = corners();
        ctx.record(0, a);
        ctx.record(2, c);
        assert_eq!(ctx.state(), ContextState::Empty);
        ctx.record(3, c);
        assert_eq!(ctx.state(), ContextState::Empty);
    }

    #[test]
    fn test_vertex_stage_projects() {
        let tex = Texture::solid(1, 1, Color::WHITE);
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
        let transforms = Transforms::look_at(100, 100, Vec3::new(0.0, 0.0, 2.0), Vec3::ZERO, Vec3::UP);
        let mut shader = FlatShader::new(transforms, &lighting, &tex);
        let screen = shader.vertex(Vertex::from_pos(0.0, 0.0, 0.0), 0);
        assert!((screen.x - 50.0).abs() < 1e-4);
        assert!((screen.y - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_simple_models_never_discard() {
        let tex = Texture::solid(16, 16, Color::new(200, 150, 100));
        for light in lights() {
            let lighting = Lighting::new(light, Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
            let mut shaders: Vec<Box<dyn Shader + '_>> = vec![
                Box::new(FlatShader::new(Transforms::identity(), &lighting, &tex)),
                Box::new(GouraudShader::new(Transforms::identity(), &lighting, &tex)),
                Box::new(ToonShader::new(Transforms::identity(), &lighting)),
            ];
            for shader in shaders.iter_mut() {
                feed(shader.as_mut());
                for bc in [CENTER, Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.2, 0.7, 0.1)] {
                    assert_ne!(shader.fragment(bc), Fragment::Discard, "light {:?}", light);
                }
            }
        }
    }

    #[test]
    fn test_flat_full_intensity() {
        let tex = Texture::solid(16, 16, Color::new(200, 150, 100));
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
        let mut shader = FlatShader::new(Transforms::identity(), &lighting, &tex);
        feed(&mut shader);
        assert_eq!(shader.fragment(CENTER), Fragment::Color(Color::new(200, 150, 100)));
    }

    #[test]
    fn test_gouraud_interpolates_intensity() {
        let tex = Texture::solid(16, 16, Color::new(200, 200, 200));
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
        let mut shader = GouraudShader::new(Transforms::identity(), &lighting, &tex);
        let [a, b, mut c] = corners();
        // Third corner faces away from the light
        c.normal = Vec3::new(1.0, 0.0, 0.0);
        shader.vertex(a, 0);
        shader.vertex(b, 1);
        shader.vertex(c, 2);

        // Half way between a lit (1.0) and an unlit (0.0) corner
        let bc = Vec3::new(0.5, 0.0, 0.5);
        assert_eq!(shader.fragment(bc), Fragment::Color(Color::new(100, 100, 100)));
    }

    #[test]
    fn test_toon_bands() {
        assert_eq!(toon_band(0.9), 1.0);
        assert_eq!(toon_band(0.7), 0.80);
        assert_eq!(toon_band(0.5), 0.60);
        assert_eq!(toon_band(0.35), 0.45);
        assert_eq!(toon_band(0.2), 0.30);
        assert_eq!(toon_band(0.1), 0.1);
        assert_eq!(toon_band(-0.4), -0.4);
    }

    #[test]
    fn test_toon_color() {
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
        let mut shader = ToonShader::new(Transforms::identity(), &lighting);
        feed(&mut shader);
        assert_eq!(shader.fragment(CENTER), Fragment::Color(Color::PINK));
    }

    #[test]
    fn test_decode_normal_channel_order() {
        // Blue byte drives z, red byte drives x
        let n = decode_normal(Color::new(128, 128, 255));
        assert!(n.z > 0.99);
        let n = decode_normal(Color::new(255, 128, 128));
        assert!(n.x > 0.99);
    }

    #[test]
    fn test_tbn_axis_aligned() {
        let c = corners();
        let positions = [c[0].pos, c[1].pos, c[2].pos];
        let uvs = [c[0].uv, c[1].uv, c[2].uv];
        let m = tbn(&positions, &uvs, Vec3::new(0.0, 0.0, 1.0));
        assert!((m.column(0) - Vec3::new(1.0, 0.0, 0.0)).len() < 1e-5);
        assert!((m.column(1) - Vec3::new(0.0, 1.0, 0.0)).len() < 1e-5);
        assert!((m.column(2) - Vec3::new(0.0, 0.0, 1.0)).len() < 1e-5);
    }

    #[test]
    fn test_tbn_orthogonalizes_against_normal() {
        let c = corners();
        let positions = [c[0].pos, c[1].pos, c[2].pos];
        let uvs = [c[0].uv, c[1].uv, c[2].uv];
        let n = Vec3::new(0.0, 0.6, 0.8);
        let m = tbn(&positions, &uvs, n);
        let (t, b) = (m.column(0), m.column(1));
        assert!(t.dot(n).abs() < 1e-5);
        assert!(b.dot(n).abs() < 1e-5);
        assert!(t.dot(b).abs() < 1e-5);
        assert!((t.len() - 1.0).abs() < 1e-5 && (b.len() - 1.0).abs() < 1e-5);
    }

    struct Maps {
        diffuse: Texture,
        specular: Texture,
        normal: Texture,
    }

    impl Maps {
        fn new(diffuse: Color) -> Self {
            Self {
                diffuse: Texture::solid(16, 16, diffuse),
                specular: Texture::solid(16, 16, Color::with_alpha(0, 0, 0, 0)),
                // Tangent-space +z
                normal: Texture::solid(16, 16, Color::new(128, 128, 255)),
            }
        }

        fn borrow(&self) -> MaterialMaps<'_> {
            MaterialMaps {
                diffuse: &self.diffuse,
                specular: &self.specular,
                normal: &self.normal,
            }
        }
    }

    #[test]
    fn test_normal_mapped_discard_when_back_lit() {
        let maps = Maps::new(Color::new(100, 100, 100));
        for mode in [ShadingMode::Phong, ShadingMode::BlinnPhong] {
            let lighting = Lighting::new(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
            let mut shader = build_shader(mode, Transforms::identity(), lighting, maps.borrow());
            feed(shader.as_mut());
            assert_eq!(shader.fragment(CENTER), Fragment::Discard, "{:?}", mode);
        }
    }

    #[test]
    fn test_normal_mapped_lit_writes_color() {
        let maps = Maps::new(Color::new(100, 100, 100));
        for mode in [ShadingMode::Phong, ShadingMode::BlinnPhong] {
            let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);
            let mut shader = build_shader(mode, Transforms::identity(), lighting, maps.borrow());
            feed(shader.as_mut());
            match shader.fragment(CENTER) {
                // 100 * (ambient 0.1 + diffuse ~1.0)
                Fragment::Color(c) => assert!((108..=110).contains(&c.r), "{:?}: {:?}", mode, c),
                Fragment::Discard => panic!("{:?} discarded a lit fragment", mode),
            }
        }
    }

    #[test]
    fn test_normal_mapped_clamps() {
        let maps = Maps::new(Color::new(200, 200, 200));
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 10.0, 64.0);
        let mut shader = PhongShader::new(Transforms::identity(), lighting, maps.borrow());
        feed(&mut shader);
        assert_eq!(shader.fragment(CENTER), Fragment::Color(Color::new(255, 255, 255)));
    }

    #[test]
    fn test_blinn_phong_shades_alpha() {
        let mut maps = Maps::new(Color::with_alpha(100, 100, 100, 100));
        maps.specular = Texture::solid(16, 16, Color::with_alpha(0, 0, 0, 0));
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.1, 64.0);

        let mut blinn = BlinnPhongShader::new(Transforms::identity(), lighting, maps.borrow());
        feed(&mut blinn);
        match blinn.fragment(CENTER) {
            Fragment::Color(c) => assert!((108..=110).contains(&c.a)),
            Fragment::Discard => panic!("lit fragment discarded"),
        }

        let mut phong = PhongShader::new(Transforms::identity(), lighting, maps.borrow());
        feed(&mut phong);
        match phong.fragment(CENTER) {
            Fragment::Color(c) => assert_eq!(c.a, 255),
            Fragment::Discard => panic!("lit fragment discarded"),
        }
    }

    #[test]
    fn test_specular_highlight_adds_to_color() {
        let mut maps = Maps::new(Color::new(0, 0, 0));
        maps.specular = Texture::solid(16, 16, Color::new(100, 100, 100));
        // Light straight down -z, viewer looking down -z: half vector is -z,
        // so -(h . n) = 1 and the Blinn term is 0.5 * 100
        let lighting = Lighting::new(Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.0, 0.0, -1.0), 0.0, 1.0);
        let mut shader = BlinnPhongShader::new(Transforms::identity(), lighting, maps.borrow());
        feed(&mut shader);
        match shader.fragment(CENTER) {
            Fragment::Color(c) => assert!((48..=50).contains(&c.r), "{:?}", c),
            Fragment::Discard => panic!("lit fragment discarded"),
        }
    }

    #[test]
    fn test_phong_reflection_against_view() {
        let mut maps = Maps::new(Color::new(0, 0, 0));
        maps.specular = Texture::solid(16, 16, Color::new(100, 100, 100));
        let light = Vec3::new(0.0, 0.0, -1.0);

        // r = n * 2(n . l) - l points back along the view ray, so r . v = 1
        // and the term is 0.6 * 100
        let toward = Lighting::new(light, Vec3::new(0.0, 0.0, -1.0), 0.0, 1.0);
        let mut shader = PhongShader::new(Transforms::identity(), toward, maps.borrow());
        feed(&mut shader);
        match shader.fragment(CENTER) {
            Fragment::Color(c) => {
                for ch in [c.r, c.g, c.b] {
                    assert!((58..=60).contains(&ch), "{:?}", c);
                }
                assert_eq!(c.a, 255);
            }
            Fragment::Discard => panic!("lit fragment discarded"),
        }

        // Viewer facing the other way sees no highlight
        let away = Lighting::new(light, Vec3::new(0.0, 0.0, 1.0), 0.0, 1.0);
        let mut shader = PhongShader::new(Transforms::identity(), away, maps.borrow());
        feed(&mut shader);
        assert_eq!(shader.fragment(CENTER), Fragment::Color(Color::BLACK));
    }
}
