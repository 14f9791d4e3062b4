//! Viewport, projection and view matrices
//!
//! Conventions: camera space is right-handed with the camera looking down
//! -z, so depth grows toward the viewer and the z-buffer keeps the largest
//! value.

use super::math::{Mat4, Vec3};

/// Map [-1,1] normalized device coordinates onto a `width` x `height` image.
/// Depth is passed through untouched.
pub fn viewport(width: usize, height: usize) -> Mat4 {
    let hw = width as f32 / 2.0;
    let hh = height as f32 / 2.0;
    let mut m = Mat4::identity();
    m.m[0][0] = hw;
    m.m[1][1] = hh;
    m.m[0][3] = hw;
    m.m[1][3] = hh;
    m
}

/// Pinhole projection: w picks up `-z / distance(camera, target)`.
/// `camera` must differ from `target`.
pub fn projection(camera: Vec3, target: Vec3) -> Mat4 {
    let mut m = Mat4::identity();
    m.m[3][2] = -1.0 / (camera - target).len();
    m
}

/// World to camera space. `up` must not be parallel to `camera - target`.
pub fn view(camera: Vec3, target: Vec3, up: Vec3) -> Mat4 {
    let z = camera - target;
    let x = up.cross(z);
    let y = z.cross(x);
    let (x, y, z) = (x.normalize(), y.normalize(), z.normalize());

    let mut rotation = Mat4::identity();
    for i in 0..3 {
        rotation.m[0][i] = x[i];
        rotation.m[1][i] = y[i];
        rotation.m[2][i] = z[i];
    }

    let mut translation = Mat4::identity();
    for i in 0..3 {
        translation.m[i][3] = -camera[i];
    }

    rotation * translation
}

/// The three pipeline matrices of one render pass and their product
#[derive(Debug, Clone, Copy)]
pub struct Transforms {
    pub viewport: Mat4,
    pub projection: Mat4,
    pub view: Mat4,
    /// viewport * projection * view
    pub mvp: Mat4,
}

impl Transforms {
    pub fn new(viewport: Mat4, projection: Mat4, view: Mat4) -> Self {
        Self {
            viewport,
            projection,
            view,
            mvp: viewport * projection * view,
        }
    }

    /// Camera looking from `camera` at `target` onto a `width` x `height` image
    pub fn look_at(width: usize, height: usize, camera: Vec3, target: Vec3, up: Vec3) -> Self {
        Self::new(
            viewport(width, height),
            projection(camera, target),
            view(camera, target, up),
        )
    }

    /// Every stage is the identity: model coordinates are screen coordinates
    pub fn identity() -> Self {
        Self::new(Mat4::identity(), Mat4::identity(), Mat4::identity())
    }

    /// Model space to screen space, perspective divide included
    pub fn project(&self, p: Vec3) -> Vec3 {
        self.mvp.transform_point(p)
    }
}

impl Default for Transforms {
    fn default() -> Self {
        Self::identity()
    }
}
