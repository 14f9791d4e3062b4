//! Vector and matrix math for the pipeline
//!
//! Small fixed-size types only: the rasterizer never needs anything
//! bigger than a 4x4 matrix.

use std::ops::{Add, Div, Index, IndexMut, Mul, Neg, Sub};
use serde::{Serialize, Deserialize};

/// 3D Vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3 { x: 0.0, y: 0.0, z: 0.0 };
    pub const UP: Vec3 = Vec3 { x: 0.0, y: 1.0, z: 0.0 };

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn dot(self, other: Vec3) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        }
    }

    pub fn len(self) -> f32 {
        self.dot(self).sqrt()
    }

    pub fn normalize(self) -> Vec3 {
        let l = self.len();
        if l == 0.0 {
            return Vec3::ZERO;
        }
        Vec3 {
            x: self.x / l,
            y: self.y / l,
            z: self.z / l,
        }
    }

    pub fn scale(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x * s,
            y: self.y * s,
            z: self.z * s,
        }
    }

    /// Weighted sum of three values, the barycentric interpolation step
    pub fn weighted(values: &[Vec3; 3], bc: Vec3) -> Vec3 {
        values[0] * bc.x + values[1] * bc.y + values[2] * bc.z
    }
}

impl Add for Vec3 {
    type Output = Vec3;
    fn add(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x + other.x,
            y: self.y + other.y,
            z: self.z + other.z,
        }
    }
}

impl Sub for Vec3 {
    type Output = Vec3;
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3 {
            x: self.x - other.x,
            y: self.y - other.y,
            z: self.z - other.z,
        }
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;
    fn mul(self, s: f32) -> Vec3 {
        self.scale(s)
    }
}

impl Div<f32> for Vec3 {
    type Output = Vec3;
    fn div(self, s: f32) -> Vec3 {
        Vec3 {
            x: self.x / s,
            y: self.y / s,
            z: self.z / s,
        }
    }
}

impl Neg for Vec3 {
    type Output = Vec3;
    fn neg(self) -> Vec3 {
        Vec3 { x: -self.x, y: -self.y, z: -self.z }
    }
}

impl Index<usize> for Vec3 {
    type Output = f32;
    fn index(&self, axis: usize) -> &f32 {
        match axis {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vec3 axis out of range: {}", axis),
        }
    }
}

impl IndexMut<usize> for Vec3 {
    fn index_mut(&mut self, axis: usize) -> &mut f32 {
        match axis {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            _ => panic!("Vec3 axis out of range: {}", axis),
        }
    }
}

/// 2D Vector (texture coordinates, in texel units)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn weighted(values: &[Vec2; 3], bc: Vec3) -> Vec2 {
        Vec2 {
            x: values[0].x * bc.x + values[1].x * bc.y + values[2].x * bc.z,
            y: values[0].y * bc.x + values[1].y * bc.y + values[2].y * bc.z,
        }
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/// 3x3 matrix, row-major
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Mat3 {
    pub m: [[f32; 3]; 3],
}

impl Mat3 {
    /// Build a matrix whose columns are `c0`, `c1`, `c2`
    pub fn from_columns(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        let mut m = [[0.0; 3]; 3];
        for i in 0..3 {
            m[i][0] = c0[i];
            m[i][1] = c1[i];
            m[i][2] = c2[i];
        }
        Self { m }
    }

    pub fn column(&self, j: usize) -> Vec3 {
        Vec3::new(self.m[0][j], self.m[1][j], self.m[2][j])
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        Vec3 {
            x: self.m[0][0] * v.x + self.m[0][1] * v.y + self.m[0][2] * v.z,
            y: self.m[1][0] * v.x + self.m[1][1] * v.y + self.m[1][2] * v.z,
            z: self.m[2][0] * v.x + self.m[2][1] * v.y + self.m[2][2] * v.z,
        }
    }
}

/// 4x4 matrix, row-major (`m[row][col]`)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4 {
    pub m: [[f32; 4]; 4],
}

impl Mat4 {
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, row) in m.iter_mut().enumerate() {
            row[i] = 1.0;
        }
        Self { m }
    }

    /// Multiply the homogeneous point (p, 1), returning all four components
    pub fn mul_point(&self, p: Vec3) -> [f32; 4] {
        let v = [p.x, p.y, p.z, 1.0];
        let mut out = [0.0; 4];
        for (i, row) in self.m.iter().enumerate() {
            out[i] = row[0] * v[0] + row[1] * v[1] + row[2] * v[2] + row[3] * v[3];
        }
        out
    }

    /// Transform a point and divide by the resulting w
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let [x, y, z, w] = self.mul_point(p);
        Vec3::new(x / w, y / w, z / w)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for Mat4 {
    type Output = Mat4;
    fn mul(self, other: Mat4) -> Mat4 {
        let mut m = [[0.0; 4]; 4];
        for i in 0..4 {
            for j in 0..4 {
                m[i][j] = (0..4).map(|k| self.m[i][k] * other.m[k][j]).sum();
            }
        }
        Mat4 { m }
    }
}

/// Sentinel returned by [`barycentric`] for degenerate or clockwise triangles
pub const DEGENERATE: Vec3 = Vec3 { x: -1.0, y: 1.0, z: 1.0 };

/// Calculate barycentric coordinates of `p` in triangle (a, b, c), x/y only.
///
/// The third component of the cross product below is twice the signed area
/// of the triangle; anything not above `1e-2` is reported as [`DEGENERATE`],
/// which fails the inside test. Clockwise triangles land there too.
pub fn barycentric(a: Vec3, b: Vec3, c: Vec3, p: Vec3) -> Vec3 {
    let sx = Vec3::new(b.x - a.x, c.x - a.x, a.x - p.x);
    let sy = Vec3::new(b.y - a.y, c.y - a.y, a.y - p.y);
    let w = sx.cross(sy);

    if w.z > 1e-2 {
        let u = w.x / w.z;
        let v = w.y / w.z;
        return Vec3::new(1.0 - u - v, u, v);
    }
    DEGENERATE
}
