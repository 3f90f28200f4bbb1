// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Defines the column-major `Mat4` type used for light transforms and
//! camera reconstruction.

use super::{Quaternion, Vec3, Vec4};
use std::ops::Mul;

/// A 4x4 column-major matrix.
///
/// The layout matches what shader constant buffers expect, so a `Mat4` can be
/// pushed to a uniform slot without transposition.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// The columns of the matrix. `cols[3]` holds the translation.
    pub cols: [Vec4; 4],
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat4 {
    /// The 4x4 identity matrix.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// Creates a new matrix from four column vectors.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Creates a translation matrix.
    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, v.extend(1.0))
    }

    /// Creates a rotation matrix from a unit quaternion.
    pub fn from_quat(q: Quaternion) -> Self {
        let (x2, y2, z2) = (q.x + q.x, q.y + q.y, q.z + q.z);
        let (xx, xy, xz) = (q.x * x2, q.x * y2, q.x * z2);
        let (yy, yz, zz) = (q.y * y2, q.y * z2, q.z * z2);
        let (wx, wy, wz) = (q.w * x2, q.w * y2, q.w * z2);

        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Builds `translation * rotation * scale`.
    pub fn from_trs(translation: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        let r = Self::from_quat(rotation);
        Self::from_cols(
            r.cols[0] * scale.x,
            r.cols[1] * scale.y,
            r.cols[2] * scale.z,
            translation.extend(1.0),
        )
    }

    /// Creates a right-handed perspective projection with a [-1, 1] clip depth
    /// range, the convention the reconstruction corners are expressed in.
    pub fn perspective_rh_gl(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        let f = 1.0 / (fov_y_radians * 0.5).tan();
        let nmf = z_near - z_far;
        Self::from_cols(
            Vec4::new(f / aspect_ratio, 0.0, 0.0, 0.0),
            Vec4::new(0.0, f, 0.0, 0.0),
            Vec4::new(0.0, 0.0, (z_far + z_near) / nmf, -1.0),
            Vec4::new(0.0, 0.0, 2.0 * z_far * z_near / nmf, 0.0),
        )
    }

    /// Creates a right-handed orthographic projection with a [-1, 1] clip
    /// depth range.
    pub fn orthographic_rh_gl(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        z_near: f32,
        z_far: f32,
    ) -> Self {
        let rml = right - left;
        let tmb = top - bottom;
        let fmn = z_far - z_near;
        Self::from_cols(
            Vec4::new(2.0 / rml, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 / tmb, 0.0, 0.0),
            Vec4::new(0.0, 0.0, -2.0 / fmn, 0.0),
            Vec4::new(
                -(right + left) / rml,
                -(top + bottom) / tmb,
                -(z_far + z_near) / fmn,
                1.0,
            ),
        )
    }

    /// Returns a copy with the translation column reset to `(0, 0, 0, 1)`.
    #[inline]
    pub fn with_translation_stripped(&self) -> Self {
        let mut m = *self;
        m.cols[3] = Vec4::W;
        m
    }

    /// Transforms a point, dividing by the resulting `w` when it is non-zero.
    pub fn transform_point(&self, p: Vec3) -> Vec3 {
        let v = *self * p.extend(1.0);
        if v.w != 0.0 {
            v.truncate() / v.w
        } else {
            v.truncate()
        }
    }

    /// Computes the inverse with Gauss-Jordan elimination and partial pivoting.
    ///
    /// Only an exactly singular or non-finite matrix is rejected. Small but
    /// valid scales (a light with a tiny outer radius has a determinant of
    /// `r³`) still invert.
    pub fn inverse(&self) -> Option<Self> {
        let cols = self.to_cols_array_2d();
        let mut a = [[0.0f32; 4]; 4];
        let mut inv = [[0.0f32; 4]; 4];
        for (r, row) in a.iter_mut().enumerate() {
            *row = cols.map(|c| c[r]);
            inv[r][r] = 1.0;
        }

        for col in 0..4 {
            let pivot = (col..4)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);
            let p = a[pivot][col];
            if p == 0.0 || !p.is_finite() {
                return None;
            }
            a.swap(col, pivot);
            inv.swap(col, pivot);

            let scale = 1.0 / p;
            for k in 0..4 {
                a[col][k] *= scale;
                inv[col][k] *= scale;
            }

            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }

        if inv.iter().flatten().any(|v| !v.is_finite()) {
            return None;
        }
        Some(Self::from_cols(
            Vec4::new(inv[0][0], inv[1][0], inv[2][0], inv[3][0]),
            Vec4::new(inv[0][1], inv[1][1], inv[2][1], inv[3][1]),
            Vec4::new(inv[0][2], inv[1][2], inv[2][2], inv[3][2]),
            Vec4::new(inv[0][3], inv[1][3], inv[2][3], inv[3][3]),
        ))
    }

    /// Returns the matrix as a column-major 2D array, ready for upload.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.cols.map(|c| [c.x, c.y, c.z, c.w])
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl Mul<Mat4> for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}
