/*

    Declare numeric types used throughout this repo.

    WARNING: If you like to use f32 instead of f64
    during computations, you need to change both of these:
    pub type Float = f32;
    pub type Vector3 = Vec3;

    @date: 2 Oct, 2025
    @author: Bartu
*/

use bevy_math::{DMat3, DMat4, DQuat, DVec2, DVec3, DVec4};

pub type Int = i32;
pub type Float = f64; // WARNING: If you want to change it to f32, don't forget to update Vector3 and Matrix3 types
pub type Vector2 = DVec2;
pub type Vector3 = DVec3;
pub type Vector4 = DVec4;
pub type Matrix3 = DMat3;
pub type Matrix4 = DMat4;
pub type Quaternion = DQuat;

pub fn approx_zero(x: Float) -> bool {
    x.abs() < 1e-8
}

pub fn transform_point(mat: &Matrix4, v: &Vector3) -> Vector3 {
    let v4 = Vector4::new(v.x, v.y, v.z, 1.0);
    let r = *mat * v4;
    Vector3::new(r.x, r.y, r.z)
}

/// Convert an IEEE 754 binary16 bit pattern to f32.
///
/// Vertex position streams may come in as 4-component half precision
/// (see mesh.rs) and there is no half type in core Rust, so the widening
/// is done by hand on the bit level. Handles subnormals, infinities and
/// NaN payloads.
pub fn half_to_float(bits: u16) -> f32 {
    let sign = ((bits & 0x8000) as u32) << 16;
    let exponent = ((bits >> 10) & 0x1f) as u32;
    let mantissa = (bits & 0x3ff) as u32;

    let out = if exponent == 0 {
        if mantissa == 0 {
            sign // signed zero
        } else {
            // Subnormal half; renormalize into the f32 exponent range
            let mut e: i32 = 113; // 127 - 15 + 1
            let mut m = mantissa;
            while m & 0x400 == 0 {
                m <<= 1;
                e -= 1;
            }
            m &= 0x3ff;
            sign | ((e as u32) << 23) | (m << 13)
        }
    } else if exponent == 31 {
        sign | 0x7f80_0000 | (mantissa << 13) // inf / NaN
    } else {
        sign | ((exponent + 112) << 23) | (mantissa << 13)
    };
    f32::from_bits(out)
}
