use std::ops::Range;

use crate::vector::Vec3;
use crate::quaternion::Quaternion;

/// Constant for converting u64 numbers to f64s in [0,1).
/// It is the maximum value of mantissa plus one.
pub const F64_MANTISSA: f64 = (1u64 << f64::MANTISSA_DIGITS) as f64; // is 2^53


/// Xorshift generator for reproducible test inputs.
pub struct Randf64 {
    state: u64,
}
impl Randf64 {
    pub fn seed(seed: u64) -> Self {
        Self {
            state: seed,
        }
    }
    pub fn next(&mut self) -> f64 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 7;
        self.state ^= self.state << 17;
        (self.state >> 11) as f64 / F64_MANTISSA
    }
    pub fn next_in(&mut self, range: Range<f64>) -> f64 {
        (range.end - range.start) * self.next() + range.start
    }
    pub fn vec3_in(&mut self, range: Range<f64>) -> Vec3 {
        Vec3::new(
            self.next_in(range.clone()),
            self.next_in(range.clone()),
            self.next_in(range),
        )
    }
    /// Rejection-samples the unit 4-ball, then projects onto the sphere.
    pub fn unit_quaternion(&mut self) -> Quaternion {
        loop {
            let v = self.vec3_in(-1.0..1.0);
            let q = Quaternion { v, s: self.next_in(-1.0..1.0) };
            let len_sq = q.dot(q);
            if len_sq > 1e-6 && len_sq <= 1.0 {
                return q.normalized();
            }
        }
    }
}
