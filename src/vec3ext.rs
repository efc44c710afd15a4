//! Small vector helpers shared by the camera and rocket systems.

use bevy::prelude::*;

/// Extension predicates and operations on [`Vec3`].
///
/// All methods are total over IEEE-754 triples; there are no error conditions.
pub trait Vec3Ext {
    /// `true` if any axis is NaN.
    fn has_nan(self) -> bool;
    /// `true` if any axis is +∞ or −∞.
    fn has_infinite(self) -> bool;
    /// `true` if any axis is NaN or infinite.
    fn is_non_finite(self) -> bool;
    /// Memberwise (Hadamard) multiplication.
    fn hadamard(self, other: Vec3) -> Vec3;
}

impl Vec3Ext for Vec3 {
    #[inline]
    fn has_nan(self) -> bool {
        self.x.is_nan() || self.y.is_nan() || self.z.is_nan()
    }

    #[inline]
    fn has_infinite(self) -> bool {
        self.x.is_infinite() || self.y.is_infinite() || self.z.is_infinite()
    }

    #[inline]
    fn is_non_finite(self) -> bool {
        self.has_nan() || self.has_infinite()
    }

    #[inline]
    fn hadamard(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x * other.x, self.y * other.y, self.z * other.z)
    }
}
