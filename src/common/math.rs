// Copyright © 2018 Cormac O'Brien
//
// Permission is hereby granted, free of charge, to any person obtaining a copy of this software
// and associated documentation files (the "Software"), to deal in the Software without
// restriction, including without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to permit persons to whom the
// Software is furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all copies or
// substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR IMPLIED, INCLUDING
// BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM,
// DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Shared numeric policy.
//!
//! Every tolerance comparison in the crate goes through the constants and the
//! classification helper defined here. Distances are never compared for
//! equality.

use std::ops::Neg;

/// Classification epsilon: points within this distance of a plane or line are
/// considered to lie on it.
pub const EPSILON: f64 = 1e-6;

/// Degeneracy cutoff for denominators in line and plane intersections. A
/// denominator below this magnitude is treated as zero and the intersection is
/// reported as absent.
pub const DEGENERACY_EPSILON: f64 = 1e-10;

/// Minimum aperture area (length in 2D) below which a candidate beam is
/// discarded during tree construction.
pub const MIN_APERTURE_AREA: f64 = 1e-6;

/// Which side of an oriented plane or line a point lies on.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PlaneSide {
    /// Positive side of the normal.
    Front,
    /// Negative side of the normal.
    Back,
    /// Within epsilon of the plane.
    On,
}

impl Neg for PlaneSide {
    type Output = PlaneSide;

    fn neg(self) -> Self::Output {
        match self {
            PlaneSide::Front => PlaneSide::Back,
            PlaneSide::Back => PlaneSide::Front,
            PlaneSide::On => PlaneSide::On,
        }
    }
}

impl PlaneSide {
    pub fn from_dist(dist: f64, epsilon: f64) -> PlaneSide {
        if dist > epsilon {
            PlaneSide::Front
        } else if dist < -epsilon {
            PlaneSide::Back
        } else {
            PlaneSide::On
        }
    }
}

/// Linear interpolation between two scalars.
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

pub fn clamp(val: f64, min: f64, max: f64) -> f64 {
    assert!(min <= max);

    if val < min {
        min
    } else if val > max {
        max
    } else {
        val
    }
}

/// The interpolation parameter of a plane crossing between two signed
/// distances, clamped to `[0, 1]` to defend against floating-point drift.
pub fn crossing_param(d1: f64, d2: f64) -> f64 {
    clamp(d1 / (d1 - d2), 0.0, 1.0)
}
