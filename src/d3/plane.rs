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

//! Oriented planes in implicit form.

use std::ops::Neg;

use cgmath::{InnerSpace, Vector3};

use crate::common::math::{PlaneSide, DEGENERACY_EPSILON};

/// An oriented plane `n · x = dist` with unit normal.
///
/// The positive side of the plane (the direction the normal points) is its
/// *front*.
#[derive(Clone, Debug)]
pub struct Plane {
    normal: Vector3<f64>,
    dist: f64,
}

impl Neg for Plane {
    type Output = Plane;

    fn neg(self) -> Self::Output {
        Plane {
            normal: -self.normal,
            dist: -self.dist,
        }
    }
}

impl Plane {
    /// Creates a plane from a normal and a signed distance from the origin.
    ///
    /// The normal is unit-normalized; `dist` is rescaled accordingly.
    pub fn new(normal: Vector3<f64>, dist: f64) -> Plane {
        let magnitude = normal.magnitude();
        Plane {
            normal: normal / magnitude,
            dist: dist / magnitude,
        }
    }

    /// Creates a plane through three points wound counter-clockwise when seen
    /// from the front.
    ///
    /// Returns `None` if the points are collinear or coincident.
    pub fn from_points(a: Vector3<f64>, b: Vector3<f64>, c: Vector3<f64>) -> Option<Plane> {
        let normal = (b - a).cross(c - a);
        if normal.magnitude2() < DEGENERACY_EPSILON {
            return None;
        }

        let unit = normal.normalize();
        Some(Plane {
            normal: unit,
            dist: unit.dot(a),
        })
    }

    /// Creates a plane through `point` with the given normal.
    pub fn from_normal_point(normal: Vector3<f64>, point: Vector3<f64>) -> Plane {
        let unit = normal.normalize();
        Plane {
            normal: unit,
            dist: unit.dot(point),
        }
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// Signed distance from the plane to the given point. Positive in front.
    pub fn point_dist(&self, point: Vector3<f64>) -> f64 {
        self.normal.dot(point) - self.dist
    }

    pub fn point_side(&self, point: Vector3<f64>, epsilon: f64) -> PlaneSide {
        PlaneSide::from_dist(self.point_dist(point), epsilon)
    }

    /// Mirrors a point across this plane.
    pub fn mirror_point(&self, point: Vector3<f64>) -> Vector3<f64> {
        point - 2.0 * self.point_dist(point) * self.normal
    }

    /// Mirrors an entire plane across this plane.
    ///
    /// Three non-collinear points of `other` are mirrored and a plane is
    /// refitted through them. Reflection reverses handedness, so the refit
    /// swaps two of the points to keep the mirrored normal pointing where the
    /// mirror of `other`'s normal points.
    pub fn mirror_plane(&self, other: &Plane) -> Plane {
        let (t1, t2) = other.tangents();
        let origin = other.normal * other.dist;

        let a = self.mirror_point(origin);
        let b = self.mirror_point(origin + t1);
        let c = self.mirror_point(origin + t2);

        // t1 and t2 are orthonormal, so a/c/b can never be collinear.
        match Plane::from_points(a, c, b) {
            Some(plane) => plane,
            None => unreachable!("mirrored orthonormal tangents are collinear"),
        }
    }

    /// Parametric distance `t` at which the ray `origin + t * dir` crosses
    /// this plane, or `None` if the ray runs parallel to it.
    ///
    /// `t` may be negative; the caller decides whether hits behind the origin
    /// count.
    pub fn ray_intersect(&self, origin: Vector3<f64>, dir: Vector3<f64>) -> Option<f64> {
        let denom = self.normal.dot(dir);
        if denom.abs() < DEGENERACY_EPSILON {
            return None;
        }

        Some((self.dist - self.normal.dot(origin)) / denom)
    }

    /// An orthonormal tangent basis `(t1, t2)` with `t1 × t2 = normal`.
    fn tangents(&self) -> (Vector3<f64>, Vector3<f64>) {
        let reference = if self.normal.x.abs() < 0.9 {
            Vector3::new(1.0, 0.0, 0.0)
        } else {
            Vector3::new(0.0, 1.0, 0.0)
        };

        let t1 = self.normal.cross(reference).normalize();
        let t2 = self.normal.cross(t1);
        (t1, t2)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::math::EPSILON;

    fn v(x: f64, y: f64, z: f64) -> Vector3<f64> {
        Vector3::new(x, y, z)
    }

    #[test]
    fn test_from_points_ccw_normal() {
        // Counter-clockwise in the xy-plane seen from +z.
        let plane = Plane::from_points(v(0.0, 0.0, 1.0), v(1.0, 0.0, 1.0), v(0.0, 1.0, 1.0))
            .expect("non-degenerate");
        assert!((plane.normal() - v(0.0, 0.0, 1.0)).magnitude() < EPSILON);
        assert!((plane.dist() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_from_points_degenerate() {
        assert!(Plane::from_points(v(0.0, 0.0, 0.0), v(1.0, 1.0, 1.0), v(2.0, 2.0, 2.0)).is_none());
        assert!(Plane::from_points(v(3.0, 0.0, 0.0), v(3.0, 0.0, 0.0), v(0.0, 1.0, 0.0)).is_none());
    }

    #[test]
    fn test_point_dist_and_side() {
        let plane = Plane::from_normal_point(v(0.0, 0.0, 2.0), v(0.0, 0.0, 3.0));
        assert!((plane.point_dist(v(5.0, 5.0, 4.0)) - 1.0).abs() < EPSILON);
        assert_eq!(plane.point_side(v(0.0, 0.0, 4.0), EPSILON), PlaneSide::Front);
        assert_eq!(plane.point_side(v(0.0, 0.0, 2.0), EPSILON), PlaneSide::Back);
        assert_eq!(plane.point_side(v(7.0, -2.0, 3.0), EPSILON), PlaneSide::On);
    }

    #[test]
    fn test_mirror_point() {
        let plane = Plane::from_normal_point(v(1.0, 0.0, 0.0), v(2.0, 0.0, 0.0));
        let mirrored = plane.mirror_point(v(5.0, 1.0, 1.0));
        assert!((mirrored - v(-1.0, 1.0, 1.0)).magnitude() < EPSILON);

        // Mirroring twice is the identity.
        let back = plane.mirror_point(mirrored);
        assert!((back - v(5.0, 1.0, 1.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_mirror_plane_orientation() {
        // Mirror the plane z = 1 (facing +z) across the plane x = 0. The
        // image is still z = 1 and must still face +z.
        let mirror = Plane::from_normal_point(v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0));
        let target = Plane::from_normal_point(v(0.0, 0.0, 1.0), v(0.0, 0.0, 1.0));

        let image = mirror.mirror_plane(&target);
        assert!((image.normal() - v(0.0, 0.0, 1.0)).magnitude() < EPSILON);
        assert!((image.dist() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_mirror_plane_oblique() {
        // A tilted plane mirrored across x = 0: the x component of the normal
        // flips, everything else is preserved.
        let mirror = Plane::from_normal_point(v(1.0, 0.0, 0.0), v(0.0, 0.0, 0.0));
        let target = Plane::from_normal_point(v(1.0, 1.0, 0.0), v(1.0, 0.0, 0.0));

        let image = mirror.mirror_plane(&target);
        let expected_normal = v(-1.0, 1.0, 0.0).normalize();
        assert!((image.normal() - expected_normal).magnitude() < EPSILON);
        assert!((image.point_dist(v(-1.0, 0.0, 0.0))).abs() < EPSILON);
    }

    #[test]
    fn test_ray_intersect() {
        let plane = Plane::from_normal_point(v(0.0, 0.0, 1.0), v(0.0, 0.0, 2.0));

        let t = plane
            .ray_intersect(v(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0))
            .expect("ray hits plane");
        assert!((t - 2.0).abs() < EPSILON);

        // Behind the origin: still reported, caller filters.
        let t = plane
            .ray_intersect(v(0.0, 0.0, 4.0), v(0.0, 0.0, 1.0))
            .expect("ray line hits plane");
        assert!((t + 2.0).abs() < EPSILON);

        // Parallel ray: no intersection.
        assert!(plane
            .ray_intersect(v(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_neg() {
        let plane = Plane::from_normal_point(v(0.0, 1.0, 0.0), v(0.0, 3.0, 0.0));
        let flipped = -plane.clone();
        assert!((flipped.normal() + plane.normal()).magnitude() < EPSILON);
        assert!((plane.point_dist(v(1.0, 5.0, 0.0)) + flipped.point_dist(v(1.0, 5.0, 0.0))).abs() < EPSILON);
    }

    #[test]
    fn test_mirror_involutions() {
        // Mirroring any point or plane twice across the same plane is the
        // identity, for arbitrary mirror orientations.
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let normal = v(
                rng.gen_range(-1.0, 1.0),
                rng.gen_range(-1.0, 1.0),
                rng.gen_range(-1.0, 1.0),
            );
            if normal.magnitude2() < 1e-3 {
                continue;
            }
            let anchor = v(
                rng.gen_range(-10.0, 10.0),
                rng.gen_range(-10.0, 10.0),
                rng.gen_range(-10.0, 10.0),
            );
            let mirror = Plane::from_normal_point(normal, anchor);

            let point = v(
                rng.gen_range(-10.0, 10.0),
                rng.gen_range(-10.0, 10.0),
                rng.gen_range(-10.0, 10.0),
            );
            let twice = mirror.mirror_point(mirror.mirror_point(point));
            assert!((twice - point).magnitude() < 1e-9);

            // Mirrored signed distances are preserved: the image of a point
            // is exactly as far from the image of a plane.
            let target = Plane::from_normal_point(v(0.3, -0.7, 0.9), v(1.0, 2.0, -1.0));
            let image = mirror.mirror_plane(&target);
            let d_before = target.point_dist(point);
            let d_after = image.point_dist(mirror.mirror_point(point));
            assert!((d_before - d_after).abs() < 1e-9);
        }
    }
}
