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

//! Oriented lines in implicit form: the 2D reduction of `d3::plane`.

use std::ops::Neg;

use cgmath::{InnerSpace, Vector2};

use crate::common::math::{PlaneSide, DEGENERACY_EPSILON};

/// Rotates a vector a quarter turn counter-clockwise.
///
/// For a wall running `p1 -> p2` this is the direction of its implicit
/// normal.
pub fn left_perp(v: Vector2<f64>) -> Vector2<f64> {
    Vector2::new(-v.y, v.x)
}

/// An oriented line `n · x = dist` with unit normal. The positive side is
/// the line's *front*.
#[derive(Clone, Debug)]
pub struct Line2 {
    normal: Vector2<f64>,
    dist: f64,
}

impl Neg for Line2 {
    type Output = Line2;

    fn neg(self) -> Self::Output {
        Line2 {
            normal: -self.normal,
            dist: -self.dist,
        }
    }
}

impl Line2 {
    /// Creates a line through two points, with the normal a quarter turn
    /// counter-clockwise from the `a -> b` direction.
    ///
    /// Returns `None` if the points coincide.
    pub fn from_points(a: Vector2<f64>, b: Vector2<f64>) -> Option<Line2> {
        let direction = b - a;
        if direction.magnitude2() < DEGENERACY_EPSILON * DEGENERACY_EPSILON {
            return None;
        }

        let normal = left_perp(direction).normalize();
        Some(Line2 {
            normal,
            dist: normal.dot(a),
        })
    }

    /// Creates a line through `point` with the given normal.
    pub fn from_normal_point(normal: Vector2<f64>, point: Vector2<f64>) -> Line2 {
        let unit = normal.normalize();
        Line2 {
            normal: unit,
            dist: unit.dot(point),
        }
    }

    pub fn normal(&self) -> Vector2<f64> {
        self.normal
    }

    pub fn dist(&self) -> f64 {
        self.dist
    }

    /// A unit vector along the line, such that the normal is its left
    /// perpendicular.
    pub fn direction(&self) -> Vector2<f64> {
        Vector2::new(self.normal.y, -self.normal.x)
    }

    /// Signed distance from the line to the given point. Positive in front.
    pub fn point_dist(&self, point: Vector2<f64>) -> f64 {
        self.normal.dot(point) - self.dist
    }

    pub fn point_side(&self, point: Vector2<f64>, epsilon: f64) -> PlaneSide {
        PlaneSide::from_dist(self.point_dist(point), epsilon)
    }

    /// Mirrors a point across this line.
    pub fn mirror_point(&self, point: Vector2<f64>) -> Vector2<f64> {
        point - 2.0 * self.point_dist(point) * self.normal
    }

    /// Mirrors an entire line across this line.
    ///
    /// Two points of `other` are mirrored and a line is refitted through
    /// them. Reflection reverses handedness, so the refit swaps the points to
    /// keep the mirrored normal pointing where the mirror of `other`'s
    /// normal points.
    pub fn mirror_line(&self, other: &Line2) -> Line2 {
        let a = other.normal * other.dist;
        let b = a + other.direction();

        let a_mirrored = self.mirror_point(a);
        let b_mirrored = self.mirror_point(b);

        match Line2::from_points(b_mirrored, a_mirrored) {
            Some(line) => line,
            None => unreachable!("mirrored unit segment collapsed"),
        }
    }

    /// Parametric distance `t` at which the ray `origin + t * dir` crosses
    /// this line, or `None` if the ray runs parallel to it.
    ///
    /// `t` may be negative; the caller decides whether hits behind the
    /// origin count.
    pub fn ray_intersect(&self, origin: Vector2<f64>, dir: Vector2<f64>) -> Option<f64> {
        let denom = self.normal.dot(dir);
        if denom.abs() < DEGENERACY_EPSILON {
            return None;
        }

        Some((self.dist - self.normal.dot(origin)) / denom)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::math::EPSILON;

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    #[test]
    fn test_from_points_normal_is_left_perp() {
        // A wall along +x has its normal pointing up.
        let line = Line2::from_points(v(0.0, 0.0), v(10.0, 0.0)).expect("distinct points");
        assert!((line.normal() - v(0.0, 1.0)).magnitude() < EPSILON);
        assert!(line.dist().abs() < EPSILON);

        assert!(Line2::from_points(v(3.0, 4.0), v(3.0, 4.0)).is_none());
    }

    #[test]
    fn test_point_dist_and_side() {
        let line = Line2::from_points(v(0.0, 2.0), v(10.0, 2.0)).expect("distinct points");
        assert!((line.point_dist(v(5.0, 5.0)) - 3.0).abs() < EPSILON);
        assert_eq!(line.point_side(v(5.0, 5.0), EPSILON), PlaneSide::Front);
        assert_eq!(line.point_side(v(5.0, -1.0), EPSILON), PlaneSide::Back);
        assert_eq!(line.point_side(v(-3.0, 2.0), EPSILON), PlaneSide::On);
    }

    #[test]
    fn test_mirror_point() {
        let line = Line2::from_normal_point(v(1.0, 0.0), v(2.0, 0.0));
        let mirrored = line.mirror_point(v(5.0, 1.0));
        assert!((mirrored - v(-1.0, 1.0)).magnitude() < EPSILON);
        assert!((line.mirror_point(mirrored) - v(5.0, 1.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_mirror_line_orientation() {
        let mirror = Line2::from_normal_point(v(1.0, 0.0), v(0.0, 0.0));

        // y = 2 facing +y is fixed by mirroring across x = 0.
        let lateral = Line2::from_normal_point(v(0.0, 1.0), v(0.0, 2.0));
        let image = mirror.mirror_line(&lateral);
        assert!((image.normal() - v(0.0, 1.0)).magnitude() < EPSILON);
        assert!((image.dist() - 2.0).abs() < EPSILON);

        // x = 3 facing +x maps to x = -3 facing -x.
        let axial = Line2::from_normal_point(v(1.0, 0.0), v(3.0, 0.0));
        let image = mirror.mirror_line(&axial);
        assert!((image.normal() - v(-1.0, 0.0)).magnitude() < EPSILON);
        assert!(image.point_dist(v(-3.0, 0.0)).abs() < EPSILON);
    }

    #[test]
    fn test_ray_intersect() {
        let line = Line2::from_normal_point(v(0.0, 1.0), v(0.0, 2.0));

        let t = line
            .ray_intersect(v(0.0, 0.0), v(0.0, 1.0))
            .expect("ray hits line");
        assert!((t - 2.0).abs() < EPSILON);

        assert!(line.ray_intersect(v(0.0, 0.0), v(1.0, 0.0)).is_none());
    }
}
