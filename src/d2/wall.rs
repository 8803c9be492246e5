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

//! Wall segments: the 2D reduction of `d3::polygon`.

use cgmath::{InnerSpace, Vector2};

use crate::{
    common::{
        math::{clamp, crossing_param, PlaneSide, DEGENERACY_EPSILON},
        SurfaceId,
    },
    d2::line::Line2,
    error::{TraceError, TraceErrorKind},
};

/// Classification of a wall relative to an oriented line.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Classification {
    /// Both endpoints in front of the line (or on it, with at least one in
    /// front).
    Front,
    /// Both endpoints behind the line (or on it, with at least one behind).
    Back,
    /// Both endpoints on the line.
    Coplanar,
    /// Endpoints on both sides.
    Spanning,
}

/// A ray/wall intersection.
///
/// Replaces the positional `(x, y, onSeg1, onSeg2, ...)` tuple commonly used
/// for segment intersections with named fields.
#[derive(Clone, Debug)]
pub struct SegmentHit {
    /// Parametric distance along the ray, in units of the ray direction.
    pub t: f64,

    /// Position along the wall, `0` at `p1`, `1` at `p2`.
    pub s: f64,

    pub point: Vector2<f64>,
}

/// A wall segment from `p1` to `p2`.
///
/// The implicit normal is a quarter turn counter-clockwise from the `p1 ->
/// p2` direction; the side it points to is the wall's reflective front.
#[derive(Clone, Debug)]
pub struct Wall {
    id: SurfaceId,
    p1: Vector2<f64>,
    p2: Vector2<f64>,
    line: Line2,
    material: Option<String>,
}

impl Wall {
    /// Creates a wall. Fails with `InvalidGeometry` on a zero-length
    /// segment.
    pub fn new(id: SurfaceId, p1: Vector2<f64>, p2: Vector2<f64>) -> Result<Wall, TraceError> {
        let line = match Line2::from_points(p1, p2) {
            Some(line) => line,
            None => {
                return Err(
                    TraceErrorKind::geometry(format!("wall {} has zero length", id)).into(),
                );
            }
        };

        Ok(Wall {
            id,
            p1,
            p2,
            line,
            material: None,
        })
    }

    /// Attaches a material tag.
    pub fn with_material<S>(mut self, material: S) -> Wall
    where
        S: AsRef<str>,
    {
        self.material = Some(material.as_ref().to_owned());
        self
    }

    /// A fragment of this wall: same id, line and material, new endpoints.
    ///
    /// Used by splitting and clipping, which guarantee the endpoints stay on
    /// the supporting line.
    pub(crate) fn fragment(&self, p1: Vector2<f64>, p2: Vector2<f64>) -> Wall {
        Wall {
            id: self.id,
            p1,
            p2,
            line: self.line.clone(),
            material: self.material.clone(),
        }
    }

    /// A fragment, unless splitting drift collapsed it to a point.
    fn sub_segment(&self, p1: Vector2<f64>, p2: Vector2<f64>) -> Option<Wall> {
        if (p2 - p1).magnitude2() < DEGENERACY_EPSILON * DEGENERACY_EPSILON {
            None
        } else {
            Some(self.fragment(p1, p2))
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn p1(&self) -> Vector2<f64> {
        self.p1
    }

    pub fn p2(&self) -> Vector2<f64> {
        self.p2
    }

    pub fn line(&self) -> &Line2 {
        &self.line
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_ref().map(|m| m.as_str())
    }

    pub fn length(&self) -> f64 {
        (self.p2 - self.p1).magnitude()
    }

    pub fn midpoint(&self) -> Vector2<f64> {
        (self.p1 + self.p2) / 2.0
    }

    /// Tests whether a point on the supporting line lies within the segment.
    pub fn contains(&self, point: Vector2<f64>, epsilon: f64) -> bool {
        if self.line.point_dist(point).abs() > epsilon {
            return false;
        }

        let direction = (self.p2 - self.p1) / self.length();
        let along = (point - self.p1).dot(direction);
        along >= -epsilon && along <= self.length() + epsilon
    }

    /// First intersection of the ray `origin + t * dir` with this wall for
    /// `t >= 0`, or `None`.
    pub fn ray_intersection(
        &self,
        origin: Vector2<f64>,
        dir: Vector2<f64>,
        epsilon: f64,
    ) -> Option<SegmentHit> {
        let t = self.line.ray_intersect(origin, dir)?;
        if t < 0.0 {
            return None;
        }

        let point = origin + dir * t;
        let length = self.length();
        let along = (point - self.p1).dot((self.p2 - self.p1) / length);
        if along < -epsilon || along > length + epsilon {
            return None;
        }

        Some(SegmentHit {
            t,
            s: clamp(along / length, 0.0, 1.0),
            point,
        })
    }

    /// Classifies this wall relative to an oriented line.
    pub fn classify(&self, line: &Line2, epsilon: f64) -> Classification {
        let mut front = false;
        let mut back = false;

        for p in [self.p1, self.p2].iter() {
            match line.point_side(*p, epsilon) {
                PlaneSide::Front => front = true,
                PlaneSide::Back => back = true,
                PlaneSide::On => (),
            }
        }

        match (front, back) {
            (true, true) => Classification::Spanning,
            (true, false) => Classification::Front,
            (false, true) => Classification::Back,
            (false, false) => Classification::Coplanar,
        }
    }

    /// Splits this wall by a line into front and back fragments.
    ///
    /// A wall that does not span the line comes back whole on its side.
    pub fn split(&self, line: &Line2, epsilon: f64) -> (Option<Wall>, Option<Wall>) {
        match self.classify(line, epsilon) {
            Classification::Front | Classification::Coplanar => (Some(self.clone()), None),
            Classification::Back => (None, Some(self.clone())),
            Classification::Spanning => {
                let d1 = line.point_dist(self.p1);
                let d2 = line.point_dist(self.p2);
                let t = crossing_param(d1, d2);
                let mid = self.p1 + (self.p2 - self.p1) * t;

                // Fragments in p1 -> p2 order keep the implicit normal.
                let (near, far) = (self.sub_segment(self.p1, mid), self.sub_segment(mid, self.p2));
                if d1 > 0.0 {
                    (near, far)
                } else {
                    (far, near)
                }
            }
        }
    }

    /// Keeps the part of this wall in front of the line, with `d >=
    /// -epsilon` as inside.
    pub fn clip_by_line(&self, line: &Line2, epsilon: f64) -> Option<Wall> {
        let d1 = line.point_dist(self.p1);
        let d2 = line.point_dist(self.p2);
        let p1_inside = d1 >= -epsilon;
        let p2_inside = d2 >= -epsilon;

        match (p1_inside, p2_inside) {
            (true, true) => Some(self.clone()),
            (false, false) => None,
            _ => {
                let t = crossing_param(d1, d2);
                let mid = self.p1 + (self.p2 - self.p1) * t;

                if p1_inside {
                    self.sub_segment(self.p1, mid)
                } else {
                    self.sub_segment(mid, self.p2)
                }
            }
        }
    }

    /// Clips by every line in turn, short-circuiting once nothing is left.
    pub fn clip_by_lines(&self, lines: &[Line2], epsilon: f64) -> Option<Wall> {
        let mut current = self.clone();
        for line in lines {
            current = current.clip_by_line(line, epsilon)?;
            if current.length() < DEGENERACY_EPSILON {
                return None;
            }
        }

        Some(current)
    }

    /// True iff some line in the set has both endpoints of this wall
    /// strictly behind it.
    pub fn quick_reject(&self, lines: &[Line2], epsilon: f64) -> bool {
        lines.iter().any(|line| {
            line.point_dist(self.p1) < -epsilon && line.point_dist(self.p2) < -epsilon
        })
    }
}
