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

//! Convex polygons and the clipping operations the beam tree is built from.

use cgmath::{InnerSpace, Vector3, Zero};

use crate::{
    common::{
        math::{crossing_param, PlaneSide, DEGENERACY_EPSILON},
        SurfaceId,
    },
    d3::plane::Plane,
    error::{TraceError, TraceErrorKind},
};

/// Classification of a polygon relative to an oriented plane.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Classification {
    /// Every vertex in front of the plane (or on it, with at least one in
    /// front).
    Front,
    /// Every vertex behind the plane (or on it, with at least one behind).
    Back,
    /// Every vertex on the plane.
    Coplanar,
    /// Vertices on both sides.
    Spanning,
}

/// A ray/polygon intersection.
#[derive(Clone, Debug)]
pub struct RayHit {
    /// Parametric distance along the ray, in units of the ray direction.
    pub t: f64,
    pub point: Vector3<f64>,
}

/// A convex planar polygon with counter-clockwise winding seen from the
/// front of its supporting plane.
#[derive(Clone, Debug)]
pub struct Polygon {
    id: SurfaceId,
    vertices: Vec<Vector3<f64>>,
    plane: Plane,
    material: Option<String>,
}

impl Polygon {
    /// Creates a polygon, fitting its supporting plane from the vertex loop.
    ///
    /// Fails with `InvalidGeometry` if the loop has fewer than three
    /// vertices, encloses no area, or is not convex.
    pub fn new(id: SurfaceId, vertices: Vec<Vector3<f64>>) -> Result<Polygon, TraceError> {
        if vertices.len() < 3 {
            return Err(TraceErrorKind::geometry(format!(
                "polygon {} has fewer than 3 vertices",
                id
            ))
            .into());
        }

        // Newell's method: robust normal for any planar loop, with magnitude
        // twice the enclosed area.
        let newell = newell_normal(&vertices);
        if newell.magnitude() * 0.5 < DEGENERACY_EPSILON {
            return Err(
                TraceErrorKind::geometry(format!("polygon {} is degenerate", id)).into(),
            );
        }

        let normal = newell.normalize();
        let centroid = vertex_mean(&vertices);
        let plane = Plane::from_normal_point(normal, centroid);

        let extent = vertices
            .iter()
            .map(|v| (v - centroid).magnitude())
            .fold(1.0f64, f64::max);
        for (i, v) in vertices.iter().enumerate() {
            if plane.point_dist(*v).abs() > 1e-6 * extent {
                return Err(TraceErrorKind::geometry(format!(
                    "polygon {} is not planar at vertex {}",
                    id, i
                ))
                .into());
            }
        }

        let polygon = Polygon {
            id,
            vertices,
            plane,
            material: None,
        };

        if !polygon.is_convex() {
            return Err(
                TraceErrorKind::geometry(format!("polygon {} is not convex", id)).into(),
            );
        }

        Ok(polygon)
    }

    /// Attaches a material tag.
    pub fn with_material<S>(mut self, material: S) -> Polygon
    where
        S: AsRef<str>,
    {
        self.material = Some(material.as_ref().to_owned());
        self
    }

    /// A fragment of this polygon: same id, plane and material, new loop.
    ///
    /// Used by splitting and clipping, which guarantee the loop stays on the
    /// supporting plane.
    pub(crate) fn fragment(&self, vertices: Vec<Vector3<f64>>) -> Polygon {
        Polygon {
            id: self.id,
            vertices,
            plane: self.plane.clone(),
            material: self.material.clone(),
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn vertices(&self) -> &[Vector3<f64>] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn material(&self) -> Option<&str> {
        self.material.as_ref().map(|m| m.as_str())
    }

    pub fn area(&self) -> f64 {
        newell_normal(&self.vertices).magnitude() * 0.5
    }

    pub fn centroid(&self) -> Vector3<f64> {
        vertex_mean(&self.vertices)
    }

    /// Iterates the edges as `(start, end)` vertex pairs, closing the loop.
    pub fn edges(&self) -> impl Iterator<Item = (Vector3<f64>, Vector3<f64>)> + '_ {
        let count = self.vertices.len();
        (0..count).map(move |i| (self.vertices[i], self.vertices[(i + 1) % count]))
    }

    /// Tests whether a point on the supporting plane lies inside the polygon.
    ///
    /// For every edge of a counter-clockwise loop, the cross product of the
    /// edge with the vector to the point must not oppose the normal.
    pub fn contains(&self, point: Vector3<f64>, epsilon: f64) -> bool {
        for (start, end) in self.edges() {
            let cross = (end - start).cross(point - start);
            if cross.dot(self.plane.normal()) < -epsilon {
                return false;
            }
        }

        true
    }

    /// First intersection of the ray `origin + t * dir` with this polygon for
    /// `t >= 0`, or `None`.
    pub fn ray_intersection(
        &self,
        origin: Vector3<f64>,
        dir: Vector3<f64>,
        epsilon: f64,
    ) -> Option<RayHit> {
        let t = self.plane.ray_intersect(origin, dir)?;
        if t < 0.0 {
            return None;
        }

        let point = origin + dir * t;
        if !self.contains(point, epsilon) {
            return None;
        }

        Some(RayHit { t, point })
    }

    /// Classifies this polygon relative to an oriented plane.
    pub fn classify(&self, plane: &Plane, epsilon: f64) -> Classification {
        let mut front = false;
        let mut back = false;

        for v in &self.vertices {
            match plane.point_side(*v, epsilon) {
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

    /// Splits this polygon by a plane into front and back fragments.
    ///
    /// A vertex on the plane is added to both sides; a crossing edge
    /// contributes an interpolated vertex to both sides. A side with fewer
    /// than three vertices is reported as `None`.
    pub fn split(&self, plane: &Plane, epsilon: f64) -> (Option<Polygon>, Option<Polygon>) {
        let count = self.vertices.len();
        let dists: Vec<f64> = self.vertices.iter().map(|v| plane.point_dist(*v)).collect();
        let sides: Vec<PlaneSide> = dists
            .iter()
            .map(|d| PlaneSide::from_dist(*d, epsilon))
            .collect();

        let mut front_verts = Vec::new();
        let mut back_verts = Vec::new();

        for i in 0..count {
            let j = (i + 1) % count;
            let vi = self.vertices[i];

            match sides[i] {
                PlaneSide::Front => front_verts.push(vi),
                PlaneSide::Back => back_verts.push(vi),
                PlaneSide::On => {
                    front_verts.push(vi);
                    back_verts.push(vi);
                }
            }

            let crossing = (sides[i] == PlaneSide::Front && sides[j] == PlaneSide::Back)
                || (sides[i] == PlaneSide::Back && sides[j] == PlaneSide::Front);
            if crossing {
                let t = crossing_param(dists[i], dists[j]);
                let v = vi + (self.vertices[j] - vi) * t;
                front_verts.push(v);
                back_verts.push(v);
            }
        }

        let front = if front_verts.len() >= 3 {
            Some(self.fragment(front_verts))
        } else {
            None
        };
        let back = if back_verts.len() >= 3 {
            Some(self.fragment(back_verts))
        } else {
            None
        };

        (front, back)
    }

    /// Keeps the part of this polygon in front of the plane
    /// (Sutherland-Hodgman with `d >= -epsilon` as inside).
    pub fn clip_by_plane(&self, plane: &Plane, epsilon: f64) -> Option<Polygon> {
        let count = self.vertices.len();
        let mut out = Vec::new();

        for i in 0..count {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % count];
            let da = plane.point_dist(a);
            let db = plane.point_dist(b);
            let a_inside = da >= -epsilon;
            let b_inside = db >= -epsilon;

            if a_inside {
                out.push(a);
            }

            if a_inside != b_inside {
                let t = crossing_param(da, db);
                out.push(a + (b - a) * t);
            }
        }

        if out.len() < 3 {
            None
        } else {
            Some(self.fragment(out))
        }
    }

    /// Clips by every plane in turn, short-circuiting once nothing is left.
    pub fn clip_by_planes(&self, planes: &[Plane], epsilon: f64) -> Option<Polygon> {
        let mut current = self.clone();
        for plane in planes {
            current = current.clip_by_plane(plane, epsilon)?;
        }

        Some(current)
    }

    /// True iff some plane in the set has every vertex of this polygon
    /// strictly behind it, so clipping cannot leave anything.
    pub fn quick_reject(&self, planes: &[Plane], epsilon: f64) -> bool {
        planes
            .iter()
            .any(|plane| self.vertices.iter().all(|v| plane.point_dist(*v) < -epsilon))
    }

    fn is_convex(&self) -> bool {
        let count = self.vertices.len();
        let normal = self.plane.normal();

        for i in 0..count {
            let a = self.vertices[i];
            let b = self.vertices[(i + 1) % count];
            let c = self.vertices[(i + 2) % count];

            // A right turn relative to the winding normal breaks convexity;
            // collinear vertices are tolerated.
            if (b - a).cross(c - b).dot(normal) < -DEGENERACY_EPSILON {
                return false;
            }
        }

        true
    }
}

fn newell_normal(vertices: &[Vector3<f64>]) -> Vector3<f64> {
    let mut normal = Vector3::zero();
    let count = vertices.len();

    for i in 0..count {
        let a = vertices[i];
        let b = vertices[(i + 1) % count];
        normal += a.cross(b);
    }

    normal
}

fn vertex_mean(vertices: &[Vector3<f64>]) -> Vector3<f64> {
    let mut sum = Vector3::zero();
    for v in vertices {
        sum += *v;
    }

    sum / vertices.len() as f64
}
