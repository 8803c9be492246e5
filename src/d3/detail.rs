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

//! Per-reflection geometry for clients that need more than the polyline.

use std::f64::consts::{FRAC_PI_2, PI};

use cgmath::{InnerSpace, Vector3};

use crate::{
    common::{math::clamp, SurfaceId},
    d3::{polygon::Polygon, Path},
};

/// Incidence angles within this margin of the surface count as grazing.
const GRAZING_MARGIN: f64 = 5.0 * PI / 180.0;

/// Geometry of one reflection along a path.
#[derive(Clone, Debug)]
pub struct Reflection {
    pub point: Vector3<f64>,
    pub surface: SurfaceId,

    /// Unit direction of arrival, from the previous path point toward the
    /// reflection point.
    pub incoming: Vector3<f64>,

    /// Unit direction of departure, from the reflection point toward the
    /// next path point.
    pub outgoing: Vector3<f64>,

    /// Surface normal oriented toward the incoming side.
    pub normal: Vector3<f64>,

    /// Angle of incidence in radians. The reflection angle equals it by
    /// specular symmetry.
    pub angle: f64,

    /// Planar coordinates of the reflection point on the surface, measured
    /// from the surface's first vertex along its first edge.
    pub uv: (f64, f64),

    /// Whether the path meets the surface within `GRAZING_MARGIN` of it.
    pub grazing: bool,

    /// Distance along the path from its first point to this reflection.
    pub cumulative_distance: f64,
}

/// A path augmented with per-reflection geometry.
#[derive(Clone, Debug)]
pub struct DetailedPath {
    pub reflections: Vec<Reflection>,
    pub segment_lengths: Vec<f64>,
    pub total_length: f64,
}

impl DetailedPath {
    /// Decorates a raw path against the surfaces it was traced in.
    pub fn decorate(path: &Path, surfaces: &[Polygon]) -> DetailedPath {
        let points = &path.points;

        let mut segment_lengths = Vec::with_capacity(points.len().saturating_sub(1));
        for window in points.windows(2) {
            segment_lengths.push((window[1].point - window[0].point).magnitude());
        }

        let mut reflections = Vec::new();
        let mut cumulative = 0.0;

        for i in 1..points.len().saturating_sub(1) {
            cumulative += segment_lengths[i - 1];

            let surface_id = match points[i].surface {
                Some(id) => id,
                None => continue,
            };
            let surface = &surfaces[surface_id];

            let prev = points[i - 1].point;
            let here = points[i].point;
            let next = points[i + 1].point;

            let incoming = (here - prev).normalize();
            let outgoing = (next - here).normalize();

            let mut normal = surface.plane().normal();
            if normal.dot(prev - here) < 0.0 {
                normal = -normal;
            }

            let angle = clamp((-incoming).dot(normal), -1.0, 1.0).acos();

            reflections.push(Reflection {
                point: here,
                surface: surface_id,
                incoming,
                outgoing,
                normal,
                angle,
                uv: surface_uv(surface, here),
                grazing: angle > FRAC_PI_2 - GRAZING_MARGIN,
                cumulative_distance: cumulative,
            });
        }

        let total_length = segment_lengths.iter().sum();

        DetailedPath {
            reflections,
            segment_lengths,
            total_length,
        }
    }
}

/// Planar coordinates of a point on a polygon, in the orthonormal basis
/// spanned by the polygon's first edge and its in-plane perpendicular.
fn surface_uv(surface: &Polygon, point: Vector3<f64>) -> (f64, f64) {
    let vertices = surface.vertices();
    let origin = vertices[0];
    let e1 = (vertices[1] - origin).normalize();
    let e2 = surface.plane().normal().cross(e1);

    let offset = point - origin;
    (offset.dot(e1), offset.dot(e2))
}
