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

//! Per-reflection geometry for 2D paths.

use std::f64::consts::{FRAC_PI_2, PI};

use cgmath::{InnerSpace, Vector2};

use crate::{
    common::{math::clamp, SurfaceId},
    d2::{wall::Wall, Path},
};

/// Incidence angles within this margin of the wall count as grazing.
const GRAZING_MARGIN: f64 = 5.0 * PI / 180.0;

/// Geometry of one reflection along a path.
#[derive(Clone, Debug)]
pub struct Reflection {
    pub point: Vector2<f64>,
    pub surface: SurfaceId,

    /// Unit direction of arrival, from the previous path point toward the
    /// reflection point.
    pub incoming: Vector2<f64>,

    /// Unit direction of departure.
    pub outgoing: Vector2<f64>,

    /// Wall normal oriented toward the incoming side.
    pub normal: Vector2<f64>,

    /// Angle of incidence in radians. The reflection angle equals it by
    /// specular symmetry.
    pub angle: f64,

    /// Position along the wall, `0` at `p1`, `1` at `p2`, clamped.
    pub wall_param: f64,

    /// Whether the path meets the wall within `GRAZING_MARGIN` of it.
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
    /// Decorates a raw path against the walls it was traced in.
    pub fn decorate(path: &Path, walls: &[Wall]) -> DetailedPath {
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
            let wall = &walls[surface_id];

            let prev = points[i - 1].point;
            let here = points[i].point;
            let next = points[i + 1].point;

            let incoming = (here - prev).normalize();
            let outgoing = (next - here).normalize();

            let mut normal = wall.line().normal();
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
                wall_param: wall_param(wall, here),
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

/// Position of a point along a wall as a parameter in `[0, 1]`.
fn wall_param(wall: &Wall, point: Vector2<f64>) -> f64 {
    let direction = wall.p2() - wall.p1();
    let param = (point - wall.p1()).dot(direction) / direction.magnitude2();
    clamp(param, 0.0, 1.0)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{common::math::EPSILON, d2::PathPoint};

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    fn bottom_wall() -> Wall {
        Wall::new(0, v(0.0, 0.0), v(10.0, 0.0)).expect("wall is valid")
    }

    fn one_bounce_path() -> Path {
        Path {
            points: vec![
                PathPoint {
                    point: v(2.0, 3.0),
                    surface: None,
                },
                PathPoint {
                    point: v(5.0, 0.0),
                    surface: Some(0),
                },
                PathPoint {
                    point: v(8.0, 3.0),
                    surface: None,
                },
            ],
        }
    }

    #[test]
    fn test_decorate_symmetric_bounce() {
        let walls = vec![bottom_wall()];
        let detailed = DetailedPath::decorate(&one_bounce_path(), &walls);

        assert_eq!(detailed.reflections.len(), 1);
        let reflection = &detailed.reflections[0];

        assert!((reflection.normal - v(0.0, 1.0)).magnitude() < EPSILON);
        assert!((reflection.angle - PI / 4.0).abs() < EPSILON);
        assert!((reflection.wall_param - 0.5).abs() < EPSILON);
        assert!(!reflection.grazing);

        let bounced = reflection.incoming
            - 2.0 * reflection.incoming.dot(reflection.normal) * reflection.normal;
        assert!((bounced - reflection.outgoing).magnitude() < EPSILON);

        let segment = 18.0f64.sqrt();
        assert!((reflection.cumulative_distance - segment).abs() < EPSILON);
        assert!((detailed.total_length - 2.0 * segment).abs() < EPSILON);
    }

    #[test]
    fn test_wall_param_clamped() {
        let wall = bottom_wall();
        assert!((wall_param(&wall, v(2.5, 0.0)) - 0.25).abs() < EPSILON);
        assert_eq!(wall_param(&wall, v(-3.0, 0.0)), 0.0);
        assert_eq!(wall_param(&wall, v(30.0, 0.0)), 1.0);
    }

    #[test]
    fn test_decorate_grazing() {
        let walls = vec![bottom_wall()];
        let path = Path {
            points: vec![
                PathPoint {
                    point: v(0.0, 0.1),
                    surface: None,
                },
                PathPoint {
                    point: v(5.0, 0.0),
                    surface: Some(0),
                },
                PathPoint {
                    point: v(10.0, 0.1),
                    surface: None,
                },
            ],
        };

        let detailed = DetailedPath::decorate(&path, &walls);
        assert!(detailed.reflections[0].grazing);
    }

    #[test]
    fn test_decorate_direct_path() {
        let walls = vec![bottom_wall()];
        let path = Path {
            points: vec![
                PathPoint {
                    point: v(1.0, 1.0),
                    surface: None,
                },
                PathPoint {
                    point: v(4.0, 5.0),
                    surface: None,
                },
            ],
        };

        let detailed = DetailedPath::decorate(&path, &walls);
        assert!(detailed.reflections.is_empty());
        assert!((detailed.total_length - 5.0).abs() < EPSILON);
    }
}
