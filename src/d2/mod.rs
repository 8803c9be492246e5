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

//! Beam tracing in two dimensions.
//!
//! The reduction of `d3` to lines and circles: walls instead of polygons,
//! windows instead of apertures, wedges instead of pyramids. The facade,
//! query passes and caches mirror the 3D ones exactly.

pub mod beam;
pub mod bsp;
pub mod bucket;
pub mod detail;
pub mod line;
pub mod room;
pub mod solver;
pub mod wall;

pub use self::beam::{BeamNode, BeamTree, FailLine, FailLineKind};
pub use self::bsp::{BspHit, BspTree};
pub use self::bucket::{Bucket, SkipCircle};
pub use self::detail::{DetailedPath, Reflection};
pub use self::line::Line2;
pub use self::room::{from_segments, rectangle};
pub use self::wall::{Classification, SegmentHit, Wall};

use cgmath::{InnerSpace, Vector2};

use crate::{
    common::SurfaceId,
    config::Config,
    error::{TraceError, TraceErrorKind},
    metrics::QueryMetrics,
};

use self::solver::Solver;

/// One vertex of a reflection path.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub point: Vector2<f64>,

    /// The wall this point reflects off; `None` at the listener and source
    /// endpoints.
    pub surface: Option<SurfaceId>,
}

/// A specular reflection path, ordered listener first, source last.
#[derive(Clone, Debug, PartialEq)]
pub struct Path {
    pub points: Vec<PathPoint>,
}

impl Path {
    /// The number of reflections along the path.
    pub fn order(&self) -> usize {
        self.points.len().saturating_sub(2)
    }

    /// The wall ids of the interior reflection points, listener side first.
    pub fn surface_ids(&self) -> Vec<SurfaceId> {
        self.points.iter().filter_map(|p| p.surface).collect()
    }

    pub fn total_length(&self) -> f64 {
        self.points
            .windows(2)
            .map(|w| (w[1].point - w[0].point).magnitude())
            .sum()
    }
}

/// A beam exported for visualization: the virtual source, the window it
/// shines through, and where it sits in the tree.
#[derive(Clone, Debug)]
pub struct BeamView {
    pub virtual_source: Vector2<f64>,
    pub aperture: Vec<Vector2<f64>>,
    pub order: u32,
    pub surface_id: SurfaceId,
}

/// The 2D beam-tracing facade.
#[derive(Debug)]
pub struct BeamTracer {
    walls: Vec<Wall>,
    source: Vector2<f64>,
    config: Config,
    bsp: BspTree,
    tree: BeamTree,
    buckets: Vec<Bucket>,
    metrics: QueryMetrics,
}

impl BeamTracer {
    /// Builds the tracer for a scene. Wall ids must equal wall indices.
    pub fn new(
        walls: Vec<Wall>,
        source: Vector2<f64>,
        config: Config,
    ) -> Result<BeamTracer, TraceError> {
        room::validate_scene(&walls)?;
        if !finite(source) {
            return Err(TraceErrorKind::geometry("source position is not finite").into());
        }

        let bsp = BspTree::build(&walls, config.epsilon);
        let tree = BeamTree::build(&walls, source, config.max_order, config.epsilon);
        let buckets = bucket::make_buckets(tree.leaf_count(), config.clamped_bucket_size());

        Ok(BeamTracer {
            walls,
            source,
            config,
            bsp,
            tree,
            buckets,
            metrics: QueryMetrics::default(),
        })
    }

    /// Every specular path of order `0..=max_order` from the source to the
    /// listener.
    pub fn paths(&mut self, listener: Vector2<f64>) -> Result<Vec<Path>, TraceError> {
        if !finite(listener) {
            return Err(TraceErrorKind::query("listener position is not finite").into());
        }

        self.metrics
            .reset(self.tree.leaf_count(), self.buckets.len());

        let mut solver = Solver {
            walls: &self.walls,
            bsp: &self.bsp,
            tree: &mut self.tree,
            buckets: &mut self.buckets,
            metrics: &mut self.metrics,
            config: &self.config,
            source: self.source,
        };

        Ok(solver.solve(listener))
    }

    /// Drops every fail line and skip circle. The trees are untouched.
    pub fn clear_cache(&mut self) {
        self.tree.clear_fail_lines();
        for bucket in &mut self.buckets {
            bucket.skip_circle = None;
        }
    }

    /// Counters for the most recent query.
    pub fn metrics(&self) -> &QueryMetrics {
        &self.metrics
    }

    /// The beams of the tree in traversal order, optionally bounded by
    /// reflection order.
    pub fn beams(&self, max_order: Option<u32>) -> Vec<BeamView> {
        let mut views = Vec::new();

        for node in self.tree.nodes.iter().skip(1) {
            if let Some(limit) = max_order {
                if node.order() > limit {
                    continue;
                }
            }

            let surface_id = match node.surface_id() {
                Some(id) => id,
                None => continue,
            };
            let window = match node.window() {
                Some(window) => vec![window.p1(), window.p2()],
                None => continue,
            };

            views.push(BeamView {
                virtual_source: node.virtual_source(),
                aperture: window,
                order: node.order(),
                surface_id,
            });
        }

        views
    }

    /// Graphviz dump of the BSP tree structure.
    pub fn gen_dot_graph(&self) -> String {
        self.bsp.gen_dot_graph()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn source(&self) -> Vector2<f64> {
        self.source
    }
}

fn finite(v: Vector2<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite()
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::Rng;
    use std::collections::HashSet;

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    /// The classical ten-wall room from the seed scenarios.
    fn ten_wall_room() -> Vec<Wall> {
        from_segments(&[
            (v(100.0, 130.0), v(120.0, 220.0)),
            (v(50.0, 55.0), v(220.0, 60.0)),
            (v(220.0, 60.0), v(250.0, 220.0)),
            (v(50.0, 220.0), v(200.0, 220.0)),
            (v(50.0, 220.0), v(50.0, 55.0)),
            (v(200.0, 220.0), v(40.0, 230.0)),
            (v(40.0, 230.0), v(30.0, 290.0)),
            (v(30.0, 290.0), v(60.0, 270.0)),
            (v(60.0, 270.0), v(290.0, 270.0)),
            (v(290.0, 270.0), v(250.0, 220.0)),
        ])
        .expect("all walls have positive length")
    }

    fn canon(paths: &[Path]) -> Vec<(Vec<SurfaceId>, Vec<Vector2<f64>>)> {
        let mut out: Vec<(Vec<SurfaceId>, Vec<Vector2<f64>>)> = paths
            .iter()
            .map(|p| {
                (
                    p.surface_ids(),
                    p.points.iter().map(|pp| pp.point).collect(),
                )
            })
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    #[test]
    fn test_empty_room_direct_path() {
        let room = from_segments(&[
            (v(0.0, 0.0), v(100.0, 0.0)),
            (v(100.0, 0.0), v(100.0, 100.0)),
            (v(100.0, 100.0), v(0.0, 100.0)),
            (v(0.0, 100.0), v(0.0, 0.0)),
        ])
        .expect("all walls have positive length");

        let mut tracer =
            BeamTracer::new(room, v(50.0, 50.0), Config::with_max_order(2)).expect("valid build");
        let paths = tracer.paths(v(60.0, 60.0)).expect("valid query");

        assert!(!paths.is_empty());

        // Exactly one direct path: two points, the second carrying no
        // surface id.
        let direct: Vec<&Path> = paths.iter().filter(|p| p.points.len() == 2).collect();
        assert_eq!(direct.len(), 1);
        assert_eq!(direct[0].points[1].surface, None);
    }

    #[test]
    fn test_ten_wall_room_order_3() {
        let _ = env_logger::try_init();

        let mut tracer = BeamTracer::new(ten_wall_room(), v(200.0, 80.0), Config::with_max_order(3))
            .expect("valid build");

        let paths = tracer.paths(v(80.0, 100.0)).expect("valid query");
        assert_eq!(paths.len(), 16);
    }

    #[test]
    fn test_ten_wall_path_invariants() {
        let source = v(200.0, 80.0);
        let listener = v(80.0, 100.0);
        let room = ten_wall_room();

        let mut tracer =
            BeamTracer::new(room.clone(), source, Config::with_max_order(3)).expect("valid build");
        let paths = tracer.paths(listener).expect("valid query");

        let eps = 1e-6;
        for path in &paths {
            assert!((path.points.first().expect("non-empty").point - listener).magnitude() < eps);
            assert!((path.points.last().expect("non-empty").point - source).magnitude() < eps);

            for point in &path.points[1..path.points.len() - 1] {
                let wall = &room[point.surface.expect("interior point has a surface")];
                assert!(wall.contains(point.point, 1e-4));
            }

            for i in 1..path.points.len().saturating_sub(1) {
                let prev = path.points[i - 1].point;
                let here = path.points[i].point;
                let next = path.points[i + 1].point;
                let normal = room[path.points[i].surface.expect("interior point")]
                    .line()
                    .normal();

                let incoming = (here - prev).normalize();
                let outgoing = (next - here).normalize();
                let bounced = incoming - 2.0 * incoming.dot(normal) * normal;
                assert!((bounced - outgoing).magnitude() < eps);
            }

            assert!(path.total_length() >= (source - listener).magnitude() - eps);
        }
    }

    #[test]
    fn test_cache_round_trip() {
        let mut tracer = BeamTracer::new(ten_wall_room(), v(200.0, 80.0), Config::with_max_order(3))
            .expect("valid build");

        let l1 = v(80.0, 100.0);
        let l2 = v(150.0, 150.0);

        let _ = tracer.paths(l1).expect("valid query");
        let warm = tracer.paths(l2).expect("valid query");
        tracer.clear_cache();
        let cold = tracer.paths(l2).expect("valid query");

        assert_eq!(canon(&warm), canon(&cold));
    }

    #[test]
    fn test_cache_equivalence() {
        let source = v(200.0, 80.0);
        let listeners = vec![
            v(80.0, 100.0),
            v(150.0, 150.0),
            v(80.0, 102.0),
            v(82.0, 100.0),
            v(220.0, 200.0),
            v(80.0, 102.0),
        ];

        let mut cached = BeamTracer::new(ten_wall_room(), source, Config::with_max_order(3))
            .expect("valid build");
        let mut plain = BeamTracer::new(ten_wall_room(), source, Config::without_caches(3))
            .expect("valid build");

        for listener in listeners {
            let a = cached.paths(listener).expect("valid query");
            let b = plain.paths(listener).expect("valid query");
            assert_eq!(canon(&a), canon(&b), "listener {:?}", listener);
        }
    }

    #[test]
    fn test_order_monotonicity() {
        let source = v(200.0, 80.0);
        let listener = v(80.0, 100.0);

        let mut previous: Option<HashSet<Vec<SurfaceId>>> = None;
        for order in 0..4 {
            let mut tracer =
                BeamTracer::new(ten_wall_room(), source, Config::with_max_order(order))
                    .expect("valid build");
            let ids: HashSet<Vec<SurfaceId>> = tracer
                .paths(listener)
                .expect("valid query")
                .iter()
                .map(|p| p.surface_ids())
                .collect();

            if let Some(prev) = previous {
                assert!(prev.is_subset(&ids), "order {} lost paths", order);
            }
            previous = Some(ids);
        }
    }

    #[test]
    fn test_determinism() {
        let build = || {
            BeamTracer::new(ten_wall_room(), v(200.0, 80.0), Config::with_max_order(3))
                .expect("valid build")
        };

        let listener = v(80.0, 100.0);
        let a = build().paths(listener).expect("valid query");
        let b = build().paths(listener).expect("valid query");
        assert_eq!(a, b);
    }

    #[test]
    fn test_beams_for_visualization() {
        let tracer = BeamTracer::new(ten_wall_room(), v(200.0, 80.0), Config::with_max_order(2))
            .expect("valid build");

        let first_order = tracer.beams(Some(1));
        assert!(!first_order.is_empty());

        for view in &first_order {
            assert_eq!(view.order, 1);
            assert_eq!(view.aperture.len(), 2);
            assert!(view.surface_id < 10);
        }
    }

    #[test]
    fn test_decorated_traced_paths() {
        let source = v(200.0, 80.0);
        let listener = v(80.0, 100.0);
        let room = ten_wall_room();

        let mut tracer =
            BeamTracer::new(room.clone(), source, Config::with_max_order(2)).expect("valid build");
        let paths = tracer.paths(listener).expect("valid query");

        for path in &paths {
            let detailed = DetailedPath::decorate(path, &room);

            assert_eq!(detailed.reflections.len(), path.order());
            assert!((detailed.total_length - path.total_length()).abs() < 1e-9);

            for reflection in &detailed.reflections {
                let bounced = reflection.incoming
                    - 2.0 * reflection.incoming.dot(reflection.normal) * reflection.normal;
                assert!((bounced - reflection.outgoing).magnitude() < 1e-9);

                // Reflection points were traced onto the wall, so the wall
                // parameter must be interior to its clamp range.
                assert!(reflection.wall_param >= 0.0 && reflection.wall_param <= 1.0);
            }
        }
    }

    #[test]
    fn test_build_rejects_bad_input() {
        assert!(BeamTracer::new(Vec::new(), v(0.0, 0.0), Config::default()).is_err());

        let walls = vec![Wall::new(7, v(0.0, 0.0), v(1.0, 0.0)).expect("wall is valid")];
        assert!(BeamTracer::new(walls, v(0.0, 1.0), Config::default()).is_err());
    }

    /// Drives the 2D solver against the 3D solver reduced to a plane: a
    /// rectangular room extruded into vertical quads, source and listener at
    /// mid-height. Every specular path stays in that plane, so the two
    /// tracers must find the same surface sequences.
    #[test]
    fn test_matches_extruded_3d() {
        let mut rng = rand::thread_rng();

        for _ in 0..5 {
            let width = rng.gen_range(5.0, 20.0);
            let height = rng.gen_range(5.0, 20.0);
            let source_2d = v(
                rng.gen_range(0.2 * width, 0.8 * width),
                rng.gen_range(0.2 * height, 0.8 * height),
            );
            let listener_2d = v(
                rng.gen_range(0.2 * width, 0.8 * width),
                rng.gen_range(0.2 * height, 0.8 * height),
            );

            let room_2d = rectangle(width, height).expect("valid dimensions");

            // Extrude each wall into a vertical quad with the same inward
            // normal, keeping the wall ids.
            let depth = 3.0;
            let mid = depth / 2.0;
            let room_3d: Vec<crate::d3::Polygon> = room_2d
                .iter()
                .map(|wall| {
                    let a = wall.p1();
                    let b = wall.p2();
                    crate::d3::Polygon::new(
                        wall.id(),
                        vec![
                            cgmath::Vector3::new(a.x, a.y, 0.0),
                            cgmath::Vector3::new(a.x, a.y, depth),
                            cgmath::Vector3::new(b.x, b.y, depth),
                            cgmath::Vector3::new(b.x, b.y, 0.0),
                        ],
                    )
                    .expect("extruded wall is valid")
                })
                .collect();

            let mut tracer_2d = BeamTracer::new(room_2d, source_2d, Config::with_max_order(2))
                .expect("valid build");
            let mut tracer_3d = crate::d3::BeamTracer::new(
                room_3d,
                cgmath::Vector3::new(source_2d.x, source_2d.y, mid),
                Config::with_max_order(2),
            )
            .expect("valid build");

            let paths_2d = tracer_2d.paths(listener_2d).expect("valid query");
            let paths_3d = tracer_3d
                .paths(cgmath::Vector3::new(listener_2d.x, listener_2d.y, mid))
                .expect("valid query");

            let mut ids_2d: Vec<Vec<SurfaceId>> =
                paths_2d.iter().map(|p| p.surface_ids()).collect();
            let mut ids_3d: Vec<Vec<SurfaceId>> =
                paths_3d.iter().map(|p| p.surface_ids()).collect();
            ids_2d.sort();
            ids_3d.sort();

            assert_eq!(
                ids_2d, ids_3d,
                "2D and extruded 3D disagree for {}x{} source {:?} listener {:?}",
                width, height, source_2d, listener_2d
            );
        }
    }
}
