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

//! Beam tracing in three dimensions.
//!
//! `BeamTracer` owns everything built from a `(geometry, source, config)`
//! triple: the surface array, the BSP tree, the beam tree and the bucket
//! list. Queries only read those structures, except for the fail-plane and
//! skip-sphere caches, which is why `paths` takes `&mut self`: one writer at
//! a time is the whole concurrency policy.

pub mod beam;
pub mod bsp;
pub mod bucket;
pub mod detail;
pub mod plane;
pub mod polygon;
pub mod room;
pub mod solver;

pub use self::beam::{BeamNode, BeamTree, FailPlane, FailPlaneKind};
pub use self::bsp::{BspHit, BspTree};
pub use self::bucket::{Bucket, SkipSphere};
pub use self::detail::{DetailedPath, Reflection};
pub use self::plane::Plane;
pub use self::polygon::{Classification, Polygon, RayHit};
pub use self::room::shoebox;

use cgmath::{InnerSpace, Vector3};

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
    pub point: Vector3<f64>,

    /// The surface this point reflects off; `None` at the listener and
    /// source endpoints.
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

    /// The surface ids of the interior reflection points, listener side
    /// first.
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

/// A beam exported for visualization: the virtual source, the aperture
/// polygon it shines through, and where it sits in the tree.
#[derive(Clone, Debug)]
pub struct BeamView {
    pub virtual_source: Vector3<f64>,
    pub aperture: Vec<Vector3<f64>>,
    pub order: u32,
    pub surface_id: SurfaceId,
}

/// The 3D beam-tracing facade.
#[derive(Debug)]
pub struct BeamTracer {
    surfaces: Vec<Polygon>,
    source: Vector3<f64>,
    config: Config,
    bsp: BspTree,
    tree: BeamTree,
    buckets: Vec<Bucket>,
    metrics: QueryMetrics,
}

impl BeamTracer {
    /// Builds the tracer for a scene.
    ///
    /// Surface ids must equal surface indices. Fails with `InvalidGeometry`
    /// on an empty or inconsistent scene; per-polygon validity is enforced by
    /// `Polygon::new`.
    pub fn new(
        surfaces: Vec<Polygon>,
        source: Vector3<f64>,
        config: Config,
    ) -> Result<BeamTracer, TraceError> {
        room::validate_scene(&surfaces)?;
        if !finite(source) {
            return Err(TraceErrorKind::geometry("source position is not finite").into());
        }

        let bsp = BspTree::build(&surfaces, config.epsilon);
        let tree = BeamTree::build(&surfaces, source, config.max_order, config.epsilon);
        let buckets = bucket::make_buckets(tree.leaf_count(), config.clamped_bucket_size());

        Ok(BeamTracer {
            surfaces,
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
    ///
    /// An empty result is a legitimate outcome: no specular path exists under
    /// the configured order.
    pub fn paths(&mut self, listener: Vector3<f64>) -> Result<Vec<Path>, TraceError> {
        if !finite(listener) {
            return Err(TraceErrorKind::query("listener position is not finite").into());
        }

        self.metrics
            .reset(self.tree.leaf_count(), self.buckets.len());

        let mut solver = Solver {
            surfaces: &self.surfaces,
            bsp: &self.bsp,
            tree: &mut self.tree,
            buckets: &mut self.buckets,
            metrics: &mut self.metrics,
            config: &self.config,
            source: self.source,
        };

        Ok(solver.solve(listener))
    }

    /// Drops every fail plane and skip sphere. The trees are untouched.
    pub fn clear_cache(&mut self) {
        self.tree.clear_fail_planes();
        for bucket in &mut self.buckets {
            bucket.skip_sphere = None;
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
            let aperture = match node.aperture() {
                Some(aperture) => aperture.vertices().to_vec(),
                None => continue,
            };

            views.push(BeamView {
                virtual_source: node.virtual_source(),
                aperture,
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

    pub fn surfaces(&self) -> &[Polygon] {
        &self.surfaces
    }

    pub fn source(&self) -> Vector3<f64> {
        self.source
    }
}

fn finite(v: Vector3<f64>) -> bool {
    v.x.is_finite() && v.y.is_finite() && v.z.is_finite()
}
