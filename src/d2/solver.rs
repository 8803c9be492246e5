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

//! Per-listener path validation in 2D: the exact reduction of `d3::solver`.

use cgmath::{InnerSpace, Vector2};

use crate::{
    common::SurfaceId,
    config::Config,
    d2::{
        beam::{BeamNode, BeamTree, FailLine, FailLineKind},
        bsp::BspTree,
        bucket::{Bucket, SkipCircle},
        wall::Wall,
        Path, PathPoint,
    },
    metrics::QueryMetrics,
};

pub(crate) struct Solver<'a> {
    pub walls: &'a [Wall],
    pub bsp: &'a BspTree,
    pub tree: &'a mut BeamTree,
    pub buckets: &'a mut [Bucket],
    pub metrics: &'a mut QueryMetrics,
    pub config: &'a Config,
    pub source: Vector2<f64>,
}

impl<'a> Solver<'a> {
    pub fn solve(&mut self, listener: Vector2<f64>) -> Vec<Path> {
        let mut paths = Vec::new();

        if let Some(direct) = self.direct_path(listener) {
            paths.push(direct);
        }

        let root_children = self.tree.nodes[0].children.clone();
        for child in root_children {
            self.visit_intermediate(child, listener, &mut paths);
        }

        self.bucket_pass(listener, &mut paths);

        self.metrics.valid_paths = paths.len();
        self.metrics.skip_spheres_active = self
            .buckets
            .iter()
            .filter(|b| b.skip_circle.is_some())
            .count();

        paths
    }

    /// The order-0 path, if the listener sees the source.
    fn direct_path(&mut self, listener: Vector2<f64>) -> Option<Path> {
        if self.segment_occluded(listener, self.source, None) {
            return None;
        }

        Some(Path {
            points: vec![
                PathPoint {
                    point: listener,
                    surface: None,
                },
                PathPoint {
                    point: self.source,
                    surface: None,
                },
            ],
        })
    }

    /// Children-first traversal validating every intermediate node. Leaves
    /// are left to the bucket pass.
    fn visit_intermediate(
        &mut self,
        node_id: usize,
        listener: Vector2<f64>,
        paths: &mut Vec<Path>,
    ) {
        let children = self.tree.nodes[node_id].children.clone();
        for child in &children {
            self.visit_intermediate(*child, listener, paths);
        }

        if !children.is_empty() {
            if let Some(path) = self.validate(node_id, listener) {
                paths.push(path);
            }
        }
    }

    /// Leaf validation with fail-line and skip-circle acceleration.
    fn bucket_pass(&mut self, listener: Vector2<f64>, paths: &mut Vec<Path>) {
        for bucket_index in 0..self.buckets.len() {
            let escaped = match &self.buckets[bucket_index].skip_circle {
                Some(circle) if circle.contains(listener) => {
                    self.metrics.buckets_skipped += 1;
                    continue;
                }
                Some(_) => true,
                None => false,
            };

            let (start, end) = {
                let bucket = &self.buckets[bucket_index];
                (bucket.start, bucket.end)
            };

            if escaped {
                debug!("listener escaped skip circle of bucket {}", bucket_index);
                self.buckets[bucket_index].skip_circle = None;
                for leaf_index in start..end {
                    let node = self.tree.leaves[leaf_index];
                    self.tree.nodes[node].fail_line = None;
                }
            }

            self.metrics.buckets_checked += 1;

            let mut all_failed = true;
            for leaf_index in start..end {
                let node = self.tree.leaves[leaf_index];

                if self.config.fail_planes {
                    let still_failing = match &self.tree.nodes[node].fail_line {
                        Some(cached) => cached.line.point_dist(listener) < 0.0,
                        None => false,
                    };

                    if still_failing {
                        self.metrics.fail_plane_hits += 1;
                        continue;
                    }

                    self.tree.nodes[node].fail_line = None;
                }

                self.metrics.fail_plane_misses += 1;

                match self.validate(node, listener) {
                    Some(path) => {
                        all_failed = false;
                        paths.push(path);
                    }
                    None => {
                        if self.config.fail_planes {
                            let detected =
                                detect_fail_line(&self.tree.nodes[node], self.walls, listener);
                            self.tree.nodes[node].fail_line = detected;
                        }
                    }
                }
            }

            if self.config.skip_spheres && all_failed && end > start {
                self.try_build_skip_circle(bucket_index, listener);
            }
        }
    }

    fn try_build_skip_circle(&mut self, bucket_index: usize, listener: Vector2<f64>) {
        let (start, end) = {
            let bucket = &self.buckets[bucket_index];
            (bucket.start, bucket.end)
        };

        let mut radius = ::std::f64::INFINITY;
        for leaf_index in start..end {
            let node = self.tree.leaves[leaf_index];
            match &self.tree.nodes[node].fail_line {
                Some(cached) => {
                    radius = radius.min(cached.line.point_dist(listener).abs());
                }
                None => return,
            }
        }

        if radius > 0.0 && radius.is_finite() {
            debug!(
                "skip circle on bucket {}: radius {:.6}",
                bucket_index, radius
            );
            self.buckets[bucket_index].skip_circle = Some(SkipCircle {
                center: listener,
                radius,
            });
        }
    }

    /// Walks from the listener through the node's reflection chain to the
    /// source, or fails.
    fn validate(&mut self, node_id: usize, listener: Vector2<f64>) -> Option<Path> {
        let epsilon = self.config.epsilon;

        let mut points = vec![PathPoint {
            point: listener,
            surface: None,
        }];
        let mut current = listener;
        let mut prev_surface: Option<SurfaceId> = None;
        let mut walk = node_id;

        loop {
            let (surface_id, virtual_source, parent) = {
                let node = &self.tree.nodes[walk];
                match node.surface_id {
                    Some(id) => (id, node.virtual_source, node.parent),
                    None => break,
                }
            };

            let hit = {
                let node = &self.tree.nodes[walk];
                let window = node.window.as_ref()?;
                window.ray_intersection(current, virtual_source - current, epsilon)?
            };

            if self.segment_occluded(current, hit.point, prev_surface) {
                return None;
            }

            points.push(PathPoint {
                point: hit.point,
                surface: Some(surface_id),
            });
            current = hit.point;
            prev_surface = Some(surface_id);
            walk = parent?;
        }

        if self.segment_occluded(current, self.source, prev_surface) {
            return None;
        }

        points.push(PathPoint {
            point: self.source,
            surface: None,
        });

        Some(Path { points })
    }

    /// Whether any wall other than the excluded one blocks the open segment
    /// between two points.
    fn segment_occluded(
        &mut self,
        from: Vector2<f64>,
        to: Vector2<f64>,
        ignore: Option<SurfaceId>,
    ) -> bool {
        let epsilon = self.config.epsilon;
        let delta = to - from;
        let dist = delta.magnitude();

        if dist <= epsilon {
            return false;
        }

        self.metrics.raycasts += 1;
        self.bsp
            .ray_occluded(from, delta / dist, epsilon, dist - epsilon, ignore, epsilon)
    }
}

/// Finds a line explaining a failed validation at `node`, if one exists.
///
/// First the reflecting wall's line, oriented so the valid listener region
/// (the side away from the virtual source) is positive; then each boundary
/// line in order. The first line with the listener on its negative side is
/// the cause. An occlusion by a third wall is not expressible as a single
/// line, and nothing is cached for it.
pub(crate) fn detect_fail_line(
    node: &BeamNode,
    walls: &[Wall],
    listener: Vector2<f64>,
) -> Option<FailLine> {
    let surface_id = node.surface_id?;

    let mut line = walls[surface_id].line().clone();
    if line.point_dist(node.virtual_source) > 0.0 {
        line = -line;
    }
    if line.point_dist(listener) < 0.0 {
        return Some(FailLine {
            line,
            kind: FailLineKind::Wall,
        });
    }

    let count = node.boundary.len();
    for (index, boundary_line) in node.boundary.iter().enumerate() {
        if boundary_line.point_dist(listener) < 0.0 {
            // The window line is stored last.
            let kind = if index + 1 == count {
                FailLineKind::Window
            } else {
                FailLineKind::Edge
            };

            return Some(FailLine {
                line: boundary_line.clone(),
                kind,
            });
        }
    }

    None
}
