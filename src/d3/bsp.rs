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

//! Binary space partitioning over the room's surfaces.
//!
//! The tree is built once per scene and serves first-hit ray queries during
//! path validation. Every node owns one surface (possibly a fragment produced
//! by an earlier split) whose supporting plane partitions the node's
//! subspace. Queries descend the near side first, test the node's own surface
//! when the ray crosses its plane, then descend the far side, so the first
//! hit found is the nearest.

use cgmath::{InnerSpace, Vector3};

use crate::{
    common::{math::DEGENERACY_EPSILON, SurfaceId},
    d3::polygon::{Classification, Polygon},
};

/// Splitter scoring samples at most this many candidate surfaces per node.
const MAX_SPLITTER_CANDIDATES: usize = 10;

/// Weight of a spanning polygon in the splitter score
/// `8 * splits + |front - back|`.
const SPLIT_WEIGHT: i64 = 8;

/// A ray hit reported by the BSP tree.
#[derive(Clone, Debug)]
pub struct BspHit {
    /// Parametric distance along the ray, in units of the ray direction.
    pub t: f64,
    pub point: Vector3<f64>,
    pub surface_id: SurfaceId,
}

#[derive(Debug)]
struct BspNode {
    surface: Polygon,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree over a fixed set of surfaces.
#[derive(Debug)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    root: Option<usize>,
}

impl BspTree {
    /// Builds a tree over the given surfaces.
    ///
    /// At every node a splitter is chosen by sampling up to
    /// `MAX_SPLITTER_CANDIDATES` surfaces and minimizing
    /// `8 * splits + |front_count - back_count|`. Surfaces coplanar with the
    /// splitter are grouped with the front side.
    pub fn build(surfaces: &[Polygon], epsilon: f64) -> BspTree {
        debug!("building BSP over {} surfaces", surfaces.len());

        let mut tree = BspTree {
            nodes: Vec::new(),
            root: None,
        };
        tree.root = tree.build_node(surfaces.to_vec(), epsilon);

        debug!("BSP complete: {} nodes", tree.nodes.len());
        tree
    }

    fn build_node(&mut self, mut polygons: Vec<Polygon>, epsilon: f64) -> Option<usize> {
        if polygons.is_empty() {
            return None;
        }

        let splitter_index = choose_splitter(&polygons, epsilon);
        let splitter = polygons.swap_remove(splitter_index);

        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for polygon in polygons {
            match polygon.classify(splitter.plane(), epsilon) {
                Classification::Front | Classification::Coplanar => front_list.push(polygon),
                Classification::Back => back_list.push(polygon),
                Classification::Spanning => {
                    let (front, back) = polygon.split(splitter.plane(), epsilon);
                    if let Some(f) = front {
                        front_list.push(f);
                    }
                    if let Some(b) = back {
                        back_list.push(b);
                    }
                }
            }
        }

        let node_id = self.nodes.len();
        self.nodes.push(BspNode {
            surface: splitter,
            front: None,
            back: None,
        });

        let front = self.build_node(front_list, epsilon);
        let back = self.build_node(back_list, epsilon);
        self.nodes[node_id].front = front;
        self.nodes[node_id].back = back;

        Some(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// First hit of the ray `origin + t * dir` with any surface, for `t`
    /// within `[t_min, t_max]`, or `None`.
    ///
    /// `ignore` excludes one surface id from consideration, preventing
    /// immediate self-intersection with the surface a path segment starts or
    /// ends on.
    pub fn ray_trace(
        &self,
        origin: Vector3<f64>,
        dir: Vector3<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> Option<BspHit> {
        let root = self.root?;
        self.trace_node(root, origin, dir, t_min, t_max, ignore, epsilon)
    }

    fn trace_node(
        &self,
        node_id: usize,
        origin: Vector3<f64>,
        dir: Vector3<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> Option<BspHit> {
        let node = &self.nodes[node_id];
        let plane = node.surface.plane();

        let origin_dist = plane.point_dist(origin);
        let dir_dot = plane.normal().dot(dir);

        let (near, far) = if origin_dist >= 0.0 {
            (node.front, node.back)
        } else {
            (node.back, node.front)
        };

        // A ray parallel to the plane never crosses it.
        let t_split = if dir_dot.abs() < DEGENERACY_EPSILON {
            None
        } else {
            Some(-origin_dist / dir_dot)
        };

        match t_split {
            Some(t) if t >= t_min && t <= t_max => {
                if let Some(n) = near {
                    if let Some(hit) = self.trace_node(n, origin, dir, t_min, t, ignore, epsilon) {
                        return Some(hit);
                    }
                }

                if ignore != Some(node.surface.id()) {
                    if let Some(hit) = node.surface.ray_intersection(origin, dir, epsilon) {
                        if hit.t >= t_min && hit.t <= t_max {
                            return Some(BspHit {
                                t: hit.t,
                                point: hit.point,
                                surface_id: node.surface.id(),
                            });
                        }
                    }
                }

                match far {
                    Some(f) => self.trace_node(f, origin, dir, t, t_max, ignore, epsilon),
                    None => None,
                }
            }
            _ => match near {
                Some(n) => self.trace_node(n, origin, dir, t_min, t_max, ignore, epsilon),
                None => None,
            },
        }
    }

    /// Whether anything blocks the ray within `[t_min, t_max]`.
    ///
    /// Returns on the first hit found without establishing which hit is
    /// nearest, which makes it cheaper than `ray_trace` for visibility tests.
    pub fn ray_occluded(
        &self,
        origin: Vector3<f64>,
        dir: Vector3<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> bool {
        match self.root {
            Some(root) => self.occluded_node(root, origin, dir, t_min, t_max, ignore, epsilon),
            None => false,
        }
    }

    fn occluded_node(
        &self,
        node_id: usize,
        origin: Vector3<f64>,
        dir: Vector3<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> bool {
        let node = &self.nodes[node_id];
        let plane = node.surface.plane();

        let origin_dist = plane.point_dist(origin);
        let dir_dot = plane.normal().dot(dir);

        let (near, far) = if origin_dist >= 0.0 {
            (node.front, node.back)
        } else {
            (node.back, node.front)
        };

        let t_split = if dir_dot.abs() < DEGENERACY_EPSILON {
            None
        } else {
            Some(-origin_dist / dir_dot)
        };

        match t_split {
            Some(t) if t >= t_min && t <= t_max => {
                if ignore != Some(node.surface.id()) {
                    if let Some(hit) = node.surface.ray_intersection(origin, dir, epsilon) {
                        if hit.t >= t_min && hit.t <= t_max {
                            return true;
                        }
                    }
                }

                near.map_or(false, |n| {
                    self.occluded_node(n, origin, dir, t_min, t, ignore, epsilon)
                }) || far.map_or(false, |f| {
                    self.occluded_node(f, origin, dir, t, t_max, ignore, epsilon)
                })
            }
            _ => near.map_or(false, |n| {
                self.occluded_node(n, origin, dir, t_min, t_max, ignore, epsilon)
            }),
        }
    }

    pub fn gen_dot_graph(&self) -> String {
        let mut dot = String::new();
        dot += "digraph bsp {\n";

        if let Some(root) = self.root {
            self.gen_dot_graph_recursive(root, &mut dot);
        }

        dot += "}";
        dot
    }

    fn gen_dot_graph_recursive(&self, node_id: usize, dot: &mut String) {
        let node = &self.nodes[node_id];
        *dot += &format!("    n{} [label=\"s{}\"]\n", node_id, node.surface.id());

        for &child in [node.front, node.back].iter() {
            if let Some(c) = child {
                *dot += &format!("    n{} -> n{}\n", node_id, c);
                self.gen_dot_graph_recursive(c, dot);
            }
        }
    }
}

fn choose_splitter(polygons: &[Polygon], epsilon: f64) -> usize {
    let candidates = polygons.len().min(MAX_SPLITTER_CANDIDATES);
    let mut best_index = 0;
    let mut best_score = i64::max_value();

    for candidate in 0..candidates {
        let plane = polygons[candidate].plane();
        let mut splits = 0i64;
        let mut front = 0i64;
        let mut back = 0i64;

        for (index, polygon) in polygons.iter().enumerate() {
            if index == candidate {
                continue;
            }

            match polygon.classify(plane, epsilon) {
                Classification::Front | Classification::Coplanar => front += 1,
                Classification::Back => back += 1,
                Classification::Spanning => splits += 1,
            }
        }

        let score = SPLIT_WEIGHT * splits + (front - back).abs();
        if score < best_score {
            best_score = score;
            best_index = candidate;
        }
    }

    best_index
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{common::math::EPSILON, d3::room::shoebox};
    use cgmath::InnerSpace;

    fn v(x: f64, y: f64, z: f64) -> Vector3<f64> {
        Vector3::new(x, y, z)
    }

    #[test]
    fn test_build_shoebox() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        // Axis-aligned box faces never span one another, so no face is split.
        assert_eq!(tree.node_count(), 6);
    }

    #[test]
    fn test_ray_trace_nearest_hit() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        // Fire from the center along +x: the x = 10 face (id 5) is the first
        // hit even though the line also crosses x = 0 behind the origin.
        let origin = v(5.0, 4.0, 1.5);
        let dir = v(1.0, 0.0, 0.0);
        let hit = tree
            .ray_trace(origin, dir, EPSILON, 1e30, None, EPSILON)
            .expect("ray must hit the room shell");

        assert_eq!(hit.surface_id, 5);
        assert!((hit.t - 5.0).abs() < EPSILON);
        assert!((hit.point - v(10.0, 4.0, 1.5)).magnitude() < EPSILON);
    }

    #[test]
    fn test_ray_trace_respects_interval() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        let origin = v(5.0, 4.0, 1.5);
        let dir = v(1.0, 0.0, 0.0);

        // The only surface along the ray sits at t = 5.
        assert!(tree
            .ray_trace(origin, dir, EPSILON, 4.0, None, EPSILON)
            .is_none());
        assert!(tree
            .ray_trace(origin, dir, 6.0, 1e30, None, EPSILON)
            .is_none());
    }

    #[test]
    fn test_ray_trace_ignore_id() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        // Start on the x = 10 face and fire straight back across the room;
        // ignoring the starting face leaves the x = 0 face as first hit.
        let origin = v(10.0, 4.0, 1.5);
        let dir = v(-1.0, 0.0, 0.0);
        let hit = tree
            .ray_trace(origin, dir, 0.0, 1e30, Some(5), EPSILON)
            .expect("opposite face must be hit");

        assert_eq!(hit.surface_id, 4);
        assert!((hit.t - 10.0).abs() < EPSILON);
    }

    #[test]
    fn test_ray_occluded() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        let origin = v(5.0, 4.0, 1.5);

        // Clear line inside the open interior.
        let target = v(3.0, 3.0, 1.2);
        let dist = (target - origin).magnitude();
        let dir = (target - origin) / dist;
        assert!(!tree.ray_occluded(origin, dir, EPSILON, dist - EPSILON, None, EPSILON));

        // Extending past the wall is blocked.
        assert!(tree.ray_occluded(origin, dir, EPSILON, dist + 100.0, None, EPSILON));
    }

    #[test]
    fn test_ray_parallel_to_planes() {
        let room = shoebox(10.0, 8.0, 3.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        // Parallel to floor and ceiling, aimed at the y = 8 face.
        let origin = v(5.0, 4.0, 1.5);
        let dir = v(0.0, 1.0, 0.0);
        let hit = tree
            .ray_trace(origin, dir, EPSILON, 1e30, None, EPSILON)
            .expect("must hit the y = 8 face");
        assert_eq!(hit.surface_id, 3);
    }

    #[test]
    fn test_dot_graph_shape() {
        let room = shoebox(4.0, 4.0, 4.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);
        let dot = tree.gen_dot_graph();

        assert!(dot.starts_with("digraph bsp {"));
        assert!(dot.ends_with("}"));
    }
}
