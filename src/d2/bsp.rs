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

//! Binary space partitioning over wall lines: the 2D reduction of `d3::bsp`.

use cgmath::{InnerSpace, Vector2};

use crate::{
    common::{math::DEGENERACY_EPSILON, SurfaceId},
    d2::wall::{Classification, Wall},
};

const MAX_SPLITTER_CANDIDATES: usize = 10;

const SPLIT_WEIGHT: i64 = 8;

/// A ray hit reported by the BSP tree.
#[derive(Clone, Debug)]
pub struct BspHit {
    /// Parametric distance along the ray, in units of the ray direction.
    pub t: f64,
    pub point: Vector2<f64>,
    pub surface_id: SurfaceId,
}

#[derive(Debug)]
struct BspNode {
    wall: Wall,
    front: Option<usize>,
    back: Option<usize>,
}

/// A BSP tree over a fixed set of walls.
#[derive(Debug)]
pub struct BspTree {
    nodes: Vec<BspNode>,
    root: Option<usize>,
}

impl BspTree {
    /// Builds a tree over the given walls, scoring splitters exactly as the
    /// 3D tree does.
    pub fn build(walls: &[Wall], epsilon: f64) -> BspTree {
        debug!("building 2D BSP over {} walls", walls.len());

        let mut tree = BspTree {
            nodes: Vec::new(),
            root: None,
        };
        tree.root = tree.build_node(walls.to_vec(), epsilon);

        debug!("2D BSP complete: {} nodes", tree.nodes.len());
        tree
    }

    fn build_node(&mut self, mut walls: Vec<Wall>, epsilon: f64) -> Option<usize> {
        if walls.is_empty() {
            return None;
        }

        let splitter_index = choose_splitter(&walls, epsilon);
        let splitter = walls.swap_remove(splitter_index);

        let mut front_list = Vec::new();
        let mut back_list = Vec::new();

        for wall in walls {
            match wall.classify(splitter.line(), epsilon) {
                Classification::Front | Classification::Coplanar => front_list.push(wall),
                Classification::Back => back_list.push(wall),
                Classification::Spanning => {
                    let (front, back) = wall.split(splitter.line(), epsilon);
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
            wall: splitter,
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

    /// First hit of the ray with any wall for `t` within `[t_min, t_max]`,
    /// or `None`. `ignore` excludes one wall id.
    pub fn ray_trace(
        &self,
        origin: Vector2<f64>,
        dir: Vector2<f64>,
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
        origin: Vector2<f64>,
        dir: Vector2<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> Option<BspHit> {
        let node = &self.nodes[node_id];
        let line = node.wall.line();

        let origin_dist = line.point_dist(origin);
        let dir_dot = line.normal().dot(dir);

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
                if let Some(n) = near {
                    if let Some(hit) = self.trace_node(n, origin, dir, t_min, t, ignore, epsilon) {
                        return Some(hit);
                    }
                }

                if ignore != Some(node.wall.id()) {
                    if let Some(hit) = node.wall.ray_intersection(origin, dir, epsilon) {
                        if hit.t >= t_min && hit.t <= t_max {
                            return Some(BspHit {
                                t: hit.t,
                                point: hit.point,
                                surface_id: node.wall.id(),
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
    pub fn ray_occluded(
        &self,
        origin: Vector2<f64>,
        dir: Vector2<f64>,
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
        origin: Vector2<f64>,
        dir: Vector2<f64>,
        t_min: f64,
        t_max: f64,
        ignore: Option<SurfaceId>,
        epsilon: f64,
    ) -> bool {
        let node = &self.nodes[node_id];
        let line = node.wall.line();

        let origin_dist = line.point_dist(origin);
        let dir_dot = line.normal().dot(dir);

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
                if ignore != Some(node.wall.id()) {
                    if let Some(hit) = node.wall.ray_intersection(origin, dir, epsilon) {
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
        *dot += &format!("    n{} [label=\"w{}\"]\n", node_id, node.wall.id());

        for &child in [node.front, node.back].iter() {
            if let Some(c) = child {
                *dot += &format!("    n{} -> n{}\n", node_id, c);
                self.gen_dot_graph_recursive(c, dot);
            }
        }
    }
}

fn choose_splitter(walls: &[Wall], epsilon: f64) -> usize {
    let candidates = walls.len().min(MAX_SPLITTER_CANDIDATES);
    let mut best_index = 0;
    let mut best_score = i64::max_value();

    for candidate in 0..candidates {
        let line = walls[candidate].line();
        let mut splits = 0i64;
        let mut front = 0i64;
        let mut back = 0i64;

        for (index, wall) in walls.iter().enumerate() {
            if index == candidate {
                continue;
            }

            match wall.classify(line, epsilon) {
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
    use crate::{common::math::EPSILON, d2::room::rectangle};
    use cgmath::InnerSpace;

    fn v(x: f64, y: f64) -> Vector2<f64> {
        Vector2::new(x, y)
    }

    #[test]
    fn test_build_rectangle() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn test_ray_trace_nearest_hit() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        let hit = tree
            .ray_trace(v(50.0, 50.0), v(1.0, 0.0), EPSILON, 1e30, None, EPSILON)
            .expect("ray must hit the room shell");
        assert_eq!(hit.surface_id, 1);
        assert!((hit.t - 50.0).abs() < EPSILON);
        assert!((hit.point - v(100.0, 50.0)).magnitude() < EPSILON);
    }

    #[test]
    fn test_ray_trace_ignore_id() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        let hit = tree
            .ray_trace(v(100.0, 50.0), v(-1.0, 0.0), 0.0, 1e30, Some(1), EPSILON)
            .expect("opposite wall must be hit");
        assert_eq!(hit.surface_id, 3);
        assert!((hit.t - 100.0).abs() < EPSILON);
    }

    #[test]
    fn test_ray_occluded() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let tree = BspTree::build(&room, EPSILON);

        let origin = v(50.0, 50.0);
        let target = v(60.0, 60.0);
        let dist = (target - origin).magnitude();
        let dir = (target - origin) / dist;

        assert!(!tree.ray_occluded(origin, dir, EPSILON, dist - EPSILON, None, EPSILON));
        assert!(tree.ray_occluded(origin, dir, EPSILON, dist + 200.0, None, EPSILON));
    }

    #[test]
    fn test_interior_wall_hit() {
        // A diagonal wall in the rectangle's interior is reachable through
        // whatever subtree it lands in.
        let mut room = rectangle(100.0, 100.0).expect("valid dimensions");
        room.push(Wall::new(4, v(20.0, 20.0), v(80.0, 80.0)).expect("wall is valid"));
        let tree = BspTree::build(&room, EPSILON);

        assert!(tree.node_count() >= 5);

        let hit = tree
            .ray_trace(v(50.0, 20.0), v(0.0, 1.0), EPSILON, 1e30, None, EPSILON)
            .expect("diagonal must be hit");
        assert_eq!(hit.surface_id, 4);
        assert!((hit.point - v(50.0, 50.0)).magnitude() < EPSILON);
    }
}
