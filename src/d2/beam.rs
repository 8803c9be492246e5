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

//! The 2D beam tree: wedges through wall windows.
//!
//! The exact reduction of `d3::beam` to the plane. A beam is the wedge on the
//! positive side of three boundary lines: one through the virtual source and
//! each window endpoint, plus the window's own supporting line with the
//! virtual source on its negative side. Windows are clipped by the parent's
//! boundary lines exactly as 3D apertures are clipped by boundary planes.

use cgmath::Vector2;

use crate::{
    common::{
        math::{DEGENERACY_EPSILON, MIN_APERTURE_AREA},
        SurfaceId,
    },
    d2::{line::Line2, wall::Wall},
};

/// What a cached fail line was derived from. The 2D counterparts of the 3D
/// polygon/edge/aperture tags.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailLineKind {
    /// The reflecting wall's supporting line: the listener was behind the
    /// wall.
    Wall,
    /// A beam boundary line through a window endpoint.
    Edge,
    /// The beam's window line.
    Window,
}

/// A line explaining why the last validation at a leaf failed, oriented so
/// the failing listener is on its negative side.
#[derive(Clone, Debug)]
pub struct FailLine {
    pub line: Line2,
    pub kind: FailLineKind,
}

/// A node of the 2D beam tree.
#[derive(Debug)]
pub struct BeamNode {
    /// The reflecting wall, `None` at the root.
    pub(crate) surface_id: Option<SurfaceId>,

    pub(crate) virtual_source: Vector2<f64>,

    /// The illuminated part of the reflecting wall, `None` at the root.
    pub(crate) window: Option<Wall>,

    /// Boundary lines of the wedge, the window line last. Empty at the root.
    pub(crate) boundary: Vec<Line2>,

    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    pub(crate) order: u32,

    /// Query-time cache slot; the only part of a node a query may write.
    pub(crate) fail_line: Option<FailLine>,
}

impl BeamNode {
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface_id
    }

    pub fn virtual_source(&self) -> Vector2<f64> {
        self.virtual_source
    }

    pub fn window(&self) -> Option<&Wall> {
        self.window.as_ref()
    }

    pub fn boundary(&self) -> &[Line2] {
        &self.boundary
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The 2D beam tree arena.
#[derive(Debug)]
pub struct BeamTree {
    pub(crate) nodes: Vec<BeamNode>,

    /// Indices of non-root childless nodes, in traversal order.
    pub(crate) leaves: Vec<usize>,
}

impl BeamTree {
    /// Builds the tree of image sources reachable from `source` by up to
    /// `max_order` reflections.
    pub fn build(walls: &[Wall], source: Vector2<f64>, max_order: u32, epsilon: f64) -> BeamTree {
        let mut tree = BeamTree {
            nodes: vec![BeamNode {
                surface_id: None,
                virtual_source: source,
                window: None,
                boundary: Vec::new(),
                parent: None,
                children: Vec::new(),
                order: 0,
                fail_line: None,
            }],
            leaves: Vec::new(),
        };

        tree.expand(0, walls, max_order, epsilon);

        tree.leaves = tree
            .nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| id)
            .collect();

        debug!(
            "2D beam tree complete: {} nodes, {} leaves, max order {}",
            tree.nodes.len(),
            tree.leaves.len(),
            max_order
        );
        tree
    }

    fn expand(&mut self, node_id: usize, walls: &[Wall], max_order: u32, epsilon: f64) {
        if self.nodes[node_id].order >= max_order {
            return;
        }

        let virtual_source = self.nodes[node_id].virtual_source;
        let parent_boundary = self.nodes[node_id].boundary.clone();

        for wall in walls {
            // Only walls facing the virtual source can reflect its sound.
            if wall.line().point_dist(virtual_source) <= epsilon {
                continue;
            }

            if !parent_boundary.is_empty() && wall.quick_reject(&parent_boundary, epsilon) {
                continue;
            }

            let window = if parent_boundary.is_empty() {
                wall.clone()
            } else {
                match wall.clip_by_lines(&parent_boundary, epsilon) {
                    Some(window) => window,
                    None => continue,
                }
            };

            if window.length() < MIN_APERTURE_AREA {
                continue;
            }

            let child_source = wall.line().mirror_point(virtual_source);
            let boundary = beam_boundary(child_source, &window);

            let child_id = self.nodes.len();
            self.nodes.push(BeamNode {
                surface_id: Some(wall.id()),
                virtual_source: child_source,
                window: Some(window),
                boundary,
                parent: Some(node_id),
                children: Vec::new(),
                order: self.nodes[node_id].order + 1,
                fail_line: None,
            });
            self.nodes[node_id].children.push(child_id);

            self.expand(child_id, walls, max_order, epsilon);
        }
    }

    pub fn node(&self, id: usize) -> &BeamNode {
        &self.nodes[id]
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Drops every cached fail line.
    pub(crate) fn clear_fail_lines(&mut self) {
        for node in &mut self.nodes {
            node.fail_line = None;
        }
    }
}

/// The boundary lines of a wedge with the given virtual source and window:
/// one line per window endpoint, through the virtual source, oriented so the
/// window midpoint is on its positive side; then the window's supporting
/// line, oriented so the virtual source is on its negative side.
fn beam_boundary(virtual_source: Vector2<f64>, window: &Wall) -> Vec<Line2> {
    let midpoint = window.midpoint();
    let mut lines = Vec::new();

    for &endpoint in [window.p1(), window.p2()].iter() {
        let line = match Line2::from_points(virtual_source, endpoint) {
            Some(line) => line,
            None => {
                debug!(
                    "window endpoint coincides with virtual source on wall {}",
                    window.id()
                );
                continue;
            }
        };

        let midpoint_dist = line.point_dist(midpoint);
        if midpoint_dist.abs() < DEGENERACY_EPSILON {
            continue;
        }

        lines.push(if midpoint_dist < 0.0 { -line } else { line });
    }

    let window_line = window.line().clone();
    lines.push(if window_line.point_dist(virtual_source) > 0.0 {
        -window_line
    } else {
        window_line
    });

    lines
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
    fn test_first_order_tree() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let source = v(50.0, 50.0);
        let tree = BeamTree::build(&room, source, 1, EPSILON);

        assert_eq!(tree.node_count(), 5);
        assert_eq!(tree.leaf_count(), 4);

        for &leaf in &tree.leaves {
            let node = tree.node(leaf);
            let wall = &room[node.surface_id().expect("non-root node")];

            let expected = wall.line().mirror_point(source);
            assert!((node.virtual_source() - expected).magnitude() < EPSILON);

            let window = node.window().expect("non-root node");
            assert!((window.length() - wall.length()).abs() < EPSILON);
        }
    }

    #[test]
    fn test_virtual_source_is_iterated_mirror() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let source = v(30.0, 40.0);
        let tree = BeamTree::build(&room, source, 3, EPSILON);

        for (id, node) in tree.nodes.iter().enumerate().skip(1) {
            let mut chain = Vec::new();
            let mut current = Some(id);
            while let Some(c) = current {
                if let Some(sid) = tree.node(c).surface_id() {
                    chain.push(sid);
                }
                current = tree.node(c).parent;
            }
            chain.reverse();

            let mut image = source;
            for sid in chain {
                image = room[sid].line().mirror_point(image);
            }

            assert!((node.virtual_source() - image).magnitude() < EPSILON);
        }
    }

    #[test]
    fn test_windows_shrink_with_order() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let tree = BeamTree::build(&room, v(50.0, 50.0), 2, EPSILON);

        let mut saw_second_order = false;
        for node in tree.nodes.iter().skip(1) {
            if node.order() == 2 {
                saw_second_order = true;
                let wall = &room[node.surface_id().expect("non-root node")];
                let window = node.window().expect("non-root node");

                assert!(window.length() <= wall.length() + EPSILON);

                // Window endpoints stay on the original wall.
                assert!(wall.contains(window.p1(), EPSILON));
                assert!(wall.contains(window.p2(), EPSILON));
            }
        }

        assert!(saw_second_order);
    }

    #[test]
    fn test_boundary_orientation() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        let source = v(50.0, 50.0);
        let tree = BeamTree::build(&room, source, 1, EPSILON);

        // The beam off the bottom wall: any point in the room straight above
        // the wall midpoint is inside the wedge.
        let bottom_leaf = tree
            .leaves
            .iter()
            .map(|&l| tree.node(l))
            .find(|n| n.surface_id() == Some(0))
            .expect("bottom wall beam exists");

        let inside = v(50.0, 30.0);
        for line in bottom_leaf.boundary() {
            assert!(line.point_dist(inside) > 0.0);
        }

        // A point below the wall is behind the window line.
        let outside = v(50.0, -10.0);
        assert!(bottom_leaf
            .boundary()
            .iter()
            .any(|line| line.point_dist(outside) < 0.0));
    }
}
