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

//! The precomputed tree of image sources.
//!
//! Every non-root node represents one reflecting surface reached by the chain
//! of reflections on its ancestor path. Its virtual source is the mirror of
//! the parent's virtual source across the reflecting surface's plane; its
//! aperture is the part of the surface actually illuminated through all
//! preceding reflections. A beam is the convex volume on the positive side of
//! every boundary plane: one plane per aperture edge through the virtual
//! source, plus the aperture's own supporting plane with the virtual source
//! on its negative side.
//!
//! Without aperture clipping the tree would admit reflection chains that can
//! never carry a path, which validation would then reject one listener at a
//! time. Clipping prunes those subtrees once, at build time.

use cgmath::Vector3;

use crate::{
    common::{
        math::{DEGENERACY_EPSILON, MIN_APERTURE_AREA},
        SurfaceId,
    },
    d3::{plane::Plane, polygon::Polygon},
};

/// What a cached fail plane was derived from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FailPlaneKind {
    /// The reflecting surface's supporting plane: the listener was behind the
    /// surface.
    Polygon,
    /// A beam boundary plane built from an aperture edge.
    Edge,
    /// The beam's aperture plane.
    Aperture,
}

/// A plane explaining why the last validation at a leaf failed.
///
/// The plane is oriented so the failing listener is on its negative side; as
/// long as a listener stays there, revalidation is pointless.
#[derive(Clone, Debug)]
pub struct FailPlane {
    pub plane: Plane,
    pub kind: FailPlaneKind,
}

/// A node of the beam tree.
#[derive(Debug)]
pub struct BeamNode {
    /// The reflecting surface, `None` at the root.
    pub(crate) surface_id: Option<SurfaceId>,

    /// The image of the source through this node's reflection chain; the
    /// real source at the root.
    pub(crate) virtual_source: Vector3<f64>,

    /// The illuminated part of the reflecting surface, `None` at the root.
    pub(crate) aperture: Option<Polygon>,

    /// Boundary planes of the beam, the aperture plane last. Empty at the
    /// root: the source radiates in every direction.
    pub(crate) boundary: Vec<Plane>,

    pub(crate) parent: Option<usize>,
    pub(crate) children: Vec<usize>,

    /// Reflection order: depth below the root.
    pub(crate) order: u32,

    /// Query-time cache slot; the only part of a node a query may write.
    pub(crate) fail_plane: Option<FailPlane>,
}

impl BeamNode {
    pub fn surface_id(&self) -> Option<SurfaceId> {
        self.surface_id
    }

    pub fn virtual_source(&self) -> Vector3<f64> {
        self.virtual_source
    }

    pub fn aperture(&self) -> Option<&Polygon> {
        self.aperture.as_ref()
    }

    pub fn boundary(&self) -> &[Plane] {
        &self.boundary
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// The beam tree: an arena of nodes linked by indices.
#[derive(Debug)]
pub struct BeamTree {
    pub(crate) nodes: Vec<BeamNode>,

    /// Indices of non-root childless nodes, in traversal order. Buckets are
    /// contiguous slices of this list.
    pub(crate) leaves: Vec<usize>,
}

impl BeamTree {
    /// Builds the tree of image sources reachable from `source` by up to
    /// `max_order` reflections.
    pub fn build(
        surfaces: &[Polygon],
        source: Vector3<f64>,
        max_order: u32,
        epsilon: f64,
    ) -> BeamTree {
        let mut tree = BeamTree {
            nodes: vec![BeamNode {
                surface_id: None,
                virtual_source: source,
                aperture: None,
                boundary: Vec::new(),
                parent: None,
                children: Vec::new(),
                order: 0,
                fail_plane: None,
            }],
            leaves: Vec::new(),
        };

        tree.expand(0, surfaces, max_order, epsilon);

        // Expansion is depth-first, so node ids are already in traversal
        // order.
        tree.leaves = tree
            .nodes
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, node)| node.children.is_empty())
            .map(|(id, _)| id)
            .collect();

        debug!(
            "beam tree complete: {} nodes, {} leaves, max order {}",
            tree.nodes.len(),
            tree.leaves.len(),
            max_order
        );
        tree
    }

    fn expand(&mut self, node_id: usize, surfaces: &[Polygon], max_order: u32, epsilon: f64) {
        if self.nodes[node_id].order >= max_order {
            return;
        }

        let virtual_source = self.nodes[node_id].virtual_source;
        let parent_boundary = self.nodes[node_id].boundary.clone();

        for surface in surfaces {
            // Only surfaces facing the virtual source can reflect its sound.
            // This also rules out reflecting off the same surface twice in a
            // row: the mirrored source always ends up behind it.
            if surface.plane().point_dist(virtual_source) <= epsilon {
                continue;
            }

            if !parent_boundary.is_empty() && surface.quick_reject(&parent_boundary, epsilon) {
                continue;
            }

            let aperture = if parent_boundary.is_empty() {
                surface.clone()
            } else {
                match surface.clip_by_planes(&parent_boundary, epsilon) {
                    Some(aperture) => aperture,
                    None => continue,
                }
            };

            if aperture.area() < MIN_APERTURE_AREA {
                continue;
            }

            let child_source = surface.plane().mirror_point(virtual_source);
            let boundary = beam_boundary(child_source, &aperture);

            let child_id = self.nodes.len();
            self.nodes.push(BeamNode {
                surface_id: Some(surface.id()),
                virtual_source: child_source,
                aperture: Some(aperture),
                boundary,
                parent: Some(node_id),
                children: Vec::new(),
                order: self.nodes[node_id].order + 1,
                fail_plane: None,
            });
            self.nodes[node_id].children.push(child_id);

            self.expand(child_id, surfaces, max_order, epsilon);
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

    /// Drops every cached fail plane.
    pub(crate) fn clear_fail_planes(&mut self) {
        for node in &mut self.nodes {
            node.fail_plane = None;
        }
    }
}

/// The boundary planes of a beam with the given virtual source and aperture.
///
/// One plane per aperture edge, through the virtual source and the edge,
/// oriented so the aperture centroid is on its positive side; then the
/// aperture's supporting plane, oriented so the virtual source is on its
/// negative side. A point is inside the beam iff it is on the positive side
/// of every plane. An edge collinear with the virtual source spans no volume
/// and contributes no plane.
fn beam_boundary(virtual_source: Vector3<f64>, aperture: &Polygon) -> Vec<Plane> {
    let centroid = aperture.centroid();
    let mut planes = Vec::new();

    for (start, end) in aperture.edges() {
        let plane = match Plane::from_points(virtual_source, start, end) {
            Some(plane) => plane,
            None => {
                debug!(
                    "aperture edge collinear with virtual source on surface {}",
                    aperture.id()
                );
                continue;
            }
        };

        let centroid_dist = plane.point_dist(centroid);
        if centroid_dist.abs() < DEGENERACY_EPSILON {
            continue;
        }

        planes.push(if centroid_dist < 0.0 { -plane } else { plane });
    }

    let aperture_plane = aperture.plane().clone();
    planes.push(if aperture_plane.point_dist(virtual_source) > 0.0 {
        -aperture_plane
    } else {
        aperture_plane
    });

    planes
}
