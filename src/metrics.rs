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

//! Per-query counters.

/// Counters describing the work done by the most recent query.
///
/// All counters are reset at the start of every query; `leaf_nodes` and
/// `buckets` describe the build and are rewritten with the same values each
/// time.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryMetrics {
    /// Leaf beam nodes in the tree.
    pub leaf_nodes: usize,

    /// Buckets over the leaf list.
    pub buckets: usize,

    /// Buckets rejected wholesale by their skip sphere.
    pub buckets_skipped: u64,

    /// Buckets whose leaves were examined individually.
    pub buckets_checked: u64,

    /// Leaves rejected by a cached fail plane.
    pub fail_plane_hits: u64,

    /// Leaves that required full validation.
    pub fail_plane_misses: u64,

    /// BSP ray queries issued.
    pub raycasts: u64,

    /// Buckets holding a live skip sphere after the query.
    pub skip_spheres_active: usize,

    /// Paths emitted by the query.
    pub valid_paths: usize,
}

impl QueryMetrics {
    pub(crate) fn reset(&mut self, leaf_nodes: usize, buckets: usize) {
        *self = QueryMetrics {
            leaf_nodes,
            buckets,
            ..QueryMetrics::default()
        };
    }
}
