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

//! Buckets of leaf beam nodes and their skip spheres.

use cgmath::{MetricSpace, Vector3};

/// A ball around a past listener position inside which every leaf of a
/// bucket is known to still fail.
///
/// The center is a listener at which the whole bucket failed; the radius is
/// the smallest distance from that listener to any leaf's fail plane, so no
/// listener inside the ball can have crossed to the passing side of any of
/// them.
#[derive(Clone, Debug)]
pub struct SkipSphere {
    pub center: Vector3<f64>,
    pub radius: f64,
}

impl SkipSphere {
    pub fn contains(&self, point: Vector3<f64>) -> bool {
        self.center.distance(point) < self.radius
    }
}

/// A contiguous slice of the beam tree's leaf list.
///
/// The tree owns the nodes; a bucket only holds the index range, so the two
/// never contend over ownership.
#[derive(Clone, Debug)]
pub struct Bucket {
    /// First index into the leaf list.
    pub(crate) start: usize,

    /// One past the last index.
    pub(crate) end: usize,

    pub(crate) skip_sphere: Option<SkipSphere>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn skip_sphere(&self) -> Option<&SkipSphere> {
        self.skip_sphere.as_ref()
    }
}

/// Carves the leaf list into buckets of at most `bucket_size` leaves.
pub(crate) fn make_buckets(leaf_count: usize, bucket_size: usize) -> Vec<Bucket> {
    let mut buckets = Vec::new();
    let mut start = 0;

    while start < leaf_count {
        let end = (start + bucket_size).min(leaf_count);
        buckets.push(Bucket {
            start,
            end,
            skip_sphere: None,
        });
        start = end;
    }

    buckets
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_make_buckets() {
        let cases = vec![
            (0, 16, vec![]),
            (5, 16, vec![(0, 5)]),
            (16, 16, vec![(0, 16)]),
            (40, 16, vec![(0, 16), (16, 32), (32, 40)]),
            (3, 1, vec![(0, 1), (1, 2), (2, 3)]),
        ];

        for (leaf_count, bucket_size, expected) in cases.into_iter() {
            let buckets = make_buckets(leaf_count, bucket_size);
            let ranges: Vec<(usize, usize)> = buckets.iter().map(|b| (b.start, b.end)).collect();
            assert_eq!(ranges, expected);
        }
    }

    #[test]
    fn test_skip_sphere_contains() {
        let sphere = SkipSphere {
            center: Vector3::new(1.0, 2.0, 3.0),
            radius: 2.0,
        };

        assert!(sphere.contains(Vector3::new(1.0, 2.0, 3.0)));
        assert!(sphere.contains(Vector3::new(2.5, 2.0, 3.0)));
        assert!(!sphere.contains(Vector3::new(3.5, 2.0, 3.0)));
        // The boundary itself does not count as inside.
        assert!(!sphere.contains(Vector3::new(3.0, 2.0, 3.0)));
    }
}
