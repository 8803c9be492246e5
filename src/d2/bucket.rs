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

//! Buckets of leaf beam nodes and their skip circles: the 2D reduction of
//! `d3::bucket`.

use cgmath::{MetricSpace, Vector2};

/// A disc around a past listener position inside which every leaf of a
/// bucket is known to still fail.
#[derive(Clone, Debug)]
pub struct SkipCircle {
    pub center: Vector2<f64>,
    pub radius: f64,
}

impl SkipCircle {
    pub fn contains(&self, point: Vector2<f64>) -> bool {
        self.center.distance(point) < self.radius
    }
}

/// A contiguous slice of the beam tree's leaf list.
#[derive(Clone, Debug)]
pub struct Bucket {
    /// First index into the leaf list.
    pub(crate) start: usize,

    /// One past the last index.
    pub(crate) end: usize,

    pub(crate) skip_circle: Option<SkipCircle>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn skip_circle(&self) -> Option<&SkipCircle> {
        self.skip_circle.as_ref()
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
            skip_circle: None,
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
            (10, 4, vec![(0, 4), (4, 8), (8, 10)]),
        ];

        for (leaf_count, bucket_size, expected) in cases.into_iter() {
            let buckets = make_buckets(leaf_count, bucket_size);
            let ranges: Vec<(usize, usize)> = buckets.iter().map(|b| (b.start, b.end)).collect();
            assert_eq!(ranges, expected);
        }
    }

    #[test]
    fn test_skip_circle_contains() {
        let circle = SkipCircle {
            center: Vector2::new(3.0, 4.0),
            radius: 1.5,
        };

        assert!(circle.contains(Vector2::new(3.0, 4.0)));
        assert!(circle.contains(Vector2::new(4.0, 4.0)));
        assert!(!circle.contains(Vector2::new(5.0, 4.0)));
    }
}
