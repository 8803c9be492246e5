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

//! Tracer build configuration.

use crate::common::math::{DEGENERACY_EPSILON, EPSILON};

/// Default maximum reflection order.
pub const DEFAULT_MAX_ORDER: u32 = 5;

/// Default number of leaf beam nodes per bucket.
pub const DEFAULT_BUCKET_SIZE: usize = 16;

/// Build-time configuration of a tracer.
///
/// A tracer is built once per `(geometry, source, config)` triple; changing
/// any of these requires a fresh build. The cache switches exist so the
/// accelerated query path can be checked against the plain one.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum reflection order of emitted paths.
    pub max_order: u32,

    /// Leaf beam nodes per bucket. Values below 1 are clamped to 1.
    pub bucket_size: usize,

    /// Classification epsilon.
    pub epsilon: f64,

    /// Cutoff below which intersection denominators are treated as zero.
    pub degeneracy_epsilon: f64,

    /// Cache a fail plane on a leaf after an attributable validation failure.
    pub fail_planes: bool,

    /// Build a skip sphere over a bucket once every leaf in it is known to
    /// fail. Requires `fail_planes`; without cached planes no sphere can form.
    pub skip_spheres: bool,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            max_order: DEFAULT_MAX_ORDER,
            bucket_size: DEFAULT_BUCKET_SIZE,
            epsilon: EPSILON,
            degeneracy_epsilon: DEGENERACY_EPSILON,
            fail_planes: true,
            skip_spheres: true,
        }
    }
}

impl Config {
    /// A default configuration with the given maximum reflection order.
    pub fn with_max_order(max_order: u32) -> Config {
        Config {
            max_order,
            ..Config::default()
        }
    }

    /// A configuration with both query-time caches disabled.
    pub fn without_caches(max_order: u32) -> Config {
        Config {
            max_order,
            fail_planes: false,
            skip_spheres: false,
            ..Config::default()
        }
    }

    pub(crate) fn clamped_bucket_size(&self) -> usize {
        self.bucket_size.max(1)
    }
}
