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

//! Specular acoustic reflection paths in static polygonal rooms.
//!
//! Given a room described by wall segments (2D) or convex polygons (3D), a
//! point source and a maximum reflection order, `sabine` precomputes a tree of
//! image sources and answers listener queries with every geometrically valid
//! specular path connecting source and listener. Queries are accelerated by a
//! BSP tree for occlusion tests and by two caches (fail planes and skip
//! spheres) that reuse work across successive listener positions.

#[macro_use]
extern crate log;

pub mod common;
pub mod config;
pub mod d2;
pub mod d3;
pub mod error;
pub mod metrics;
