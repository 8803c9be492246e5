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

//! Room construction helpers and scene validation.

use cgmath::Vector3;

use crate::{
    d3::polygon::Polygon,
    error::{TraceError, TraceErrorKind},
};

/// Builds the six inward-facing faces of an axis-aligned box with one corner
/// at the origin and the opposite corner at `(width, depth, height)`.
///
/// Face order (and surface ids): floor, ceiling, `y = 0`, `y = depth`,
/// `x = 0`, `x = width`.
pub fn shoebox(width: f64, depth: f64, height: f64) -> Result<Vec<Polygon>, TraceError> {
    if !(width > 0.0 && depth > 0.0 && height > 0.0) {
        return Err(TraceErrorKind::geometry("shoebox dimensions must be positive").into());
    }

    let (w, d, h) = (width, depth, height);
    let v = Vector3::new;

    let loops = vec![
        // floor, facing +z
        vec![v(0.0, 0.0, 0.0), v(w, 0.0, 0.0), v(w, d, 0.0), v(0.0, d, 0.0)],
        // ceiling, facing -z
        vec![v(0.0, 0.0, h), v(0.0, d, h), v(w, d, h), v(w, 0.0, h)],
        // y = 0, facing +y
        vec![v(0.0, 0.0, 0.0), v(0.0, 0.0, h), v(w, 0.0, h), v(w, 0.0, 0.0)],
        // y = depth, facing -y
        vec![v(0.0, d, 0.0), v(w, d, 0.0), v(w, d, h), v(0.0, d, h)],
        // x = 0, facing +x
        vec![v(0.0, 0.0, 0.0), v(0.0, d, 0.0), v(0.0, d, h), v(0.0, 0.0, h)],
        // x = width, facing -x
        vec![v(w, 0.0, 0.0), v(w, 0.0, h), v(w, d, h), v(w, d, 0.0)],
    ];

    let mut faces = Vec::with_capacity(loops.len());
    for (id, vertices) in loops.into_iter().enumerate() {
        faces.push(Polygon::new(id, vertices)?);
    }

    Ok(faces)
}

/// Checks the invariants a scene must satisfy before any tree is built.
///
/// Per-polygon validity (vertex count, convexity, area) is enforced by
/// `Polygon::new`; this checks the scene as a whole.
pub(crate) fn validate_scene(surfaces: &[Polygon]) -> Result<(), TraceError> {
    if surfaces.is_empty() {
        return Err(TraceErrorKind::geometry("surface list is empty").into());
    }

    for (index, surface) in surfaces.iter().enumerate() {
        if surface.id() != index {
            return Err(TraceErrorKind::geometry(format!(
                "surface at index {} carries id {}; ids must be indices",
                index,
                surface.id()
            ))
            .into());
        }
    }

    Ok(())
}
