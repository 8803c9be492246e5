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

//! 2D room construction helpers and scene validation.

use cgmath::Vector2;

use crate::{
    d2::wall::Wall,
    error::{TraceError, TraceErrorKind},
};

/// Builds the four inward-facing walls of an axis-aligned rectangle with one
/// corner at the origin, wound counter-clockwise so every implicit normal
/// points into the room.
pub fn rectangle(width: f64, height: f64) -> Result<Vec<Wall>, TraceError> {
    if !(width > 0.0 && height > 0.0) {
        return Err(TraceErrorKind::geometry("rectangle dimensions must be positive").into());
    }

    let v = Vector2::new;
    from_segments(&[
        (v(0.0, 0.0), v(width, 0.0)),
        (v(width, 0.0), v(width, height)),
        (v(width, height), v(0.0, height)),
        (v(0.0, height), v(0.0, 0.0)),
    ])
}

/// Builds a wall list from endpoint pairs, assigning ids by position.
pub fn from_segments(
    segments: &[(Vector2<f64>, Vector2<f64>)],
) -> Result<Vec<Wall>, TraceError> {
    let mut walls = Vec::with_capacity(segments.len());
    for (id, (p1, p2)) in segments.iter().enumerate() {
        walls.push(Wall::new(id, *p1, *p2)?);
    }

    Ok(walls)
}

/// Checks the invariants a scene must satisfy before any tree is built.
pub(crate) fn validate_scene(walls: &[Wall]) -> Result<(), TraceError> {
    if walls.is_empty() {
        return Err(TraceErrorKind::geometry("wall list is empty").into());
    }

    for (index, wall) in walls.iter().enumerate() {
        if wall.id() != index {
            return Err(TraceErrorKind::geometry(format!(
                "wall at index {} carries id {}; ids must be indices",
                index,
                wall.id()
            ))
            .into());
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::common::math::EPSILON;

    #[test]
    fn test_rectangle_faces_inward() {
        let room = rectangle(100.0, 100.0).expect("valid dimensions");
        assert_eq!(room.len(), 4);

        let center = Vector2::new(50.0, 50.0);
        for wall in &room {
            assert!(
                wall.line().point_dist(center) > EPSILON,
                "wall {} does not face the interior",
                wall.id()
            );
        }
    }

    #[test]
    fn test_rectangle_rejects_flat() {
        assert!(rectangle(0.0, 10.0).is_err());
        assert!(rectangle(10.0, -1.0).is_err());
    }

    #[test]
    fn test_validate_scene() {
        let room = rectangle(10.0, 10.0).expect("valid dimensions");
        assert!(validate_scene(&room).is_ok());
        assert!(validate_scene(&[]).is_err());
    }
}
