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

//! Error types for tracer construction and queries.
//!
//! Construction errors are fatal to the build and leave no partial state
//! behind. Query errors abort the query. Numeric degeneracies are *not*
//! errors: the offending intersection is reported as no hit, the path as
//! invalid or the split as no split, and the algorithm proceeds.

use failure::{Backtrace, Context, Fail};
use std::{
    convert::From,
    fmt::{self, Display},
};

#[derive(Debug)]
pub struct TraceError {
    inner: Context<TraceErrorKind>,
}

impl TraceError {
    pub fn kind(&self) -> TraceErrorKind {
        self.inner.get_context().clone()
    }
}

impl From<TraceErrorKind> for TraceError {
    fn from(kind: TraceErrorKind) -> Self {
        TraceError {
            inner: Context::new(kind),
        }
    }
}

impl From<Context<TraceErrorKind>> for TraceError {
    fn from(inner: Context<TraceErrorKind>) -> Self {
        TraceError { inner }
    }
}

impl Fail for TraceError {
    fn cause(&self) -> Option<&Fail> {
        self.inner.cause()
    }

    fn backtrace(&self) -> Option<&Backtrace> {
        self.inner.backtrace()
    }
}

impl Display for TraceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum TraceErrorKind {
    /// The scene handed to the tracer cannot be traced: empty surface list, a
    /// polygon with fewer than three vertices, a degenerate or non-convex
    /// polygon, or a zero-length wall.
    #[fail(display = "Invalid geometry: {}", reason)]
    InvalidGeometry { reason: String },

    /// The listener handed to a query is unusable (non-finite coordinates).
    #[fail(display = "Invalid query: {}", reason)]
    InvalidQuery { reason: String },
}

impl TraceErrorKind {
    pub fn geometry<S>(reason: S) -> TraceErrorKind
    where
        S: AsRef<str>,
    {
        TraceErrorKind::InvalidGeometry {
            reason: reason.as_ref().to_owned(),
        }
    }

    pub fn query<S>(reason: S) -> TraceErrorKind
    where
        S: AsRef<str>,
    {
        TraceErrorKind::InvalidQuery {
            reason: reason.as_ref().to_owned(),
        }
    }
}
