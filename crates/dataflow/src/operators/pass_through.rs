//! Identity node.
//!
//! Used as the explicit fan-in point of a join and as a convenient source:
//! it keeps no state, so its snapshot is whatever its `MAIN` sources hold.

use crate::dataflow::Operator;
use core::any::Any;

/// Forwards every operation unchanged.
#[derive(Clone, Copy, Debug, Default)]
pub struct PassThrough;

impl PassThrough {
    /// Creates a pass-through node.
    pub fn new() -> Self {
        PassThrough
    }
}

impl Operator for PassThrough {
    fn kind(&self) -> &'static str {
        "pass_through"
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
