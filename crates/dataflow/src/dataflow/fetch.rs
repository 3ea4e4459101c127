//! Pull-based snapshot protocol.

use alloc::vec::Vec;
use sluice_core::{Error, Record, Result};

/// Callback receiving snapshot chunks: `(records, last)`.
pub type Sink<'a> = dyn FnMut(Vec<Record>, bool) -> Result<()> + 'a;

/// Guarded fetch receiver.
///
/// Forwards chunks to a sink and enforces that exactly one chunk is marked
/// last and that nothing follows it.
pub struct Receiver<'a> {
    node: &'a str,
    sink: &'a mut Sink<'a>,
    ended: bool,
}

impl<'a> Receiver<'a> {
    /// Wraps a sink for a fetch on `node`.
    pub fn new(node: &'a str, sink: &'a mut Sink<'a>) -> Self {
        Self {
            node,
            sink,
            ended: false,
        }
    }

    /// Delivers one chunk.
    ///
    /// Calling this again after a chunk with `last = true` is a protocol
    /// violation and fails with `Error::FetchAfterEnd`.
    pub fn push(&mut self, records: Vec<Record>, last: bool) -> Result<()> {
        if self.ended {
            return Err(Error::fetch_after_end(self.node));
        }
        self.ended = last;
        (self.sink)(records, last)
    }

    /// Returns true once the last chunk has been delivered.
    #[inline]
    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Checks that the fetch delivered its last chunk.
    pub fn finish(self) -> Result<()> {
        if self.ended {
            Ok(())
        } else {
            Err(Error::fetch_unterminated(self.node))
        }
    }
}
