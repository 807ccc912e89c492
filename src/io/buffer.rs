//! Growable write buffer with flush/backoff policy.
//!
//! Output accumulates here and is drained to the underlying stream
//! whenever the remaining headroom drops below [`FIELD_HEADROOM`] — the
//! bound on the largest single field write, which also caps usable float
//! precision near 24 digits. Allocation is fallible: the requested size
//! halves on failure until it drops below [`MIN_CAPACITY`], at which point
//! the buffer enters a permanent failed state.

use std::io::{self, Write};

/// Initial backing-store request: 256 KiB.
pub(crate) const INITIAL_CAPACITY: usize = 256 * 1024;
/// Below this the backoff gives up and the buffer is declared exhausted.
pub(crate) const MIN_CAPACITY: usize = 256;
/// Largest single field write; flushing keeps at least this much free.
pub(crate) const FIELD_HEADROOM: usize = 32;

pub(crate) struct WriteBuffer {
    buf: Vec<u8>,
    exhausted: bool,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self { buf: Vec::new(), exhausted: false }
    }

    /// Ensure backing storage exists, halving the request on allocation
    /// failure. Returns false once the permanent failed state is reached.
    pub fn allocate(&mut self) -> bool {
        if self.exhausted {
            return false;
        }
        if self.buf.capacity() >= MIN_CAPACITY {
            return true;
        }
        let mut want = INITIAL_CAPACITY;
        while want >= MIN_CAPACITY {
            match self.buf.try_reserve_exact(want) {
                Ok(()) => return true,
                Err(_) => {
                    want /= 2;
                    tracing::warn!(new_size = want, "write buffer allocation failed; halving");
                }
            }
        }
        tracing::error!("write buffer request fell below minimum size; writes disabled");
        self.exhausted = true;
        false
    }

    /// Bytes currently buffered and not yet drained.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    fn headroom(&self) -> usize {
        self.buf.capacity().saturating_sub(self.buf.len())
    }

    /// Append one formatted field, then flush if headroom fell below the
    /// single-field bound.
    pub fn push_field(&mut self, out: &mut dyn Write, args: std::fmt::Arguments<'_>) -> io::Result<()> {
        self.buf.write_fmt(args)?;
        self.maybe_flush(out)
    }

    /// Append a string of arbitrary length. A string that does not fit the
    /// remaining headroom bypasses the buffer after a forced drain.
    pub fn push_str(&mut self, out: &mut dyn Write, s: &str) -> io::Result<()> {
        if s.len() < self.headroom() {
            self.buf.extend_from_slice(s.as_bytes());
            self.maybe_flush(out)
        } else {
            self.forced_flush(out)?;
            out.write_all(s.as_bytes())
        }
    }

    /// Drain only when remaining headroom is below the field bound.
    pub fn maybe_flush(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if self.headroom() < FIELD_HEADROOM {
            self.forced_flush(out)?;
        }
        Ok(())
    }

    /// Drain regardless of the headroom margin.
    pub fn forced_flush(&mut self, out: &mut dyn Write) -> io::Result<()> {
        if !self.buf.is_empty() {
            out.write_all(&self.buf)?;
            self.buf.clear();
        }
        Ok(())
    }

    /// Drop the backing storage.
    pub fn release(&mut self) {
        self.buf = Vec::new();
    }
}

// ============================================================================
// Tests
// ============================================================================
