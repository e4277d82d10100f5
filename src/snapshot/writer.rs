//! Incremental JSON writer.
//!
//! Event-level output (begin/end object, key, scalar) over any `io::Write`,
//! so a snapshot streams out without ever being materialized in memory.
//! String escaping and number formatting are delegated to `serde_json`.

use crate::error::SnapshotError;
use serde::Serialize;
use std::io::Write;

pub struct JsonStreamWriter<W: Write> {
    out: W,
    /// One needs-separator flag per open container.
    stack: Vec<bool>,
    /// Set after a key is written; the next value must not emit a comma.
    pending_key: bool,
}

impl<W: Write> JsonStreamWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            stack: Vec::new(),
            pending_key: false,
        }
    }

    fn before_item(&mut self) -> Result<(), SnapshotError> {
        if self.pending_key {
            self.pending_key = false;
            return Ok(());
        }
        if let Some(needs_comma) = self.stack.last_mut() {
            if *needs_comma {
                self.out.write_all(b",")?;
            }
            *needs_comma = true;
        }
        Ok(())
    }

    pub fn begin_object(&mut self) -> Result<(), SnapshotError> {
        self.before_item()?;
        self.out.write_all(b"{")?;
        self.stack.push(false);
        Ok(())
    }

    pub fn end_object(&mut self) -> Result<(), SnapshotError> {
        self.stack.pop();
        self.out.write_all(b"}")?;
        Ok(())
    }

    pub fn begin_array(&mut self) -> Result<(), SnapshotError> {
        self.before_item()?;
        self.out.write_all(b"[")?;
        self.stack.push(false);
        Ok(())
    }

    pub fn end_array(&mut self) -> Result<(), SnapshotError> {
        self.stack.pop();
        self.out.write_all(b"]")?;
        Ok(())
    }

    pub fn key(&mut self, name: &str) -> Result<(), SnapshotError> {
        self.before_item()?;
        serde_json::to_writer(&mut self.out, name)?;
        self.out.write_all(b":")?;
        self.pending_key = true;
        Ok(())
    }

    pub fn scalar<T: Serialize>(&mut self, value: &T) -> Result<(), SnapshotError> {
        self.before_item()?;
        serde_json::to_writer(&mut self.out, value)?;
        Ok(())
    }

    pub fn finish(mut self) -> Result<(), SnapshotError> {
        self.out.flush()?;
        Ok(())
    }
}
