//! Flat, word-addressed main memory.
//!
//! Memory is modeled as an array of tagged [`Value`] cells so a word can
//! hold either an integer or a double without the caller tracking which
//! kind lives at a given address. Accesses use byte addresses; the
//! legacy `4 * base + displacement` addressing quirk (see
//! [`crate::common::constants::WORD_BYTES`]) is handled by the load/store
//! queue, not here.

use tracing::trace;

use crate::common::constants::MEM_WORDS;
use crate::common::{SimError, Value};

/// The simulator's main memory: `MEM_WORDS` four-byte words.
#[derive(Debug, Clone)]
pub struct Memory {
    words: Vec<Value>,
}

impl Memory {
    /// Builds a zero-initialized memory of `MEM_WORDS` integer-tagged words.
    #[must_use]
    pub fn new() -> Self {
        Self::with_size(MEM_WORDS)
    }

    /// Builds a zero-initialized memory of `words` integer-tagged words, as
    /// configured by the input file's `LoadStoreUnit` line.
    #[must_use]
    pub fn with_size(words: usize) -> Self {
        Self {
            words: vec![Value::Int(0); words.max(1)],
        }
    }

    fn word_index(&self, byte_addr: usize) -> Result<usize, SimError> {
        let index = byte_addr / crate::common::constants::WORD_BYTES;
        if index >= self.words.len() {
            return Err(SimError::OutOfRangeMemory { addr: byte_addr });
        }
        Ok(index)
    }

    /// Reads the word at `byte_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRangeMemory`] if `byte_addr` falls outside
    /// the configured memory.
    pub fn read(&self, byte_addr: usize) -> Result<Value, SimError> {
        let idx = self.word_index(byte_addr)?;
        Ok(self.words[idx])
    }

    /// Writes `value` to the word at `byte_addr`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OutOfRangeMemory`] if `byte_addr` falls outside
    /// the configured memory.
    pub fn write(&mut self, byte_addr: usize, value: Value) -> Result<(), SimError> {
        let idx = self.word_index(byte_addr)?;
        trace!(byte_addr, ?value, "memory write");
        self.words[idx] = value;
        Ok(())
    }

    /// Iterates `(word index, value)` pairs for every word, in address order.
    pub fn words(&self) -> impl Iterator<Item = (usize, Value)> + '_ {
        self.words.iter().copied().enumerate()
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::constants::WORD_BYTES;

    #[test]
    fn write_then_read_round_trips() {
        let mut mem = Memory::new();
        mem.write(4 * WORD_BYTES, Value::Float(3.14)).unwrap();
        assert_eq!(mem.read(4 * WORD_BYTES).unwrap(), Value::Float(3.14));
    }

    #[test]
    fn out_of_range_access_is_an_error() {
        let mem = Memory::new();
        let past_end = MEM_WORDS * WORD_BYTES;
        assert!(matches!(
            mem.read(past_end),
            Err(SimError::OutOfRangeMemory { addr }) if addr == past_end
        ));
    }
}
