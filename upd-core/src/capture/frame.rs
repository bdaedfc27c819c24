//! Captured command frames

use heapless::Vec;

/// Maximum SPI bytes kept per frame
pub const MAX_FRAME_WORDS: usize = 32;

/// SPI bytes received during one strobe assertion
///
/// Bytes beyond [`MAX_FRAME_WORDS`] are dropped and the frame is marked
/// truncated.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CommandFrame {
    words: Vec<u8, MAX_FRAME_WORDS>,
    truncated: bool,
}

impl CommandFrame {
    /// Create an empty frame
    pub const fn new() -> Self {
        Self {
            words: Vec::new(),
            truncated: false,
        }
    }

    /// Build a frame from a byte slice, keeping at most [`MAX_FRAME_WORDS`]
    pub fn from_words(words: &[u8]) -> Self {
        let mut frame = Self::new();
        for &word in words {
            frame.push(word);
        }
        frame
    }

    /// Append a byte
    ///
    /// Returns false (and marks the frame truncated) if the frame is full.
    pub fn push(&mut self, word: u8) -> bool {
        if self.words.push(word).is_err() {
            self.truncated = true;
            return false;
        }
        true
    }

    /// Drop all bytes and clear the truncated flag
    pub fn clear(&mut self) {
        self.words.clear();
        self.truncated = false;
    }

    /// Captured bytes, command byte first
    pub fn words(&self) -> &[u8] {
        &self.words
    }

    /// The command byte, if any
    pub fn command(&self) -> Option<u8> {
        self.words.first().copied()
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True if bytes were dropped because the frame was full
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}
