//! Strobe-delimited frame assembly
//!
//! Driven by three events from the bus: strobe rising, byte received,
//! strobe falling. The firmware guarantees every byte clocked before the
//! strobe fell is delivered before [`FrameCapture::strobe_deasserted`].

use super::frame::CommandFrame;
use super::queue::SharedFrameQueue;
use crate::chip::command::KEY_SCAN_OPCODE;

/// What happened to a frame when the strobe was released
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CaptureOutcome {
    /// No bytes were clocked (missed edge or stray pulse)
    Empty,
    /// Key/status read traffic; not modelled
    KeyScan,
    /// Frame handed to the main loop
    Enqueued {
        /// The oldest unread frame was dropped to make room
        overwrote: bool,
        /// More than 32 bytes were clocked; the excess was dropped
        truncated: bool,
    },
}

/// Capture counters, for logging only
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CaptureStats {
    pub enqueued: u32,
    pub empty: u32,
    pub key_scan: u32,
    pub truncated: u32,
    pub overwritten: u32,
    /// Bytes received while the strobe was not asserted
    pub stray_words: u32,
}

/// Frame assembler for the capture task
#[derive(Debug, Default)]
pub struct FrameCapture {
    frame: CommandFrame,
    active: bool,
    stats: CaptureStats,
}

impl FrameCapture {
    pub const fn new() -> Self {
        Self {
            frame: CommandFrame::new(),
            active: false,
            stats: CaptureStats {
                enqueued: 0,
                empty: 0,
                key_scan: 0,
                truncated: 0,
                overwritten: 0,
                stray_words: 0,
            },
        }
    }

    /// Strobe went active: start a new frame
    ///
    /// A frame still open from a missed falling edge is discarded.
    pub fn strobe_asserted(&mut self) {
        self.frame.clear();
        self.active = true;
    }

    /// A byte was shifted in from MOSI
    pub fn word_received(&mut self, word: u8) {
        if !self.active {
            self.stats.stray_words = self.stats.stray_words.wrapping_add(1);
            return;
        }
        self.frame.push(word);
    }

    /// Strobe went inactive: close the frame and queue it if it is a write
    pub fn strobe_deasserted(&mut self, queue: &SharedFrameQueue) -> CaptureOutcome {
        self.active = false;
        let frame = core::mem::take(&mut self.frame);

        match frame.command() {
            None => {
                self.stats.empty = self.stats.empty.wrapping_add(1);
                CaptureOutcome::Empty
            }
            Some(KEY_SCAN_OPCODE) => {
                self.stats.key_scan = self.stats.key_scan.wrapping_add(1);
                CaptureOutcome::KeyScan
            }
            Some(_) => {
                let truncated = frame.is_truncated();
                let overwrote = queue.enqueue(frame);

                self.stats.enqueued = self.stats.enqueued.wrapping_add(1);
                if truncated {
                    self.stats.truncated = self.stats.truncated.wrapping_add(1);
                }
                if overwrote {
                    self.stats.overwritten = self.stats.overwritten.wrapping_add(1);
                }
                CaptureOutcome::Enqueued {
                    overwrote,
                    truncated,
                }
            }
        }
    }

    /// True between a strobe assertion and its release
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn stats(&self) -> CaptureStats {
        self.stats
    }
}
