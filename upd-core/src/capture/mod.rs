//! SPI frame capture
//!
//! The sniffer cannot see the radio's chip select, only the uPD16432B strobe
//! line. A frame is every byte clocked while the strobe is asserted. Frames
//! are built by the capture task and handed to the main loop through a
//! bounded queue that overwrites its oldest entry when full.

pub mod frame;
pub mod queue;
pub mod sniffer;

pub use frame::{CommandFrame, MAX_FRAME_WORDS};
pub use queue::{FrameQueue, SharedFrameQueue, FRAME_QUEUE_CAPACITY};
pub use sniffer::{CaptureOutcome, CaptureStats, FrameCapture};
