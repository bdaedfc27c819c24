//! Frame queue between the capture task and the main loop
//!
//! A passive sniffer has no way to slow the bus down, so the queue never
//! blocks the producer: when it is full the oldest unread frame is dropped.

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use heapless::Deque;

use super::frame::CommandFrame;

/// Number of frames held before the oldest is overwritten
pub const FRAME_QUEUE_CAPACITY: usize = 256;

/// Fixed-capacity FIFO of captured frames
#[derive(Debug)]
pub struct FrameQueue {
    frames: Deque<CommandFrame, FRAME_QUEUE_CAPACITY>,
}

impl Default for FrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameQueue {
    pub const fn new() -> Self {
        Self {
            frames: Deque::new(),
        }
    }

    /// Append a frame, dropping the oldest one if the queue is full
    ///
    /// Returns true if a frame was overwritten.
    pub fn enqueue(&mut self, frame: CommandFrame) -> bool {
        let overwrote = if self.frames.is_full() {
            self.frames.pop_front();
            true
        } else {
            false
        };
        // Cannot fail: a slot was freed above if needed
        let _ = self.frames.push_back(frame);
        overwrote
    }

    /// Remove the oldest frame
    pub fn dequeue(&mut self) -> Option<CommandFrame> {
        self.frames.pop_front()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

/// [`FrameQueue`] behind a critical-section mutex
///
/// Safe to share between the capture task (producer) and the main loop
/// (consumer) as a `static`. Each operation holds the lock only for the
/// copy of one frame.
pub struct SharedFrameQueue {
    inner: Mutex<CriticalSectionRawMutex, RefCell<FrameQueue>>,
}

impl Default for SharedFrameQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl SharedFrameQueue {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(FrameQueue::new())),
        }
    }

    /// See [`FrameQueue::enqueue`]
    pub fn enqueue(&self, frame: CommandFrame) -> bool {
        self.inner.lock(|queue| queue.borrow_mut().enqueue(frame))
    }

    /// See [`FrameQueue::dequeue`]
    pub fn dequeue(&self) -> Option<CommandFrame> {
        self.inner.lock(|queue| queue.borrow_mut().dequeue())
    }

    pub fn len(&self) -> usize {
        self.inner.lock(|queue| queue.borrow().len())
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock(|queue| queue.borrow().is_empty())
    }
}
