//! Inter-task communication
//!
//! The frame queue is the only structure both tasks touch. The capture task
//! fills it and raises [`FRAME_READY`]; the main loop drains it.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use upd_core::capture::CaptureStats;
use upd_core::SharedFrameQueue;

/// Captured frames waiting for the main loop
pub static FRAME_QUEUE: SharedFrameQueue = SharedFrameQueue::new();

/// Raised after a frame is enqueued
pub static FRAME_READY: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Latest capture counters, published for the heartbeat log
static CAPTURE_STATS: Mutex<CriticalSectionRawMutex, Cell<CaptureStats>> =
    Mutex::new(Cell::new(CaptureStats {
        enqueued: 0,
        empty: 0,
        key_scan: 0,
        truncated: 0,
        overwritten: 0,
        stray_words: 0,
    }));

pub fn publish_stats(stats: CaptureStats) {
    CAPTURE_STATS.lock(|cell| cell.set(stats));
}

pub fn capture_stats() -> CaptureStats {
    CAPTURE_STATS.lock(|cell| cell.get())
}
