//! Bus capture task
//!
//! Follows the chip strobe, gates the PIO receiver through `/SS out` and
//! turns each strobe period into a frame on the shared queue.
//!
//! Spawned on the interrupt executor, so it pre-empts the main loop as soon
//! as the strobe or the PIO FIFO wakes it.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::PIO0;

use upd_core::{CaptureOutcome, FrameCapture};
use upd_hal_rp2040::PioSniffer;

use crate::channels::{publish_stats, FRAME_QUEUE, FRAME_READY};

/// Capture task - owns the receiver, the strobe input and `/SS out`
#[embassy_executor::task]
pub async fn capture_task(
    mut sniffer: PioSniffer<'static, PIO0, 0>,
    mut strobe: Input<'static>,
    mut ss_out: Output<'static>,
) {
    info!("Capture task started");

    let mut capture = FrameCapture::new();

    loop {
        strobe.wait_for_high().await;
        ss_out.set_low();
        capture.strobe_asserted();

        loop {
            match select(strobe.wait_for_low(), sniffer.read_word()).await {
                Either::First(()) => break,
                Either::Second(word) => capture.word_received(word),
            }
        }

        ss_out.set_high();

        // Bytes shifted in just before the strobe fell belong to this frame
        while let Some(word) = sniffer.try_read_word() {
            capture.word_received(word);
        }

        let outcome = capture.strobe_deasserted(&FRAME_QUEUE);
        sniffer.resync();

        match outcome {
            CaptureOutcome::Empty => trace!("Empty strobe period"),
            CaptureOutcome::KeyScan => trace!("Key scan frame skipped"),
            CaptureOutcome::Enqueued {
                overwrote,
                truncated,
            } => {
                if overwrote {
                    warn!("Frame queue full, oldest frame overwritten");
                }
                if truncated {
                    warn!("Frame longer than 32 bytes, truncated");
                }
                FRAME_READY.signal(());
            }
        }

        publish_stats(capture.stats());
    }
}
