//! Main loop task
//!
//! Cooperatively drains captured frames into the chip emulator and the
//! trace output, and serves host requests one byte at a time. The
//! scheduling of each iteration lives in [`Session::step`].

use defmt::*;
use embassy_futures::select::{select, select3, Either, Either3};
use embassy_futures::yield_now;
use embassy_rp::uart::{self, BufferedUartRx, BufferedUartTx};
use embassy_time::{Instant, Timer};
use embedded_io_async::{Read, Write};

use upd_core::trace::TraceWriter;
use upd_hal_rp2040::TraceUart;
use upd_protocol::{Reply, Session};

use crate::channels::{FRAME_QUEUE, FRAME_READY};
use crate::fault::SharedIndicators;

/// Main loop task - owns the emulator session and both UART writers
#[embassy_executor::task]
pub async fn main_loop_task(
    mut rx: BufferedUartRx,
    mut tx: BufferedUartTx,
    mut trace: TraceWriter<TraceUart>,
    mut session: Session<SharedIndicators>,
) {
    info!("Main loop task started");

    if let Err(e) = trace.banner().await {
        warn!("Trace banner failed: {:?}", e);
    }

    let mut byte = [0u8; 1];
    let mut pending: Option<u8> = None;

    loop {
        if let Some(b) = pending {
            trace!("Host byte {=u8:02X}", b);
        }

        let step = session.step(&FRAME_QUEUE, pending.take(), now_ms());

        if let Some((frame, command)) = &step.frame {
            debug!("Frame {=[u8]:02X} -> {:?}", frame.words(), command);
            if let Err(e) = trace.frame(frame).await {
                warn!("Trace write failed: {:?}", e);
            }
        }

        if step.timed_out {
            debug!("Host request timed out, discarded");
        }

        if let Some(reply) = &step.reply {
            send_reply(&mut tx, reply).await;
        }

        pending = if FRAME_QUEUE.is_empty() {
            wait_idle(&mut rx, session.deadline_ms(), &mut byte).await
        } else {
            // Frames are pending: only take a byte that has already arrived
            match select(rx.read(&mut byte), yield_now()).await {
                Either::First(result) => received(result, &byte),
                Either::Second(()) => None,
            }
        };
    }
}

fn now_ms() -> u64 {
    Instant::now().as_millis()
}

fn received(result: Result<usize, uart::Error>, byte: &[u8; 1]) -> Option<u8> {
    match result {
        Ok(n) if n > 0 => Some(byte[0]),
        Ok(_) => None,
        Err(e) => {
            warn!("Host UART read error: {:?}", e);
            None
        }
    }
}

/// Sleep until a frame is queued, a host byte arrives or the request
/// deadline passes
async fn wait_idle(
    rx: &mut BufferedUartRx,
    deadline_ms: Option<u64>,
    byte: &mut [u8; 1],
) -> Option<u8> {
    let deadline = deadline_ms.map(Instant::from_millis).unwrap_or(Instant::MAX);

    match select3(FRAME_READY.wait(), rx.read(byte), Timer::at(deadline)).await {
        Either3::Second(result) => received(result, byte),
        // Expiry is handled by the next step
        Either3::First(()) | Either3::Third(()) => None,
    }
}

/// Write a reply and wait until it has fully left the UART
async fn send_reply(tx: &mut BufferedUartTx, reply: &Reply) {
    if let Some(e) = reply.rejected {
        warn!("Request {:?} rejected: {:?}", reply.command, e);
    }
    if let Some(e) = reply.fault {
        error!("Reply for {:?} could not be built: {:?}", reply.command, e);
    }

    let encoded = match reply.response.encode_to_vec() {
        Ok(encoded) => encoded,
        Err(e) => {
            error!("Reply encoding failed: {:?}", e);
            return;
        }
    };

    if let Err(e) = tx.write_all(&encoded).await {
        warn!("Failed to send reply: {:?}", e);
        return;
    }
    if let Err(e) = tx.flush().await {
        warn!("Failed to flush reply: {:?}", e);
        return;
    }

    debug!(
        "Reply {:?} with {} payload bytes",
        reply.response.status,
        reply.response.payload.len()
    );
}
