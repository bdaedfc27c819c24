//! Protocol session
//!
//! Glues the request assembler, command decoding and the handler around one
//! chip emulator. The firmware main loop feeds it captured frames and host
//! bytes; everything here is synchronous and clock-agnostic so it can be
//! driven from tests.

use upd_core::{ChipCommand, ChipEmulator, CommandFrame, ReselectPolicy, SharedFrameQueue};

use crate::frame::{FeedResult, FrameError, RequestAssembler, Response};
use crate::handler::{CommandHandler, Indicators};
use crate::messages::{CommandError, HostCommand};

/// Reply produced for a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Response to send to the host
    pub response: Response,
    /// Command ID of the request, if one was received
    pub command: Option<u8>,
    /// Why the request was answered with NAK
    pub rejected: Option<CommandError>,
    /// Set if building the response failed; the host sees NAK
    pub fault: Option<FrameError>,
}

impl Reply {
    fn accepted(command: u8, response: Response) -> Self {
        Self {
            response,
            command: Some(command),
            rejected: None,
            fault: None,
        }
    }

    fn rejected(command: Option<u8>, error: CommandError) -> Self {
        Self {
            response: Response::nak(),
            command,
            rejected: Some(error),
            fault: None,
        }
    }

    fn faulted(command: u8, error: FrameError) -> Self {
        Self {
            response: Response::nak(),
            command: Some(command),
            rejected: None,
            fault: Some(error),
        }
    }
}

/// Work done by one main loop iteration
#[derive(Debug)]
pub struct Step {
    /// Frame taken from the queue and the command it decoded to
    pub frame: Option<(CommandFrame, Option<ChipCommand>)>,
    /// A partial request was dropped for inactivity
    pub timed_out: bool,
    /// Reply to send before the next iteration
    pub reply: Option<Reply>,
}

/// Host protocol state plus the emulated chip
pub struct Session<I: Indicators> {
    assembler: RequestAssembler,
    emulator: ChipEmulator,
    handler: CommandHandler<I>,
}

impl<I: Indicators> Session<I> {
    /// Create a session with the chip in its power-on state
    pub fn new(timeout_ms: u32, policy: ReselectPolicy, indicators: I) -> Self {
        Self {
            assembler: RequestAssembler::new(timeout_ms),
            emulator: ChipEmulator::new(policy),
            handler: CommandHandler::new(indicators),
        }
    }

    /// Emulated chip
    pub fn emulator(&self) -> &ChipEmulator {
        &self.emulator
    }

    /// Indicator outputs
    pub fn indicators(&mut self) -> &mut I {
        self.handler.indicators()
    }

    /// Apply a frame captured from the bus
    pub fn on_frame(&mut self, frame: &CommandFrame) -> Option<ChipCommand> {
        self.emulator.process(frame.words())
    }

    /// Feed one byte from the host received at `now_ms`
    ///
    /// Returns a reply when the byte completes a request or is a zero length
    /// prefix.
    pub fn on_host_byte(&mut self, byte: u8, now_ms: u64) -> Option<Reply> {
        let request = match self.assembler.feed(byte, now_ms)? {
            FeedResult::Complete(request) => request,
            FeedResult::ZeroLength => {
                return Some(Reply::rejected(None, CommandError::ZeroLength));
            }
        };

        let id = request.command();
        let reply = match HostCommand::from_request(&request) {
            Ok(command) => match self.handler.execute(&command, &mut self.emulator) {
                Ok(response) => Reply::accepted(id, response),
                Err(e) => Reply::faulted(id, e),
            },
            Err(e) => Reply::rejected(Some(id), e),
        };
        Some(reply)
    }

    /// Run one main loop iteration
    ///
    /// Applies at most one queued frame, expires a stale partial request,
    /// then feeds at most one host byte. Bus frames and host bytes take
    /// turns so neither side can starve the other.
    pub fn step(&mut self, queue: &SharedFrameQueue, byte: Option<u8>, now_ms: u64) -> Step {
        let frame = queue.dequeue().map(|frame| {
            let command = self.on_frame(&frame);
            (frame, command)
        });
        let timed_out = self.poll(now_ms);
        let reply = byte.and_then(|b| self.on_host_byte(b, now_ms));

        Step {
            frame,
            timed_out,
            reply,
        }
    }

    /// Deadline of the partially received request, if any
    pub fn deadline_ms(&self) -> Option<u64> {
        self.assembler.deadline_ms()
    }

    /// Drop a partial request whose deadline has passed
    ///
    /// Returns true if a request was dropped.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        self.assembler.poll(now_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{Status, STATUS_ACK, STATUS_NAK};
    use crate::messages::{CMD_DUMP_STATE, CMD_ECHO, CMD_RESET_CHIP, CMD_SET_LED, Indicator};
    use upd_core::chip::DUMP_SIZE;
    use upd_core::RamArea;

    #[derive(Default, Debug, PartialEq, Eq)]
    struct FakeIndicators {
        green: bool,
        red: bool,
    }

    impl Indicators for FakeIndicators {
        fn set(&mut self, indicator: Indicator, on: bool) {
            match indicator {
                Indicator::Green => self.green = on,
                Indicator::Red => self.red = on,
            }
        }
    }

    fn session() -> Session<FakeIndicators> {
        Session::new(2000, ReselectPolicy::KeepAddress, FakeIndicators::default())
    }

    /// Feed bytes at a fixed time and collect every encoded reply
    fn send(session: &mut Session<FakeIndicators>, bytes: &[u8], now_ms: u64) -> heapless::Vec<u8, 512> {
        let mut out = heapless::Vec::new();
        for &b in bytes {
            if let Some(reply) = session.on_host_byte(b, now_ms) {
                let encoded = reply.response.encode_to_vec().unwrap();
                out.extend_from_slice(&encoded).unwrap();
            }
        }
        out
    }

    #[test]
    fn test_reset_then_dump() {
        let mut s = session();
        s.on_frame(&CommandFrame::from_words(&[0x40, 1, 2, 3]));

        assert_eq!(send(&mut s, &[0x01, CMD_RESET_CHIP], 0).as_slice(), &[0x01, STATUS_ACK]);

        let reply = send(&mut s, &[0x01, CMD_DUMP_STATE], 0);
        assert_eq!(reply.len(), 2 + DUMP_SIZE);
        assert_eq!(reply[0], 150);
        assert_eq!(reply[1], STATUS_ACK);
        // area None, size 0, address 0, increment enabled
        assert_eq!(&reply[2..6], &[0xFF, 0x00, 0x00, 0x01]);
        assert!(reply[6..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_echo_no_args() {
        let mut s = session();
        assert_eq!(send(&mut s, &[0x01, CMD_ECHO], 0).as_slice(), &[0x01, STATUS_ACK]);
    }

    #[test]
    fn test_echo_with_args() {
        let mut s = session();
        assert_eq!(
            send(&mut s, &[0x04, CMD_ECHO, 0xDE, 0xAD, 0x00], 0).as_slice(),
            &[0x04, STATUS_ACK, 0xDE, 0xAD, 0x00]
        );
    }

    #[test]
    fn test_set_led_bad_indicator() {
        let mut s = session();
        let reply = send(&mut s, &[0x03, CMD_SET_LED, 0x02, 0x01], 0);
        assert_eq!(reply.as_slice(), &[0x01, STATUS_NAK]);
        assert_eq!(*s.indicators(), FakeIndicators::default());
    }

    #[test]
    fn test_set_led_green() {
        let mut s = session();
        let reply = send(&mut s, &[0x03, CMD_SET_LED, 0x00, 0x01], 0);
        assert_eq!(reply.as_slice(), &[0x01, STATUS_ACK]);
        assert!(s.indicators().green);
        assert!(!s.indicators().red);
    }

    #[test]
    fn test_rejection_causes() {
        let mut s = session();

        let reply = s.on_host_byte(0x00, 0).unwrap();
        assert_eq!(reply.response.status, Status::Nak);
        assert_eq!(reply.rejected, Some(CommandError::ZeroLength));
        assert_eq!(reply.command, None);

        s.on_host_byte(0x01, 0);
        let reply = s.on_host_byte(0x7F, 0).unwrap();
        assert_eq!(reply.rejected, Some(CommandError::UnknownCommand(0x7F)));
        assert_eq!(reply.command, Some(0x7F));

        s.on_host_byte(0x02, 0);
        s.on_host_byte(CMD_DUMP_STATE, 0);
        let reply = s.on_host_byte(0x00, 0).unwrap();
        assert_eq!(
            reply.rejected,
            Some(CommandError::WrongArgumentCount {
                command: CMD_DUMP_STATE,
                got: 1
            })
        );
    }

    #[test]
    fn test_gap_timeout_discards_request() {
        let mut s = session();

        // Partial SET_LED, then silence past the deadline
        assert!(send(&mut s, &[0x03, CMD_SET_LED], 0).is_empty());
        assert_eq!(s.deadline_ms(), Some(2000));
        assert!(s.poll(2500));
        assert_eq!(s.deadline_ms(), None);

        // The dropped request produced nothing and the next one works
        assert_eq!(send(&mut s, &[0x01, CMD_ECHO], 2600).as_slice(), &[0x01, STATUS_ACK]);
        assert_eq!(*s.indicators(), FakeIndicators::default());
    }

    #[test]
    fn test_gap_timeout_without_poll() {
        let mut s = session();
        assert!(send(&mut s, &[0x03, CMD_SET_LED, 0x01], 0).is_empty());

        // Late byte is treated as a fresh length prefix
        assert!(send(&mut s, &[0x01], 3000).is_empty());
        assert_eq!(send(&mut s, &[CMD_ECHO], 3001).as_slice(), &[0x01, STATUS_ACK]);
        assert!(!s.indicators().red);
    }

    #[test]
    fn test_inject_chargen_glyph() {
        let mut s = session();
        // Select character generator, move to glyph 3, write 7 bytes
        send(&mut s, &[0x02, 0x05, 0x42], 0);
        send(&mut s, &[0x09, 0x05, 0x83, 1, 2, 3, 4, 5, 6, 7], 0);

        let state = s.emulator().state();
        assert_eq!(state.selected_area(), RamArea::CharacterGenerator);
        assert_eq!(&state.chargen()[21..28], &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(state.address(), 28);
    }

    #[test]
    fn test_captured_frames_and_injection_share_state() {
        let mut s = session();
        s.on_frame(&CommandFrame::from_words(&[0x40, 0x11]));
        send(&mut s, &[0x02, 0x05, 0x00], 0);

        // 0x00 is neither a data nor an address command
        assert_eq!(s.emulator().state().address(), 1);

        send(&mut s, &[0x03, 0x05, 0x40, 0x22], 0);
        assert_eq!(&s.emulator().state().display_data()[..2], &[0x11, 0x22]);
    }

    #[test]
    fn test_step_takes_one_frame_per_iteration() {
        let mut s = session();
        let queue = SharedFrameQueue::new();
        queue.enqueue(CommandFrame::from_words(&[0x40, 0x11]));
        queue.enqueue(CommandFrame::from_words(&[0x85]));
        queue.enqueue(CommandFrame::from_words(&[0x81, 0x22]));

        let step = s.step(&queue, None, 0);
        let (frame, command) = step.frame.unwrap();
        assert_eq!(frame.words(), &[0x40, 0x11]);
        assert!(command.is_some());
        assert_eq!(queue.len(), 2);
        assert!(step.reply.is_none());

        s.step(&queue, None, 0);
        s.step(&queue, None, 0);
        assert!(queue.is_empty());
        assert_eq!(&s.emulator().state().display_data()[..2], &[0x11, 0x22]);
        assert_eq!(s.emulator().state().address(), 2);

        let step = s.step(&queue, None, 0);
        assert!(step.frame.is_none());
        assert!(!step.timed_out);
    }

    #[test]
    fn test_step_interleaves_host_bytes_with_frames() {
        let mut s = session();
        let queue = SharedFrameQueue::new();
        for _ in 0..5 {
            queue.enqueue(CommandFrame::from_words(&[0x40, 0x01]));
        }

        // A 2-byte ECHO completes on the second step, while frames are
        // still waiting
        assert!(s.step(&queue, Some(0x01), 0).reply.is_none());
        let reply = s.step(&queue, Some(CMD_ECHO), 0).reply.unwrap();
        assert_eq!(reply.response.status, Status::Ack);
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_step_frame_lands_before_byte() {
        let mut s = session();
        let queue = SharedFrameQueue::new();
        queue.enqueue(CommandFrame::from_words(&[0x40, 0xAA]));

        // DUMP in the same iteration as the frame already sees it
        s.step(&queue, Some(0x01), 0);
        let reply = s.step(&queue, Some(CMD_DUMP_STATE), 0).reply.unwrap();
        let encoded = reply.response.encode_to_vec().unwrap();
        assert_eq!(&encoded[2..6], &[0x00, 0x19, 0x01, 0x01]);
        assert_eq!(encoded[6], 0xAA);
    }

    #[test]
    fn test_step_reports_timeout() {
        let mut s = session();
        let queue = SharedFrameQueue::new();

        s.step(&queue, Some(0x03), 0);
        assert!(!s.step(&queue, None, 1999).timed_out);
        let step = s.step(&queue, None, 2001);
        assert!(step.timed_out);
        assert!(step.reply.is_none());
        assert_eq!(s.deadline_ms(), None);
    }
}
