//! Request assembly and response encoding
//!
//! Requests arrive one byte at a time. The first byte is the number of
//! bytes that follow (command byte plus arguments); a request is complete
//! once that many bytes have been received. Each byte pushes the
//! inactivity deadline forward; when it passes, the partial request is
//! thrown away and the next byte is read as a fresh length.

use heapless::Vec;

/// Acknowledge status byte
pub const STATUS_ACK: u8 = 0x06;

/// Negative acknowledge status byte
pub const STATUS_NAK: u8 = 0x15;

/// Largest request body (command byte plus arguments)
pub const MAX_REQUEST_BODY: usize = u8::MAX as usize;

/// Largest response payload; the length prefix also counts the status byte
pub const MAX_RESPONSE_PAYLOAD: usize = u8::MAX as usize - 1;

/// Largest encoded response (LENGTH + STATUS + PAYLOAD)
pub const MAX_RESPONSE_SIZE: usize = 2 + MAX_RESPONSE_PAYLOAD;

/// Errors that can occur while building or encoding a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload does not fit behind a one-byte length prefix
    PayloadTooLarge,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A complete request body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    body: Vec<u8, MAX_REQUEST_BODY>,
}

impl Request {
    /// Build a request from its body bytes (command byte first)
    ///
    /// Returns `None` for an empty body, which is not a valid request.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        if body.is_empty() {
            return None;
        }
        Vec::from_slice(body).ok().map(|body| Self { body })
    }

    /// Command byte
    pub fn command(&self) -> u8 {
        self.body[0]
    }

    /// Argument bytes following the command
    pub fn args(&self) -> &[u8] {
        &self.body[1..]
    }

    /// Length as it appeared on the wire
    pub fn declared_length(&self) -> u8 {
        self.body.len() as u8
    }
}

/// Result of feeding one byte to the assembler
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedResult {
    /// A full request is ready for dispatch
    Complete(Request),
    /// The length byte was zero; reply NAK and keep waiting for a length
    ZeroLength,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AssemblerState {
    /// Next byte is a length prefix
    AwaitingLength,
    /// Collecting `expected` body bytes
    AccumulatingBody { expected: u8, deadline_ms: u64 },
}

/// Byte-at-a-time request assembler with inactivity deadline
///
/// Time is passed in as milliseconds since an arbitrary epoch so the
/// assembler does not depend on a particular clock.
#[derive(Debug, Clone)]
pub struct RequestAssembler {
    state: AssemblerState,
    body: Vec<u8, MAX_REQUEST_BODY>,
    timeout_ms: u32,
}

impl RequestAssembler {
    /// Create an assembler with the given inactivity timeout
    pub const fn new(timeout_ms: u32) -> Self {
        Self {
            state: AssemblerState::AwaitingLength,
            body: Vec::new(),
            timeout_ms,
        }
    }

    /// Drop any partial request
    pub fn reset(&mut self) {
        self.state = AssemblerState::AwaitingLength;
        self.body.clear();
    }

    /// True while part of a request has been received
    pub fn is_accumulating(&self) -> bool {
        matches!(self.state, AssemblerState::AccumulatingBody { .. })
    }

    /// Absolute time at which the partial request expires, if one is pending
    pub fn deadline_ms(&self) -> Option<u64> {
        match self.state {
            AssemblerState::AwaitingLength => None,
            AssemblerState::AccumulatingBody { deadline_ms, .. } => Some(deadline_ms),
        }
    }

    /// Expire the partial request if its deadline has passed
    ///
    /// Returns true when a partial request was discarded.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms() {
            Some(deadline) if now_ms >= deadline => {
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Feed one byte received at `now_ms`
    ///
    /// Returns `Some` when the byte completes a request or is a zero
    /// length prefix, `None` while more bytes are needed.
    pub fn feed(&mut self, byte: u8, now_ms: u64) -> Option<FeedResult> {
        // A late byte starts a new request rather than completing a stale one
        self.poll(now_ms);

        match self.state {
            AssemblerState::AwaitingLength => {
                if byte == 0 {
                    return Some(FeedResult::ZeroLength);
                }
                self.body.clear();
                self.state = AssemblerState::AccumulatingBody {
                    expected: byte,
                    deadline_ms: self.next_deadline(now_ms),
                };
                None
            }
            AssemblerState::AccumulatingBody { expected, .. } => {
                // Cannot overflow: expected <= MAX_REQUEST_BODY
                let _ = self.body.push(byte);

                if self.body.len() < expected as usize {
                    self.state = AssemblerState::AccumulatingBody {
                        expected,
                        deadline_ms: self.next_deadline(now_ms),
                    };
                    return None;
                }

                let request = Request {
                    body: self.body.clone(),
                };
                self.reset();
                Some(FeedResult::Complete(request))
            }
        }
    }

    fn next_deadline(&self, now_ms: u64) -> u64 {
        now_ms.saturating_add(u64::from(self.timeout_ms))
    }
}

/// Response status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Status {
    Ack,
    Nak,
}

impl Status {
    /// Wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            Status::Ack => STATUS_ACK,
            Status::Nak => STATUS_NAK,
        }
    }
}

/// A response to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: Status,
    pub payload: Vec<u8, MAX_RESPONSE_PAYLOAD>,
}

impl Response {
    /// Bare acknowledge
    pub fn ack() -> Self {
        Self {
            status: Status::Ack,
            payload: Vec::new(),
        }
    }

    /// Bare negative acknowledge
    pub fn nak() -> Self {
        Self {
            status: Status::Nak,
            payload: Vec::new(),
        }
    }

    /// Acknowledge carrying a payload
    pub fn ack_with(payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::PayloadTooLarge)?;
        Ok(Self {
            status: Status::Ack,
            payload,
        })
    }

    /// Value of the length prefix (status plus payload)
    pub fn length_byte(&self) -> u8 {
        // payload is capped at MAX_RESPONSE_PAYLOAD so this fits
        (1 + self.payload.len()) as u8
    }

    /// Encode into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = 2 + self.payload.len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        buffer[0] = self.length_byte();
        buffer[1] = self.status.to_byte();
        buffer[2..frame_len].copy_from_slice(&self.payload);

        Ok(frame_len)
    }

    /// Encode into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_RESPONSE_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_RESPONSE_SIZE];
        let len = self.encode(&mut buffer)?;
        Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::BufferTooSmall)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: u32 = 2000;

    fn feed_all(asm: &mut RequestAssembler, bytes: &[u8], now_ms: u64) -> Option<FeedResult> {
        let mut result = None;
        for &b in bytes {
            result = asm.feed(b, now_ms);
        }
        result
    }

    #[test]
    fn test_single_byte_request() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        assert_eq!(asm.feed(0x01, 0), None);
        assert!(asm.is_accumulating());

        let Some(FeedResult::Complete(req)) = asm.feed(0x03, 1) else {
            panic!("expected complete request");
        };
        assert_eq!(req.command(), 0x03);
        assert!(req.args().is_empty());
        assert_eq!(req.declared_length(), 1);
        assert!(!asm.is_accumulating());
        assert_eq!(asm.deadline_ms(), None);
    }

    #[test]
    fn test_request_with_args() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        let result = feed_all(&mut asm, &[0x03, 0x01, 0x00, 0x01], 10);
        let Some(FeedResult::Complete(req)) = result else {
            panic!("expected complete request");
        };
        assert_eq!(req.command(), 0x01);
        assert_eq!(req.args(), &[0x00, 0x01]);
    }

    #[test]
    fn test_zero_length() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        assert_eq!(asm.feed(0x00, 0), Some(FeedResult::ZeroLength));
        assert!(!asm.is_accumulating());

        // Still waiting for a length afterwards
        assert_eq!(asm.feed(0x01, 1), None);
        assert!(matches!(asm.feed(0x02, 2), Some(FeedResult::Complete(_))));
    }

    #[test]
    fn test_deadline_restarts_on_each_byte() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        asm.feed(0x03, 100);
        assert_eq!(asm.deadline_ms(), Some(2100));
        asm.feed(0x02, 1500);
        assert_eq!(asm.deadline_ms(), Some(3500));
        assert!(!asm.poll(3499));
        assert!(asm.poll(3500));
        assert_eq!(asm.deadline_ms(), None);
    }

    #[test]
    fn test_late_byte_starts_new_request() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        asm.feed(0x02, 0);
        asm.feed(0x02, 10);

        // Arrives after the deadline: read as a new length prefix
        assert_eq!(asm.feed(0x01, 5000), None);
        let Some(FeedResult::Complete(req)) = asm.feed(0x04, 5001) else {
            panic!("expected complete request");
        };
        assert_eq!(req.command(), 0x04);
    }

    #[test]
    fn test_max_length_request() {
        let mut asm = RequestAssembler::new(TIMEOUT);
        asm.feed(0xFF, 0);
        for i in 0..254u8 {
            assert_eq!(asm.feed(i, 0), None);
        }
        let Some(FeedResult::Complete(req)) = asm.feed(0xAA, 0) else {
            panic!("expected complete request");
        };
        assert_eq!(req.args().len(), 254);
        assert_eq!(req.declared_length(), 255);
    }

    #[test]
    fn test_response_encode_ack() {
        let mut buffer = [0u8; 4];
        let len = Response::ack().encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0x01, STATUS_ACK]);

        let len = Response::nak().encode(&mut buffer).unwrap();
        assert_eq!(&buffer[..len], &[0x01, STATUS_NAK]);
    }

    #[test]
    fn test_response_encode_payload() {
        let resp = Response::ack_with(&[0xAA, 0xBB, 0xCC]).unwrap();
        let encoded = resp.encode_to_vec().unwrap();
        assert_eq!(encoded.as_slice(), &[0x04, STATUS_ACK, 0xAA, 0xBB, 0xCC]);
    }

    #[test]
    fn test_response_buffer_too_small() {
        let resp = Response::ack_with(&[1, 2, 3]).unwrap();
        let mut buffer = [0u8; 4];
        assert_eq!(resp.encode(&mut buffer), Err(FrameError::BufferTooSmall));
    }

    #[test]
    fn test_response_payload_limit() {
        assert!(Response::ack_with(&[0u8; MAX_RESPONSE_PAYLOAD]).is_ok());
        assert_eq!(
            Response::ack_with(&[0u8; MAX_RESPONSE_PAYLOAD + 1]),
            Err(FrameError::PayloadTooLarge)
        );

        let full = Response::ack_with(&[0u8; MAX_RESPONSE_PAYLOAD]).unwrap();
        assert_eq!(full.length_byte(), 0xFF);
    }

    #[test]
    fn test_request_from_body() {
        assert_eq!(Request::from_body(&[]), None);
        let req = Request::from_body(&[0x02, 0x10]).unwrap();
        assert_eq!(req.command(), 0x02);
        assert_eq!(req.args(), &[0x10]);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn request_completes_after_declared_length(
                body in proptest::collection::vec(any::<u8>(), 1..=MAX_REQUEST_BODY),
            ) {
                let mut asm = RequestAssembler::new(TIMEOUT);
                prop_assert_eq!(asm.feed(body.len() as u8, 0), None);

                let (last, head) = body.split_last().unwrap();
                for &b in head {
                    prop_assert_eq!(asm.feed(b, 0), None);
                }
                let result = asm.feed(*last, 0);
                let expected = Request::from_body(&body).unwrap();
                prop_assert_eq!(result, Some(FeedResult::Complete(expected)));
                prop_assert!(!asm.is_accumulating());
            }

            #[test]
            fn arbitrary_input_never_leaves_stale_deadline(
                bytes in proptest::collection::vec(any::<u8>(), 0..600),
            ) {
                let mut asm = RequestAssembler::new(TIMEOUT);
                for (i, &b) in bytes.iter().enumerate() {
                    asm.feed(b, i as u64);
                    prop_assert_eq!(asm.is_accumulating(), asm.deadline_ms().is_some());
                }
            }
        }
    }
}
