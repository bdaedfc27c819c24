//! uPD16432B command decoder
//!
//! Applies one command frame at a time to a [`ChipState`]. Decoding never
//! fails: anything the emulator does not understand leaves the state as it
//! was, so a garbled capture can never wedge the sniffer.

use super::command::ChipCommand;
use super::ram::{RamArea, CHARGEN_BYTES_PER_GLYPH, CHARGEN_GLYPHS};
use super::state::ChipState;

/// What a data-setting command does to the address pointer when it selects
/// the area that is already selected
///
/// Captured traffic does not show whether the real chip clears its address
/// on reselect, so both behaviours are available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReselectPolicy {
    /// Leave the address pointer where it is
    #[default]
    KeepAddress,
    /// Move the address pointer back to 0
    ResetAddress,
}

/// Stateful uPD16432B emulator
#[derive(Debug, Clone)]
pub struct ChipEmulator {
    state: ChipState,
    policy: ReselectPolicy,
}

impl Default for ChipEmulator {
    fn default() -> Self {
        Self::new(ReselectPolicy::default())
    }
}

impl ChipEmulator {
    /// Create an emulator in the power-on state
    pub const fn new(policy: ReselectPolicy) -> Self {
        Self {
            state: ChipState::new(),
            policy,
        }
    }

    /// Current emulated state
    pub fn state(&self) -> &ChipState {
        &self.state
    }

    /// Return to the power-on state
    pub fn reset(&mut self) {
        self.state = ChipState::new();
    }

    /// Process the SPI bytes of one strobe period
    ///
    /// The first byte is the command, the rest are RAM data. Returns the
    /// decoded command, or `None` for an empty frame.
    pub fn process(&mut self, words: &[u8]) -> Option<ChipCommand> {
        let (&first, payload) = words.split_first()?;
        let command = ChipCommand::decode(first);

        match command {
            ChipCommand::DataSetting { area, increment } => {
                self.apply_data_setting(area, increment);
            }
            ChipCommand::AddressSetting { address } => {
                self.apply_address_setting(address);
            }
            ChipCommand::Unsupported(_) => return Some(command),
        }

        for &byte in payload {
            self.state.write_data(byte);
        }

        Some(command)
    }

    fn apply_data_setting(&mut self, area: RamArea, increment: bool) {
        let reselected = area == self.state.selected_area();
        self.state.set_area(area);

        if area.supports_increment_control() {
            self.state.set_increment(increment);
            if reselected && self.policy == ReselectPolicy::ResetAddress {
                self.state.set_address(0);
            }
        } else {
            // Character generator writes always increment and start at glyph 0
            self.state.set_increment(true);
            self.state.set_address(0);
        }

        // A previously valid address may be out of range for a smaller area
        self.state.wrap_address();
    }

    fn apply_address_setting(&mut self, address: u8) {
        match self.state.selected_area() {
            RamArea::DisplayData | RamArea::Pictograph => {
                self.state.set_address(address);
                self.state.wrap_address();
            }
            RamArea::CharacterGenerator => {
                // Address is a glyph number, 7 bytes per glyph
                let offset = if address < CHARGEN_GLYPHS {
                    address * CHARGEN_BYTES_PER_GLYPH
                } else {
                    0
                };
                self.state.set_address(offset);
            }
            RamArea::None => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn emulator() -> ChipEmulator {
        ChipEmulator::new(ReselectPolicy::KeepAddress)
    }

    #[test]
    fn test_empty_frame_is_noop() {
        let mut emu = emulator();
        assert_eq!(emu.process(&[]), None);
        assert_eq!(emu.state(), &ChipState::new());
    }

    #[test]
    fn test_display_data_write_increments() {
        let mut emu = emulator();
        emu.process(&[0x40, 0x11, 0x22, 0x33]);

        let state = emu.state();
        assert_eq!(state.selected_area(), RamArea::DisplayData);
        assert_eq!(&state.display_data()[..4], &[0x11, 0x22, 0x33, 0x00]);
        assert_eq!(state.address(), 3);
        assert!(state.increment_enabled());
    }

    #[test]
    fn test_increment_off_overwrites_one_address() {
        let mut emu = emulator();
        emu.process(&[0x40]);
        emu.process(&[0x85]);
        emu.process(&[0x48, 0x01, 0x02, 0x03]);

        let state = emu.state();
        assert!(!state.increment_enabled());
        assert_eq!(state.address(), 5);
        assert_eq!(state.display_data()[5], 0x03);
        assert_eq!(state.display_data()[6], 0x00);
    }

    #[test]
    fn test_chargen_glyph_addressing() {
        let mut emu = emulator();
        emu.process(&[0x42]);
        emu.process(&[0x80 | 3]);
        assert_eq!(emu.state().address(), 21);

        emu.process(&[0x80 | 3, 1, 2, 3, 4, 5, 6, 7]);
        let chargen = emu.state().chargen();
        assert_eq!(&chargen[21..28], &[1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(chargen[20], 0);
        assert_eq!(chargen[28], 0);
        assert_eq!(emu.state().address(), 28);
    }

    #[test]
    fn test_chargen_wraps_at_end() {
        let mut emu = emulator();
        emu.process(&[0x42]);
        // Glyph 15 is the last one: offsets 105..112
        emu.process(&[0x80 | 15, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(emu.state().address(), 0);
        assert_eq!(emu.state().chargen()[111], 7);

        // The next byte lands at offset 0
        emu.process(&[0x80 | 15, 1, 2, 3, 4, 5, 6, 7, 0xEE]);
        assert_eq!(emu.state().chargen()[0], 0xEE);
        assert_eq!(emu.state().address(), 1);
    }

    #[test]
    fn test_chargen_glyph_index_out_of_range() {
        let mut emu = emulator();
        emu.process(&[0x42]);
        emu.process(&[0x80 | 5]);
        assert_eq!(emu.state().address(), 35);

        for index in 16..32u8 {
            emu.process(&[0x80 | 5]);
            emu.process(&[0x80 | index]);
            assert_eq!(emu.state().address(), 0);
        }
    }

    #[test]
    fn test_chargen_forces_increment_and_address() {
        let mut emu = emulator();
        emu.process(&[0x40]);
        emu.process(&[0x8A]);
        // Bit 3 set would disable increment for display data
        emu.process(&[0x4A]);
        assert_eq!(emu.state().selected_area(), RamArea::CharacterGenerator);
        assert!(emu.state().increment_enabled());
        assert_eq!(emu.state().address(), 0);
    }

    #[test]
    fn test_address_setting_wraps_out_of_range() {
        let mut emu = emulator();
        emu.process(&[0x41]); // pictograph, 8 bytes
        emu.process(&[0x80 | 7]);
        assert_eq!(emu.state().address(), 7);
        emu.process(&[0x80 | 8]);
        assert_eq!(emu.state().address(), 0);

        emu.process(&[0x40]); // display data, 25 bytes
        emu.process(&[0x80 | 24]);
        assert_eq!(emu.state().address(), 24);
        emu.process(&[0x80 | 25]);
        assert_eq!(emu.state().address(), 0);
    }

    #[test]
    fn test_area_change_wraps_address() {
        let mut emu = emulator();
        emu.process(&[0x40]);
        emu.process(&[0x80 | 20]);
        // Switching to the 8-byte pictograph RAM invalidates address 20
        emu.process(&[0x41]);
        assert_eq!(emu.state().selected_area(), RamArea::Pictograph);
        assert_eq!(emu.state().address(), 0);
    }

    #[test]
    fn test_area_change_keeps_valid_address() {
        let mut emu = emulator();
        emu.process(&[0x40]);
        emu.process(&[0x80 | 4]);
        emu.process(&[0x41]);
        assert_eq!(emu.state().address(), 4);
    }

    #[test]
    fn test_no_area_discards_data() {
        let mut emu = emulator();
        emu.process(&[0x40, 0x99]);
        emu.process(&[0x47, 1, 2, 3]);

        let state = emu.state();
        assert_eq!(state.selected_area(), RamArea::None);
        assert_eq!(state.address(), 0);
        assert!(state.increment_enabled());
        assert_eq!(state.display_data()[0], 0x99);
        assert_eq!(state.display_data()[1], 0x00);
    }

    #[test]
    fn test_address_setting_without_area() {
        let mut emu = emulator();
        emu.process(&[0x85, 0x12]);
        assert_eq!(emu.state(), &ChipState::new());
    }

    #[test]
    fn test_unsupported_command_ignores_payload() {
        let mut emu = emulator();
        emu.process(&[0x40]);
        let before = emu.state().clone();

        assert_eq!(emu.process(&[0xC0, 1, 2]), Some(ChipCommand::Unsupported(0xC0)));
        assert_eq!(emu.process(&[0x04, 1, 2]), Some(ChipCommand::Unsupported(0x04)));
        assert_eq!(emu.state(), &before);
    }

    #[test]
    fn test_reselect_keeps_address_by_default() {
        let mut emu = emulator();
        emu.process(&[0x40, 1, 2, 3]);
        emu.process(&[0x40, 4]);
        assert_eq!(&emu.state().display_data()[..4], &[1, 2, 3, 4]);
        assert_eq!(emu.state().address(), 4);
    }

    #[test]
    fn test_reselect_resets_address_when_configured() {
        let mut emu = ChipEmulator::new(ReselectPolicy::ResetAddress);
        emu.process(&[0x40, 1, 2, 3]);
        emu.process(&[0x40, 4]);
        assert_eq!(&emu.state().display_data()[..4], &[4, 2, 3, 0]);
        assert_eq!(emu.state().address(), 1);

        // Selecting a different area keeps the address
        emu.process(&[0x80 | 2]);
        emu.process(&[0x41]);
        assert_eq!(emu.state().address(), 2);
    }

    #[test]
    fn test_reset() {
        let mut emu = emulator();
        emu.process(&[0x42, 9, 9, 9]);
        emu.reset();
        assert_eq!(emu.state(), &ChipState::new());
    }

    proptest! {
        #[test]
        fn prop_address_stays_in_range(frames in proptest::collection::vec(
            proptest::collection::vec(any::<u8>(), 0..40), 0..20)
        ) {
            for policy in [ReselectPolicy::KeepAddress, ReselectPolicy::ResetAddress] {
                let mut emu = ChipEmulator::new(policy);
                for frame in &frames {
                    emu.process(frame);
                    let state = emu.state();
                    match state.selected_area() {
                        RamArea::None => prop_assert_eq!(state.address(), 0),
                        area => prop_assert!((state.address() as usize) < area.size()),
                    }
                }
            }
        }

        #[test]
        fn prop_unsupported_groups_leave_state(
            setup in proptest::collection::vec(any::<u8>(), 0..10),
            cmd in any::<u8>(),
            payload in proptest::collection::vec(any::<u8>(), 0..8),
        ) {
            prop_assume!(cmd & 0xC0 == 0x00 || cmd & 0xC0 == 0xC0);
            let mut emu = emulator();
            emu.process(&setup);
            let before = emu.state().clone();

            let mut frame = heapless::Vec::<u8, 16>::new();
            frame.push(cmd).unwrap();
            frame.extend_from_slice(&payload).unwrap();
            emu.process(&frame);

            prop_assert_eq!(emu.state(), &before);
        }
    }
}
