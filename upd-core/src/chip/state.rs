//! Emulated register and RAM state

use super::ram::{RamArea, CHARGEN_RAM_SIZE, DISPLAY_DATA_RAM_SIZE, PICTOGRAPH_RAM_SIZE};

/// Size of the serialized state returned by [`ChipState::to_dump`]
///
/// Area, area size, address, increment flag, then the three RAM areas.
pub const DUMP_SIZE: usize = 4 + DISPLAY_DATA_RAM_SIZE + PICTOGRAPH_RAM_SIZE + CHARGEN_RAM_SIZE;

/// uPD16432B addressing registers and RAM contents
///
/// Holds `address < selected_area.size()` whenever an area is selected,
/// and `address == 0` otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChipState {
    selected_area: RamArea,
    address: u8,
    increment_enabled: bool,
    display_data: [u8; DISPLAY_DATA_RAM_SIZE],
    pictograph: [u8; PICTOGRAPH_RAM_SIZE],
    chargen: [u8; CHARGEN_RAM_SIZE],
}

impl Default for ChipState {
    fn default() -> Self {
        Self::new()
    }
}

impl ChipState {
    /// Power-on state: no area selected, auto-increment on, RAM cleared
    pub const fn new() -> Self {
        Self {
            selected_area: RamArea::None,
            address: 0,
            increment_enabled: true,
            display_data: [0; DISPLAY_DATA_RAM_SIZE],
            pictograph: [0; PICTOGRAPH_RAM_SIZE],
            chargen: [0; CHARGEN_RAM_SIZE],
        }
    }

    /// Currently selected RAM area
    pub fn selected_area(&self) -> RamArea {
        self.selected_area
    }

    /// Address pointer inside the selected area
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Whether writes advance the address pointer
    pub fn increment_enabled(&self) -> bool {
        self.increment_enabled
    }

    pub fn display_data(&self) -> &[u8] {
        &self.display_data
    }

    pub fn pictograph(&self) -> &[u8] {
        &self.pictograph
    }

    pub fn chargen(&self) -> &[u8] {
        &self.chargen
    }

    /// Serialize in the fixed layout used by the host dump command
    pub fn to_dump(&self) -> [u8; DUMP_SIZE] {
        let mut out = [0u8; DUMP_SIZE];
        out[0] = self.selected_area.to_byte();
        out[1] = self.selected_area.size() as u8;
        out[2] = self.address;
        out[3] = self.increment_enabled as u8;

        let mut offset = 4;
        for region in [&self.display_data[..], &self.pictograph[..], &self.chargen[..]] {
            out[offset..offset + region.len()].copy_from_slice(region);
            offset += region.len();
        }
        out
    }

    pub(super) fn set_area(&mut self, area: RamArea) {
        self.selected_area = area;
    }

    pub(super) fn set_address(&mut self, address: u8) {
        self.address = address;
    }

    pub(super) fn set_increment(&mut self, enabled: bool) {
        self.increment_enabled = enabled;
    }

    /// Reset the address to 0 if it is outside the selected area
    pub(super) fn wrap_address(&mut self) {
        if self.address as usize >= self.selected_area.size() {
            self.address = 0;
        }
    }

    /// Store a byte at the current address and advance if incrementing
    ///
    /// Discarded when no area is selected.
    pub(super) fn write_data(&mut self, byte: u8) {
        let index = self.address as usize;
        let ram: &mut [u8] = match self.selected_area {
            RamArea::DisplayData => &mut self.display_data,
            RamArea::Pictograph => &mut self.pictograph,
            RamArea::CharacterGenerator => &mut self.chargen,
            RamArea::None => return,
        };
        if let Some(slot) = ram.get_mut(index) {
            *slot = byte;
        }

        if self.increment_enabled {
            self.address = self.address.wrapping_add(1);
            self.wrap_address();
        }
    }
}
