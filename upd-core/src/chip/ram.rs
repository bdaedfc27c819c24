//! RAM areas inside the uPD16432B

/// Display data RAM size in bytes
pub const DISPLAY_DATA_RAM_SIZE: usize = 0x19;

/// Pictograph RAM size in bytes
pub const PICTOGRAPH_RAM_SIZE: usize = 0x08;

/// Character generator RAM size in bytes (16 glyphs of 7 rows)
pub const CHARGEN_RAM_SIZE: usize = 0x70;

/// Bytes per character generator glyph
pub const CHARGEN_BYTES_PER_GLYPH: u8 = 7;

/// Number of user-definable glyphs
pub const CHARGEN_GLYPHS: u8 = 16;

// Wire format values used in the state dump
const AREA_DISPLAY_DATA: u8 = 0x00;
const AREA_PICTOGRAPH: u8 = 0x01;
const AREA_CHARGEN: u8 = 0x02;
const AREA_NONE: u8 = 0xFF;

/// RAM area targeted by data writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RamArea {
    /// Character codes, one byte per display position
    DisplayData,
    /// Segment bitmap for the fixed icons
    Pictograph,
    /// User-definable 5x7 glyphs
    CharacterGenerator,
    /// No area selected; writes are discarded
    #[default]
    None,
}

impl RamArea {
    /// Area selected by the low 3 bits of a data-setting command
    pub fn from_mode(mode: u8) -> Self {
        match mode & 0x07 {
            0 => RamArea::DisplayData,
            1 => RamArea::Pictograph,
            2 => RamArea::CharacterGenerator,
            _ => RamArea::None,
        }
    }

    /// Size of the area in bytes
    pub fn size(self) -> usize {
        match self {
            RamArea::DisplayData => DISPLAY_DATA_RAM_SIZE,
            RamArea::Pictograph => PICTOGRAPH_RAM_SIZE,
            RamArea::CharacterGenerator => CHARGEN_RAM_SIZE,
            RamArea::None => 0,
        }
    }

    /// Whether the data-setting command can switch auto-increment off
    pub fn supports_increment_control(self) -> bool {
        matches!(self, RamArea::DisplayData | RamArea::Pictograph)
    }

    /// Convert to wire format byte
    pub fn to_byte(self) -> u8 {
        match self {
            RamArea::DisplayData => AREA_DISPLAY_DATA,
            RamArea::Pictograph => AREA_PICTOGRAPH,
            RamArea::CharacterGenerator => AREA_CHARGEN,
            RamArea::None => AREA_NONE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mode() {
        assert_eq!(RamArea::from_mode(0), RamArea::DisplayData);
        assert_eq!(RamArea::from_mode(1), RamArea::Pictograph);
        assert_eq!(RamArea::from_mode(2), RamArea::CharacterGenerator);
        for mode in 3..8 {
            assert_eq!(RamArea::from_mode(mode), RamArea::None);
        }
        // Only the low 3 bits take part
        assert_eq!(RamArea::from_mode(0x49), RamArea::Pictograph);
    }

    #[test]
    fn test_sizes() {
        assert_eq!(RamArea::DisplayData.size(), 25);
        assert_eq!(RamArea::Pictograph.size(), 8);
        assert_eq!(RamArea::CharacterGenerator.size(), 112);
        assert_eq!(RamArea::None.size(), 0);
        assert_eq!(
            CHARGEN_GLYPHS as usize * CHARGEN_BYTES_PER_GLYPH as usize,
            CHARGEN_RAM_SIZE
        );
    }

    #[test]
    fn test_wire_codes() {
        assert_eq!(RamArea::DisplayData.to_byte(), 0x00);
        assert_eq!(RamArea::Pictograph.to_byte(), 0x01);
        assert_eq!(RamArea::CharacterGenerator.to_byte(), 0x02);
        assert_eq!(RamArea::None.to_byte(), 0xFF);
    }
}
