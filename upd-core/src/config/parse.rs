//! Parser for the embedded `sniffer.toml`
//!
//! Handles only the TOML subset the sniffer needs:
//! - `[section]` headers
//! - `key = value` pairs with integer, boolean or basic string values
//! - Underscore digit separators (`115_200`)
//! - Comments (`# ...`)
//!
//! Everything else is rejected with the offending line number.

use upd_hal::SpiMode;

use super::types::*;
use crate::chip::ReselectPolicy;

/// Parse error, carrying the 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Unknown or malformed section header
    InvalidSection(usize),
    /// Key not valid in the current section
    UnknownKey(usize),
    /// Value has the wrong type or is out of range
    InvalidValue(usize),
    /// Line is neither a header nor a key/value pair
    Syntax(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Host,
    Trace,
    Bus,
    Emulator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Value<'a> {
    Integer(u32),
    Boolean(bool),
    Str(&'a str),
}

/// Parse TOML text into a [`SnifferConfig`]
pub fn parse_config(input: &str) -> Result<SnifferConfig, ConfigError> {
    let mut config = SnifferConfig::default();
    let mut section = Section::Root;

    for (index, raw) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(raw).trim();

        if line.is_empty() {
            continue;
        }

        if let Some(header) = line.strip_prefix('[') {
            let name = header
                .strip_suffix(']')
                .ok_or(ConfigError::InvalidSection(line_no))?;
            section = parse_section_header(name.trim(), line_no)?;
            continue;
        }

        let (key, value) = line.split_once('=').ok_or(ConfigError::Syntax(line_no))?;
        let key = key.trim();
        let value = parse_value(value.trim()).ok_or(ConfigError::InvalidValue(line_no))?;

        apply(&mut config, section, key, value, line_no)?;
    }

    Ok(config)
}

/// Remove a trailing comment, ignoring `#` inside quotes
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

fn parse_section_header(name: &str, line_no: usize) -> Result<Section, ConfigError> {
    match name {
        "host" => Ok(Section::Host),
        "trace" => Ok(Section::Trace),
        "bus" => Ok(Section::Bus),
        "emulator" => Ok(Section::Emulator),
        _ => Err(ConfigError::InvalidSection(line_no)),
    }
}

fn parse_value(s: &str) -> Option<Value<'_>> {
    match s {
        "true" => return Some(Value::Boolean(true)),
        "false" => return Some(Value::Boolean(false)),
        _ => {}
    }

    if let Some(inner) = s.strip_prefix('"') {
        let inner = inner.strip_suffix('"')?;
        if inner.contains('"') || inner.contains('\\') {
            return None;
        }
        return Some(Value::Str(inner));
    }

    parse_integer(s).map(Value::Integer)
}

fn parse_integer(s: &str) -> Option<u32> {
    if s.is_empty() || s.starts_with('_') || s.ends_with('_') || s.contains("__") {
        return None;
    }
    let mut value: u32 = 0;
    for c in s.chars() {
        if c == '_' {
            continue;
        }
        let digit = c.to_digit(10)?;
        value = value.checked_mul(10)?.checked_add(digit)?;
    }
    Some(value)
}

fn apply(
    config: &mut SnifferConfig,
    section: Section,
    key: &str,
    value: Value<'_>,
    line_no: usize,
) -> Result<(), ConfigError> {
    let invalid = ConfigError::InvalidValue(line_no);

    match (section, key, value) {
        (Section::Host, "baudrate", Value::Integer(v)) => {
            config.host.baudrate = check_range(v, MIN_BAUDRATE, MAX_BAUDRATE).ok_or(invalid)?;
        }
        (Section::Host, "command_timeout_ms", Value::Integer(v)) => {
            config.host.command_timeout_ms =
                check_range(v, MIN_COMMAND_TIMEOUT_MS, MAX_COMMAND_TIMEOUT_MS).ok_or(invalid)?;
        }
        (Section::Trace, "enabled", Value::Boolean(v)) => {
            config.trace.enabled = v;
        }
        (Section::Trace, "baudrate", Value::Integer(v)) => {
            config.trace.baudrate = check_range(v, MIN_BAUDRATE, MAX_BAUDRATE).ok_or(invalid)?;
        }
        (Section::Bus, "spi_mode", Value::Integer(v)) => {
            let mode = u8::try_from(v).ok().and_then(SpiMode::from_number);
            config.bus.spi_mode = mode.ok_or(invalid)?;
        }
        (Section::Emulator, "reselect", Value::Str(v)) => {
            config.emulator.reselect = match v {
                "keep" => ReselectPolicy::KeepAddress,
                "reset" => ReselectPolicy::ResetAddress,
                _ => return Err(invalid),
            };
        }
        (Section::Host, "baudrate" | "command_timeout_ms", _)
        | (Section::Trace, "enabled" | "baudrate", _)
        | (Section::Bus, "spi_mode", _)
        | (Section::Emulator, "reselect", _) => return Err(invalid),
        _ => return Err(ConfigError::UnknownKey(line_no)),
    }

    Ok(())
}

fn check_range(value: u32, min: u32, max: u32) -> Option<u32> {
    (min..=max).contains(&value).then_some(value)
}
