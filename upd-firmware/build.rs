//! Build script for upd-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates sniffer.toml at compile time

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

fn main() {
    setup_linker();
    validate_config();
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate sniffer.toml at compile time
///
/// The firmware falls back to defaults when the embedded file does not
/// parse, so catching mistakes here is the only way they fail loudly.
fn validate_config() {
    println!("cargo:rerun-if-changed=sniffer.toml");

    let config_path = Path::new("sniffer.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read sniffer.toml                              ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            let error_msg = e.to_string();
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in sniffer.toml                      ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&error_msg)
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_host(&config, &mut errors);
    validate_trace(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_emulator(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid sniffer.toml                                     ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=sniffer.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: &[(&str, &[&str])] = &[
    ("host", &["baudrate", "command_timeout_ms"]),
    ("trace", &["enabled", "baudrate"]),
    ("bus", &["spi_mode"]),
    ("emulator", &["reselect"]),
];

/// Only known sections and keys are allowed; the runtime parser rejects others
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };

    for (name, value) in root {
        let Some((_, keys)) = SECTIONS.iter().find(|(s, _)| s == name) else {
            errors.push(format!("unknown section [{}]", name));
            continue;
        };
        let Some(table) = value.as_table() else {
            errors.push(format!("[{}] must be a table", name));
            continue;
        };
        for key in table.keys() {
            if !keys.contains(&key.as_str()) {
                errors.push(format!("[{}] unknown key '{}'", name, key));
            }
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<Result<i64, ()>> {
    config
        .get(section)
        .and_then(|s| s.get(key))
        .map(|v| v.as_integer().ok_or(()))
}

fn check_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    match integer(config, section, key) {
        Some(Ok(v)) if (min..=max).contains(&v) => {}
        Some(_) => errors.push(format!("[{}] {} must be an integer {}-{}", section, key, min, max)),
        None => {}
    }
}

fn validate_host(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "host", "baudrate", 1200, 1_000_000, errors);
    check_range(config, "host", "command_timeout_ms", 10, 60_000, errors);
}

fn validate_trace(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(v) = config.get("trace").and_then(|t| t.get("enabled")) {
        if !v.is_bool() {
            errors.push("[trace] enabled must be true or false".to_string());
        }
    }
    check_range(config, "trace", "baudrate", 1200, 1_000_000, errors);
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "bus", "spi_mode", 0, 3, errors);
}

fn validate_emulator(config: &toml::Value, errors: &mut Vec<String>) {
    if let Some(v) = config.get("emulator").and_then(|e| e.get("reselect")) {
        if !matches!(v.as_str(), Some("keep" | "reset")) {
            errors.push("[emulator] reselect must be 'keep' or 'reset'".to_string());
        }
    }
}
