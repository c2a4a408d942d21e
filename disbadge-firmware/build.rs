//! Build script for disbadge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates badge.toml and bakes it into the image

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use disbadge_core::config::{BadgeConfig, ConfigError};

fn main() {
    setup_linker();
    generate_config();
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

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    // Re-run if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate badge.toml and write it out as a Rust constructor
fn generate_config() {
    println!("cargo:rerun-if-changed=badge.toml");

    let config_path = Path::new("badge.toml");

    let config = if config_path.exists() {
        let content = match fs::read_to_string(config_path) {
            Ok(content) => content,
            Err(e) => {
                panic!(
                    "\n\
                    ╔══════════════════════════════════════════════════════════════════╗\n\
                    ║  ERROR: Failed to read badge.toml                                ║\n\
                    ║                                                                  ║\n\
                    ║  Error: {:<56} ║\n\
                    ╚══════════════════════════════════════════════════════════════════╝\n",
                    e
                );
            }
        };

        match BadgeConfig::from_toml(&content) {
            Ok(config) => config,
            Err(e) => {
                panic!(
                    "\n\
                    ╔══════════════════════════════════════════════════════════════════╗\n\
                    ║  ERROR: Invalid badge.toml                                       ║\n\
                    ╠══════════════════════════════════════════════════════════════════╣\n\
                    ║  {:<64} ║\n\
                    ║  {:<64} ║\n\
                    ╚══════════════════════════════════════════════════════════════════╝\n",
                    e.to_string(),
                    hint(e)
                );
            }
        }
    } else {
        println!("cargo:warning=badge.toml not found, using default configuration");
        BadgeConfig::default()
    };

    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut f = File::create(out_dir.join("badge_config.rs")).unwrap();
    f.write_all(render_config(&config).as_bytes()).unwrap();

    println!("cargo:warning=badge.toml validated successfully");
}

/// Extra guidance for a configuration error
fn hint(error: ConfigError) -> &'static str {
    match error {
        ConfigError::Parse => "Check key names and value types against the comments in badge.toml",
        _ => "Adjust the value and rebuild",
    }
}

/// Render a config as a `const fn` body
fn render_config(config: &BadgeConfig) -> String {
    format!(
        "/// Configuration baked in from badge.toml\n\
         pub const fn badge_config() -> BadgeConfig {{\n\
         \x20   BadgeConfig {{\n\
         \x20       pin_time_s: {},\n\
         \x20       muted: {},\n\
         \x20       external_speaker: {},\n\
         \x20       max_frame_len: {},\n\
         \x20       muted_alert_ms: {},\n\
         \x20       dismiss_button: Button::{:?},\n\
         \x20       baudrate: {},\n\
         \x20   }}\n\
         }}\n",
        config.pin_time_s,
        config.muted,
        config.external_speaker,
        config.max_frame_len,
        config.muted_alert_ms,
        config.dismiss_button,
        config.baudrate,
    )
}
