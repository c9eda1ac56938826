//! Build script for inkbridge-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates the compile-time station configuration

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    setup_linker();
    validate_station_config();
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

/// Validate the station configuration injected through environment
/// variables at compile time. Catching a malformed server address here
/// beats discovering it on a display in another room.
fn validate_station_config() {
    for var in [
        "INKBRIDGE_WIFI_SSID",
        "INKBRIDGE_WIFI_PSK",
        "INKBRIDGE_SERVER_IP",
        "INKBRIDGE_SERVER_PORT",
    ] {
        println!("cargo:rerun-if-env-changed={}", var);
    }

    let missing: Vec<&str> = [
        "INKBRIDGE_WIFI_SSID",
        "INKBRIDGE_WIFI_PSK",
        "INKBRIDGE_SERVER_IP",
        "INKBRIDGE_SERVER_PORT",
    ]
    .into_iter()
    .filter(|var| env::var(var).is_err())
    .collect();

    if !missing.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Missing station configuration                            ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ║                                                                  ║\n\
            ║  Set these environment variables before building the firmware,  ║\n\
            ║  e.g.  INKBRIDGE_WIFI_SSID=home INKBRIDGE_WIFI_PSK=...          ║\n\
            ║        INKBRIDGE_SERVER_IP=192.168.1.10                         ║\n\
            ║        INKBRIDGE_SERVER_PORT=3284                               ║\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            missing
                .iter()
                .map(|v| format!("║  • {:<62} ║", v))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let ip = env::var("INKBRIDGE_SERVER_IP").unwrap();
    let octets: Vec<&str> = ip.split('.').collect();
    let ip_ok = octets.len() == 4 && octets.iter().all(|o| o.parse::<u8>().is_ok());
    if !ip_ok {
        panic!(
            "INKBRIDGE_SERVER_IP must be a dotted IPv4 address, got '{}'",
            ip
        );
    }

    let port = env::var("INKBRIDGE_SERVER_PORT").unwrap();
    if port.parse::<u16>().is_err() {
        panic!(
            "INKBRIDGE_SERVER_PORT must be a TCP port number, got '{}'",
            port
        );
    }
}
