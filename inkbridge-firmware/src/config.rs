//! Compile-time station configuration
//!
//! Credentials and the frame server endpoint are injected through
//! environment variables at build time; the build script rejects a
//! build where any of them is missing or malformed. Nothing here is
//! writable at runtime, there is no on-device provisioning.

use embassy_net::Ipv4Address;
use embassy_time::Duration;

/// Network the device joins on wake
pub const WIFI_SSID: &str = env!("INKBRIDGE_WIFI_SSID");

/// WPA2 passphrase
pub const WIFI_PSK: &str = env!("INKBRIDGE_WIFI_PSK");

/// Frame server address
pub const SERVER_IP: Ipv4Address = parse_ipv4(env!("INKBRIDGE_SERVER_IP"));

/// Frame server TCP port
pub const SERVER_PORT: u16 = parse_u16(env!("INKBRIDGE_SERVER_PORT"));

/// Time between wake cycles
pub const SLEEP_INTERVAL: Duration = Duration::from_secs(4 * 60 * 60);

/// Association attempts before the cycle falls back
pub const WIFI_JOIN_ATTEMPTS: u32 = 5;

/// DHCP wait ceiling after association
pub const DHCP_TIMEOUT: Duration = Duration::from_secs(30);

/// Socket inactivity ceiling during handshake and streaming
pub const SOCKET_TIMEOUT: Duration = Duration::from_secs(20);

/// Panel SPI clock
pub const PANEL_SPI_HZ: u32 = 16_000_000;

// Const parsers so a malformed endpoint is a compile error even if the
// build script check is bypassed.

const fn parse_u16(s: &str) -> u16 {
    let bytes = s.as_bytes();
    let mut value: u32 = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        assert!(b.is_ascii_digit(), "port must be decimal digits");
        value = value * 10 + (b - b'0') as u32;
        assert!(value <= u16::MAX as u32, "port out of range");
        i += 1;
    }
    assert!(i > 0, "port must not be empty");
    value as u16
}

const fn parse_ipv4(s: &str) -> Ipv4Address {
    let bytes = s.as_bytes();
    let mut octets = [0u8; 4];
    let mut octet = 0;
    let mut value: u16 = 0;
    let mut digits = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'.' {
            assert!(digits > 0, "empty IPv4 octet");
            assert!(octet < 3, "too many IPv4 octets");
            octets[octet] = value as u8;
            octet += 1;
            value = 0;
            digits = 0;
        } else {
            assert!(b.is_ascii_digit(), "IPv4 octets must be decimal digits");
            value = value * 10 + (b - b'0') as u16;
            assert!(value <= 255, "IPv4 octet out of range");
            digits += 1;
        }
        i += 1;
    }
    assert!(octet == 3 && digits > 0, "IPv4 address must have 4 octets");
    octets[3] = value as u8;
    Ipv4Address::new(octets[0], octets[1], octets[2], octets[3])
}
