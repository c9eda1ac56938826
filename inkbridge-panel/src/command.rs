//! AC073TC1 command set and bring-up tables
//!
//! The bring-up sequence is an opaque, vendor-defined register table:
//! panel power parameters, driving voltages, resolution, border color,
//! temperature and VCOM settings. It is reproduced byte-for-byte from
//! the panel datasheet values and must not be re-derived; only its
//! structure is checked by tests, semantic correctness is a datasheet
//! concern.

/// Command bytes understood by the panel controller
pub mod cmd {
    /// Panel setting (PSR)
    pub const PANEL_SETTING: u8 = 0x00;
    /// Power setting (PWR)
    pub const POWER_SETTING: u8 = 0x01;
    /// Power off (POF)
    pub const POWER_OFF: u8 = 0x02;
    /// Power off sequence setting (POFS)
    pub const POWER_OFF_SEQUENCE: u8 = 0x03;
    /// Power on (PON)
    pub const POWER_ON: u8 = 0x04;
    /// Booster soft start 1 (BTST1)
    pub const BOOSTER_SOFT_START_1: u8 = 0x05;
    /// Booster soft start 2 (BTST2)
    pub const BOOSTER_SOFT_START_2: u8 = 0x06;
    /// Booster soft start 3 (BTST3)
    pub const BOOSTER_SOFT_START_3: u8 = 0x08;
    /// Data start transmission (DTM)
    pub const DATA_START: u8 = 0x10;
    /// Display refresh (DRF)
    pub const DISPLAY_REFRESH: u8 = 0x12;
    /// Internal power control (IPC)
    pub const INTERNAL_POWER: u8 = 0x13;
    /// PLL control (PLL)
    pub const PLL_CONTROL: u8 = 0x30;
    /// Temperature sensor enable (TSE)
    pub const TEMP_SENSOR: u8 = 0x41;
    /// VCOM and data interval; high nibble selects the border color
    pub const VCOM_DATA_INTERVAL: u8 = 0x50;
    /// Gate/source timing (TCON)
    pub const TCON_SETTING: u8 = 0x60;
    /// Resolution setting (TRES)
    pub const RESOLUTION: u8 = 0x61;
    /// VCOM DC setting (VDCS)
    pub const VCOM_DC: u8 = 0x82;
    /// T-VDCS setting
    pub const T_VCOM_DC: u8 = 0x84;
    /// Gate scan direction (AGID)
    pub const GATE_SCAN: u8 = 0x86;
    /// Cascade setting (CCSET)
    pub const CASCADE: u8 = 0xE0;
    /// Power saving (PWS)
    pub const POWER_SAVING: u8 = 0xE3;
    /// Temperature sensor write (TSSET)
    pub const TEMP_SET: u8 = 0xE6;
    /// Command head (CMDH), unlocks the extended register set
    pub const CMD_HEAD: u8 = 0xAA;
}

/// Vendor bring-up sequence, issued in order after the reset pulse.
pub const INIT_SEQUENCE: &[(u8, &[u8])] = &[
    (cmd::CMD_HEAD, &[0x49, 0x55, 0x20, 0x08, 0x09, 0x18]),
    (cmd::POWER_SETTING, &[0x3F, 0x00, 0x32, 0x2A, 0x0E, 0x2A]),
    (cmd::PANEL_SETTING, &[0x5F, 0x69]),
    (cmd::POWER_OFF_SEQUENCE, &[0x00, 0x54, 0x00, 0x44]),
    (cmd::BOOSTER_SOFT_START_1, &[0x40, 0x1F, 0x1F, 0x2C]),
    (cmd::BOOSTER_SOFT_START_2, &[0x6F, 0x1F, 0x1F, 0x22]),
    (cmd::BOOSTER_SOFT_START_3, &[0x6F, 0x1F, 0x1F, 0x22]),
    (cmd::INTERNAL_POWER, &[0x00, 0x04]),
    (cmd::PLL_CONTROL, &[0x3C]),
    (cmd::TEMP_SENSOR, &[0x00]),
    (cmd::VCOM_DATA_INTERVAL, &[0x3F]),
    (cmd::TCON_SETTING, &[0x02, 0x00]),
    (cmd::RESOLUTION, &[0x03, 0x20, 0x01, 0xE0]),
    (cmd::VCOM_DC, &[0x1E]),
    (cmd::T_VCOM_DC, &[0x00]),
    (cmd::GATE_SCAN, &[0x00]),
    (cmd::POWER_SAVING, &[0x2F]),
    (cmd::CASCADE, &[0x00]),
    (cmd::TEMP_SET, &[0x00]),
];
