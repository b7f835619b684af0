//! Wire constants.

/// Length of an outbound report, including the leading report ID.
pub const REQUEST_LEN: usize = 65;
/// Length of an inbound report.
pub const RESPONSE_LEN: usize = 64;
/// Bytes at the start of a response that echo the request.
pub const ECHO_LEN: usize = 2;
/// Payload bytes available in a response.
pub const PAYLOAD_LEN: usize = RESPONSE_LEN - ECHO_LEN;

pub const OP_READ: u8 = 0x03;
pub const OP_SELECT: u8 = 0x02;
pub const OP_NAME: u8 = 0xFE;

pub const NAME: [u8; 3] = [OP_NAME, 0x03, 0x00];
pub const VENDOR: u8 = 0x99;
pub const PRODUCT: u8 = 0x9A;
pub const POWERED: u8 = 0xD1;
pub const UPTIME: u8 = 0xD2;
pub const TEMP1: u8 = 0x8D;
pub const TEMP2: u8 = 0x8E;
pub const RPM: u8 = 0x90;
pub const IN_VOLTAGE: u8 = 0x88;
pub const IN_POWER: u8 = 0xEE;
pub const OUT_VOLTAGE: u8 = 0x8B;
pub const OUT_CURRENT: u8 = 0x8C;
pub const OUT_POWER: u8 = 0x96;

/// Registers whose value depends on the selected output rail.
pub const RAIL_SCOPED: [u8; 3] = [OUT_VOLTAGE, OUT_CURRENT, OUT_POWER];

pub const fn read(reg: u8) -> [u8; 3] {
    [OP_READ, reg, 0x00]
}

pub const fn output_select(sel: u8) -> [u8; 3] {
    [OP_SELECT, 0x00, sel]
}
