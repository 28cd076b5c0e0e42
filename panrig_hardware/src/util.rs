//! Pure conversions shared by the simulated and Raspberry Pi backends.

use crate::error::{HwError, Result};

/// Servo pulse width at 0°, in microseconds.
pub const MIN_PULSE_US: u32 = 500;
/// Servo pulse width at 180°, in microseconds.
pub const MAX_PULSE_US: u32 = 2500;
/// 50 Hz servo frame.
pub const PERIOD_US: u32 = 20_000;
/// Highest valid commanded angle.
pub const MAX_ANGLE: u8 = 180;
/// Full-scale count of a 12-bit converter.
pub const ADC_FULL_SCALE: u16 = 4095;

/// Map an angle (0..=180) linearly onto the servo pulse width.
pub fn angle_to_pulse_us(angle: u8) -> Result<u32> {
    if angle > MAX_ANGLE {
        return Err(HwError::AngleRange(angle));
    }
    let span = MAX_PULSE_US - MIN_PULSE_US;
    Ok(MIN_PULSE_US + (u32::from(angle) * span) / u32::from(MAX_ANGLE))
}

/// Command bytes for a single-ended MCP3208 conversion on `channel`.
pub fn mcp3208_command(channel: u8) -> Result<[u8; 3]> {
    if channel > 7 {
        return Err(HwError::AdcChannel(channel));
    }
    // start bit + single-ended flag, then D2 in byte 0; D1 D0 in the top of byte 1
    Ok([0x06 | (channel >> 2), (channel & 0x03) << 6, 0x00])
}

/// Extract the 12-bit result from the MCP3208 response frame.
#[inline]
pub fn mcp3208_decode(rx: [u8; 3]) -> u16 {
    (u16::from(rx[1] & 0x0F) << 8) | u16::from(rx[2])
}
