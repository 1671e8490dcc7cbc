//! Focus and autofocus control.

use crate::{nibble, reply::AutofocusMode, DataType, Message};

const FOCUS_STEP: u8 = 0x08;
const FOCUS_DIRECT: u8 = 0x48;
const FOCUS_MODE: u8 = 0x38;
const FOCUS_TRIGGER: u8 = 0x18;
const FOCUS_NEAR_LIMIT: u8 = 0x28;
const AF_SENSITIVITY: u8 = 0x58;
const AF_MODE: u8 = 0x57;
const AF_INTERVAL: u8 = 0x27;
const IR_CORRECTION: u8 = 0x11;
const ZOOM_FOCUS_DIRECT: u8 = 0x47;

/// Highest focus position.
pub const FOCUS_MAX: u16 = 0xf000;

const FOCUS_SPEED_MAX: u8 = 7;

pub fn focus_stop(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_STEP, 0x00])
}

pub fn focus_far(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_STEP, 0x02])
}

pub fn focus_near(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_STEP, 0x03])
}

/// `8x 01 04 08 2p FF`: focus far at a speed, 0 (slow) to 7 (fast).
pub fn focus_far_variable(recipient: u8, speed: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[FOCUS_STEP, 0x20 | speed.min(FOCUS_SPEED_MAX)],
    )
}

/// `8x 01 04 08 3p FF`: focus near at a speed, 0 (slow) to 7 (fast).
pub fn focus_near_variable(recipient: u8, speed: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[FOCUS_STEP, 0x30 | speed.min(FOCUS_SPEED_MAX)],
    )
}

/// `8x 01 04 48 0p 0q 0r 0s FF`: move to an absolute focus position.
pub fn focus_direct(recipient: u8, target: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(target.min(FOCUS_MAX));
    Message::command(recipient, DataType::Camera, &[FOCUS_DIRECT, p, q, r, s])
}

/// `8x 01 04 38 0p FF`: switch between autofocus and manual focus.
pub fn focus_auto(recipient: u8, auto: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_MODE, super::on_off(auto)])
}

/// `8x 01 04 38 10 FF`: toggle the focus mode.
pub fn focus_auto_toggle(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_MODE, 0x10])
}

/// `8x 01 04 18 01 FF`: one-shot autofocus while in manual mode.
pub fn focus_trigger(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_TRIGGER, 0x01])
}

/// `8x 01 04 18 02 FF`: drive focus to infinity.
pub fn focus_infinity(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[FOCUS_TRIGGER, 0x02])
}

/// `8x 01 04 28 0p 0q 00 00 FF`: set the near focus limit.
///
/// Only the high byte of the position is significant; the low byte is
/// forced to zero.
pub fn focus_near_limit(recipient: u8, limit: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(limit & 0xff00);
    Message::command(recipient, DataType::Camera, &[FOCUS_NEAR_LIMIT, p, q, r, s])
}

/// `8x 01 04 58 0p FF`: autofocus sensitivity, normal or low.
pub fn af_sensitivity(recipient: u8, low: bool) -> Message {
    let arg = if low { 0x03 } else { 0x02 };
    Message::command(recipient, DataType::Camera, &[AF_SENSITIVITY, arg])
}

/// `8x 01 04 57 0p FF`: autofocus operating mode.
pub fn af_mode(recipient: u8, mode: AutofocusMode) -> Message {
    Message::command(recipient, DataType::Camera, &[AF_MODE, mode as u8])
}

/// `8x 01 04 27 0p 0q 0r 0s FF`: active and interval times (seconds) for
/// interval autofocus.
pub fn af_interval(recipient: u8, active: u8, interval: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[
            AF_INTERVAL,
            active >> 4,
            active & 0x0f,
            interval >> 4,
            interval & 0x0f,
        ],
    )
}

/// `8x 01 04 11 0p FF`: infrared focus correction.
pub fn ir_correction(recipient: u8, enabled: bool) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[IR_CORRECTION, u8::from(enabled)],
    )
}

/// `8x 01 04 47 0p..0s 0t..0w FF`: move zoom and focus together.
pub fn zoom_focus_direct(recipient: u8, zoom: u16, focus: u16) -> Message {
    let [zp, zq, zr, zs] = nibble::encode_u16(zoom.min(super::ZOOM_MAX));
    let [fp, fq, fr, fs] = nibble::encode_u16(focus.min(FOCUS_MAX));
    Message::command(
        recipient,
        DataType::Camera,
        &[ZOOM_FOCUS_DIRECT, zp, zq, zr, zs, fp, fq, fr, fs],
    )
}

pub fn focus_position_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[FOCUS_DIRECT])
}

pub fn focus_mode_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[FOCUS_MODE])
}

pub fn focus_near_limit_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[FOCUS_NEAR_LIMIT])
}

pub fn af_sensitivity_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[AF_SENSITIVITY])
}

pub fn af_mode_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[AF_MODE])
}

pub fn af_interval_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[AF_INTERVAL])
}

pub fn ir_correction_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[IR_CORRECTION])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn direct_clamps() -> Result<()> {
        assert_eq!(
            hex::decode("810104480e000000ff")?,
            focus_direct(1, 0xe000).to_bytes()?
        );
        assert_eq!(
            hex::decode("810104480f000000ff")?,
            focus_direct(1, 0xffff).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn near_limit_low_byte_zeroed() -> Result<()> {
        assert_eq!(
            hex::decode("8101042801020000ff")?,
            focus_near_limit(1, 0x1234).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn modes() -> Result<()> {
        assert_eq!(hex::decode("8101043802ff")?, focus_auto(1, true).to_bytes()?);
        assert_eq!(
            hex::decode("8101045701ff")?,
            af_mode(1, AutofocusMode::Interval).to_bytes()?
        );
        assert_eq!(
            hex::decode("810104270005010eff")?,
            af_interval(1, 0x05, 0x1e).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn combined_zoom_focus() -> Result<()> {
        assert_eq!(
            hex::decode("81010447010203040a0b0c00ff")?,
            zoom_focus_direct(1, 0x1234, 0xabc0).to_bytes()?
        );
        Ok(())
    }
}
