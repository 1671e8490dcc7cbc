//! Pan/tilt drive, positioning and limits.

use crate::{nibble, DataType, Message};

const DRIVE: u8 = 0x01;
const ABSOLUTE: u8 = 0x02;
const RELATIVE: u8 = 0x03;
const HOME: u8 = 0x04;
const RESET: u8 = 0x05;
const LIMIT: u8 = 0x07;
const STATUS_INQ: u8 = 0x10;
const MAX_SPEED_INQ: u8 = 0x11;
const POSITION_INQ: u8 = 0x12;

/// Highest pan speed (`0x18`).
pub const PAN_SPEED_MAX: u8 = 0x18;

/// Highest tilt speed (`0x17`).
pub const TILT_SPEED_MAX: u8 = 0x17;

/// Pan drive direction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PanDirection {
    Left = 0x01,
    Right = 0x02,
    Stop = 0x03,
}

/// Tilt drive direction code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TiltDirection {
    Up = 0x01,
    Down = 0x02,
    Stop = 0x03,
}

/// Corner selector for the movement-range limit commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LimitCorner {
    DownLeft = 0x00,
    UpRight = 0x01,
}

fn speed(v: u8, max: u8) -> u8 {
    v.clamp(1, max)
}

/// `8x 01 06 01 VV WW 0p 0q FF`: start or stop a pan/tilt movement.
pub fn pan_tilt(
    recipient: u8,
    pan_speed: u8,
    tilt_speed: u8,
    pan: PanDirection,
    tilt: TiltDirection,
) -> Message {
    Message::command(
        recipient,
        DataType::PanTilt,
        &[
            DRIVE,
            speed(pan_speed, PAN_SPEED_MAX),
            speed(tilt_speed, TILT_SPEED_MAX),
            pan as u8,
            tilt as u8,
        ],
    )
}

/// `8x 01 06 0p VV WW 0y..0y 0z..0z FF`: move to a pan/tilt position,
/// absolute or relative to the current one.
pub fn pan_tilt_direct(
    recipient: u8,
    pan_speed: u8,
    tilt_speed: u8,
    pan: i32,
    tilt: i32,
    relative: bool,
) -> Message {
    let op = if relative { RELATIVE } else { ABSOLUTE };
    let [pp, pq, pr, ps] = nibble::encode_i16(pan);
    let [tp, tq, tr, ts] = nibble::encode_i16(tilt);
    Message::command(
        recipient,
        DataType::PanTilt,
        &[
            op,
            speed(pan_speed, PAN_SPEED_MAX),
            speed(tilt_speed, TILT_SPEED_MAX),
            pp,
            pq,
            pr,
            ps,
            tp,
            tq,
            tr,
            ts,
        ],
    )
}

/// `8x 01 06 04 FF`: return to the home position.
pub fn pan_tilt_home(recipient: u8) -> Message {
    Message::command(recipient, DataType::PanTilt, &[HOME])
}

/// `8x 01 06 05 FF`: re-initialise the pan/tilt drive.
pub fn pan_tilt_reset(recipient: u8) -> Message {
    Message::command(recipient, DataType::PanTilt, &[RESET])
}

/// `8x 01 06 07 00 0W ... FF`: set one corner of the movement range.
pub fn pan_tilt_limit_set(recipient: u8, corner: LimitCorner, pan: i32, tilt: i32) -> Message {
    let [pp, pq, pr, ps] = nibble::encode_i16(pan);
    let [tp, tq, tr, ts] = nibble::encode_i16(tilt);
    Message::command(
        recipient,
        DataType::PanTilt,
        &[
            LIMIT, 0x00, corner as u8, pp, pq, pr, ps, tp, tq, tr, ts,
        ],
    )
}

/// `8x 01 06 07 01 0W ... FF`: clear one corner of the movement range.
pub fn pan_tilt_limit_clear(recipient: u8, corner: LimitCorner) -> Message {
    Message::command(
        recipient,
        DataType::PanTilt,
        &[
            LIMIT, 0x01, corner as u8, 0x07, 0x0f, 0x0f, 0x0f, 0x07, 0x0f, 0x0f, 0x0f,
        ],
    )
}

pub fn pan_tilt_position_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::PanTilt, &[POSITION_INQ])
}

pub fn pan_tilt_max_speed_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::PanTilt, &[MAX_SPEED_INQ])
}

pub fn pan_tilt_status_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::PanTilt, &[STATUS_INQ])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn drive() -> Result<()> {
        assert_eq!(
            hex::decode("810106010a140103ff")?,
            pan_tilt(1, 10, 20, PanDirection::Left, TiltDirection::Stop).to_bytes()?
        );
        // speeds clamp into 1..=max
        assert_eq!(
            hex::decode("8101060118170202ff")?,
            pan_tilt(1, 200, 200, PanDirection::Right, TiltDirection::Down).to_bytes()?
        );
        assert_eq!(
            hex::decode("8101060101010303ff")?,
            pan_tilt(1, 0, 0, PanDirection::Stop, TiltDirection::Stop).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn direct_absolute() -> Result<()> {
        assert_eq!(
            hex::decode("820106020a0a0f0f090c00000c08ff")?,
            pan_tilt_direct(2, 10, 10, -100, 200, false).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn direct_relative() -> Result<()> {
        assert_eq!(
            hex::decode("810106030105000006040f0f0f0cff")?,
            pan_tilt_direct(1, 1, 5, 100, -4, true).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn limits() -> Result<()> {
        assert_eq!(
            hex::decode("810106070001000807050f0f0f0cff")?,
            pan_tilt_limit_set(1, LimitCorner::UpRight, 0x875, -4).to_bytes()?
        );
        assert_eq!(
            hex::decode("810106070100070f0f0f070f0f0fff")?,
            pan_tilt_limit_clear(1, LimitCorner::DownLeft).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn inquiries() -> Result<()> {
        assert_eq!(hex::decode("81090612ff")?, pan_tilt_position_inq(1).to_bytes()?);
        assert_eq!(hex::decode("81090610ff")?, pan_tilt_status_inq(1).to_bytes()?);
        Ok(())
    }
}
