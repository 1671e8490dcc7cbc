//! Typed decoders for inquiry completions.
//!
//! Each parser takes the body of a socket-0 completion frame (everything
//! between the QQ byte and the terminator). Block layouts follow the
//! PTZOptics "VISCA over IP" rev 1.0 tables; the Sony EVI series answers
//! with the same shapes.

use crate::{nibble, Error, Result};
use num_traits::FromPrimitive;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Error codes a camera reports in an error reply.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum ErrorCode {
    Syntax = 0x02,
    BufferFull = 0x03,
    Cancelled = 0x04,
    InvalidSocket = 0x05,
    NotExecutable = 0x41,
}

impl ErrorCode {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let &code = data.first().ok_or(Error::TruncatedReply {
            expected: 1,
            got: 0,
        })?;
        Self::from_u8(code).ok_or(Error::UnknownErrorCode(code))
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Syntax => "syntax error",
            Self::BufferFull => "command buffer full",
            Self::Cancelled => "command cancelled",
            Self::InvalidSocket => "no command in that socket",
            Self::NotExecutable => "command not executable",
        };
        f.write_str(s)
    }
}

fn expect_len(data: &[u8], expected: usize) -> Result<()> {
    if data.len() < expected {
        return Err(Error::TruncatedReply {
            expected,
            got: data.len(),
        });
    }
    Ok(())
}

/// Decodes a one-byte on/off completion (`0x02` = on, `0x03` = off).
pub fn parse_on_off(data: &[u8]) -> Result<bool> {
    expect_len(data, 1)?;
    match data[0] {
        0x02 => Ok(true),
        0x03 => Ok(false),
        _ => Err(Error::ParameterOutOfRange),
    }
}

/// Decodes a nibble-packed unsigned position reply (2 or 4 data bytes).
pub fn parse_position(data: &[u8]) -> Result<u16> {
    nibble::decode_u16(data)
}

/// Decodes a single-byte level reply.
pub fn parse_level(data: &[u8]) -> Result<u8> {
    expect_len(data, 1)?;
    Ok(data[0])
}

/// Decodes a picture-effect completion.
pub fn parse_effect(data: &[u8]) -> Result<crate::cmd::PictureEffect> {
    expect_len(data, 1)?;
    crate::cmd::PictureEffect::from_u8(data[0]).ok_or(Error::ParameterOutOfRange)
}

/// Pan/tilt position, two signed words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanTiltPosition {
    pub pan: i16,
    pub tilt: i16,
}

impl PanTiltPosition {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 8)?;
        Ok(Self {
            pan: nibble::decode_i16(&data[0..4])?,
            tilt: nibble::decode_i16(&data[4..8])?,
        })
    }
}

/// Highest pan and tilt speeds the device accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanTiltMaxSpeed {
    pub pan: u8,
    pub tilt: u8,
}

impl PanTiltMaxSpeed {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 2)?;
        Ok(Self {
            pan: data[0],
            tilt: data[1],
        })
    }
}

// Pan/tilt status word bit layout. The word arrives as 4 nibble bytes.
const STATUS_MAX_RIGHT: u16 = 0x0001;
const STATUS_MAX_LEFT: u16 = 0x0002;
const STATUS_MAX_UP: u16 = 0x0004;
const STATUS_MAX_DOWN: u16 = 0x0008;
const STATUS_MOVE_MASK: u16 = 0x0c00;
const STATUS_MOVE_MOVING: u16 = 0x0400;
const STATUS_MOVE_DONE: u16 = 0x0800;
const STATUS_MOVE_FAIL: u16 = 0x0c00;
const STATUS_INIT_MASK: u16 = 0x3000;
const STATUS_INITIALIZING: u16 = 0x1000;
const STATUS_READY: u16 = 0x2000;
const STATUS_FAIL: u16 = 0x3000;

/// Decoded pan/tilt status word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PanTiltStatus {
    pub initializing: bool,
    pub ready: bool,
    pub fail: bool,
    pub moving: bool,
    pub move_done: bool,
    pub move_fail: bool,
    pub at_max_left: bool,
    pub at_max_right: bool,
    pub at_max_up: bool,
    pub at_max_down: bool,
}

impl PanTiltStatus {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 4)?;
        let w = nibble::decode_u16(&data[0..4])?;
        Ok(Self {
            initializing: w & STATUS_INIT_MASK == STATUS_INITIALIZING,
            ready: w & STATUS_INIT_MASK == STATUS_READY,
            fail: w & STATUS_INIT_MASK == STATUS_FAIL,
            moving: w & STATUS_MOVE_MASK == STATUS_MOVE_MOVING,
            move_done: w & STATUS_MOVE_MASK == STATUS_MOVE_DONE,
            move_fail: w & STATUS_MOVE_MASK == STATUS_MOVE_FAIL,
            at_max_left: w & STATUS_MAX_LEFT != 0,
            at_max_right: w & STATUS_MAX_RIGHT != 0,
            at_max_up: w & STATUS_MAX_UP != 0,
            at_max_down: w & STATUS_MAX_DOWN != 0,
        })
    }
}

/// Autofocus operating mode, from the lens block.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum AutofocusMode {
    #[default]
    Normal = 0,
    Interval = 1,
    ZoomTrigger = 2,
}

/// Lens block inquiry reply, 13 data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LensBlock {
    pub zoom: u16,
    /// Full near-limit position; the wire carries only its high byte.
    pub focus_near_limit: u16,
    pub focus: u16,
    pub af_mode: AutofocusMode,
    pub af_sensitivity_low: bool,
    pub digital_zoom: bool,
    pub autofocus: bool,
    pub low_contrast: bool,
    pub loading_preset: bool,
    pub focusing: bool,
    pub zooming: bool,
}

impl LensBlock {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 13)?;
        let mode = (data[11] >> 3) & 0x03;
        Ok(Self {
            zoom: nibble::decode_u16(&data[0..4])?,
            focus_near_limit: nibble::decode_u16(&data[4..6])? << 8,
            focus: nibble::decode_u16(&data[6..10])?,
            af_mode: AutofocusMode::from_u8(mode).unwrap_or_default(),
            af_sensitivity_low: data[11] & 0x04 != 0,
            digital_zoom: data[11] & 0x02 != 0,
            autofocus: data[11] & 0x01 != 0,
            low_contrast: data[12] & 0x08 != 0,
            loading_preset: data[12] & 0x04 != 0,
            focusing: data[12] & 0x02 != 0,
            zooming: data[12] & 0x01 != 0,
        })
    }
}

/// Image block inquiry reply, 13 data bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ImageBlock {
    pub r_gain: u16,
    pub b_gain: u16,
    pub wb_mode: u8,
    pub aperture_gain: u8,
    pub exposure_mode: u8,
    pub exposure_comp: bool,
    pub backlight: bool,
    pub flags: u8,
    pub shutter: u8,
    pub iris: u8,
    pub gain: u8,
    pub brightness: u8,
    pub exposure_comp_level: u8,
}

impl ImageBlock {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 13)?;
        Ok(Self {
            r_gain: nibble::decode_u16(&data[0..2])?,
            b_gain: nibble::decode_u16(&data[2..4])?,
            wb_mode: data[4],
            aperture_gain: data[5],
            exposure_mode: data[6],
            exposure_comp: data[7] & 0x08 != 0,
            backlight: data[7] & 0x04 != 0,
            flags: data[7],
            shutter: data[8],
            iris: data[9],
            gain: data[10],
            brightness: data[11],
            exposure_comp_level: data[12],
        })
    }
}

/// Raw video-format code.
///
/// The value table is camera-specific; callers map it per vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct VideoFormatCode(pub u8);

impl VideoFormatCode {
    pub fn parse(data: &[u8]) -> Result<Self> {
        expect_len(data, 1)?;
        Ok(Self(data[data.len() - 1]))
    }
}

impl std::fmt::Display for VideoFormatCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn error_codes() -> Result<()> {
        assert_eq!(ErrorCode::BufferFull, ErrorCode::parse(&[0x03])?);
        assert_eq!(ErrorCode::NotExecutable, ErrorCode::parse(&[0x41])?);
        assert!(matches!(
            ErrorCode::parse(&[0x77]),
            Err(Error::UnknownErrorCode(0x77))
        ));
        Ok(())
    }

    #[test]
    fn on_off() -> Result<()> {
        assert!(parse_on_off(&[0x02])?);
        assert!(!parse_on_off(&[0x03])?);
        assert!(parse_on_off(&[]).is_err());
        Ok(())
    }

    #[test]
    fn pan_tilt_position() -> Result<()> {
        let data = hex::decode("0f0f090c00000c08")?;
        let p = PanTiltPosition::parse(&data)?;
        assert_eq!(-100, p.pan);
        assert_eq!(200, p.tilt);
        Ok(())
    }

    #[test]
    fn pan_tilt_status() -> Result<()> {
        // ready, movement done, at left limit
        let data = hex::decode("02080002")?;
        let s = PanTiltStatus::parse(&data)?;
        assert!(s.ready);
        assert!(!s.initializing);
        assert!(!s.fail);
        assert!(s.move_done);
        assert!(!s.moving);
        assert!(s.at_max_left);
        assert!(!s.at_max_right);
        Ok(())
    }

    #[test]
    fn lens_block() -> Result<()> {
        // zoom 0x1234, near limit 0x1000, focus 0x2345, interval AF,
        // digital zoom on, AF on, camera currently zooming
        let data = hex::decode("01020304010002030405000b01")?;
        let b = LensBlock::parse(&data)?;
        assert_eq!(0x1234, b.zoom);
        assert_eq!(0x1000, b.focus_near_limit);
        assert_eq!(0x2345, b.focus);
        assert_eq!(AutofocusMode::Interval, b.af_mode);
        assert!(b.digital_zoom);
        assert!(b.autofocus);
        assert!(!b.af_sensitivity_low);
        assert!(b.zooming);
        assert!(!b.focusing);
        Ok(())
    }

    #[test]
    fn image_block() -> Result<()> {
        // R gain 0xA1, B gain 0x52, outdoor WB, exposure comp on
        let data = hex::decode("0a010502020500081011010705")?;
        let b = ImageBlock::parse(&data)?;
        assert_eq!(0xa1, b.r_gain);
        assert_eq!(0x52, b.b_gain);
        assert_eq!(0x02, b.wb_mode);
        assert!(b.exposure_comp);
        assert!(!b.backlight);
        assert_eq!(0x10, b.shutter);
        assert_eq!(0x11, b.iris);
        assert_eq!(0x05, b.exposure_comp_level);
        Ok(())
    }

    #[test]
    fn truncated() {
        assert!(matches!(
            LensBlock::parse(&[0; 5]),
            Err(Error::TruncatedReply {
                expected: 13,
                got: 5
            })
        ));
    }
}
