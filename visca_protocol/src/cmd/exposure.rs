//! Exposure control: mode, shutter, iris, gain, compensation, backlight.

use crate::{nibble, DataType, Message};

use super::Step;

const EXPOSURE_MODE: u8 = 0x39;
const SHUTTER_STEP: u8 = 0x0a;
const SHUTTER_DIRECT: u8 = 0x4a;
const IRIS_STEP: u8 = 0x0b;
const IRIS_DIRECT: u8 = 0x4b;
const GAIN_STEP: u8 = 0x0c;
const GAIN_DIRECT: u8 = 0x4c;
const GAIN_LIMIT: u8 = 0x2c;
const EXPOSURE_COMP_MODE: u8 = 0x3e;
const EXPOSURE_COMP_STEP: u8 = 0x0e;
const EXPOSURE_COMP_DIRECT: u8 = 0x4e;
const BACKLIGHT: u8 = 0x33;
const SLOW_SHUTTER: u8 = 0x5a;

/// Automatic exposure operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExposureMode {
    FullAuto = 0x00,
    Manual = 0x03,
    ShutterPriority = 0x0a,
    IrisPriority = 0x0b,
    Bright = 0x0d,
}

/// `8x 01 04 39 0p FF`: select the exposure mode.
pub fn exposure_mode(recipient: u8, mode: ExposureMode) -> Message {
    Message::command(recipient, DataType::Camera, &[EXPOSURE_MODE, mode as u8])
}

/// `8x 01 04 0A 0p FF`: step or reset the shutter.
pub fn shutter(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[SHUTTER_STEP, step as u8])
}

/// `8x 01 04 4A 00 00 0p 0q FF`: absolute shutter position.
pub fn shutter_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[SHUTTER_DIRECT, p, q, r, s])
}

/// `8x 01 04 5A 0p FF`: automatic slow shutter.
pub fn slow_shutter_auto(recipient: u8, auto: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[SLOW_SHUTTER, super::on_off(auto)])
}

/// `8x 01 04 0B 0p FF`: step or reset the iris.
pub fn iris(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[IRIS_STEP, step as u8])
}

/// `8x 01 04 4B 00 00 0p 0q FF`: absolute iris position.
pub fn iris_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[IRIS_DIRECT, p, q, r, s])
}

/// `8x 01 04 0C 0p FF`: step or reset the master gain.
pub fn gain(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[GAIN_STEP, step as u8])
}

/// `8x 01 04 4C 00 00 0p 0q FF`: absolute master gain.
pub fn gain_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[GAIN_DIRECT, p, q, r, s])
}

/// `8x 01 04 2C 0p FF`: gain ceiling for the auto modes, 4 to 15.
pub fn gain_limit(recipient: u8, limit: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[GAIN_LIMIT, limit.clamp(4, 15)])
}

/// `8x 01 04 3E 0p FF`: enable or disable exposure compensation.
pub fn exposure_comp(recipient: u8, on: bool) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[EXPOSURE_COMP_MODE, super::on_off(on)],
    )
}

/// `8x 01 04 0E 0p FF`: step or reset exposure compensation.
pub fn exposure_comp_step(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[EXPOSURE_COMP_STEP, step as u8])
}

/// `8x 01 04 4E 00 00 0p 0q FF`: absolute exposure compensation.
pub fn exposure_comp_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(
        recipient,
        DataType::Camera,
        &[EXPOSURE_COMP_DIRECT, p, q, r, s],
    )
}

/// `8x 01 04 33 0p FF`: backlight compensation.
pub fn backlight(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[BACKLIGHT, super::on_off(on)])
}

pub fn exposure_mode_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[EXPOSURE_MODE])
}

pub fn shutter_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[SHUTTER_DIRECT])
}

pub fn slow_shutter_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[SLOW_SHUTTER])
}

pub fn iris_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[IRIS_DIRECT])
}

pub fn gain_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[GAIN_DIRECT])
}

pub fn gain_limit_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[GAIN_LIMIT])
}

pub fn exposure_comp_mode_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[EXPOSURE_COMP_MODE])
}

pub fn exposure_comp_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[EXPOSURE_COMP_DIRECT])
}

pub fn backlight_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[BACKLIGHT])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn exposure_modes() -> Result<()> {
        assert_eq!(
            hex::decode("810104390aff")?,
            exposure_mode(1, ExposureMode::ShutterPriority).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn direct_positions() -> Result<()> {
        assert_eq!(
            hex::decode("8101044a00000105ff")?,
            shutter_direct(1, 0x15).to_bytes()?
        );
        assert_eq!(
            hex::decode("8101044b00000011ff")?,
            iris_direct(1, 0x11).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn gain_limit_clamps() -> Result<()> {
        assert_eq!(hex::decode("8101042c04ff")?, gain_limit(1, 0).to_bytes()?);
        assert_eq!(hex::decode("8101042c0fff")?, gain_limit(1, 200).to_bytes()?);
        Ok(())
    }

    #[test]
    fn steps() -> Result<()> {
        assert_eq!(hex::decode("8101040a02ff")?, shutter(1, Step::Up).to_bytes()?);
        assert_eq!(
            hex::decode("8101040e03ff")?,
            exposure_comp_step(1, Step::Down).to_bytes()?
        );
        Ok(())
    }
}
