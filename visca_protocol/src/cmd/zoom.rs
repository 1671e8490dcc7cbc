//! Zoom control.

use crate::{nibble, DataType, Message};

const ZOOM_STEP: u8 = 0x07;
const ZOOM_DIRECT: u8 = 0x47;
const DIGITAL_ZOOM: u8 = 0x06;

/// Highest optical zoom position.
pub const ZOOM_MAX: u16 = 0x4000;

/// Highest zoom position with digital zoom enabled.
pub const ZOOM_MAX_DIGITAL: u16 = 0x7ac0;

const ZOOM_SPEED_MAX: u8 = 7;

pub fn zoom_stop(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[ZOOM_STEP, 0x00])
}

pub fn zoom_tele(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[ZOOM_STEP, 0x02])
}

pub fn zoom_wide(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[ZOOM_STEP, 0x03])
}

/// `8x 01 04 07 2p FF`: zoom in at a speed, 0 (slow) to 7 (fast).
pub fn zoom_tele_variable(recipient: u8, speed: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[ZOOM_STEP, 0x20 | speed.min(ZOOM_SPEED_MAX)],
    )
}

/// `8x 01 04 07 3p FF`: zoom out at a speed, 0 (slow) to 7 (fast).
pub fn zoom_wide_variable(recipient: u8, speed: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[ZOOM_STEP, 0x30 | speed.min(ZOOM_SPEED_MAX)],
    )
}

/// `8x 01 04 47 0p 0q 0r 0s FF`: move to an absolute zoom position.
pub fn zoom_direct(recipient: u8, target: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(target.min(ZOOM_MAX));
    Message::command(recipient, DataType::Camera, &[ZOOM_DIRECT, p, q, r, s])
}

/// Like [`zoom_direct`], with the extended ceiling that applies while
/// digital zoom is enabled.
pub fn zoom_direct_digital(recipient: u8, target: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(target.min(ZOOM_MAX_DIGITAL));
    Message::command(recipient, DataType::Camera, &[ZOOM_DIRECT, p, q, r, s])
}

/// `8x 01 04 06 0p FF`: enable or disable digital zoom.
pub fn digital_zoom(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[DIGITAL_ZOOM, super::on_off(on)])
}

pub fn zoom_position_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[ZOOM_DIRECT])
}

pub fn digital_zoom_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[DIGITAL_ZOOM])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn direct() -> Result<()> {
        assert_eq!(
            hex::decode("8101044701020304ff")?,
            zoom_direct(1, 0x1234).to_bytes()?
        );
        // clamped to the optical ceiling
        assert_eq!(
            hex::decode("8101044704000000ff")?,
            zoom_direct(1, 0x7000).to_bytes()?
        );
        assert_eq!(
            hex::decode("8101044707000000ff")?,
            zoom_direct_digital(1, 0x7000).to_bytes()?
        );
        Ok(())
    }

    #[test]
    fn steps() -> Result<()> {
        assert_eq!(hex::decode("8101040700ff")?, zoom_stop(1).to_bytes()?);
        assert_eq!(
            hex::decode("8101040725ff")?,
            zoom_tele_variable(1, 5).to_bytes()?
        );
        assert_eq!(
            hex::decode("8101040737ff")?,
            zoom_wide_variable(1, 9).to_bytes()?
        );
        Ok(())
    }
}
