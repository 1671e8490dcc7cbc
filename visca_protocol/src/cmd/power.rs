//! Power control.

use crate::{nibble, DataType, Message};

const POWER: u8 = 0x00;
const POWER_AUTO_OFF: u8 = 0x40;

/// `8x 01 04 00 0p FF`: power the camera on or off.
pub fn power(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[POWER, super::on_off(on)])
}

/// `8x 01 04 40 0p 0q 0r 0s FF`: auto power-off timer in minutes.
///
/// Zero disables the timer.
pub fn power_auto_off(recipient: u8, minutes: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(minutes);
    Message::command(recipient, DataType::Camera, &[POWER_AUTO_OFF, p, q, r, s])
}

pub fn power_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[POWER])
}

pub fn power_auto_off_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[POWER_AUTO_OFF])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn power_frames() -> Result<()> {
        assert_eq!(hex::decode("8101040002ff")?, power(1, true).to_bytes()?);
        assert_eq!(hex::decode("8201040003ff")?, power(2, false).to_bytes()?);
        assert_eq!(hex::decode("81090400ff")?, power_inq(1).to_bytes()?);
        Ok(())
    }

    #[test]
    fn auto_off_timer() -> Result<()> {
        assert_eq!(
            hex::decode("810104400005000aff")?,
            power_auto_off(1, 0x50a).to_bytes()?
        );
        Ok(())
    }
}
