//! Preset memory.
//!
//! The engine accepts the PTZOptics index range (0..=127) and leaves
//! narrower devices to reject out-of-range recalls themselves; Sony EVI
//! bodies only store six.

use crate::{DataType, Message};

const MEMORY: u8 = 0x3f;

/// Highest preset index the engine will encode.
pub const PRESET_MAX: u8 = 127;

/// `8x 01 04 3F 00 pp FF`: clear a stored preset.
pub fn preset_reset(recipient: u8, index: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[MEMORY, 0x00, index.min(PRESET_MAX)],
    )
}

/// `8x 01 04 3F 01 pp FF`: store the current position as a preset.
pub fn preset_set(recipient: u8, index: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[MEMORY, 0x01, index.min(PRESET_MAX)],
    )
}

/// `8x 01 04 3F 02 pp FF`: move to a stored preset.
pub fn preset_recall(recipient: u8, index: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[MEMORY, 0x02, index.min(PRESET_MAX)],
    )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn presets() -> Result<()> {
        assert_eq!(
            hex::decode("8101043f020aff")?,
            preset_recall(1, 10).to_bytes()?
        );
        assert_eq!(hex::decode("8101043f0105ff")?, preset_set(1, 5).to_bytes()?);
        assert_eq!(
            hex::decode("8101043f0000ff")?,
            preset_reset(1, 0).to_bytes()?
        );
        // clamped to the permissive ceiling
        assert_eq!(
            hex::decode("8101043f027fff")?,
            preset_recall(1, 255).to_bytes()?
        );
        Ok(())
    }
}
