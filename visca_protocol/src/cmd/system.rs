//! Chain bring-up, interface control and the block inquiries.

use crate::{DataType, Message, MessageKind};

const IF_CLEAR: u8 = 0x01;
const BLOCK: u8 = 0x7e;
const LENS_BLOCK: u8 = 0x00;
const IMAGE_BLOCK: u8 = 0x01;
const VIDEO_FORMAT_NOW: u8 = 0x23;
const VIDEO_FORMAT_NEXT: u8 = 0x33;

/// `88 30 01 FF`: start address assignment on the daisy chain.
///
/// Each camera takes the payload value as its own address, increments it
/// and passes the frame on; the reply's payload is the camera count plus
/// one.
pub fn address_set() -> Message {
    Message::broadcast(MessageKind::AddressSet, &[0x01])
}

/// `88 01 00 01 FF`: clear the command buffers of every camera on the
/// chain.
pub fn if_clear() -> Message {
    Message::broadcast(MessageKind::Command, &[DataType::Interface as u8, IF_CLEAR])
}

/// `8x 01 00 01 FF`: clear one camera's command buffers.
pub fn if_clear_unicast(recipient: u8) -> Message {
    Message::command(recipient, DataType::Interface, &[IF_CLEAR])
}

/// `8x 09 7E 7E 00 FF`: lens block inquiry
/// ([`LensBlock`][crate::reply::LensBlock]).
pub fn lens_block_inq(recipient: u8) -> Message {
    Message::inquiry_body(recipient, &[BLOCK, BLOCK, LENS_BLOCK])
}

/// `8x 09 7E 7E 01 FF`: image block inquiry
/// ([`ImageBlock`][crate::reply::ImageBlock]).
pub fn image_block_inq(recipient: u8) -> Message {
    Message::inquiry_body(recipient, &[BLOCK, BLOCK, IMAGE_BLOCK])
}

/// `8x 09 06 23 FF`: current video format
/// ([`VideoFormatCode`][crate::reply::VideoFormatCode]).
pub fn video_format_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::PanTilt, &[VIDEO_FORMAT_NOW])
}

/// `8x 09 06 33 FF`: video format pending at the next power cycle.
pub fn video_format_next_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::PanTilt, &[VIDEO_FORMAT_NEXT])
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::Result;

    #[test]
    fn bring_up_frames() -> Result<()> {
        assert_eq!(hex::decode("883001ff")?, address_set().to_bytes()?);
        assert_eq!(hex::decode("88010001ff")?, if_clear().to_bytes()?);
        assert_eq!(hex::decode("83010001ff")?, if_clear_unicast(3).to_bytes()?);
        Ok(())
    }

    #[test]
    fn block_inquiries() -> Result<()> {
        assert_eq!(hex::decode("81097e7e00ff")?, lens_block_inq(1).to_bytes()?);
        assert_eq!(hex::decode("81097e7e01ff")?, image_block_inq(1).to_bytes()?);
        Ok(())
    }

    #[test]
    fn video_format() -> Result<()> {
        assert_eq!(hex::decode("81090623ff")?, video_format_inq(1).to_bytes()?);
        assert_eq!(
            hex::decode("81090633ff")?,
            video_format_next_inq(1).to_bytes()?
        );
        Ok(())
    }
}
