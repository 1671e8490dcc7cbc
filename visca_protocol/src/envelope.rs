//! VISCA-over-IP datagram envelope.
//!
//! Sony network cameras wrap every frame in an 8-byte header; PTZOptics
//! devices take bare frames. The gateway applies this envelope only when a
//! camera is configured with the `sony` flavor.
//!
//! ## Packet format
//!
//! * `u16`: payload type
//! * `u16`: payload length
//! * `u32`: sequence number
//! * payload bytes

use crate::{Message, MessageKind, Result};
use binrw::binrw;

/// Payload type of a VISCA-over-IP datagram.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadType {
    #[brw(magic = 0x0100u16)]
    ViscaCommand,
    #[brw(magic = 0x0110u16)]
    ViscaInquiry,
    #[brw(magic = 0x0111u16)]
    ViscaReply,
    #[brw(magic = 0x0120u16)]
    DeviceSetting,
    #[brw(magic = 0x0200u16)]
    ControlCommand,
    #[brw(magic = 0x0201u16)]
    ControlReply,
}

/// One VISCA-over-IP datagram.
#[binrw]
#[brw(big)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub payload_type: PayloadType,

    #[br(temp)]
    #[bw(try_calc(u16::try_from(payload.len())))]
    length: u16,

    /// Sequence counter, reset with [`Envelope::control_reset`].
    pub sequence: u32,

    #[br(count = length)]
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Control-command payload requesting a sequence-counter reset.
    pub const CONTROL_RESET: u8 = 0x01;

    /// Wraps a serialized message, choosing the payload type by kind.
    pub fn for_message(msg: &Message, sequence: u32) -> Result<Self> {
        let payload_type = match msg.kind {
            MessageKind::Inquiry => PayloadType::ViscaInquiry,
            _ => PayloadType::ViscaCommand,
        };
        Ok(Self {
            payload_type,
            sequence,
            payload: msg.to_bytes()?,
        })
    }

    /// Builds the RESET control command that restarts the camera's
    /// sequence counter.
    pub fn control_reset(sequence: u32) -> Self {
        Self {
            payload_type: PayloadType::ControlCommand,
            sequence,
            payload: vec![Self::CONTROL_RESET],
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{DataType, Result};
    use binrw::{BinRead, BinWrite};
    use std::io::Cursor;

    #[test]
    fn command_round_trip() -> Result<()> {
        let msg = Message::command(1, DataType::Camera, &[0x47, 0x01, 0x02, 0x03, 0x04]);
        let expected = Envelope::for_message(&msg, 0x0a)?;

        let raw = hex::decode("010000090000000a8101044701020304ff")?;
        let env = Envelope::read(&mut Cursor::new(&raw))?;
        assert_eq!(expected, env);
        assert_eq!(msg, Message::from_bytes(&env.payload)?);

        let mut out = Cursor::new(Vec::with_capacity(raw.len()));
        expected.write(&mut out)?;
        assert_eq!(raw, out.into_inner());
        Ok(())
    }

    #[test]
    fn inquiry_payload_type() -> Result<()> {
        let msg = Message::inquiry(1, DataType::Camera, &[0x00]);
        let env = Envelope::for_message(&msg, 1)?;
        assert_eq!(PayloadType::ViscaInquiry, env.payload_type);
        Ok(())
    }

    #[test]
    fn control_reset() -> Result<()> {
        let raw = hex::decode("020000010000000101")?;
        let env = Envelope::read(&mut Cursor::new(&raw))?;
        assert_eq!(Envelope::control_reset(1), env);

        let mut out = Cursor::new(Vec::new());
        env.write(&mut out)?;
        assert_eq!(raw, out.into_inner());
        Ok(())
    }

    #[test]
    fn reply_parse() -> Result<()> {
        let raw = hex::decode("01110003000000059041ff")?;
        let env = Envelope::read(&mut Cursor::new(&raw))?;
        assert_eq!(PayloadType::ViscaReply, env.payload_type);
        assert_eq!(5, env.sequence);
        let msg = Message::from_bytes(&env.payload)?;
        assert_eq!(MessageKind::Ack, msg.kind);
        assert_eq!(1, msg.socket);
        Ok(())
    }
}
