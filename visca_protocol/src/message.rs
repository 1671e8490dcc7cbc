use crate::{Error, Result};
use modular_bitfield::{bitfield, specifiers::B3};
use num_traits::FromPrimitive;

/// Every frame ends with this byte, and it never appears inside one.
pub const TERMINATOR: u8 = 0xff;

/// Shortest legal frame: header, QQ, terminator.
pub const MIN_FRAME_LENGTH: usize = 3;

/// Longest legal frame.
pub const MAX_FRAME_LENGTH: usize = 16;

/// Header byte of a broadcast frame (source 0, broadcast flag set).
pub const BROADCAST_HEADER: u8 = 0x88;

/// Frame header byte.
///
/// ## Format
///
/// Fields from LSB to MSB:
///
/// * `u3 0x07`: recipient address
/// * `bit 0x08`: broadcast
/// * `u3 0x70`: source address (the controller is 0)
/// * `bit 0x80`: marker, always set
#[bitfield(bits = 8)]
#[repr(u8)]
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct Header {
    pub recipient: B3,
    pub broadcast: bool,
    pub source: B3,
    pub marker: bool,
}

/// Message kind: the top nibble of the QQ byte, or the whole byte for the
/// kinds that use no socket index.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageKind {
    Command = 0x01,
    Inquiry = 0x09,
    Cancel = 0x20,
    AddressSet = 0x30,
    NetChange = 0x38,
    Ack = 0x40,
    Completion = 0x50,
    Error = 0x60,
}

/// RR byte: the class of a command or inquiry, sent as the first body byte.
#[derive(FromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Interface = 0x00,
    Camera = 0x04,
    PanTilt = 0x06,
    Operation = 0x07,
}

/// One VISCA message, decoupled from its wire form.
///
/// ## Wire format
///
/// * [`Header`] byte
/// * QQ byte: [`MessageKind`] | socket index
/// * body: RR byte (when present) and argument bytes
/// * [`TERMINATOR`]
///
/// The body holds every byte between the QQ byte and the terminator;
/// [`Message::data_type`] and [`Message::args`] split out the RR byte when
/// the body is long enough to carry one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub source: u8,
    pub recipient: u8,
    pub broadcast: bool,
    pub kind: MessageKind,
    pub socket: u8,
    pub body: Vec<u8>,
}

impl Message {
    /// Builds a command addressed to one camera.
    pub fn command(recipient: u8, data_type: DataType, args: &[u8]) -> Self {
        Self::addressed(recipient, MessageKind::Command, data_type, args)
    }

    /// Builds an inquiry addressed to one camera.
    pub fn inquiry(recipient: u8, data_type: DataType, args: &[u8]) -> Self {
        Self::addressed(recipient, MessageKind::Inquiry, data_type, args)
    }

    /// Builds an inquiry whose body does not start with a standard RR
    /// byte (the `7E 7E` block inquiries).
    pub fn inquiry_body(recipient: u8, body: &[u8]) -> Self {
        Self {
            source: 0,
            recipient: recipient & 0x07,
            broadcast: false,
            kind: MessageKind::Inquiry,
            socket: 0,
            body: body.to_vec(),
        }
    }

    fn addressed(recipient: u8, kind: MessageKind, data_type: DataType, args: &[u8]) -> Self {
        let mut body = Vec::with_capacity(args.len() + 1);
        body.push(data_type as u8);
        body.extend_from_slice(args);
        Self {
            source: 0,
            recipient: recipient & 0x07,
            broadcast: false,
            kind,
            socket: 0,
            body,
        }
    }

    /// Builds a broadcast frame (header [`BROADCAST_HEADER`]).
    pub fn broadcast(kind: MessageKind, body: &[u8]) -> Self {
        Self {
            source: 0,
            recipient: 0,
            broadcast: true,
            kind,
            socket: 0,
            body: body.to_vec(),
        }
    }

    /// Builds a cancel for one of the camera's command sockets.
    pub fn cancel(recipient: u8, socket: u8) -> Self {
        Self {
            source: 0,
            recipient: recipient & 0x07,
            broadcast: false,
            kind: MessageKind::Cancel,
            socket: socket & 0x0f,
            body: Vec::new(),
        }
    }

    /// Re-stamps the message as controller-to-camera traffic.
    pub fn readdress(&mut self, recipient: u8) {
        self.source = 0;
        self.recipient = recipient & 0x07;
        self.broadcast = false;
    }

    pub fn header(&self) -> Header {
        Header::new()
            .with_marker(true)
            .with_source(self.source & 0x07)
            .with_broadcast(self.broadcast)
            .with_recipient(if self.broadcast {
                0
            } else {
                self.recipient & 0x07
            })
    }

    pub fn qq(&self) -> u8 {
        self.kind as u8 | (self.socket & 0x0f)
    }

    /// The RR byte, when the body is long enough to carry one.
    pub fn data_type(&self) -> Option<u8> {
        (self.body.len() >= 2).then(|| self.body[0])
    }

    /// The argument bytes after the RR byte (or the whole body when there
    /// is no RR byte).
    pub fn args(&self) -> &[u8] {
        if self.body.len() >= 2 {
            &self.body[1..]
        } else {
            &self.body
        }
    }

    /// `true` for the three reply kinds a camera emits.
    pub fn is_reply(&self) -> bool {
        matches!(
            self.kind,
            MessageKind::Ack | MessageKind::Completion | MessageKind::Error
        )
    }

    /// Serializes to a wire frame.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        if self.body.len() > MAX_FRAME_LENGTH - MIN_FRAME_LENGTH {
            return Err(Error::InvalidLength);
        }
        if self.body.contains(&TERMINATOR) {
            error!("terminator byte inside frame body: {:02x?}", self.body);
            return Err(Error::EmbeddedTerminator);
        }

        let mut out = Vec::with_capacity(self.body.len() + MIN_FRAME_LENGTH);
        out.push(self.header().into());
        out.push(self.qq());
        out.extend_from_slice(&self.body);
        out.push(TERMINATOR);
        Ok(out)
    }

    /// Parses one whole frame.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if !(MIN_FRAME_LENGTH..=MAX_FRAME_LENGTH).contains(&data.len()) {
            return Err(Error::InvalidLength);
        }
        let Some((&last, inner)) = data.split_last() else {
            return Err(Error::InvalidLength);
        };
        if last != TERMINATOR {
            return Err(Error::MissingTerminator);
        }

        let header = Header::from(inner[0]);
        if !header.marker() {
            return Err(Error::InvalidHeader(inner[0]));
        }

        let qq = inner[1];
        let (kind, socket) = match MessageKind::from_u8(qq) {
            Some(
                kind @ (MessageKind::Command
                | MessageKind::Inquiry
                | MessageKind::AddressSet
                | MessageKind::NetChange),
            ) => (kind, 0),
            _ => {
                let kind =
                    MessageKind::from_u8(qq & 0xf0).ok_or(Error::UnknownMessageKind(qq))?;
                (kind, qq & 0x0f)
            }
        };

        let body = &inner[2..];
        if body.contains(&TERMINATOR) {
            return Err(Error::EmbeddedTerminator);
        }

        let broadcast = header.broadcast();
        Ok(Self {
            source: header.source(),
            // The broadcast header's recipient bits carry no meaning.
            recipient: if broadcast { 0 } else { header.recipient() },
            broadcast,
            kind,
            socket,
            body: body.to_vec(),
        })
    }
}
