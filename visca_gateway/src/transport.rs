//! Serial and UDP links.
//!
//! Both transports present the same narrow surface: a writer the
//! controller holds, and a reader task that forwards whole frames (tagged
//! with their [`LinkId`]) into the controller's event channel. A link
//! that dies forwards one [`LinkEvent::Closed`] and stops.

use crate::{
    config::{Flavor, SerialConfig},
    error::Error,
    Result,
};
use binrw::{BinRead, BinWrite};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::io::Cursor;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_serial::{DataBits, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tokio_util::bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, Framed};
use visca_protocol::{Envelope, Message, PayloadType, TERMINATOR};

/// Index of a link in the controller's writer table.
pub(crate) type LinkId = usize;

/// What a reader task feeds back to the controller.
pub(crate) enum LinkEvent {
    Frame(LinkId, Message),
    Closed(LinkId, Error),
}

/// Longest run of terminator-less bytes the splitter will buffer before
/// assuming the stream is garbage.
const MAX_SPLIT_BUFFER: usize = 64;

/// Streaming splitter for the serial byte stream: emits one parsed frame
/// per terminator, drops malformed ones without killing the stream.
pub(crate) struct FrameCodec;

impl Decoder for FrameCodec {
    type Item = Message;
    type Error = Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Message>> {
        while let Some(pos) = src.iter().position(|b| *b == TERMINATOR) {
            let frame = src.split_to(pos + 1);
            match Message::from_bytes(&frame) {
                Ok(msg) => return Ok(Some(msg)),
                Err(e) => {
                    warn!("dropping malformed frame {:02x?}: {e}", &frame[..]);
                }
            }
        }

        if src.len() > MAX_SPLIT_BUFFER {
            warn!(
                buffered = src.len(),
                "no terminator in sight; discarding buffered bytes"
            );
            src.clear();
        }
        Ok(None)
    }
}

impl Encoder<Message> for FrameCodec {
    type Error = Error;

    fn encode(&mut self, msg: Message, dst: &mut BytesMut) -> Result<()> {
        dst.extend_from_slice(&msg.to_bytes()?);
        Ok(())
    }
}

/// Opens the serial port at 8-N-1 and wraps it in the frame splitter.
pub(crate) fn open_serial(config: &SerialConfig) -> Result<Framed<SerialStream, FrameCodec>> {
    let stream = tokio_serial::new(&config.port, config.baud)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .open_native_async()?;
    info!(port = %config.port, baud = config.baud, "serial port open");
    Ok(Framed::new(stream, FrameCodec))
}

/// Forwards frames from the serial read half until the port dies.
pub(crate) fn spawn_serial_reader(
    mut stream: SplitStream<Framed<SerialStream, FrameCodec>>,
    id: LinkId,
    tx: mpsc::Sender<LinkEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        while let Some(result) = stream.next().await {
            match result {
                Ok(msg) => {
                    if tx.send(LinkEvent::Frame(id, msg)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(LinkEvent::Closed(id, e)).await;
                    return;
                }
            }
        }
        let _ = tx.send(LinkEvent::Closed(id, Error::Transport)).await;
    })
}

/// Write half of a link, whichever transport backs it.
pub(crate) enum LinkWriter {
    Serial(SplitSink<Framed<SerialStream, FrameCodec>, Message>),
    Udp(UdpLink),
}

impl LinkWriter {
    pub async fn send(&mut self, msg: Message) -> Result<()> {
        match self {
            Self::Serial(sink) => sink.send(msg).await,
            Self::Udp(link) => link.send(&msg).await,
        }
    }
}

/// One connected UDP socket per IP camera; a frame per datagram.
pub(crate) struct UdpLink {
    sock: Arc<UdpSocket>,
    flavor: Flavor,
    sequence: u32,
}

impl UdpLink {
    pub async fn connect(addr: SocketAddr, flavor: Flavor) -> Result<Self> {
        let bind: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let sock = UdpSocket::bind(bind).await?;
        sock.connect(addr).await?;

        let link = Self {
            sock: Arc::new(sock),
            flavor,
            sequence: 0,
        };
        if flavor == Flavor::Sony {
            link.send_envelope(&Envelope::control_reset(0)).await?;
        }
        Ok(link)
    }

    pub fn socket(&self) -> Arc<UdpSocket> {
        self.sock.clone()
    }

    async fn send_envelope(&self, env: &Envelope) -> Result<()> {
        let mut out = Cursor::new(Vec::new());
        env.write(&mut out)
            .map_err(visca_protocol::Error::from)?;
        self.sock.send(&out.into_inner()).await?;
        Ok(())
    }

    pub async fn send(&mut self, msg: &Message) -> Result<()> {
        match self.flavor {
            Flavor::Ptz => {
                self.sock.send(&msg.to_bytes()?).await?;
            }
            Flavor::Sony => {
                self.sequence = self.sequence.wrapping_add(1);
                let env = Envelope::for_message(msg, self.sequence)?;
                self.send_envelope(&env).await?;
            }
        }
        Ok(())
    }
}

/// Forwards frames from an IP camera until the socket dies.
pub(crate) fn spawn_udp_reader(
    sock: Arc<UdpSocket>,
    flavor: Flavor,
    id: LinkId,
    tx: mpsc::Sender<LinkEvent>,
) -> JoinHandle<()> {
    tokio::task::spawn(async move {
        let mut buf = [0u8; 1024];
        loop {
            let len = match sock.recv(&mut buf).await {
                Ok(len) => len,
                Err(e) => {
                    let _ = tx.send(LinkEvent::Closed(id, e.into())).await;
                    return;
                }
            };

            let datagram = &buf[..len];
            let frame = match flavor {
                Flavor::Ptz => datagram.to_vec(),
                Flavor::Sony => match Envelope::read(&mut Cursor::new(datagram)) {
                    Ok(env) if env.payload_type == PayloadType::ViscaReply => env.payload,
                    Ok(env) => {
                        trace!(?env.payload_type, "ignoring non-reply envelope");
                        continue;
                    }
                    Err(e) => {
                        warn!("dropping malformed envelope: {e}");
                        continue;
                    }
                },
            };

            match Message::from_bytes(&frame) {
                Ok(msg) => {
                    if tx.send(LinkEvent::Frame(id, msg)).await.is_err() {
                        return;
                    }
                }
                Err(e) => warn!("dropping malformed frame {frame:02x?}: {e}"),
            }
        }
    })
}
