//! UDP passthrough server.
//!
//! One socket per serial-chain camera, on `base_port + address`. Whatever
//! a client sends is re-stamped as controller-to-camera traffic and
//! admitted through the normal engine, so passthrough clients share the
//! camera's sockets and FIFO with local callers. Replies go back raw to
//! whichever client owns the matching slot; replies whose client is gone
//! are dropped by the send failing.

use crate::{controller::AsyncCommand, Result};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;
use tokio::select;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use visca_protocol::{Message, TERMINATOR};

/// Binds the camera's passthrough port and spawns its forwarding task.
pub(crate) async fn spawn_camera_server(
    port: u16,
    address: u8,
    cmd_tx: mpsc::Sender<AsyncCommand>,
) -> Result<JoinHandle<()>> {
    let sock = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).await?;
    info!(address, port, "passthrough listening");
    let (reply_tx, mut reply_rx) = mpsc::unbounded_channel::<(SocketAddr, Message)>();

    Ok(tokio::task::spawn(async move {
        let mut buf = [0u8; 256];
        loop {
            select! {
                request = sock.recv_from(&mut buf) => {
                    let (len, client) = match request {
                        Ok(request) => request,
                        Err(e) => {
                            error!(address, "passthrough socket died: {e}");
                            return;
                        }
                    };
                    let Some(msg) = parse_datagram(&buf[..len]) else {
                        continue;
                    };
                    trace!(address, %client, "passthrough {msg:x?}");
                    let submitted = cmd_tx
                        .send(AsyncCommand::Passthrough {
                            address,
                            msg,
                            client,
                            reply_tx: reply_tx.clone(),
                        })
                        .await;
                    if submitted.is_err() {
                        // controller is gone
                        return;
                    }
                }

                Some((client, msg)) = reply_rx.recv() => {
                    match msg.to_bytes() {
                        Ok(bytes) => {
                            let _ = sock.send_to(&bytes, client).await;
                        }
                        Err(e) => warn!(address, "unserializable reply: {e}"),
                    }
                }
            }
        }
    }))
}

/// One datagram is one frame; a missing terminator is tolerated.
fn parse_datagram(data: &[u8]) -> Option<Message> {
    let mut frame = data.to_vec();
    if frame.last() != Some(&TERMINATOR) {
        frame.push(TERMINATOR);
    }
    match Message::from_bytes(&frame) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("dropping malformed client frame {data:02x?}: {e}");
            None
        }
    }
}
