//! Per-camera state machine.
//!
//! A VISCA device executes commands out of two on-device sockets (1 and 2)
//! assigned in its ACK replies, and answers inquiries through the
//! reserved socket 0. [`Camera`] mirrors those buffers, queues the
//! overflow, correlates replies back to their commands and reclaims
//! anything the device never answered.
//!
//! The struct performs no I/O: every transition returns the frames the
//! controller must write, so the whole machine is driven (and tested)
//! synchronously.

use crate::{
    error::Error,
    protocol::{reply::ErrorCode, Message, MessageKind},
};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};

/// How long an unanswered command may linger on the wire or in a socket
/// before it is reclaimed.
pub(crate) const STALE_AFTER: Duration = Duration::from_secs(1);

/// Sockets 1 and 2 hold commands; socket 0 holds the pending inquiry.
const SOCKET_COUNT: usize = 3;

/// Where a pending command's replies go.
pub(crate) enum ReplySink {
    /// An awaited API call: optional ACK notification, then exactly one
    /// terminal completion or error.
    Awaited {
        ack: Option<oneshot::Sender<u8>>,
        done: Option<oneshot::Sender<Result<Vec<u8>, Error>>>,
    },
    /// Raw passthrough: every reply frame is forwarded to the UDP client
    /// that issued the command.
    Passthrough {
        tx: mpsc::UnboundedSender<(SocketAddr, Message)>,
        client: SocketAddr,
    },
}

/// One command the camera has not finished with yet.
pub(crate) struct Pending {
    pub msg: Message,
    sink: ReplySink,
    admitted_at: Instant,
}

impl Pending {
    pub fn new(msg: Message, sink: ReplySink, now: Instant) -> Self {
        Self {
            msg,
            sink,
            admitted_at: now,
        }
    }

    fn ack(&mut self, socket: u8, reply: &Message) {
        match &mut self.sink {
            ReplySink::Awaited { ack, .. } => {
                if let Some(tx) = ack.take() {
                    let _ = tx.send(socket);
                }
            }
            ReplySink::Passthrough { tx, client } => {
                let _ = tx.send((*client, reply.clone()));
            }
        }
    }

    fn complete(self, reply: &Message) {
        match self.sink {
            ReplySink::Awaited { done, .. } => {
                if let Some(tx) = done {
                    let _ = tx.send(Ok(reply.body.clone()));
                }
            }
            ReplySink::Passthrough { tx, client } => {
                let _ = tx.send((client, reply.clone()));
            }
        }
    }

    /// Resolves with an error. When the error came off the wire the raw
    /// reply is forwarded to passthrough clients; synthesized errors
    /// (timeout, cancellation) have no frame to forward.
    fn fail(self, err: Error, reply: Option<&Message>) {
        match self.sink {
            ReplySink::Awaited { done, .. } => {
                if let Some(tx) = done {
                    let _ = tx.send(Err(err));
                }
            }
            ReplySink::Passthrough { tx, client } => {
                if let Some(reply) = reply {
                    let _ = tx.send((client, reply.clone()));
                }
            }
        }
    }

    /// Terminal resolution for untracked message kinds, fired as soon as
    /// the frame is written.
    fn complete_untracked(self) {
        if let ReplySink::Awaited { done, .. } = self.sink {
            if let Some(tx) = done {
                let _ = tx.send(Ok(Vec::new()));
            }
        }
    }
}

/// State machine for one camera on the chain (or one IP camera).
pub(crate) struct Camera {
    pub address: u8,
    /// The device's execution buffers: 0 = inquiry, 1..=2 = commands.
    slots: [Option<Pending>; SOCKET_COUNT],
    /// Commands written to the wire whose ACK has not arrived yet.
    /// Head-of-line is the next to be bound to a socket.
    sent_awaiting_ack: VecDeque<Pending>,
    cmd_queue: VecDeque<Pending>,
    inq_queue: VecDeque<Pending>,
}

impl Camera {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            slots: [None, None, None],
            sent_awaiting_ack: VecDeque::new(),
            cmd_queue: VecDeque::new(),
            inq_queue: VecDeque::new(),
        }
    }

    /// Commands in a socket or on the wire awaiting an ACK.
    fn in_flight(&self) -> usize {
        self.slots[1].iter().count() + self.slots[2].iter().count() + self.sent_awaiting_ack.len()
    }

    fn command_ready(&self) -> bool {
        self.in_flight() < 2
    }

    fn inquiry_ready(&self) -> bool {
        self.slots[0].is_none()
    }

    /// Admits a message. Commands and inquiries take a socket or queue up;
    /// every other kind is written straight through and never tracked.
    ///
    /// Returns the frames to write now.
    pub fn submit(&mut self, mut pending: Pending, now: Instant) -> Vec<Message> {
        pending.msg.readdress(self.address);
        pending.admitted_at = now;

        match pending.msg.kind {
            MessageKind::Inquiry => {
                if self.inquiry_ready() {
                    let msg = pending.msg.clone();
                    self.slots[0] = Some(pending);
                    vec![msg]
                } else {
                    self.inq_queue.push_back(pending);
                    Vec::new()
                }
            }
            MessageKind::Command => {
                if self.command_ready() {
                    let msg = pending.msg.clone();
                    self.sent_awaiting_ack.push_back(pending);
                    vec![msg]
                } else {
                    self.cmd_queue.push_back(pending);
                    Vec::new()
                }
            }
            _ => {
                let msg = pending.msg.clone();
                pending.complete_untracked();
                vec![msg]
            }
        }
    }

    /// Binds the head-of-line command to the socket the camera assigned.
    ///
    /// FIFO makes this the right correlation: the device assigns sockets
    /// in the order it received the commands.
    pub fn on_ack(&mut self, reply: &Message) {
        let socket = usize::from(reply.socket);
        if !(1..SOCKET_COUNT).contains(&socket) {
            warn!(
                camera = self.address,
                socket, "ACK names an unusable socket; dropping"
            );
            return;
        }

        let Some(mut pending) = self.sent_awaiting_ack.pop_front() else {
            warn!(
                camera = self.address,
                socket, "ACK with nothing awaiting one; dropping"
            );
            return;
        };

        if let Some(evicted) = self.slots[socket].take() {
            // The device reused a socket we still thought was busy; the
            // old occupant will never see a reply of its own.
            warn!(camera = self.address, socket, "socket reassigned under us");
            evicted.fail(Error::from_code(ErrorCode::InvalidSocket), None);
        }

        pending.ack(reply.socket, reply);
        self.slots[socket] = Some(pending);
    }

    /// Resolves the slot named by a completion reply. Socket 0 completions
    /// answer the pending inquiry.
    pub fn on_completion(&mut self, reply: &Message) {
        let socket = usize::from(reply.socket);
        match self.slots.get_mut(socket).and_then(Option::take) {
            Some(pending) => pending.complete(reply),
            None => warn!(
                camera = self.address,
                socket, "completion for an empty socket; dropping"
            ),
        }
    }

    /// Resolves the slot named by an error reply.
    ///
    /// Buffer-full and syntax errors arrive on socket 0 before any socket
    /// was assigned, so they resolve the head of the awaiting-ACK line.
    pub fn on_error(&mut self, reply: &Message) {
        let code = match ErrorCode::parse(&reply.body) {
            Ok(code) => code,
            Err(e) => {
                warn!(camera = self.address, "undecodable error reply: {e}");
                return;
            }
        };

        let socket = usize::from(reply.socket);
        if socket == 0 && matches!(code, ErrorCode::BufferFull | ErrorCode::Syntax) {
            match self.sent_awaiting_ack.pop_front() {
                Some(pending) => pending.fail(Error::from_code(code), Some(reply)),
                None => warn!(
                    camera = self.address,
                    %code, "error with nothing awaiting an ACK; dropping"
                ),
            }
            return;
        }

        match self.slots.get_mut(socket).and_then(Option::take) {
            Some(pending) => pending.fail(Error::from_code(code), Some(reply)),
            None => warn!(
                camera = self.address,
                socket, %code, "error reply for an empty socket; dropping"
            ),
        }
    }

    /// Reclaims anything the device has sat on for longer than
    /// [`STALE_AFTER`], resolving it with a timeout.
    pub fn gc_stale(&mut self, now: Instant) {
        loop {
            let stale = self
                .sent_awaiting_ack
                .front()
                .is_some_and(|p| now.duration_since(p.admitted_at) > STALE_AFTER);
            if !stale {
                break;
            }
            if let Some(pending) = self.sent_awaiting_ack.pop_front() {
                debug!(camera = self.address, "reclaiming command stuck awaiting ACK");
                pending.fail(Error::Timeout, None);
            }
        }

        for (socket, slot) in self.slots.iter_mut().enumerate() {
            if slot
                .as_ref()
                .is_some_and(|p| now.duration_since(p.admitted_at) > STALE_AFTER)
            {
                if let Some(pending) = slot.take() {
                    debug!(camera = self.address, socket, "reclaiming stuck socket");
                    pending.fail(Error::Timeout, None);
                }
            }
        }
    }

    /// Moves queued work into freed sockets. Returns the frames to write.
    pub fn pump(&mut self, now: Instant) -> Vec<Message> {
        let mut out = Vec::new();

        if self.inquiry_ready() {
            if let Some(mut pending) = self.inq_queue.pop_front() {
                pending.admitted_at = now;
                out.push(pending.msg.clone());
                self.slots[0] = Some(pending);
            }
        }

        while self.command_ready() {
            let Some(mut pending) = self.cmd_queue.pop_front() else {
                break;
            };
            pending.admitted_at = now;
            out.push(pending.msg.clone());
            self.sent_awaiting_ack.push_back(pending);
        }

        out
    }

    /// One scheduler tick: GC, then pump.
    pub fn tick(&mut self, now: Instant) -> Vec<Message> {
        self.gc_stale(now);
        self.pump(now)
    }

    /// Drops every tracked command, resolving each with `make_err`.
    /// Used for IF-CLEAR, transport loss and shutdown.
    pub fn clear(&mut self, make_err: impl Fn() -> Error) {
        for pending in self
            .slots
            .iter_mut()
            .filter_map(Option::take)
            .chain(self.sent_awaiting_ack.drain(..))
            .chain(self.cmd_queue.drain(..))
            .chain(self.inq_queue.drain(..))
        {
            pending.fail(make_err(), None);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::protocol::cmd;
    use crate::Result;
    use tokio::sync::oneshot::error::TryRecvError;

    fn awaited(
        msg: Message,
        now: Instant,
    ) -> (
        Pending,
        oneshot::Receiver<u8>,
        oneshot::Receiver<Result<Vec<u8>>>,
    ) {
        let (ack_tx, ack_rx) = oneshot::channel();
        let (done_tx, done_rx) = oneshot::channel();
        let pending = Pending::new(
            msg,
            ReplySink::Awaited {
                ack: Some(ack_tx),
                done: Some(done_tx),
            },
            now,
        );
        (pending, ack_rx, done_rx)
    }

    fn ack_reply(source: u8, socket: u8) -> Message {
        Message {
            source,
            recipient: 0,
            broadcast: false,
            kind: MessageKind::Ack,
            socket,
            body: Vec::new(),
        }
    }

    fn completion_reply(source: u8, socket: u8, body: &[u8]) -> Message {
        Message {
            source,
            recipient: 0,
            broadcast: false,
            kind: MessageKind::Completion,
            socket,
            body: body.to_vec(),
        }
    }

    fn error_reply(source: u8, socket: u8, code: u8) -> Message {
        Message {
            source,
            recipient: 0,
            broadcast: false,
            kind: MessageKind::Error,
            socket,
            body: vec![code],
        }
    }

    #[test]
    fn command_lifecycle() -> Result<()> {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (pending, mut ack_rx, mut done_rx) = awaited(cmd::zoom_direct(1, 0x1234), now);
        let frames = cam.submit(pending, now);
        assert_eq!(1, frames.len());
        assert_eq!(hex::decode("8101044701020304ff")?, frames[0].to_bytes()?);

        cam.on_ack(&ack_reply(1, 1));
        assert!(matches!(ack_rx.try_recv(), Ok(1)));
        assert!(matches!(done_rx.try_recv(), Err(TryRecvError::Empty)));

        cam.on_completion(&completion_reply(1, 1, &[]));
        assert!(matches!(done_rx.try_recv(), Ok(Ok(data)) if data.is_empty()));
        assert_eq!(0, cam.in_flight());
        Ok(())
    }

    #[test]
    fn inquiry_lifecycle() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (pending, _ack, mut done_rx) = awaited(cmd::power_inq(1), now);
        assert_eq!(1, cam.submit(pending, now).len());

        // a second inquiry queues behind the busy socket 0
        let (second, _ack2, mut done2_rx) = awaited(cmd::zoom_position_inq(1), now);
        assert!(cam.submit(second, now).is_empty());

        cam.on_completion(&completion_reply(1, 0, &[0x02]));
        assert!(matches!(done_rx.try_recv(), Ok(Ok(data)) if data == [0x02]));

        // the pump promotes the queued inquiry
        let frames = cam.pump(now);
        assert_eq!(1, frames.len());
        cam.on_completion(&completion_reply(1, 0, &[0x01, 0x02, 0x03, 0x04]));
        assert!(matches!(done2_rx.try_recv(), Ok(Ok(data)) if data.len() == 4));
    }

    #[test]
    fn acks_bind_in_submission_order() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (first, mut ack1, _d1) = awaited(cmd::zoom_direct(1, 1), now);
        let (second, mut ack2, _d2) = awaited(cmd::zoom_direct(1, 2), now);
        let (third, mut ack3, _d3) = awaited(cmd::zoom_direct(1, 3), now);

        assert_eq!(1, cam.submit(first, now).len());
        assert_eq!(1, cam.submit(second, now).len());
        // both sockets are spoken for; the third queues
        assert!(cam.submit(third, now).is_empty());
        assert_eq!(2, cam.in_flight());

        cam.on_ack(&ack_reply(1, 1));
        cam.on_ack(&ack_reply(1, 2));
        assert!(matches!(ack1.try_recv(), Ok(1)));
        assert!(matches!(ack2.try_recv(), Ok(2)));

        // completing socket 1 frees room; the pump writes the third
        cam.on_completion(&completion_reply(1, 1, &[]));
        let frames = cam.pump(now);
        assert_eq!(1, frames.len());
        cam.on_ack(&ack_reply(1, 1));
        assert!(matches!(ack3.try_recv(), Ok(1)));
    }

    #[test]
    fn slot_bound_holds() {
        let now = Instant::now();
        let mut cam = Camera::new(1);
        let mut wrote = 0;
        for i in 0..5 {
            let (p, _a, _d) = awaited(cmd::zoom_direct(1, i), now);
            wrote += cam.submit(p, now).len();
        }
        assert_eq!(2, wrote);
        assert_eq!(2, cam.in_flight());
    }

    #[test]
    fn buffer_full_resolves_head_of_line() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (first, _a1, mut d1) = awaited(cmd::zoom_direct(1, 1), now);
        let (second, _a2, mut d2) = awaited(cmd::zoom_direct(1, 2), now);
        cam.submit(first, now);
        cam.submit(second, now);

        // `90 60 03 FF`: buffer full, no socket assigned
        cam.on_error(&error_reply(1, 0, 0x03));
        assert!(matches!(
            d1.try_recv(),
            Ok(Err(Error::Camera(ErrorCode::BufferFull)))
        ));
        assert!(matches!(d2.try_recv(), Err(TryRecvError::Empty)));
        assert_eq!(1, cam.in_flight());
    }

    #[test]
    fn cancel_reply_resolves_slot() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (pending, _a, mut done) = awaited(cmd::zoom_direct(1, 1), now);
        cam.submit(pending, now);
        cam.on_ack(&ack_reply(1, 2));

        // cancel is written through untracked
        let (cancel, _a2, mut cancel_done) = awaited(Message::cancel(1, 2), now);
        let frames = cam.submit(cancel, now);
        assert_eq!(1, frames.len());
        assert!(matches!(cancel_done.try_recv(), Ok(Ok(_))));

        // the camera answers with an error on that socket
        cam.on_error(&error_reply(1, 2, 0x04));
        assert!(matches!(done.try_recv(), Ok(Err(Error::Cancelled))));
    }

    #[test]
    fn stale_commands_time_out() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (first, _a1, mut d1) = awaited(cmd::zoom_direct(1, 1), now);
        let (second, _a2, mut d2) = awaited(cmd::zoom_direct(1, 2), now);
        cam.submit(first, now);
        cam.submit(second, now);
        cam.on_ack(&ack_reply(1, 1));

        // nothing is stale yet
        cam.gc_stale(now + Duration::from_millis(900));
        assert!(matches!(d1.try_recv(), Err(TryRecvError::Empty)));

        // past the ceiling both the socket and the un-ACKed command go
        cam.gc_stale(now + Duration::from_millis(1100));
        assert!(matches!(d1.try_recv(), Ok(Err(Error::Timeout))));
        assert!(matches!(d2.try_recv(), Ok(Err(Error::Timeout))));
        assert_eq!(0, cam.in_flight());
    }

    #[test]
    fn queued_commands_restamp_on_pump() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        for i in 0..3 {
            let (p, _a, _d) = awaited(cmd::zoom_direct(1, i), now);
            cam.submit(p, now);
        }

        // the queued command waits out two GC ceilings, then pumps with a
        // fresh stamp instead of being reclaimed immediately
        let later = now + Duration::from_millis(2500);
        assert_eq!(1, cam.tick(later).len());
        cam.gc_stale(later + Duration::from_millis(900));
        assert_eq!(1, cam.in_flight());
    }

    #[test]
    fn unknown_socket_replies_are_dropped() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (pending, mut ack_rx, mut done) = awaited(cmd::zoom_direct(1, 1), now);
        cam.submit(pending, now);

        cam.on_ack(&ack_reply(1, 9));
        assert!(matches!(ack_rx.try_recv(), Err(TryRecvError::Empty)));
        cam.on_completion(&completion_reply(1, 2, &[]));
        cam.on_error(&error_reply(1, 2, 0x05));
        assert!(matches!(done.try_recv(), Err(TryRecvError::Empty)));
    }

    #[test]
    fn clear_cancels_everything_once() {
        let now = Instant::now();
        let mut cam = Camera::new(1);

        let (in_slot, _a1, mut d1) = awaited(cmd::zoom_direct(1, 1), now);
        let (awaiting, _a2, mut d2) = awaited(cmd::zoom_direct(1, 2), now);
        let (queued, _a3, mut d3) = awaited(cmd::zoom_direct(1, 3), now);
        let (inq, _a4, mut d4) = awaited(cmd::power_inq(1), now);
        cam.submit(in_slot, now);
        cam.submit(awaiting, now);
        cam.submit(queued, now);
        cam.submit(inq, now);
        cam.on_ack(&ack_reply(1, 1));

        cam.clear(|| Error::Cancelled);
        for rx in [&mut d1, &mut d2, &mut d3, &mut d4] {
            assert!(matches!(rx.try_recv(), Ok(Err(Error::Cancelled))));
        }
        assert_eq!(0, cam.in_flight());
        assert!(cam.pump(now).is_empty());
    }
}
