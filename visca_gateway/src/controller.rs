use crate::{
    camera::{Camera, Pending, ReplySink},
    config::GatewayConfig,
    error::Error,
    protocol::{cmd, reply, Message, MessageKind},
    server,
    state::{CameraStatus, GatewayState, StateUpdate},
    transport::{self, LinkEvent, LinkId, LinkWriter, UdpLink},
    Result,
};
use futures::{pin_mut, StreamExt};
use std::{
    collections::{BTreeMap, HashMap},
    net::SocketAddr,
    time::{Duration, Instant},
};
use tokio::{
    select,
    sync::{broadcast, mpsc, oneshot, watch},
    task::JoinHandle,
    time::interval,
};
use tokio_stream::wrappers::IntervalStream;

/// Internal type for asynchronous message passing.
pub(crate) enum AsyncCommand {
    /// Admit one message to a camera, optionally awaiting its replies.
    Submit {
        address: u8,
        msg: Message,
        /// If set, notified with the socket index the camera assigned.
        ack: Option<oneshot::Sender<u8>>,
        /// If set, resolved with the completion payload or the error.
        responder: Option<oneshot::Sender<Result<Vec<u8>>>>,
    },

    /// Write a broadcast frame to every link.
    Broadcast {
        msg: Message,
        responder: Option<oneshot::Sender<Result>>,
    },

    /// A frame from a passthrough client; replies go back raw.
    Passthrough {
        address: u8,
        msg: Message,
        client: SocketAddr,
        reply_tx: mpsc::UnboundedSender<(SocketAddr, Message)>,
    },

    /// A finished inquire-all pass for one camera.
    StatusUpdate { address: u8, status: CameraStatus },

    /// Stop the event loop after flushing every pending command.
    Shutdown { responder: oneshot::Sender<()> },
}

/// [`Controller`] owns the transports and the camera table, and exposes
/// the outward API.
///
/// ## General design
///
/// All mutable state lives in a single event-loop task
/// ([`ControllerTask`]); this handle only holds channels, so it is cheap
/// to share. Submitting a command returns an awaitable whose resolution
/// is the command's one terminal reply. A watch channel carries the
/// [`GatewayState`] snapshot and a broadcast channel carries
/// `(address, StateUpdate)` change events.
pub struct Controller {
    cmd_tx: mpsc::Sender<AsyncCommand>,
    state_rx: watch::Receiver<GatewayState>,
    update_rx: broadcast::Receiver<(u8, StateUpdate)>,
}

impl Controller {
    /// Opens every configured transport, assigns chain addresses and
    /// spawns the event loop.
    ///
    /// A serial chain that stays silent through the enumeration window
    /// starts empty rather than failing; cameras that answer later are
    /// picked up on their first reply.
    pub async fn start(config: GatewayConfig) -> Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel(ControllerTask::COMMAND_CHANNEL_SIZE);
        let (event_tx, event_rx) = mpsc::channel(ControllerTask::EVENT_CHANNEL_SIZE);
        let (state_tx, state_rx) = watch::channel(GatewayState::default());
        let (update_tx, update_rx) = broadcast::channel(ControllerTask::UPDATE_CHANNEL_SIZE);

        let mut task = ControllerTask {
            cameras: BTreeMap::new(),
            camera_links: HashMap::new(),
            writers: Vec::new(),
            serial_link: None,
            reader_tasks: Vec::new(),
            server_tasks: Vec::new(),
            cmd_rx,
            event_rx,
            cmd_tx_weak: cmd_tx.downgrade(),
            state_tx,
            update_tx,
            enumeration_done: None,
            pending_shutdown: None,
            server_base_port: config.server.as_ref().map(|s| s.base_port),
        };

        if let Some(serial) = &config.serial {
            let framed = transport::open_serial(serial)?;
            let (sink, stream) = framed.split();
            let id = task.writers.len();
            task.writers.push(LinkWriter::Serial(sink));
            task.serial_link = Some(id);
            task.reader_tasks
                .push(transport::spawn_serial_reader(stream, id, event_tx.clone()));
        }

        for camera in &config.ip_cameras {
            let link =
                UdpLink::connect(SocketAddr::new(camera.ip, camera.port), camera.flavor).await?;
            let id = task.writers.len();
            task.reader_tasks.push(transport::spawn_udp_reader(
                link.socket(),
                camera.flavor,
                id,
                event_tx.clone(),
            ));
            task.writers.push(LinkWriter::Udp(link));
            task.cameras.insert(camera.index, Camera::new(camera.index));
            task.camera_links.insert(camera.index, id);
            info!(name = %camera.name, index = camera.index, "IP camera attached");
        }

        let enumeration = if task.serial_link.is_some() {
            let (tx, rx) = oneshot::channel();
            task.enumeration_done = Some(tx);
            Some(rx)
        } else {
            None
        };

        debug!("spawning controller task");
        tokio::task::spawn(async move { task.run().await });

        if let Some(rx) = enumeration {
            match tokio::time::timeout(ControllerTask::ENUMERATION_TIMEOUT, rx).await {
                Ok(Ok(count)) => info!(count, "serial chain ready"),
                _ => warn!("no address-set reply; starting with an empty serial chain"),
            }
        }

        Ok(Self {
            cmd_tx,
            state_rx,
            update_rx,
        })
    }

    /// Sends one message to a camera, resolving with the payload of its
    /// completion reply (empty for most commands).
    pub async fn send_to(&self, address: u8, msg: Message) -> Result<Vec<u8>> {
        let (responder, rx) = oneshot::channel();
        self.cmd_tx
            .send(AsyncCommand::Submit {
                address,
                msg,
                ack: None,
                responder: Some(responder),
            })
            .await
            .map_err(|_| Error::ChannelUnavailable)?;
        rx.await.map_err(|_| Error::ChannelUnavailable)?
    }

    /// Writes a broadcast frame to every transport.
    pub async fn send_broadcast(&self, msg: Message) -> Result {
        let (responder, rx) = oneshot::channel();
        self.cmd_tx
            .send(AsyncCommand::Broadcast {
                msg,
                responder: Some(responder),
            })
            .await
            .map_err(|_| Error::ChannelUnavailable)?;
        rx.await.map_err(|_| Error::ChannelUnavailable)?
    }

    /// Flushes every pending command with a cancellation error, then
    /// closes the transports and the passthrough sockets.
    pub async fn shutdown(&self) -> Result {
        let (responder, rx) = oneshot::channel();
        self.cmd_tx
            .send(AsyncCommand::Shutdown { responder })
            .await
            .map_err(|_| Error::ChannelUnavailable)?;
        rx.await.map_err(|_| Error::ChannelUnavailable)?;
        Ok(())
    }

    /// Current snapshot of the gateway.
    pub fn state(&self) -> GatewayState {
        self.state_rx.borrow().clone()
    }

    /// Subscribes to `(address, fields)` state-change events.
    pub fn state_updates(&self) -> broadcast::Receiver<(u8, StateUpdate)> {
        self.update_rx.resubscribe()
    }

    // Convenience layer over the protocol builders. Anything not covered
    // here goes through [`Controller::send_to`] with a hand-built
    // message.

    pub async fn power(&self, address: u8, on: bool) -> Result {
        self.send_to(address, cmd::power(address, on)).await.map(drop)
    }

    pub async fn pan_tilt(
        &self,
        address: u8,
        pan_speed: u8,
        tilt_speed: u8,
        pan: cmd::PanDirection,
        tilt: cmd::TiltDirection,
    ) -> Result {
        self.send_to(
            address,
            cmd::pan_tilt(address, pan_speed, tilt_speed, pan, tilt),
        )
        .await
        .map(drop)
    }

    pub async fn pan_tilt_direct(
        &self,
        address: u8,
        pan_speed: u8,
        tilt_speed: u8,
        pan: i32,
        tilt: i32,
        relative: bool,
    ) -> Result {
        self.send_to(
            address,
            cmd::pan_tilt_direct(address, pan_speed, tilt_speed, pan, tilt, relative),
        )
        .await
        .map(drop)
    }

    pub async fn pan_tilt_home(&self, address: u8) -> Result {
        self.send_to(address, cmd::pan_tilt_home(address))
            .await
            .map(drop)
    }

    pub async fn zoom_direct(&self, address: u8, target: u16) -> Result {
        self.send_to(address, cmd::zoom_direct(address, target))
            .await
            .map(drop)
    }

    pub async fn zoom_stop(&self, address: u8) -> Result {
        self.send_to(address, cmd::zoom_stop(address)).await.map(drop)
    }

    pub async fn focus_auto(&self, address: u8, auto: bool) -> Result {
        self.send_to(address, cmd::focus_auto(address, auto))
            .await
            .map(drop)
    }

    pub async fn preset_set(&self, address: u8, index: u8) -> Result {
        self.send_to(address, cmd::preset_set(address, index))
            .await
            .map(drop)
    }

    pub async fn preset_recall(&self, address: u8, index: u8) -> Result {
        self.send_to(address, cmd::preset_recall(address, index))
            .await
            .map(drop)
    }

    /// Cancels whatever occupies one of the camera's command sockets.
    /// The cancelled command itself resolves with [`Error::Cancelled`]
    /// when the camera acknowledges.
    pub async fn cancel(&self, address: u8, socket: u8) -> Result {
        self.send_to(address, Message::cancel(address, socket))
            .await
            .map(drop)
    }

    pub async fn power_state(&self, address: u8) -> Result<bool> {
        let data = self.send_to(address, cmd::power_inq(address)).await?;
        Ok(reply::parse_on_off(&data)?)
    }

    pub async fn pan_tilt_position(&self, address: u8) -> Result<reply::PanTiltPosition> {
        let data = self
            .send_to(address, cmd::pan_tilt_position_inq(address))
            .await?;
        Ok(reply::PanTiltPosition::parse(&data)?)
    }

    pub async fn pan_tilt_status(&self, address: u8) -> Result<reply::PanTiltStatus> {
        let data = self
            .send_to(address, cmd::pan_tilt_status_inq(address))
            .await?;
        Ok(reply::PanTiltStatus::parse(&data)?)
    }

    pub async fn zoom_position(&self, address: u8) -> Result<u16> {
        let data = self
            .send_to(address, cmd::zoom_position_inq(address))
            .await?;
        Ok(reply::parse_position(&data)?)
    }

    pub async fn lens_block(&self, address: u8) -> Result<reply::LensBlock> {
        let data = self.send_to(address, cmd::lens_block_inq(address)).await?;
        Ok(reply::LensBlock::parse(&data)?)
    }

    pub async fn image_block(&self, address: u8) -> Result<reply::ImageBlock> {
        let data = self.send_to(address, cmd::image_block_inq(address)).await?;
        Ok(reply::ImageBlock::parse(&data)?)
    }

    pub async fn video_format(&self, address: u8) -> Result<reply::VideoFormatCode> {
        let data = self.send_to(address, cmd::video_format_inq(address)).await?;
        Ok(reply::VideoFormatCode::parse(&data)?)
    }
}

/// Owns every camera and link. Runs its own event loop
/// ([`ControllerTask::run()`]).
struct ControllerTask {
    cameras: BTreeMap<u8, Camera>,
    /// Which link each camera talks through. Serial-chain cameras share
    /// the serial link; each IP camera has its own.
    camera_links: HashMap<u8, LinkId>,
    writers: Vec<LinkWriter>,
    serial_link: Option<LinkId>,
    reader_tasks: Vec<JoinHandle<()>>,
    server_tasks: Vec<JoinHandle<()>>,
    cmd_rx: mpsc::Receiver<AsyncCommand>,
    event_rx: mpsc::Receiver<LinkEvent>,
    cmd_tx_weak: mpsc::WeakSender<AsyncCommand>,
    state_tx: watch::Sender<GatewayState>,
    update_tx: broadcast::Sender<(u8, StateUpdate)>,
    /// Fired once the first address-set enumeration lands.
    enumeration_done: Option<oneshot::Sender<usize>>,
    pending_shutdown: Option<oneshot::Sender<()>>,
    server_base_port: Option<u16>,
}

impl ControllerTask {
    /// Scheduler cadence: queued work is pumped and stale commands are
    /// reclaimed on this interval.
    const PUMP_INTERVAL: Duration = Duration::from_millis(20);

    /// How long the chain gets to answer the address-set broadcast.
    const ENUMERATION_TIMEOUT: Duration = Duration::from_secs(1);

    /// The protocol addresses at most seven chained cameras.
    const MAX_CHAIN_CAMERAS: usize = 7;

    const COMMAND_CHANNEL_SIZE: usize = 16;
    const EVENT_CHANNEL_SIZE: usize = 64;
    const UPDATE_CHANNEL_SIZE: usize = 64;

    /// The main event loop. Three event sources:
    ///
    /// * `cmd_rx`: the outward API and the passthrough server,
    /// * `event_rx`: frames and close notices from every link,
    /// * the pump interval: per-camera GC and queue promotion.
    async fn run(mut self) {
        self.publish_running(true);
        self.publish_camera_table();
        let seeded: Vec<u8> = self.cameras.keys().copied().collect();
        for address in seeded {
            self.spawn_status_refresh(address);
        }

        if self.serial_link.is_some() {
            self.begin_enumeration().await;
        }

        let pump = IntervalStream::new(interval(Self::PUMP_INTERVAL));
        pin_mut!(pump);

        loop {
            select! {
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(cmd) => {
                        if self.handle_command(cmd).await {
                            break;
                        }
                    }
                    // every handle is gone; nothing can reach us again
                    None => break,
                },

                Some(event) = self.event_rx.recv() => match event {
                    LinkEvent::Frame(link, msg) => self.handle_frame(link, msg).await,
                    LinkEvent::Closed(link, err) => self.handle_link_closed(link, err).await,
                },

                Some(_) = pump.next() => self.tick().await,
            }
        }

        self.teardown();
    }

    /// Returns `true` when the loop should stop.
    async fn handle_command(&mut self, cmd: AsyncCommand) -> bool {
        match cmd {
            AsyncCommand::Submit {
                address,
                msg,
                ack,
                responder,
            } => {
                let Some(camera) = self.cameras.get_mut(&address) else {
                    if let Some(tx) = responder {
                        let _ = tx.send(Err(Error::UnknownCamera(address)));
                    }
                    return false;
                };
                let now = Instant::now();
                let pending = Pending::new(msg, ReplySink::Awaited { ack, done: responder }, now);
                let frames = camera.submit(pending, now);
                self.write_frames(address, frames).await;
            }

            AsyncCommand::Broadcast { msg, responder } => {
                self.write_broadcast(&msg).await;
                if let Some(tx) = responder {
                    let _ = tx.send(Ok(()));
                }
            }

            AsyncCommand::Passthrough {
                address,
                msg,
                client,
                reply_tx,
            } => {
                let Some(camera) = self.cameras.get_mut(&address) else {
                    warn!(address, %client, "passthrough frame for unknown camera; dropping");
                    return false;
                };
                let now = Instant::now();
                let pending = Pending::new(
                    msg,
                    ReplySink::Passthrough {
                        tx: reply_tx,
                        client,
                    },
                    now,
                );
                let frames = camera.submit(pending, now);
                self.write_frames(address, frames).await;
            }

            AsyncCommand::StatusUpdate { address, status } => {
                self.apply_status(address, status);
            }

            AsyncCommand::Shutdown { responder } => {
                self.pending_shutdown = Some(responder);
                return true;
            }
        }
        false
    }

    /// Routes one inbound frame by its kind. The serial chain routes by
    /// source address; an IP camera routes by the link it owns.
    async fn handle_frame(&mut self, link: LinkId, msg: Message) {
        trace!(link, "<<< {msg:x?}");
        match msg.kind {
            // A command frame coming back up the chain is the echo of our
            // interface-clear broadcast.
            MessageKind::Command => {
                debug!("interface clear echoed; cancelling everything pending");
                self.clear_all_cameras(|| Error::Cancelled);
            }

            MessageKind::NetChange => {
                info!("camera topology changed; re-running address assignment");
                self.begin_enumeration().await;
            }

            MessageKind::AddressSet => self.finish_enumeration(&msg).await,

            MessageKind::Ack => self.route_reply(link, msg, Camera::on_ack).await,
            MessageKind::Completion => self.route_reply(link, msg, Camera::on_completion).await,
            MessageKind::Error => self.route_reply(link, msg, Camera::on_error).await,

            MessageKind::Inquiry | MessageKind::Cancel => {
                warn!(link, kind = ?msg.kind, "unexpected inbound message; dropping");
            }
        }
    }

    /// Hands a reply to the owning camera, then pumps whatever the
    /// transition freed up.
    async fn route_reply(
        &mut self,
        link: LinkId,
        msg: Message,
        dispatch: impl FnOnce(&mut Camera, &Message),
    ) {
        let address = if Some(link) == self.serial_link {
            msg.source
        } else {
            let owner = self
                .camera_links
                .iter()
                .find(|(_, l)| **l == link)
                .map(|(a, _)| *a);
            match owner {
                Some(address) => address,
                None => {
                    warn!(link, "reply on an unmapped link; dropping");
                    return;
                }
            }
        };

        if !self.cameras.contains_key(&address) {
            // Tolerate hot-plug: a camera we never enumerated answered on
            // the chain.
            if Some(link) != self.serial_link || address == 0 {
                warn!(link, address, "reply with no camera record; dropping");
                return;
            }
            info!(address, "reply from an unknown camera; creating a record");
            self.cameras.insert(address, Camera::new(address));
            self.camera_links.insert(address, link);
            self.publish_camera_table();
            self.spawn_status_refresh(address);
        }

        let Some(camera) = self.cameras.get_mut(&address) else {
            return;
        };
        dispatch(camera, &msg);
        let frames = camera.pump(Instant::now());
        self.write_frames(address, frames).await;
    }

    /// Broadcasts address-set down the chain. The reply comes back as an
    /// [`MessageKind::AddressSet`] frame and lands in
    /// [`Self::finish_enumeration`].
    async fn begin_enumeration(&mut self) {
        let Some(link) = self.serial_link else {
            return;
        };
        debug!("broadcasting address set");
        self.write_to_link(link, vec![cmd::address_set()]).await;
    }

    /// Handles the enumeration reply: the first payload byte is the
    /// camera count plus one. Rebuilds the serial camera table, clears
    /// the fresh chain and kicks the inquire-all suite.
    async fn finish_enumeration(&mut self, msg: &Message) {
        let Some(&next_address) = msg.body.first() else {
            warn!("address-set reply with no payload; ignoring");
            return;
        };
        let Some(link) = self.serial_link else {
            return;
        };
        let count = usize::from(next_address.saturating_sub(1)).min(Self::MAX_CHAIN_CAMERAS);
        info!(count, "serial chain enumerated");

        let old: Vec<u8> = self
            .camera_links
            .iter()
            .filter(|(_, l)| **l == link)
            .map(|(a, _)| *a)
            .collect();
        for address in old {
            if let Some(mut camera) = self.cameras.remove(&address) {
                camera.clear(|| Error::Cancelled);
            }
            self.camera_links.remove(&address);
        }

        for address in 1..=count as u8 {
            self.cameras.insert(address, Camera::new(address));
            self.camera_links.insert(address, link);
        }
        self.publish_camera_table();

        self.write_to_link(link, vec![cmd::if_clear()]).await;
        for address in 1..=count as u8 {
            self.spawn_status_refresh(address);
        }

        if let Some(tx) = self.enumeration_done.take() {
            let _ = tx.send(count);
        }

        self.restart_passthrough(count as u8).await;
    }

    /// (Re)binds one passthrough socket per serial camera.
    async fn restart_passthrough(&mut self, count: u8) {
        let Some(base_port) = self.server_base_port else {
            return;
        };
        for task in self.server_tasks.drain(..) {
            task.abort();
        }
        let Some(cmd_tx) = self.cmd_tx_weak.upgrade() else {
            return;
        };
        for address in 1..=count {
            let port = base_port + u16::from(address);
            match server::spawn_camera_server(port, address, cmd_tx.clone()).await {
                Ok(handle) => self.server_tasks.push(handle),
                Err(e) => error!(address, port, "passthrough bind failed: {e}"),
            }
        }
    }

    /// A link died: every camera on it resolves its in-flight work with
    /// the transport error, exactly once. Losing the serial chain takes
    /// the gateway back to "not started".
    async fn handle_link_closed(&mut self, link: LinkId, err: Error) {
        error!(link, "link closed: {err}");

        let addresses: Vec<u8> = self
            .camera_links
            .iter()
            .filter(|(_, l)| **l == link)
            .map(|(a, _)| *a)
            .collect();
        for address in addresses {
            if let Some(camera) = self.cameras.get_mut(&address) {
                camera.clear(|| Error::Transport);
            }
            self.cameras.remove(&address);
            self.camera_links.remove(&address);
        }

        if Some(link) == self.serial_link {
            self.serial_link = None;
            for task in self.server_tasks.drain(..) {
                task.abort();
            }
            self.publish_running(false);
        }
        self.publish_camera_table();
    }

    /// One scheduler tick: GC and pump every camera.
    async fn tick(&mut self) {
        let now = Instant::now();
        let mut writes = Vec::new();
        for (address, camera) in self.cameras.iter_mut() {
            let frames = camera.tick(now);
            if !frames.is_empty() {
                writes.push((*address, frames));
            }
        }
        for (address, frames) in writes {
            self.write_frames(address, frames).await;
        }
    }

    async fn write_frames(&mut self, address: u8, frames: Vec<Message>) {
        if frames.is_empty() {
            return;
        }
        let Some(&link) = self.camera_links.get(&address) else {
            error!(address, "camera has no link; dropping writes");
            return;
        };
        self.write_to_link(link, frames).await;
    }

    async fn write_to_link(&mut self, link: LinkId, frames: Vec<Message>) {
        for frame in frames {
            trace!(link, ">>> {frame:x?}");
            let result = match self.writers.get_mut(link) {
                Some(writer) => writer.send(frame).await,
                None => return,
            };
            if let Err(e) = result {
                self.handle_link_closed(link, e).await;
                return;
            }
        }
    }

    async fn write_broadcast(&mut self, msg: &Message) {
        for link in 0..self.writers.len() {
            self.write_to_link(link, vec![msg.clone()]).await;
        }
    }

    fn clear_all_cameras(&mut self, make_err: fn() -> Error) {
        for camera in self.cameras.values_mut() {
            camera.clear(make_err);
        }
    }

    fn spawn_status_refresh(&self, address: u8) {
        let Some(cmd_tx) = self.cmd_tx_weak.upgrade() else {
            return;
        };
        tokio::task::spawn(refresh_status(cmd_tx, address));
    }

    fn apply_status(&mut self, address: u8, status: CameraStatus) {
        if !self.cameras.contains_key(&address) {
            return;
        }
        let mut updated = StateUpdate::empty();
        self.state_tx.send_modify(|state| {
            let entry = state.cameras.entry(address).or_default();
            updated = status.diff(entry);
            *entry = status;
        });
        if !updated.is_empty() {
            let _ = self.update_tx.send((address, updated));
        }
    }

    fn publish_camera_table(&mut self) {
        let known: Vec<u8> = self.cameras.keys().copied().collect();
        self.state_tx.send_modify(|state| {
            state.cameras.retain(|address, _| known.contains(address));
            for address in &known {
                state.cameras.entry(*address).or_default();
            }
        });
        let _ = self.update_tx.send((0, StateUpdate::CAMERA_TABLE));
    }

    fn publish_running(&mut self, running: bool) {
        let changed = self.state_tx.send_if_modified(|state| {
            if state.running != running {
                state.running = running;
                true
            } else {
                false
            }
        });
        if changed {
            let _ = self.update_tx.send((0, StateUpdate::RUNNING));
        }
    }

    /// Release order per the resource-lifecycle contract: every pending
    /// callback fires exactly once before any handle closes.
    fn teardown(&mut self) {
        self.clear_all_cameras(|| Error::Cancelled);
        for task in self.reader_tasks.drain(..) {
            task.abort();
        }
        for task in self.server_tasks.drain(..) {
            task.abort();
        }
        self.writers.clear();
        self.publish_running(false);
        if let Some(tx) = self.pending_shutdown.take() {
            let _ = tx.send(());
        }
        info!("controller stopped");
    }
}

/// The inquire-all suite: refreshes one camera's status snapshot.
///
/// Individual inquiry failures are fine (not every camera supports every
/// capability); whatever answered makes it into the snapshot.
async fn refresh_status(cmd_tx: mpsc::Sender<AsyncCommand>, address: u8) {
    let mut status = CameraStatus::default();

    if let Ok(data) = inquire(&cmd_tx, address, cmd::power_inq(address)).await {
        status.power = reply::parse_on_off(&data).unwrap_or_default();
    }
    if let Ok(data) = inquire(&cmd_tx, address, cmd::pan_tilt_position_inq(address)).await {
        if let Ok(position) = reply::PanTiltPosition::parse(&data) {
            status.position = position;
        }
    }
    if let Ok(data) = inquire(&cmd_tx, address, cmd::zoom_position_inq(address)).await {
        status.zoom = reply::parse_position(&data).unwrap_or_default();
    }
    if let Ok(data) = inquire(&cmd_tx, address, cmd::digital_zoom_inq(address)).await {
        status.digital_zoom = reply::parse_on_off(&data).unwrap_or_default();
    }
    if let Ok(data) = inquire(&cmd_tx, address, cmd::effect_inq(address)).await {
        status.effect = reply::parse_effect(&data).unwrap_or_default();
    }

    let _ = cmd_tx
        .send(AsyncCommand::StatusUpdate { address, status })
        .await;
}

async fn inquire(
    cmd_tx: &mpsc::Sender<AsyncCommand>,
    address: u8,
    msg: Message,
) -> Result<Vec<u8>> {
    let (responder, rx) = oneshot::channel();
    cmd_tx
        .send(AsyncCommand::Submit {
            address,
            msg,
            ack: None,
            responder: Some(responder),
        })
        .await
        .map_err(|_| Error::ChannelUnavailable)?;
    rx.await.map_err(|_| Error::ChannelUnavailable)?
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::{Flavor, IpCameraConfig};

    fn test_config(camera: SocketAddr) -> GatewayConfig {
        GatewayConfig {
            serial: None,
            ip_cameras: vec![IpCameraConfig {
                name: "bench".into(),
                index: 1,
                ip: camera.ip(),
                port: camera.port(),
                flavor: Flavor::Ptz,
            }],
            server: None,
        }
    }

    /// A scripted camera: ACK + COMPLETE every command, answer every
    /// inquiry with "power on".
    async fn spawn_scripted_camera() -> Result<SocketAddr> {
        let sock = tokio::net::UdpSocket::bind("127.0.0.1:0").await?;
        let addr = sock.local_addr()?;
        tokio::task::spawn(async move {
            let mut buf = [0u8; 64];
            loop {
                let Ok((len, from)) = sock.recv_from(&mut buf).await else {
                    return;
                };
                let Ok(msg) = Message::from_bytes(&buf[..len]) else {
                    continue;
                };
                match msg.kind {
                    MessageKind::Command => {
                        let _ = sock.send_to(&[0x90, 0x41, 0xff], from).await;
                        let _ = sock.send_to(&[0x90, 0x51, 0xff], from).await;
                    }
                    MessageKind::Inquiry => {
                        let _ = sock.send_to(&[0x90, 0x50, 0x02, 0xff], from).await;
                    }
                    _ => {}
                }
            }
        });
        Ok(addr)
    }

    #[tokio::test]
    async fn command_and_inquiry_round_trip() -> Result {
        let camera = spawn_scripted_camera().await?;
        let controller = Controller::start(test_config(camera)).await?;

        controller.zoom_direct(1, 0x1234).await?;
        assert!(controller.power_state(1).await?);

        let err = controller
            .send_to(5, cmd::zoom_stop(5))
            .await
            .expect_err("no camera 5");
        assert!(matches!(err, Error::UnknownCamera(5)));

        controller.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn enumeration_builds_camera_table() -> Result {
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (_event_tx, event_rx) = mpsc::channel(4);
        let (state_tx, state_rx) = watch::channel(GatewayState::default());
        let (update_tx, _update_rx) = broadcast::channel(8);
        let (enum_tx, enum_rx) = oneshot::channel();

        // no writers attached: frames written during bring-up are dropped
        let mut task = ControllerTask {
            cameras: BTreeMap::new(),
            camera_links: HashMap::new(),
            writers: Vec::new(),
            serial_link: Some(0),
            reader_tasks: Vec::new(),
            server_tasks: Vec::new(),
            cmd_rx,
            event_rx,
            cmd_tx_weak: cmd_tx.downgrade(),
            state_tx,
            update_tx,
            enumeration_done: Some(enum_tx),
            pending_shutdown: None,
            server_base_port: None,
        };

        // three cameras took addresses 1..=3; the frame reports 4 as next
        let chain_reply = Message::from_bytes(&hex::decode("883004ff")?)?;
        task.finish_enumeration(&chain_reply).await;

        assert_eq!(
            vec![1, 2, 3],
            task.cameras.keys().copied().collect::<Vec<_>>()
        );
        assert!(matches!(enum_rx.await, Ok(3)));
        assert_eq!(3, state_rx.borrow().cameras.len());
        Ok(())
    }

    #[tokio::test]
    async fn silent_camera_times_out() -> Result {
        // a camera that never answers anything
        let sock = tokio::net::UdpSocket::bind("127.0.0.1:0").await?;
        let camera = sock.local_addr()?;
        let _keep_alive = sock;

        let controller = Controller::start(test_config(camera)).await?;
        let started = Instant::now();
        let err = controller
            .send_to(1, cmd::zoom_stop(1))
            .await
            .expect_err("nothing ever replies");
        assert!(matches!(err, Error::Timeout));
        assert!(started.elapsed() >= crate::camera::STALE_AFTER);

        controller.shutdown().await?;
        Ok(())
    }

    #[tokio::test]
    async fn shutdown_cancels_pending_commands() -> Result {
        let sock = tokio::net::UdpSocket::bind("127.0.0.1:0").await?;
        let camera = sock.local_addr()?;
        let _keep_alive = sock;

        let controller = Controller::start(test_config(camera)).await?;

        let (responder, rx) = oneshot::channel();
        controller
            .cmd_tx
            .send(AsyncCommand::Submit {
                address: 1,
                msg: cmd::zoom_stop(1),
                ack: None,
                responder: Some(responder),
            })
            .await
            .map_err(|_| Error::ChannelUnavailable)?;

        controller.shutdown().await?;
        let outcome = rx.await.map_err(|_| Error::ChannelUnavailable)?;
        assert!(matches!(outcome, Err(Error::Cancelled)));
        assert!(!controller.state().running);
        Ok(())
    }
}
