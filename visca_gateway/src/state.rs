use crate::protocol::{
    cmd::PictureEffect,
    reply::PanTiltPosition,
};
use std::collections::BTreeMap;

bitflags! {
    /// Which parts of the gateway state an update event touched.
    #[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
    pub struct StateUpdate: u32 {
        /// Cameras were added or removed (enumeration ran).
        const CAMERA_TABLE      = 1;
        /// The gateway started or stopped.
        const RUNNING           = 1 << 1;
        const POWER             = 1 << 2;
        const PAN_TILT_POSITION = 1 << 3;
        const ZOOM_POSITION     = 1 << 4;
        const DIGITAL_ZOOM      = 1 << 5;
        const EFFECT            = 1 << 6;

        const STATUS = Self::POWER.bits()
            | Self::PAN_TILT_POSITION.bits()
            | Self::ZOOM_POSITION.bits()
            | Self::DIGITAL_ZOOM.bits()
            | Self::EFFECT.bits();
    }
}

/// Last-known snapshot of one camera, refreshed by the inquire-all suite.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CameraStatus {
    pub power: bool,
    pub position: PanTiltPosition,
    pub zoom: u16,
    pub digital_zoom: bool,
    pub effect: PictureEffect,
}

impl CameraStatus {
    /// Flags for the fields that differ from `older`.
    pub(crate) fn diff(&self, older: &Self) -> StateUpdate {
        let mut updated = StateUpdate::empty();
        if self.power != older.power {
            updated |= StateUpdate::POWER;
        }
        if self.position != older.position {
            updated |= StateUpdate::PAN_TILT_POSITION;
        }
        if self.zoom != older.zoom {
            updated |= StateUpdate::ZOOM_POSITION;
        }
        if self.digital_zoom != older.digital_zoom {
            updated |= StateUpdate::DIGITAL_ZOOM;
        }
        if self.effect != older.effect {
            updated |= StateUpdate::EFFECT;
        }
        updated
    }
}

/// [`GatewayState`] is the observable snapshot of the whole gateway.
///
/// The controller publishes it through a watch channel, and sends
/// `(address, StateUpdate)` events on every change.
#[derive(Debug, Default, Clone)]
pub struct GatewayState {
    /// `false` until the transports are open, and again after a serial
    /// failure or shutdown.
    pub running: bool,
    /// Known cameras by address.
    pub cameras: BTreeMap<u8, CameraStatus>,
}
