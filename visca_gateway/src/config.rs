//! Configuration surface.
//!
//! The gateway takes a [`GatewayConfig`] assembled by the caller; loading
//! it from a file is the host application's concern.

use serde::Deserialize;
use std::net::IpAddr;

/// Default serial baud rate; production chains usually run 38400.
const DEFAULT_BAUD: u32 = 9600;

/// Top-level gateway configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    /// The serial daisy chain, if one is attached.
    pub serial: Option<SerialConfig>,

    /// Directly-attached network cameras.
    #[serde(default)]
    pub ip_cameras: Vec<IpCameraConfig>,

    /// The UDP passthrough server.
    pub server: Option<ServerConfig>,
}

/// Serial port settings (8-N-1 is implied).
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    pub port: String,
    #[serde(default = "default_baud")]
    pub baud: u32,
}

fn default_baud() -> u32 {
    DEFAULT_BAUD
}

/// One network camera.
#[derive(Debug, Clone, Deserialize)]
pub struct IpCameraConfig {
    pub name: String,
    /// Address the camera is exposed under, alongside the serial chain.
    pub index: u8,
    pub ip: IpAddr,
    pub port: u16,
    #[serde(default)]
    pub flavor: Flavor,
}

/// Which VISCA-over-IP dialect a network camera speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flavor {
    /// Bare frames in UDP datagrams (PTZOptics and most clones).
    #[default]
    Ptz,
    /// Frames wrapped in the sequence-numbered envelope
    /// ([`Envelope`][visca_protocol::Envelope]).
    Sony,
}

/// UDP passthrough settings: camera `i` listens on `base_port + i`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub base_port: u16,
}
