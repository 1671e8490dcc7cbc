#![doc = include_str!("../README.md")]

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate tracing;

mod camera;
mod config;
mod controller;
mod error;
mod server;
mod state;
mod transport;

pub use {
    crate::{
        config::{Flavor, GatewayConfig, IpCameraConfig, SerialConfig, ServerConfig},
        controller::Controller,
        error::Error,
        state::{CameraStatus, GatewayState, StateUpdate},
    },
    visca_protocol as protocol,
};
pub type Result<T = ()> = std::result::Result<T, Error>;
