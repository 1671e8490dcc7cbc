#![doc = include_str!("../README.md")]

#[macro_use]
extern crate num_derive;

#[macro_use]
extern crate tracing;

pub mod cmd;
mod envelope;
mod error;
mod message;
pub mod nibble;
pub mod reply;

pub use crate::{
    envelope::{Envelope, PayloadType},
    error::Error,
    message::{
        DataType, Header, Message, MessageKind, BROADCAST_HEADER, MAX_FRAME_LENGTH,
        MIN_FRAME_LENGTH, TERMINATOR,
    },
};

/// Result type.
pub type Result<T = ()> = std::result::Result<T, Error>;
