//! Image control: white balance, colour, aperture, noise, ICR.

use crate::{nibble, DataType, Message};

use super::Step;

const R_GAIN_STEP: u8 = 0x03;
const R_GAIN_DIRECT: u8 = 0x43;
const B_GAIN_STEP: u8 = 0x04;
const B_GAIN_DIRECT: u8 = 0x44;
const WB_TRIGGER: u8 = 0x10;
const WB_MODE: u8 = 0x35;
const APERTURE_STEP: u8 = 0x02;
const APERTURE_DIRECT: u8 = 0x42;
const HIGH_RES: u8 = 0x52;
const HIGH_SENSITIVITY: u8 = 0x5e;
const NOISE_REDUCTION: u8 = 0x53;
const GAMMA: u8 = 0x5b;
const CHROMA_SUPPRESS: u8 = 0x5f;
const COLOR_GAIN: u8 = 0x49;
const COLOR_HUE: u8 = 0x4f;
const FREEZE: u8 = 0x62;
const ICR: u8 = 0x01;
const AUTO_ICR: u8 = 0x51;
const ICR_THRESHOLD: u8 = 0x21;
const ID_WRITE: u8 = 0x22;

/// White balance operating mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum WhiteBalanceMode {
    Auto = 0x00,
    Indoor = 0x01,
    Outdoor = 0x02,
    OnePush = 0x03,
    Manual = 0x05,
}

/// `8x 01 04 35 0p FF`: select the white balance mode.
pub fn wb_mode(recipient: u8, mode: WhiteBalanceMode) -> Message {
    Message::command(recipient, DataType::Camera, &[WB_MODE, mode as u8])
}

/// `8x 01 04 10 05 FF`: run one-push white balance now.
pub fn wb_trigger(recipient: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[WB_TRIGGER, 0x05])
}

/// `8x 01 04 03 0p FF`: step or reset the red gain.
pub fn r_gain(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[R_GAIN_STEP, step as u8])
}

/// `8x 01 04 43 00 00 0p 0q FF`: absolute red gain.
pub fn r_gain_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[R_GAIN_DIRECT, p, q, r, s])
}

/// `8x 01 04 04 0p FF`: step or reset the blue gain.
pub fn b_gain(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[B_GAIN_STEP, step as u8])
}

/// `8x 01 04 44 00 00 0p 0q FF`: absolute blue gain.
pub fn b_gain_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[B_GAIN_DIRECT, p, q, r, s])
}

/// `8x 01 04 02 0p FF`: step or reset the aperture (sharpness) gain.
pub fn aperture(recipient: u8, step: Step) -> Message {
    Message::command(recipient, DataType::Camera, &[APERTURE_STEP, step as u8])
}

/// `8x 01 04 42 00 00 0p 0q FF`: absolute aperture gain.
pub fn aperture_direct(recipient: u8, position: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(position.into());
    Message::command(recipient, DataType::Camera, &[APERTURE_DIRECT, p, q, r, s])
}

/// `8x 01 04 52 0p FF`: high-resolution mode.
pub fn high_res(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[HIGH_RES, super::on_off(on)])
}

/// `8x 01 04 5E 0p FF`: high-sensitivity mode.
pub fn high_sensitivity(recipient: u8, on: bool) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[HIGH_SENSITIVITY, super::on_off(on)],
    )
}

/// `8x 01 04 53 0p FF`: noise reduction strength, 0 to 5.
pub fn noise_reduction(recipient: u8, level: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[NOISE_REDUCTION, level.min(5)])
}

/// `8x 01 04 5B 0p FF`: gamma curve, 0 to 4.
pub fn gamma(recipient: u8, level: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[GAMMA, level.min(4)])
}

/// `8x 01 04 5F 0p FF`: chroma suppression strength, 0 (off) to 3.
pub fn chroma_suppress(recipient: u8, level: u8) -> Message {
    Message::command(recipient, DataType::Camera, &[CHROMA_SUPPRESS, level.min(3)])
}

/// `8x 01 04 49 00 00 00 0p FF`: colour gain, 0 (60%) to 14 (200%).
pub fn color_gain(recipient: u8, level: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[COLOR_GAIN, 0x00, 0x00, 0x00, level.min(14)],
    )
}

/// `8x 01 04 4F 00 00 00 0p FF`: colour hue, 0 (−14°) to 14 (+14°).
pub fn color_hue(recipient: u8, level: u8) -> Message {
    Message::command(
        recipient,
        DataType::Camera,
        &[COLOR_HUE, 0x00, 0x00, 0x00, level.min(14)],
    )
}

/// `8x 01 04 62 0p FF`: freeze the picture.
pub fn freeze(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[FREEZE, super::on_off(on)])
}

/// `8x 01 04 01 0p FF`: infrared cut filter.
pub fn icr(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[ICR, super::on_off(on)])
}

/// `8x 01 04 51 0p FF`: automatic ICR switching.
pub fn auto_icr(recipient: u8, on: bool) -> Message {
    Message::command(recipient, DataType::Camera, &[AUTO_ICR, super::on_off(on)])
}

/// `8x 01 04 21 00 00 0p 0q FF`: auto-ICR switching threshold.
pub fn icr_threshold(recipient: u8, threshold: u8) -> Message {
    let [p, q, r, s] = nibble::encode_u16(threshold.into());
    Message::command(recipient, DataType::Camera, &[ICR_THRESHOLD, p, q, r, s])
}

/// `8x 01 04 22 0p 0q 0r 0s FF`: write the camera ID word.
pub fn id_write(recipient: u8, id: u16) -> Message {
    let [p, q, r, s] = nibble::encode_u16(id);
    Message::command(recipient, DataType::Camera, &[ID_WRITE, p, q, r, s])
}

pub fn wb_mode_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[WB_MODE])
}

pub fn r_gain_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[R_GAIN_DIRECT])
}

pub fn b_gain_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[B_GAIN_DIRECT])
}

pub fn aperture_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[APERTURE_DIRECT])
}

pub fn high_res_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[HIGH_RES])
}

pub fn high_sensitivity_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[HIGH_SENSITIVITY])
}

pub fn noise_reduction_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[NOISE_REDUCTION])
}

pub fn gamma_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[GAMMA])
}

pub fn chroma_suppress_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[CHROMA_SUPPRESS])
}

pub fn color_gain_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[COLOR_GAIN])
}

pub fn color_hue_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[COLOR_HUE])
}

pub fn freeze_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[FREEZE])
}

pub fn icr_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[ICR])
}

pub fn auto_icr_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[AUTO_ICR])
}

pub fn icr_threshold_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[ICR_THRESHOLD])
}

pub fn id_inq(recipient: u8) -> Message {
    Message::inquiry(recipient, DataType::Camera, &[ID_WRITE])
}
