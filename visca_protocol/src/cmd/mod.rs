//! # Command and inquiry builders
//!
//! Builders are grouped into modules by functional area, and re-exported
//! here. Every builder clamps its inputs to the documented range and
//! returns a fully-formed [`Message`][crate::Message]; the gateway
//! re-stamps the recipient when a message is admitted to a camera.
//!
//! Frame bytes follow the PTZOptics "VISCA over IP" rev 1.0 tables and
//! the Sony EVI-H100S manual.

mod effect;
mod exposure;
mod focus;
mod image;
mod pan_tilt;
mod power;
mod preset;
mod system;
mod zoom;

pub use self::{
    effect::{
        digital_effect, digital_effect_inq, digital_effect_level, digital_effect_level_inq,
        effect, effect_inq, DigitalEffect, PictureEffect, EFFECT_LEVEL_MAX,
    },
    exposure::{
        backlight, backlight_inq, exposure_comp, exposure_comp_direct, exposure_comp_inq,
        exposure_comp_mode_inq, exposure_comp_step, exposure_mode, exposure_mode_inq, gain,
        gain_direct, gain_inq, gain_limit, gain_limit_inq, iris, iris_direct, iris_inq, shutter,
        shutter_direct, shutter_inq, slow_shutter_auto, slow_shutter_inq, ExposureMode,
    },
    focus::{
        af_interval, af_interval_inq, af_mode, af_mode_inq, af_sensitivity, af_sensitivity_inq,
        focus_auto, focus_auto_toggle, focus_direct, focus_far, focus_far_variable,
        focus_infinity, focus_mode_inq, focus_near, focus_near_limit, focus_near_limit_inq,
        focus_near_variable, focus_position_inq, focus_stop, focus_trigger, ir_correction,
        ir_correction_inq, zoom_focus_direct, FOCUS_MAX,
    },
    image::{
        aperture, aperture_direct, aperture_inq, auto_icr, auto_icr_inq, b_gain, b_gain_direct,
        b_gain_inq, chroma_suppress, chroma_suppress_inq, color_gain, color_gain_inq, color_hue,
        color_hue_inq, freeze, freeze_inq, gamma, gamma_inq, high_res, high_res_inq,
        high_sensitivity, high_sensitivity_inq, icr, icr_inq, icr_threshold, icr_threshold_inq,
        id_inq, id_write, noise_reduction, noise_reduction_inq, r_gain, r_gain_direct,
        r_gain_inq, wb_mode, wb_mode_inq, wb_trigger, WhiteBalanceMode,
    },
    pan_tilt::{
        pan_tilt, pan_tilt_direct, pan_tilt_home, pan_tilt_limit_clear, pan_tilt_limit_set,
        pan_tilt_max_speed_inq, pan_tilt_position_inq, pan_tilt_reset, pan_tilt_status_inq,
        LimitCorner, PanDirection, TiltDirection, PAN_SPEED_MAX, TILT_SPEED_MAX,
    },
    power::{power, power_auto_off, power_auto_off_inq, power_inq},
    preset::{preset_recall, preset_reset, preset_set, PRESET_MAX},
    system::{
        address_set, if_clear, if_clear_unicast, image_block_inq, lens_block_inq,
        video_format_inq, video_format_next_inq,
    },
    zoom::{
        digital_zoom, digital_zoom_inq, zoom_direct, zoom_direct_digital, zoom_position_inq,
        zoom_stop, zoom_tele, zoom_tele_variable, zoom_wide, zoom_wide_variable, ZOOM_MAX,
        ZOOM_MAX_DIGITAL,
    },
};

/// Step adjustment shared by the up/down/reset command families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Step {
    Reset = 0x00,
    Up = 0x02,
    Down = 0x03,
}

/// The protocol's usual on/off argument byte.
pub(crate) const fn on_off(on: bool) -> u8 {
    if on {
        0x02
    } else {
        0x03
    }
}
