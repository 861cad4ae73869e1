#![no_std]

//! # Sonde
//! ## Bench-top environmental sensing station firmware
//!
//! Every cycle the station:
//! - samples a DHT22 climate sensor and an analog pressure transducer
//! - renders the readings on a 16x2 character display
//! - maps the raw pressure onto a five-band color ramp driven over PWM
//! - streams one semicolon-delimited record over the serial link

pub mod display;
pub mod hardware;
pub mod logic;
pub mod model;
pub mod telemetry;
pub mod traits;
