//! Seams between the cycle logic and the peripherals

use crate::logic::Rgb;
use crate::model::{ButtonLevel, SensorReading};

/// Trait for the combined temperature/humidity sensor
pub trait EnvironmentSensor {
    /// One blocking climate read. Transient faults surface as `Err`;
    /// the caller decides what a failed cycle looks like.
    fn read_environment(&mut self) -> Result<(f32, f32), &'static str>;
}

/// Trait for the analog pressure input
pub trait PressureProbe {
    /// Raw converter sample. Band thresholds are applied by the caller.
    fn read_raw(&mut self) -> u16;
}

/// Trait for the mode button
pub trait ModeButton {
    /// Pure pin sample; edge detection happens in the controller.
    fn level(&mut self) -> ButtonLevel;
}

/// Trait for the two-line character display
pub trait ReadingDisplay {
    /// Render a valid reading (pressure on the bottom row, climate on top).
    fn show_reading(&mut self, reading: &SensorReading) -> Result<(), &'static str>;

    /// Clear the display and print the fixed sensor-fault message.
    fn show_error(&mut self) -> Result<(), &'static str>;
}

/// Trait for the PWM color ramp
pub trait PressureIndicator {
    fn set_color(&mut self, color: Rgb) -> Result<(), &'static str>;
}

/// Trait for the two mode status LEDs (red = auto-send on, green = off)
pub trait StatusLeds {
    fn show_auto_send(&mut self, enabled: bool);
}

/// Trait for the serial telemetry transport
pub trait TelemetrySink {
    /// Write one record; the sink appends the line terminator.
    fn send_line(&mut self, line: &str) -> Result<(), &'static str>;
}
