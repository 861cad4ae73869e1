//! Serial record framing for the logging side-channel

use core::fmt::Write;

use heapless::String;

use crate::model::SensorReading;
use crate::traits::TelemetrySink;

/// Fixed at init; the consumer opens the port at the same rate.
pub const BAUD_RATE: u32 = 115_200;

/// `temperature;humidity;pressure_raw;deformation;` with every field
/// terminated by a semicolon, one record per valid cycle.
pub fn line(reading: &SensorReading, deformation: f32) -> String<48> {
    let mut out = String::new();
    let _ = write!(
        out,
        "{:.1};{:.1};{};{:.3};",
        reading.temperature, reading.humidity, reading.pressure_raw, deformation
    );
    out
}

/// Write one record for the reading and the deformation derived from it in
/// the same cycle.
pub fn emit<T: TelemetrySink>(
    sink: &mut T,
    reading: &SensorReading,
    deformation: f32,
) -> Result<(), &'static str> {
    sink.send_line(line(reading, deformation).as_str())
}
