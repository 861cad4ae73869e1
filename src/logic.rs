//! Cycle logic (hardware-independent)

use crate::model::{ButtonLevel, SensorReading};
use crate::telemetry;
use crate::traits::{
    EnvironmentSensor, ModeButton, PressureIndicator, PressureProbe, ReadingDisplay, StatusLeds,
    TelemetrySink,
};

/// Nominal loop pacing.
pub const CYCLE_DELAY_MS: u64 = 200;
/// Settle delay after a sensor-fault screen.
pub const FAULT_DELAY_MS: u64 = 500;

/// Placeholder linear scale from raw counts to deformation, pending a real
/// calibration run. Do not infer a physical unit from this.
pub const DEFORMATION_PER_COUNT: f32 = 0.001;

/// Upper band edges over the 12-bit converter range. A converter with a
/// different full scale means rescaling this table.
pub const BAND_EDGES: [u16; 4] = [819, 1638, 2457, 3276];

/// Channel values the PWM ramp is driven with at power-on, before the first
/// valid cycle applies a band color.
pub const STARTUP_COLOR: Rgb = Rgb { r: 30, g: 30, b: 30 };

/// 8-bit color triple, written unscaled into the PWM duty registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Five contiguous pressure bands, green through red.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressureBand {
    Low,
    Moderate,
    Elevated,
    High,
    Critical,
}

impl PressureBand {
    pub fn classify(raw: u16) -> Self {
        if raw <= BAND_EDGES[0] {
            PressureBand::Low
        } else if raw <= BAND_EDGES[1] {
            PressureBand::Moderate
        } else if raw <= BAND_EDGES[2] {
            PressureBand::Elevated
        } else if raw <= BAND_EDGES[3] {
            PressureBand::High
        } else {
            PressureBand::Critical
        }
    }

    pub fn color(self) -> Rgb {
        match self {
            PressureBand::Low => Rgb { r: 0, g: 255, b: 0 },
            PressureBand::Moderate => Rgb { r: 127, g: 255, b: 0 },
            PressureBand::Elevated => Rgb { r: 255, g: 255, b: 0 },
            PressureBand::High => Rgb { r: 255, g: 128, b: 0 },
            PressureBand::Critical => Rgb { r: 255, g: 0, b: 0 },
        }
    }
}

/// Derived deformation for the telemetry record.
pub fn deformation(pressure_raw: u16) -> f32 {
    f32::from(pressure_raw) * DEFORMATION_PER_COUNT
}

/// The two per-cycle state variables: the latched auto-send flag and the
/// previous button level used for edge detection.
pub struct Controller {
    auto_send: bool,
    previous_button: ButtonLevel,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            auto_send: false,
            previous_button: ButtonLevel::High,
        }
    }

    pub fn auto_send(&self) -> bool {
        self.auto_send
    }

    /// Toggles the mode on a HIGH -> LOW transition and reports the new flag.
    /// Holding the pin LOW does not re-toggle until a HIGH has been sampled
    /// again.
    pub fn process_button(&mut self, level: ButtonLevel) -> Option<bool> {
        let falling = self.previous_button == ButtonLevel::High && level == ButtonLevel::Low;
        self.previous_button = level;
        if falling {
            self.auto_send = !self.auto_send;
            Some(self.auto_send)
        } else {
            None
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one loop iteration; the caller picks the matching delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Valid,
    SensorFault,
}

/// One pass of the sample-render-transmit loop.
///
/// A failed climate read is folded into not-a-number fields, which carry the
/// same meaning as a faulting sensor. On a fault the cycle stops after the
/// error screen: the button is not sampled, the ramp keeps its last color
/// and no telemetry line is produced. The pressure input is sampled before
/// the validity check in both branches.
#[allow(clippy::too_many_arguments)]
pub fn run_cycle<E, P, B, D, I, L, T>(
    controller: &mut Controller,
    climate: &mut E,
    pressure: &mut P,
    button: &mut B,
    display: &mut D,
    indicator: &mut I,
    leds: &mut L,
    sink: &mut T,
) -> Result<CycleOutcome, &'static str>
where
    E: EnvironmentSensor,
    P: PressureProbe,
    B: ModeButton,
    D: ReadingDisplay,
    I: PressureIndicator,
    L: StatusLeds,
    T: TelemetrySink,
{
    let (temperature, humidity) = climate.read_environment().unwrap_or((f32::NAN, f32::NAN));

    let reading = SensorReading {
        temperature,
        humidity,
        pressure_raw: pressure.read_raw(),
    };

    if !reading.is_valid() {
        display.show_error()?;
        return Ok(CycleOutcome::SensorFault);
    }

    display.show_reading(&reading)?;

    if let Some(enabled) = controller.process_button(button.level()) {
        leds.show_auto_send(enabled);
    }

    indicator.set_color(PressureBand::classify(reading.pressure_raw).color())?;

    telemetry::emit(sink, &reading, deformation(reading.pressure_raw))?;

    Ok(CycleOutcome::Valid)
}
