// Model of the data read in one acquisition cycle

/// One cycle's worth of sensor values. Built fresh every iteration,
/// never persisted.
#[derive(Debug, Clone, Copy)]
pub struct SensorReading {
    pub temperature: f32,
    pub humidity: f32,
    pub pressure_raw: u16,
}

impl SensorReading {
    /// A reading is unusable when the climate sensor handed back
    /// not-a-number for either field.
    pub fn is_valid(&self) -> bool {
        !self.temperature.is_nan() && !self.humidity.is_nan()
    }
}

/// Sampled level of the mode button pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonLevel {
    High,
    Low,
}
