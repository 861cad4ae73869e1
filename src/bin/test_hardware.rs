#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;
use heapless::{String, Vec};

use sonde::display::{LcdDisplay, climate_row, pressure_row};
use sonde::hardware::{DhtHardware, LcdHardware, PressureHardware};
use sonde::logic::{Controller, CycleOutcome, PressureBand, Rgb, deformation, run_cycle};
use sonde::model::{ButtonLevel, SensorReading};
use sonde::telemetry;
use sonde::traits::{
    EnvironmentSensor, ModeButton, PressureIndicator, PressureProbe, ReadingDisplay, StatusLeds,
    TelemetrySink,
};

esp_bootloader_esp_idf::esp_app_desc!();

// Test result tracking
struct TestResults {
    passed: u32,
    failed: u32,
    total: u32,
}

impl TestResults {
    fn new() -> Self {
        Self {
            passed: 0,
            failed: 0,
            total: 0,
        }
    }

    fn assert(&mut self, condition: bool, test_name: &str) {
        self.total += 1;
        if condition {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED", test_name);
        }
    }

    fn assert_eq<T: PartialEq + core::fmt::Debug>(&mut self, left: T, right: T, test_name: &str) {
        self.total += 1;
        if left == right {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!("  ✗ {} FAILED: {:?} != {:?}", test_name, left, right);
        }
    }

    fn assert_close(&mut self, value: f32, expected: f32, tolerance: f32, test_name: &str) {
        self.total += 1;
        if (value - expected).abs() < tolerance {
            self.passed += 1;
            esp_println::println!("  ✓ {}", test_name);
        } else {
            self.failed += 1;
            esp_println::println!(
                "  ✗ {} FAILED: {:.3} not close to {:.3} (tolerance: {:.3})",
                test_name,
                value,
                expected,
                tolerance
            );
        }
    }

    fn print_summary(&self) {
        esp_println::println!("\n==========================================");
        esp_println::println!("Test Summary:");
        esp_println::println!("  Total:  {}", self.total);
        esp_println::println!("  Passed: {}", self.passed);
        esp_println::println!("  Failed: {}", self.failed);
        if self.failed == 0 {
            esp_println::println!("\n✓ ALL TESTS PASSED!");
        } else {
            esp_println::println!("\n✗ SOME TESTS FAILED");
        }
        esp_println::println!("==========================================");
    }
}

// Scripted stand-ins for the peripherals, so the cycle state machine can be
// exercised without any hardware attached.

struct ScriptedClimate {
    response: Result<(f32, f32), &'static str>,
}

impl EnvironmentSensor for ScriptedClimate {
    fn read_environment(&mut self) -> Result<(f32, f32), &'static str> {
        self.response
    }
}

struct FixedPressure(u16);

impl PressureProbe for FixedPressure {
    fn read_raw(&mut self) -> u16 {
        self.0
    }
}

struct ScriptedButton {
    level: ButtonLevel,
    samples: u32,
}

impl ScriptedButton {
    fn new(level: ButtonLevel) -> Self {
        Self { level, samples: 0 }
    }
}

impl ModeButton for ScriptedButton {
    fn level(&mut self) -> ButtonLevel {
        self.samples += 1;
        self.level
    }
}

#[derive(Default)]
struct RecordingDisplay {
    readings: u32,
    errors: u32,
}

impl ReadingDisplay for RecordingDisplay {
    fn show_reading(&mut self, _reading: &SensorReading) -> Result<(), &'static str> {
        self.readings += 1;
        Ok(())
    }

    fn show_error(&mut self) -> Result<(), &'static str> {
        self.errors += 1;
        Ok(())
    }
}

#[derive(Default)]
struct RecordingIndicator {
    last: Option<Rgb>,
}

impl PressureIndicator for RecordingIndicator {
    fn set_color(&mut self, color: Rgb) -> Result<(), &'static str> {
        self.last = Some(color);
        Ok(())
    }
}

#[derive(Default)]
struct RecordingLeds {
    writes: u32,
    last: Option<bool>,
}

impl StatusLeds for RecordingLeds {
    fn show_auto_send(&mut self, enabled: bool) {
        self.writes += 1;
        self.last = Some(enabled);
    }
}

#[derive(Default)]
struct RecordingSink {
    lines: Vec<String<48>, 8>,
}

impl TelemetrySink for RecordingSink {
    fn send_line(&mut self, line: &str) -> Result<(), &'static str> {
        let mut owned = String::new();
        let _ = owned.push_str(line);
        let _ = self.lines.push(owned);
        Ok(())
    }
}

struct TestRig {
    controller: Controller,
    pressure: FixedPressure,
    button: ScriptedButton,
    display: RecordingDisplay,
    indicator: RecordingIndicator,
    leds: RecordingLeds,
    sink: RecordingSink,
}

impl TestRig {
    fn new(pressure_raw: u16, button: ButtonLevel) -> Self {
        Self {
            controller: Controller::new(),
            pressure: FixedPressure(pressure_raw),
            button: ScriptedButton::new(button),
            display: RecordingDisplay::default(),
            indicator: RecordingIndicator::default(),
            leds: RecordingLeds::default(),
            sink: RecordingSink::default(),
        }
    }

    fn cycle(&mut self, climate: Result<(f32, f32), &'static str>) -> CycleOutcome {
        let mut climate = ScriptedClimate { response: climate };
        run_cycle(
            &mut self.controller,
            &mut climate,
            &mut self.pressure,
            &mut self.button,
            &mut self.display,
            &mut self.indicator,
            &mut self.leds,
            &mut self.sink,
        )
        .unwrap()
    }
}

fn test_pressure_bands(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Pressure band table");

    let green = Rgb { r: 0, g: 255, b: 0 };
    let lime = Rgb { r: 127, g: 255, b: 0 };
    let yellow = Rgb { r: 255, g: 255, b: 0 };
    let orange = Rgb { r: 255, g: 128, b: 0 };
    let red = Rgb { r: 255, g: 0, b: 0 };

    results.assert_eq(PressureBand::classify(0).color(), green, "raw 0 is green");
    results.assert_eq(PressureBand::classify(819).color(), green, "raw 819 is green");
    results.assert_eq(PressureBand::classify(820).color(), lime, "raw 820 is lime");
    results.assert_eq(PressureBand::classify(1638).color(), lime, "raw 1638 is lime");
    results.assert_eq(
        PressureBand::classify(1639).color(),
        yellow,
        "raw 1639 is yellow",
    );
    results.assert_eq(
        PressureBand::classify(2457).color(),
        yellow,
        "raw 2457 is yellow",
    );
    results.assert_eq(
        PressureBand::classify(2458).color(),
        orange,
        "raw 2458 is orange",
    );
    results.assert_eq(
        PressureBand::classify(3276).color(),
        orange,
        "raw 3276 is orange",
    );
    results.assert_eq(PressureBand::classify(3277).color(), red, "raw 3277 is red");
    results.assert_eq(PressureBand::classify(4095).color(), red, "raw 4095 is red");
}

fn test_deformation(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Deformation scale");

    results.assert_close(deformation(0), 0.0, 1e-6, "raw 0 maps to 0");
    results.assert_close(deformation(819), 0.819, 1e-5, "raw 819 maps to 0.819");
    results.assert_close(deformation(4095), 4.095, 1e-4, "raw 4095 maps to 4.095");
}

fn test_button_edges(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Button edge detection");

    let mut controller = Controller::new();
    results.assert_eq(controller.auto_send(), false, "mode starts disabled");

    // One HIGH cycle then the pin held LOW for three cycles: exactly one
    // toggle, on the first LOW sample.
    results.assert_eq(
        controller.process_button(ButtonLevel::High),
        None,
        "steady HIGH does not toggle",
    );
    results.assert_eq(
        controller.process_button(ButtonLevel::Low),
        Some(true),
        "falling edge toggles on",
    );
    results.assert_eq(
        controller.process_button(ButtonLevel::Low),
        None,
        "held LOW does not re-toggle",
    );
    results.assert_eq(
        controller.process_button(ButtonLevel::Low),
        None,
        "still held LOW does not re-toggle",
    );
    results.assert_eq(controller.auto_send(), true, "mode latched on");

    // Release and press again: toggles back off.
    results.assert_eq(
        controller.process_button(ButtonLevel::High),
        None,
        "release does not toggle",
    );
    results.assert_eq(
        controller.process_button(ButtonLevel::Low),
        Some(false),
        "second press toggles off",
    );
}

fn test_formatting(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Row and record formatting");

    results.assert_eq(
        climate_row(21.5, 40.2).as_str(),
        "T:21.5C H:40.2%",
        "climate row",
    );
    results.assert_eq(pressure_row(819).as_str(), "ADC:819     ", "pressure row");

    let reading = SensorReading {
        temperature: 21.5,
        humidity: 40.2,
        pressure_raw: 819,
    };
    results.assert_eq(
        telemetry::line(&reading, deformation(819)).as_str(),
        "21.5;40.2;819;0.819;",
        "record for raw 819",
    );

    let zero = SensorReading {
        temperature: 0.0,
        humidity: 0.0,
        pressure_raw: 0,
    };
    results.assert_eq(
        telemetry::line(&zero, deformation(0)).as_str(),
        "0.0;0.0;0;0.000;",
        "record for raw 0",
    );
}

fn test_fault_cycle(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Fault cycle short-circuit");

    // Driver-level failure. The button is held LOW so any sampling would
    // have toggled the mode.
    let mut rig = TestRig::new(819, ButtonLevel::Low);
    let outcome = rig.cycle(Err("climate read failed"));
    results.assert_eq(outcome, CycleOutcome::SensorFault, "driver error faults");
    results.assert_eq(rig.display.errors, 1, "error screen shown");
    results.assert_eq(rig.display.readings, 0, "no reading rendered");
    results.assert_eq(rig.button.samples, 0, "button not sampled");
    results.assert_eq(rig.leds.writes, 0, "status LEDs untouched");
    results.assert(rig.indicator.last.is_none(), "ramp untouched");
    results.assert_eq(rig.sink.lines.len(), 0, "no telemetry line");
    results.assert_eq(rig.controller.auto_send(), false, "mode unchanged");

    // Not-a-number from the sensor behaves identically.
    let mut rig = TestRig::new(819, ButtonLevel::Low);
    let outcome = rig.cycle(Ok((f32::NAN, 40.2)));
    results.assert_eq(outcome, CycleOutcome::SensorFault, "NaN temperature faults");
    results.assert_eq(rig.sink.lines.len(), 0, "no telemetry line on NaN");

    // A fault cycle carries the previous edge state over: the press is only
    // seen on the next valid cycle.
    let mut rig = TestRig::new(819, ButtonLevel::Low);
    rig.cycle(Err("climate read failed"));
    let outcome = rig.cycle(Ok((21.5, 40.2)));
    results.assert_eq(outcome, CycleOutcome::Valid, "recovers next cycle");
    results.assert_eq(rig.leds.last, Some(true), "press seen after recovery");
}

fn test_valid_cycle(results: &mut TestResults) {
    esp_println::println!("\n[TEST] Valid cycle");

    let mut rig = TestRig::new(819, ButtonLevel::High);
    let outcome = rig.cycle(Ok((21.5, 40.2)));
    results.assert_eq(outcome, CycleOutcome::Valid, "cycle is valid");
    results.assert_eq(rig.display.readings, 1, "reading rendered");
    results.assert_eq(rig.button.samples, 1, "button sampled once");
    results.assert_eq(rig.leds.writes, 0, "no LED write without an edge");
    results.assert_eq(
        rig.indicator.last,
        Some(Rgb { r: 0, g: 255, b: 0 }),
        "ramp shows the low band",
    );
    results.assert_eq(rig.sink.lines.len(), 1, "one telemetry line");
    results.assert_eq(
        rig.sink.lines[0].as_str(),
        "21.5;40.2;819;0.819;",
        "line matches the reading",
    );

    // Holding the button LOW across valid cycles writes the LEDs once.
    let mut rig = TestRig::new(4095, ButtonLevel::Low);
    rig.cycle(Ok((21.5, 40.2)));
    rig.cycle(Ok((21.5, 40.2)));
    rig.cycle(Ok((21.5, 40.2)));
    results.assert_eq(rig.leds.writes, 1, "LEDs written on the edge only");
    results.assert_eq(rig.leds.last, Some(true), "LEDs mirror the flag");
    results.assert_eq(
        rig.indicator.last,
        Some(Rgb { r: 255, g: 0, b: 0 }),
        "ramp shows the top band",
    );
    results.assert_eq(rig.sink.lines.len(), 3, "one line per valid cycle");
}

async fn test_sensors_live(
    results: &mut TestResults,
    mut pressure: PressureHardware<'static>,
    mut climate: DhtHardware<'static>,
) {
    esp_println::println!("\n[TEST] Live sensors");

    let raw = pressure.read_raw();
    esp_println::println!("    pressure raw: {}", raw);
    results.assert(raw <= 4095, "pressure sample within 12 bits");

    // The DHT22 wants ~2 s between reads; take three spaced attempts and
    // require one good sample.
    let mut good = None;
    for attempt in 1..=3 {
        Timer::after(Duration::from_secs(2)).await;
        match climate.read_environment() {
            Ok((temperature, humidity)) => {
                esp_println::println!(
                    "    attempt {}: {:.1}°C, {:.1}%",
                    attempt,
                    temperature,
                    humidity
                );
                good = Some((temperature, humidity));
                break;
            }
            Err(e) => esp_println::println!("    attempt {}: {}", attempt, e),
        }
    }

    match good {
        Some((temperature, humidity)) => {
            results.assert(
                (-40.0..=80.0).contains(&temperature),
                "temperature in sensor range",
            );
            results.assert(
                (0.0..=100.0).contains(&humidity),
                "humidity in sensor range",
            );
        }
        None => results.assert(false, "climate sensor answered"),
    }
}

fn test_display_live(results: &mut TestResults, lcd_hw: LcdHardware<'static>) {
    esp_println::println!("\n[TEST] Live display");

    match LcdDisplay::new(lcd_hw) {
        Ok(mut display) => {
            results.assert(true, "LCD initialized");
            let reading = SensorReading {
                temperature: 21.5,
                humidity: 40.2,
                pressure_raw: 819,
            };
            results.assert(display.show_reading(&reading).is_ok(), "reading rendered");
        }
        Err(e) => {
            esp_println::println!("    {}", e);
            results.assert(false, "LCD initialized");
        }
    }
}

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("\n==========================================");
    esp_println::println!("=== Sonde Test Runner ===");
    esp_println::println!("==========================================");

    let mut results = TestResults::new();

    // Logic tests need no hardware.
    test_pressure_bands(&mut results);
    test_deformation(&mut results);
    test_button_edges(&mut results);
    test_formatting(&mut results);
    test_fault_cycle(&mut results);
    test_valid_cycle(&mut results);

    // Extract the peripherals we need before starting the RTOS timer.
    let i2c0 = peripherals.I2C0;
    let sda = peripherals.GPIO8;
    let scl = peripherals.GPIO9;
    let adc1 = peripherals.ADC1;
    let pressure_pin = peripherals.GPIO4;
    let dht_pin = peripherals.GPIO7;

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    test_display_live(&mut results, LcdHardware::new(i2c0, sda, scl));
    test_sensors_live(
        &mut results,
        PressureHardware::new(adc1, pressure_pin),
        DhtHardware::new(dht_pin),
    )
    .await;

    results.print_summary();

    esp_println::println!("\nTest run complete. Looping...");
    loop {
        if results.failed == 0 {
            Timer::after(Duration::from_millis(200)).await;
        } else {
            Timer::after(Duration::from_millis(1000)).await;
        }
    }
}
