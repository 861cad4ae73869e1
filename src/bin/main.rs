#![no_std]
#![no_main]

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sonde::display::LcdDisplay;
use sonde::hardware::{
    self, DhtHardware, ModeButtonHardware, PressureHardware, RgbPwmHardware, StatusLedHardware,
    TelemetryUart,
};
use sonde::logic::{self, Controller, CycleOutcome, STARTUP_COLOR};
use sonde::traits::{PressureIndicator, StatusLeds};

// Wiring:
// - I2C0: GPIO8 (SDA) / GPIO9 (SCL), LCD backpack at 0x27
// - ADC1: GPIO4, pressure transducer
// - GPIO7: DHT22 data line
// - GPIO12: mode button (pull-up, pressed = LOW)
// - GPIO6 (red) / GPIO5 (green): mode status LEDs
// - LEDC: GPIO10 (red), GPIO11 (green), GPIO13 (blue) color ramp
// - RMT: GPIO21, 90-pixel strip (decoration, init only)
// - UART1: GPIO17 TX, telemetry at 115200 baud

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    esp_println::logger::init_logger_from_env();
    let peripherals = esp_hal::init(esp_hal::Config::default());

    esp_println::println!("=== Sonde ===");

    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let lcd_hw = hardware::LcdHardware::new(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9);
    let mut display = match LcdDisplay::new(lcd_hw) {
        Ok(display) => display,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    if let Err(e) = hardware::init_strip(peripherals.RMT, peripherals.GPIO21) {
        // Decorative only; the station runs fine without it.
        esp_println::println!("[WARN] {}", e);
    }

    let mut climate = DhtHardware::new(peripherals.GPIO7);
    let mut pressure = PressureHardware::new(peripherals.ADC1, peripherals.GPIO4);
    let mut button = ModeButtonHardware::new(peripherals.GPIO12);
    let mut leds = StatusLedHardware::new(peripherals.GPIO6, peripherals.GPIO5);

    let mut indicator = match RgbPwmHardware::new(
        peripherals.LEDC,
        peripherals.GPIO10,
        peripherals.GPIO11,
        peripherals.GPIO13,
    ) {
        Ok(indicator) => indicator,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut telemetry = match TelemetryUart::new(peripherals.UART1, peripherals.GPIO17) {
        Ok(telemetry) => telemetry,
        Err(e) => {
            esp_println::println!("[ERROR] {}", e);
            loop {
                Timer::after(Duration::from_secs(1)).await;
            }
        }
    };

    let mut controller = Controller::new();
    leds.show_auto_send(controller.auto_send());
    if let Err(e) = indicator.set_color(STARTUP_COLOR) {
        esp_println::println!("[WARN] {}", e);
    }

    esp_println::println!("[LOOP] sampling every {} ms", logic::CYCLE_DELAY_MS);

    loop {
        let delay_ms = match logic::run_cycle(
            &mut controller,
            &mut climate,
            &mut pressure,
            &mut button,
            &mut display,
            &mut indicator,
            &mut leds,
            &mut telemetry,
        ) {
            Ok(CycleOutcome::Valid) => logic::CYCLE_DELAY_MS,
            Ok(CycleOutcome::SensorFault) => logic::FAULT_DELAY_MS,
            Err(e) => {
                esp_println::println!("[ERROR] cycle aborted: {}", e);
                logic::CYCLE_DELAY_MS
            }
        };

        Timer::after(Duration::from_millis(delay_ms)).await;
    }
}
