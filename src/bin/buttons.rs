#![no_std]
#![no_main]

//! Mode button bring-up
//!
//! Polls the button through the production edge detector and mirrors the
//! status LEDs, logging each toggle.

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sonde::hardware::{ModeButtonHardware, StatusLedHardware};
use sonde::logic::Controller;
use sonde::traits::{ModeButton, StatusLeds};

esp_bootloader_esp_idf::esp_app_desc!();

const POLL_INTERVAL_MS: u64 = 10;

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut button = ModeButtonHardware::new(peripherals.GPIO12);
    let mut leds = StatusLedHardware::new(peripherals.GPIO6, peripherals.GPIO5);

    let mut controller = Controller::new();
    leds.show_auto_send(controller.auto_send());

    esp_println::println!("Watching the mode button (GPIO12)...");

    loop {
        if let Some(enabled) = controller.process_button(button.level()) {
            leds.show_auto_send(enabled);
            esp_println::println!("auto-send {}", if enabled { "on" } else { "off" });
        }

        Timer::after(Duration::from_millis(POLL_INTERVAL_MS)).await;
    }
}
