#![no_std]
#![no_main]

//! I2C bus scan
//!
//! Bring-up diagnostic for the display wiring: walks the 7-bit address
//! space on the production LCD bus (GPIO8 SDA / GPIO9 SCL) and flags the
//! expected backpack address.

use embassy_executor::Spawner;
use embassy_time::{Duration, Timer};
use esp_backtrace as _;
use esp_hal::timer::timg::TimerGroup;

use sonde::display::LCD_ADDRESS;
use sonde::hardware::LcdHardware;

esp_bootloader_esp_idf::esp_app_desc!();

#[esp_rtos::main]
async fn main(_spawner: Spawner) {
    let peripherals = esp_hal::init(esp_hal::Config::default());
    let timg0 = TimerGroup::new(peripherals.TIMG0);
    esp_rtos::start(timg0.timer0);

    let mut hw = LcdHardware::new(peripherals.I2C0, peripherals.GPIO8, peripherals.GPIO9);

    esp_println::println!("I2C scan start");
    let mut backpack_seen = false;
    for address in 0x03..=0x77u8 {
        if hw.i2c.write(address, &[]).is_ok() {
            let tag = if address == LCD_ADDRESS {
                " (LCD backpack)"
            } else {
                ""
            };
            esp_println::println!("Found device at 0x{:02X}{}", address, tag);
            backpack_seen |= address == LCD_ADDRESS;
        }
    }
    esp_println::println!("I2C scan done");

    if !backpack_seen {
        esp_println::println!(
            "No backpack at 0x{:02X} - check the display wiring",
            LCD_ADDRESS
        );
    }

    loop {
        Timer::after(Duration::from_millis(100)).await;
    }
}
