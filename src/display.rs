//! 16x2 character display rendering

use core::fmt::Write;

use esp_hal::delay::Delay;
use esp_hal::i2c::master::I2c;
use hd44780_driver::HD44780;
use hd44780_driver::bus::I2CBus;
use hd44780_driver::charset::{CharsetUniversal, EmptyFallback};
use hd44780_driver::memory_map::StandardMemoryMap;
use heapless::String;

use crate::hardware::LcdHardware;
use crate::model::SensorReading;
use crate::traits::ReadingDisplay;

/// Bus address of the I2C expander backpack.
pub const LCD_ADDRESS: u8 = 0x27;

/// Fixed message shown on a climate-sensor fault.
pub const SENSOR_FAULT_TEXT: &str = "DHT22 error";

type Lcd<'a> = HD44780<
    I2CBus<I2c<'a, esp_hal::Blocking>>,
    StandardMemoryMap<16, 2>,
    EmptyFallback<CharsetUniversal>,
>;

/// Top row: temperature and humidity, one decimal each.
pub fn climate_row(temperature: f32, humidity: f32) -> String<16> {
    let mut row = String::new();
    let _ = write!(row, "T:{:.1}C H:{:.1}%", temperature, humidity);
    row
}

/// Bottom row: the raw converter value. The trailing spaces erase stale
/// digits from a previous, longer value.
pub fn pressure_row(pressure_raw: u16) -> String<16> {
    let mut row = String::new();
    let _ = write!(row, "ADC:{}     ", pressure_raw);
    row
}

pub struct LcdDisplay<'a> {
    lcd: Lcd<'a>,
    delay: Delay,
}

impl<'a> LcdDisplay<'a> {
    pub fn new(hw: LcdHardware<'a>) -> Result<Self, &'static str> {
        let LcdHardware { i2c, mut delay } = hw;

        let mut lcd =
            HD44780::new_i2c(i2c, LCD_ADDRESS, &mut delay).map_err(|_| "LCD init failed")?;
        lcd.clear(&mut delay).map_err(|_| "LCD clear failed")?;

        esp_println::println!("[LCD] 16x2 ready at 0x{:02X}", LCD_ADDRESS);

        Ok(Self { lcd, delay })
    }

    fn write_row(&mut self, row: u8, text: &str) -> Result<(), &'static str> {
        self.lcd
            .set_cursor_xy((0, row), &mut self.delay)
            .map_err(|_| "LCD cursor move failed")?;
        self.lcd
            .write_str(text, &mut self.delay)
            .map_err(|_| "LCD write failed")?;
        Ok(())
    }
}

impl ReadingDisplay for LcdDisplay<'_> {
    /// No clear between valid cycles; rows are overwritten in place,
    /// bottom row first.
    fn show_reading(&mut self, reading: &SensorReading) -> Result<(), &'static str> {
        self.write_row(1, pressure_row(reading.pressure_raw).as_str())?;
        self.write_row(0, climate_row(reading.temperature, reading.humidity).as_str())?;
        Ok(())
    }

    fn show_error(&mut self) -> Result<(), &'static str> {
        self.lcd
            .clear(&mut self.delay)
            .map_err(|_| "LCD clear failed")?;
        self.write_row(0, SENSOR_FAULT_TEXT)
    }
}
