//! esp-hal peripheral wiring and trait implementations

use embedded_dht_rs::dht22::Dht22;
use embedded_io::Write;
use esp_hal::{
    analog::adc::{Adc, AdcConfig, AdcPin, Attenuation},
    delay::Delay,
    gpio::{AnyPin, DriveMode, Flex, Input, InputConfig, Level, Output, OutputConfig, Pull},
    i2c::master::{Config as I2cConfig, I2c},
    ledc::{
        LSGlobalClkSource, Ledc, LowSpeed,
        channel::{self, Channel, ChannelHW, ChannelIFace},
        timer::{self, TimerIFace},
    },
    peripherals::{ADC1, GPIO4, I2C0, LEDC, RMT, UART1},
    rmt::Rmt,
    time::Rate,
    uart::{Config as UartConfig, Uart},
};
use esp_hal_smartled::{SmartLedsAdapter, smart_led_buffer};
use smart_leds::{RGB8, SmartLedsWrite, brightness};
use static_cell::StaticCell;

use crate::logic::Rgb;
use crate::model::ButtonLevel;
use crate::telemetry::BAUD_RATE;
use crate::traits::{
    EnvironmentSensor, ModeButton, PressureIndicator, PressureProbe, StatusLeds, TelemetrySink,
};

/// Color-ramp PWM frequency.
const PWM_FREQ_HZ: u32 = 2_000;

/// Decorative strip geometry; fixed by the enclosure.
pub const STRIP_PIXELS: usize = 90;
pub const STRIP_BRIGHTNESS: u8 = 50;

/// DHT22 climate sensor on a single open-drain data line.
pub struct DhtHardware<'a> {
    dht: Dht22<Flex<'a>, Delay>,
}

impl<'a> DhtHardware<'a> {
    pub fn new<P>(data_gpio: P) -> Self
    where
        P: Into<AnyPin<'a>>,
    {
        let mut pin = Flex::new(data_gpio.into());

        // Idle level is high; the protocol pulls the line low to start.
        pin.apply_output_config(
            &OutputConfig::default()
                .with_drive_mode(DriveMode::OpenDrain)
                .with_pull(Pull::Up),
        );
        pin.set_output_enable(true);
        pin.set_input_enable(true);
        pin.set_high();

        esp_println::println!("[DHT22] data line ready");

        Self {
            dht: Dht22::new(pin, Delay::new()),
        }
    }
}

impl EnvironmentSensor for DhtHardware<'_> {
    fn read_environment(&mut self) -> Result<(f32, f32), &'static str> {
        let reading = self.dht.read().map_err(|_| "climate read failed")?;
        Ok((reading.temperature, reading.humidity))
    }
}

/// Pressure transducer on an ADC1 channel, 11 dB attenuation for the full
/// input range, 12-bit samples.
pub struct PressureHardware<'a> {
    adc: Adc<'a, ADC1<'a>, esp_hal::Blocking>,
    pin: AdcPin<GPIO4<'a>, ADC1<'a>>,
}

impl<'a> PressureHardware<'a> {
    pub fn new(adc_periph: ADC1<'a>, pin: GPIO4<'a>) -> Self {
        let mut config = AdcConfig::new();
        let pin = config.enable_pin(pin, Attenuation::_11dB);
        let adc = Adc::new(adc_periph, config);

        Self { adc, pin }
    }
}

impl PressureProbe for PressureHardware<'_> {
    fn read_raw(&mut self) -> u16 {
        self.adc.read_blocking(&mut self.pin)
    }
}

/// Mode button, pull-up, pressed = LOW.
pub struct ModeButtonHardware<'a> {
    input: Input<'a>,
}

impl<'a> ModeButtonHardware<'a> {
    pub fn new<P>(pin: P) -> Self
    where
        P: Into<AnyPin<'a>>,
    {
        let input = Input::new(pin.into(), InputConfig::default().with_pull(Pull::Up));
        Self { input }
    }
}

impl ModeButton for ModeButtonHardware<'_> {
    fn level(&mut self) -> ButtonLevel {
        if self.input.is_low() {
            ButtonLevel::Low
        } else {
            ButtonLevel::High
        }
    }
}

/// The two discrete mode LEDs. Boot state mirrors a disabled auto-send.
pub struct StatusLedHardware<'a> {
    red: Output<'a>,
    green: Output<'a>,
}

impl<'a> StatusLedHardware<'a> {
    pub fn new<R, G>(red_gpio: R, green_gpio: G) -> Self
    where
        R: Into<AnyPin<'a>>,
        G: Into<AnyPin<'a>>,
    {
        Self {
            red: Output::new(red_gpio.into(), Level::Low, OutputConfig::default()),
            green: Output::new(green_gpio.into(), Level::High, OutputConfig::default()),
        }
    }
}

impl StatusLeds for StatusLedHardware<'_> {
    fn show_auto_send(&mut self, enabled: bool) {
        self.red.set_level(if enabled { Level::High } else { Level::Low });
        self.green.set_level(if enabled { Level::Low } else { Level::High });
    }
}

static LEDC_BLOCK: StaticCell<Ledc<'static>> = StaticCell::new();
static LEDC_TIMER: StaticCell<timer::Timer<'static, LowSpeed>> = StaticCell::new();

/// Three LEDC channels driving the pressure color ramp, 8-bit duty at 2 kHz.
/// The block and its timer live in statics so the channels can borrow them
/// for the program lifetime.
pub struct RgbPwmHardware {
    red: Channel<'static, LowSpeed>,
    green: Channel<'static, LowSpeed>,
    blue: Channel<'static, LowSpeed>,
}

impl RgbPwmHardware {
    pub fn new<R, G, B>(
        ledc_periph: LEDC<'static>,
        red_gpio: R,
        green_gpio: G,
        blue_gpio: B,
    ) -> Result<Self, &'static str>
    where
        R: Into<AnyPin<'static>>,
        G: Into<AnyPin<'static>>,
        B: Into<AnyPin<'static>>,
    {
        let ledc = LEDC_BLOCK.init(Ledc::new(ledc_periph));
        ledc.set_global_slow_clock(LSGlobalClkSource::APBClk);

        let lstimer = LEDC_TIMER.init(ledc.timer::<LowSpeed>(timer::Number::Timer0));
        lstimer
            .configure(timer::config::Config {
                duty: timer::config::Duty::Duty8Bit,
                clock_source: timer::LSClockSource::APBClk,
                frequency: Rate::from_hz(PWM_FREQ_HZ),
            })
            .map_err(|_| "LEDC timer config failed")?;
        let lstimer: &'static timer::Timer<'static, LowSpeed> = lstimer;

        let mut red = ledc.channel(channel::Number::Channel0, red_gpio.into());
        let mut green = ledc.channel(channel::Number::Channel1, green_gpio.into());
        let mut blue = ledc.channel(channel::Number::Channel2, blue_gpio.into());

        for ch in [&mut red, &mut green, &mut blue] {
            ch.configure(channel::config::Config {
                timer: lstimer,
                duty_pct: 0,
                pin_config: channel::config::PinConfig::PushPull,
            })
            .map_err(|_| "LEDC channel config failed")?;
        }

        esp_println::println!("[PWM] color ramp at {} Hz, 8-bit duty", PWM_FREQ_HZ);

        Ok(Self { red, green, blue })
    }
}

impl PressureIndicator for RgbPwmHardware {
    fn set_color(&mut self, color: Rgb) -> Result<(), &'static str> {
        // Raw 8-bit duty writes, so logic-level 0..=255 values land in the
        // registers unscaled.
        self.red.set_duty_hw(u32::from(color.r));
        self.green.set_duty_hw(u32::from(color.g));
        self.blue.set_duty_hw(u32::from(color.b));
        Ok(())
    }
}

/// Bring up the addressable strip: all pixels dark at a fixed brightness.
/// The strip is decoration in this version and is never written again after
/// init, so the adapter is dropped here.
pub fn init_strip<'a, P>(rmt_periph: RMT<'a>, data_gpio: P) -> Result<(), &'static str>
where
    P: Into<AnyPin<'a>>,
{
    let rmt = Rmt::new(rmt_periph, Rate::from_mhz(80)).map_err(|_| "RMT init failed")?;
    let mut strip = SmartLedsAdapter::new(
        rmt.channel0,
        data_gpio.into(),
        smart_led_buffer!(STRIP_PIXELS),
    );

    let dark = [RGB8::default(); STRIP_PIXELS];
    strip
        .write(brightness(dark.iter().cloned(), STRIP_BRIGHTNESS))
        .map_err(|_| "strip write failed")?;

    esp_println::println!(
        "[STRIP] {} pixels parked dark, brightness {}",
        STRIP_PIXELS,
        STRIP_BRIGHTNESS
    );

    Ok(())
}

/// Bus and settle-delay bundle for the character display; the renderer in
/// `display` takes ownership of both.
pub struct LcdHardware<'a> {
    pub i2c: I2c<'a, esp_hal::Blocking>,
    pub delay: Delay,
}

impl<'a> LcdHardware<'a> {
    pub fn new<SDA, SCL>(i2c_periph: I2C0<'a>, sda: SDA, scl: SCL) -> Self
    where
        SDA: Into<AnyPin<'a>>,
        SCL: Into<AnyPin<'a>>,
    {
        let i2c = I2c::new(
            i2c_periph,
            I2cConfig::default().with_frequency(Rate::from_khz(100)),
        )
        .unwrap()
        .with_sda(sda.into())
        .with_scl(scl.into());

        Self {
            i2c,
            delay: Delay::new(),
        }
    }
}

/// Dedicated telemetry UART; the console UART stays free for logs.
pub struct TelemetryUart<'a> {
    uart: Uart<'a, esp_hal::Blocking>,
}

impl<'a> TelemetryUart<'a> {
    pub fn new<TX>(uart_periph: UART1<'a>, tx_gpio: TX) -> Result<Self, &'static str>
    where
        TX: Into<AnyPin<'a>>,
    {
        let uart = Uart::new(uart_periph, UartConfig::default().with_baudrate(BAUD_RATE))
            .map_err(|_| "UART init failed")?
            .with_tx(tx_gpio.into());

        esp_println::println!("[UART] telemetry at {} baud", BAUD_RATE);

        Ok(Self { uart })
    }
}

impl TelemetrySink for TelemetryUart<'_> {
    fn send_line(&mut self, line: &str) -> Result<(), &'static str> {
        self.uart
            .write_all(line.as_bytes())
            .map_err(|_| "UART write failed")?;
        self.uart
            .write_all(b"\n")
            .map_err(|_| "UART write failed")?;
        Ok(())
    }
}
