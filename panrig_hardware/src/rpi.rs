//! Raspberry Pi backends: hardware PWM servo, GPIO lamp and button, MCP3208 joystick ADC.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use panrig_traits::{Actuator, AnalogInput, DigitalInput, Indicator, Level};
use rppal::gpio::{Gpio, InputPin, OutputPin};
use rppal::pwm::{Channel, Polarity, Pwm};
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
use tracing::{debug, trace};

use crate::error::{HwError, Result};
use crate::util::{PERIOD_US, angle_to_pulse_us, mcp3208_command, mcp3208_decode};

/// SPI clock for the MCP3208 (well under its 2 MHz limit at 5 V).
const ADC_SPI_HZ: u32 = 1_000_000;

pub struct PwmServo {
    pwm: Pwm,
}

impl PwmServo {
    pub fn new(channel: u8) -> Result<Self> {
        let channel = match channel {
            0 => Channel::Pwm0,
            1 => Channel::Pwm1,
            other => return Err(HwError::Pwm(format!("no hardware PWM channel {other}"))),
        };
        let center = angle_to_pulse_us(90)?;
        let pwm = Pwm::with_period(
            channel,
            Duration::from_micros(u64::from(PERIOD_US)),
            Duration::from_micros(u64::from(center)),
            Polarity::Normal,
            true,
        )
        .map_err(|e| HwError::Pwm(e.to_string()))?;
        debug!(?channel, "servo pwm enabled");
        Ok(Self { pwm })
    }
}

impl Actuator for PwmServo {
    fn set_angle(&mut self, degrees: u8) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pulse = angle_to_pulse_us(degrees)?;
        self.pwm
            .set_pulse_width(Duration::from_micros(u64::from(pulse)))
            .map_err(|e| HwError::Pwm(e.to_string()))?;
        trace!(degrees, pulse_us = pulse, "servo write");
        Ok(())
    }
}

pub struct GpioLamp {
    pin: OutputPin,
}

impl GpioLamp {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        let mut pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_output();
        pin.set_low();
        Ok(Self { pin })
    }
}

impl Indicator for GpioLamp {
    fn set_lamp(&mut self, on: bool) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if on {
            self.pin.set_high();
        } else {
            self.pin.set_low();
        }
        Ok(())
    }
}

/// Push button wired to ground with the internal pull-up enabled.
pub struct GpioButton {
    pin: InputPin,
}

impl GpioButton {
    pub fn new(gpio: &Gpio, pin: u8) -> Result<Self> {
        let pin = gpio
            .get(pin)
            .map_err(|e| HwError::Gpio(e.to_string()))?
            .into_input_pullup();
        Ok(Self { pin })
    }
}

impl DigitalInput for GpioButton {
    fn read_level(&mut self) -> std::result::Result<Level, Box<dyn std::error::Error + Send + Sync>> {
        Ok(match self.pin.read() {
            rppal::gpio::Level::Low => Level::Low,
            rppal::gpio::Level::High => Level::High,
        })
    }
}

/// MCP3208 on a shared SPI handle; hand out one `AdcChannel` per joystick axis.
#[derive(Clone)]
pub struct Mcp3208 {
    spi: Rc<RefCell<Spi>>,
}

impl Mcp3208 {
    pub fn new(bus: u8) -> Result<Self> {
        let bus = match bus {
            0 => Bus::Spi0,
            1 => Bus::Spi1,
            other => return Err(HwError::Spi(format!("unsupported SPI bus {other}"))),
        };
        let spi = Spi::new(bus, SlaveSelect::Ss0, ADC_SPI_HZ, Mode::Mode0)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(Self {
            spi: Rc::new(RefCell::new(spi)),
        })
    }

    pub fn channel(&self, channel: u8) -> Result<AdcChannel> {
        mcp3208_command(channel)?;
        Ok(AdcChannel {
            adc: self.clone(),
            channel,
        })
    }

    fn read(&self, channel: u8) -> Result<u16> {
        let tx = mcp3208_command(channel)?;
        let mut rx = [0u8; 3];
        self.spi
            .borrow()
            .transfer(&mut rx, &tx)
            .map_err(|e| HwError::Spi(e.to_string()))?;
        Ok(mcp3208_decode(rx))
    }
}

pub struct AdcChannel {
    adc: Mcp3208,
    channel: u8,
}

impl AnalogInput for AdcChannel {
    fn read_raw(&mut self) -> std::result::Result<u16, Box<dyn std::error::Error + Send + Sync>> {
        let raw = self.adc.read(self.channel)?;
        trace!(channel = self.channel, raw, "adc sample");
        Ok(raw)
    }
}

/// Open every Pi device the controller needs.
pub struct RpiDevices {
    pub servo: PwmServo,
    pub lamp: GpioLamp,
    pub button: GpioButton,
    pub speed_axis: AdcChannel,
    pub pan_axis: AdcChannel,
}

impl RpiDevices {
    pub fn open(
        servo_pwm_channel: u8,
        lamp_pin: u8,
        button_pin: u8,
        spi_bus: u8,
        speed_channel: u8,
        pan_channel: u8,
    ) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let adc = Mcp3208::new(spi_bus)?;
        Ok(Self {
            servo: PwmServo::new(servo_pwm_channel)?,
            lamp: GpioLamp::new(&gpio, lamp_pin)?,
            button: GpioButton::new(&gpio, button_pin)?,
            speed_axis: adc.channel(speed_channel)?,
            pan_axis: adc.channel(pan_channel)?,
        })
    }
}
