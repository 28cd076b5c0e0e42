use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("pwm error: {0}")]
    Pwm(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("adc channel {0} out of range (0..=7)")]
    AdcChannel(u8),
    #[error("angle {0} out of range (0..=180)")]
    AngleRange(u8),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
