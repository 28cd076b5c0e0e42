//! Input conditioning: click detection on the push button and intent
//! classification for the two joystick axes.

use std::time::Duration;

use eyre::WrapErr;
use panrig_traits::{AnalogInput, Clock, DigitalInput, Level};
use tracing::{debug, trace};

use crate::config::{ButtonCfg, JoystickCfg, ScanCfg};
use crate::error::Result;
use crate::hw_error::map_hw_error;

/// Speed-axis intent while scanning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeedIntent {
    /// Shorten the scan period.
    Faster,
    /// Lengthen the scan period.
    Slower,
    Hold,
}

/// Pan-axis intent in manual mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanIntent {
    TowardMin,
    TowardMax,
    Hold,
}

pub fn speed_intent(raw: u16, cfg: &JoystickCfg) -> SpeedIntent {
    if raw < cfg.speed_low {
        SpeedIntent::Faster
    } else if raw > cfg.speed_high {
        SpeedIntent::Slower
    } else {
        SpeedIntent::Hold
    }
}

pub fn pan_intent(raw: u16, cfg: &JoystickCfg) -> PanIntent {
    let raw = i32::from(raw);
    let center = i32::from(cfg.center);
    let dz = i32::from(cfg.pan_deadzone);
    if raw < center - dz {
        PanIntent::TowardMin
    } else if raw > center + dz {
        PanIntent::TowardMax
    } else {
        PanIntent::Hold
    }
}

/// Apply one speed step to `period`, keeping it inside the configured bounds.
pub fn adjust_period(period: u64, intent: SpeedIntent, cfg: &ScanCfg) -> u64 {
    match intent {
        SpeedIntent::Faster => period
            .saturating_sub(cfg.period_step_ms)
            .max(cfg.min_period_ms),
        SpeedIntent::Slower => period
            .saturating_add(cfg.period_step_ms)
            .min(cfg.max_period_ms),
        SpeedIntent::Hold => period,
    }
}

/// Falling-edge click detector over a pulled-up button line.
///
/// Each read takes two samples; when they disagree the previous stable level
/// is kept. A press is accepted only if at least `debounce_ms` passed since
/// the last accepted press.
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    stable: Level,
    last_click_ms: Option<u64>,
    debounce_ms: u64,
}

impl ButtonDebouncer {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            stable: Level::High,
            last_click_ms: None,
            debounce_ms,
        }
    }

    /// Feed one double-sampled read taken at `now_ms`. Returns true on an accepted click.
    pub fn update(&mut self, first: Level, second: Level, now_ms: u64) -> bool {
        if first != second {
            trace!(?first, ?second, "button samples disagree; keeping previous level");
            return false;
        }
        let previous = std::mem::replace(&mut self.stable, second);
        if !(previous == Level::High && second == Level::Low) {
            return false;
        }
        let spaced = self
            .last_click_ms
            .is_none_or(|t| now_ms.saturating_sub(t) >= self.debounce_ms);
        if spaced {
            self.last_click_ms = Some(now_ms);
        } else {
            debug!(now_ms, "click ignored inside debounce window");
        }
        spaced
    }

    /// Last accepted level of the line.
    pub fn stable(&self) -> Level {
        self.stable
    }

    pub fn reset(&mut self) {
        self.stable = Level::High;
        self.last_click_ms = None;
    }
}

/// Reads the physical inputs and turns them into clicks and intents.
#[derive(Debug, Clone)]
pub struct Conditioner {
    debouncer: ButtonDebouncer,
    settle: Duration,
    joystick: JoystickCfg,
}

impl Conditioner {
    pub fn new(button: ButtonCfg, joystick: JoystickCfg) -> Self {
        Self {
            debouncer: ButtonDebouncer::new(button.debounce_ms),
            settle: Duration::from_millis(button.settle_ms),
            joystick,
        }
    }

    /// Sample the button twice, `settle_ms` apart, and report an accepted click.
    pub fn poll_button(
        &mut self,
        button: &mut dyn DigitalInput,
        clock: &dyn Clock,
        now_ms: u64,
    ) -> Result<bool> {
        let first = read_level(button)?;
        clock.sleep(self.settle);
        let second = read_level(button)?;
        Ok(self.debouncer.update(first, second, now_ms))
    }

    pub fn read_speed(&self, axis: &mut dyn AnalogInput) -> Result<SpeedIntent> {
        let raw = read_raw(axis).wrap_err("speed axis")?;
        Ok(speed_intent(raw, &self.joystick))
    }

    pub fn read_pan(&self, axis: &mut dyn AnalogInput) -> Result<PanIntent> {
        let raw = read_raw(axis).wrap_err("pan axis")?;
        Ok(pan_intent(raw, &self.joystick))
    }

    pub fn reset(&mut self) {
        self.debouncer.reset();
    }
}

fn read_level(button: &mut dyn DigitalInput) -> Result<Level> {
    button
        .read_level()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err("button read")
}

fn read_raw(axis: &mut dyn AnalogInput) -> Result<u16> {
    axis.read_raw()
        .map_err(|e| eyre::Report::new(map_hw_error(&*e)))
        .wrap_err("adc read")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, SpeedIntent::Faster)]
    #[case(1799, SpeedIntent::Faster)]
    #[case(1800, SpeedIntent::Hold)]
    #[case(1850, SpeedIntent::Hold)]
    #[case(1900, SpeedIntent::Hold)]
    #[case(1901, SpeedIntent::Slower)]
    #[case(4095, SpeedIntent::Slower)]
    fn speed_thresholds(#[case] raw: u16, #[case] want: SpeedIntent) {
        assert_eq!(speed_intent(raw, &JoystickCfg::default()), want);
    }

    #[rstest]
    #[case(0, PanIntent::TowardMin)]
    #[case(1747, PanIntent::TowardMin)]
    #[case(1748, PanIntent::Hold)]
    #[case(2048, PanIntent::Hold)]
    #[case(2348, PanIntent::Hold)]
    #[case(2349, PanIntent::TowardMax)]
    #[case(4095, PanIntent::TowardMax)]
    fn pan_deadzone(#[case] raw: u16, #[case] want: PanIntent) {
        assert_eq!(pan_intent(raw, &JoystickCfg::default()), want);
    }

    #[test]
    fn adjust_period_saturates_at_bounds() {
        let cfg = ScanCfg::default();
        assert_eq!(adjust_period(300, SpeedIntent::Faster, &cfg), 250);
        assert_eq!(adjust_period(120, SpeedIntent::Faster, &cfg), 100);
        assert_eq!(adjust_period(480, SpeedIntent::Slower, &cfg), 500);
        assert_eq!(adjust_period(500, SpeedIntent::Slower, &cfg), 500);
        assert_eq!(adjust_period(300, SpeedIntent::Hold, &cfg), 300);
    }

    #[test]
    fn first_press_is_accepted_and_hold_is_not_repeated() {
        let mut d = ButtonDebouncer::new(300);
        assert!(d.update(Level::Low, Level::Low, 5));
        assert!(!d.update(Level::Low, Level::Low, 900));
        assert_eq!(d.stable(), Level::Low);
    }

    #[test]
    fn presses_inside_the_window_are_dropped() {
        let mut d = ButtonDebouncer::new(300);
        assert!(d.update(Level::Low, Level::Low, 1000));
        assert!(!d.update(Level::High, Level::High, 1100));
        assert!(!d.update(Level::Low, Level::Low, 1200));
        assert!(!d.update(Level::High, Level::High, 1250));
        assert!(d.update(Level::Low, Level::Low, 1300));
    }

    #[test]
    fn disagreeing_samples_keep_previous_level() {
        let mut d = ButtonDebouncer::new(300);
        assert!(!d.update(Level::Low, Level::High, 10));
        assert!(!d.update(Level::High, Level::Low, 20));
        assert_eq!(d.stable(), Level::High);
    }
}
