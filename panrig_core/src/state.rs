//! Operating mode and the single state record shared by every engine.

use std::fmt;

pub const ANGLE_MIN: u8 = 0;
pub const ANGLE_CENTER: u8 = 90;
pub const ANGLE_MAX: u8 = 180;

/// Clamp any requested angle into `[ANGLE_MIN, ANGLE_MAX]`.
pub fn clamp_angle(requested: i64) -> u8 {
    u8::try_from(requested.clamp(i64::from(ANGLE_MIN), i64::from(ANGLE_MAX))).unwrap_or(ANGLE_CENTER)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Parked at center, lamp off.
    #[default]
    Standby,
    /// Autonomous sweep between the extremes.
    AutoScan,
    /// Joystick-driven pan.
    ManualPan,
}

impl Mode {
    /// Next mode in the button cycle: Standby -> ManualPan -> AutoScan -> Standby.
    pub fn next(self) -> Self {
        match self {
            Self::Standby => Self::ManualPan,
            Self::ManualPan => Self::AutoScan,
            Self::AutoScan => Self::Standby,
        }
    }

    /// Wire name used by the status endpoint.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Standby => "standby",
            Self::AutoScan => "auto",
            Self::ManualPan => "manual",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bounded scan request: stop after `target` completed sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleBudget {
    pub target: u32,
    pub completed: u32,
}

impl CycleBudget {
    pub fn new(target: u32) -> Self {
        Self {
            target,
            completed: 0,
        }
    }

    pub fn is_spent(&self) -> bool {
        self.completed >= self.target
    }
}

/// Everything the controller knows about itself. Mutated only by the mode
/// machine, the engines and the command API, all on the control thread.
#[derive(Debug, Clone)]
pub struct ControllerState {
    pub(crate) mode: Mode,
    pub(crate) current_angle: u8,
    pub(crate) scan_period_ms: u64,
    pub(crate) scan_forward: bool,
    pub(crate) last_scan_move_ms: u64,
    pub(crate) last_indicator_toggle_ms: u64,
    pub(crate) indicator_on: bool,
    pub(crate) scan_cycles: Option<CycleBudget>,
    pub(crate) commands_served: u64,
    pub(crate) start_ms: u64,
}

impl ControllerState {
    pub fn new(default_period_ms: u64) -> Self {
        Self {
            mode: Mode::Standby,
            current_angle: ANGLE_CENTER,
            scan_period_ms: default_period_ms,
            scan_forward: true,
            last_scan_move_ms: 0,
            last_indicator_toggle_ms: 0,
            indicator_on: false,
            scan_cycles: None,
            commands_served: 0,
            start_ms: 0,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Last angle successfully written to the actuator.
    pub fn current_angle(&self) -> u8 {
        self.current_angle
    }

    pub fn scan_period_ms(&self) -> u64 {
        self.scan_period_ms
    }

    /// True when the next sweep move heads to `ANGLE_MAX`.
    pub fn scan_forward(&self) -> bool {
        self.scan_forward
    }

    pub fn indicator_on(&self) -> bool {
        self.indicator_on
    }

    pub fn scan_cycles(&self) -> Option<CycleBudget> {
        self.scan_cycles
    }

    /// Mutating API commands accepted so far.
    pub fn commands_served(&self) -> u64 {
        self.commands_served
    }

    /// Milliseconds since `begin()` as of `now_ms`.
    pub fn uptime_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.start_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(-40, 0)]
    #[case(0, 0)]
    #[case(45, 45)]
    #[case(180, 180)]
    #[case(500, 180)]
    #[case(i64::MIN, 0)]
    #[case(i64::MAX, 180)]
    fn clamp_angle_cases(#[case] req: i64, #[case] want: u8) {
        assert_eq!(clamp_angle(req), want);
    }

    #[test]
    fn mode_cycle_returns_to_standby_after_three_steps() {
        let m = Mode::Standby;
        assert_eq!(m.next(), Mode::ManualPan);
        assert_eq!(m.next().next(), Mode::AutoScan);
        assert_eq!(m.next().next().next(), Mode::Standby);
    }

    #[test]
    fn fresh_state_is_parked() {
        let s = ControllerState::new(300);
        assert_eq!(s.mode(), Mode::Standby);
        assert_eq!(s.current_angle(), ANGLE_CENTER);
        assert!(!s.indicator_on());
        assert_eq!(s.scan_period_ms(), 300);
        assert_eq!(s.mode().to_string(), "standby");
    }
}
