//! Type-state builder for `Controller`.
//!
//! The builder enforces at compile time that the actuator, the lamp and the
//! joystick inputs are provided before `build()` is available. `try_build()`
//! is always available for dynamic checks.

use std::marker::PhantomData;
use std::sync::Arc;

use panrig_traits::clock::{Clock, MonotonicClock};
use panrig_traits::{Actuator, AnalogInput, DigitalInput, Indicator};

use crate::conditioner::Conditioner;
use crate::config::{ButtonCfg, JoystickCfg, ManualCfg, ScanCfg, SchedulerCfg};
use crate::controller::Controller;
use crate::error::{BuildError, Result};
use crate::outputs::Outputs;
use crate::state::ControllerState;

// ── Type-state markers ───────────────────────────────────────────────────────

pub struct Missing;
pub struct Set;

struct Inputs {
    button: Box<dyn DigitalInput>,
    speed_axis: Box<dyn AnalogInput>,
    pan_axis: Box<dyn AnalogInput>,
}

/// Builder for `Controller`. Configuration is validated on `build()`.
pub struct ControllerBuilder<A, L, I> {
    actuator: Option<Box<dyn Actuator>>,
    indicator: Option<Box<dyn Indicator>>,
    inputs: Option<Inputs>,
    button: Option<ButtonCfg>,
    joystick: Option<JoystickCfg>,
    scan: Option<ScanCfg>,
    manual: Option<ManualCfg>,
    scheduler: Option<SchedulerCfg>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    _a: PhantomData<A>,
    _l: PhantomData<L>,
    _i: PhantomData<I>,
}

impl Default for ControllerBuilder<Missing, Missing, Missing> {
    fn default() -> Self {
        Self {
            actuator: None,
            indicator: None,
            inputs: None,
            button: None,
            joystick: None,
            scan: None,
            manual: None,
            scheduler: None,
            clock: None,
            _a: PhantomData,
            _l: PhantomData,
            _i: PhantomData,
        }
    }
}

impl Controller {
    /// Start building a Controller.
    pub fn builder() -> ControllerBuilder<Missing, Missing, Missing> {
        ControllerBuilder::default()
    }
}

fn invalid(msg: &'static str) -> eyre::Report {
    eyre::Report::new(BuildError::InvalidConfig(msg))
}

/// Validate configuration and construct the controller.
///
/// Shared by `try_build()` and `build()`; the config crate runs the same
/// checks on file input, this guards programmatic construction.
#[allow(clippy::too_many_arguments)]
fn validate_and_build(
    actuator: Box<dyn Actuator>,
    indicator: Box<dyn Indicator>,
    inputs: Inputs,
    button: ButtonCfg,
    joystick: JoystickCfg,
    scan: ScanCfg,
    manual: ManualCfg,
    scheduler: SchedulerCfg,
    clock: Option<Box<dyn Clock + Send + Sync>>,
) -> Result<Controller> {
    if button.debounce_ms == 0 {
        return Err(invalid("debounce_ms must be >= 1"));
    }
    if button.settle_ms > panrig_config::MAX_SETTLE_MS {
        return Err(invalid("settle_ms exceeds the settle budget"));
    }
    if joystick.speed_low > joystick.speed_high {
        return Err(invalid("speed_low must be <= speed_high"));
    }
    if joystick.pan_deadzone == 0 || joystick.pan_deadzone >= joystick.center {
        return Err(invalid("pan_deadzone must be in 1..center"));
    }
    if scan.min_period_ms == 0 || scan.min_period_ms > scan.max_period_ms {
        return Err(invalid("scan period bounds must satisfy 1 <= min <= max"));
    }
    if !(scan.min_period_ms..=scan.max_period_ms).contains(&scan.default_period_ms) {
        return Err(invalid("default scan period outside bounds"));
    }
    if scan.period_step_ms == 0 {
        return Err(invalid("period_step_ms must be >= 1"));
    }
    if scan.blink_ms == 0 {
        return Err(invalid("blink_ms must be >= 1"));
    }
    if manual.step_delay_ms > panrig_config::MAX_BLOCKING_MS
        || scheduler.tick_ms > panrig_config::MAX_BLOCKING_MS
    {
        return Err(invalid("blocking pause exceeds the tick budget"));
    }

    let clock: Arc<dyn Clock + Send + Sync> = match clock {
        Some(b) => Arc::from(b),
        None => Arc::new(MonotonicClock::new()),
    };
    let epoch = clock.now();

    Ok(Controller {
        state: ControllerState::new(scan.default_period_ms),
        outputs: Outputs::new(actuator, indicator),
        button: inputs.button,
        speed_axis: inputs.speed_axis,
        pan_axis: inputs.pan_axis,
        conditioner: Conditioner::new(button, joystick),
        scan,
        manual,
        scheduler,
        clock,
        epoch,
        ticks: 0,
    })
}

impl<A, L, I> ControllerBuilder<A, L, I> {
    /// Fallible build available in any type-state; reports the first missing piece.
    pub fn try_build(self) -> Result<Controller> {
        let actuator = self
            .actuator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingActuator))?;
        let indicator = self
            .indicator
            .ok_or_else(|| eyre::Report::new(BuildError::MissingIndicator))?;
        let inputs = self
            .inputs
            .ok_or_else(|| eyre::Report::new(BuildError::MissingInputs))?;

        validate_and_build(
            actuator,
            indicator,
            inputs,
            self.button.unwrap_or_default(),
            self.joystick.unwrap_or_default(),
            self.scan.unwrap_or_default(),
            self.manual.unwrap_or_default(),
            self.scheduler.unwrap_or_default(),
            self.clock,
        )
    }
}

/// Chainable setters that do not affect type-state.
impl<A, L, I> ControllerBuilder<A, L, I> {
    pub fn with_button(mut self, button: ButtonCfg) -> Self {
        self.button = Some(button);
        self
    }
    pub fn with_joystick(mut self, joystick: JoystickCfg) -> Self {
        self.joystick = Some(joystick);
        self
    }
    pub fn with_scan(mut self, scan: ScanCfg) -> Self {
        self.scan = Some(scan);
        self
    }
    pub fn with_manual(mut self, manual: ManualCfg) -> Self {
        self.manual = Some(manual);
        self
    }
    pub fn with_scheduler(mut self, scheduler: SchedulerCfg) -> Self {
        self.scheduler = Some(scheduler);
        self
    }
    /// Take every runtime section from a loaded config file.
    pub fn with_config(self, cfg: &panrig_config::Config) -> Self {
        self.with_button((&cfg.button).into())
            .with_joystick((&cfg.joystick).into())
            .with_scan((&cfg.scan).into())
            .with_manual((&cfg.manual).into())
            .with_scheduler((&cfg.scheduler).into())
    }
    /// Provide a custom clock implementation; defaults to `MonotonicClock` when not provided.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }
}

// Setters that advance type-state
impl<L, I> ControllerBuilder<Missing, L, I> {
    pub fn with_actuator(self, actuator: impl Actuator + 'static) -> ControllerBuilder<Set, L, I> {
        ControllerBuilder {
            actuator: Some(Box::new(actuator)),
            indicator: self.indicator,
            inputs: self.inputs,
            button: self.button,
            joystick: self.joystick,
            scan: self.scan,
            manual: self.manual,
            scheduler: self.scheduler,
            clock: self.clock,
            _a: PhantomData,
            _l: PhantomData,
            _i: PhantomData,
        }
    }
}

impl<A, I> ControllerBuilder<A, Missing, I> {
    pub fn with_indicator(
        self,
        indicator: impl Indicator + 'static,
    ) -> ControllerBuilder<A, Set, I> {
        ControllerBuilder {
            actuator: self.actuator,
            indicator: Some(Box::new(indicator)),
            inputs: self.inputs,
            button: self.button,
            joystick: self.joystick,
            scan: self.scan,
            manual: self.manual,
            scheduler: self.scheduler,
            clock: self.clock,
            _a: PhantomData,
            _l: PhantomData,
            _i: PhantomData,
        }
    }
}

impl<A, L> ControllerBuilder<A, L, Missing> {
    /// Push button plus the speed (X) and pan (Y) joystick axes.
    pub fn with_inputs(
        self,
        button: impl DigitalInput + 'static,
        speed_axis: impl AnalogInput + 'static,
        pan_axis: impl AnalogInput + 'static,
    ) -> ControllerBuilder<A, L, Set> {
        ControllerBuilder {
            actuator: self.actuator,
            indicator: self.indicator,
            inputs: Some(Inputs {
                button: Box::new(button),
                speed_axis: Box::new(speed_axis),
                pan_axis: Box::new(pan_axis),
            }),
            button: self.button,
            joystick: self.joystick,
            scan: self.scan,
            manual: self.manual,
            scheduler: self.scheduler,
            clock: self.clock,
            _a: PhantomData,
            _l: PhantomData,
            _i: PhantomData,
        }
    }
}

impl ControllerBuilder<Set, Set, Set> {
    /// Validate and build. Only available once every device is set.
    pub fn build(self) -> Result<Controller> {
        self.try_build()
    }
}
