//! The cooperative control loop.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use panrig_traits::{AnalogInput, Clock, DigitalInput, NetRequest, NetResponse, Network};
use tracing::{info, warn};

use crate::api;
use crate::conditioner::Conditioner;
use crate::config::{ManualCfg, ScanCfg, SchedulerCfg};
use crate::error::Result;
use crate::machine::{self, Trigger};
use crate::manual;
use crate::outputs::Outputs;
use crate::scan;
use crate::state::{ANGLE_CENTER, ANGLE_MAX, ANGLE_MIN, ControllerState, Mode};

const SELF_TEST_BLINKS: u32 = 3;
const SELF_TEST_BLINK: Duration = Duration::from_millis(200);
const SELF_TEST_PAUSE: Duration = Duration::from_millis(500);
const HALT_BLINK: Duration = Duration::from_millis(1000);

/// What one tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// A request was taken off the network and answered.
    pub served: bool,
    /// The button produced an accepted click.
    pub click: bool,
    /// Mode entered during this tick, by click or by an exhausted cycle budget.
    pub transition: Option<Mode>,
    /// Angle commanded by the active engine.
    pub moved_to: Option<u8>,
}

pub struct Controller {
    pub(crate) state: ControllerState,
    pub(crate) outputs: Outputs,
    pub(crate) button: Box<dyn DigitalInput>,
    pub(crate) speed_axis: Box<dyn AnalogInput>,
    pub(crate) pan_axis: Box<dyn AnalogInput>,
    pub(crate) conditioner: Conditioner,
    pub(crate) scan: ScanCfg,
    pub(crate) manual: ManualCfg,
    pub(crate) scheduler: SchedulerCfg,
    pub(crate) clock: Arc<dyn Clock + Send + Sync>,
    pub(crate) epoch: Instant,
    pub(crate) ticks: u64,
}

impl core::fmt::Debug for Controller {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.state.mode())
            .field("angle", &self.state.current_angle())
            .field("scan_period_ms", &self.state.scan_period_ms())
            .field("ticks", &self.ticks)
            .finish()
    }
}

impl Controller {
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Milliseconds since the controller epoch.
    pub fn now_ms(&self) -> u64 {
        self.clock.ms_since(self.epoch)
    }

    /// Ticks run so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Park the rig and start the uptime clock.
    pub fn begin(&mut self) -> Result<()> {
        self.epoch = self.clock.now();
        self.ticks = 0;
        self.conditioner.reset();
        self.state = ControllerState::new(self.scan.default_period_ms);
        let start = self.now_ms();
        self.state.start_ms = start;
        machine::on_enter(&mut self.state, &mut self.outputs, Mode::Standby, start)?;
        info!(angle = ANGLE_CENTER, "controller ready");
        Ok(())
    }

    /// Startup confirmation: three lamp blinks, then a full sweep back to center.
    pub fn self_test(&mut self) -> Result<()> {
        info!("self test");
        for _ in 0..SELF_TEST_BLINKS {
            self.outputs.lamp(&mut self.state, true)?;
            self.clock.sleep(SELF_TEST_BLINK);
            self.outputs.lamp(&mut self.state, false)?;
            self.clock.sleep(SELF_TEST_BLINK);
        }
        for angle in [ANGLE_MIN, ANGLE_MAX] {
            self.outputs.move_to(&mut self.state, angle)?;
            self.clock.sleep(SELF_TEST_PAUSE);
        }
        self.outputs.move_to(&mut self.state, ANGLE_CENTER)?;
        Ok(())
    }

    /// Blink the lamp every second until `shutdown` is raised or `max_toggles`
    /// toggles have happened. Used when the command server cannot start.
    pub fn halt(&mut self, shutdown: &AtomicBool, max_toggles: Option<u64>) -> Result<u64> {
        warn!("halted; blinking until shutdown");
        let mut toggles = 0u64;
        while !shutdown.load(Ordering::Relaxed) && max_toggles.is_none_or(|m| toggles < m) {
            let on = !self.state.indicator_on;
            self.outputs.lamp(&mut self.state, on)?;
            toggles += 1;
            self.clock.sleep(HALT_BLINK);
        }
        Ok(toggles)
    }

    /// Answer one request against the live state.
    pub fn handle_request(&mut self, req: &NetRequest, rssi: Option<i32>) -> NetResponse {
        let now = self.now_ms();
        api::handle(req, &mut self.state, &mut self.outputs, &self.scan, now, rssi)
    }

    /// One scheduler pass: request, button, click, engine, sleep.
    pub fn tick(&mut self, network: Option<&mut dyn Network>) -> Result<TickReport> {
        let now = self.now_ms();
        let mut report = TickReport::default();

        if let Some(net) = network {
            let rssi = net.signal_strength();
            let state = &mut self.state;
            let outputs = &mut self.outputs;
            let scan_cfg = &self.scan;
            let mut handler =
                |req: &NetRequest| api::handle(req, state, outputs, scan_cfg, now, rssi);
            match net.service_one(&mut handler) {
                Ok(served) => report.served = served,
                Err(e) => warn!(error = %e, "network service failed"),
            }
        }

        report.click = self
            .conditioner
            .poll_button(&mut *self.button, &*self.clock, now)?;
        if report.click {
            report.transition = machine::apply(&mut self.state, &mut self.outputs, Trigger::Click, now)?;
        }

        match self.state.mode {
            Mode::Standby => {}
            Mode::AutoScan => {
                let intent = self.conditioner.read_speed(&mut *self.speed_axis)?;
                scan::retune(&mut self.state, intent, &self.scan);
                let step = scan::step(&mut self.state, &mut self.outputs, &self.scan, now)?;
                report.moved_to = step.moved_to;
                if step.finished {
                    report.transition =
                        machine::apply(&mut self.state, &mut self.outputs, Trigger::CyclesDone, now)?;
                }
            }
            Mode::ManualPan => {
                let intent = self.conditioner.read_pan(&mut *self.pan_axis)?;
                report.moved_to = manual::step(
                    &mut self.state,
                    &mut self.outputs,
                    intent,
                    &self.manual,
                    &*self.clock,
                )?;
            }
        }

        self.clock.sleep(Duration::from_millis(self.scheduler.tick_ms));
        self.ticks += 1;
        Ok(report)
    }

    /// Tick until `shutdown` is raised or `max_ticks` ticks have run. Returns
    /// the number of ticks run by this call.
    pub fn run(
        &mut self,
        network: &mut dyn Network,
        shutdown: &AtomicBool,
        max_ticks: Option<u64>,
    ) -> Result<u64> {
        info!(tick_ms = self.scheduler.tick_ms, "control loop started");
        let mut ran = 0u64;
        while !shutdown.load(Ordering::Relaxed) && max_ticks.is_none_or(|m| ran < m) {
            self.tick(Some(&mut *network))?;
            ran += 1;
        }
        info!(ticks = ran, mode = %self.state.mode(), "control loop stopped");
        Ok(ran)
    }
}
