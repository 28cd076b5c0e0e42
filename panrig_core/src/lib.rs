#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Pan platform motion controller (hardware-agnostic).
//!
//! All device access goes through the `panrig_traits` seams, so the same
//! controller runs on the Raspberry Pi backends, on simulated devices and
//! under a test clock.
//!
//! ## Architecture
//!
//! - **State**: one `ControllerState` owned by the `Controller` (`state`)
//! - **Conditioning**: button click detection, joystick intents (`conditioner`)
//! - **Modes**: Standby / ManualPan / AutoScan transitions and entry actions (`machine`)
//! - **Engines**: sweep (`scan`) and joystick pan (`manual`)
//! - **Commands**: JSON request handling (`api`)
//! - **Loop**: the cooperative scheduler (`controller`)

pub mod api;
pub mod builder;
pub mod conditioner;
pub mod config;
pub mod controller;
mod conversions;
pub mod error;
pub mod hw_error;
pub mod machine;
pub mod manual;
pub mod mocks;
pub mod outputs;
pub mod scan;
pub mod state;

pub use builder::{ControllerBuilder, Missing, Set};
pub use config::{ButtonCfg, JoystickCfg, ManualCfg, ScanCfg, SchedulerCfg};
pub use controller::{Controller, TickReport};
pub use error::{BuildError, ControllerError, Result};
pub use state::{ControllerState, CycleBudget, Mode};
