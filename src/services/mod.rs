//! Service layer for the detector
//!
//! Services encapsulate the threshold evaluation, per-session state and the
//! scan loop that ties sample sources to the display and haptics.

pub mod controls;
pub mod evaluator;
pub mod monitor;
pub mod session;

pub use controls::{
    install_interrupt_handler, parse_control, spawn_control_reader, Control, CONTROLS_HELP,
};
pub use evaluator::{Evaluation, ThresholdEvaluator, DEFAULT_COOLDOWN};
pub use monitor::{Event, Monitor, MonitorConfig};
pub use session::{DetectorSession, SessionStats, Update};
