//! magscan - magnetometer metal detector library
//!
//! This library turns a stream of tri-axial magnetometer samples into a
//! calibrated field magnitude and raises an alert with haptic feedback when
//! it exceeds a user-selected threshold.
//!
//! # Modules
//!
//! - [`cli`]: Command-line interface definitions
//! - [`commands`]: Command handlers
//! - [`config`]: Configuration system
//! - [`display`]: Live reading display and chart window
//! - [`domain`]: Domain models with validation
//! - [`error`]: Error types
//! - [`haptics`]: Haptic pulse triggers
//! - [`sensor`]: Magnetometer sources
//! - [`services`]: Detector session and scan loop
//! - [`stream`]: Latest-value reading stream

pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod domain;
pub mod error;
pub mod haptics;
pub mod sensor;
pub mod services;
pub mod stream;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use error::{AppError, Result};
