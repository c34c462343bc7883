//! Interactive controls
//!
//! Line-based commands read from a terminal and forwarded to the monitor.

use crate::services::monitor::Event;

use std::io::BufRead;
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};

/// User actions accepted while scanning
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    /// Use the current magnitude as baseline
    Calibrate,
    /// Raise the threshold by one step
    ThresholdUp,
    /// Lower the threshold by one step
    ThresholdDown,
    /// Set an exact threshold
    SetThreshold(f64),
    /// Flip scanning/paused
    Toggle,
    /// Host view returned to the foreground
    Foreground,
    Quit,
    /// Control input reached EOF; never parsed from a line
    InputClosed,
}

/// Help text for the interactive prompt
pub const CONTROLS_HELP: &str =
    "controls: c = calibrate, +/- = threshold step, t <value> = set threshold, p = pause/resume, q = quit";

/// Parse one input line
///
/// Returns `Err` with a user-facing message for unrecognised input.
pub fn parse_control(line: &str) -> Result<Option<Control>, String> {
    let line = line.trim();
    let mut parts = line.split_whitespace();

    let Some(cmd) = parts.next() else {
        return Ok(None);
    };

    let control = match cmd {
        "c" | "calibrate" => Control::Calibrate,
        "+" | "up" => Control::ThresholdUp,
        "-" | "down" => Control::ThresholdDown,
        "p" | "pause" | "resume" | "toggle" => Control::Toggle,
        "f" | "foreground" => Control::Foreground,
        "q" | "quit" | "exit" => Control::Quit,
        "t" | "threshold" => {
            let value = parts
                .next()
                .ok_or_else(|| "threshold needs a value".to_string())?;
            let value = value
                .parse::<f64>()
                .map_err(|_| format!("'{}' is not a number", value))?;
            Control::SetThreshold(value)
        }
        other => return Err(format!("unknown command '{}'", other)),
    };

    Ok(Some(control))
}

/// Forward parsed controls from `reader` until EOF or `Quit`
///
/// EOF is reported as [`Control::InputClosed`] so a paused scan can end.
pub fn spawn_control_reader<R>(
    reader: R,
    events: Sender<Event>,
) -> std::io::Result<JoinHandle<()>>
where
    R: BufRead + Send + 'static,
{
    thread::Builder::new()
        .name("magscan-controls".to_string())
        .spawn(move || {
            for line in reader.lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        log::debug!("Control input closed: {}", e);
                        break;
                    }
                };

                match parse_control(&line) {
                    Ok(Some(control)) => {
                        let sent = events.send(Event::Control(control)).is_ok();
                        if !sent || control == Control::Quit {
                            return;
                        }
                    }
                    Ok(None) => {}
                    Err(msg) => {
                        eprintln!("{}", msg);
                        eprintln!("{}", CONTROLS_HELP);
                    }
                }
            }

            let _ = events.send(Event::Control(Control::InputClosed));
        })
}

/// Build the Ctrl-C handler that asks the monitor to quit
///
/// Exits with status 130 when the monitor is already gone.
pub fn interrupt_handler(events: Sender<Event>) -> impl FnMut() + Send + 'static {
    move || {
        log::info!("Interrupted, stopping scan");
        if events.send(Event::Control(Control::Quit)).is_err() {
            std::process::exit(130);
        }
    }
}

/// Route Ctrl-C to the monitor as [`Control::Quit`]
///
/// Only one handler can be installed per process.
pub fn install_interrupt_handler(events: Sender<Event>) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(interrupt_handler(events))
}
