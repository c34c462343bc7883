//! Haptic feedback
//!
//! Fire-and-forget pulse triggers. Failures are logged and ignored; a
//! missing vibrator never interrupts scanning.

use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::thread;
use std::time::Duration;

/// Default pulse length
pub const DEFAULT_PULSE: Duration = Duration::from_millis(100);

/// A way to produce a short vibration
pub trait HapticTrigger: Send {
    /// Request one pulse of roughly `duration`
    fn pulse(&self, duration: Duration) -> io::Result<()>;

    /// Channel name for identification
    fn name(&self) -> &str;
}

/// Terminal bell on stderr
pub struct TerminalBell;

impl HapticTrigger for TerminalBell {
    fn pulse(&self, _duration: Duration) -> io::Result<()> {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        handle.write_all(b"\x07")?;
        handle.flush()
    }

    fn name(&self) -> &str {
        "bell"
    }
}

/// Runs an external command per pulse, e.g. `termux-vibrate -d {ms}`
///
/// `{ms}` in any argument is replaced by the pulse length in milliseconds.
/// The command runs on a detached thread so the caller never waits.
pub struct CommandHaptic {
    program: String,
    args: Vec<String>,
}

impl CommandHaptic {
    /// Create from a program and its arguments
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Split a command line on whitespace
    ///
    /// Returns `None` for an empty command.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self::new(program, parts.collect()))
    }

    fn expanded_args(&self, duration: Duration) -> Vec<String> {
        let ms = duration.as_millis().to_string();
        self.args.iter().map(|a| a.replace("{ms}", &ms)).collect()
    }
}

impl HapticTrigger for CommandHaptic {
    fn pulse(&self, duration: Duration) -> io::Result<()> {
        let mut child = Command::new(&self.program)
            .args(self.expanded_args(duration))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        let program = self.program.clone();
        thread::spawn(move || match child.wait() {
            Ok(status) if !status.success() => {
                log::debug!("Haptic command {} exited with {}", program, status)
            }
            Err(e) => log::debug!("Haptic command {} failed: {}", program, e),
            _ => {}
        });

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}

/// Dispatches pulses to every configured trigger
pub struct HapticManager {
    triggers: Vec<Box<dyn HapticTrigger>>,
    pulse: Duration,
}

impl HapticManager {
    /// Create a manager with no triggers
    pub fn new(pulse: Duration) -> Self {
        Self {
            triggers: Vec::new(),
            pulse,
        }
    }

    /// Add a trigger
    pub fn add_trigger(&mut self, trigger: Box<dyn HapticTrigger>) {
        self.triggers.push(trigger);
    }

    /// Pulse every trigger, ignoring failures
    pub fn pulse(&self) {
        for trigger in &self.triggers {
            if let Err(e) = trigger.pulse(self.pulse) {
                log::debug!("Haptic pulse via {} failed: {}", trigger.name(), e);
            }
        }
    }

    /// Get number of active triggers
    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }
}

impl Default for HapticManager {
    fn default() -> Self {
        let mut manager = Self::new(DEFAULT_PULSE);
        manager.add_trigger(Box::new(TerminalBell));
        manager
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::RecordingHaptic;

    struct FailingHaptic;

    impl HapticTrigger for FailingHaptic {
        fn pulse(&self, _duration: Duration) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::NotFound, "no vibrator"))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    #[test]
    fn test_manager_default_has_bell() {
        let manager = HapticManager::default();
        assert_eq!(manager.trigger_count(), 1);
    }

    #[test]
    fn test_manager_pulses_all() {
        let a = RecordingHaptic::new();
        let b = RecordingHaptic::new();
        let mut manager = HapticManager::new(Duration::from_millis(40));
        manager.add_trigger(Box::new(a.clone()));
        manager.add_trigger(Box::new(b.clone()));

        manager.pulse();
        manager.pulse();

        assert_eq!(a.count(), 2);
        assert_eq!(b.count(), 2);
        assert_eq!(a.last_duration(), Some(Duration::from_millis(40)));
    }

    #[test]
    fn test_failure_does_not_stop_other_triggers() {
        let recorder = RecordingHaptic::new();
        let mut manager = HapticManager::new(DEFAULT_PULSE);
        manager.add_trigger(Box::new(FailingHaptic));
        manager.add_trigger(Box::new(recorder.clone()));

        manager.pulse();
        assert_eq!(recorder.count(), 1);
    }

    #[test]
    fn test_command_from_line() {
        let cmd = CommandHaptic::from_command_line("termux-vibrate -d {ms}").unwrap();
        assert_eq!(cmd.name(), "termux-vibrate");
        assert_eq!(
            cmd.expanded_args(Duration::from_millis(150)),
            vec!["-d".to_string(), "150".to_string()]
        );
        assert!(CommandHaptic::from_command_line("   ").is_none());
    }

    #[test]
    fn test_command_missing_program_errors() {
        let cmd = CommandHaptic::new("/nonexistent/vibrate", Vec::new());
        assert!(cmd.pulse(DEFAULT_PULSE).is_err());
    }
}
