//! Scan loop monitor
//!
//! Owns the detector session and drives it from a single event channel fed
//! by the sample source callback and the interactive controls.

use crate::config::Config;
use crate::domain::{Reading, ScanState, Threshold};
use crate::error::{AppError, SensorError, ServiceError};
use crate::haptics::HapticManager;
use crate::sensor::{SampleSource, SourceEvent};
use crate::services::controls::Control;
use crate::services::evaluator::{ThresholdEvaluator, DEFAULT_COOLDOWN};
use crate::services::session::{DetectorSession, SessionStats};
use crate::stream::Publisher;

use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

/// Everything the monitor loop reacts to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Source(SourceEvent),
    Control(Control),
}

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Initial threshold
    pub threshold: Threshold,
    /// Step for the +/- controls
    pub threshold_step: f64,
    /// Minimum time between haptic pulses
    pub cooldown: Duration,
    /// Calibrate once the first sample arrives
    pub calibrate_on_start: bool,
    /// Stop after this many readings
    pub max_samples: Option<u64>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            threshold_step: 1.0,
            cooldown: DEFAULT_COOLDOWN,
            calibrate_on_start: false,
            max_samples: None,
        }
    }
}

impl MonitorConfig {
    /// Derive monitor settings from the application configuration
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        Ok(Self {
            threshold: config.detector.to_threshold()?,
            threshold_step: config.detector.threshold_step,
            cooldown: config.detector.cooldown(),
            calibrate_on_start: config.detector.calibrate_on_start,
            max_samples: None,
        })
    }
}

/// Scan loop monitor
pub struct Monitor {
    config: MonitorConfig,
    session: DetectorSession,
    haptics: HapticManager,
    publisher: Publisher<Reading>,
    events_tx: Option<Sender<Event>>,
    events_rx: Receiver<Event>,
    /// Sensor was unavailable at startup; controls still work
    degraded: bool,
    calibrated_on_start: bool,
}

impl Monitor {
    /// Create a new monitor with the given configuration
    pub fn new(
        config: MonitorConfig,
        haptics: HapticManager,
        publisher: Publisher<Reading>,
    ) -> Self {
        let evaluator = ThresholdEvaluator::new(config.cooldown);
        let session = DetectorSession::new(config.threshold, evaluator);
        let (events_tx, events_rx) = mpsc::channel();

        Self {
            config,
            session,
            haptics,
            publisher,
            events_tx: Some(events_tx),
            events_rx,
            degraded: false,
            calibrated_on_start: false,
        }
    }

    /// Sender for control events
    ///
    /// Must be taken before [`run`](Self::run). The loop ends when every
    /// sender is gone and the source has stopped.
    pub fn sender(&self) -> Option<Sender<Event>> {
        self.events_tx.clone()
    }

    /// Run the scan loop until quit, end of recording, sample limit or all
    /// event senders are dropped
    pub fn run<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
    ) -> Result<SessionStats, AppError> {
        let Some(events_tx) = self.events_tx.take() else {
            return Ok(self.session.stats());
        };

        // Kept only while the source can be resubscribed
        let resubscribe_tx = match self.subscribe(source, &events_tx) {
            Ok(()) => Some(events_tx),
            Err(SensorError::Unavailable(reason)) => {
                log::warn!("Sensor unavailable: {}", reason);
                eprintln!("No magnetometer data: {}", reason);
                self.degraded = true;
                None
            }
            Err(e) => return Err(e.into()),
        };

        let result = self.event_loop(source, resubscribe_tx.as_ref());
        source.unsubscribe();
        result?;

        log::info!("Scan finished after {} samples", self.session.stats().samples);
        Ok(self.session.stats())
    }

    fn event_loop<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
        events_tx: Option<&Sender<Event>>,
    ) -> Result<(), AppError> {
        while let Ok(event) = self.events_rx.recv() {
            match event {
                Event::Source(SourceEvent::Sample(sample)) => {
                    if let Some(update) = self.session.process_sample(sample, Instant::now()) {
                        self.publisher.publish(update.reading);
                        if update.trigger {
                            log::debug!("Alert at {:.2} µT", update.reading.adjusted);
                            self.haptics.pulse();
                        }
                        self.maybe_calibrate_on_start();
                        if self.limit_reached() {
                            log::info!("Sample limit reached");
                            return Ok(());
                        }
                    }
                }
                Event::Source(SourceEvent::Ended) => {
                    log::info!("Sample source finished");
                    return Ok(());
                }
                Event::Control(Control::Quit) => return Ok(()),
                Event::Control(Control::InputClosed) => {
                    // Nothing could ever resume the source
                    if !self.session.scan_state().is_scanning() {
                        log::info!("Controls closed while paused");
                        return Ok(());
                    }
                }
                Event::Control(control) => self.apply(control, source, events_tx)?,
            }
        }

        log::debug!("All event senders closed");
        Ok(())
    }

    /// Apply one control; rejected adjustments are reported, not fatal
    fn apply<S: SampleSource + ?Sized>(
        &mut self,
        control: Control,
        source: &mut S,
        events_tx: Option<&Sender<Event>>,
    ) -> Result<(), AppError> {
        let result = match control {
            Control::Calibrate => self.session.calibrate().map(|_| ()),
            Control::ThresholdUp => self
                .session
                .step_threshold(self.config.threshold_step)
                .map(|_| ()),
            Control::ThresholdDown => self
                .session
                .step_threshold(-self.config.threshold_step)
                .map(|_| ()),
            Control::SetThreshold(value) => self.session.set_threshold(value).map(|_| ()),
            Control::Toggle => {
                match self.session.toggle() {
                    ScanState::Paused => source.unsubscribe(),
                    ScanState::Scanning => self.resubscribe(source, events_tx)?,
                }
                Ok(())
            }
            Control::Foreground => {
                if self.session.on_foreground() {
                    self.resubscribe(source, events_tx)?;
                }
                Ok(())
            }
            Control::Quit | Control::InputClosed => Ok(()),
        };

        match result {
            Ok(()) => Ok(()),
            Err(ServiceError::Paused) => {
                eprintln!("Scanner is paused; resume with 'p' first");
                Ok(())
            }
            Err(ServiceError::Domain(e)) => {
                eprintln!("{}", e);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    fn subscribe<S: SampleSource + ?Sized>(
        &self,
        source: &mut S,
        events_tx: &Sender<Event>,
    ) -> Result<(), SensorError> {
        let tx = events_tx.clone();
        source.subscribe(Box::new(move |event| {
            // Receiver gone means the loop has exited
            let _ = tx.send(Event::Source(event));
        }))
    }

    fn resubscribe<S: SampleSource + ?Sized>(
        &mut self,
        source: &mut S,
        events_tx: Option<&Sender<Event>>,
    ) -> Result<(), ServiceError> {
        match events_tx {
            Some(tx) if !source.is_subscribed() => Ok(self.subscribe(source, tx)?),
            _ => Ok(()),
        }
    }

    fn maybe_calibrate_on_start(&mut self) {
        if self.config.calibrate_on_start && !self.calibrated_on_start {
            self.calibrated_on_start = true;
            if let Err(e) = self.session.calibrate() {
                log::warn!("Startup calibration failed: {}", e);
            }
        }
    }

    fn limit_reached(&self) -> bool {
        self.config
            .max_samples
            .is_some_and(|max| self.session.stats().samples >= max)
    }

    /// Get the detector session
    pub fn session(&self) -> &DetectorSession {
        &self.session
    }

    /// Readings the consumer never saw because a newer one replaced them
    pub fn skipped_frames(&self) -> u64 {
        self.publisher.dropped()
    }

    /// True if the sensor could not be opened
    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AlertState, SensorSample};
    use crate::mock::{MockSource, RecordingHaptic};
    use crate::sensor::ReplaySource;
    use crate::services::controls::interrupt_handler;
    use crate::stream;
    use std::sync::atomic::Ordering;
    use std::thread;

    fn monitor(threshold: f64) -> (Monitor, RecordingHaptic, stream::Subscriber<Reading>) {
        let haptic = RecordingHaptic::new();
        let mut haptics = HapticManager::new(Duration::from_millis(50));
        haptics.add_trigger(Box::new(haptic.clone()));
        let (publisher, subscriber) = stream::latest();

        let config = MonitorConfig {
            threshold: Threshold::new(threshold).unwrap(),
            ..MonitorConfig::default()
        };
        (Monitor::new(config, haptics, publisher), haptic, subscriber)
    }

    #[test]
    fn test_monitor_config_default() {
        let config = MonitorConfig::default();
        assert_eq!(config.cooldown, Duration::from_millis(500));
        assert!(!config.calibrate_on_start);
        assert!(config.max_samples.is_none());
    }

    #[test]
    fn test_monitor_config_from_config() {
        let mut config = Config::default();
        config.detector.threshold = 7.0;
        config.detector.cooldown_ms = 900;
        let mc = MonitorConfig::from_config(&config).unwrap();
        assert_eq!(mc.threshold.value(), 7.0);
        assert_eq!(mc.cooldown, Duration::from_millis(900));
    }

    #[test]
    fn test_run_processes_recording() {
        let (mut monitor, haptic, subscriber) = monitor(4.0);
        let mut source = MockSource::new(vec![
            SensorSample::new(3.0, 4.0, 0.0),
            SensorSample::new(1.0, 0.0, 0.0),
        ]);

        let stats = monitor.run(&mut source).unwrap();
        assert_eq!(stats.samples, 2);
        assert_eq!(stats.alerts, 1);
        // Samples arrive faster than the cooldown, so only one pulse
        assert_eq!(haptic.count(), 1);
        assert!(!source.is_subscribed());

        let latest = subscriber.try_take().unwrap();
        assert_eq!(latest.index, 1);
        assert_eq!(latest.state, AlertState::Idle);
        assert_eq!(subscriber.dropped(), 1);
    }

    #[test]
    fn test_run_stops_at_sample_limit() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        monitor.config.max_samples = Some(3);
        let mut source = MockSource::new(vec![SensorSample::new(0.0, 0.0, 1.0); 10]).keep_open();

        let stats = monitor.run(&mut source).unwrap();
        assert_eq!(stats.samples, 3);
    }

    #[test]
    fn test_calibrate_on_start() {
        let (mut monitor, haptic, subscriber) = monitor(4.0);
        monitor.config.calibrate_on_start = true;
        let mut source = MockSource::new(vec![SensorSample::new(30.0, 40.0, 0.0); 3]);

        monitor.run(&mut source).unwrap();
        assert_eq!(monitor.session().baseline().value(), 50.0);
        // The first reading is evaluated before calibration
        assert_eq!(haptic.count(), 1);

        let last = subscriber.try_take().unwrap();
        assert_eq!(last.adjusted, 0.0);
    }

    #[test]
    fn test_unavailable_sensor_degrades() {
        let (mut monitor, _haptic, subscriber) = monitor(4.0);
        let mut source = MockSource::unavailable();

        // No control sender taken, so the loop ends immediately
        let stats = monitor.run(&mut source).unwrap();
        assert!(monitor.is_degraded());
        assert_eq!(stats.samples, 0);
        assert!(subscriber.try_take().is_none());
    }

    #[test]
    fn test_controls_in_degraded_mode() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Control(Control::SetThreshold(9.0))).unwrap();
        tx.send(Event::Control(Control::Quit)).unwrap();

        let mut source = MockSource::unavailable();
        monitor.run(&mut source).unwrap();
        assert_eq!(monitor.session().threshold().value(), 9.0);
    }

    #[test]
    fn test_pause_and_resume_resubscribes() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();

        let mut source = MockSource::new(vec![SensorSample::new(1.0, 0.0, 0.0); 4])
            .with_batch(2)
            .keep_open();
        let calls = source.subscribe_calls();

        // Queued ahead of the samples delivered by the first subscribe,
        // which then arrive after Quit
        tx.send(Event::Control(Control::Toggle)).unwrap();
        tx.send(Event::Control(Control::Calibrate)).unwrap();
        tx.send(Event::Control(Control::Toggle)).unwrap();
        tx.send(Event::Control(Control::Quit)).unwrap();
        drop(tx);

        let stats = monitor.run(&mut source).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(monitor.session().scan_state(), ScanState::Scanning);
        // Calibrate while paused was rejected
        assert_eq!(monitor.session().baseline().value(), 0.0);
        assert_eq!(stats.samples, 0);
    }

    #[test]
    fn test_invalid_threshold_is_not_fatal() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Control(Control::SetThreshold(0.1))).unwrap();
        tx.send(Event::Control(Control::ThresholdUp)).unwrap();
        tx.send(Event::Control(Control::Quit)).unwrap();

        let mut source = MockSource::new(Vec::new()).keep_open();
        monitor.run(&mut source).unwrap();
        assert_eq!(monitor.session().threshold().value(), 5.0);
    }

    #[test]
    fn test_foreground_resumes_paused_scan() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Source(SourceEvent::Sample(SensorSample::new(1.0, 0.0, 0.0))))
            .unwrap();
        tx.send(Event::Control(Control::Toggle)).unwrap();
        tx.send(Event::Control(Control::Foreground)).unwrap();
        tx.send(Event::Control(Control::Quit)).unwrap();

        let mut source = MockSource::new(Vec::new()).keep_open();
        let calls = source.subscribe_calls();
        let stats = monitor.run(&mut source).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(monitor.session().scan_state(), ScanState::Scanning);
        assert_eq!(stats.samples, 1);
    }

    #[test]
    fn test_foreground_ignored_before_first_sample() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Control(Control::Toggle)).unwrap();
        tx.send(Event::Control(Control::Foreground)).unwrap();
        tx.send(Event::Control(Control::Quit)).unwrap();

        let mut source = MockSource::new(Vec::new()).keep_open();
        let calls = source.subscribe_calls();
        monitor.run(&mut source).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(monitor.session().scan_state(), ScanState::Paused);
    }

    #[test]
    fn test_input_closed_while_paused_ends_scan() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Control(Control::Toggle)).unwrap();
        tx.send(Event::Control(Control::InputClosed)).unwrap();

        // Keep a sender alive so only the closed input can end the loop
        let mut source = MockSource::new(Vec::new()).keep_open();
        monitor.run(&mut source).unwrap();

        assert_eq!(monitor.session().scan_state(), ScanState::Paused);
        assert!(!source.is_subscribed());
        drop(tx);
    }

    #[test]
    fn test_input_closed_while_scanning_keeps_running() {
        let (mut monitor, _haptic, _sub) = monitor(4.0);
        monitor.config.max_samples = Some(3);
        let tx = monitor.sender().unwrap();
        tx.send(Event::Control(Control::InputClosed)).unwrap();

        let mut source = MockSource::new(vec![SensorSample::new(0.0, 0.0, 1.0); 5]).keep_open();
        let stats = monitor.run(&mut source).unwrap();
        assert_eq!(stats.samples, 3);
        drop(tx);
    }

    #[test]
    fn test_interrupt_ends_live_scan() {
        let (mut monitor, _haptic, subscriber) = monitor(4.0);
        let mut on_interrupt = interrupt_handler(monitor.sender().unwrap());
        let mut source = ReplaySource::from_samples(
            vec![SensorSample::new(0.0, 0.0, 2.0)],
            Duration::from_millis(1),
            true,
        );

        let interrupter = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            on_interrupt();
        });

        monitor.run(&mut source).unwrap();
        interrupter.join().unwrap();

        assert!(!source.is_subscribed());
        assert!(subscriber.try_take().is_some());
    }
}
