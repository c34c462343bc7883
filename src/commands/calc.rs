//! One-shot calculation commands
//!
//! Expose the magnitude and threshold evaluation without a sensor.

use crate::cli::args::{EvaluateArgs, OutputFormat};
use crate::cli::output::{print_output, EvaluationReport, MagnitudeReport};
use crate::domain::{Baseline, Magnitude, SensorSample, Threshold};
use crate::error::{DomainError, Result};
use crate::services::ThresholdEvaluator;

use std::time::Instant;

/// Execute the magnitude command
pub fn run_magnitude(x: f32, y: f32, z: f32, format: OutputFormat) -> Result<()> {
    let report = magnitude_report(SensorSample::new(x, y, z))?;
    print_output(&report, format)?;
    Ok(())
}

/// Execute the evaluate command
pub fn run_evaluate(args: &EvaluateArgs, format: OutputFormat) -> Result<()> {
    let report = evaluate(args)?;
    print_output(&report, format)?;
    Ok(())
}

pub fn magnitude_report(sample: SensorSample) -> Result<MagnitudeReport> {
    let magnitude = sample.magnitude().as_microtesla();
    if !magnitude.is_finite() {
        return Err(
            DomainError::InvalidValue(format!("magnitude of {:?} is not finite", sample)).into(),
        );
    }

    Ok(MagnitudeReport {
        x: sample.x,
        y: sample.y,
        z: sample.z,
        magnitude,
    })
}

/// Evaluate one magnitude with no prior alert
pub fn evaluate(args: &EvaluateArgs) -> Result<EvaluationReport> {
    if !args.magnitude.is_finite() || args.magnitude < 0.0 {
        return Err(DomainError::InvalidValue(format!(
            "magnitude {} must be a non-negative number",
            args.magnitude
        ))
        .into());
    }
    if !args.baseline.is_finite() || args.baseline < 0.0 {
        return Err(DomainError::InvalidValue(format!(
            "baseline {} must be a non-negative number",
            args.baseline
        ))
        .into());
    }
    let threshold = Threshold::new(args.threshold)?;
    let baseline = Baseline::new(args.baseline);

    let result = ThresholdEvaluator::default().evaluate(
        Magnitude::new(args.magnitude),
        baseline,
        threshold,
        None,
        Instant::now(),
    );

    Ok(EvaluationReport {
        magnitude: args.magnitude,
        baseline: baseline.value(),
        threshold: threshold.value(),
        adjusted: result.adjusted,
        state: result.state,
    })
}
