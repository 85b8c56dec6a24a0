use csv::{ReaderBuilder, Trim, Writer};
use log::info;
use ndarray::{ArrayD, IxDyn};
use simplelog::*;
use std::fs::File;
use std::path::Path;

use crate::error::{SplineError, SplineResult};

/// parse loglevel name as it is written in task documents
pub fn parse_loglevel(name: &str) -> SplineResult<LevelFilter> {
    let level = match name.to_lowercase().as_str() {
        "off" | "none" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        other => {
            return Err(SplineError::Config(format!(
                "loglevel must be off, error, warn, info, debug or trace, got '{}'",
                other
            )));
        }
    };
    Ok(level)
}

/// Installs the global logger: terminal output plus, optionally, a log file.
/// The logger can be installed only once per process; the second call returns a Config error.
pub fn init_logger(level: LevelFilter, logfile: Option<&Path>) -> SplineResult<()> {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = logfile {
        let file = File::create(path)?;
        loggers.push(WriteLogger::new(level, Config::default(), file));
    }
    CombinedLogger::init(loggers)
        .map_err(|e| SplineError::Config(format!("logger is already installed: {}", e)))
}

/// Writes the coefficient tensor as a flat row-major list, one value per line.
/// Values are written in the shortest form that reads back to the same f64.
pub fn save_coefficients(path: &Path, coefficients: &ArrayD<f64>) -> SplineResult<()> {
    let mut writer = Writer::from_path(path)?;
    // iter() walks the logical (row-major) order whatever the memory layout is
    for value in coefficients.iter() {
        writer.write_record(&[format!("{:e}", value)])?;
    }
    writer.flush()?;
    info!(
        "{} spline coefficients of shape {:?} saved to {}",
        coefficients.len(),
        coefficients.shape(),
        path.display()
    );
    Ok(())
}

/// Reads a flat row-major coefficient file and reshapes it to `shape`.
/// Values may be separated by new lines, commas or whitespace; lines starting with # are skipped.
pub fn load_coefficients(path: &Path, shape: &[usize]) -> SplineResult<ArrayD<f64>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .comment(Some(b'#'))
        .trim(Trim::All)
        .from_path(path)?;

    let mut values = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map(|p| p.line() as usize).unwrap_or(0);
        for field in record.iter() {
            for token in field.split_whitespace() {
                let value = token.parse::<f64>().map_err(|_| SplineError::Parse {
                    line,
                    value: token.to_string(),
                })?;
                values.push(value);
            }
        }
    }

    let expected: usize = shape.iter().product();
    if values.len() != expected {
        return Err(SplineError::ShapeMismatch {
            expected: vec![expected],
            found: vec![values.len()],
        });
    }
    ArrayD::from_shape_vec(IxDyn(shape), values).map_err(|_| SplineError::ShapeMismatch {
        expected: shape.to_vec(),
        found: vec![expected],
    })
}
