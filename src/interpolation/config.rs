//! Settings of the interpolant read from a task document:
//! ```text
//! solver
//! method: banded
//! parallel: true
//! validation
//! min_points: 4
//! condition_threshold: 1e12
//! logging
//! loglevel: info
//! logfile: spline.log
//! axes
//! x: 0.1, 0.2, 0.3, 0.4
//! y: -1, 0, 1, 2
//! ```
//! The order of the keys of the `axes` section is the order of the interpolant axes.
use simplelog::LevelFilter;
use std::path::PathBuf;

use crate::Utils::logger::{init_logger, parse_loglevel};
use crate::Utils::task_parser::{KeyValues, Value, parse_document};
use crate::error::{SplineError, SplineResult};
use crate::interpolation::raw_array::RawArray;
use crate::interpolation::spline_basis::MIN_POINTS;
use crate::somelinalg::LUsolver::SolverMethod;

#[derive(Debug, Clone, PartialEq)]
pub struct SplineConfig {
    /// factorization used for the collocation matrices
    pub method: SolverMethod,
    /// batch solves and multi-point evaluation run on the rayon pool
    pub parallel: bool,
    /// minimal number of coordinates on an axis, never less than 4
    pub min_points: usize,
    /// matrices with a larger 2-norm condition number are reported with a warning
    pub condition_threshold: f64,
    pub loglevel: LevelFilter,
    pub logfile: Option<PathBuf>,
}

impl Default for SplineConfig {
    fn default() -> Self {
        SplineConfig {
            method: SolverMethod::Dense,
            parallel: true,
            min_points: MIN_POINTS,
            condition_threshold: 1e12,
            loglevel: LevelFilter::Info,
            logfile: None,
        }
    }
}

/// Settings together with the named coordinate arrays found in the document
#[derive(Debug, Clone, PartialEq)]
pub struct SplineTask {
    pub config: SplineConfig,
    pub axes: Vec<(String, RawArray)>,
}

fn single_value<'a>(section: &str, (key, values): &'a KeyValues) -> SplineResult<&'a Value> {
    match values.as_slice() {
        [value] => Ok(value),
        _ => Err(SplineError::Config(format!(
            "{}.{} must have exactly one value, got {}",
            section,
            key,
            values.len()
        ))),
    }
}

fn wrong_type(section: &str, key: &str, expected: &str, value: &Value) -> SplineError {
    SplineError::Config(format!(
        "{}.{} must be {}, got '{}'",
        section, key, expected, value
    ))
}

impl SplineConfig {
    /// Settings only; an `axes` section is allowed and ignored
    pub fn from_document(text: &str) -> SplineResult<SplineConfig> {
        Ok(SplineTask::from_document(text)?.config)
    }

    fn apply(&mut self, section: &str, pair: &KeyValues) -> SplineResult<()> {
        let key = pair.0.as_str();
        let value = single_value(section, pair)?;
        match (section, key) {
            ("solver", "method") => {
                let name = value
                    .as_string()
                    .ok_or_else(|| wrong_type(section, key, "dense or banded", value))?;
                self.method = match name.to_lowercase().as_str() {
                    "dense" => SolverMethod::Dense,
                    "banded" => SolverMethod::Banded,
                    _ => return Err(wrong_type(section, key, "dense or banded", value)),
                };
            }
            ("solver", "parallel") => {
                self.parallel = value
                    .as_boolean()
                    .ok_or_else(|| wrong_type(section, key, "true or false", value))?;
            }
            ("validation", "min_points") => {
                let min_points = value
                    .as_integer()
                    .ok_or_else(|| wrong_type(section, key, "an integer", value))?;
                if min_points < MIN_POINTS as i64 {
                    return Err(SplineError::Config(format!(
                        "validation.min_points must be at least {}, got {}",
                        MIN_POINTS, min_points
                    )));
                }
                self.min_points = min_points as usize;
            }
            ("validation", "condition_threshold") => {
                let threshold = value
                    .as_float()
                    .filter(|t| *t > 0.0)
                    .ok_or_else(|| wrong_type(section, key, "a positive number", value))?;
                self.condition_threshold = threshold;
            }
            ("logging", "loglevel") => {
                let name = value
                    .as_string()
                    .ok_or_else(|| wrong_type(section, key, "a level name", value))?;
                self.loglevel = parse_loglevel(name)?;
            }
            ("logging", "logfile") => {
                self.logfile = Some(PathBuf::from(value.to_string()));
            }
            _ => {
                return Err(SplineError::Config(format!(
                    "unknown setting {}.{}",
                    section, key
                )));
            }
        }
        Ok(())
    }

    /// Installs the global logger with the level and file of these settings
    pub fn init_logging(&self) -> SplineResult<()> {
        init_logger(self.loglevel, self.logfile.as_deref())
    }
}

impl SplineTask {
    pub fn from_document(text: &str) -> SplineResult<SplineTask> {
        let sections = parse_document(text)?;
        let mut config = SplineConfig::default();
        let mut axes = Vec::new();
        for (title, pairs) in sections.iter() {
            match title.as_str() {
                "solver" | "validation" | "logging" => {
                    for pair in pairs {
                        config.apply(title, pair)?;
                    }
                }
                "axes" => {
                    for (name, values) in pairs {
                        if axes.iter().any(|(existing, _)| existing == name) {
                            return Err(SplineError::Config(format!(
                                "axis '{}' is defined twice",
                                name
                            )));
                        }
                        axes.push((name.clone(), RawArray::Values(values.clone())));
                    }
                }
                other => {
                    return Err(SplineError::Config(format!(
                        "unknown section '{}'",
                        other
                    )));
                }
            }
        }
        Ok(SplineTask { config, axes })
    }

    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn raw_axes(&self) -> Vec<RawArray> {
        self.axes.iter().map(|(_, raw)| raw.clone()).collect()
    }
}
