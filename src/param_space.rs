use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// One (delay, pulse) observation. Arrival order is campaign order and is
/// preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSample {
    pub delay: i64,
    pub pulse: i64,
}

/// How a series should be rendered by an external plotting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesStyle {
    pub color: String,
    pub alpha: f64,
    pub zorder: i32,
}

impl Default for SeriesStyle {
    fn default() -> Self {
        Self {
            color: "gray".to_string(),
            alpha: 0.3,
            zorder: 1,
        }
    }
}

impl SeriesStyle {
    pub fn new(color: &str, alpha: f64, zorder: i32) -> Self {
        Self {
            color: color.to_string(),
            alpha,
            zorder,
        }
    }
}

/// One named, styled, append-only collection of samples.
///
/// Owned exclusively by a [`ParameterSpace`] entry; samples are appended via
/// [`ParameterSpace::add_sample`] and read through these accessors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSeries {
    name: String,
    style: SeriesStyle,
    samples: Vec<ParameterSample>,
}

impl ParameterSeries {
    fn new(name: &str, style: SeriesStyle) -> Self {
        Self {
            name: name.to_string(),
            style,
            samples: Vec::new(),
        }
    }

    /// Display label.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn style(&self) -> &SeriesStyle {
        &self.style
    }

    /// Samples in arrival order.
    pub fn samples(&self) -> &[ParameterSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Running extremes over every sample ever recorded, across all series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_delay: i64,
    pub max_delay: i64,
    pub min_pulse: i64,
    pub max_pulse: i64,
}

impl Bounds {
    fn from_sample(sample: ParameterSample) -> Self {
        Self {
            min_delay: sample.delay,
            max_delay: sample.delay,
            min_pulse: sample.pulse,
            max_pulse: sample.pulse,
        }
    }

    fn widen(&mut self, sample: ParameterSample) {
        self.min_delay = self.min_delay.min(sample.delay);
        self.max_delay = self.max_delay.max(sample.delay);
        self.min_pulse = self.min_pulse.min(sample.pulse);
        self.max_pulse = self.max_pulse.max(sample.pulse);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParameterSpaceError {
    #[error("Series key '{0}' is already registered")]
    DuplicateKey(String),

    #[error("No series registered under key '{0}'")]
    UnknownKey(String),
}

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed campaign artifact: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// The (delay, pulse) parameter space explored during a campaign.
///
/// Series are keyed by a stable identifier, typically the observed target
/// behavior ("crash", "success", "normal"). Bounds are maintained
/// incrementally on every insertion and never recomputed by scanning.
/// Bounds start absent and are initialized from the first sample, so a
/// negative or zero first coordinate is tracked correctly.
///
/// Single-writer by default: sharing one instance across concurrent campaign
/// drivers requires external synchronization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpace {
    series: BTreeMap<String, ParameterSeries>,
    bounds: Option<Bounds>,
}

impl ParameterSpace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new empty series under `key`.
    pub fn add_series(
        &mut self,
        key: &str,
        name: &str,
        style: SeriesStyle,
    ) -> Result<(), ParameterSpaceError> {
        if self.series.contains_key(key) {
            return Err(ParameterSpaceError::DuplicateKey(key.to_string()));
        }
        self.series
            .insert(key.to_string(), ParameterSeries::new(name, style));
        Ok(())
    }

    /// Append one observation to the series under `key` and widen the bounds.
    ///
    /// Fails without touching anything when the key is unregistered.
    pub fn add_sample(
        &mut self,
        key: &str,
        delay: i64,
        pulse: i64,
    ) -> Result<(), ParameterSpaceError> {
        let series = self
            .series
            .get_mut(key)
            .ok_or_else(|| ParameterSpaceError::UnknownKey(key.to_string()))?;

        let sample = ParameterSample { delay, pulse };
        series.samples.push(sample);
        match &mut self.bounds {
            Some(bounds) => bounds.widen(sample),
            None => self.bounds = Some(Bounds::from_sample(sample)),
        }
        Ok(())
    }

    /// Running extremes, `None` while no sample has been recorded.
    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    /// Read-only view of one series.
    pub fn series(&self, key: &str) -> Result<&ParameterSeries, ParameterSpaceError> {
        self.series
            .get(key)
            .ok_or_else(|| ParameterSpaceError::UnknownKey(key.to_string()))
    }

    /// Registered keys.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    /// All series with their keys, for the plotting boundary.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParameterSeries)> {
        self.series.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Number of registered series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of samples across all series.
    pub fn sample_count(&self) -> usize {
        self.series.values().map(ParameterSeries::len).sum()
    }

    /// Persist the whole structure to one artifact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), PersistenceError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self)?;
        // flush here so a failing write surfaces instead of dying in Drop
        writer.flush()?;
        Ok(())
    }

    /// Reconstruct a previously saved structure.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PersistenceError> {
        let file = File::open(path)?;
        let space = serde_json::from_reader(BufReader::new(file))?;
        Ok(space)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn space_with(key: &str) -> ParameterSpace {
        let mut space = ParameterSpace::new();
        space
            .add_series(key, key, SeriesStyle::default())
            .unwrap();
        space
    }

    #[test]
    fn samples_keep_arrival_order() {
        let mut space = space_with("crash");
        space.add_sample("crash", 10, 5).unwrap();
        space.add_sample("crash", 3, 9).unwrap();
        space.add_sample("crash", 7, 2).unwrap();

        assert_eq!(
            space.series("crash").unwrap().samples(),
            &[
                ParameterSample { delay: 10, pulse: 5 },
                ParameterSample { delay: 3, pulse: 9 },
                ParameterSample { delay: 7, pulse: 2 },
            ]
        );
    }

    #[test]
    fn bounds_track_true_extremes_across_series() {
        let mut space = space_with("crash");
        space
            .add_series("normal", "Normal behavior", SeriesStyle::new("green", 0.5, 2))
            .unwrap();
        space.add_sample("crash", 10, 5).unwrap();
        space.add_sample("normal", 3, 9).unwrap();
        space.add_sample("crash", 7, 2).unwrap();

        assert_eq!(
            space.bounds(),
            Some(Bounds {
                min_delay: 3,
                max_delay: 10,
                min_pulse: 2,
                max_pulse: 9,
            })
        );
    }

    #[test]
    fn first_sample_initializes_bounds_even_when_negative() {
        let mut space = space_with("crash");
        space.add_sample("crash", -4, -2).unwrap();

        // a zero-initialized running min/max would report 0 here
        assert_eq!(
            space.bounds(),
            Some(Bounds {
                min_delay: -4,
                max_delay: -4,
                min_pulse: -2,
                max_pulse: -2,
            })
        );
    }

    #[test]
    fn empty_space_has_no_bounds() {
        assert_eq!(ParameterSpace::new().bounds(), None);
    }

    #[test]
    fn unknown_key_fails_without_mutating() {
        let mut space = ParameterSpace::new();
        let err = space.add_sample("missing-key", 1, 1).unwrap_err();
        assert_eq!(
            err,
            ParameterSpaceError::UnknownKey("missing-key".to_string())
        );
        assert_eq!(space.bounds(), None);
        assert!(space.is_empty());
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut space = space_with("crash");
        space.add_sample("crash", 1, 1).unwrap();

        let err = space
            .add_series("crash", "Crash again", SeriesStyle::default())
            .unwrap_err();
        assert_eq!(err, ParameterSpaceError::DuplicateKey("crash".to_string()));
        // the original series and its samples survive
        assert_eq!(space.series("crash").unwrap().len(), 1);
    }

    #[test]
    fn save_load_round_trips_exactly() {
        let mut space = ParameterSpace::new();
        space
            .add_series("crash", "Target crashed", SeriesStyle::new("red", 0.8, 3))
            .unwrap();
        space
            .add_series("success", "Glitch landed", SeriesStyle::default())
            .unwrap();
        space.add_sample("crash", 10, 5).unwrap();
        space.add_sample("success", -3, 9).unwrap();
        space.add_sample("crash", 7, 2).unwrap();

        let file = tempfile::NamedTempFile::new().unwrap();
        space.save(file.path()).unwrap();
        let restored = ParameterSpace::load(file.path()).unwrap();

        assert_eq!(restored, space);
        assert_eq!(
            restored.keys().collect::<Vec<_>>(),
            vec!["crash", "success"]
        );
        assert_eq!(restored.bounds(), space.bounds());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn save_surfaces_write_errors() {
        let mut space = space_with("crash");
        space.add_sample("crash", 1, 1).unwrap();

        // /dev/full accepts the open but fails every write with ENOSPC
        match space.save("/dev/full") {
            Err(PersistenceError::Io(_)) => {}
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn loading_a_malformed_artifact_fails_cleanly() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a campaign artifact").unwrap();

        match ParameterSpace::load(file.path()) {
            Err(PersistenceError::Malformed(_)) => {}
            other => panic!("expected Malformed, got {other:?}"),
        }
    }

    #[test]
    fn style_defaults_match_the_plotting_contract() {
        let style = SeriesStyle::default();
        assert_eq!(style.color, "gray");
        assert!((style.alpha - 0.3).abs() < f64::EPSILON);
        assert_eq!(style.zorder, 1);
    }
}
