use chrono::NaiveDateTime;

/// One displacement observation: an epoch plus one value per axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Sample {
    pub epoch: NaiveDateTime,
    pub values: Vec<f64>,
}

impl Sample {
    pub fn new(epoch: NaiveDateTime, values: Vec<f64>) -> Self {
        Self { epoch, values }
    }
}

/// Ordered displacement series for one GNSS station.
///
/// Epochs are strictly increasing and every sample carries one value per
/// axis; both invariants are enforced at construction.
#[derive(Clone, Debug)]
pub struct Station {
    id: String,
    axes: Vec<String>,
    samples: Vec<Sample>,
}

impl Station {
    /// Build a station from already-ordered samples.
    ///
    /// Fails when an epoch does not strictly increase or a sample's value
    /// count disagrees with the axis list.
    pub fn from_samples(
        id: impl Into<String>,
        axes: Vec<String>,
        samples: Vec<Sample>,
    ) -> Result<Self, String> {
        let id = id.into();
        for (i, s) in samples.iter().enumerate() {
            if s.values.len() != axes.len() {
                return Err(format!(
                    "station {id}: sample {i} has {} values, expected {}",
                    s.values.len(),
                    axes.len()
                ));
            }
            if i > 0 && s.epoch <= samples[i - 1].epoch {
                return Err(format!(
                    "station {id}: epoch {} at sample {i} does not increase",
                    s.epoch
                ));
            }
        }
        Ok(Self { id, axes, samples })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Series duration from first to last epoch, in seconds.
    pub fn duration_s(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(a), Some(b)) => epoch_seconds(b.epoch) - epoch_seconds(a.epoch),
            _ => 0.0,
        }
    }

    /// Sample epochs as seconds on an absolute scale, for regression math.
    pub fn times_s(&self) -> Vec<f64> {
        self.samples.iter().map(|s| epoch_seconds(s.epoch)).collect()
    }

    /// Values of one axis across all samples.
    pub fn axis_values(&self, axis: usize) -> Vec<f64> {
        self.samples.iter().map(|s| s.values[axis]).collect()
    }
}

/// Epoch as fractional seconds since the Unix epoch.
///
/// Time deltas are always taken in seconds to keep the regression units
/// consistent (displacement/s for slopes, displacement/s^2 for curvature).
pub(crate) fn epoch_seconds(epoch: NaiveDateTime) -> f64 {
    let utc = epoch.and_utc();
    utc.timestamp() as f64 + f64::from(utc.timestamp_subsec_millis()) / 1000.0
}
