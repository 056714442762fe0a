use ndarray::Array1;

use super::error::TimebaseError;

/// The time axis of a digitized waveform.
///
/// Sample `i` sits at `t0 + i * dt`. Nothing is stored besides the three parameters; times are
/// computed on demand, each directly from its sample number so no rounding error accumulates
/// along the waveform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Timebase {
    n_samples: usize,
    dt: f64,
    t0: f64,
}

impl Timebase {
    /// Create a timebase starting at zero.
    ///
    /// Fails if the sample count is negative or dt is not a positive finite number
    pub fn new(sample_count: i64, dt: f64) -> Result<Self, TimebaseError> {
        let n_samples = usize::try_from(sample_count)
            .map_err(|_| TimebaseError::InvalidSampleCount(sample_count))?;
        Self::with_len(n_samples, dt)
    }

    /// Create a timebase for `n_samples` samples starting at zero
    pub fn with_len(n_samples: usize, dt: f64) -> Result<Self, TimebaseError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(TimebaseError::InvalidSpacing(dt));
        }
        Ok(Self {
            n_samples,
            dt,
            t0: 0.0,
        })
    }

    /// Shift the start of the timebase to t0
    pub fn with_offset(self, t0: f64) -> Result<Self, TimebaseError> {
        if !t0.is_finite() {
            return Err(TimebaseError::InvalidOffset(t0));
        }
        Ok(Self { t0, ..self })
    }

    pub fn len(&self) -> usize {
        self.n_samples
    }

    pub fn is_empty(&self) -> bool {
        self.n_samples == 0
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn t0(&self) -> f64 {
        self.t0
    }

    /// Time of sample i, or None past the end of the waveform
    pub fn time_at(&self, i: usize) -> Option<f64> {
        if i < self.n_samples {
            Some(self.t0 + i as f64 * self.dt)
        } else {
            None
        }
    }

    pub fn times(&self) -> impl Iterator<Item = f64> {
        let Self { n_samples, dt, t0 } = *self;
        (0..n_samples).map(move |i| t0 + i as f64 * dt)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.times().collect()
    }

    pub fn to_array(&self) -> Array1<f64> {
        Array1::from_iter(self.times())
    }

    /// Span covered by the samples, i.e. `n_samples * dt`
    pub fn duration(&self) -> f64 {
        self.n_samples as f64 * self.dt
    }
}

/// Sample times for a waveform of `sample_count` samples spaced by dt, starting at zero
pub fn times_for(sample_count: i64, dt: f64) -> Result<Vec<f64>, TimebaseError> {
    Ok(Timebase::new(sample_count, dt)?.to_vec())
}
