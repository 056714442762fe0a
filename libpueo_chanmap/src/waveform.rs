use super::address_book::ChannelAddressBook;
use super::error::{AddressError, TimebaseError};
use super::hardware_id::{ChannelIndex, Polarization, Ring};
use super::timebase::Timebase;

/// The samples of one channel for one event, along with the timebase needed to place them.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    pub channel: ChannelIndex,
    volts: Vec<f64>,
    timebase: Timebase,
}

impl Waveform {
    /// Create a new waveform starting at t = 0
    pub fn new(channel: ChannelIndex, volts: Vec<f64>, dt: f64) -> Result<Self, TimebaseError> {
        let timebase = Timebase::with_len(volts.len(), dt)?;
        Ok(Self {
            channel,
            volts,
            timebase,
        })
    }

    /// Shift the first sample to t0
    pub fn with_offset(self, t0: f64) -> Result<Self, TimebaseError> {
        Ok(Self {
            timebase: self.timebase.with_offset(t0)?,
            ..self
        })
    }

    pub fn volts(&self) -> &[f64] {
        &self.volts
    }

    /// Give back the samples, dropping the timebase
    pub fn into_volts(self) -> Vec<f64> {
        self.volts
    }

    pub fn timebase(&self) -> &Timebase {
        &self.timebase
    }

    pub fn dt(&self) -> f64 {
        self.timebase.dt()
    }

    pub fn len(&self) -> usize {
        self.volts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.volts.is_empty()
    }

    /// (time, volts) pairs, ready to hand to a plotter
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.timebase.times().zip(self.volts.iter().copied())
    }
}

/// Anything which can hand out waveforms by channel index (i.e. an event reader).
pub trait WaveformSource {
    /// Get the waveform of a channel. None if the source has no data for that channel
    fn waveform(&self, channel: ChannelIndex) -> Option<Waveform>;

    /// Get the waveform of an antenna polarization, resolving its channel through the book
    fn waveform_at(
        &self,
        book: &ChannelAddressBook,
        ring: Ring,
        phi: usize,
        pol: Polarization,
    ) -> Result<Option<Waveform>, AddressError> {
        let channel = book.index_for(ring, phi, pol)?;
        Ok(self.waveform(channel))
    }
}
