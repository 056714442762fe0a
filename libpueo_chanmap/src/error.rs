use std::path::PathBuf;
use thiserror::Error;

use super::hardware_id::{AntennaAddress, Polarization, Ring};

/// A channel descriptor (ring, phi, polarization or channel index) which lies outside the
/// configured detector geometry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Unrecognized ring keyword: {0}")]
    UnknownRing(String),
    #[error("Ring {0} has no antennas in the loaded channel map")]
    RingNotConfigured(Ring),
    #[error("Phi position {phi} is outside the valid range {first}..{end} for ring {ring}")]
    PhiOutOfRange {
        ring: Ring,
        phi: usize,
        first: usize,
        end: usize,
    },
    #[error("Unrecognized polarization: {0}")]
    UnknownPolarization(String),
    #[error("Channel index {0} is outside the addressable range 0..{1}")]
    ChannelOutOfRange(usize, usize),
    #[error("SURF {0} channel {1} is not present in the channel map")]
    UnmappedDigitizer(usize, usize),
    #[error("Antenna number {0} is outside the range 0..{1}")]
    AntennaOutOfRange(usize, usize),
    #[error("Phi sector {0} is outside the valid range 0..{1}")]
    PhiSectorOutOfRange(usize, usize),
    #[error("Payload heading must be finite; got {0}")]
    InvalidHeading(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimebaseError {
    #[error("Sample spacing must be positive and finite; got {0}")]
    InvalidSpacing(f64),
    #[error("Sample count {0} is negative or exceeds the addressable range")]
    InvalidSampleCount(i64),
    #[error("Timebase offset must be finite; got {0}")]
    InvalidOffset(f64),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
    #[error("Config field {0} has invalid value {1}")]
    InvalidField(&'static str, String),
}

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("ChannelMap failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("ChannelMap failed to parse an integer: {0}")]
    ParsingError(#[from] std::num::ParseIntError),
    #[error("ChannelMap failed to parse a ring or polarization keyword: {0}")]
    BadKeyword(#[from] AddressError),
    #[error("ChannelMap was given a file with the incorrect format at line {0}; most likely the number of columns is incorrect")]
    BadFileFormat(usize),
    #[error("ChannelMap contains no channels")]
    Empty,
    #[error("ChannelMap failed due to configuration error: {0}")]
    ConfigError(#[from] ConfigError),
    #[error("SURF {surf} channel {chan} does not exist; SURFs carry {chans_per_surf} channels")]
    ChannelOutOfBoard {
        surf: usize,
        chan: usize,
        chans_per_surf: usize,
    },
    #[error("SURF {0} channel {1} does not fit in the channel index range")]
    DigitizerOverflow(usize, usize),
    #[error("SURF {0} channel {1} appears more than once in the channel map")]
    DuplicateChannel(usize, usize),
    #[error("Antenna {0} appears more than once in the channel map")]
    DuplicateAddress(AntennaAddress),
    #[error("Channel index {index} lies beyond the {total} mapped channels; the map leaves a gap in the channel range")]
    ChannelGap { index: usize, total: usize },
    #[error("Phi positions of ring {0} polarization {1} are not contiguous from zero")]
    IncompletePhiRange(Ring, Polarization),
    #[error("Ring {0} does not have the same phi positions for both polarizations")]
    MismatchedPolarizations(Ring),
}
