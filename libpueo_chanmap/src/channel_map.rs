// The channel map is the only place the wiring of the payload is written down. Each row
// ties a digitizer location to the antenna feeding it:
// [surf, chan] -> (ring, phi, pol)
// The map itself does no checking beyond parsing; whether the rows form a proper
// one-to-one addressing scheme is decided by the ChannelAddressBook.
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::constants::MAP_ENTRIES_PER_LINE;
use super::error::ChannelMapError;
use super::hardware_id::{AntennaAddress, DigitizerChannel, Polarization, Ring};

/// Load the default map bundled with the library
fn load_default_map() -> String {
    String::from(include_str!("data/default_channel_map.csv"))
}

/// A single row of the channel map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapEntry {
    pub digitizer: DigitizerChannel,
    pub address: AntennaAddress,
}

/// ChannelMap contains the rows of a channel map CSV file.
///
/// Each row contains 5 elements: SURF, SURF channel, ring keyword, phi position (counting from
/// zero) and polarization (H or V). The first line is a header and is skipped.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    entries: Vec<MapEntry>,
}

impl ChannelMap {
    /// Create a new ChannelMap
    /// If the path is None, we load the default that is bundled with the library
    pub fn new(path: Option<&Path>) -> Result<Self, ChannelMapError> {
        let mut contents = String::new();
        if let Some(p) = path {
            spdlog::info!("Reading channel map from {}", p.to_string_lossy());
            let mut file = File::open(p)?;
            file.read_to_string(&mut contents)?;
        } else {
            spdlog::info!("Using the bundled default channel map");
            contents = load_default_map();
        }
        Self::parse(&contents)
    }

    /// Parse the contents of a channel map file
    pub fn parse(contents: &str) -> Result<Self, ChannelMapError> {
        let mut map = ChannelMap::default();

        let mut lines = contents.lines().enumerate();
        lines.next(); // Skip the header
        for (line_number, line) in lines {
            if line.trim().is_empty() {
                continue;
            }
            let entries: Vec<&str> = line.split_terminator(",").collect();
            if entries.len() != MAP_ENTRIES_PER_LINE {
                return Err(ChannelMapError::BadFileFormat(line_number + 1));
            }

            let surf: usize = entries[0].parse()?;
            let chan: usize = entries[1].parse()?;
            let ring: Ring = entries[2].parse()?;
            let phi: usize = entries[3].parse()?;
            let pol: Polarization = entries[4].parse()?;

            map.entries.push(MapEntry {
                digitizer: DigitizerChannel::new(surf, chan),
                address: AntennaAddress::new(ring, phi, pol),
            });
        }

        Ok(map)
    }

    pub fn entries(&self) -> &[MapEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
