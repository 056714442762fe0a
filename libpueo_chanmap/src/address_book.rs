use bit_set::BitSet;
use bitvec::prelude::*;
use fxhash::FxHashMap;
use std::ops::Range;

use super::channel_map::{ChannelMap, MapEntry};
use super::config::GeometryConfig;
use super::error::{AddressError, ChannelMapError};
use super::geometry::direction_wrt_north;
use super::hardware_id::{AntennaAddress, ChannelIndex, DigitizerChannel, Polarization, Ring};

/// Sort key for antenna numbering: main instrument first (phi-major, then ring), then the
/// nadir ring, then the LF ring.
fn antenna_order(ring: Ring, phi: usize) -> (usize, usize, usize) {
    let group = match ring {
        Ring::Nadir => 1,
        Ring::LF => 2,
        _ => 0,
    };
    (group, phi, ring.number())
}

/// ChannelAddressBook translates between antenna addresses (ring, phi, polarization) and the
/// flat channel index used to key waveform storage.
///
/// The layout is fixed by the channel map: a channel on SURF `surf`, channel `chan` has
/// index `chan + chans_per_surf * surf`. Construction checks that the map gives a one-to-one
/// correspondence between every valid address and every index in `0..total_channels()`,
/// so lookups never fail for a valid address and every index has an address.
///
/// The book is immutable once built. Build it once and share it by reference.
#[derive(Debug, Clone)]
pub struct ChannelAddressBook {
    lookup: FxHashMap<AntennaAddress, ChannelIndex>,
    addresses: Vec<AntennaAddress>,
    digitizers: Vec<DigitizerChannel>,
    phi_counts: FxHashMap<Ring, usize>,
    antennas: Vec<(Ring, usize)>,
    antenna_numbers: FxHashMap<(Ring, usize), usize>,
    phi_base: usize,
    chans_per_surf: usize,
    n_phi_sectors: usize,
    aft_fore_offset_deg: f64,
}

impl ChannelAddressBook {
    /// Create a new ChannelAddressBook from a geometry configuration.
    ///
    /// Loads the channel map named by the config (or the bundled default) and validates it.
    pub fn new(config: &GeometryConfig) -> Result<Self, ChannelMapError> {
        config.validate()?;
        let map = ChannelMap::new(config.channel_map_path.as_deref())?;
        let book = match Self::from_map(&map, config) {
            Ok(b) => b,
            Err(e) => {
                spdlog::error!("Rejected channel map: {e}");
                return Err(e);
            }
        };
        spdlog::info!(
            "Channel address book ready with {} channels across {} rings",
            book.total_channels(),
            book.phi_counts.len()
        );
        Ok(book)
    }

    /// Build the address book from an already parsed ChannelMap
    pub fn from_map(map: &ChannelMap, config: &GeometryConfig) -> Result<Self, ChannelMapError> {
        if map.is_empty() {
            return Err(ChannelMapError::Empty);
        }

        let total = map.len();
        let chans_per_surf = config.chans_per_surf;
        let mut covered = bitvec![0; total];
        let mut lookup: FxHashMap<AntennaAddress, ChannelIndex> = FxHashMap::default();
        let mut phi_slots: FxHashMap<(Ring, Polarization), BitSet> = FxHashMap::default();
        let mut ordered: Vec<(ChannelIndex, MapEntry)> = Vec::with_capacity(total);

        for entry in map.entries() {
            let MapEntry { digitizer, address } = *entry;
            if digitizer.chan >= chans_per_surf {
                return Err(ChannelMapError::ChannelOutOfBoard {
                    surf: digitizer.surf,
                    chan: digitizer.chan,
                    chans_per_surf,
                });
            }

            let index = digitizer.flatten(chans_per_surf).ok_or(
                ChannelMapError::DigitizerOverflow(digitizer.surf, digitizer.chan),
            )?;
            // With exactly `total` rows, any index past the end means one inside is missing
            if index.0 >= total {
                return Err(ChannelMapError::ChannelGap {
                    index: index.0,
                    total,
                });
            }
            if covered[index.0] {
                return Err(ChannelMapError::DuplicateChannel(
                    digitizer.surf,
                    digitizer.chan,
                ));
            }
            covered.set(index.0, true);

            // A ring can never have more phi positions than the map has rows
            if address.phi >= total {
                return Err(ChannelMapError::IncompletePhiRange(address.ring, address.pol));
            }
            if lookup.insert(address, index).is_some() {
                return Err(ChannelMapError::DuplicateAddress(address));
            }
            phi_slots
                .entry((address.ring, address.pol))
                .or_default()
                .insert(address.phi);
            ordered.push((index, *entry));
        }

        let mut phi_counts: FxHashMap<Ring, usize> = FxHashMap::default();
        for ring in Ring::ALL {
            let horizontal = phi_slots.get(&(ring, Polarization::Horizontal));
            let vertical = phi_slots.get(&(ring, Polarization::Vertical));
            match (horizontal, vertical) {
                (None, None) => continue,
                (Some(h), Some(v)) if h.is_subset(v) && v.is_subset(h) => {
                    if !h.iter().enumerate().all(|(slot, phi)| slot == phi) {
                        return Err(ChannelMapError::IncompletePhiRange(
                            ring,
                            Polarization::Horizontal,
                        ));
                    }
                    phi_counts.insert(ring, h.len());
                }
                _ => return Err(ChannelMapError::MismatchedPolarizations(ring)),
            }
        }

        ordered.sort_by_key(|(index, _)| *index);
        let addresses = ordered.iter().map(|(_, e)| e.address).collect();
        let digitizers = ordered.iter().map(|(_, e)| e.digitizer).collect();

        let mut antennas: Vec<(Ring, usize)> = phi_counts
            .iter()
            .flat_map(|(ring, n)| (0..*n).map(move |phi| (*ring, phi)))
            .collect();
        antennas.sort_by_key(|(ring, phi)| antenna_order(*ring, *phi));
        let antenna_numbers = antennas
            .iter()
            .enumerate()
            .map(|(number, key)| (*key, number))
            .collect();

        Ok(Self {
            lookup,
            addresses,
            digitizers,
            phi_counts,
            antennas,
            antenna_numbers,
            phi_base: config.phi_base,
            chans_per_surf,
            n_phi_sectors: config.n_phi_sectors,
            aft_fore_offset_deg: config.aft_fore_offset_deg,
        })
    }

    /// Get the channel index of an antenna polarization.
    ///
    /// Fails if the ring has no antennas in the map or phi is outside the ring's range
    pub fn index_for(
        &self,
        ring: Ring,
        phi: usize,
        pol: Polarization,
    ) -> Result<ChannelIndex, AddressError> {
        let slot = self.phi_slot(ring, phi)?;
        self.lookup
            .get(&AntennaAddress::new(ring, slot, pol))
            .copied()
            .ok_or_else(|| self.phi_out_of_range(ring, phi))
    }

    pub fn index_for_address(&self, address: &AntennaAddress) -> Result<ChannelIndex, AddressError> {
        self.index_for(address.ring, address.phi, address.pol)
    }

    /// Same as [`ChannelAddressBook::index_for`], but with the ring and polarization given
    /// as keywords (i.e. "top", "V")
    pub fn lookup(&self, ring: &str, phi: usize, pol: &str) -> Result<ChannelIndex, AddressError> {
        self.index_for(ring.parse()?, phi, pol.parse()?)
    }

    /// Inverse of [`ChannelAddressBook::index_for`]
    pub fn address_for(&self, index: ChannelIndex) -> Result<AntennaAddress, AddressError> {
        self.addresses
            .get(index.0)
            .map(|address| self.external(address))
            .ok_or(AddressError::ChannelOutOfRange(index.0, self.total_channels()))
    }

    pub fn digitizer_for(&self, index: ChannelIndex) -> Result<DigitizerChannel, AddressError> {
        self.digitizers
            .get(index.0)
            .copied()
            .ok_or(AddressError::ChannelOutOfRange(index.0, self.total_channels()))
    }

    pub fn index_for_digitizer(&self, surf: usize, chan: usize) -> Result<ChannelIndex, AddressError> {
        if chan >= self.chans_per_surf {
            return Err(AddressError::UnmappedDigitizer(surf, chan));
        }
        DigitizerChannel::new(surf, chan)
            .flatten(self.chans_per_surf)
            .filter(|index| index.0 < self.total_channels())
            .ok_or(AddressError::UnmappedDigitizer(surf, chan))
    }

    /// Number of channels in the map; valid indices are `0..total_channels()`
    pub fn total_channels(&self) -> usize {
        self.addresses.len()
    }

    /// Rings which have antennas in the map, in [`Ring::ALL`] order
    pub fn rings(&self) -> Vec<Ring> {
        Ring::ALL
            .into_iter()
            .filter(|ring| self.phi_counts.contains_key(ring))
            .collect()
    }

    /// Valid phi positions of a ring, in the configured numbering
    pub fn phi_range(&self, ring: Ring) -> Result<Range<usize>, AddressError> {
        let n_phi = self
            .phi_counts
            .get(&ring)
            .ok_or(AddressError::RingNotConfigured(ring))?;
        Ok(self.phi_base..(self.phi_base + n_phi))
    }

    /// Iterate over every (index, address) pair in index order
    pub fn iter(&self) -> impl Iterator<Item = (ChannelIndex, AntennaAddress)> + '_ {
        self.addresses
            .iter()
            .enumerate()
            .map(|(index, address)| (ChannelIndex(index), self.external(address)))
    }

    /// Number of physical antennas (each carries two channels)
    pub fn n_antennas(&self) -> usize {
        self.antennas.len()
    }

    /// Payload antenna number of an address. Main instrument antennas come first, numbered
    /// phi-major, followed by the nadir and LF antennas.
    pub fn antenna_number(&self, address: &AntennaAddress) -> Result<usize, AddressError> {
        let slot = self.phi_slot(address.ring, address.phi)?;
        self.antenna_numbers
            .get(&(address.ring, slot))
            .copied()
            .ok_or_else(|| self.phi_out_of_range(address.ring, address.phi))
    }

    /// Ring and phi position of an antenna number
    pub fn antenna(&self, number: usize) -> Result<(Ring, usize), AddressError> {
        self.antennas
            .get(number)
            .map(|(ring, slot)| (*ring, slot + self.phi_base))
            .ok_or(AddressError::AntennaOutOfRange(number, self.n_antennas()))
    }

    pub fn index_for_antenna(&self, number: usize, pol: Polarization) -> Result<ChannelIndex, AddressError> {
        let (ring, phi) = self.antenna(number)?;
        self.index_for(ring, phi, pol)
    }

    /// Phi sector (counting from zero) looked at by a channel
    pub fn phi_sector(&self, index: ChannelIndex) -> Result<usize, AddressError> {
        self.addresses
            .get(index.0)
            .map(|address| address.phi)
            .ok_or(AddressError::ChannelOutOfRange(index.0, self.total_channels()))
    }

    /// Direction a phi sector is looking, in degrees from north, given the payload heading
    pub fn direction_wrt_north(&self, phi_sector: usize, heading: f64) -> Result<f64, AddressError> {
        direction_wrt_north(
            phi_sector,
            heading,
            self.n_phi_sectors,
            self.aft_fore_offset_deg,
        )
    }

    fn phi_slot(&self, ring: Ring, phi: usize) -> Result<usize, AddressError> {
        let range = self.phi_range(ring)?;
        if range.contains(&phi) {
            Ok(phi - self.phi_base)
        } else {
            Err(self.phi_out_of_range(ring, phi))
        }
    }

    fn phi_out_of_range(&self, ring: Ring, phi: usize) -> AddressError {
        let n_phi = self.phi_counts.get(&ring).copied().unwrap_or(0);
        AddressError::PhiOutOfRange {
            ring,
            phi,
            first: self.phi_base,
            end: self.phi_base + n_phi,
        }
    }

    /// Map storage (phi from zero) to the configured phi numbering
    fn external(&self, address: &AntennaAddress) -> AntennaAddress {
        AntennaAddress::new(address.ring, address.phi + self.phi_base, address.pol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn default_book() -> ChannelAddressBook {
        ChannelAddressBook::new(&GeometryConfig::default()).unwrap()
    }

    fn small_book(contents: &str) -> Result<ChannelAddressBook, ChannelMapError> {
        let config = GeometryConfig {
            chans_per_surf: 2,
            ..Default::default()
        };
        let map = ChannelMap::parse(contents)?;
        ChannelAddressBook::from_map(&map, &config)
    }

    fn all_valid_addresses(book: &ChannelAddressBook) -> Vec<AntennaAddress> {
        let mut valid = Vec::new();
        for ring in book.rings() {
            for phi in book.phi_range(ring).unwrap() {
                for pol in Polarization::ALL {
                    valid.push(AntennaAddress::new(ring, phi, pol));
                }
            }
        }
        valid
    }

    #[test]
    fn test_default_layout() {
        let book = default_book();
        assert_eq!(book.total_channels(), 208);
        assert_eq!(
            book.rings(),
            vec![
                Ring::Top,
                Ring::UpperMiddle,
                Ring::LowerMiddle,
                Ring::Bottom,
                Ring::LF
            ]
        );
        assert_eq!(book.phi_range(Ring::Top), Ok(0..24));
        assert_eq!(book.phi_range(Ring::LF), Ok(0..8));

        let index = book.index_for(Ring::Top, 10, Polarization::Vertical).unwrap();
        assert_eq!(index, ChannelIndex(136));
        assert_eq!(book.digitizer_for(index), Ok(DigitizerChannel::new(17, 0)));

        let index = book.index_for(Ring::Bottom, 3, Polarization::Horizontal).unwrap();
        assert_eq!(index, ChannelIndex(15)); // surf 1, chan 3 + 4
        let index = book.index_for(Ring::LF, 7, Polarization::Vertical).unwrap();
        assert_eq!(index, ChannelIndex(207));
    }

    #[test]
    fn test_round_trip_and_range() {
        let book = default_book();
        let valid = all_valid_addresses(&book);
        assert_eq!(valid.len(), book.total_channels());

        let mut seen = HashSet::new();
        for address in valid {
            let index = book.index_for_address(&address).unwrap();
            assert!(index.value() < book.total_channels());
            assert!(seen.insert(index), "{address} shares an index");
            assert_eq!(book.address_for(index), Ok(address));
        }
        assert_eq!(seen.len(), book.total_channels());
    }

    #[test]
    fn test_every_index_has_an_address() {
        let book = default_book();
        for (index, address) in book.iter() {
            assert_eq!(book.index_for_address(&address), Ok(index));
        }
        assert_eq!(book.iter().count(), 208);
    }

    #[test]
    fn test_invalid_addresses() {
        let book = default_book();
        assert_eq!(
            book.index_for(Ring::Top, 24, Polarization::Vertical),
            Err(AddressError::PhiOutOfRange {
                ring: Ring::Top,
                phi: 24,
                first: 0,
                end: 24
            })
        );
        assert!(matches!(
            book.index_for(Ring::LF, 8, Polarization::Horizontal),
            Err(AddressError::PhiOutOfRange { .. })
        ));
        assert_eq!(
            book.index_for(Ring::Nadir, 0, Polarization::Horizontal),
            Err(AddressError::RingNotConfigured(Ring::Nadir))
        );
        assert_eq!(
            book.lookup("middle", 0, "V"),
            Err(AddressError::UnknownRing(String::from("middle")))
        );
        assert_eq!(
            book.lookup("top", 0, "X"),
            Err(AddressError::UnknownPolarization(String::from("X")))
        );
        assert_eq!(book.lookup("top", 10, "V"), Ok(ChannelIndex(136)));
        assert_eq!(
            book.address_for(ChannelIndex(208)),
            Err(AddressError::ChannelOutOfRange(208, 208))
        );
    }

    #[test]
    fn test_phi_base_one() {
        let config = GeometryConfig {
            phi_base: 1,
            ..Default::default()
        };
        let book = ChannelAddressBook::new(&config).unwrap();
        assert_eq!(book.phi_range(Ring::Top), Ok(1..25));
        assert!(book.index_for(Ring::Top, 0, Polarization::Vertical).is_err());
        let index = book.index_for(Ring::Top, 11, Polarization::Vertical).unwrap();
        assert_eq!(index, ChannelIndex(136));
        assert_eq!(
            book.address_for(index),
            Ok(AntennaAddress::new(Ring::Top, 11, Polarization::Vertical))
        );
        assert_eq!(book.phi_sector(index), Ok(10));
    }

    #[test]
    fn test_deterministic() {
        let first = default_book();
        let second = default_book();
        assert!(first.iter().eq(second.iter()));
        for address in all_valid_addresses(&first) {
            assert_eq!(
                first.index_for_address(&address),
                first.index_for_address(&address)
            );
        }
    }

    #[test]
    fn test_antenna_numbers() {
        let book = default_book();
        assert_eq!(book.n_antennas(), 104);
        let top_10 = AntennaAddress::new(Ring::Top, 10, Polarization::Vertical);
        assert_eq!(book.antenna_number(&top_10), Ok(40));
        let bottom_10 = AntennaAddress::new(Ring::Bottom, 10, Polarization::Horizontal);
        assert_eq!(book.antenna_number(&bottom_10), Ok(43));
        let lf_3 = AntennaAddress::new(Ring::LF, 3, Polarization::Horizontal);
        assert_eq!(book.antenna_number(&lf_3), Ok(99));
        assert_eq!(book.antenna(40), Ok((Ring::Top, 10)));
        assert_eq!(
            book.index_for_antenna(40, Polarization::Vertical),
            Ok(ChannelIndex(136))
        );
        assert_eq!(
            book.antenna(104),
            Err(AddressError::AntennaOutOfRange(104, 104))
        );
    }

    #[test]
    fn test_digitizer_lookup() {
        let book = default_book();
        assert_eq!(book.index_for_digitizer(25, 7), Ok(ChannelIndex(207)));
        assert_eq!(
            book.index_for_digitizer(26, 0),
            Err(AddressError::UnmappedDigitizer(26, 0))
        );
        assert_eq!(
            book.index_for_digitizer(0, 8),
            Err(AddressError::UnmappedDigitizer(0, 8))
        );
        assert_eq!(
            book.index_for_digitizer(usize::MAX, 0),
            Err(AddressError::UnmappedDigitizer(usize::MAX, 0))
        );
        assert_eq!(
            book.index_for_digitizer(usize::MAX / 4, 7),
            Err(AddressError::UnmappedDigitizer(usize::MAX / 4, 7))
        );
    }

    #[test]
    fn test_direction_of_channel() {
        let book = default_book();
        let index = book.index_for(Ring::Top, 6, Polarization::Vertical).unwrap();
        let sector = book.phi_sector(index).unwrap();
        assert_eq!(book.direction_wrt_north(sector, 0.0), Ok(315.0));
        assert!(matches!(
            book.direction_wrt_north(sector, f64::NEG_INFINITY),
            Err(AddressError::InvalidHeading(_))
        ));
    }

    #[test]
    fn test_small_map() {
        let book =
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,1,top,0,V\n1,0,top,1,H\n1,1,top,1,V\n")
                .unwrap();
        assert_eq!(book.total_channels(), 4);
        assert_eq!(
            book.index_for(Ring::Top, 1, Polarization::Horizontal),
            Ok(ChannelIndex(2))
        );
    }

    #[test]
    fn test_rejects_broken_maps() {
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n"),
            Err(ChannelMapError::Empty)
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,0,top,0,V\n1,0,top,1,H\n1,1,top,1,V\n"),
            Err(ChannelMapError::DuplicateChannel(0, 0))
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,1,top,0,V\n1,0,top,1,H\n2,1,top,1,V\n"),
            Err(ChannelMapError::ChannelGap { index: 5, total: 4 })
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,1,top,0,H\n1,0,top,1,H\n1,1,top,1,V\n"),
            Err(ChannelMapError::DuplicateAddress(_))
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,2,top,0,V\n"),
            Err(ChannelMapError::ChannelOutOfBoard { chan: 2, .. })
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,1,top,1,H\n1,0,top,0,V\n1,1,bottom,0,V\n"),
            Err(ChannelMapError::MismatchedPolarizations(Ring::Top))
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,0,H\n0,1,top,0,V\n1,0,top,2,H\n1,1,top,2,V\n"),
            Err(ChannelMapError::IncompletePhiRange(Ring::Top, Polarization::Horizontal))
        ));
    }

    #[test]
    fn test_rejects_out_of_range_integers() {
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n18446744073709551615,0,top,0,H\n"),
            Err(ChannelMapError::DigitizerOverflow(usize::MAX, 0))
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,18446744073709551615,H\n"),
            Err(ChannelMapError::IncompletePhiRange(Ring::Top, Polarization::Horizontal))
        ));
        assert!(matches!(
            small_book("surf,chan,ring,phi,pol\n0,0,top,1000000000000,H\n0,1,top,0,V\n"),
            Err(ChannelMapError::IncompletePhiRange(Ring::Top, Polarization::Horizontal))
        ));
    }

    #[test]
    fn test_shared_between_threads() {
        let book = default_book();
        let expected: Vec<(ChannelIndex, AntennaAddress)> = book.iter().collect();
        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    for (index, address) in expected.iter() {
                        assert_eq!(book.index_for_address(address), Ok(*index));
                        assert_eq!(book.address_for(*index), Ok(*address));
                    }
                });
            }
        });
    }
}
