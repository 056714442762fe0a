use super::error::AddressError;
use std::fmt::Display;
use std::str::FromStr;

/// The physical rings of antennas on the payload.
///
/// Top through Bottom make up the main instrument. The nadir ring hangs below the main
/// instrument and the LF ring holds the low-frequency antennas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Ring {
    Top,
    UpperMiddle,
    LowerMiddle,
    Bottom,
    Nadir,
    LF,
}

impl Ring {
    pub const ALL: [Ring; 6] = [
        Ring::Top,
        Ring::UpperMiddle,
        Ring::LowerMiddle,
        Ring::Bottom,
        Ring::Nadir,
        Ring::LF,
    ];

    /// Position of the ring within [`Ring::ALL`]
    pub fn number(&self) -> usize {
        match self {
            Ring::Top => 0,
            Ring::UpperMiddle => 1,
            Ring::LowerMiddle => 2,
            Ring::Bottom => 3,
            Ring::Nadir => 4,
            Ring::LF => 5,
        }
    }

    /// The keyword used for this ring in channel map files
    pub fn keyword(&self) -> &'static str {
        match self {
            Ring::Top => "top",
            Ring::UpperMiddle => "upper_middle",
            Ring::LowerMiddle => "lower_middle",
            Ring::Bottom => "bottom",
            Ring::Nadir => "nadir",
            Ring::LF => "lf",
        }
    }

    /// Single letter used in antenna names (i.e. the T in 10TV)
    pub fn letter(&self) -> char {
        match self {
            Ring::Top => 'T',
            Ring::UpperMiddle => 'U',
            Ring::LowerMiddle => 'L',
            Ring::Bottom => 'B',
            Ring::Nadir => 'N',
            Ring::LF => 'F',
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Ring::Top => "Top",
            Ring::UpperMiddle => "Upper Middle",
            Ring::LowerMiddle => "Lower Middle",
            Ring::Bottom => "Bottom",
            Ring::Nadir => "Nadir",
            Ring::LF => "LF",
        }
    }

    pub fn is_main_instrument(&self) -> bool {
        matches!(
            self,
            Ring::Top | Ring::UpperMiddle | Ring::LowerMiddle | Ring::Bottom
        )
    }
}

impl Display for Ring {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Ring {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        let mut chars = s.chars();
        let letter = match (chars.next(), chars.next()) {
            (Some(c), None) => Some(c.to_ascii_uppercase()),
            _ => None,
        };
        Ring::ALL
            .into_iter()
            .find(|ring| ring.keyword() == lowered || Some(ring.letter()) == letter)
            .ok_or_else(|| AddressError::UnknownRing(s.to_string()))
    }
}

/// Antenna polarization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Polarization {
    Horizontal,
    Vertical,
}

impl Polarization {
    pub const ALL: [Polarization; 2] = [Polarization::Horizontal, Polarization::Vertical];

    pub fn as_char(&self) -> char {
        match self {
            Polarization::Horizontal => 'H',
            Polarization::Vertical => 'V',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'H' => Some(Polarization::Horizontal),
            'V' => Some(Polarization::Vertical),
            _ => None,
        }
    }
}

impl Display for Polarization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Polarization {
    type Err = AddressError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(pol) = Polarization::from_char(c) {
                return Ok(pol);
            }
        }
        match s.to_ascii_lowercase().as_str() {
            "horizontal" | "hpol" => Ok(Polarization::Horizontal),
            "vertical" | "vpol" => Ok(Polarization::Vertical),
            _ => Err(AddressError::UnknownPolarization(s.to_string())),
        }
    }
}

/// The human-meaningful address of a single channel: which antenna, and which of its
/// polarizations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AntennaAddress {
    pub ring: Ring,
    pub phi: usize,
    pub pol: Polarization,
}

impl AntennaAddress {
    pub fn new(ring: Ring, phi: usize, pol: Polarization) -> Self {
        Self { ring, phi, pol }
    }
}

impl Display for AntennaAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}{}{}", self.phi, self.ring.letter(), self.pol)
    }
}

/// Hardware location of a channel: SURF board and the channel on that board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitizerChannel {
    pub surf: usize,
    pub chan: usize,
}

impl DigitizerChannel {
    pub fn new(surf: usize, chan: usize) -> Self {
        Self { surf, chan }
    }

    /// Flatten the hardware location into a channel index. None if the index does not fit
    /// in a usize
    pub fn flatten(&self, chans_per_surf: usize) -> Option<ChannelIndex> {
        self.surf
            .checked_mul(chans_per_surf)
            .and_then(|v| v.checked_add(self.chan))
            .map(ChannelIndex)
    }
}

/// Flat channel index used to key waveform storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelIndex(pub usize);

impl ChannelIndex {
    pub fn value(&self) -> usize {
        self.0
    }
}

impl From<ChannelIndex> for usize {
    fn from(value: ChannelIndex) -> Self {
        value.0
    }
}

impl Display for ChannelIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
