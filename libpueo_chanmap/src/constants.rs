// PUEO digitizer layout
pub const DEFAULT_CHANS_PER_SURF: usize = 8;
pub const DEFAULT_PHI_BASE: usize = 0;

// Payload geometry
pub const DEFAULT_N_PHI_SECTORS: usize = 24;
pub const DEFAULT_AFT_FORE_OFFSET_DEG: f64 = 45.0;

// Channel map CSV
pub const MAP_ENTRIES_PER_LINE: usize = 5; // surf, chan, ring, phi, pol
