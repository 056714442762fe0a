//! # pueo_chanmap
//!
//! pueo_chanmap is the channel addressing library for the PUEO payload, written in Rust. It
//! translates between the antenna addresses people use (ring, phi position, polarization)
//! and the flat channel index used to store waveforms, and rebuilds the time axis of a
//! digitized waveform from its sample spacing.
//!
//! ## Installation
//!
//! Currently the only method of install is from source. Clone the repository and build with
//! `cargo build --release`. To install the CLI use `cargo install --path ./pueo_chanmap_cli`
//! from the top level of the repository.
//!
//! ## Use
//!
//! Build a [`ChannelAddressBook`](address_book::ChannelAddressBook) once from a
//! [`GeometryConfig`](config::GeometryConfig) and pass it by reference to whatever needs to
//! look up channels:
//!
//! ```no_run
//! use libpueo_chanmap::address_book::ChannelAddressBook;
//! use libpueo_chanmap::config::GeometryConfig;
//! use libpueo_chanmap::hardware_id::{Polarization, Ring};
//! use libpueo_chanmap::timebase::Timebase;
//!
//! let book = ChannelAddressBook::new(&GeometryConfig::default()).unwrap();
//! let chan = book.index_for(Ring::Top, 10, Polarization::Vertical).unwrap();
//! let times = Timebase::new(1024, 1.0 / 3.0).unwrap().to_vec();
//! ```
//!
//! ## Configuration
//!
//! The geometry configuration is a YAML file:
//!
//! ```yml
//! channel_map_path: null
//! phi_base: 0
//! chans_per_surf: 8
//! n_phi_sectors: 24
//! aft_fore_offset_deg: 45.0
//! ```
//!
//! - `channel_map_path`: full path to a channel map CSV. If `null`, the bundled default map
//!   is used.
//! - `phi_base`: number of the first phi position in each ring, 0 or 1.
//! - `chans_per_surf`: number of channels on each SURF digitizer board.
//! - `n_phi_sectors`: number of phi sectors around the payload.
//! - `aft_fore_offset_deg`: angle between phi sector 0 and the aft-fore axis.
//!
//! ### Channel Map Format
//!
//! The channel map is a CSV file with *no* whitespaces and a header line. The columns are as
//! follows:
//!
//! ```csv
//! surf,chan,ring,phi,pol
//! ```
//!
//! `surf` and `chan` denote the digitizer location of the channel. `ring` is one of
//! `top`, `upper_middle`, `lower_middle`, `bottom`, `nadir` or `lf`. `phi` counts from zero
//! regardless of `phi_base`, and `pol` is `H` or `V`.
//!
//! The channel index of a row is `chan + chans_per_surf * surf`. A map is only accepted if
//! every (ring, phi, pol) of its rings appears once and the indices cover `0..n_rows` with no
//! gaps.
//!
//! ## Timebase
//!
//! Sample `i` of a waveform sits at `t0 + i * dt`, with `t0 = 0` unless given. The spacing
//! `dt` must be positive and finite.
pub mod address_book;
pub mod channel_map;
pub mod config;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod hardware_id;
pub mod timebase;
pub mod waveform;
