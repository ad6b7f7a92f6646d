//! Core IR types for eqpreset.
//!
//! This crate defines the normalized filter model produced by the text
//! parsers and consumed by the vendor mappers, plus the numeric scale
//! conversions shared by every codec.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod filter;
pub mod scale;

pub use filter::{FilterType, NormalizedFilterBand, NormalizedFilterSet};
pub use scale::{
    amplitude_ratio_to_db, bandwidth_hz, bw_oct_to_q, db_to_amplitude_ratio,
    default_decimal_separator, freq_decode, freq_encode, parse_decimal, q_decode, q_encode,
    q_to_bw_oct, round_to,
};
