//! Pieces shared by the FabFilter Pro-Q preset layouts.
//!
//! All three versions store `magic, version: u32, parameter count: u32`
//! followed by little-endian floats. Frequencies are stored log2-encoded and
//! Q values with the logarithmic Q encoding from [`eqp_ir::scale`].

use std::fmt;

use eqp_ir::scale::{freq_decode, freq_encode, q_decode, q_encode};

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::FormatError;

/// Number of band slots in every Pro-Q preset.
pub const BAND_COUNT: usize = 24;

/// Stereo processing mode of a whole Pro-Q 1/2 preset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChannelMode {
    #[default]
    LeftRight,
    MidSide,
}

impl ChannelMode {
    /// Mode selected by the preset's channel-mode tail parameter.
    pub fn from_tail(raw: f32) -> Self {
        if raw == 1.0 {
            ChannelMode::MidSide
        } else {
            ChannelMode::LeftRight
        }
    }
}

impl fmt::Display for ChannelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChannelMode::LeftRight => "Left/Right",
            ChannelMode::MidSide => "Mid/Side",
        })
    }
}

/// Header and float payload of a Pro-Q preset, uninterpreted.
#[derive(Clone, Debug, PartialEq)]
pub struct RawParameters {
    pub version: u32,
    pub parameters: Vec<f32>,
}

/// Read every declared parameter of a Pro-Q file as a plain float.
///
/// Returns `Ok(None)` when `data` does not start with `magic`.
pub fn read_raw_parameters(
    data: &[u8],
    magic: &[u8; 4],
) -> Result<Option<RawParameters>, FormatError> {
    let Some(mut r) = open(data, magic)? else {
        return Ok(None);
    };
    let version = r.read_u32()?;
    let count = r.read_u32()? as usize;
    let mut parameters = Vec::with_capacity(count.min(r.remaining() / 4));
    for _ in 0..count {
        parameters.push(r.read_f32()?);
    }
    Ok(Some(RawParameters {
        version,
        parameters,
    }))
}

/// Little-endian reader positioned after `magic`, or `None` on a mismatch.
pub(crate) fn open<'a>(
    data: &'a [u8],
    magic: &[u8; 4],
) -> Result<Option<BinaryReader<'a>>, FormatError> {
    if !data.starts_with(magic) {
        log::debug!(
            "not a {} preset (header {:?})",
            String::from_utf8_lossy(magic),
            String::from_utf8_lossy(&data[..data.len().min(4)])
        );
        return Ok(None);
    }
    let mut r = BinaryReader::new(data, Endian::Little);
    r.read_bytes(magic.len())?;
    Ok(Some(r))
}

pub(crate) fn read_frequency(r: &mut BinaryReader) -> Result<f64, FormatError> {
    Ok(freq_decode(f64::from(r.read_f32()?)))
}

pub(crate) fn write_frequency(w: &mut BinaryWriter, hz: f64) {
    w.write_f32(freq_encode(hz) as f32);
}

pub(crate) fn read_q(r: &mut BinaryReader) -> Result<f64, FormatError> {
    Ok(q_decode(f64::from(r.read_f32()?)))
}

pub(crate) fn write_q(w: &mut BinaryWriter, q: f64) {
    w.write_f32(q_encode(q) as f32);
}

pub(crate) fn read_gain(r: &mut BinaryReader) -> Result<f64, FormatError> {
    Ok(f64::from(r.read_f32()?))
}

pub(crate) fn write_gain(w: &mut BinaryWriter, db: f64) {
    w.write_f32(db as f32);
}

/// Read up to `N` trailing settings floats, keeping `defaults` for any the
/// file does not contain.
pub(crate) fn read_tail<const N: usize>(r: &mut BinaryReader, defaults: [f32; N]) -> [f32; N] {
    let mut tail = defaults;
    for (i, slot) in tail.iter_mut().enumerate() {
        match r.read_f32() {
            Ok(value) => *slot = value,
            Err(e) => {
                log::warn!("preset settings end after {} of {} values: {}", i, N, e);
                break;
            }
        }
    }
    tail
}

/// Pack floats as little-endian bytes, the layout Pro-Q bodies use.
pub(crate) fn floats_to_bytes(floats: &[f32]) -> Vec<u8> {
    floats.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Split little-endian bytes into floats; a trailing partial float is dropped.
pub(crate) fn bytes_to_floats(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_file(magic: &[u8; 4], floats: &[f32]) -> Vec<u8> {
        let mut data = magic.to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        data.extend_from_slice(&(floats.len() as u32).to_le_bytes());
        data.extend_from_slice(&floats_to_bytes(floats));
        data
    }

    #[test]
    fn raw_parameters_dump() {
        let data = raw_file(b"FQ2p", &[1.0, 9.5, -3.0]);
        let raw = read_raw_parameters(&data, b"FQ2p").unwrap().unwrap();
        assert_eq!(raw.version, 2);
        assert_eq!(raw.parameters, vec![1.0, 9.5, -3.0]);
    }

    #[test]
    fn raw_parameters_wrong_magic() {
        let data = raw_file(b"FQ2p", &[1.0]);
        assert!(read_raw_parameters(&data, b"FQ3p").unwrap().is_none());
        assert!(read_raw_parameters(b"FQ", b"FQ3p").unwrap().is_none());
    }

    #[test]
    fn raw_parameters_truncated() {
        let mut data = raw_file(b"FPQr", &[1.0, 2.0]);
        data.truncate(data.len() - 2);
        assert!(matches!(
            read_raw_parameters(&data, b"FPQr"),
            Err(FormatError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn short_tail_keeps_defaults() {
        let bytes = floats_to_bytes(&[5.0, 6.0]);
        let mut r = BinaryReader::new(&bytes, Endian::Little);
        assert_eq!(read_tail(&mut r, [0.0, 0.0, -1.0]), [5.0, 6.0, -1.0]);
    }

    #[test]
    fn channel_mode_from_tail() {
        assert_eq!(ChannelMode::from_tail(1.0), ChannelMode::MidSide);
        assert_eq!(ChannelMode::from_tail(0.0), ChannelMode::LeftRight);
        assert_eq!(ChannelMode::MidSide.to_string(), "Mid/Side");
    }

    #[test]
    fn float_bytes_round_trip() {
        let floats = [0.5, -1.0, 9.965784];
        assert_eq!(bytes_to_floats(&floats_to_bytes(&floats)), floats);
    }
}
