//! Normalized filter model.

use alloc::vec::Vec;
use core::fmt;

use crate::scale::{bandwidth_hz, bw_oct_to_q, q_to_bw_oct, round_to};

/// Decimal places kept when Q or bandwidth is derived from the other.
const DERIVED_PRECISION: i32 = 4;

/// Filter topology vocabulary of room-measurement exports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FilterType {
    Peak = 0,
    LowPass = 1,
    HighPass = 2,
    LowShelf = 3,
    HighShelf = 4,
    Notch = 5,
    Modal = 6,
    LowShelf6dB = 7,
    HighShelf6dB = 8,
    LowShelf12dB = 9,
    HighShelf12dB = 10,
    LowPassQ = 11,
    HighPassQ = 12,
}

impl FilterType {
    /// Short tag as printed in filter listings.
    pub fn tag(self) -> &'static str {
        match self {
            FilterType::Peak => "PK",
            FilterType::LowPass => "LP",
            FilterType::HighPass => "HP",
            FilterType::LowShelf => "LS",
            FilterType::HighShelf => "HS",
            FilterType::Notch => "NO",
            FilterType::Modal => "MO",
            FilterType::LowShelf6dB => "LS6dB",
            FilterType::HighShelf6dB => "HS6dB",
            FilterType::LowShelf12dB => "LS12dB",
            FilterType::HighShelf12dB => "HS12dB",
            FilterType::LowPassQ => "LPQ",
            FilterType::HighPassQ => "HPQ",
        }
    }
}

/// One parametric band of a parsed filter listing.
///
/// Q and bandwidth in octaves always describe the same filter: whichever one
/// the source omitted is derived from the other. Bands are immutable once
/// built.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedFilterBand {
    filter_type: FilterType,
    enabled: bool,
    frequency_hz: f64,
    gain_db: f64,
    q: f64,
    bandwidth_oct: f64,
    bandwidth_hz: f64,
}

impl NormalizedFilterBand {
    /// Band specified by Q; bandwidth in octaves is derived.
    pub fn with_q(
        filter_type: FilterType,
        enabled: bool,
        frequency_hz: f64,
        gain_db: f64,
        q: f64,
    ) -> Self {
        let bandwidth_oct = round_to(q_to_bw_oct(q), DERIVED_PRECISION);
        Self::from_parts(filter_type, enabled, frequency_hz, gain_db, q, bandwidth_oct)
    }

    /// Band specified by bandwidth in octaves; Q is derived.
    pub fn with_bandwidth(
        filter_type: FilterType,
        enabled: bool,
        frequency_hz: f64,
        gain_db: f64,
        bandwidth_oct: f64,
    ) -> Self {
        let q = round_to(bw_oct_to_q(bandwidth_oct), DERIVED_PRECISION);
        Self::from_parts(filter_type, enabled, frequency_hz, gain_db, q, bandwidth_oct)
    }

    fn from_parts(
        filter_type: FilterType,
        enabled: bool,
        frequency_hz: f64,
        gain_db: f64,
        q: f64,
        bandwidth_oct: f64,
    ) -> Self {
        Self {
            filter_type,
            enabled,
            frequency_hz,
            gain_db,
            q,
            bandwidth_oct,
            bandwidth_hz: bandwidth_hz(frequency_hz, q),
        }
    }

    pub fn filter_type(&self) -> FilterType {
        self.filter_type
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn frequency_hz(&self) -> f64 {
        self.frequency_hz
    }

    pub fn gain_db(&self) -> f64 {
        self.gain_db
    }

    pub fn q(&self) -> f64 {
        self.q
    }

    pub fn bandwidth_oct(&self) -> f64 {
        self.bandwidth_oct
    }

    /// Bandwidth in Hz (`frequency / q`).
    pub fn bandwidth_hz(&self) -> f64 {
        self.bandwidth_hz
    }
}

impl fmt::Display for NormalizedFilterBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {:.2} Hz {:.2} dB Q: {:.4} BWOct: {:.4}",
            self.filter_type.tag(),
            self.frequency_hz,
            self.gain_db,
            self.q,
            self.bandwidth_oct
        )?;
        if !self.enabled {
            write!(f, " (disabled)")?;
        }
        Ok(())
    }
}

/// Bands in order of appearance in the source listing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedFilterSet {
    bands: Vec<NormalizedFilterBand>,
}

impl NormalizedFilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, band: NormalizedFilterBand) {
        self.bands.push(band);
    }

    pub fn bands(&self) -> &[NormalizedFilterBand] {
        &self.bands
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn iter(&self) -> core::slice::Iter<'_, NormalizedFilterBand> {
        self.bands.iter()
    }
}

impl FromIterator<NormalizedFilterBand> for NormalizedFilterSet {
    fn from_iter<I: IntoIterator<Item = NormalizedFilterBand>>(iter: I) -> Self {
        Self {
            bands: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a NormalizedFilterSet {
    type Item = &'a NormalizedFilterBand;
    type IntoIter = core::slice::Iter<'a, NormalizedFilterBand>;

    fn into_iter(self) -> Self::IntoIter {
        self.bands.iter()
    }
}

/// One line per band; this is the plain-text dump format.
impl fmt::Display for NormalizedFilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for band in &self.bands {
            writeln!(f, "{}", band)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn with_q_derives_bandwidth() {
        let band = NormalizedFilterBand::with_q(FilterType::Peak, true, 63.8, -5.0, 8.06);
        assert_eq!(band.bandwidth_oct(), 0.1789);
        assert_eq!(band.q(), 8.06);
        assert!((band.bandwidth_hz() - 63.8 / 8.06).abs() < 1e-12);
    }

    #[test]
    fn with_bandwidth_derives_q() {
        let band = NormalizedFilterBand::with_bandwidth(FilterType::Peak, true, 64.0, -4.0, 0.167);
        assert_eq!(band.q(), 8.6341);
        assert_eq!(band.bandwidth_oct(), 0.167);
        assert!((band.bandwidth_hz() - 64.0 / 8.6341).abs() < 1e-12);
    }

    #[test]
    fn set_keeps_source_order() {
        let set: NormalizedFilterSet = [500.0, 40.0, 8000.0]
            .iter()
            .map(|&hz| NormalizedFilterBand::with_q(FilterType::Peak, true, hz, 0.0, 1.0))
            .collect();
        let freqs: Vec<f64> = set.iter().map(|b| b.frequency_hz()).collect();
        assert_eq!(freqs, [500.0, 40.0, 8000.0]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn display_dump() {
        let mut set = NormalizedFilterSet::new();
        set.push(NormalizedFilterBand::with_q(FilterType::Peak, true, 63.8, -5.0, 8.06));
        set.push(NormalizedFilterBand::with_q(FilterType::Notch, false, 1000.0, 0.0, 1.0));
        assert_eq!(
            set.to_string(),
            "PK: 63.80 Hz -5.00 dB Q: 8.0600 BWOct: 0.1789\n\
             NO: 1000.00 Hz 0.00 dB Q: 1.0000 BWOct: 1.3885 (disabled)\n"
        );
    }

    #[test]
    fn filter_type_tags() {
        assert_eq!(FilterType::LowShelf12dB.tag(), "LS12dB");
        assert_eq!(FilterType::HighPassQ as u8, 12);
    }
}
