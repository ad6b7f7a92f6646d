//! Normalized filter sets to vendor presets.

use eqp_ir::{FilterType, NormalizedFilterBand, NormalizedFilterSet};

use crate::fabfilter::BAND_COUNT;
use crate::proq::{ProQ, ProQBand, ProQShape, ProQSlope, ProQStereoPlacement};
use crate::proq2::{ProQ2, ProQ2Band, ProQ2Shape, ProQ2Slope, ProQ2StereoPlacement};
use crate::proq3::{ProQ3, ProQ3Band, ProQ3Shape, ProQ3Slope, ProQ3StereoPlacement};
use crate::reaeq::{ReaEq, ReaEqBand, ReaEqFilterType};

/// Map the first 24 bands with `map`, padding the rest with `default`.
fn fill_slots<B: Copy>(
    filters: &NormalizedFilterSet,
    default: B,
    target: &str,
    map: impl Fn(&NormalizedFilterBand) -> B,
) -> [B; BAND_COUNT] {
    if filters.len() > BAND_COUNT {
        log::warn!(
            "{} holds {} bands; dropping {} of {}",
            target,
            BAND_COUNT,
            filters.len() - BAND_COUNT,
            filters.len()
        );
    }
    let mut slots = [default; BAND_COUNT];
    for (slot, band) in slots.iter_mut().zip(filters.iter()) {
        *slot = map(band);
    }
    slots
}

pub fn to_proq(filters: &NormalizedFilterSet) -> ProQ {
    let bands = fill_slots(filters, ProQBand::DEFAULT, "Pro-Q", |band| ProQBand {
        frequency: band.frequency_hz(),
        gain: band.gain_db(),
        q: band.q(),
        shape: match band.filter_type() {
            FilterType::Peak => ProQShape::Bell,
            FilterType::LowPass => ProQShape::HighCut,
            FilterType::HighPass => ProQShape::LowCut,
            FilterType::LowShelf => ProQShape::LowShelf,
            FilterType::HighShelf => ProQShape::HighShelf,
            _ => ProQShape::Bell,
        },
        slope: ProQSlope::Slope24dB,
        stereo_placement: ProQStereoPlacement::Stereo,
        enabled: band.enabled(),
        ..ProQBand::DEFAULT
    });
    ProQ {
        version: 2,
        bands,
        display_range: 2.0,
        analyzer: 3.0,
        analyzer_resolution: 1.0,
        analyzer_speed: 2.0,
        solo_band: -1.0,
        ..ProQ::default()
    }
}

pub fn to_proq2(filters: &NormalizedFilterSet) -> ProQ2 {
    let bands = fill_slots(filters, ProQ2Band::DEFAULT, "Pro-Q 2", |band| ProQ2Band {
        enabled: band.enabled(),
        frequency: band.frequency_hz(),
        gain: band.gain_db(),
        q: band.q(),
        shape: match band.filter_type() {
            FilterType::Peak => ProQ2Shape::Bell,
            FilterType::LowPass => ProQ2Shape::HighCut,
            FilterType::HighPass => ProQ2Shape::LowCut,
            FilterType::LowShelf => ProQ2Shape::LowShelf,
            FilterType::HighShelf => ProQ2Shape::HighShelf,
            _ => ProQ2Shape::Bell,
        },
        slope: ProQ2Slope::Slope24dB,
        stereo_placement: ProQ2StereoPlacement::Stereo,
    });
    ProQ2 {
        bands,
        ..ProQ2::default()
    }
}

pub fn to_proq3(filters: &NormalizedFilterSet) -> ProQ3 {
    let bands = fill_slots(filters, ProQ3Band::DEFAULT, "Pro-Q 3", |band| ProQ3Band {
        enabled: band.enabled(),
        frequency: band.frequency_hz(),
        gain: band.gain_db(),
        q: band.q(),
        shape: match band.filter_type() {
            FilterType::Peak => ProQ3Shape::Bell,
            FilterType::LowPass => ProQ3Shape::HighCut,
            FilterType::HighPass => ProQ3Shape::LowCut,
            FilterType::LowShelf => ProQ3Shape::LowShelf,
            FilterType::HighShelf => ProQ3Shape::HighShelf,
            _ => ProQ3Shape::Bell,
        },
        slope: ProQ3Slope::Slope24dB,
        stereo_placement: ProQ3StereoPlacement::Stereo,
        ..ProQ3Band::DEFAULT
    });
    ProQ3 {
        bands,
        ..ProQ3::default()
    }
}

/// ReaEQ keeps every band; there is no slot limit.
pub fn to_reaeq(filters: &NormalizedFilterSet) -> ReaEq {
    let bands = filters
        .iter()
        .map(|band| ReaEqBand {
            filter_type: match band.filter_type() {
                FilterType::Peak => ReaEqFilterType::Band,
                FilterType::LowPass => ReaEqFilterType::LowPass,
                FilterType::HighPass => ReaEqFilterType::HighPass,
                FilterType::LowShelf => ReaEqFilterType::LowShelf,
                FilterType::HighShelf => ReaEqFilterType::HighShelf,
                _ => ReaEqFilterType::Band,
            },
            enabled: band.enabled(),
            frequency: band.frequency_hz(),
            gain: band.gain_db(),
            bandwidth_oct: band.bandwidth_oct(),
            ..ReaEqBand::default()
        })
        .collect();
    ReaEq::new(bands)
}
