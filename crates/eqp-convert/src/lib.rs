//! Conversion facade for eqpreset.
//!
//! Turns REW filter listings into EQ plugin presets and describes existing
//! preset files, so the CLI (and any other front end) only talks to this
//! crate.

mod summary;

use std::fmt;
use std::str::FromStr;

use eqp_formats::{parse_rew_text, to_proq, to_proq2, to_proq3, to_reaeq};
use thiserror::Error;

// Re-export common types so callers don't need eqp-ir/eqp-formats directly.
pub use eqp_formats::{FormatError, TextParseError};
pub use eqp_ir::{FilterType, NormalizedFilterBand, NormalizedFilterSet};

pub use summary::{inspect, PresetKind, PresetSummary};

/// Preset name used when none is given.
pub const DEFAULT_PRESET_NAME: &str = "eqpreset";

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error(transparent)]
    Text(#[from] TextParseError),
    #[error("unknown target format {0:?} (expected one of: {list})", list = TargetFormat::names())]
    UnknownTarget(String),
}

/// Output format of a conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TargetFormat {
    /// Pro-Q `.ffp`
    ProQ,
    /// Pro-Q parameter program `.fxp`
    ProQFxp,
    /// Pro-Q 2 `.ffp`
    ProQ2,
    /// Pro-Q 3 `.ffp`
    ProQ3,
    /// Pro-Q 3 program chunk `.fxp`
    ProQ3Fxp,
    /// ReaEQ program chunk `.fxp`
    ReaEq,
    /// Plain-text band dump
    Text,
}

impl TargetFormat {
    pub const ALL: [TargetFormat; 7] = [
        TargetFormat::ProQ,
        TargetFormat::ProQFxp,
        TargetFormat::ProQ2,
        TargetFormat::ProQ3,
        TargetFormat::ProQ3Fxp,
        TargetFormat::ReaEq,
        TargetFormat::Text,
    ];

    /// Command-line name.
    pub fn name(self) -> &'static str {
        match self {
            TargetFormat::ProQ => "proq",
            TargetFormat::ProQFxp => "proq-fxp",
            TargetFormat::ProQ2 => "proq2",
            TargetFormat::ProQ3 => "proq3",
            TargetFormat::ProQ3Fxp => "proq3-fxp",
            TargetFormat::ReaEq => "reaeq",
            TargetFormat::Text => "txt",
        }
    }

    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            TargetFormat::ProQ | TargetFormat::ProQ2 | TargetFormat::ProQ3 => "ffp",
            TargetFormat::ProQFxp | TargetFormat::ProQ3Fxp | TargetFormat::ReaEq => "fxp",
            TargetFormat::Text => "txt",
        }
    }

    fn names() -> String {
        Self::ALL
            .iter()
            .map(|t| t.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for TargetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TargetFormat {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConvertError::UnknownTarget(s.to_owned()))
    }
}

/// Conversion settings.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvertOptions {
    /// Decimal mark of the input listing; `None` means `.` (not the OS locale)
    pub decimal_separator: Option<char>,
    /// Name stored in formats that carry one
    pub preset_name: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            decimal_separator: None,
            preset_name: DEFAULT_PRESET_NAME.to_owned(),
        }
    }
}

/// Headless converter from filter listings to preset bytes.
#[derive(Clone, Debug, Default)]
pub struct Converter {
    options: ConvertOptions,
}

impl Converter {
    pub fn new(options: ConvertOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    pub fn parse_filters(&self, text: &str) -> Result<NormalizedFilterSet, ConvertError> {
        let filters = parse_rew_text(text, self.options.decimal_separator)?;
        log::info!("parsed {} filter bands", filters.len());
        Ok(filters)
    }

    pub fn encode(
        &self,
        filters: &NormalizedFilterSet,
        target: TargetFormat,
    ) -> Result<Vec<u8>, ConvertError> {
        let name = self.options.preset_name.as_str();
        let bytes = match target {
            TargetFormat::ProQ => to_proq(filters).write_ffp(),
            TargetFormat::ProQFxp => to_proq(filters).write_fxp(name)?,
            TargetFormat::ProQ2 => to_proq2(filters).write_ffp(),
            TargetFormat::ProQ3 => to_proq3(filters).write_ffp(),
            TargetFormat::ProQ3Fxp => to_proq3(filters).write_fxp(name)?,
            TargetFormat::ReaEq => to_reaeq(filters).write_fxp()?,
            TargetFormat::Text => filters.to_string().into_bytes(),
        };
        log::debug!("encoded {} bytes as {}", bytes.len(), target);
        Ok(bytes)
    }

    /// Parse a listing and encode it in one step.
    pub fn convert(&self, text: &str, target: TargetFormat) -> Result<Vec<u8>, ConvertError> {
        let filters = self.parse_filters(text)?;
        self.encode(&filters, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "Equaliser: Generic\n\
Filter  1: ON  PK       Fc    63,8 Hz  Gain  -5,0 dB  Q  8,06\n";

    fn converter() -> Converter {
        Converter::new(ConvertOptions {
            decimal_separator: Some(','),
            preset_name: "Test".to_owned(),
        })
    }

    #[test]
    fn target_names_round_trip() {
        for target in TargetFormat::ALL {
            assert_eq!(target.name().parse::<TargetFormat>().unwrap(), target);
        }
        assert_eq!("ProQ3-FXP".parse::<TargetFormat>().unwrap(), TargetFormat::ProQ3Fxp);
        assert!(matches!(
            "vst3".parse::<TargetFormat>(),
            Err(ConvertError::UnknownTarget(name)) if name == "vst3"
        ));
    }

    #[test]
    fn extensions() {
        assert_eq!(TargetFormat::ProQ2.extension(), "ffp");
        assert_eq!(TargetFormat::ProQ3Fxp.extension(), "fxp");
        assert_eq!(TargetFormat::ReaEq.extension(), "fxp");
        assert_eq!(TargetFormat::Text.extension(), "txt");
    }

    #[test]
    fn default_options() {
        let options = ConvertOptions::default();
        assert_eq!(options.preset_name, "eqpreset");
        assert_eq!(options.decimal_separator, None);
    }

    #[test]
    fn default_options_read_decimal_points() {
        let listing = "Equaliser: Generic\n\
Filter  1: ON  PK       Fc    63.8 Hz  Gain  -5.0 dB  Q  8.06\n";
        let filters = Converter::default().parse_filters(listing).unwrap();
        assert_eq!(filters.bands()[0].frequency_hz(), 63.8);
        assert_eq!(filters.bands()[0].gain_db(), -5.0);
    }

    #[test]
    fn every_target_encodes() {
        let converter = converter();
        for target in TargetFormat::ALL {
            let bytes = converter.convert(LISTING, target).unwrap();
            assert!(!bytes.is_empty(), "{} produced no bytes", target);
        }
    }

    #[test]
    fn text_target_dumps_bands() {
        let bytes = converter().convert(LISTING, TargetFormat::Text).unwrap();
        assert_eq!(
            String::from_utf8(bytes).unwrap(),
            "PK: 63.80 Hz -5.00 dB Q: 8.0600 BWOct: 0.1789\n"
        );
    }

    #[test]
    fn parse_errors_pass_through() {
        assert!(matches!(
            converter().convert("nothing here", TargetFormat::ProQ),
            Err(ConvertError::Text(TextParseError::UnsupportedTextLayout))
        ));
    }
}
