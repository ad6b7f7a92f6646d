//! Preset codecs for eqpreset.
//!
//! Reads and writes VST FXP/FXB containers, FabFilter Pro-Q 1/2/3 `.ffp`
//! presets and ReaEQ chunks, parses REW filter listings into the IR, and maps
//! the IR onto each vendor's band layout.

mod binary;
mod chunk_xml;
mod fabfilter;
mod float_enum;
mod fxp;
mod mapping;
mod proq;
mod proq2;
mod proq3;
mod reaeq;
mod rew_text;

pub use binary::{BinaryReader, BinaryWriter, Endian, DEFAULT_CAPACITY};
pub use chunk_xml::XmlDocument;
pub use fabfilter::{read_raw_parameters, ChannelMode, RawParameters, BAND_COUNT};
pub use fxp::{
    reverse_chunk, wrap_raw, Bank, BankChunk, FixedName, FourCc, FxContent, FxHeader, Fxp, Program,
    ProgramChunk, CHUNK_MAGIC,
};
pub use mapping::{to_proq, to_proq2, to_proq3, to_reaeq};
pub use proq::{ProQ, ProQBand, ProQShape, ProQSlope, ProQStereoPlacement};
pub use proq2::{
    ProQ2, ProQ2Band, ProQ2Settings, ProQ2Shape, ProQ2Slope, ProQ2StereoPlacement,
};
pub use proq3::{ProQ3, ProQ3Band, ProQ3Shape, ProQ3Slope, ProQ3StereoPlacement};
pub use reaeq::{ReaEq, ReaEqBand, ReaEqFilterType, ReaEqTrailer};
pub use rew_text::parse_rew_text;

use thiserror::Error;

/// Error type for binary preset decoding and encoding.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A read needed more bytes than the buffer has left
    #[error(
        "operation requires an additional {required} bytes but only {available} bytes are available ({shortfall} missing)"
    )]
    OutOfBounds {
        required: usize,
        available: usize,
        shortfall: usize,
    },
    /// Seek outside the readable or written range
    #[error("seek position {position} is outside 0..{length}")]
    SeekOutOfRange { position: i64, length: usize },
    /// Magic or tag does not match the expected layout
    #[error("expected {expected} header, found {found:?}")]
    UnrecognizedFormat { expected: &'static str, found: String },
    /// Stored enum value outside the defined variants
    #[error("{field} is outside range: {value}")]
    MalformedEnumValue { field: &'static str, value: f64 },
    /// A count does not fit the field that stores it
    #[error("{field} count {value} is invalid")]
    InvalidCount { field: &'static str, value: i64 },
    /// Fixed-record layout error from binrw, reduced to its root cause
    #[error("binary layout error: {message}")]
    Layout { message: String },
}

impl From<binrw::Error> for FormatError {
    fn from(err: binrw::Error) -> Self {
        // binrw's Display renders a coloured multi-line backtrace.
        let message = match err.root_cause() {
            binrw::Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                "unexpected end of data".to_owned()
            }
            binrw::Error::Io(e) => e.to_string(),
            binrw::Error::BadMagic { pos, .. } => format!("bad magic at offset {}", pos),
            binrw::Error::AssertFail { pos, message } => {
                format!("{} at offset {}", message, pos)
            }
            binrw::Error::Custom { pos, .. } => format!("invalid value at offset {}", pos),
            _ => "malformed record".to_owned(),
        };
        FormatError::Layout { message }
    }
}

impl FormatError {
    pub(crate) fn out_of_bounds(required: usize, available: usize) -> Self {
        FormatError::OutOfBounds {
            required,
            available,
            shortfall: required.saturating_sub(available),
        }
    }
}

/// Error type for REW filter listing parsing.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TextParseError {
    /// Neither the legacy nor the tabular layout was recognized
    #[error("text is neither a legacy nor a tabular REW filter listing")]
    UnsupportedTextLayout,
    /// `Equaliser:` header naming a profile without a known line layout
    #[error("no known equaliser format: {0:?}")]
    UnsupportedEqualiser(String),
    /// Filter line that does not fit the active layout
    #[error("line {line}: could not parse filter line {text:?}")]
    MalformedFilterLine { line: usize, text: String },
    /// Numeric field that holds no number
    #[error("line {line}: cannot read {field} from {text:?}")]
    InvalidNumber {
        line: usize,
        field: &'static str,
        text: String,
    },
    /// Filter line pattern failed to compile
    #[error("invalid filter line pattern: {0}")]
    Pattern(String),
}
