//! ReaEQ (Cockos) presets: a little-endian band list inside a program chunk
//! container with plugin id `reeq`.

use std::fmt;
use std::io::Cursor;

use binrw::{binrw, BinRead, BinWrite};
use eqp_ir::scale::{amplitude_ratio_to_db, db_to_amplitude_ratio, round_to};

use crate::fxp::{FixedName, FourCc, FxContent, FxHeader, Fxp, ProgramChunk};
use crate::FormatError;

pub const FX_ID: &str = "reeq";
pub const FX_VERSION: u32 = 1100;
/// First value of every chunk.
pub const CHUNK_VERSION: i32 = 33;

// ---------------------------------------------------------------------------
// Chunk layout
// ---------------------------------------------------------------------------

#[binrw]
#[brw(little, magic = 33i32)]
#[derive(Clone, Debug, PartialEq)]
struct RawChunk {
    #[br(temp, assert(count >= 0, "negative band count {}", count))]
    #[bw(calc = bands.len() as i32)]
    count: i32,
    #[br(count = count as usize)]
    bands: Vec<RawBand>,
    trailer: ReaEqTrailer,
}

#[binrw]
#[derive(Clone, Copy, Debug, PartialEq)]
struct RawBand {
    filter_type: i32,
    enabled: i32,
    frequency: f64,
    gain_ratio: f64,
    bandwidth_oct: f64,
    log_scale_auto_freq: i8,
}

/// Values following the band list.
#[binrw]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReaEqTrailer {
    pub unknown1: i32,
    pub unknown2: i32,
    /// Amplitude ratio; 1.0 = 0 dB
    pub output_gain: f64,
    pub unknown3: i32,
}

impl Default for ReaEqTrailer {
    fn default() -> Self {
        Self {
            unknown1: 1,
            unknown2: 1,
            output_gain: 1.0,
            unknown3: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ReaEqFilterType {
    LowShelf = 0,
    HighShelf = 1,
    BandAlt2 = 2,
    LowPass = 3,
    HighPass = 4,
    AllPass = 5,
    Notch = 6,
    BandPass = 7,
    #[default]
    Band = 8,
    BandAlt = 9,
}

impl ReaEqFilterType {
    pub fn from_i32(raw: i32) -> Result<Self, FormatError> {
        Ok(match raw {
            0 => ReaEqFilterType::LowShelf,
            1 => ReaEqFilterType::HighShelf,
            2 => ReaEqFilterType::BandAlt2,
            3 => ReaEqFilterType::LowPass,
            4 => ReaEqFilterType::HighPass,
            5 => ReaEqFilterType::AllPass,
            6 => ReaEqFilterType::Notch,
            7 => ReaEqFilterType::BandPass,
            8 => ReaEqFilterType::Band,
            9 => ReaEqFilterType::BandAlt,
            _ => {
                return Err(FormatError::MalformedEnumValue {
                    field: "filter type",
                    value: f64::from(raw),
                })
            }
        })
    }

    pub fn to_i32(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for ReaEqFilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReaEqFilterType::LowShelf => "Low Shelf",
            ReaEqFilterType::HighShelf => "High Shelf",
            ReaEqFilterType::BandAlt2 => "Band (alt 2)",
            ReaEqFilterType::LowPass => "Low Pass",
            ReaEqFilterType::HighPass => "High Pass",
            ReaEqFilterType::AllPass => "All Pass",
            ReaEqFilterType::Notch => "Notch",
            ReaEqFilterType::BandPass => "Band Pass",
            ReaEqFilterType::Band => "Band",
            ReaEqFilterType::BandAlt => "Band (alt)",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReaEqBand {
    pub filter_type: ReaEqFilterType,
    pub enabled: bool,
    /// Hz
    pub frequency: f64,
    /// dB, two decimals
    pub gain: f64,
    pub bandwidth_oct: f64,
    pub log_scale_auto_freq: bool,
}

impl Default for ReaEqBand {
    fn default() -> Self {
        Self {
            filter_type: ReaEqFilterType::Band,
            enabled: true,
            frequency: 0.0,
            gain: 0.0,
            bandwidth_oct: 0.0,
            log_scale_auto_freq: true,
        }
    }
}

impl fmt::Display for ReaEqBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} Hz  {} dB  BWOct: {}",
            self.filter_type, self.frequency, self.gain, self.bandwidth_oct
        )?;
        if !self.enabled {
            f.write_str(" (disabled)")?;
        }
        Ok(())
    }
}

impl ReaEqBand {
    fn from_raw(raw: &RawBand) -> Result<Self, FormatError> {
        Ok(Self {
            filter_type: ReaEqFilterType::from_i32(raw.filter_type)?,
            enabled: raw.enabled != 0,
            frequency: raw.frequency,
            gain: round_to(amplitude_ratio_to_db(raw.gain_ratio), 2),
            bandwidth_oct: raw.bandwidth_oct,
            log_scale_auto_freq: raw.log_scale_auto_freq != 0,
        })
    }

    fn to_raw(self) -> RawBand {
        RawBand {
            filter_type: self.filter_type.to_i32(),
            enabled: i32::from(self.enabled),
            frequency: self.frequency,
            gain_ratio: db_to_amplitude_ratio(round_to(self.gain, 2)),
            bandwidth_oct: self.bandwidth_oct,
            log_scale_auto_freq: i8::from(self.log_scale_auto_freq),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReaEq {
    pub bands: Vec<ReaEqBand>,
    pub trailer: ReaEqTrailer,
}

impl ReaEq {
    pub fn new(bands: Vec<ReaEqBand>) -> Self {
        Self {
            bands,
            trailer: ReaEqTrailer::default(),
        }
    }

    pub fn band_lines(&self) -> Vec<String> {
        self.bands.iter().map(ToString::to_string).collect()
    }

    /// Plugin chunk bytes, in plugin order.
    pub fn to_chunk(&self) -> Result<Vec<u8>, FormatError> {
        let raw = RawChunk {
            bands: self.bands.iter().map(|b| b.to_raw()).collect(),
            trailer: self.trailer,
        };
        let mut cursor = Cursor::new(Vec::new());
        raw.write(&mut cursor)?;
        Ok(cursor.into_inner())
    }

    /// Decode plugin chunk bytes. Returns `Ok(None)` when the chunk does not
    /// start with the ReaEQ chunk version.
    pub fn from_chunk(chunk: &[u8]) -> Result<Option<Self>, FormatError> {
        if !chunk.starts_with(&CHUNK_VERSION.to_le_bytes()) {
            log::debug!("not a ReaEQ chunk");
            return Ok(None);
        }
        let raw = RawChunk::read(&mut Cursor::new(chunk))?;
        let bands = raw
            .bands
            .iter()
            .map(ReaEqBand::from_raw)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Some(Self {
            bands,
            trailer: raw.trailer,
        }))
    }

    /// Single program chunk container, id `reeq`, version 1100, no name.
    pub fn to_fxp(&self) -> Result<Fxp, FormatError> {
        Ok(Fxp::new(FxContent::ProgramChunk(ProgramChunk {
            header: FxHeader::new(FourCc::from_text(FX_ID), 1, FX_VERSION),
            program_count: 1,
            name: FixedName::default(),
            chunk: self.to_chunk()?,
        })))
    }

    pub fn write_fxp(&self) -> Result<Vec<u8>, FormatError> {
        self.to_fxp()?.write()
    }

    pub fn from_fxp(fxp: &Fxp) -> Result<Option<Self>, FormatError> {
        match &fxp.content {
            FxContent::ProgramChunk(program) if program.header.fx_id == FourCc::from_text(FX_ID) => {
                Self::from_chunk(&program.chunk)
            }
            _ => Ok(None),
        }
    }

    pub fn read_fxp(data: &[u8]) -> Result<Option<Self>, FormatError> {
        match Fxp::read(data)? {
            Some(fxp) => Self::from_fxp(&fxp),
            None => Ok(None),
        }
    }
}
