//! FabFilter Pro-Q 3 presets, magic `FQ3p`.
//!
//! Each of the 24 band records holds 13 floats:
//!
//! ```text
//! enabled, ?, frequency, gain, dynamic range, ?, dynamic threshold,
//! q, shape, slope, stereo placement, ?, ?
//! ```
//!
//! Whatever follows the bands is kept as opaque floats. Inside an FXP the
//! body is wrapped in an `FFBS` blob that also carries the preset name.

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::fabfilter::{
    open, read_frequency, read_gain, read_q, write_frequency, write_gain, write_q, BAND_COUNT,
};
use crate::float_enum::float_enum;
use crate::fxp::{wrap_raw, FxContent, Fxp};
use crate::FormatError;

pub const MAGIC: &[u8; 4] = b"FQ3p";
pub const VERSION: u32 = 4;

const FLOATS_PER_BAND: usize = 13;
const BAND_FLOATS: u32 = (BAND_COUNT * FLOATS_PER_BAND) as u32;

const BLOB_MAGIC: &[u8; 4] = b"FFBS";
/// Format word after `FFBS`. The blob carries no preset version, so decoded
/// presets report [`VERSION`].
const BLOB_FORMAT: u32 = 1;
const PLUGIN_NAME: &str = "Pro-Q";

float_enum! {
    pub enum ProQ3Shape("filter type") {
        #[default]
        Bell = 0 => "Bell",
        LowShelf = 1 => "Low Shelf",
        LowCut = 2 => "Low Cut",
        HighShelf = 3 => "High Shelf",
        HighCut = 4 => "High Cut",
        Notch = 5 => "Notch",
        BandPass = 6 => "Band Pass",
        TiltShelf = 7 => "Tilt Shelf",
        FlatTilt = 8 => "Flat Tilt",
    }
}

float_enum! {
    pub enum ProQ3Slope("filter slope") {
        Slope6dB = 0 => "6 dB/oct",
        Slope12dB = 1 => "12 dB/oct",
        Slope18dB = 2 => "18 dB/oct",
        #[default]
        Slope24dB = 3 => "24 dB/oct",
        Slope30dB = 4 => "30 dB/oct",
        Slope36dB = 5 => "36 dB/oct",
        Slope48dB = 6 => "48 dB/oct",
        Slope72dB = 7 => "72 dB/oct",
        Slope96dB = 8 => "96 dB/oct",
        Brickwall = 9 => "Brickwall",
    }
}

float_enum! {
    pub enum ProQ3StereoPlacement("stereo placement") {
        Left = 0 => "Left",
        Right = 1 => "Right",
        #[default]
        Stereo = 2 => "Stereo",
        Mid = 3 => "Mid",
        Side = 4 => "Side",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProQ3Band {
    pub enabled: bool,
    /// Hz
    pub frequency: f64,
    /// dB
    pub gain: f64,
    /// dB; zero when the band is static
    pub dynamic_range: f32,
    /// 1.0 = auto
    pub dynamic_threshold: f32,
    pub q: f64,
    pub shape: ProQ3Shape,
    pub slope: ProQ3Slope,
    pub stereo_placement: ProQ3StereoPlacement,
    /// Record floats 1, 5, 11 and 12, kept as read
    pub unknown: [f32; 4],
}

impl ProQ3Band {
    pub const DEFAULT: ProQ3Band = ProQ3Band {
        enabled: false,
        frequency: 1000.0,
        gain: 0.0,
        dynamic_range: 0.0,
        dynamic_threshold: 1.0,
        q: 1.0,
        shape: ProQ3Shape::Bell,
        slope: ProQ3Slope::Slope24dB,
        stereo_placement: ProQ3StereoPlacement::Stereo,
        unknown: [1.0, 1.0, 1.0, 0.0],
    };

    pub fn describe(&self) -> String {
        let mut line = format!(
            "{} | {} | {} @ {:.1} Hz | Gain: {:.1} dB | Q: {:.2} | {}",
            if self.enabled { "Enabled" } else { "Disabled" },
            self.stereo_placement,
            self.shape,
            self.frequency,
            self.gain,
            self.q,
            self.slope
        );
        if self.dynamic_range != 0.0 {
            line.push_str(&format!(
                " | Dynamic: {:.1} dB (threshold {:.2})",
                self.dynamic_range, self.dynamic_threshold
            ));
        }
        line
    }

    fn read(r: &mut BinaryReader) -> Result<Self, FormatError> {
        let enabled = r.read_f32()? == 1.0;
        let u0 = r.read_f32()?;
        let frequency = read_frequency(r)?;
        let gain = read_gain(r)?;
        let dynamic_range = r.read_f32()?;
        let u1 = r.read_f32()?;
        let dynamic_threshold = r.read_f32()?;
        let q = read_q(r)?;
        let shape = ProQ3Shape::from_f32(r.read_f32()?)?;
        let slope = ProQ3Slope::from_f32(r.read_f32()?)?;
        let stereo_placement = ProQ3StereoPlacement::from_f32(r.read_f32()?)?;
        let u2 = r.read_f32()?;
        let u3 = r.read_f32()?;
        Ok(Self {
            enabled,
            frequency,
            gain,
            dynamic_range,
            dynamic_threshold,
            q,
            shape,
            slope,
            stereo_placement,
            unknown: [u0, u1, u2, u3],
        })
    }

    fn write(&self, w: &mut BinaryWriter) {
        let [u0, u1, u2, u3] = self.unknown;
        w.write_f32(if self.enabled { 1.0 } else { 0.0 });
        w.write_f32(u0);
        write_frequency(w, self.frequency);
        write_gain(w, self.gain);
        w.write_f32(self.dynamic_range);
        w.write_f32(u1);
        w.write_f32(self.dynamic_threshold);
        write_q(w, self.q);
        w.write_f32(self.shape.to_f32());
        w.write_f32(self.slope.to_f32());
        w.write_f32(self.stereo_placement.to_f32());
        w.write_f32(u2);
        w.write_f32(u3);
    }
}

impl Default for ProQ3Band {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProQ3 {
    pub version: u32,
    pub bands: [ProQ3Band; BAND_COUNT],
    /// Floats after the band records
    pub unknown_parameters: Vec<f32>,
}

impl Default for ProQ3 {
    fn default() -> Self {
        Self {
            version: VERSION,
            bands: [ProQ3Band::DEFAULT; BAND_COUNT],
            unknown_parameters: Vec::new(),
        }
    }
}

impl ProQ3 {
    /// Declared parameter count: band floats plus the opaque tail.
    pub fn parameter_count(&self) -> u32 {
        BAND_FLOATS.saturating_add(self.unknown_parameters.len() as u32)
    }

    pub fn band_lines(&self) -> Vec<String> {
        self.bands.iter().map(ProQ3Band::describe).collect()
    }

    /// Decode an `.ffp` preset. Returns `Ok(None)` when the magic is not `FQ3p`.
    pub fn read_ffp(data: &[u8]) -> Result<Option<Self>, FormatError> {
        let Some(mut r) = open(data, MAGIC)? else {
            return Ok(None);
        };
        let version = r.read_u32()?;
        Self::read_body(&mut r, version).map(Some)
    }

    pub fn write_ffp(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_bytes(MAGIC);
        w.write_u32(self.version);
        self.write_body(&mut w);
        w.into_bytes()
    }

    /// Parameter count, bands and tail.
    fn read_body(r: &mut BinaryReader, version: u32) -> Result<Self, FormatError> {
        let parameter_count = r.read_u32()?;
        let mut bands = [ProQ3Band::DEFAULT; BAND_COUNT];
        for band in bands.iter_mut() {
            *band = ProQ3Band::read(r)?;
        }
        let tail_len = parameter_count.saturating_sub(BAND_FLOATS) as usize;
        let mut unknown_parameters = Vec::with_capacity(tail_len.min(r.remaining() / 4));
        for _ in 0..tail_len {
            match r.read_f32() {
                Ok(value) => unknown_parameters.push(value),
                Err(e) => {
                    log::warn!(
                        "Pro-Q 3 preset ends after {} of {} trailing values: {}",
                        unknown_parameters.len(),
                        tail_len,
                        e
                    );
                    break;
                }
            }
        }
        Ok(Self {
            version,
            bands,
            unknown_parameters,
        })
    }

    fn write_body(&self, w: &mut BinaryWriter) {
        w.write_u32(self.parameter_count());
        for band in &self.bands {
            band.write(w);
        }
        for &value in &self.unknown_parameters {
            w.write_f32(value);
        }
    }

    // -----------------------------------------------------------------------
    // FXP (FFBS blob in a program chunk)
    // -----------------------------------------------------------------------

    fn write_blob(&self, name: &str) -> Vec<u8> {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_bytes(BLOB_MAGIC);
        w.write_u32(BLOB_FORMAT);
        self.write_body(&mut w);
        w.write_bytes(MAGIC);
        w.write_u32(1);
        w.write_u32(name.len() as u32);
        w.write_string(name);
        w.write_u32(u32::MAX);
        w.write_u32(1);
        w.write_u32(PLUGIN_NAME.len() as u32);
        w.write_string(PLUGIN_NAME);
        w.into_bytes()
    }

    /// Program chunk container with id `FQ3p` holding the `FFBS` blob.
    pub fn write_fxp(&self, name: &str) -> Result<Vec<u8>, FormatError> {
        wrap_raw(&self.write_blob(name), "FQ3p")
    }

    /// Decode the `FFBS` blob of a program chunk, returning the preset name.
    /// Returns `Ok(None)` when the container holds something else.
    pub fn from_fxp(fxp: &Fxp) -> Result<Option<(Self, String)>, FormatError> {
        let FxContent::ProgramChunk(program) = &fxp.content else {
            return Ok(None);
        };
        if program.header.fx_id.0 != *MAGIC || !program.chunk.starts_with(BLOB_MAGIC) {
            return Ok(None);
        }
        let mut r = BinaryReader::new(&program.chunk, Endian::Little);
        r.read_bytes(BLOB_MAGIC.len())?;
        let blob_format = r.read_u32()?;
        if blob_format != BLOB_FORMAT {
            log::warn!(
                "Pro-Q 3 chunk format word is {}, expected {}; decoding anyway",
                blob_format,
                BLOB_FORMAT
            );
        }
        let preset = Self::read_body(&mut r, VERSION)?;

        let mut name = String::new();
        if r.remaining() >= 12 && r.read_array::<4>()? == *MAGIC {
            let _ = r.read_u32()?;
            let len = r.read_u32()? as usize;
            name = r.read_string(len)?;
        } else {
            log::debug!("Pro-Q 3 chunk has no preset name trailer");
        }
        Ok(Some((preset, name)))
    }

    pub fn read_fxp(data: &[u8]) -> Result<Option<(Self, String)>, FormatError> {
        match Fxp::read(data)? {
            Some(fxp) => Self::from_fxp(&fxp),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ProQ3 {
        let mut preset = ProQ3::default();
        preset.bands[0] = ProQ3Band {
            enabled: true,
            frequency: 440.0,
            gain: -2.5,
            q: 4.0,
            shape: ProQ3Shape::FlatTilt,
            slope: ProQ3Slope::Brickwall,
            stereo_placement: ProQ3StereoPlacement::Side,
            ..ProQ3Band::DEFAULT
        };
        preset.bands[1] = ProQ3Band {
            enabled: true,
            frequency: 3000.0,
            dynamic_range: -6.0,
            dynamic_threshold: 0.6666667,
            ..ProQ3Band::DEFAULT
        };
        preset
    }

    #[test]
    fn band_record_order() {
        let bytes = sample().write_ffp();
        assert_eq!(&bytes[0..4], b"FQ3p");
        assert_eq!(&bytes[4..8], &4u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &312u32.to_le_bytes());
        assert_eq!(bytes.len(), 12 + 312 * 4);
        let floats: Vec<f32> = bytes[12..12 + 13 * 4]
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes(c.try_into().unwrap()))
            .collect();
        assert_eq!(floats[0], 1.0);
        assert_eq!(floats[1], 1.0);
        assert!((floats[2] - 440.0f32.log2()).abs() < 1e-5);
        assert_eq!(floats[3], -2.5);
        assert_eq!(floats[6], 1.0);
        assert_eq!(&floats[8..11], &[8.0, 9.0, 4.0]);
        assert_eq!(&floats[11..13], &[1.0, 0.0]);
    }

    #[test]
    fn padding_bands_are_disabled() {
        let bytes = sample().write_ffp();
        let third = 12 + 2 * 13 * 4;
        assert_eq!(&bytes[third..third + 4], &0.0f32.to_le_bytes());
    }

    #[test]
    fn tail_is_preserved() {
        let mut preset = sample();
        preset.unknown_parameters = vec![0.5; 22];
        let bytes = preset.write_ffp();
        assert_eq!(&bytes[8..12], &334u32.to_le_bytes());
        let decoded = ProQ3::read_ffp(&bytes).unwrap().unwrap();
        assert_eq!(decoded.unknown_parameters, vec![0.5; 22]);
        assert_eq!(decoded.bands[1].dynamic_range, -6.0);
        assert_eq!(decoded.write_ffp(), bytes);
    }

    #[test]
    fn bad_placement_is_reported() {
        let mut bytes = sample().write_ffp();
        let placement = 12 + 10 * 4;
        bytes[placement..placement + 4].copy_from_slice(&5.0f32.to_le_bytes());
        assert!(matches!(
            ProQ3::read_ffp(&bytes),
            Err(FormatError::MalformedEnumValue {
                field: "stereo placement",
                ..
            })
        ));
    }

    #[test]
    fn describe_shows_dynamics() {
        let preset = sample();
        assert_eq!(
            preset.bands[0].describe(),
            "Enabled | Side | Flat Tilt @ 440.0 Hz | Gain: -2.5 dB | Q: 4.00 | Brickwall"
        );
        assert!(preset.bands[1]
            .describe()
            .ends_with("| Dynamic: -6.0 dB (threshold 0.67)"));
    }

    #[test]
    fn fxp_blob_layout() {
        let bytes = sample().write_fxp("Vocal").unwrap();
        let fxp = Fxp::read(&bytes).unwrap().unwrap();
        assert_eq!(fxp.content.header().fx_id.to_string(), "FQ3p");
        let blob = fxp.content.chunk().unwrap();
        assert_eq!(&blob[0..4], b"FFBS");
        assert_eq!(&blob[4..8], &1u32.to_le_bytes());
        assert_eq!(&blob[8..12], &312u32.to_le_bytes());
        let trailer = 12 + 312 * 4;
        assert_eq!(&blob[trailer..trailer + 4], b"FQ3p");
        assert_eq!(&blob[trailer + 8..trailer + 12], &5u32.to_le_bytes());
        assert_eq!(&blob[trailer + 12..trailer + 17], b"Vocal");
        assert_eq!(&blob[trailer + 17..trailer + 21], &u32::MAX.to_le_bytes());
        assert_eq!(&blob[blob.len() - 9..], b"\x05\0\0\0Pro-Q");
    }

    #[test]
    fn fxp_round_trip_keeps_name() {
        let preset = sample();
        let bytes = preset.write_fxp("Vocal Presence").unwrap();
        let (decoded, name) = ProQ3::read_fxp(&bytes).unwrap().unwrap();
        assert_eq!(name, "Vocal Presence");
        assert_eq!(decoded.write_ffp(), preset.write_ffp());
    }

    #[test]
    fn fxp_blob_reports_fixed_version() {
        let mut preset = sample();
        preset.version = 7;
        let bytes = preset.write_fxp("Vocal").unwrap();
        let fxp = Fxp::read(&bytes).unwrap().unwrap();
        let (decoded, _) = ProQ3::from_fxp(&fxp).unwrap().unwrap();
        assert_eq!(decoded.version, VERSION);

        // An unexpected format word is tolerated.
        let FxContent::ProgramChunk(mut program) = fxp.content else {
            panic!("expected program chunk");
        };
        program.chunk[4..8].copy_from_slice(&2u32.to_le_bytes());
        let patched = Fxp::new(FxContent::ProgramChunk(program));
        let (decoded, name) = ProQ3::from_fxp(&patched).unwrap().unwrap();
        assert_eq!(name, "Vocal");
        assert_eq!(decoded.version, VERSION);
        assert_eq!(decoded.write_ffp(), sample().write_ffp());
    }
}
