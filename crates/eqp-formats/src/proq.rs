//! FabFilter Pro-Q (version 1) presets, magic `FPQr`.
//!
//! Body layout after the header: enabled band count as a float, 24 band
//! records of 7 floats, then 11 global settings floats.

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::fabfilter::{
    bytes_to_floats, floats_to_bytes, open, read_frequency, read_gain, read_q, read_tail,
    write_frequency, write_gain, write_q, ChannelMode, BAND_COUNT,
};
use crate::float_enum::float_enum;
use crate::fxp::{FixedName, FourCc, FxContent, FxHeader, Fxp, Program};
use crate::FormatError;

pub const MAGIC: &[u8; 4] = b"FPQr";
/// Parameter count written to every preset: 24 bands of 7 floats, the
/// enabled count and 11 settings.
pub const PARAMETER_COUNT: u32 = (BAND_COUNT * 7 + 12) as u32;

const TAIL_LEN: usize = 11;

float_enum! {
    pub enum ProQShape("filter type") {
        #[default]
        Bell = 0 => "Bell",
        LowShelf = 1 => "Low Shelf",
        LowCut = 2 => "Low Cut",
        HighShelf = 3 => "High Shelf",
        HighCut = 4 => "High Cut",
        Notch = 5 => "Notch",
    }
}

float_enum! {
    pub enum ProQSlope("filter slope") {
        Slope6dB = 0 => "6 dB/oct",
        Slope12dB = 1 => "12 dB/oct",
        #[default]
        Slope24dB = 2 => "24 dB/oct",
        Slope48dB = 3 => "48 dB/oct",
    }
}

float_enum! {
    pub enum ProQStereoPlacement("stereo placement") {
        LeftOrMid = 0 => "Left/Mid",
        RightOrSide = 1 => "Right/Side",
        #[default]
        Stereo = 2 => "Stereo",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProQBand {
    /// Hz
    pub frequency: f64,
    /// dB
    pub gain: f64,
    pub q: f64,
    pub shape: ProQShape,
    pub slope: ProQSlope,
    pub stereo_placement: ProQStereoPlacement,
    pub enabled: bool,
    /// Last float of the band record; always 1.0 in files seen so far
    pub unknown: f32,
}

impl ProQBand {
    /// Unused slot.
    pub const DEFAULT: ProQBand = ProQBand {
        frequency: 1000.0,
        gain: 0.0,
        q: 1.0,
        shape: ProQShape::Bell,
        slope: ProQSlope::Slope24dB,
        stereo_placement: ProQStereoPlacement::Stereo,
        enabled: false,
        unknown: 1.0,
    };

    /// One-line summary; `channel` comes from the owning preset.
    pub fn describe(&self, channel: ChannelMode) -> String {
        format!(
            "{} | {} | {} | {} @ {:.1} Hz | Gain: {:.1} dB | Q: {:.2} | {}",
            if self.enabled { "Enabled" } else { "Disabled" },
            channel,
            self.stereo_placement,
            self.shape,
            self.frequency,
            self.gain,
            self.q,
            self.slope
        )
    }
}

impl Default for ProQBand {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProQ {
    pub version: u32,
    /// Count as read; [`PARAMETER_COUNT`] is always written
    pub parameter_count: u32,
    pub bands: [ProQBand; BAND_COUNT],
    /// -1..1 maps to -inf..+36 dB
    pub output_gain: f32,
    pub output_pan: f32,
    pub display_range: f32,
    pub process_mode: f32,
    /// 0 = left/right, 1 = mid/side
    pub channel_mode: f32,
    pub bypass: f32,
    pub receive_midi: f32,
    pub analyzer: f32,
    pub analyzer_resolution: f32,
    pub analyzer_speed: f32,
    /// -1 = no band soloed
    pub solo_band: f32,
}

impl Default for ProQ {
    fn default() -> Self {
        Self {
            version: 2,
            parameter_count: PARAMETER_COUNT,
            bands: [ProQBand::DEFAULT; BAND_COUNT],
            output_gain: 0.0,
            output_pan: 0.0,
            display_range: 0.0,
            process_mode: 0.0,
            channel_mode: 0.0,
            bypass: 0.0,
            receive_midi: 0.0,
            analyzer: 0.0,
            analyzer_resolution: 0.0,
            analyzer_speed: 0.0,
            solo_band: -1.0,
        }
    }
}

impl ProQ {
    pub fn channel_mode(&self) -> ChannelMode {
        ChannelMode::from_tail(self.channel_mode)
    }

    pub fn band_lines(&self) -> Vec<String> {
        let channel = self.channel_mode();
        self.bands.iter().map(|b| b.describe(channel)).collect()
    }

    // -----------------------------------------------------------------------
    // Standalone .ffp
    // -----------------------------------------------------------------------

    /// Decode an `.ffp` preset. Returns `Ok(None)` when the magic is not `FPQr`.
    pub fn read_ffp(data: &[u8]) -> Result<Option<Self>, FormatError> {
        let Some(mut r) = open(data, MAGIC)? else {
            return Ok(None);
        };
        let version = r.read_u32()?;
        let parameter_count = r.read_u32()?;
        Self::read_body(&mut r, version, parameter_count).map(Some)
    }

    pub fn write_ffp(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_bytes(MAGIC);
        w.write_u32(self.version);
        w.write_u32(PARAMETER_COUNT);
        self.write_body(&mut w);
        w.into_bytes()
    }

    fn read_body(
        r: &mut BinaryReader,
        version: u32,
        parameter_count: u32,
    ) -> Result<Self, FormatError> {
        let active = r.read_f32()?;
        let mut bands = [ProQBand::DEFAULT; BAND_COUNT];
        for (i, band) in bands.iter_mut().enumerate() {
            *band = ProQBand {
                frequency: read_frequency(r)?,
                gain: read_gain(r)?,
                q: read_q(r)?,
                shape: ProQShape::from_f32(r.read_f32()?)?,
                slope: ProQSlope::from_f32(r.read_f32()?)?,
                stereo_placement: ProQStereoPlacement::from_f32(r.read_f32()?)?,
                unknown: r.read_f32()?,
                enabled: (i as f32) < active,
            };
        }

        let defaults = ProQ::default();
        let [output_gain, output_pan, display_range, process_mode, channel_mode, bypass, receive_midi, analyzer, analyzer_resolution, analyzer_speed, solo_band] =
            read_tail::<TAIL_LEN>(
                r,
                [
                    defaults.output_gain,
                    defaults.output_pan,
                    defaults.display_range,
                    defaults.process_mode,
                    defaults.channel_mode,
                    defaults.bypass,
                    defaults.receive_midi,
                    defaults.analyzer,
                    defaults.analyzer_resolution,
                    defaults.analyzer_speed,
                    defaults.solo_band,
                ],
            );

        Ok(Self {
            version,
            parameter_count,
            bands,
            output_gain,
            output_pan,
            display_range,
            process_mode,
            channel_mode,
            bypass,
            receive_midi,
            analyzer,
            analyzer_resolution,
            analyzer_speed,
            solo_band,
        })
    }

    /// Enabled count, bands and settings; everything after the parameter count.
    fn write_body(&self, w: &mut BinaryWriter) {
        let active = self.bands.iter().filter(|b| b.enabled).count();
        w.write_f32(active as f32);
        for band in &self.bands {
            write_frequency(w, band.frequency);
            write_gain(w, band.gain);
            write_q(w, band.q);
            w.write_f32(band.shape.to_f32());
            w.write_f32(band.slope.to_f32());
            w.write_f32(band.stereo_placement.to_f32());
            w.write_f32(band.unknown);
        }
        for value in [
            self.output_gain,
            self.output_pan,
            self.display_range,
            self.process_mode,
            self.channel_mode,
            self.bypass,
            self.receive_midi,
            self.analyzer,
            self.analyzer_resolution,
            self.analyzer_speed,
            self.solo_band,
        ] {
            w.write_f32(value);
        }
    }

    // -----------------------------------------------------------------------
    // FXP (parameter program)
    // -----------------------------------------------------------------------

    /// Parameter program with id `FPQr`; the body floats are the parameters.
    pub fn to_fxp(&self, name: &str) -> Fxp {
        let mut w = BinaryWriter::with_capacity(PARAMETER_COUNT as usize * 4, Endian::Little);
        self.write_body(&mut w);
        Fxp::new(FxContent::Program(Program {
            header: FxHeader::new(FourCc(*MAGIC), 1, self.version),
            name: FixedName::from_text(name),
            parameters: bytes_to_floats(w.buffer()),
        }))
    }

    pub fn write_fxp(&self, name: &str) -> Result<Vec<u8>, FormatError> {
        self.to_fxp(name).write()
    }

    /// Decode a parameter program written by [`ProQ::to_fxp`], with its name.
    /// Returns `Ok(None)` for any other container content.
    pub fn from_fxp(fxp: &Fxp) -> Result<Option<(Self, String)>, FormatError> {
        let FxContent::Program(program) = &fxp.content else {
            return Ok(None);
        };
        if program.header.fx_id != FourCc(*MAGIC) {
            return Ok(None);
        }
        let bytes = floats_to_bytes(&program.parameters);
        let mut r = BinaryReader::new(&bytes, Endian::Little);
        let preset = Self::read_body(
            &mut r,
            program.header.fx_version,
            program.parameters.len() as u32,
        )?;
        Ok(Some((preset, program.name.to_string())))
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

    fn sample() -> ProQ {
        let mut preset = ProQ::default();
        preset.bands[0] = ProQBand {
            frequency: 63.8,
            gain: -5.0,
            q: 8.06,
            enabled: true,
            ..ProQBand::DEFAULT
        };
        preset.bands[1] = ProQBand {
            frequency: 120.0,
            gain: 0.0,
            q: 0.71,
            shape: ProQShape::LowCut,
            slope: ProQSlope::Slope48dB,
            enabled: true,
            ..ProQBand::DEFAULT
        };
        preset
    }

    #[test]
    fn header_and_size() {
        let bytes = sample().write_ffp();
        assert_eq!(&bytes[0..4], b"FPQr");
        assert_eq!(&bytes[4..8], &2u32.to_le_bytes());
        assert_eq!(&bytes[8..12], &180u32.to_le_bytes());
        assert_eq!(bytes.len(), 12 + 180 * 4);
        // Enabled count
        assert_eq!(&bytes[12..16], &2.0f32.to_le_bytes());
        // First band frequency is log2-encoded
        let freq = f32::from_le_bytes(bytes[16..20].try_into().unwrap());
        assert!((freq - 63.8f32.log2()).abs() < 1e-5);
        // Solo band is the last float
        assert_eq!(&bytes[bytes.len() - 4..], &(-1.0f32).to_le_bytes());
    }

    #[test]
    fn decode_encode_is_byte_identical() {
        let bytes = sample().write_ffp();
        let decoded = ProQ::read_ffp(&bytes).unwrap().unwrap();
        assert_eq!(decoded.write_ffp(), bytes);
        assert!(decoded.bands[0].enabled);
        assert!(decoded.bands[1].enabled);
        assert!(!decoded.bands[2].enabled);
        assert_eq!(decoded.bands[1].shape, ProQShape::LowCut);
        assert!((decoded.bands[0].q - 8.06).abs() < 1e-4);
    }

    #[test]
    fn bad_shape_is_reported() {
        let mut bytes = sample().write_ffp();
        // Shape of the first band: header 12, enabled count 4, freq/gain/q 12
        bytes[28..32].copy_from_slice(&99.0f32.to_le_bytes());
        match ProQ::read_ffp(&bytes) {
            Err(FormatError::MalformedEnumValue { field, value }) => {
                assert_eq!(field, "filter type");
                assert_eq!(value, 99.0);
            }
            other => panic!("expected MalformedEnumValue, got {:?}", other),
        }
    }

    #[test]
    fn other_magic_is_no_result() {
        let mut bytes = sample().write_ffp();
        bytes[0..4].copy_from_slice(b"FQ2p");
        assert!(ProQ::read_ffp(&bytes).unwrap().is_none());
    }

    #[test]
    fn missing_settings_keep_defaults() {
        let mut bytes = sample().write_ffp();
        bytes.truncate(bytes.len() - 8);
        let decoded = ProQ::read_ffp(&bytes).unwrap().unwrap();
        assert_eq!(decoded.solo_band, -1.0);
        assert_eq!(decoded.bands[0].gain, -5.0);
    }

    #[test]
    fn mid_side_applies_to_every_band() {
        let mut preset = sample();
        preset.channel_mode = 1.0;
        assert_eq!(preset.channel_mode(), ChannelMode::MidSide);
        let lines = preset.band_lines();
        assert_eq!(lines.len(), 24);
        assert!(lines.iter().all(|l| l.contains("Mid/Side")));
        assert_eq!(
            lines[0],
            "Enabled | Mid/Side | Stereo | Bell @ 63.8 Hz | Gain: -5.0 dB | Q: 8.06 | 24 dB/oct"
        );
    }

    #[test]
    fn fxp_program_round_trip() {
        let preset = sample();
        let bytes = preset.write_fxp("Room Correction").unwrap();
        assert_eq!(&bytes[8..12], b"FxCk");
        assert_eq!(&bytes[16..20], b"FPQr");
        assert_eq!(&bytes[20..24], &2u32.to_be_bytes());
        assert_eq!(&bytes[24..28], &180u32.to_be_bytes());
        let (decoded, name) = ProQ::read_fxp(&bytes).unwrap().unwrap();
        assert_eq!(name, "Room Correction");
        assert_eq!(decoded.parameter_count, 180);
        assert_eq!(decoded.write_ffp(), preset.write_ffp());
    }
}
