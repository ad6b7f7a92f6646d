//! FabFilter Pro-Q 2 presets, magic `FQ2p`.
//!
//! Body layout after the header: 24 band records of 7 floats, then 22 global
//! settings floats. A band is enabled when its first float is exactly 1.0;
//! disabled bands are written as 2.0.

use crate::binary::{BinaryReader, BinaryWriter, Endian};
use crate::fabfilter::{
    open, read_frequency, read_gain, read_q, read_tail, write_frequency, write_gain, write_q,
    ChannelMode, BAND_COUNT,
};
use crate::float_enum::float_enum;
use crate::FormatError;

pub const MAGIC: &[u8; 4] = b"FQ2p";
pub const PARAMETER_COUNT: u32 = (BAND_COUNT * 7 + TAIL_LEN) as u32;

const TAIL_LEN: usize = 22;
const ENABLED: f32 = 1.0;
const DISABLED: f32 = 2.0;

float_enum! {
    pub enum ProQ2Shape("filter type") {
        #[default]
        Bell = 0 => "Bell",
        LowShelf = 1 => "Low Shelf",
        LowCut = 2 => "Low Cut",
        HighShelf = 3 => "High Shelf",
        HighCut = 4 => "High Cut",
        Notch = 5 => "Notch",
        BandPass = 6 => "Band Pass",
        TiltShelf = 7 => "Tilt Shelf",
    }
}

float_enum! {
    pub enum ProQ2Slope("filter slope") {
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
    }
}

float_enum! {
    pub enum ProQ2StereoPlacement("stereo placement") {
        LeftOrMid = 0 => "Left/Mid",
        RightOrSide = 1 => "Right/Side",
        #[default]
        Stereo = 2 => "Stereo",
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProQ2Band {
    pub enabled: bool,
    /// Hz
    pub frequency: f64,
    /// dB
    pub gain: f64,
    pub q: f64,
    pub shape: ProQ2Shape,
    pub slope: ProQ2Slope,
    pub stereo_placement: ProQ2StereoPlacement,
}

impl ProQ2Band {
    pub const DEFAULT: ProQ2Band = ProQ2Band {
        enabled: false,
        frequency: 1000.0,
        gain: 0.0,
        q: 1.0,
        shape: ProQ2Shape::Bell,
        slope: ProQ2Slope::Slope24dB,
        stereo_placement: ProQ2StereoPlacement::Stereo,
    };

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

impl Default for ProQ2Band {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Global settings following the band records, in file order.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProQ2Settings {
    /// 0 = zero latency, 1 = natural phase, 2 = linear phase
    pub processing_mode: f32,
    pub processing_resolution: f32,
    /// 0 = left/right, 1 = mid/side
    pub channel_mode: f32,
    pub gain_scale: f32,
    /// -1..1 maps to -inf..+36 dB
    pub output_level: f32,
    pub output_pan: f32,
    pub bypass: f32,
    pub output_invert_phase: f32,
    pub auto_gain: f32,
    pub analyzer_show_pre_processing: f32,
    pub analyzer_show_post_processing: f32,
    pub analyzer_show_sidechain: f32,
    pub analyzer_range: f32,
    pub analyzer_resolution: f32,
    pub analyzer_speed: f32,
    pub analyzer_tilt: f32,
    pub analyzer_freeze: f32,
    pub spectrum_grab: f32,
    pub display_range: f32,
    pub receive_midi: f32,
    /// -1 = no band soloed
    pub solo_band: f32,
    pub solo_gain: f32,
}

impl Default for ProQ2Settings {
    fn default() -> Self {
        Self::from_array([0.0; TAIL_LEN]).with_solo_band(-1.0)
    }
}

impl ProQ2Settings {
    fn with_solo_band(mut self, solo_band: f32) -> Self {
        self.solo_band = solo_band;
        self
    }

    fn from_array(v: [f32; TAIL_LEN]) -> Self {
        Self {
            processing_mode: v[0],
            processing_resolution: v[1],
            channel_mode: v[2],
            gain_scale: v[3],
            output_level: v[4],
            output_pan: v[5],
            bypass: v[6],
            output_invert_phase: v[7],
            auto_gain: v[8],
            analyzer_show_pre_processing: v[9],
            analyzer_show_post_processing: v[10],
            analyzer_show_sidechain: v[11],
            analyzer_range: v[12],
            analyzer_resolution: v[13],
            analyzer_speed: v[14],
            analyzer_tilt: v[15],
            analyzer_freeze: v[16],
            spectrum_grab: v[17],
            display_range: v[18],
            receive_midi: v[19],
            solo_band: v[20],
            solo_gain: v[21],
        }
    }

    fn to_array(self) -> [f32; TAIL_LEN] {
        [
            self.processing_mode,
            self.processing_resolution,
            self.channel_mode,
            self.gain_scale,
            self.output_level,
            self.output_pan,
            self.bypass,
            self.output_invert_phase,
            self.auto_gain,
            self.analyzer_show_pre_processing,
            self.analyzer_show_post_processing,
            self.analyzer_show_sidechain,
            self.analyzer_range,
            self.analyzer_resolution,
            self.analyzer_speed,
            self.analyzer_tilt,
            self.analyzer_freeze,
            self.spectrum_grab,
            self.display_range,
            self.receive_midi,
            self.solo_band,
            self.solo_gain,
        ]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProQ2 {
    pub version: u32,
    /// Count as read; [`PARAMETER_COUNT`] is always written
    pub parameter_count: u32,
    pub bands: [ProQ2Band; BAND_COUNT],
    pub settings: ProQ2Settings,
}

impl Default for ProQ2 {
    fn default() -> Self {
        Self {
            version: 2,
            parameter_count: PARAMETER_COUNT,
            bands: [ProQ2Band::DEFAULT; BAND_COUNT],
            settings: ProQ2Settings::default(),
        }
    }
}

impl ProQ2 {
    pub fn channel_mode(&self) -> ChannelMode {
        ChannelMode::from_tail(self.settings.channel_mode)
    }

    pub fn band_lines(&self) -> Vec<String> {
        let channel = self.channel_mode();
        self.bands.iter().map(|b| b.describe(channel)).collect()
    }

    /// Decode an `.ffp` preset. Returns `Ok(None)` when the magic is not `FQ2p`.
    pub fn read_ffp(data: &[u8]) -> Result<Option<Self>, FormatError> {
        let Some(mut r) = open(data, MAGIC)? else {
            return Ok(None);
        };
        let version = r.read_u32()?;
        let parameter_count = r.read_u32()?;
        let mut bands = [ProQ2Band::DEFAULT; BAND_COUNT];
        for band in bands.iter_mut() {
            *band = read_band(&mut r)?;
        }
        let settings = ProQ2Settings::from_array(read_tail(
            &mut r,
            ProQ2Settings::default().to_array(),
        ));
        Ok(Some(Self {
            version,
            parameter_count,
            bands,
            settings,
        }))
    }

    pub fn write_ffp(&self) -> Vec<u8> {
        let mut w = BinaryWriter::new(Endian::Little);
        w.write_bytes(MAGIC);
        w.write_u32(self.version);
        w.write_u32(PARAMETER_COUNT);
        for band in &self.bands {
            w.write_f32(if band.enabled { ENABLED } else { DISABLED });
            write_frequency(&mut w, band.frequency);
            write_gain(&mut w, band.gain);
            write_q(&mut w, band.q);
            w.write_f32(band.shape.to_f32());
            w.write_f32(band.slope.to_f32());
            w.write_f32(band.stereo_placement.to_f32());
        }
        for value in self.settings.to_array() {
            w.write_f32(value);
        }
        w.into_bytes()
    }
}

fn read_band(r: &mut BinaryReader) -> Result<ProQ2Band, FormatError> {
    Ok(ProQ2Band {
        enabled: r.read_f32()? == ENABLED,
        frequency: read_frequency(r)?,
        gain: read_gain(r)?,
        q: read_q(r)?,
        shape: ProQ2Shape::from_f32(r.read_f32()?)?,
        slope: ProQ2Slope::from_f32(r.read_f32()?)?,
        stereo_placement: ProQ2StereoPlacement::from_f32(r.read_f32()?)?,
    })
}
