//! Human-readable description of preset files.

use std::fmt;

use eqp_formats::{FxContent, Fxp, ProQ, ProQ2, ProQ3, ReaEq};

use crate::ConvertError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PresetKind {
    ProQ,
    ProQ2,
    ProQ3,
    ReaEq,
    /// Container whose payload is not a known EQ preset
    Container { format: String, plugin_id: String },
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PresetKind::ProQ => f.write_str("FabFilter Pro-Q"),
            PresetKind::ProQ2 => f.write_str("FabFilter Pro-Q 2"),
            PresetKind::ProQ3 => f.write_str("FabFilter Pro-Q 3"),
            PresetKind::ReaEq => f.write_str("ReaEQ"),
            PresetKind::Container { format, plugin_id } => {
                write!(f, "{} container for plugin {:?}", format, plugin_id)
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PresetSummary {
    pub kind: PresetKind,
    /// Program name, for formats that store one
    pub name: Option<String>,
    pub lines: Vec<String>,
}

impl PresetSummary {
    fn bands(kind: PresetKind, name: Option<String>, bands: Vec<String>) -> Self {
        let lines = bands
            .into_iter()
            .enumerate()
            .map(|(i, band)| format!("Band {}: {}", i + 1, band))
            .collect();
        Self { kind, name, lines }
    }
}

impl fmt::Display for PresetSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => writeln!(f, "{} \"{}\"", self.kind, name)?,
            _ => writeln!(f, "{}", self.kind)?,
        }
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Identify and describe a preset file.
///
/// Returns `Ok(None)` when the bytes are not a format this crate reads.
pub fn inspect(data: &[u8]) -> Result<Option<PresetSummary>, ConvertError> {
    if let Some(preset) = ProQ::read_ffp(data)? {
        return Ok(Some(PresetSummary::bands(PresetKind::ProQ, None, preset.band_lines())));
    }
    if let Some(preset) = ProQ2::read_ffp(data)? {
        return Ok(Some(PresetSummary::bands(PresetKind::ProQ2, None, preset.band_lines())));
    }
    if let Some(preset) = ProQ3::read_ffp(data)? {
        return Ok(Some(PresetSummary::bands(PresetKind::ProQ3, None, preset.band_lines())));
    }
    match Fxp::read(data)? {
        Some(fxp) => inspect_container(&fxp).map(Some),
        None => {
            log::debug!("no known preset format");
            Ok(None)
        }
    }
}

fn inspect_container(fxp: &Fxp) -> Result<PresetSummary, ConvertError> {
    if let Some((preset, name)) = ProQ::from_fxp(fxp)? {
        return Ok(PresetSummary::bands(PresetKind::ProQ, Some(name), preset.band_lines()));
    }
    if let Some((preset, name)) = ProQ3::from_fxp(fxp)? {
        return Ok(PresetSummary::bands(PresetKind::ProQ3, Some(name), preset.band_lines()));
    }
    if let Some(preset) = ReaEq::from_fxp(fxp)? {
        return Ok(PresetSummary::bands(PresetKind::ReaEq, None, preset.band_lines()));
    }

    let header = fxp.content.header();
    let mut lines = vec![
        format!("Format version: {}", header.version),
        format!("Plugin version: {}", header.fx_version),
    ];
    let name = match &fxp.content {
        FxContent::ProgramChunk(program) => {
            lines.push(format!("Chunk: {} bytes", program.chunk.len()));
            Some(program.name.to_string())
        }
        FxContent::BankChunk(bank) => {
            lines.push(format!("Programs: {}", bank.program_count));
            lines.push(format!("Chunk: {} bytes", bank.chunk.len()));
            None
        }
        FxContent::Program(program) => {
            lines.push(format!("Parameters: {}", program.parameters.len()));
            Some(program.name.to_string())
        }
        FxContent::Bank(bank) => {
            lines.push(format!("Programs: {}", bank.programs.len()));
            lines.extend(bank.programs.iter().enumerate().map(|(i, p)| {
                format!(
                    "Program {}: {:?} ({} parameters)",
                    i + 1,
                    p.name.to_string(),
                    p.parameters.len()
                )
            }));
            None
        }
    };
    if let Some(root) = fxp.xml.as_ref().and_then(|doc| doc.root_name()) {
        lines.push(format!("XML document: <{}>", root));
    }

    Ok(PresetSummary {
        kind: PresetKind::Container {
            format: fxp.content.tag().to_string(),
            plugin_id: header.fx_id.to_string(),
        },
        name,
        lines,
    })
}
