//! REW (Room EQ Wizard) filter listings.
//!
//! Two layouts are understood:
//!
//! * the legacy fixed-line export, selected by an `Equaliser:` header:
//!
//!   ```text
//!   Equaliser: Generic
//!   Filter  1: ON  PK       Fc    63,8 Hz  Gain  -5,0 dB  Q  8,06
//!   ```
//!
//! * the tabular export: an optional `Notes:` line, a `Generic` line, a
//!   column header and one row per filter.

use eqp_ir::scale::{default_decimal_separator, parse_decimal};
use eqp_ir::{FilterType, NormalizedFilterBand, NormalizedFilterSet};
use regex::Regex;

use crate::TextParseError;

/// Parse a REW filter listing.
///
/// `separator` is the decimal mark of the numbers in the text; `None` uses
/// the default number formatting's separator.
pub fn parse_rew_text(
    text: &str,
    separator: Option<char>,
) -> Result<NormalizedFilterSet, TextParseError> {
    let separator = separator.unwrap_or_else(default_decimal_separator);
    let lines: Vec<&str> = text
        .split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .collect();

    if let Some(table) = Table::detect(&lines) {
        log::debug!("parsing tabular filter listing");
        return table.parse(&lines, separator);
    }
    if lines.iter().any(|l| l.starts_with(EQUALISER_PREFIX)) {
        log::debug!("parsing legacy filter listing");
        return parse_legacy(&lines, separator);
    }
    Err(TextParseError::UnsupportedTextLayout)
}

fn classify(tag: &str) -> FilterType {
    // Only peaking filters are told apart; every other tag becomes a notch.
    match tag {
        "PEQ" | "PK" => FilterType::Peak,
        _ => FilterType::Notch,
    }
}

fn number(
    text: &str,
    separator: char,
    line: usize,
    field: &'static str,
) -> Result<f64, TextParseError> {
    parse_decimal(text.trim(), separator).ok_or_else(|| TextParseError::InvalidNumber {
        line,
        field,
        text: text.trim().to_owned(),
    })
}

fn compile(pattern: &str) -> Result<Regex, TextParseError> {
    Regex::new(pattern).map_err(|e| TextParseError::Pattern(e.to_string()))
}

// ---------------------------------------------------------------------------
// Legacy layout
// ---------------------------------------------------------------------------

const EQUALISER_PREFIX: &str = "Equaliser:";

/// Which value the last column of a filter line holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Width {
    BandwidthOct,
    Q,
}

fn filter_line_pattern(separator: char, width: Width) -> String {
    let sep = regex::escape(&separator.to_string());
    let last = match width {
        Width::BandwidthOct => "BW Oct",
        Width::Q => "Q",
    };
    format!(
        r"^Filter\s+\d+:\s(\w+)\s+(\w+)\s+Fc ([\D\d{sep}]+) Hz  Gain ([\s\d{sep}\-]+) dB  {last} ([\s\d{sep}]+)$"
    )
}

fn parse_legacy(lines: &[&str], separator: char) -> Result<NormalizedFilterSet, TextParseError> {
    let filter_start = compile(r"^Filter\s+\d+:")?;
    let unused_filter = compile(r"^Filter\s+\d+:\s+(ON|OFF)\s+None")?;
    let mut active: Option<(Regex, Width)> = None;
    let mut set = NormalizedFilterSet::new();

    for (index, &line) in lines.iter().enumerate() {
        let line_no = index + 1;
        if line.starts_with(EQUALISER_PREFIX) {
            let width = match line {
                "Equaliser: FBQ2496" => Width::BandwidthOct,
                "Equaliser: Generic" => Width::Q,
                _ => {
                    log::error!("no known equaliser format: {}", line);
                    return Err(TextParseError::UnsupportedEqualiser(
                        line[EQUALISER_PREFIX.len()..].trim().to_owned(),
                    ));
                }
            };
            active = Some((compile(&filter_line_pattern(separator, width))?, width));
            continue;
        }

        if !filter_start.is_match(line) {
            continue;
        }
        let sanitized = line.replace('\u{a0}', "");
        if unused_filter.is_match(&sanitized) {
            continue;
        }
        let malformed = || TextParseError::MalformedFilterLine {
            line: line_no,
            text: line.to_owned(),
        };
        let Some((pattern, width)) = &active else {
            return Err(malformed());
        };
        let caps = pattern.captures(&sanitized).ok_or_else(malformed)?;

        let enabled = caps[1].trim() == "ON";
        let filter_type = classify(caps[2].trim());
        let frequency = number(&caps[3], separator, line_no, "frequency")?;
        let gain = number(&caps[4], separator, line_no, "gain")?;
        let last = number(&caps[5], separator, line_no, "bandwidth")?;

        set.push(match width {
            Width::BandwidthOct => {
                NormalizedFilterBand::with_bandwidth(filter_type, enabled, frequency, gain, last)
            }
            Width::Q => NormalizedFilterBand::with_q(filter_type, enabled, frequency, gain, last),
        });
    }
    Ok(set)
}

// ---------------------------------------------------------------------------
// Tabular layout
// ---------------------------------------------------------------------------

const REQUIRED_COLUMNS: [&str; 4] = ["Number", "Enabled", "Type", "Frequency"];
const MIN_FIELDS: usize = 8;
const BANDWIDTH_TOLERANCE: f64 = 0.01;

/// Column positions of a tabular listing.
#[derive(Clone, Debug, PartialEq)]
struct Table {
    header_line: usize,
    delimiter: Option<char>,
    enabled: usize,
    filter_type: usize,
    frequency: usize,
    gain: usize,
    q: usize,
    bandwidth_hz: Option<usize>,
}

impl Table {
    fn detect(lines: &[&str]) -> Option<Table> {
        let mut at = 0;
        if lines.first()?.trim_start().starts_with("Notes:") {
            at += 1;
        }
        if lines.get(at)?.trim() != "Generic" {
            return None;
        }
        let header_line = at + 1;
        let header = *lines.get(header_line)?;
        let delimiter = header.contains(',').then_some(',');
        let columns: Vec<String> = split_fields(header, delimiter)
            .iter()
            .map(|c| column_name(c))
            .collect();
        let position = |name: &str| columns.iter().position(|c| c.eq_ignore_ascii_case(name));
        if REQUIRED_COLUMNS.iter().any(|name| position(name).is_none()) {
            return None;
        }

        Some(Table {
            header_line,
            delimiter,
            enabled: position("Enabled").unwrap_or(1),
            filter_type: position("Type").unwrap_or(3),
            frequency: position("Frequency").unwrap_or(4),
            gain: position("Gain").unwrap_or(5),
            q: position("Q").unwrap_or(6),
            bandwidth_hz: columns.iter().position(|c| c.eq_ignore_ascii_case("Bandwidth")),
        })
    }

    fn parse(&self, lines: &[&str], separator: char) -> Result<NormalizedFilterSet, TextParseError> {
        // A comma-delimited table cannot also use a comma as decimal mark.
        let separator = if self.delimiter == Some(separator) {
            '.'
        } else {
            separator
        };
        let mut set = NormalizedFilterSet::new();

        for (index, &line) in lines.iter().enumerate().skip(self.header_line + 1) {
            let line_no = index + 1;
            if line.trim().is_empty() || line.trim_start().starts_with("Compound_filters") {
                break;
            }
            let fields = split_fields(line, self.delimiter);
            if fields.iter().any(|f| *f == "None") {
                continue;
            }
            if fields.len() < MIN_FIELDS {
                log::warn!(
                    "line {}: skipping row with {} fields, expected at least {}",
                    line_no,
                    fields.len(),
                    MIN_FIELDS
                );
                continue;
            }
            let field = |i: usize| fields.get(i).copied().unwrap_or("");

            let enabled = field(self.enabled).eq_ignore_ascii_case("true");
            let filter_type = match field(self.filter_type) {
                "PK" => FilterType::Peak,
                _ => FilterType::Notch,
            };
            let frequency = number(field(self.frequency), separator, line_no, "frequency")?;
            let gain = number(field(self.gain), separator, line_no, "gain")?;
            let q = number(field(self.q), separator, line_no, "Q")?;
            let band = NormalizedFilterBand::with_q(filter_type, enabled, frequency, gain, q);

            if let Some(column) = self.bandwidth_hz {
                self.check_bandwidth(&band, field(column), separator, line_no);
            }
            set.push(band);
        }
        Ok(set)
    }

    fn check_bandwidth(
        &self,
        band: &NormalizedFilterBand,
        listed: &str,
        separator: char,
        line_no: usize,
    ) {
        let Some(listed) = parse_decimal(listed, separator) else {
            return;
        };
        let computed = band.bandwidth_hz();
        if listed == 0.0 || !computed.is_finite() {
            return;
        }
        let deviation = ((computed - listed) / listed).abs();
        if deviation > BANDWIDTH_TOLERANCE {
            log::warn!(
                "line {}: bandwidth {:.2} Hz differs from the listed {:.2} Hz",
                line_no,
                computed,
                listed
            );
        }
    }
}

fn split_fields(line: &str, delimiter: Option<char>) -> Vec<&str> {
    match delimiter {
        Some(d) => line.split(d).map(str::trim).collect(),
        None => line.split_whitespace().collect(),
    }
}

/// Header cell without its unit suffix: `Frequency(Hz)` -> `Frequency`.
fn column_name(cell: &str) -> String {
    cell.split('(').next().unwrap_or(cell).trim().to_owned()
}
