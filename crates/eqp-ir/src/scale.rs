//! Scale conversions between physical units and their stored encodings.
//!
//! Frequency and Q use the logarithmic encodings of the FabFilter preset
//! layouts; gain uses linear amplitude ratios where a format stores it that
//! way. Decimal parsing understands an arbitrary separator character so
//! filter listings exported under any locale can be read.

use alloc::string::String;

/// Scale factor of the logarithmic Q encoding.
const Q_SCALE: f64 = 0.312098175;

/// Offset of the logarithmic Q encoding (Q = 1 encodes to this value).
const Q_OFFSET: f64 = 0.5;

// ---------------------------------------------------------------------------
// Frequency / Q
// ---------------------------------------------------------------------------

/// Frequency in Hz to its log2 encoding.
pub fn freq_encode(hz: f64) -> f64 {
    libm::log2(hz)
}

/// Log2-encoded frequency back to Hz.
pub fn freq_decode(encoded: f64) -> f64 {
    libm::pow(2.0, encoded)
}

/// Q factor to its logarithmic encoding.
pub fn q_encode(q: f64) -> f64 {
    libm::log10(q) * Q_SCALE + Q_OFFSET
}

/// Logarithmically encoded Q back to a Q factor.
pub fn q_decode(encoded: f64) -> f64 {
    libm::pow(10.0, (encoded - Q_OFFSET) / Q_SCALE)
}

/// Q factor to bandwidth in octaves.
pub fn q_to_bw_oct(q: f64) -> f64 {
    let two_q_sq = 2.0 * q * q;
    let a = (two_q_sq + 1.0) / two_q_sq;
    libm::log2(a + libm::sqrt(a * a - 1.0))
}

/// Bandwidth in octaves to Q factor.
pub fn bw_oct_to_q(bw_oct: f64) -> f64 {
    let ratio = libm::pow(2.0, bw_oct);
    libm::sqrt(ratio) / (ratio - 1.0)
}

/// Bandwidth in Hz of a filter centered at `frequency_hz`.
pub fn bandwidth_hz(frequency_hz: f64, q: f64) -> f64 {
    frequency_hz / q
}

// ---------------------------------------------------------------------------
// Gain
// ---------------------------------------------------------------------------

/// Linear amplitude ratio to decibels. Non-positive ratios map to -inf.
pub fn amplitude_ratio_to_db(ratio: f64) -> f64 {
    if ratio <= 0.0 {
        return f64::NEG_INFINITY;
    }
    20.0 * libm::log10(ratio)
}

/// Decibels to linear amplitude ratio.
pub fn db_to_amplitude_ratio(db: f64) -> f64 {
    libm::pow(10.0, db / 20.0)
}

// ---------------------------------------------------------------------------
// Rounding and decimal text
// ---------------------------------------------------------------------------

/// Round to `places` decimals, halves toward positive infinity.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = libm::pow(10.0, places as f64);
    libm::floor(value * factor + 0.5) / factor
}

/// Separator assumed when none is configured.
///
/// Rust's float formatting ignores the OS locale, so this is always `.`.
/// Listings written with a decimal comma need an explicit separator.
pub fn default_decimal_separator() -> char {
    '.'
}

/// Parse a decimal number written with `separator` as the decimal mark.
///
/// Every character other than ASCII digits, the separator and `-` is
/// dropped first, so thousands groupings, units and stray whitespace are
/// ignored. The first separator becomes the decimal point; parsing then
/// takes the longest numeric prefix. Returns `None` when no digits remain.
pub fn parse_decimal(text: &str, separator: char) -> Option<f64> {
    let mut cleaned = String::with_capacity(text.len());
    let mut seen_separator = false;
    for c in text.chars() {
        if c.is_ascii_digit() || c == '-' {
            cleaned.push(c);
        } else if c == separator {
            if seen_separator {
                // A second separator ends the number.
                cleaned.push(' ');
            } else {
                cleaned.push('.');
                seen_separator = true;
            }
        }
    }
    parse_leading_float(&cleaned)
}

fn parse_leading_float(s: &str) -> Option<f64> {
    let bytes = s.as_bytes();
    let mut end = 0;
    if bytes.first() == Some(&b'-') {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;
    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        if frac_end > frac_start {
            end = frac_end;
        }
    }
    if digits == 0 {
        return None;
    }
    s[..end].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tolerance: f64) {
        assert!(
            (actual - expected).abs() <= tolerance,
            "expected {} got {}",
            expected,
            actual
        );
    }

    #[test]
    fn frequency_encoding_is_log2() {
        assert_close(freq_encode(1000.0), 9.965784284662087, 1e-12);
        assert_close(freq_decode(freq_encode(63.5)), 63.5, 1e-9);
        assert_close(freq_encode(1024.0), 10.0, 1e-12);
    }

    #[test]
    fn q_encoding_constants() {
        assert_eq!(q_encode(1.0), 0.5);
        assert_close(q_encode(10.0), 0.812098175, 1e-12);
        assert_close(q_decode(q_encode(2.93)), 2.93, 1e-9);
    }

    #[test]
    fn q_and_bandwidth_match_known_values() {
        assert_eq!(round_to(q_to_bw_oct(8.06), 4), 0.1789);
        assert_eq!(round_to(bw_oct_to_q(0.167), 4), 8.6341);
        assert_eq!(round_to(q_to_bw_oct(1.0), 4), 1.3885);
    }

    #[test]
    fn q_bandwidth_round_trip_over_audio_range() {
        let mut q = 0.025;
        while q <= 40.0 {
            let back = bw_oct_to_q(q_to_bw_oct(q));
            assert!(((back - q) / q).abs() < 1e-6, "q {} came back as {}", q, back);
            q *= 1.37;
        }
    }

    #[test]
    fn amplitude_round_trip() {
        for ratio in [0.001, 0.5, 1.0, 1.9953, 31.6] {
            assert_close(db_to_amplitude_ratio(amplitude_ratio_to_db(ratio)), ratio, 1e-12);
        }
        assert_eq!(amplitude_ratio_to_db(1.0), 0.0);
    }

    #[test]
    fn non_positive_ratio_is_negative_infinity() {
        assert_eq!(amplitude_ratio_to_db(0.0), f64::NEG_INFINITY);
        assert_eq!(amplitude_ratio_to_db(-2.0), f64::NEG_INFINITY);
    }

    #[test]
    fn bandwidth_hz_is_frequency_over_q() {
        assert_eq!(bandwidth_hz(100.0, 2.0), 50.0);
    }

    #[test]
    fn round_to_places() {
        assert_eq!(round_to(3.14159265359, 4), 3.1416);
        assert_eq!(round_to(-5.404, 2), -5.4);
        assert_eq!(round_to(2.5, 0), 3.0);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }

    #[test]
    fn parse_decimal_with_comma() {
        assert_eq!(parse_decimal("   63,8", ','), Some(63.8));
        assert_eq!(parse_decimal(" -5,0", ','), Some(-5.0));
        assert_eq!(parse_decimal("8,06 ", ','), Some(8.06));
    }

    #[test]
    fn parse_decimal_drops_noise() {
        assert_eq!(parse_decimal("1 000.5 Hz", '.'), Some(1000.5));
        assert_eq!(parse_decimal("1.2.3", '.'), Some(1.2));
        assert_eq!(parse_decimal("1,2,3", ','), Some(1.2));
        assert_eq!(parse_decimal("42", ','), Some(42.0));
    }

    #[test]
    fn parse_decimal_rejects_empty() {
        assert_eq!(parse_decimal("Hz", '.'), None);
        assert_eq!(parse_decimal("", ','), None);
        assert_eq!(parse_decimal("-", '.'), None);
    }

    #[test]
    fn default_separator_is_a_dot() {
        assert_eq!(default_decimal_separator(), '.');
    }
}
