//! End-to-end conversions of REW listings into every target format.

use eqp_convert::{inspect, ConvertOptions, Converter, PresetKind, TargetFormat};
use eqp_formats::{Fxp, ProQ, ProQ2, ProQ3, ReaEq};
use std::fs;
use std::path::PathBuf;

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/rew")
}

fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap()
}

fn converter(separator: char) -> Converter {
    Converter::new(ConvertOptions {
        decimal_separator: Some(separator),
        preset_name: "Living Room".to_owned(),
    })
}

fn convert(name: &str, separator: char, target: TargetFormat) -> Vec<u8> {
    converter(separator)
        .convert(&load_fixture(name), target)
        .unwrap_or_else(|e| panic!("Failed to convert {} to {}: {}", name, target, e))
}

#[test]
fn proq_ffp_from_fbq2496() {
    let bytes = convert("fbq2496_comma.txt", ',', TargetFormat::ProQ);
    let preset = ProQ::read_ffp(&bytes).unwrap().unwrap();
    assert_eq!(preset.bands.iter().filter(|b| b.enabled).count(), 7);
    assert!((preset.bands[0].frequency - 91.4).abs() < 1e-3);
    assert!((preset.bands[0].q - 1.9021).abs() < 1e-4);
    assert_eq!(preset.analyzer, 3.0);
}

#[test]
fn proq2_ffp_from_generic() {
    let bytes = convert("generic_dot.txt", '.', TargetFormat::ProQ2);
    let preset = ProQ2::read_ffp(&bytes).unwrap().unwrap();
    assert!(preset.bands[0].enabled);
    assert!(!preset.bands[3].enabled);
    assert!(!preset.bands[4].enabled);
}

#[test]
fn proq3_fxp_carries_preset_name() {
    let bytes = convert("tabular.txt", '.', TargetFormat::ProQ3Fxp);
    let (preset, name) = ProQ3::read_fxp(&bytes).unwrap().unwrap();
    assert_eq!(name, "Living Room");
    assert!((preset.bands[1].gain + 8.5).abs() < 1e-6);

    let summary = inspect(&bytes).unwrap().unwrap();
    assert_eq!(summary.kind, PresetKind::ProQ3);
    assert_eq!(summary.name.as_deref(), Some("Living Room"));
}

#[test]
fn proq_fxp_is_a_parameter_program() {
    let bytes = convert("generic_dot.txt", '.', TargetFormat::ProQFxp);
    let fxp = Fxp::read(&bytes).unwrap().unwrap();
    assert_eq!(fxp.content.header().fx_id.to_string(), "FPQr");
    let (_, name) = ProQ::from_fxp(&fxp).unwrap().unwrap();
    assert_eq!(name, "Living Room");
}

#[test]
fn reaeq_keeps_all_bands() {
    let bytes = convert("fbq2496_comma.txt", ',', TargetFormat::ReaEq);
    let preset = ReaEq::read_fxp(&bytes).unwrap().unwrap();
    assert_eq!(preset.bands.len(), 7);
    assert_eq!(preset.bands[1].gain, -17.0);
    assert_eq!(preset.bands[1].bandwidth_oct, 0.143);
}

#[test]
fn text_dump_lists_bands() {
    let bytes = convert("generic_dot.txt", '.', TargetFormat::Text);
    let text = String::from_utf8(bytes).unwrap();
    assert_eq!(text.lines().count(), 4);
    assert!(text.lines().nth(3).unwrap().ends_with("(disabled)"));
}

#[test]
fn inspect_recognizes_every_binary_target() {
    let expected = [
        (TargetFormat::ProQ, PresetKind::ProQ),
        (TargetFormat::ProQFxp, PresetKind::ProQ),
        (TargetFormat::ProQ2, PresetKind::ProQ2),
        (TargetFormat::ProQ3, PresetKind::ProQ3),
        (TargetFormat::ProQ3Fxp, PresetKind::ProQ3),
        (TargetFormat::ReaEq, PresetKind::ReaEq),
    ];
    for (target, kind) in expected {
        let bytes = convert("generic_dot.txt", '.', target);
        let summary = inspect(&bytes).unwrap().unwrap();
        assert_eq!(summary.kind, kind, "{}", target);
        assert!(summary.lines[0].starts_with("Band 1: "), "{}", target);
    }
}

#[test]
fn text_output_is_not_a_preset() {
    let bytes = convert("generic_dot.txt", '.', TargetFormat::Text);
    assert!(inspect(&bytes).unwrap().is_none());
}
