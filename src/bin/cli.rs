//! eqpreset CLI: convert REW filter listings and inspect preset files.
//!
//! Usage:
//!   eqp-cli convert filters.txt --to proq3 [--sep ,] [--name "Room"] [--out room.ffp]
//!   eqp-cli inspect preset.fxp
//!
//! Set `RUST_LOG=debug` for format probing details.

use anyhow::{bail, Context};
use eqp_convert::{inspect, ConvertOptions, Converter, TargetFormat};
use std::path::{Path, PathBuf};
use std::{env, fs, process};

const USAGE: &str = "Usage:
  eqp-cli convert <input.txt> --to <target> [--sep <c>] [--name <name>] [--out <path>]
  eqp-cli inspect <file>

Targets: proq, proq-fxp, proq2, proq3, proq3-fxp, reaeq, txt";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    match args.first().map(String::as_str) {
        Some("convert") => convert(&args[1..]),
        Some("inspect") => {
            let path = args.get(1).context(USAGE)?;
            inspect_file(Path::new(path))
        }
        Some("-h") | Some("--help") => {
            println!("{}", USAGE);
            Ok(())
        }
        _ => bail!("{}", USAGE),
    }
}

/// Value following `flag`, if the flag is present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> anyhow::Result<Option<&'a str>> {
    match args.iter().position(|a| a == flag) {
        Some(i) => args
            .get(i + 1)
            .map(|v| Some(v.as_str()))
            .with_context(|| format!("{} needs a value", flag)),
        None => Ok(None),
    }
}

fn convert(args: &[String]) -> anyhow::Result<()> {
    let input = args
        .first()
        .filter(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .context(USAGE)?;
    let target: TargetFormat = flag_value(args, "--to")?
        .context("missing --to <target>")?
        .parse()?;

    let mut options = ConvertOptions::default();
    if let Some(sep) = flag_value(args, "--sep")? {
        let mut chars = sep.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => options.decimal_separator = Some(c),
            _ => bail!("--sep takes a single character, got {:?}", sep),
        }
    }
    if let Some(name) = flag_value(args, "--name")? {
        options.preset_name = name.to_owned();
    }
    let output = output_path(&input, target, flag_value(args, "--out")?);

    let text = fs::read_to_string(&input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let converter = Converter::new(options);
    let filters = converter
        .parse_filters(&text)
        .with_context(|| format!("Failed to parse {}", input.display()))?;
    println!("Read {} filter bands from {}", filters.len(), input.display());

    let bytes = converter.encode(&filters, target)?;
    fs::write(&output, &bytes)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    println!("Wrote {} ({} bytes, {})", output.display(), bytes.len(), target);
    Ok(())
}

/// `--out` when given, else the input with the target's extension. When that
/// would be the input itself (`txt` from a `.txt` listing) the stem gets an
/// `.eqp` suffix instead.
fn output_path(input: &Path, target: TargetFormat, out: Option<&str>) -> PathBuf {
    if let Some(path) = out {
        return PathBuf::from(path);
    }
    let same_extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(target.extension()));
    if same_extension {
        input.with_extension(format!("eqp.{}", target.extension()))
    } else {
        input.with_extension(target.extension())
    }
}

fn inspect_file(path: &Path) -> anyhow::Result<()> {
    let data = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    match inspect(&data).with_context(|| format!("Failed to decode {}", path.display()))? {
        Some(summary) => {
            print!("{}", summary);
            Ok(())
        }
        None => bail!("{} is not a recognized preset file", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_takes_target_extension() {
        let out = output_path(Path::new("room/filters.txt"), TargetFormat::ProQ3, None);
        assert_eq!(out, PathBuf::from("room/filters.ffp"));
        let out = output_path(Path::new("filters.txt"), TargetFormat::ReaEq, None);
        assert_eq!(out, PathBuf::from("filters.fxp"));
    }

    #[test]
    fn text_dump_never_overwrites_listing() {
        let input = Path::new("room/filters.txt");
        let out = output_path(input, TargetFormat::Text, None);
        assert_ne!(out, input);
        assert_eq!(out, PathBuf::from("room/filters.eqp.txt"));
        let out = output_path(Path::new("FILTERS.TXT"), TargetFormat::Text, None);
        assert_eq!(out, PathBuf::from("FILTERS.eqp.txt"));
    }

    #[test]
    fn explicit_out_wins() {
        let out = output_path(Path::new("filters.txt"), TargetFormat::Text, Some("dump.txt"));
        assert_eq!(out, PathBuf::from("dump.txt"));
    }

    #[test]
    fn convert_writes_next_to_listing() {
        let dir = env::temp_dir().join(format!("eqp-cli-{}", process::id()));
        fs::create_dir_all(&dir).unwrap();
        let input = dir.join("listing.txt");
        let listing = "Equaliser: Generic\n\
Filter  1: ON  PK       Fc    63.8 Hz  Gain  -5.0 dB  Q  8.06\n";
        fs::write(&input, listing).unwrap();

        let args: Vec<String> = vec![
            "convert".to_owned(),
            input.display().to_string(),
            "--to".to_owned(),
            "txt".to_owned(),
        ];
        run(&args).unwrap();

        assert_eq!(fs::read_to_string(&input).unwrap(), listing);
        let dump = fs::read_to_string(dir.join("listing.eqp.txt")).unwrap();
        assert!(dump.starts_with("PK: 63.80 Hz"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
