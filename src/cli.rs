use std::path::PathBuf;
use structopt::StructOpt;
use thiserror::Error;

/// Quality filtering, trimming and splitting for long-read sequencing data
#[derive(Debug, StructOpt)]
#[structopt()]
pub struct Cli {
    /// Input read file(s), Fast{a,q}.{gz,xz,bz}; stdin if none given.
    #[structopt(short, long, parse(from_os_str))]
    pub input: Vec<PathBuf>,

    /// Output filepath, stdout if not present.
    #[structopt(short, long, parse(from_os_str))]
    pub output: Option<PathBuf>,

    /// Assembly FASTA used to build the reference k-mer set.
    #[structopt(short = "a", long, parse(from_os_str))]
    pub assembly: Option<PathBuf>,

    /// First paired short-read FASTQ file for the reference k-mer set.
    #[structopt(short = "1", long = "reads1", parse(from_os_str))]
    pub reads1: Option<PathBuf>,

    /// Second paired short-read FASTQ file for the reference k-mer set.
    #[structopt(short = "2", long = "reads2", parse(from_os_str))]
    pub reads2: Option<PathBuf>,

    /// Total-bases budget; accepts unit suffixes (k/kb/m/mb/g/gb).
    #[structopt(long, parse(try_from_str = parse_size_opt))]
    pub target_bases: Option<u64>,

    /// Percent-bases budget in (0, 100).
    #[structopt(long)]
    pub keep_percent: Option<f64>,

    /// Minimum read length filter (bp); accepts unit suffixes.
    #[structopt(short = "l", long, parse(try_from_str = parse_size_opt))]
    pub min_length: Option<u64>,

    /// Maximum read length filter (bp); accepts unit suffixes.
    #[structopt(short = "L", long, parse(try_from_str = parse_size_opt))]
    pub max_length: Option<u64>,

    /// Minimum mean per-read quality filter (0-100).
    #[structopt(long)]
    pub min_mean_q: Option<f64>,

    /// Minimum window quality filter (0-100).
    #[structopt(long)]
    pub min_window_q: Option<f64>,

    /// Sliding window width for window-quality scoring.
    #[structopt(long, default_value = "250")]
    pub window_size: u64,

    /// Scaling factor for the length-score penalty.
    #[structopt(long, default_value = "1.0")]
    pub length_weight: f64,

    /// Scaling factor for mean-quality in the final score.
    #[structopt(long, default_value = "1.0")]
    pub mean_q_weight: f64,

    /// Scaling factor for window-quality in the final score.
    #[structopt(long, default_value = "1.0")]
    pub window_q_weight: f64,

    /// Trim low-quality head/tail regions (requires a reference).
    #[structopt(long)]
    pub trim: bool,

    /// Split reads at bad regions of at least N bases (requires a reference).
    #[structopt(long, parse(try_from_str = parse_size_opt))]
    pub split: Option<u64>,

    /// Verbose progress output [multiple, up to -vvv].
    #[structopt(short, long, parse(from_occurrences = parse_verbosity))]
    pub verbose: u64,

    /// u: uncompressed; b: Bzip2; g: Gzip; l: Lzma
    ///
    /// nq-filter will attempt to infer the output compression format
    /// automatically from the filename extension. This option overrides
    /// that inference. If writing to stdout, the default is uncompressed.
    #[structopt(
        short = "O",
        long,
        value_name = "u|b|g|l",
        parse(try_from_str = parse_compression_format),
        possible_values = &["u", "b", "g", "l"],
        case_insensitive = true,
        hide_possible_values = true
    )]
    pub output_type: Option<niffler::compression::Format>,

    /// Compression level to use if compressing output.
    #[structopt(
        short = "c",
        long,
        parse(try_from_str = parse_compression_level),
        default_value = "6",
        value_name = "1-9"
    )]
    pub compress_level: niffler::Level,
}

/// A collection of custom errors relating to the command line interface.
#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    /// Indicates that a string cannot be parsed into a [`CompressionFormat`](#compressionformat).
    #[error("{0} is not a valid output format")]
    InvalidCompressionFormat(String),

    /// Indicates that a string cannot be parsed into a [`CompressionLevel`](#compressionlevel).
    #[error("{0} is not a valid compression level [1-9]")]
    InvalidCompressionLevel(String),

    /// Indicates that a size/length value could not be parsed.
    #[error("invalid value '{0}' for size option")]
    InvalidSizeValue(String),
}

/// Utility function to parse verbosity occurrences.
///
/// Up to three verbosity flags are allowed (-vvv); if more are given
/// (-vvvv) the highest allowed value is returned.
pub fn parse_verbosity(v: u64) -> u64 {
    match v {
        0 | 1 | 2 | 3 => v,
        _ => 3,
    }
}

/// Utility function to parse compression format.
fn parse_compression_format(s: &str) -> Result<niffler::compression::Format, CliError> {
    match s {
        "b" | "B" => Ok(niffler::Format::Bzip),
        "g" | "G" => Ok(niffler::Format::Gzip),
        "l" | "L" => Ok(niffler::Format::Lzma),
        "u" | "U" => Ok(niffler::Format::No),
        _ => Err(CliError::InvalidCompressionFormat(s.to_string())),
    }
}

/// Utility function to parse and validate compression level.
#[allow(clippy::redundant_clone)]
fn parse_compression_level(s: &str) -> Result<niffler::Level, CliError> {
    let lvl = match s.parse::<u8>() {
        Ok(1) => niffler::Level::One,
        Ok(2) => niffler::Level::Two,
        Ok(3) => niffler::Level::Three,
        Ok(4) => niffler::Level::Four,
        Ok(5) => niffler::Level::Five,
        Ok(6) => niffler::Level::Six,
        Ok(7) => niffler::Level::Seven,
        Ok(8) => niffler::Level::Eight,
        Ok(9) => niffler::Level::Nine,
        _ => return Err(CliError::InvalidCompressionLevel(s.to_string())),
    };
    Ok(lvl)
}

/// Parse a size value with an optional unit suffix (k/kb/m/mb/g/gb,
/// case-insensitive, decimal allowed) into a `ceil`-rounded integer.
///
/// This is the `try_from_str` parser `structopt` calls directly for
/// options that accept raw numeric values on the command line; unparseable
/// input is surfaced here as a clap "invalid value" error. Values that
/// parse but are not strictly positive are accepted here and rejected
/// later, during semantic validation in `config.rs`, with the tool's
/// specific `--option must be a positive integer` message.
pub fn parse_size_opt(s: &str) -> Result<u64, CliError> {
    parse_size(s).ok_or_else(|| CliError::InvalidSizeValue(s.to_string()))
}

/// Parse a size string into `ceil(number * multiplier)`, or `None` if the
/// string is not a valid (optionally negative, optionally suffixed) number.
///
/// Returns `None` rather than erroring on negative values so that callers
/// can distinguish "unparseable" from "parses but is non-positive".
pub fn parse_size(s: &str) -> Option<u64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    let lower = s.to_ascii_lowercase();
    let (numeric_part, multiplier) = if let Some(stripped) = lower.strip_suffix("kb") {
        (stripped, 1_000f64)
    } else if let Some(stripped) = lower.strip_suffix("mb") {
        (stripped, 1_000_000f64)
    } else if let Some(stripped) = lower.strip_suffix("gb") {
        (stripped, 1_000_000_000f64)
    } else if let Some(stripped) = lower.strip_suffix('k') {
        (stripped, 1_000f64)
    } else if let Some(stripped) = lower.strip_suffix('m') {
        (stripped, 1_000_000f64)
    } else if let Some(stripped) = lower.strip_suffix('g') {
        (stripped, 1_000_000_000f64)
    } else {
        (lower.as_str(), 1f64)
    };
    if numeric_part.is_empty() {
        return None;
    }
    let value: f64 = numeric_part.parse().ok()?;
    if value < 0.0 {
        return None;
    }
    Some((value * multiplier).ceil() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_compression_format() {
        let passed_args = vec!["nq-filter", "-O", "t"];
        let args: Result<Cli, clap::Error> = Cli::from_iter_safe(passed_args);

        let actual = args.unwrap_err().kind;
        let expected = clap::ErrorKind::InvalidValue;

        assert_eq!(actual, expected)
    }

    #[test]
    fn invalid_compression_level() {
        let passed_args = vec!["nq-filter", "-c", "10"];
        let args: Result<Cli, clap::Error> = Cli::from_iter_safe(passed_args);

        let actual = args.unwrap_err().kind;
        let expected = clap::ErrorKind::ValueValidation;

        assert_eq!(actual, expected)
    }

    #[test]
    fn verbosity_exceeds_limit() {
        let passed_args = vec!["nq-filter", "-vvvv"];
        let args = Cli::from_iter_safe(passed_args);

        let actual = args.unwrap().verbose;
        let expected = 3;

        assert_eq!(actual, expected)
    }

    #[test]
    fn verbosity_from_occurrences() {
        assert_eq!(parse_verbosity(0), 0);
        assert_eq!(parse_verbosity(1), 1);
        assert_eq!(parse_verbosity(2), 2);
        assert_eq!(parse_verbosity(3), 3);
        assert_eq!(parse_verbosity(4), 3);
        assert_eq!(parse_verbosity(666), 3);
    }

    #[test]
    fn compression_format_from_str() {
        assert_eq!(parse_compression_format("B").unwrap(), niffler::Format::Bzip);
        assert_eq!(parse_compression_format("g").unwrap(), niffler::Format::Gzip);
        assert_eq!(parse_compression_format("l").unwrap(), niffler::Format::Lzma);
        assert_eq!(parse_compression_format("U").unwrap(), niffler::Format::No);
        assert_eq!(
            parse_compression_format("a").unwrap_err(),
            CliError::InvalidCompressionFormat("a".to_string())
        );
    }

    #[test]
    fn compression_level_in_range() {
        for l in 1..=9 {
            assert!(parse_compression_level(&l.to_string()).is_ok());
        }
        assert!(parse_compression_level("0").is_err());
        assert!(parse_compression_level("10").is_err());
        assert!(parse_compression_level("f").is_err());
        assert!(parse_compression_level("5.5").is_err());
        assert!(parse_compression_level("-3").is_err());
    }

    #[test]
    fn size_suffixes() {
        assert_eq!(parse_size("1k"), Some(1000));
        assert_eq!(parse_size("1kb"), Some(1000));
        assert_eq!(parse_size("0.01m"), Some(10000));
        assert_eq!(parse_size("0.01mb"), Some(10000));
        assert_eq!(parse_size("3.5mb"), Some(3500000));
        assert_eq!(parse_size("3.5k"), Some(3500));
        assert_eq!(parse_size("1g"), Some(1_000_000_000));
        assert_eq!(parse_size("1gb"), Some(1_000_000_000));
        assert_eq!(parse_size("10000"), Some(10000));
    }

    #[test]
    fn size_case_insensitive() {
        assert_eq!(parse_size("10K"), Some(10000));
        assert_eq!(parse_size("10KB"), Some(10000));
        assert_eq!(parse_size("0.01M"), Some(10000));
        assert_eq!(parse_size("0.01MB"), Some(10000));
    }

    #[test]
    fn size_rejects_negative_and_garbage() {
        assert_eq!(parse_size("-10k"), None);
        assert_eq!(parse_size("-5kb"), None);
        assert_eq!(parse_size("10xyz"), None);
        assert_eq!(parse_size("k"), None);
        assert_eq!(parse_size(""), None);
    }
}
