use crate::config::Config;
use crate::kmer::KmerSet;
use crate::quality::{build_quality_vector, window_quality_score};
use crate::read::{Read, ScoringRecord};

/// Length score: 100 at `length == mean_length`, decaying symmetrically
/// and monotonically towards 0 as `length` moves away from it in either
/// direction.
///
/// `weight` scales how sharply the penalty grows per the CLI's
/// `--length_weight`; `weight = 0` disables the length penalty entirely.
pub fn length_score(length: usize, mean_length: f64, weight: f64) -> f64 {
    if length == 0 || mean_length <= 0.0 {
        return 0.0;
    }
    let ratio = length as f64 / mean_length;
    let penalty = weight * ratio.ln().abs();
    100.0 / (1.0 + penalty)
}

/// Applies `--mean_q_weight`/`--window_q_weight` to a raw sub-score in
/// [0, 100]: `weight = 1` leaves it unchanged, `weight = 0` discounts it
/// to 100 (no influence on the final score), intermediate weights
/// interpolate by exponentiating the normalized score. Monotone and
/// bounded in [0, 100] for any `raw` in that range.
fn apply_weight(raw: f64, weight: f64) -> f64 {
    (raw / 100.0).max(0.0).powf(weight) * 100.0
}

/// Score a single read: fills in its `ScoringRecord` from its sequence,
/// qualities, the run's configuration and (if present) the reference
/// k-mer set.
pub fn score_read(
    read: &Read,
    config: &Config,
    mean_length: f64,
    reference: Option<&KmerSet>,
) -> ScoringRecord {
    let length = read.length();
    if length == 0 {
        return ScoringRecord::default();
    }

    let quality = build_quality_vector(&read.sequence, read.qualities.as_deref(), reference);

    score_from_quality_vector(&quality, length, config, mean_length)
}

/// Score a read from an already-computed per-base quality vector (used by
/// both the full scorer and by trim/split, which re-scores sub-ranges).
pub fn score_from_quality_vector(
    quality: &[f64],
    length: usize,
    config: &Config,
    mean_length: f64,
) -> ScoringRecord {
    let raw_length_score = length_score(length, mean_length, config.length_weight);

    let raw_mean_quality = if quality.is_empty() {
        0.0
    } else {
        quality.iter().sum::<f64>() / quality.len() as f64
    };
    let raw_window_quality = window_quality_score(quality, config.window_size as usize);

    let mean_quality = apply_weight(raw_mean_quality, config.mean_q_weight);
    let window_quality = apply_weight(raw_window_quality, config.window_q_weight);

    let final_score = ScoringRecord::compute_final(raw_length_score, mean_quality, window_quality);

    ScoringRecord {
        length_score: raw_length_score,
        mean_quality,
        window_quality,
        final_score,
    }
}

/// Arithmetic mean length of a set of reads, used as the scorer's target
/// length. Returns 0 for an empty set.
pub fn mean_length(reads: &[Read]) -> f64 {
    if reads.is_empty() {
        return 0.0;
    }
    let total: usize = reads.iter().map(Read::length).sum();
    total as f64 / reads.len() as f64
}
