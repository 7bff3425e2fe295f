/// A half-open, 0-based sub-range `[start, end)` of a read's bases
/// surviving trim/split.
pub type OutputRange = (usize, usize);

/// Per-read scoring record, filled once by the scorer.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoringRecord {
    pub length_score: f64,
    pub mean_quality: f64,
    pub window_quality: f64,
    pub final_score: f64,
}

impl ScoringRecord {
    /// `final_score = length_score * mean_quality * window_quality / 10_000`
    pub fn compute_final(length_score: f64, mean_quality: f64, window_quality: f64) -> f64 {
        length_score * mean_quality * window_quality / 10_000.0
    }
}

/// An immutable read as produced by ingest, carrying its filled-in
/// scoring record and (possibly trimmed/split) output ranges.
///
/// `order` records the read's position in the input stream so the
/// selector can restore input order after ranking.
#[derive(Debug, Clone)]
pub struct Read {
    pub order: usize,
    pub name: String,
    pub header: String,
    pub sequence: Vec<u8>,
    pub qualities: Option<Vec<u8>>,
    pub scoring: ScoringRecord,
    pub pass_thresholds: bool,
    pub ranges: Vec<OutputRange>,
}

impl Read {
    pub fn new(
        order: usize,
        header: String,
        sequence: Vec<u8>,
        qualities: Option<Vec<u8>>,
    ) -> Self {
        let name = header
            .split_whitespace()
            .next()
            .unwrap_or("")
            .to_string();
        let length = sequence.len();
        Read {
            order,
            name,
            header,
            sequence,
            qualities,
            scoring: ScoringRecord::default(),
            pass_thresholds: true,
            ranges: vec![(0, length)],
        }
    }

    pub fn length(&self) -> usize {
        self.sequence.len()
    }

    /// Total bases across all of this read's output ranges (i.e. after
    /// trim/split, but before the selector has acted).
    pub fn output_bases(&self) -> usize {
        self.ranges.iter().map(|(s, e)| e - s).sum()
    }
}
