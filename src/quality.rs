use crate::kmer::{KmerSet, K};

/// Reference quality assigned to a base covered by no reference k-mer hit.
/// Tunable internal; the source tool does not expose this as a CLI flag,
/// so a conservative default (no credit at all for uncovered bases) is
/// used, penalizing bases the reference can't corroborate.
pub const REF_LOW_QUALITY: f64 = 0.0;
pub const REF_HIGH_QUALITY: f64 = 100.0;

/// Convert a single Phred+33 quality byte to a quality-vector value in
/// [0, 100]: `100 * (1 - 10^(-Q/10))`.
#[inline]
pub fn phred_byte_to_quality(byte: u8) -> f64 {
    let q = (byte as f64) - 33.0;
    100.0 * (1.0 - 10f64.powf(-q / 10.0))
}

/// Per-base Phred-derived quality vector, or `None` if the read carries no
/// quality string.
pub fn phred_quality_vector(qualities: Option<&[u8]>) -> Option<Vec<f64>> {
    qualities.map(|q| q.iter().map(|&b| phred_byte_to_quality(b)).collect())
}

/// Per-base reference-identity quality vector.
///
/// For each valid 16-mer start position, mark a hit if the canonical
/// k-mer is present in `reference`. A base is "covered" (quality 100) if
/// any hit's 16-base window contains it; otherwise it gets
/// [`REF_LOW_QUALITY`]. Coverage is computed with a difference array so
/// the whole vector is built in O(length).
pub fn reference_quality_vector(sequence: &[u8], reference: &KmerSet) -> Vec<f64> {
    let len = sequence.len();
    if len == 0 {
        return Vec::new();
    }
    // diff[i] += 1 at a hit's start, -= 1 just past its end; a running
    // prefix sum > 0 means the base is covered by at least one hit.
    let mut diff = vec![0i32; len + 1];
    if len >= K {
        for i in 0..=(len - K) {
            if reference.contains_at(sequence, i) {
                diff[i] += 1;
                diff[i + K] -= 1;
            }
        }
    }
    let mut covered = vec![false; len];
    let mut running = 0i32;
    for i in 0..len {
        running += diff[i];
        covered[i] = running > 0;
    }
    covered
        .into_iter()
        .map(|c| if c { REF_HIGH_QUALITY } else { REF_LOW_QUALITY })
        .collect()
}

/// Combine Phred-derived and reference-derived per-base quality into the
/// final per-base quality vector used by mean/window scoring:
///
/// - both present: pointwise product divided by 100
/// - only one present: that one
/// - neither: all bases are 100
pub fn base_quality_vector(
    length: usize,
    phred: Option<&[f64]>,
    reference: Option<&[f64]>,
) -> Vec<f64> {
    match (phred, reference) {
        (Some(p), Some(r)) => p.iter().zip(r.iter()).map(|(&a, &b)| a * b / 100.0).collect(),
        (Some(p), None) => p.to_vec(),
        (None, Some(r)) => r.to_vec(),
        (None, None) => vec![100.0; length],
    }
}

/// Build the full combined per-base quality vector for a read: Phred-derived
/// quality fused with reference-derived identity quality, if a reference
/// is given.
pub fn build_quality_vector(
    sequence: &[u8],
    qualities: Option<&[u8]>,
    reference: Option<&KmerSet>,
) -> Vec<f64> {
    let phred = phred_quality_vector(qualities);
    let reference_quality = reference.map(|r| reference_quality_vector(sequence, r));
    base_quality_vector(sequence.len(), phred.as_deref(), reference_quality.as_deref())
}

/// Per-position mean of a sliding window of width `w` over `quality`,
/// using a prefix-sum so the whole vector is produced in O(length)
/// regardless of `w`. A monotonic deque would be the natural tool for an
/// incrementally maintained sliding extremum, but here every window's
/// mean is needed at once, so a single prefix-sum pass is simpler and
/// asymptotically equivalent.
///
/// Returns an empty vector if `w` is zero or greater than `quality.len()`.
pub fn windowed_means(quality: &[f64], w: usize) -> Vec<f64> {
    let len = quality.len();
    if w == 0 || w > len {
        return Vec::new();
    }
    let mut prefix = vec![0.0f64; len + 1];
    for i in 0..len {
        prefix[i + 1] = prefix[i] + quality[i];
    }
    (0..=(len - w))
        .map(|i| (prefix[i + w] - prefix[i]) / w as f64)
        .collect()
}

/// Minimum over all `W`-wide sliding windows of `quality`'s mean. Shrinks
/// the window to the read's length if the read is shorter than `w`.
pub fn window_quality_score(quality: &[f64], w: usize) -> f64 {
    if quality.is_empty() {
        return 0.0;
    }
    let effective_w = w.min(quality.len()).max(1);
    windowed_means(quality, effective_w)
        .into_iter()
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phred_byte_q10_is_90_percent() {
        // Q10 -> error prob 0.1 -> quality 100*(1-0.1) = 90
        let q = phred_byte_to_quality(33 + 10);
        assert!((q - 90.0).abs() < 1e-9);
    }

    #[test]
    fn phred_byte_q0_is_zero() {
        let q = phred_byte_to_quality(33);
        assert!(q.abs() < 1e-9);
    }

    #[test]
    fn base_quality_combines_both_sources() {
        let phred = vec![80.0, 100.0];
        let reference = vec![100.0, 0.0];
        let combined = base_quality_vector(2, Some(&phred), Some(&reference));
        assert!((combined[0] - 80.0).abs() < 1e-9);
        assert!((combined[1] - 0.0).abs() < 1e-9);
    }

    #[test]
    fn base_quality_defaults_to_100_with_neither_source() {
        let combined = base_quality_vector(3, None, None);
        assert_eq!(combined, vec![100.0, 100.0, 100.0]);
    }

    #[test]
    fn windowed_means_shrinks_for_short_reads() {
        let quality = vec![50.0, 60.0, 70.0];
        let means = windowed_means(&quality, 3);
        assert_eq!(means.len(), 1);
        assert!((means[0] - 60.0).abs() < 1e-9);
    }

    #[test]
    fn window_quality_finds_the_bad_patch() {
        let mut quality = vec![100.0; 10];
        quality[4] = 0.0;
        quality[5] = 0.0;
        let wq = window_quality_score(&quality, 2);
        assert!((wq - 0.0).abs() < 1e-9);
    }

    #[test]
    fn reference_quality_is_zero_with_empty_reference() {
        let empty = KmerSet::new();
        let vq = reference_quality_vector(b"ACGTACGTACGTACGTGGGG", &empty);
        assert!(vq.iter().all(|&v| v == REF_LOW_QUALITY));
    }

    #[test]
    fn reference_quality_empty_sequence_is_empty_vector() {
        let empty = KmerSet::new();
        assert!(reference_quality_vector(b"", &empty).is_empty());
    }
}
