use crate::quality::windowed_means;
use crate::read::OutputRange;

/// Windowed-mean quality below this is "bad" for trimming purposes. Not
/// exposed as a CLI flag; a named, documented internal default rather than
/// a value calibrated against fixture data, since none ships in this
/// retrieval pack. See DESIGN.md.
pub const TRIM_QUALITY_THRESHOLD: f64 = 80.0;

/// Windowed-mean quality below this counts towards a "bad run" for
/// splitting (same reasoning as [`TRIM_QUALITY_THRESHOLD`]).
pub const SPLIT_QUALITY_THRESHOLD: f64 = 80.0;

/// Walk inward from each end of `quality` while the shrinking-window mean
/// stays below [`TRIM_QUALITY_THRESHOLD`]; returns the retained half-open
/// range, or `None` if the whole read (or everything left after
/// `min_length` filtering) is bad.
pub fn trim_range(quality: &[f64], window: usize, min_length: Option<usize>) -> Option<OutputRange> {
    let len = quality.len();
    if len == 0 {
        return None;
    }
    let window = window.max(1);

    let mut start = 0usize;
    while start < len {
        let w = window.min(len - start);
        let mean = quality[start..start + w].iter().sum::<f64>() / w as f64;
        if mean >= TRIM_QUALITY_THRESHOLD {
            break;
        }
        start += 1;
    }

    let mut end = len;
    while end > start {
        let w = window.min(end - start);
        let mean = quality[end - w..end].iter().sum::<f64>() / w as f64;
        if mean >= TRIM_QUALITY_THRESHOLD {
            break;
        }
        end -= 1;
    }

    if start >= end {
        return None;
    }
    if let Some(min_len) = min_length {
        if end - start < min_len {
            return None;
        }
    }
    Some((start, end))
}

/// Maximal runs of bad window-starts within `range` (window mean below
/// `threshold`), expressed as half-open ranges of base indices clipped to
/// `range`. A run touching either end of `range` is dropped here: callers
/// must already have trimmed such flanks away, since a run touching an
/// endpoint is trimmed, not split.
fn bad_runs(quality: &[f64], range: OutputRange, window: usize, threshold: f64) -> Vec<OutputRange> {
    let (start, end) = range;
    if start >= end {
        return Vec::new();
    }
    let window = window.max(1);
    let slice = &quality[start..end];
    let means = windowed_means(slice, window.min(slice.len()).max(1));

    let mut runs = Vec::new();
    let mut run_start: Option<usize> = None;
    for (i, &m) in means.iter().enumerate() {
        let bad = m < threshold;
        match (bad, run_start) {
            (true, None) => run_start = Some(i),
            (false, Some(s)) => {
                runs.push((s, i));
                run_start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = run_start {
        runs.push((s, means.len()));
    }

    runs.into_iter()
        .filter(|&(s, e)| s > 0 && e < means.len())
        .map(|(s, e)| (start + s, start + e))
        .collect()
}

/// Split `range` at maximal bad runs of length ≥ `min_run`. Recurses on
/// each side of a cut. Returns ordered, disjoint
/// sub-ranges; a range with no qualifying bad run is returned unchanged.
pub fn split_range(
    quality: &[f64],
    range: OutputRange,
    window: usize,
    min_run: usize,
) -> Vec<OutputRange> {
    let (start, end) = range;
    if end <= start {
        return Vec::new();
    }

    let runs = bad_runs(quality, range, window, SPLIT_QUALITY_THRESHOLD);
    let cut = runs.into_iter().find(|&(s, e)| e - s >= min_run);

    match cut {
        None => vec![range],
        Some((run_start, run_end)) => {
            let midpoint = run_start + (run_end - run_start) / 2;
            let mut left = split_range(quality, (start, midpoint), window, min_run);
            let right = split_range(quality, (midpoint, end), window, min_run);
            left.extend(right);
            left
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trim_removes_bad_flanks() {
        let mut quality = vec![100.0; 30];
        for q in quality.iter_mut().take(5) {
            *q = 0.0;
        }
        for q in quality.iter_mut().skip(27) {
            *q = 0.0;
        }
        let range = trim_range(&quality, 5, None).unwrap();
        assert_eq!(range, (5, 27));
    }

    #[test]
    fn trim_keeps_uniformly_good_read_whole() {
        let quality = vec![100.0; 20];
        assert_eq!(trim_range(&quality, 5, None), Some((0, 20)));
    }

    #[test]
    fn trim_drops_entirely_bad_read() {
        let quality = vec![0.0; 20];
        assert_eq!(trim_range(&quality, 5, None), None);
    }

    #[test]
    fn trim_drops_if_below_min_length() {
        let mut quality = vec![100.0; 20];
        for q in quality.iter_mut().take(8) {
            *q = 0.0;
        }
        // retained range is [8, 20) = 12 bases
        assert_eq!(trim_range(&quality, 4, Some(15)), None);
        assert_eq!(trim_range(&quality, 4, Some(10)), Some((8, 20)));
    }

    #[test]
    fn split_leaves_uniform_range_untouched() {
        let quality = vec![100.0; 100];
        let ranges = split_range(&quality, (0, 100), 10, 20);
        assert_eq!(ranges, vec![(0, 100)]);
    }

    #[test]
    fn split_cuts_at_internal_bad_run() {
        let mut quality = vec![100.0; 100];
        for q in quality.iter_mut().skip(40).take(25) {
            *q = 0.0;
        }
        let ranges = split_range(&quality, (0, 100), 5, 20);
        assert_eq!(ranges.len(), 2);
        assert!(ranges[0].1 <= 53);
        assert!(ranges[1].0 >= 52);
        assert_eq!(ranges[0].0, 0);
        assert_eq!(ranges[1].1, 100);
    }

    #[test]
    fn split_ignores_run_shorter_than_min_run() {
        let mut quality = vec![100.0; 100];
        for q in quality.iter_mut().skip(40).take(5) {
            *q = 0.0;
        }
        let ranges = split_range(&quality, (0, 100), 5, 20);
        assert_eq!(ranges, vec![(0, 100)]);
    }

    // window = 1 so a run's length in "means" units equals its length in
    // bases exactly, with no smoothing across the run's edges.

    #[test]
    fn split_cuts_a_run_of_exactly_min_run_length() {
        let mut quality = vec![100.0; 100];
        for q in quality.iter_mut().skip(40).take(20) {
            *q = 0.0;
        }
        let ranges = split_range(&quality, (0, 100), 1, 20);
        assert_eq!(ranges.len(), 2);
    }

    #[test]
    fn split_leaves_a_run_one_base_short_of_min_run_untouched() {
        let mut quality = vec![100.0; 100];
        for q in quality.iter_mut().skip(40).take(19) {
            *q = 0.0;
        }
        let ranges = split_range(&quality, (0, 100), 1, 20);
        assert_eq!(ranges, vec![(0, 100)]);
    }

    #[test]
    fn split_ranges_are_ordered_and_disjoint() {
        let mut quality = vec![100.0; 200];
        for q in quality.iter_mut().skip(50).take(30) {
            *q = 0.0;
        }
        for q in quality.iter_mut().skip(140).take(30) {
            *q = 0.0;
        }
        let ranges = split_range(&quality, (0, 200), 5, 20);
        assert!(ranges.len() >= 2);
        for w in ranges.windows(2) {
            assert!(w[0].1 <= w[1].0);
        }
    }
}
