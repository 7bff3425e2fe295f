use crate::config::Config;
use crate::read::Read;

/// Result of hard-threshold filtering plus (if a budget is configured)
/// budgeted selection.
pub struct Selection {
    /// Indices into the input slice that survive, in original input order.
    pub kept: Vec<usize>,
    /// The computed budget, if `--target_bases`/`--keep_percent` was set.
    pub budget: Option<u64>,
    /// Total bases across `kept`.
    pub kept_bases: u64,
    /// True if fewer post-threshold bases were available than the budget.
    pub not_enough: bool,
}

/// Mark each read's `pass_thresholds` from the hard length/quality floors
/// and ceilings. Does not look at any budget.
pub fn apply_thresholds(reads: &mut [Read], config: &Config) {
    for read in reads.iter_mut() {
        let length = read.length() as u64;
        let mut pass = true;
        if let Some(min) = config.min_length {
            pass &= length >= min;
        }
        if let Some(max) = config.max_length {
            pass &= length <= max;
        }
        if let Some(min_q) = config.min_mean_q {
            pass &= read.scoring.mean_quality >= min_q;
        }
        if let Some(min_wq) = config.min_window_q {
            pass &= read.scoring.window_quality >= min_wq;
        }
        read.pass_thresholds = pass;
    }
}

/// Budget in bases from `--target_bases`/`--keep_percent`, the minimum of
/// the two if both are set.
fn compute_budget(config: &Config, total_post_threshold_bases: u64) -> Option<u64> {
    let from_target = config.target_bases;
    let from_percent = config
        .keep_percent
        .map(|p| ((p / 100.0) * total_post_threshold_bases as f64).floor() as u64);
    match (from_target, from_percent) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

/// Apply hard thresholds (already marked via [`apply_thresholds`]) and
/// budgeted selection, returning the kept indices in original input order.
pub fn select(reads: &[Read], config: &Config) -> Selection {
    let post_threshold: Vec<usize> = reads
        .iter()
        .enumerate()
        .filter(|(_, r)| r.pass_thresholds)
        .map(|(i, _)| i)
        .collect();

    let total_post_threshold_bases: u64 = post_threshold
        .iter()
        .map(|&i| reads[i].length() as u64)
        .sum();

    let budget = compute_budget(config, total_post_threshold_bases);

    let budget = match budget {
        None => {
            return Selection {
                kept: post_threshold,
                budget: None,
                kept_bases: total_post_threshold_bases,
                not_enough: false,
            };
        }
        Some(b) => b,
    };

    let mut ranked = post_threshold.clone();
    ranked.sort_by(|&a, &b| {
        reads[b]
            .scoring
            .final_score
            .partial_cmp(&reads[a].scoring.final_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| reads[a].name.cmp(&reads[b].name))
    });

    let not_enough = total_post_threshold_bases < budget;

    let mut kept_indices = Vec::new();
    let mut cumulative = 0u64;
    for &idx in &ranked {
        let len = reads[idx].length() as u64;
        if cumulative + len <= budget {
            kept_indices.push(idx);
            cumulative += len;
        } else if cumulative < budget {
            kept_indices.push(idx);
            cumulative += len;
            break;
        } else {
            break;
        }
    }

    kept_indices.sort_unstable();

    Selection {
        kept: kept_indices,
        budget: Some(budget),
        kept_bases: cumulative,
        not_enough,
    }
}
