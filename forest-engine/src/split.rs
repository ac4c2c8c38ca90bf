use crate::impurity::weighted_gini;
use crate::{ClassCounts, Sample};

/// A candidate partition of a node's samples.
#[derive(Debug, Clone)]
pub struct Split<'a> {
    pub feature_index: usize,
    pub threshold: f32,
    pub impurity: f64,
    /// Samples with `features[feature_index] <= threshold`.
    pub left: Vec<&'a Sample>,
    pub right: Vec<&'a Sample>,
}

/// Searches `candidate_features` for the split with the lowest weighted Gini
/// impurity.
///
/// Thresholds are midpoints between adjacent distinct values of a feature.
/// The first split found wins ties, so candidate order matters. Returns
/// `None` when no feature has two distinct values.
pub fn best_split<'a>(data: &[&'a Sample], candidate_features: &[usize]) -> Option<Split<'a>> {
    let mut best: Option<(usize, f32, f64)> = None;

    for &feature in candidate_features {
        if let Some((threshold, impurity)) = best_threshold(data, feature) {
            if best.map_or(true, |(_, _, best_impurity)| impurity < best_impurity) {
                best = Some((feature, threshold, impurity));
            }
        }
    }

    let (feature_index, threshold, impurity) = best?;
    let (left, right): (Vec<&Sample>, Vec<&Sample>) = data
        .iter()
        .copied()
        .partition(|sample| sample.features[feature_index] <= threshold);

    Some(Split {
        feature_index,
        threshold,
        impurity,
        left,
        right,
    })
}

/// Sweeps the sorted values of one feature, moving samples from the right
/// tally to the left one at each distinct-value boundary.
fn best_threshold(data: &[&Sample], feature: usize) -> Option<(f32, f64)> {
    let mut sorted: Vec<(f32, u8)> = data
        .iter()
        .map(|sample| (sample.features[feature], sample.label))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut left = ClassCounts::new();
    let mut right = ClassCounts::from_labels(sorted.iter().map(|(_, label)| *label));
    let mut best: Option<(f32, f64)> = None;

    for i in 0..sorted.len().saturating_sub(1) {
        let (value, label) = sorted[i];
        left.add(label);
        right.remove(label);

        let next = sorted[i + 1].0;
        if next <= value {
            continue;
        }

        let impurity = weighted_gini(&left, &right);
        if best.map_or(true, |(_, best_impurity)| impurity < best_impurity) {
            best = Some((midpoint(value, next), impurity));
        }
    }

    best
}

/// Midpoint of two adjacent distinct values, clamped so `lo <= t < hi` holds
/// even when the halfway point rounds up to `hi`.
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = lo + (hi - lo) / 2.0;
    if mid >= hi {
        lo
    } else {
        mid
    }
}
