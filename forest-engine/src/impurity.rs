use crate::{Class, ClassCounts};

/// Gini impurity `1 - Σ p(c)²` of a label multiset. An empty set is pure.
pub fn gini(labels: impl IntoIterator<Item = Class>) -> f64 {
    gini_from_counts(&ClassCounts::from_labels(labels))
}

pub fn gini_from_counts(counts: &ClassCounts) -> f64 {
    let total = counts.total();
    if total == 0 {
        return 0.0;
    }
    let n = total as f64;
    1.0 - counts
        .iter()
        .map(|(_, count)| {
            let p = count as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Size-weighted impurity of a two-way partition.
pub fn weighted_gini(left: &ClassCounts, right: &ClassCounts) -> f64 {
    let n_left = left.total() as f64;
    let n_right = right.total() as f64;
    let n = n_left + n_right;
    if n == 0.0 {
        return 0.0;
    }
    (n_left / n) * gini_from_counts(left) + (n_right / n) * gini_from_counts(right)
}
