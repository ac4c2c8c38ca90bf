use crate::Class;
use serde::{Deserialize, Serialize};

/// Per-class tallies in first-seen order.
///
/// Class sets are tiny (two in practice), so a vector beats a map here and
/// keeps iteration order stable for tie-breaking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts {
    counts: Vec<(Class, usize)>,
}

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_labels(labels: impl IntoIterator<Item = Class>) -> Self {
        let mut counts = Self::new();
        for label in labels {
            counts.add(label);
        }
        counts
    }

    pub fn add(&mut self, class: Class) {
        match self.counts.iter_mut().find(|(c, _)| *c == class) {
            Some((_, count)) => *count += 1,
            None => self.counts.push((class, 1)),
        }
    }

    pub fn remove(&mut self, class: Class) {
        if let Some((_, count)) = self.counts.iter_mut().find(|(c, _)| *c == class) {
            *count = count.saturating_sub(1);
        }
    }

    pub fn get(&self, class: Class) -> usize {
        self.counts
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Class, usize)> + '_ {
        self.counts.iter().copied()
    }

    /// Number of classes with a non-zero count.
    pub fn distinct(&self) -> usize {
        self.counts.iter().filter(|(_, count)| *count > 0).count()
    }

    /// Most frequent class; ties go to the class seen first.
    pub fn majority(&self) -> Option<Class> {
        let mut best: Option<(Class, usize)> = None;
        for (class, count) in self.iter().filter(|(_, count)| *count > 0) {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((class, count));
            }
        }
        best.map(|(class, _)| class)
    }

    pub fn to_distribution(&self) -> ClassDistribution {
        let total = self.total();
        if total == 0 {
            return ClassDistribution::default();
        }
        ClassDistribution {
            probabilities: self
                .iter()
                .filter(|(_, count)| *count > 0)
                .map(|(class, count)| (class, count as f64 / total as f64))
                .collect(),
        }
    }
}

/// Probability per class, stored in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDistribution {
    probabilities: Vec<(Class, f64)>,
}

impl ClassDistribution {
    /// Probability of `class`, 0 when the class is absent.
    pub fn probability(&self, class: Class) -> f64 {
        self.probabilities
            .iter()
            .find(|(c, _)| *c == class)
            .map(|(_, p)| *p)
            .unwrap_or(0.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Class, f64)> + '_ {
        self.probabilities.iter().copied()
    }

    pub fn sum(&self) -> f64 {
        self.probabilities.iter().map(|(_, p)| p).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    /// Highest-probability class; ties go to the class inserted first.
    pub fn argmax(&self) -> Option<Class> {
        let mut best: Option<(Class, f64)> = None;
        for (class, p) in self.iter() {
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((class, p));
            }
        }
        best.map(|(class, _)| class)
    }

    /// Per-class mean over `distributions`. A class missing from one
    /// distribution contributes 0 for it.
    pub fn mean<'a>(distributions: impl IntoIterator<Item = &'a ClassDistribution>) -> Self {
        let mut sums: Vec<(Class, f64)> = Vec::new();
        let mut n = 0usize;
        for distribution in distributions {
            n += 1;
            for (class, p) in distribution.iter() {
                match sums.iter_mut().find(|(c, _)| *c == class) {
                    Some((_, sum)) => *sum += p,
                    None => sums.push((class, p)),
                }
            }
        }
        if n == 0 {
            return Self::default();
        }
        Self {
            probabilities: sums
                .into_iter()
                .map(|(class, sum)| (class, sum / n as f64))
                .collect(),
        }
    }
}
