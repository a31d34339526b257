//! Ordered score-to-label lookup tables.
//!
//! A table is scanned top-down and the first band whose floor the value
//! clears wins, so tables are written from the highest floor to the lowest.

#[derive(Debug, Clone, Copy)]
pub struct Band<L> {
    pub floor: f64,
    pub inclusive: bool,
    pub label: L,
}

impl<L: Copy> Band<L> {
    /// Band that matches `value >= floor`.
    pub const fn at_least(floor: f64, label: L) -> Self {
        Self {
            floor,
            inclusive: true,
            label,
        }
    }

    /// Band that matches `value > floor`.
    pub const fn above(floor: f64, label: L) -> Self {
        Self {
            floor,
            inclusive: false,
            label,
        }
    }

    fn contains(&self, value: f64) -> bool {
        if self.inclusive {
            value >= self.floor
        } else {
            value > self.floor
        }
    }
}

pub fn classify<L: Copy>(table: &[Band<L>], value: f64) -> Option<L> {
    table.iter().find(|b| b.contains(value)).map(|b| b.label)
}

/// Points awarded for the first row whose floor the value clears.
pub fn points<L: Copy + Into<u32>>(table: &[Band<L>], value: f64) -> u32 {
    classify(table, value).map(Into::into).unwrap_or(0)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

pub fn deduplicate(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut unique = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            unique.push(item);
        }
    }
    unique
}
