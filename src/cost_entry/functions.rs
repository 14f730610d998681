//! The impls and functions
//!
use std::{cmp::Ordering, fmt};
use crate::cost_entry::CostEntry;

impl CostEntry {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dim_name: &str,
        dim_value: &str,
        baseline_value: f64,
        current_value: f64,
        change_ratio: f64,
        change_diff: f64,
        baseline_size: f64,
        current_size: f64,
        size_factor: f64,
        cost: f64,
    ) -> Self
    {
        CostEntry {
            dim_name: dim_name.to_string(),
            dim_value: dim_value.to_string(),
            baseline_value,
            current_value,
            change_ratio,
            change_diff,
            baseline_size,
            current_size,
            size_factor,
            cost,
        }
    }
}

// ordering and equality only look at the cost.
impl PartialEq for CostEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for CostEntry {}

impl PartialOrd for CostEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CostEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost.total_cmp(&other.cost)
    }
}

impl fmt::Display for CostEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry{{dim={}:{}, baseVal={:?}, curVal={:?}, ratio={:.4}, delta={:?}, baseSize={:?}, curSize={:?}, sizeFactor={:.4}, cost={:.6}}}",
               self.dim_name,
               self.dim_value,
               self.baseline_value,
               self.current_value,
               self.change_ratio,
               self.change_diff,
               self.baseline_size,
               self.current_size,
               self.size_factor,
               self.cost
        )
    }
}
