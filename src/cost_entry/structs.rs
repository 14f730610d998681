//! The structs
//!
/// The contribution of a single dimension value to a change.
///
/// - `change_ratio`: current value divided by baseline value.
/// - `change_diff`: current value minus baseline value.
/// - `baseline_size`, `current_size`: share of the value in the total of the baseline and current reading.
/// - `size_factor`: share of the value in both readings together.
/// - `cost`: the number entries are ranked on.
#[derive(Debug, Clone)]
pub struct CostEntry {
    pub dim_name: String,
    pub dim_value: String,
    pub baseline_value: f64,
    pub current_value: f64,
    pub change_ratio: f64,
    pub change_diff: f64,
    pub baseline_size: f64,
    pub current_size: f64,
    pub size_factor: f64,
    pub cost: f64,
}
