//! Technology-priority ordering for provider listings

use std::cmp::Ordering;

use crate::models::ProviderWithCoverage;

/// Best covered technology first, then higher availability, then name.
///
/// Missing availability sorts after any recorded value.
pub fn rank_by_technology(providers: &mut [ProviderWithCoverage]) {
    providers.sort_by(|a, b| {
        b.best_priority()
            .cmp(&a.best_priority())
            .then_with(|| compare_availability(a.availability_percent, b.availability_percent))
            .then_with(|| a.provider.name.to_lowercase().cmp(&b.provider.name.to_lowercase()))
    });
}

fn compare_availability(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
