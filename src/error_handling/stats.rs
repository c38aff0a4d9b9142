//! Conversion statistics tracking.
//!
//! Counts the recoverable anomalies a run works around so they can be
//! summarized once the output is written.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use log::info;
use strum::IntoEnumIterator;

use super::types::WarningType;

/// Per-run warning counters.
///
/// Every [`WarningType`] is initialized to zero on creation. Counters are
/// atomic so the tracker can be shared by reference between pipeline stages.
pub struct ConversionStats {
    warnings: HashMap<WarningType, AtomicUsize>,
}

impl ConversionStats {
    /// Creates a tracker with every warning counter at zero.
    pub fn new() -> Self {
        let mut warnings = HashMap::new();
        for warning in WarningType::iter() {
            warnings.insert(warning, AtomicUsize::new(0));
        }
        ConversionStats { warnings }
    }

    /// Increment a warning counter.
    pub fn increment_warning(&self, warning: WarningType) {
        self.add_warnings(warning, 1);
    }

    /// Add `count` occurrences of a warning.
    pub fn add_warnings(&self, warning: WarningType, count: usize) {
        if let Some(counter) = self.warnings.get(&warning) {
            counter.fetch_add(count, Ordering::Relaxed);
        } else {
            log::error!(
                "Attempted to increment warning counter for {:?} which is not in the map. \
                 This indicates a bug in ConversionStats initialization.",
                warning
            );
        }
    }

    /// Get the count for a warning type.
    pub fn get_warning_count(&self, warning: WarningType) -> usize {
        self.warnings
            .get(&warning)
            .map(|c| c.load(Ordering::SeqCst))
            .unwrap_or(0)
    }

    /// Get total warning count across all warning types.
    pub fn total_warnings(&self) -> usize {
        WarningType::iter().map(|w| self.get_warning_count(w)).sum()
    }
}

impl Default for ConversionStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Logs the non-zero warning counters of a finished run.
pub fn log_conversion_statistics(stats: &ConversionStats) {
    let total_warnings = stats.total_warnings();
    if total_warnings == 0 {
        return;
    }

    info!("Warning Counts ({} total):", total_warnings);
    for warning_type in WarningType::iter() {
        let count = stats.get_warning_count(warning_type);
        if count > 0 {
            info!("   {}: {}", warning_type.as_str(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_initialized_to_zero() {
        let stats = ConversionStats::new();
        for warning_type in WarningType::iter() {
            assert_eq!(stats.get_warning_count(warning_type), 0);
        }
        assert_eq!(stats.total_warnings(), 0);
    }

    #[test]
    fn test_stats_increment_and_total() {
        let stats = ConversionStats::new();
        stats.increment_warning(WarningType::PaddedFields);
        stats.increment_warning(WarningType::PaddedFields);
        stats.add_warnings(WarningType::UnresolvedMediaRef, 3);

        assert_eq!(stats.get_warning_count(WarningType::PaddedFields), 2);
        assert_eq!(stats.get_warning_count(WarningType::UnresolvedMediaRef), 3);
        assert_eq!(stats.total_warnings(), 5);
    }

    #[test]
    fn test_log_conversion_statistics_does_not_panic() {
        let stats = ConversionStats::new();
        log_conversion_statistics(&stats);
        stats.increment_warning(WarningType::TruncatedCell);
        log_conversion_statistics(&stats);
    }
}
