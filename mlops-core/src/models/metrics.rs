use std::collections::HashMap;

use serde::Deserialize;

use crate::error::AppError;

/// The report key of the best validation hit ratio.
pub const METRIC_BEST_HR: &str = "validation:best_hr";
/// The report key of the best validation NDCG.
pub const METRIC_BEST_NDCG: &str = "validation:best_ndcg";

/// A model quality report as written by the recommendation training jobs.
#[derive(Clone, Debug, Deserialize)]
pub struct MetricsReport {
    #[serde(default)]
    pub recommendation_metrics: HashMap<String, MetricValue>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MetricValue {
    pub value: f64,
}

impl MetricsReport {
    /// The value of the named recommendation metric.
    pub fn value(&self, name: &str) -> Result<f64, AppError> {
        self.recommendation_metrics
            .get(name)
            .map(|metric| metric.value)
            .ok_or_else(|| AppError::MissingMetric(name.to_string()))
    }

    /// The best validation hit ratio.
    pub fn best_hit_ratio(&self) -> Result<f64, AppError> {
        self.value(METRIC_BEST_HR)
    }

    /// The best validation NDCG.
    pub fn best_ndcg(&self) -> Result<f64, AppError> {
        self.value(METRIC_BEST_NDCG)
    }
}
