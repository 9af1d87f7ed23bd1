use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use trainer_hub_data::repository::Record;
use validator::Validate;

#[cfg(feature = "with-api")]
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Weight,
    BodyFat,
    MuscleMass,
    Measurement,
}

/// A body measurement recorded for a trainee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub id: String,
    pub trainee_id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    pub value: f64,
    pub unit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recorded_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Metric {
    const NAMESPACE: &'static str = "metrics";

    fn owner(&self) -> &str {
        &self.trainee_id
    }

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RecordMetricRequest {
    #[serde(rename = "type")]
    pub metric_type: MetricType,
    #[validate(range(min = 0.0, message = "Value cannot be negative"))]
    pub value: f64,
    #[validate(length(min = 1, max = 20, message = "Unit is required"))]
    pub unit: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(IntoParams))]
#[cfg_attr(feature = "with-api", into_params(parameter_in = Query))]
pub struct MetricFilter {
    /// Only metrics of this type
    #[serde(rename = "type")]
    pub metric_type: Option<MetricType>,
}
