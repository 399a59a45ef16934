use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::str::FromStr;
use validator::Validate;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigType {
    Banner,
    Activity,
    Setting,
}

impl ConfigType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigType::Banner => "banner",
            ConfigType::Activity => "activity",
            ConfigType::Setting => "setting",
        }
    }
}

impl FromStr for ConfigType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "banner" => Ok(ConfigType::Banner),
            "activity" => Ok(ConfigType::Activity),
            "setting" => Ok(ConfigType::Setting),
            other => Err(AppError::Validation(format!(
                "config_type must be banner, activity or setting, got `{}`",
                other
            ))),
        }
    }
}

/// An admin-editable content block with an optional validity window.
/// Validity is computed from the clock on every read, never stored.
#[derive(Debug, Clone, FromRow)]
pub struct DynamicConfig {
    pub id: i64,
    pub config_type: String,
    pub title: String,
    pub sort_order: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub is_active: bool,
    pub extra_data: JsonValue,
    pub create_time: i64,
    pub update_time: i64,
    pub is_delete: bool,
    pub delete_time: Option<i64>,
}

impl DynamicConfig {
    pub fn is_valid_at(&self, now: i64) -> bool {
        is_within_window(now, self.start_time, self.end_time)
    }
}

/// The time-window validity check. Missing bounds are open-ended.
pub fn is_within_window(now: i64, start_time: Option<i64>, end_time: Option<i64>) -> bool {
    match (start_time, end_time) {
        (None, None) => true,
        (Some(start), None) => now >= start,
        (None, Some(end)) => now <= end,
        (Some(start), Some(end)) => start <= now && now <= end,
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DynamicConfigResponse {
    pub id: i64,
    pub config_type: String,
    pub title: String,
    pub sort_order: i64,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub is_active: bool,
    pub is_valid: bool,
    pub extra_data: JsonValue,
    pub create_time: i64,
    pub update_time: i64,
}

impl DynamicConfigResponse {
    pub fn from_config_at(config: DynamicConfig, now: i64) -> Self {
        let is_valid = config.is_valid_at(now);
        DynamicConfigResponse {
            id: config.id,
            config_type: config.config_type,
            title: config.title,
            sort_order: config.sort_order,
            start_time: config.start_time,
            end_time: config.end_time,
            is_active: config.is_active,
            is_valid,
            extra_data: config.extra_data,
            create_time: config.create_time,
            update_time: config.update_time,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct DynamicConfigForm {
    pub config_type: ConfigType,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[serde(default)]
    pub sort_order: i64,

    pub start_time: Option<i64>,
    pub end_time: Option<i64>,

    #[serde(default = "default_true")]
    pub is_active: bool,

    /// Free-form payload; persisted as `{}` when omitted.
    pub extra_data: Option<JsonValue>,
}

fn default_true() -> bool {
    true
}

impl DynamicConfigForm {
    /// Write-time guard: a closed window must be ordered.
    pub fn check(&self) -> AppResult<()> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start >= end {
                return Err(AppError::Validation(
                    "start_time must be earlier than end_time".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn extra_data_or_default(&self) -> JsonValue {
        self.extra_data
            .clone()
            .unwrap_or_else(|| JsonValue::Object(Default::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_truth_table() {
        // No bounds: always valid.
        assert!(is_within_window(5, None, None));

        // Lower bound only.
        assert!(is_within_window(3, Some(3), None));
        assert!(is_within_window(9, Some(3), None));
        assert!(!is_within_window(2, Some(3), None));

        // Upper bound only.
        assert!(is_within_window(10, None, Some(10)));
        assert!(!is_within_window(11, None, Some(10)));

        // Both bounds, inclusive at each edge.
        assert!(is_within_window(5, Some(3), Some(10)));
        assert!(is_within_window(3, Some(3), Some(10)));
        assert!(is_within_window(10, Some(3), Some(10)));
        assert!(!is_within_window(2, Some(3), Some(10)));
        assert!(!is_within_window(11, Some(3), Some(10)));
    }

    #[test]
    fn reversed_window_rejected_at_write_time() {
        let form = DynamicConfigForm {
            config_type: ConfigType::Banner,
            title: "Spring sale".to_string(),
            sort_order: 0,
            start_time: Some(100),
            end_time: Some(50),
            is_active: true,
            extra_data: None,
        };
        assert!(form.check().is_err());

        let form = DynamicConfigForm {
            start_time: Some(100),
            end_time: Some(100),
            ..form
        };
        assert!(form.check().is_err());

        let form = DynamicConfigForm {
            start_time: Some(50),
            end_time: Some(100),
            ..form
        };
        assert!(form.check().is_ok());
    }

    #[test]
    fn extra_data_defaults_to_empty_object() {
        let form = DynamicConfigForm {
            config_type: ConfigType::Setting,
            title: "flags".to_string(),
            sort_order: 0,
            start_time: None,
            end_time: None,
            is_active: true,
            extra_data: None,
        };
        assert_eq!(form.extra_data_or_default(), serde_json::json!({}));
    }

    #[test]
    fn config_type_round_trip() {
        for t in [ConfigType::Banner, ConfigType::Activity, ConfigType::Setting] {
            assert_eq!(ConfigType::from_str(t.as_str()).unwrap(), t);
        }
        assert!(ConfigType::from_str("popup").is_err());
    }
}
