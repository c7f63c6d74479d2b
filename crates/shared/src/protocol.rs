use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{CourseId, CourseItem, TeacherSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceFormResponse {
    pub teacher: TeacherSummary,
    pub courses: Vec<CourseItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadShape {
    #[default]
    Wrapped,
    BareArray,
}

impl std::str::FromStr for PayloadShape {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "wrapped" => Ok(Self::Wrapped),
            "bare_array" | "bare" => Ok(Self::BareArray),
            other => Err(format!("unknown payload shape '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SubmitPreferencesRequest {
    Wrapped { preferences: Vec<CourseId> },
    BareArray(Vec<CourseId>),
}

impl SubmitPreferencesRequest {
    pub fn new(shape: PayloadShape, preferences: Vec<CourseId>) -> Self {
        match shape {
            PayloadShape::Wrapped => Self::Wrapped { preferences },
            PayloadShape::BareArray => Self::BareArray(preferences),
        }
    }

    pub fn preferences(&self) -> &[CourseId] {
        match self {
            Self::Wrapped { preferences } | Self::BareArray(preferences) => preferences,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitPreferencesResponse {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SubmitPreferencesResponse {
    fn default() -> Self {
        Self {
            success: true,
            message: None,
            updated_at: None,
        }
    }
}

fn default_success() -> bool {
    true
}
