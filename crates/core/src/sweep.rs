//! Static tag sets for scheduled revalidation sweeps.
//!
//! Sweeps catch anything a dropped webhook missed. Each frequency lists the
//! collection tags whose content changes at roughly that rate.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::invalidation::InvalidationRequest;

/// High-churn content.
pub const HOURLY_TAGS: &[&str] = &["blogs", "jobs", "press", "stats"];

/// Content that changes a few times a week.
pub const DAILY_TAGS: &[&str] = &[
    "pricing_plans",
    "testimonials",
    "features",
    "integrations",
    "faqs",
    "support",
];

/// Near-static company content.
pub const WEEKLY_TAGS: &[&str] = &[
    "leadership",
    "values",
    "company_milestones",
    "partners",
    "locations",
    "employee_benefits",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepFrequency {
    Hourly,
    Daily,
    Weekly,
}

impl SweepFrequency {
    pub const ALL: [SweepFrequency; 3] = [Self::Hourly, Self::Daily, Self::Weekly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
        }
    }

    pub fn tags(self) -> &'static [&'static str] {
        match self {
            Self::Hourly => HOURLY_TAGS,
            Self::Daily => DAILY_TAGS,
            Self::Weekly => WEEKLY_TAGS,
        }
    }

    /// Tag-only invalidation for this sweep.
    pub fn request(self) -> InvalidationRequest {
        InvalidationRequest::from_tags(self.tags().iter().copied())
    }

    /// Period between two sweeps of this frequency.
    pub fn interval(self) -> Duration {
        match self {
            Self::Hourly => Duration::from_secs(60 * 60),
            Self::Daily => Duration::from_secs(24 * 60 * 60),
            Self::Weekly => Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}

impl fmt::Display for SweepFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SweepFrequency {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            other => Err(CoreError::Validation(format!(
                "invalid frequency '{other}', expected one of: hourly, daily, weekly"
            ))),
        }
    }
}
