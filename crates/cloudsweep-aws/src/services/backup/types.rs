//! Normalized Backup inventory records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Backup plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupPlan {
    pub id: String,
    pub arn: String,
    pub region: String,
    pub name: String,
    pub version_id: Option<String>,
    pub last_execution_date: Option<DateTime<Utc>>,
    /// Resource types carrying advanced backup settings.
    pub advanced_settings: Vec<String>,
}

/// Backup report plan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackupReportPlan {
    pub arn: String,
    pub region: String,
    pub name: String,
    pub last_attempted_execution_date: Option<DateTime<Utc>>,
    pub last_successful_execution_date: Option<DateTime<Utc>>,
}
