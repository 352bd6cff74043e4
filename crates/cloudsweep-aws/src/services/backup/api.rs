//! Backup list operations

use crate::error::ApiError;
use crate::page::Page;
use crate::services::convert::to_utc;
use aws_config::{Region, SdkConfig};
use chrono::{DateTime, Utc};
use std::future::Future;

/// Raw upstream view of one backup plan
#[derive(Debug, Clone, Default)]
pub struct BackupPlanData {
    pub arn: Option<String>,
    pub id: Option<String>,
    pub name: Option<String>,
    pub version_id: Option<String>,
    pub last_execution_date: Option<DateTime<Utc>>,
    pub advanced_settings: Vec<String>,
}

/// Raw upstream view of one report plan
#[derive(Debug, Clone, Default)]
pub struct ReportPlanData {
    pub arn: Option<String>,
    pub name: Option<String>,
    pub last_attempted_execution_date: Option<DateTime<Utc>>,
    pub last_successful_execution_date: Option<DateTime<Utc>>,
}

/// Backup operations used by the collector.
pub trait BackupApi: Send + Sync {
    fn list_backup_plans(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<BackupPlanData>, ApiError>> + Send;

    fn list_report_plans(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<ReportPlanData>, ApiError>> + Send;
}

/// AWS SDK implementation of [`BackupApi`] scoped to one region.
#[derive(Clone)]
pub struct BackupClient {
    client: aws_sdk_backup::Client,
}

impl BackupClient {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_backup::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_backup::Client::from_conf(conf),
        }
    }
}

impl BackupApi for BackupClient {
    async fn list_backup_plans(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<BackupPlanData>, ApiError> {
        let resp = self
            .client
            .list_backup_plans()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .backup_plans_list()
                .iter()
                .map(|p| BackupPlanData {
                    arn: p.backup_plan_arn().map(str::to_string),
                    id: p.backup_plan_id().map(str::to_string),
                    name: p.backup_plan_name().map(str::to_string),
                    version_id: p.version_id().map(str::to_string),
                    last_execution_date: p.last_execution_date().and_then(to_utc),
                    advanced_settings: p
                        .advanced_backup_settings()
                        .iter()
                        .filter_map(|s| s.resource_type().map(str::to_string))
                        .collect(),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn list_report_plans(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<ReportPlanData>, ApiError> {
        let resp = self
            .client
            .list_report_plans()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .report_plans()
                .iter()
                .map(|p| ReportPlanData {
                    arn: p.report_plan_arn().map(str::to_string),
                    name: p.report_plan_name().map(str::to_string),
                    last_attempted_execution_date: p
                        .last_attempted_execution_time()
                        .and_then(to_utc),
                    last_successful_execution_date: p
                        .last_successful_execution_time()
                        .and_then(to_utc),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }
}
