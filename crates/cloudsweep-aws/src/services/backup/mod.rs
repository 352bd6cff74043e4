//! Backup resource collection

mod api;
pub mod types;

pub use api::{BackupApi, BackupClient, BackupPlanData, ReportPlanData};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use std::sync::Arc;
use tracing::{debug, info};
use types::{BackupPlan, BackupReportPlan};

/// Backup inventory for one audit run.
pub struct BackupService {
    scope: Arc<AuditScope>,
    backup_plans: Vec<BackupPlan>,
    report_plans: Vec<BackupReportPlan>,
}

impl BackupService {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.backup_clients(scope.regions());
        Self::collect(scope, clients).await
    }

    /// Enumerate backup plans and report plans across the given regions.
    pub async fn collect<C>(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self
    where
        C: BackupApi + Clone + Send + Sync + 'static,
    {
        info!(regions = clients.len(), "collecting backup inventory");
        let s = scope.clone();
        let backup_plans = fan_out(&clients, "backup plans", move |region, client| {
            fetch_backup_plans(s.clone(), region, client)
        })
        .await;
        let s = scope.clone();
        let report_plans = fan_out(&clients, "report plans", move |region, client| {
            fetch_report_plans(s.clone(), region, client)
        })
        .await;
        info!(
            backup_plans = backup_plans.len(),
            report_plans = report_plans.len(),
            "backup inventory collected"
        );
        Self {
            scope,
            backup_plans,
            report_plans,
        }
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn backup_plans(&self) -> &[BackupPlan] {
        &self.backup_plans
    }

    pub fn report_plans(&self) -> &[BackupReportPlan] {
        &self.report_plans
    }
}

async fn fetch_backup_plans<C: BackupApi>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<BackupPlan>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_backup_plans(token).await?;
        for data in page.items {
            // Backup reports its own ARNs; they are not rebuilt locally.
            let arn = require(data.arn, "backup plan", "BackupPlanArn")?;
            if !scope.includes(&arn) {
                continue;
            }
            records.push(BackupPlan {
                id: require(data.id, "backup plan", "BackupPlanId")?,
                arn,
                region: region.clone(),
                name: require(data.name, "backup plan", "BackupPlanName")?,
                version_id: data.version_id,
                last_execution_date: data.last_execution_date,
                advanced_settings: data.advanced_settings,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "listed backup plans");
    Ok(records)
}

async fn fetch_report_plans<C: BackupApi>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<BackupReportPlan>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.list_report_plans(token).await?;
        for data in page.items {
            let arn = require(data.arn, "report plan", "ReportPlanArn")?;
            if !scope.includes(&arn) {
                continue;
            }
            records.push(BackupReportPlan {
                arn,
                region: region.clone(),
                name: require(data.name, "report plan", "ReportPlanName")?,
                last_attempted_execution_date: data.last_attempted_execution_date,
                last_successful_execution_date: data.last_successful_execution_date,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "listed report plans");
    Ok(records)
}
