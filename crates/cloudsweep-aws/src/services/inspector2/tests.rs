use super::api::{FindingData, Inspector2Api};
use super::Inspector2Service;
use crate::dispatch::RegionalClientSet;
use crate::error::ApiError;
use crate::page::Page;
use crate::scope::AuditScope;
use std::sync::Arc;

const ACCOUNT: &str = "123456789012";

#[derive(Clone, Default)]
struct FakeInspector2 {
    status: Option<String>,
    finding_pages: Vec<Vec<FindingData>>,
    fail_findings: bool,
}

impl Inspector2Api for FakeInspector2 {
    async fn account_status(&self) -> Result<Option<String>, ApiError> {
        Ok(self.status.clone())
    }

    async fn list_findings(&self, next_token: Option<String>) -> Result<Page<FindingData>, ApiError> {
        if self.fail_findings {
            return Err(ApiError::new(Some("InternalError".into()), "simulated outage"));
        }
        let index = next_token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
        let items = self.finding_pages.get(index).cloned().unwrap_or_default();
        let next_token = (index + 1 < self.finding_pages.len()).then(|| (index + 1).to_string());
        Ok(Page { items, next_token })
    }
}

fn scope() -> Arc<AuditScope> {
    Arc::new(AuditScope::new("aws", ACCOUNT, Vec::new()))
}

fn finding(arn: &str) -> FindingData {
    FindingData {
        arn: Some(arn.to_string()),
        severity: Some("HIGH".to_string()),
        status: Some("ACTIVE".to_string()),
        title: Some("CVE-2024-0001".to_string()),
    }
}

fn clients(pairs: Vec<(&str, FakeInspector2)>) -> RegionalClientSet<FakeInspector2> {
    pairs
        .into_iter()
        .map(|(region, fake)| (region.to_string(), fake))
        .collect()
}

#[tokio::test]
async fn one_record_per_answering_region() {
    let enabled = FakeInspector2 {
        status: Some("ENABLED".to_string()),
        ..Default::default()
    };
    let silent = FakeInspector2::default();
    let service = Inspector2Service::collect(
        scope(),
        clients(vec![("eu-west-1", enabled), ("us-east-1", silent)]),
    )
    .await;

    assert_eq!(service.inspectors().len(), 1);
    let inspector = &service.inspectors()[0];
    assert_eq!(inspector.region, "eu-west-1");
    assert_eq!(inspector.status, "ENABLED");
    assert_eq!(
        inspector.arn,
        format!("arn:aws:inspector2:eu-west-1:{ACCOUNT}:inspector/inspector2")
    );
}

#[tokio::test]
async fn findings_attach_to_their_region_in_page_order() {
    let fake = FakeInspector2 {
        status: Some("ENABLED".to_string()),
        finding_pages: vec![
            vec![finding("arn:aws:inspector2:eu-west-1:123456789012:finding/a")],
            vec![
                finding("arn:aws:inspector2:eu-west-1:123456789012:finding/b"),
                finding("arn:aws:inspector2:eu-west-1:123456789012:finding/c"),
            ],
        ],
        ..Default::default()
    };
    let service = Inspector2Service::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    let findings = &service.inspectors()[0].findings;
    assert_eq!(findings.len(), 3);
    assert!(findings[0].arn.ends_with("finding/a"));
    assert!(findings[2].arn.ends_with("finding/c"));
    assert_eq!(findings[0].region, "eu-west-1");
}

#[tokio::test]
async fn failed_finding_lookup_keeps_the_record() {
    let fake = FakeInspector2 {
        status: Some("ENABLED".to_string()),
        fail_findings: true,
        ..Default::default()
    };
    let service = Inspector2Service::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    assert_eq!(service.inspectors().len(), 1);
    assert!(service.inspectors()[0].findings.is_empty());
}

#[tokio::test]
async fn disabled_scanner_is_still_recorded() {
    let fake = FakeInspector2 {
        status: Some("DISABLED".to_string()),
        ..Default::default()
    };
    let service = Inspector2Service::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    assert_eq!(service.inspectors()[0].status, "DISABLED");
    assert!(service.inspectors()[0].findings.is_empty());
}
