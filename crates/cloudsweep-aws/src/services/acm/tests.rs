use super::api::{AcmApi, CertificateDetailData, CertificateSummaryData};
use super::AcmService;
use crate::dispatch::RegionalClientSet;
use crate::error::ApiError;
use crate::page::Page;
use crate::scope::AuditScope;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

const ACCOUNT: &str = "123456789012";

#[derive(Clone, Default)]
struct FakeAcm {
    certificates: Vec<CertificateSummaryData>,
    details: HashMap<String, Result<CertificateDetailData, ApiError>>,
}

impl AcmApi for FakeAcm {
    async fn list_certificates(
        &self,
        _next_token: Option<String>,
    ) -> Result<Page<CertificateSummaryData>, ApiError> {
        Ok(Page::last(self.certificates.clone()))
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetailData, ApiError> {
        self.details
            .get(arn)
            .cloned()
            .unwrap_or_else(|| Ok(CertificateDetailData::default()))
    }
}

fn scope() -> Arc<AuditScope> {
    Arc::new(AuditScope::new("aws", ACCOUNT, Vec::new()))
}

fn summary(region: &str, name: &str) -> CertificateSummaryData {
    CertificateSummaryData {
        arn: Some(format!("arn:aws:acm:{region}:{ACCOUNT}:certificate/{name}")),
        domain_name: Some(name.to_string()),
    }
}

fn clients(pairs: Vec<(&str, FakeAcm)>) -> RegionalClientSet<FakeAcm> {
    pairs
        .into_iter()
        .map(|(region, fake)| (region.to_string(), fake))
        .collect()
}

#[tokio::test]
async fn details_fill_type_expiry_and_transparency() {
    let arn = format!("arn:aws:acm:eu-west-1:{ACCOUNT}:certificate/shop.example.com");
    let fake = FakeAcm {
        certificates: vec![summary("eu-west-1", "shop.example.com")],
        details: HashMap::from([(
            arn,
            Ok(CertificateDetailData {
                certificate_type: Some("AMAZON_ISSUED".to_string()),
                not_after: Some(Utc::now() + Duration::days(30)),
                transparency_logging: Some(true),
            }),
        )]),
    };
    let service = AcmService::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    let certificate = &service.certificates()[0];
    assert_eq!(certificate.name, "shop.example.com");
    assert_eq!(certificate.certificate_type.as_deref(), Some("AMAZON_ISSUED"));
    assert_eq!(certificate.transparency_logging, Some(true));
    let days = certificate.expiration_days.unwrap();
    assert!((29..=30).contains(&days), "unexpected expiry horizon: {days}");
}

#[tokio::test]
async fn expired_certificates_report_negative_days() {
    let arn = format!("arn:aws:acm:eu-west-1:{ACCOUNT}:certificate/old.example.com");
    let fake = FakeAcm {
        certificates: vec![summary("eu-west-1", "old.example.com")],
        details: HashMap::from([(
            arn,
            Ok(CertificateDetailData {
                certificate_type: Some("IMPORTED".to_string()),
                not_after: Some(Utc::now() - Duration::days(10)),
                transparency_logging: None,
            }),
        )]),
    };
    let service = AcmService::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    assert!(service.certificates()[0].expiration_days.unwrap() < 0);
}

#[tokio::test]
async fn vanished_certificate_stays_undescribed() {
    let gone = format!("arn:aws:acm:eu-west-1:{ACCOUNT}:certificate/gone.example.com");
    let live = format!("arn:aws:acm:eu-west-1:{ACCOUNT}:certificate/live.example.com");
    let fake = FakeAcm {
        certificates: vec![
            summary("eu-west-1", "gone.example.com"),
            summary("eu-west-1", "live.example.com"),
        ],
        details: HashMap::from([
            (
                gone,
                Err(ApiError::new(
                    Some("ResourceNotFoundException".to_string()),
                    "vanished",
                )),
            ),
            (
                live,
                Ok(CertificateDetailData {
                    certificate_type: Some("AMAZON_ISSUED".to_string()),
                    not_after: Some(Utc::now() + Duration::days(365)),
                    transparency_logging: Some(false),
                }),
            ),
        ]),
    };
    let service = AcmService::collect(scope(), clients(vec![("eu-west-1", fake)])).await;

    assert_eq!(service.certificates()[0].expiration_days, None);
    assert_eq!(service.certificates()[0].certificate_type, None);
    assert!(service.certificates()[1].expiration_days.is_some());
}

#[tokio::test]
async fn certificates_merge_across_regions() {
    let eu = FakeAcm {
        certificates: vec![summary("eu-west-1", "a.example.com")],
        ..Default::default()
    };
    let us = FakeAcm {
        certificates: vec![summary("us-east-1", "b.example.com")],
        ..Default::default()
    };
    let service =
        AcmService::collect(scope(), clients(vec![("eu-west-1", eu), ("us-east-1", us)])).await;

    let names: Vec<&str> = service.certificates().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["a.example.com", "b.example.com"]);
}
