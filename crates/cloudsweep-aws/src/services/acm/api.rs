//! ACM certificate operations

use crate::error::ApiError;
use crate::page::Page;
use crate::services::convert::to_utc;
use aws_config::{Region, SdkConfig};
use aws_sdk_acm::types::CertificateTransparencyLoggingPreference;
use chrono::{DateTime, Utc};
use std::future::Future;

/// Raw upstream view of one certificate listing entry
#[derive(Debug, Clone, Default)]
pub struct CertificateSummaryData {
    pub arn: Option<String>,
    pub domain_name: Option<String>,
}

/// Raw upstream view of one certificate's detail
#[derive(Debug, Clone, Default)]
pub struct CertificateDetailData {
    pub certificate_type: Option<String>,
    pub not_after: Option<DateTime<Utc>>,
    pub transparency_logging: Option<bool>,
}

/// ACM operations used by the collector.
pub trait AcmApi: Send + Sync {
    fn list_certificates(
        &self,
        next_token: Option<String>,
    ) -> impl Future<Output = Result<Page<CertificateSummaryData>, ApiError>> + Send;

    fn describe_certificate(
        &self,
        arn: &str,
    ) -> impl Future<Output = Result<CertificateDetailData, ApiError>> + Send;
}

/// AWS SDK implementation of [`AcmApi`] scoped to one region.
#[derive(Clone)]
pub struct AcmClient {
    client: aws_sdk_acm::Client,
}

impl AcmClient {
    /// Build a client for `region` from an already-loaded SDK config.
    pub fn new(config: &SdkConfig, region: &str) -> Self {
        let conf = aws_sdk_acm::config::Builder::from(config)
            .region(Region::new(region.to_string()))
            .build();
        Self {
            client: aws_sdk_acm::Client::from_conf(conf),
        }
    }
}

impl AcmApi for AcmClient {
    async fn list_certificates(
        &self,
        next_token: Option<String>,
    ) -> Result<Page<CertificateSummaryData>, ApiError> {
        let resp = self
            .client
            .list_certificates()
            .set_next_token(next_token)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        Ok(Page {
            items: resp
                .certificate_summary_list()
                .iter()
                .map(|c| CertificateSummaryData {
                    arn: c.certificate_arn().map(str::to_string),
                    domain_name: c.domain_name().map(str::to_string),
                })
                .collect(),
            next_token: resp.next_token().map(str::to_string),
        })
    }

    async fn describe_certificate(&self, arn: &str) -> Result<CertificateDetailData, ApiError> {
        let resp = self
            .client
            .describe_certificate()
            .certificate_arn(arn)
            .send()
            .await
            .map_err(|e| ApiError::from_sdk(&e))?;
        let detail = resp.certificate();
        Ok(CertificateDetailData {
            certificate_type: detail
                .and_then(|c| c.r#type())
                .map(|t| t.as_str().to_string()),
            not_after: detail.and_then(|c| c.not_after()).and_then(to_utc),
            transparency_logging: detail
                .and_then(|c| c.options())
                .and_then(|o| o.certificate_transparency_logging_preference())
                .map(|p| *p == CertificateTransparencyLoggingPreference::Enabled),
        })
    }
}
