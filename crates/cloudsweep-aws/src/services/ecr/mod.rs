//! ECR resource collection
//!
//! Repositories are enumerated per region, then enriched with their image
//! history (ordered by push time) and the scan outcome of the newest
//! image.

mod api;
pub mod types;

pub use api::{EcrApi, EcrClient, ImageDetailData, RepositoryData, ScanFindingsData};

use crate::context::AwsClientFactory;
use crate::dispatch::{RegionalClientSet, fan_out};
use crate::error::{ApiError, require};
use crate::scope::AuditScope;
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use types::{ImageDetail, Repository};

/// ECR inventory for one audit run.
pub struct EcrService<C = EcrClient> {
    scope: Arc<AuditScope>,
    clients: RegionalClientSet<C>,
    repositories: Vec<Repository>,
}

impl EcrService<EcrClient> {
    /// Collect the inventory using SDK clients for every enabled region.
    pub async fn from_factory(factory: &AwsClientFactory, scope: Arc<AuditScope>) -> Self {
        let clients = factory.ecr_clients(scope.regions());
        Self::collect(scope, clients).await
    }
}

impl<C> EcrService<C>
where
    C: EcrApi + Clone + Send + Sync + 'static,
{
    /// Enumerate repositories across the given regions.
    pub async fn collect(scope: Arc<AuditScope>, clients: RegionalClientSet<C>) -> Self {
        info!(regions = clients.len(), "collecting ecr inventory");
        let mut service = Self {
            scope: scope.clone(),
            clients,
            repositories: Vec::new(),
        };
        let s = scope.clone();
        service.repositories = fan_out(&service.clients, "repositories", move |region, client| {
            fetch_repositories(s.clone(), region, client)
        })
        .await;
        service.enrich_repository_images().await;
        service.enrich_repository_tags().await;
        info!(repositories = service.repositories.len(), "ecr inventory collected");
        service
    }

    pub fn scope(&self) -> &AuditScope {
        &self.scope
    }

    pub fn repositories(&self) -> &[Repository] {
        &self.repositories
    }

    /// Resolve each repository's image history and the newest image's scan
    /// outcome.
    async fn enrich_repository_images(&mut self) {
        debug!("reading repository image details");
        for repository in &mut self.repositories {
            let Some(client) = self.clients.get(&repository.region) else {
                continue;
            };
            match repository_images(client, &repository.name).await {
                Ok(images) => repository.images = images,
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "repository vanished before image lookup"
                    );
                    continue;
                }
                Err(err) => {
                    error!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "failed to list repository images"
                    );
                    continue;
                }
            }

            let newest_digest = repository.images.last().and_then(|i| i.digest.clone());
            let Some(digest) = newest_digest else {
                continue;
            };
            match client.image_scan_findings(&repository.name, &digest).await {
                Ok(scan) => {
                    if let Some(newest) = repository.images.last_mut() {
                        newest.scan_status = scan.status;
                        newest.severity_counts = scan.severity_counts;
                    }
                }
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "no scan available for newest image"
                    );
                }
                Err(err) => {
                    error!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "failed to read image scan findings"
                    );
                }
            }
        }
    }

    async fn enrich_repository_tags(&mut self) {
        debug!("reading repository tags");
        for repository in &mut self.repositories {
            let Some(client) = self.clients.get(&repository.region) else {
                continue;
            };
            match client.repository_tags(&repository.arn).await {
                Ok(tags) if tags.is_empty() => {}
                Ok(tags) => repository.tags = Some(tags),
                Err(err) if err.is_not_found() => {
                    warn!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "repository vanished before tag lookup"
                    );
                }
                Err(err) => {
                    error!(
                        region = %repository.region,
                        repository = %repository.name,
                        error = %err,
                        "failed to read repository tags"
                    );
                }
            }
        }
    }
}

async fn repository_images<C: EcrApi>(
    client: &C,
    repository: &str,
) -> Result<Vec<ImageDetail>, ApiError> {
    let mut images = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_images(repository, token).await?;
        images.extend(page.items.into_iter().map(|data| ImageDetail {
            tag: data.image_tags.into_iter().next(),
            digest: data.digest,
            pushed_at: data.pushed_at,
            scan_status: None,
            severity_counts: None,
        }));
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    // Oldest first, so the newest image is always last.
    images.sort_by_key(|image| image.pushed_at);
    Ok(images)
}

async fn fetch_repositories<C: EcrApi>(
    scope: Arc<AuditScope>,
    region: String,
    client: C,
) -> Result<Vec<Repository>, ApiError> {
    let mut records = Vec::new();
    let mut token = None;
    loop {
        let page = client.describe_repositories(token).await?;
        for data in page.items {
            // ECR reports its own ARNs; they are not rebuilt locally.
            let arn = require(data.arn, "repository", "RepositoryArn")?;
            if !scope.includes(&arn) {
                continue;
            }
            records.push(Repository {
                name: require(data.name, "repository", "RepositoryName")?,
                arn,
                region: region.clone(),
                scan_on_push: data.scan_on_push,
                tag_immutability: data.tag_immutability,
                images: Vec::new(),
                tags: None,
            });
        }
        token = page.next_token;
        if token.is_none() {
            break;
        }
    }
    debug!(%region, count = records.len(), "described repositories");
    Ok(records)
}
