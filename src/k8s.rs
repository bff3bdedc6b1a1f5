use anyhow::{Context, Result};
use futures::future::join_all;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, warn};

use crate::catalog::{ResourceEntry, entries_from_discovery};

const OPENAPI_V2_PATH: &str = "/openapi/v2";

/// Which kubeconfig and context to connect with; `None` means the defaults.
#[derive(Debug, Clone, Default)]
pub struct KubeSelection {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
    cluster: String,
    request_timeout: Duration,
}

impl KubeGateway {
    pub async fn connect(selection: &KubeSelection, request_timeout: Duration) -> Result<Self> {
        let kubeconfig = match &selection.kubeconfig {
            Some(path) => Some(
                Kubeconfig::read_from(path)
                    .context("invalid --kubeconfig")?,
            ),
            None => Kubeconfig::read().ok(),
        };

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: selection.context.clone(),
                cluster: None,
                user: None,
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if selection.context.is_some() {
                anyhow::bail!("kubeconfig not found; --context is unavailable in this environment");
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let cluster = config.cluster_url.to_string();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        let context = selection
            .context
            .clone()
            .or_else(|| {
                kubeconfig
                    .as_ref()
                    .and_then(|cfg| cfg.current_context.clone())
            })
            .unwrap_or_else(|| "in-cluster".to_string());
        debug!(%context, %cluster, "connected to cluster");

        Ok(Self {
            client,
            context,
            cluster,
            request_timeout,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    pub async fn fetch_openapi_v2(&self) -> Result<String> {
        let request = http::Request::get(OPENAPI_V2_PATH)
            .header(http::header::ACCEPT, "application/json")
            .body(Vec::new())
            .context("failed to build openapi request")?;
        let text = self
            .bounded("fetch the openapi document", self.client.request_text(request))
            .await?;
        debug!(bytes = text.len(), cluster = %self.cluster, "fetched openapi document");
        Ok(text)
    }

    /// Resource names served by the cluster: the core group plus the
    /// preferred version of every API group. Groups that fail to list are
    /// skipped.
    pub async fn discover_resources(&self) -> Result<Vec<ResourceEntry>> {
        let core = self
            .bounded(
                "list core api resources",
                self.client.list_core_api_resources("v1"),
            )
            .await?;
        let mut entries = entries_from_discovery(&core.group_version, &core.resources);

        let groups = self
            .bounded("list api groups", self.client.list_api_groups())
            .await?;
        let group_versions = groups
            .groups
            .iter()
            .filter_map(|group| {
                group
                    .preferred_version
                    .as_ref()
                    .or_else(|| group.versions.first())
            })
            .map(|version| version.group_version.clone())
            .collect::<Vec<_>>();

        let listings = group_versions.iter().map(|group_version| {
            self.bounded(
                "list api group resources",
                self.client.list_api_group_resources(group_version),
            )
        });
        for (group_version, listing) in group_versions.iter().zip(join_all(listings).await) {
            match listing {
                Ok(list) => {
                    entries.extend(entries_from_discovery(&list.group_version, &list.resources))
                }
                Err(error) => warn!(%group_version, error = %format!("{error:#}"), "skipping api group"),
            }
        }

        debug!(resources = entries.len(), "discovered cluster resources");
        Ok(entries)
    }

    async fn bounded<T, F>(&self, what: &str, request: F) -> Result<T>
    where
        F: Future<Output = kube::Result<T>>,
    {
        tokio::time::timeout(self.request_timeout, request)
            .await
            .with_context(|| {
                format!(
                    "failed to {what}: timed out after {}s",
                    self.request_timeout.as_secs()
                )
            })?
            .with_context(|| format!("failed to {what}"))
    }
}
