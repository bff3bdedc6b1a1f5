use anyhow::{Context, Result, anyhow, ensure};
use std::fmt::{Display, Formatter};
use std::time::Duration;
use tracing::{info, warn};

use crate::catalog::Catalog;
use crate::k8s::{KubeGateway, KubeSelection};
use crate::remote::RemoteSource;
use crate::schema::SchemaSet;

/// Schema definitions plus the resource names that resolve into them.
#[derive(Debug)]
pub struct SchemaBundle {
    pub schema: SchemaSet,
    pub catalog: Catalog,
    pub source: SchemaSource,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    Cluster { context: String },
    Remote { url: String },
}

impl Display for SchemaSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cluster { context } => write!(f, "cluster {context}"),
            Self::Remote { url } => write!(f, "{url}"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchemaProvider {
    pub selection: KubeSelection,
    pub force_remote: bool,
    pub remote: RemoteSource,
    pub request_timeout: Duration,
}

impl SchemaProvider {
    /// Loads from the cluster, falling back to the remote document. Fails
    /// only when every source tried has failed.
    pub async fn load(&self) -> Result<SchemaBundle> {
        if self.force_remote {
            return self.load_remote().await;
        }

        match self.load_cluster().await {
            Ok(bundle) => Ok(bundle),
            Err(cluster_error) => {
                warn!(error = %format!("{cluster_error:#}"), "cluster schema unavailable, trying remote");
                self.load_remote()
                    .await
                    .map_err(|remote_error| combine_errors(&cluster_error, &remote_error))
            }
        }
    }

    async fn load_cluster(&self) -> Result<SchemaBundle> {
        let gateway = KubeGateway::connect(&self.selection, self.request_timeout).await?;
        let (document, resources) =
            tokio::try_join!(gateway.fetch_openapi_v2(), gateway.discover_resources())?;
        let schema = SchemaSet::from_swagger_json(&document)
            .context("failed to decode cluster openapi document")?;
        ensure!(!schema.is_empty(), "cluster openapi document has no definitions");

        let mut catalog = Catalog::from_entries(resources);
        if catalog.is_empty() {
            warn!("cluster listed no resources, using builtin names");
            catalog = Catalog::builtin();
        }
        info!(
            context = gateway.context(),
            cluster = gateway.cluster(),
            definitions = schema.len(),
            resources = catalog.len(),
            "loaded schema from cluster"
        );

        Ok(SchemaBundle {
            schema,
            catalog,
            source: SchemaSource::Cluster {
                context: gateway.context().to_string(),
            },
        })
    }

    async fn load_remote(&self) -> Result<SchemaBundle> {
        let document = self.remote.load().await?;
        let schema = SchemaSet::from_swagger_json(&document)
            .with_context(|| format!("failed to decode {}", self.remote.url()))?;
        ensure!(!schema.is_empty(), "{} has no definitions", self.remote.url());
        info!(url = self.remote.url(), definitions = schema.len(), "loaded remote schema");

        Ok(SchemaBundle {
            schema,
            catalog: Catalog::builtin(),
            source: SchemaSource::Remote {
                url: self.remote.url().to_string(),
            },
        })
    }
}

fn combine_errors(cluster: &anyhow::Error, remote: &anyhow::Error) -> anyhow::Error {
    anyhow!("failed to get schema from cluster: {cluster:#}, and remote: {remote:#}")
}

#[cfg(test)]
mod tests {
    use super::{SchemaProvider, SchemaSource, combine_errors};
    use crate::k8s::KubeSelection;
    use crate::model::TypeIdentity;
    use crate::remote::RemoteSource;
    use crate::schema::tests::POD_SWAGGER;
    use anyhow::anyhow;
    use std::time::Duration;

    fn remote_provider(dir: &std::path::Path) -> SchemaProvider {
        SchemaProvider {
            selection: KubeSelection::default(),
            force_remote: true,
            remote: RemoteSource::new(
                "http://127.0.0.1:9/{version}.json",
                "master",
                Some(dir.to_path_buf()),
                Duration::from_secs(3600),
                Duration::from_secs(1),
            ),
            request_timeout: Duration::from_secs(1),
        }
    }

    fn fallback_provider(dir: &std::path::Path) -> SchemaProvider {
        SchemaProvider {
            selection: KubeSelection {
                kubeconfig: Some(dir.join("missing-kubeconfig")),
                context: None,
            },
            force_remote: false,
            ..remote_provider(dir)
        }
    }

    #[test]
    fn combined_error_names_both_sources() {
        let error = combine_errors(
            &anyhow!("connection refused").context("failed to list api groups"),
            &anyhow!("404 Not Found"),
        );
        assert_eq!(
            error.to_string(),
            "failed to get schema from cluster: failed to list api groups: connection refused, and remote: 404 Not Found"
        );
    }

    #[tokio::test]
    async fn forced_remote_reads_cached_document() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = remote_provider(dir.path());
        let cache = provider.remote.cache_path().expect("cache path");
        std::fs::write(&cache, POD_SWAGGER).expect("seed cache");

        let bundle = provider.load().await.expect("cached schema");
        assert_eq!(bundle.schema.len(), 5);
        assert_eq!(
            bundle.source,
            SchemaSource::Remote {
                url: "http://127.0.0.1:9/master.json".to_string()
            }
        );
        let pod = bundle.catalog.identity_for("pods").expect("builtin pods");
        assert_eq!(pod, TypeIdentity::new("", "v1", "Pod"));
        assert!(bundle.schema.lookup_kind(&pod).is_ok());
    }

    #[tokio::test]
    async fn undecodable_document_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = remote_provider(dir.path());
        let cache = provider.remote.cache_path().expect("cache path");
        std::fs::write(&cache, "not json").expect("seed cache");

        let error = provider.load().await.expect_err("bad document");
        assert!(error.to_string().starts_with("failed to decode"));
    }

    #[tokio::test]
    async fn document_without_definitions_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = remote_provider(dir.path());
        let cache = provider.remote.cache_path().expect("cache path");
        std::fs::write(&cache, r#"{"definitions": {}}"#).expect("seed cache");

        let error = provider.load().await.expect_err("empty document");
        assert_eq!(
            error.to_string(),
            "http://127.0.0.1:9/master.json has no definitions"
        );
    }

    #[tokio::test]
    async fn unreachable_cluster_falls_back_to_remote() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = fallback_provider(dir.path());
        let cache = provider.remote.cache_path().expect("cache path");
        std::fs::write(&cache, POD_SWAGGER).expect("seed cache");

        let bundle = provider.load().await.expect("remote fallback");
        assert_eq!(
            bundle.source,
            SchemaSource::Remote {
                url: "http://127.0.0.1:9/master.json".to_string()
            }
        );
        assert_eq!(bundle.schema.len(), 5);
    }

    #[tokio::test]
    async fn both_sources_failing_reports_each_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let provider = fallback_provider(dir.path());

        let error = provider.load().await.expect_err("no source available");
        let message = error.to_string();
        assert!(
            message.starts_with("failed to get schema from cluster: invalid --kubeconfig"),
            "{message}"
        );
        assert!(
            message.contains(", and remote: failed to fetch http://127.0.0.1:9/master.json"),
            "{message}"
        );
    }
}
