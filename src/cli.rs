use clap::Parser;
use std::path::PathBuf;
use std::sync::LazyLock;

static VERSION: LazyLock<String> = LazyLock::new(|| {
    format!(
        "{} (commit {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("KEXPLAIN_GIT_COMMIT").unwrap_or("unknown")
    )
});

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kexplain",
    version = VERSION.as_str(),
    about = "List the fields for supported resources. An interactive `kubectl explain`.",
    after_help = "Examples:\n  kexplain pod\n  kexplain deploy.spec.template\n\nUse `kubectl api-resources` for a complete list of supported resources."
)]
pub struct CliArgs {
    /// Resource and optional field path, like `pod.spec.containers`
    #[arg(value_name = "RESOURCE[.FIELD...]")]
    pub target: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Skip the cluster and read the published schema
    #[arg(long)]
    pub remote: bool,

    /// Kubernetes git ref of the published schema
    #[arg(long, default_value = crate::remote::DEFAULT_VERSION)]
    pub k8s_version: String,

    /// Timeout for cluster and remote requests, in seconds
    #[arg(long, default_value_t = 5)]
    pub request_timeout_secs: u64,

    /// tracing filter (for example: info,debug,trace)
    #[arg(long, default_value = "info")]
    pub log_filter: String,

    /// Write logs to this file instead of discarding them
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Splits `pod.spec.containers` into the resource name and its field path.
/// A trailing dot is ignored.
pub fn split_dot_notation(target: &str) -> (String, Vec<String>) {
    let target = target.strip_suffix('.').unwrap_or(target);
    let mut segments = target.split('.').map(str::to_string);
    let resource = segments.next().unwrap_or_default();
    (resource, segments.collect())
}
