use std::{fs::OpenOptions, path::PathBuf, sync::Mutex};

use anyhow::{Context, Result, anyhow};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{self as sdk, Resource};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, layer::SubscriberExt, util::SubscriberInitExt,
};

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

/// Configuration for tracing initialization.
#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    /// Append formatted events to this file instead of stdout.
    pub log_file: Option<PathBuf>,
}

impl ObsConfig {
    pub fn for_service(service_name: &'static str) -> Self {
        Self {
            service_name,
            ..Self::default()
        }
    }

    pub fn with_log_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_file = Some(path.into());
        self
    }
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "staffdesk-server",
            env_filter: None,
            otlp_endpoint: None,
            log_file: None,
        }
    }
}

fn resolve_filter(explicit: Option<String>) -> String {
    explicit
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

fn fmt_layer(log_file: Option<&PathBuf>) -> Result<Box<dyn Layer<Registry> + Send + Sync>> {
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            Ok(tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .boxed())
        }
        None => Ok(tracing_subscriber::fmt::layer().with_target(false).boxed()),
    }
}

/// Install tracing subscribers with optional file output and OTLP exporter.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let env_filter = EnvFilter::try_new(resolve_filter(config.env_filter))?;
    let registry = tracing_subscriber::registry()
        .with(fmt_layer(config.log_file.as_ref())?)
        .with(env_filter);

    let otlp_endpoint = config
        .otlp_endpoint
        .or_else(|| std::env::var("OTLP_ENDPOINT").ok());

    if let Some(endpoint) = otlp_endpoint {
        let exporter = SpanExporter::builder()
            .with_http()
            .with_protocol(Protocol::HttpBinary)
            .with_endpoint(endpoint)
            .build()?;

        let resource = Resource::builder()
            .with_service_name(config.service_name)
            .build();

        let provider = sdk::trace::SdkTracerProvider::builder()
            .with_resource(resource)
            .with_batch_exporter(exporter)
            .build();
        let tracer = provider.tracer(config.service_name);

        registry
            .with(tracing_opentelemetry::layer().with_tracer(tracer))
            .try_init()?;
    } else {
        registry.try_init()?;
    }

    INIT.set(())
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        assert_eq!(resolve_filter(Some("debug".into())), "debug");
    }

    #[test]
    fn builder_sets_service_and_file() {
        let config = ObsConfig::for_service("staffdesk").with_log_file("/tmp/staffdesk.log");
        assert_eq!(config.service_name, "staffdesk");
        assert_eq!(config.log_file, Some(PathBuf::from("/tmp/staffdesk.log")));
        assert!(config.otlp_endpoint.is_none());
    }
}
