//! Tracing bootstrap shared by the TalentHub binaries. Emits formatted
//! logs always, and ships spans over OTLP when an endpoint is set.

use anyhow::{anyhow, Result};
use once_cell::sync::OnceCell;
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, SpanExporter, WithExportConfig};
use opentelemetry_sdk::trace::SdkTracerProvider;
use opentelemetry_sdk::Resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static INIT: OnceCell<Option<SdkTracerProvider>> = OnceCell::new();

const DEFAULT_FILTER: &str = "info,tower_http=warn,sqlx=warn";

#[derive(Clone, Debug)]
pub struct ObsConfig {
    pub service_name: &'static str,
    pub env_filter: Option<String>,
    pub otlp_endpoint: Option<String>,
    /// One JSON object per line instead of the human-readable format.
    pub log_json: bool,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            service_name: "talenthub-server",
            env_filter: None,
            otlp_endpoint: None,
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json"),
        }
    }
}

/// Installs the global subscriber. Safe to call more than once; only the
/// first call wins, so tests and the server binary can both initialize.
pub fn init_tracing(config: ObsConfig) -> Result<()> {
    if INIT.get().is_some() {
        return Ok(());
    }

    let filter = config
        .env_filter
        .clone()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string());
    let env_filter = EnvFilter::try_new(filter)?;

    let fmt_layer = if config.log_json {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().with_target(false).boxed()
    };
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer);

    let endpoint = config
        .otlp_endpoint
        .clone()
        .or_else(|| std::env::var("OTLP_ENDPOINT").ok());
    let provider = match endpoint {
        Some(endpoint) => {
            let provider = build_otlp_provider(&config, &endpoint)?;
            let tracer = provider.tracer(config.service_name);
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .try_init()?;
            Some(provider)
        }
        None => {
            registry.try_init()?;
            None
        }
    };

    INIT.set(provider)
        .map_err(|_| anyhow!("tracing already initialized"))?;
    Ok(())
}

fn build_otlp_provider(config: &ObsConfig, endpoint: &str) -> Result<SdkTracerProvider> {
    let exporter = SpanExporter::builder()
        .with_http()
        .with_protocol(Protocol::HttpBinary)
        .with_endpoint(endpoint)
        .build()?;
    let resource = Resource::builder()
        .with_service_name(config.service_name)
        .build();
    Ok(SdkTracerProvider::builder()
        .with_resource(resource)
        .with_batch_exporter(exporter)
        .build())
}

/// Flushes any batched spans. Called on shutdown so the last requests
/// before SIGTERM are not dropped by the batch exporter.
pub fn flush_traces() {
    if let Some(Some(provider)) = INIT.get() {
        if let Err(err) = provider.force_flush() {
            eprintln!("trace flush failed: {err}");
        }
    }
}
