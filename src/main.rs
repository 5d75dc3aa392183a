#![warn(rust_2018_idioms)]

use std::sync::Arc;
use std::time::Duration;

use std::io::Write;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use fortanix_secrets_backend::{
    BackendConfig, BackendError, ConnectionDescriptor, EnvBackend, FortanixBackend,
    SecretsBackend, SecretsChain,
};

/// Resolve orchestrator connections from Fortanix DSM and print them as JSON.
#[derive(Debug, Parser)]
#[command(name = "fortanix-conn", version)]
struct Args {
    /// Connection ids to resolve
    #[arg(required = true)]
    conn_ids: Vec<String>,

    /// Fall back to AIRFLOW_CONN_* variables when a secret is absent
    #[arg(long)]
    env_fallback: bool,

    /// Print passwords instead of masking them
    #[arg(long)]
    show_secrets: bool,

    /// Print parsed connection fields instead of the raw descriptor
    #[arg(long)]
    fields: bool,

    /// HTTP timeout in seconds for SDKMS requests
    #[arg(long, env = "FORTANIX_TIMEOUT")]
    timeout: Option<u64>,

    /// Emit logs as Bunyan JSON
    #[arg(long, env = "JSON_LOG")]
    json_log: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let _guard = init_logger(args.json_log)?;

    let mut config = BackendConfig::from_env();
    config.timeout = args.timeout.map(Duration::from_secs);

    let mut chain = SecretsChain::new().with_backend(Arc::new(FortanixBackend::new(config)?));
    if args.env_fallback {
        chain = chain.with_backend(Arc::new(EnvBackend::from_env()));
    }

    let lookups = args.conn_ids.iter().map(|conn_id| chain.get_connection(conn_id));
    let results = futures::future::join_all(lookups).await;

    let outcomes = args.conn_ids.iter().map(String::as_str).zip(results);
    let failed = report(
        outcomes,
        args.show_secrets,
        args.fields,
        &mut std::io::stdout().lock(),
    )?;

    if failed > 0 {
        anyhow::bail!("{} of {} lookups failed", failed, args.conn_ids.len());
    }
    Ok(())
}

fn render(
    conn: ConnectionDescriptor,
    show_secrets: bool,
    fields: bool,
) -> anyhow::Result<serde_json::Value> {
    let conn = if show_secrets { conn } else { conn.redacted() };
    let value = if fields {
        serde_json::to_value(conn.fields()?)?
    } else {
        serde_json::to_value(&conn)?
    };
    Ok(value)
}

/// Print one JSON line per resolved id; returns how many lookups failed.
fn report<'a>(
    outcomes: impl IntoIterator<Item = (&'a str, Result<Option<ConnectionDescriptor>, BackendError>)>,
    show_secrets: bool,
    fields: bool,
    out: &mut impl Write,
) -> std::io::Result<usize> {
    let mut failed = 0;
    for (conn_id, result) in outcomes {
        let rendered = match result {
            Ok(Some(conn)) => render(conn, show_secrets, fields),
            Ok(None) => Ok(serde_json::Value::Null),
            Err(e) => Err(e.into()),
        };
        match rendered {
            Ok(connection) => writeln!(
                out,
                "{}",
                serde_json::json!({"conn_id": conn_id, "connection": connection})
            )?,
            Err(e) => {
                tracing::error!(conn_id = %conn_id, error = %e, "Lookup failed");
                failed += 1;
            }
        }
    }
    Ok(failed)
}

fn init_logger(json_log: bool) -> anyhow::Result<Option<WorkerGuard>> {
    use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
    use tracing_log::LogTracer;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::{EnvFilter, Registry};

    // stdout carries the lookup results, logs go to stderr
    if !json_log {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    // Redirect the logs from log library to tracing's subscribers.
    LogTracer::init()?;

    let app_name = concat!(env!("CARGO_PKG_NAME"), "-", env!("CARGO_PKG_VERSION")).to_string();

    // Non-blocking stderr writer
    let (non_blocking_writer, guard) = tracing_appender::non_blocking(std::io::stderr());

    let bunyan_formatting_layer = BunyanFormattingLayer::new(app_name, non_blocking_writer);
    let subscriber = Registry::default()
        .with(EnvFilter::from_default_env())
        .with(JsonStorageLayer)
        .with(bunyan_formatting_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(Some(guard))
}
