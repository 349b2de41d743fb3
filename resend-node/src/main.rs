//! Resend Step - run one Resend API operation from a JSON field bag.
//!
//! Usage: `resend-step [--dry-run] [FILE]`
//!
//! The field bag is read from FILE, or stdin when no file is given:
//!
//! ```json
//! {
//!   "resource": "emails",
//!   "operation": "send",
//!   "from": "hello@example.com",
//!   "to": "ada@example.com",
//!   "subject": "Invoice",
//!   "html": "<p>Attached.</p>",
//!   "attachments": [{"binaryPropertyName": "data"}],
//!   "binary": {"data": {"path": "./invoice.pdf", "mimeType": "application/pdf"}}
//! }
//! ```
//!
//! With `--dry-run` the built request is printed instead of being sent.

use std::io::Read;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use resend_node::{Config, FileBinarySource, ListResponse, ResendClient, Step};

#[derive(Debug, Default)]
struct Args {
    dry_run: bool,
    input: Option<String>,
}

fn parse_args() -> Result<Args> {
    let mut args = Args::default();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--dry-run" => args.dry_run = true,
            flag if flag.starts_with("--") => bail!("Unknown flag: {flag}"),
            path if args.input.is_none() => args.input = Some(path.to_string()),
            extra => bail!("Unexpected argument: {extra}"),
        }
    }
    Ok(args)
}

fn read_input(args: &Args) -> Result<String> {
    match &args.input {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))
        }
        None => {
            let mut raw = String::new();
            std::io::stdin()
                .read_to_string(&mut raw)
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

/// Split the input into the step and its binary manifest.
fn parse_step(raw: &str) -> Result<(Step, FileBinarySource)> {
    let mut input: Value = serde_json::from_str(raw).context("Input is not valid JSON")?;

    let binaries = match input.as_object_mut().and_then(|o| o.remove("binary")) {
        Some(manifest) => {
            serde_json::from_value(manifest).context("Invalid binary manifest")?
        }
        None => FileBinarySource::default(),
    };
    let step: Step = serde_json::from_value(input).context("Invalid step")?;

    Ok((step, binaries))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging on stderr; stdout carries the result
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();

    let args = parse_args()?;
    let (step, binaries) = parse_step(&read_input(&args)?)?;

    info!(
        resource = step.resource(),
        operation = step.operation(),
        dry_run = args.dry_run,
        "step_starting"
    );

    let request = step.build(&binaries).await.map_err(|e| {
        if e.is_validation() {
            warn!(
                resource = step.resource(),
                operation = step.operation(),
                error = %e,
                "step_input_rejected"
            );
        }
        e
    })?;

    if args.dry_run {
        println!("{}", serde_json::to_string_pretty(&request.describe())?);
        return Ok(());
    }

    let config = Config::from_env();
    info!(
        api_url = %config.api_url,
        api_key_set = config.api_key.is_some(),
        request_timeout_ms = config.request_timeout_ms,
        "config_loaded"
    );

    let client = ResendClient::from_config(&config)?;

    let output = if request.is_list() {
        let page: ListResponse<Value> = client.list(&request).await?;
        info!(
            count = page.data.len(),
            has_more = page.has_more,
            "list_page_received"
        );
        serde_json::to_value(&page)?
    } else {
        client.execute(&request).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    info!(
        resource = step.resource(),
        operation = step.operation(),
        "step_complete"
    );

    Ok(())
}
