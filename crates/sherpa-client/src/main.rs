//! sherpaclient - call Sherpa API functions and print their documentation.
//!
//! ```text
//! sherpaclient --doc https://www.sherpadoc.org/example/
//! sherpaclient --doc https://www.sherpadoc.org/example/ sum
//! sherpaclient https://www.sherpadoc.org/example/ sum 1 1
//! ```
//!
//! Parameters must be valid JSON, so strings need their double quotes.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use sherpa_client::Client;
use sherpa_core::config::ClientConfig;
use sherpa_core::{ProtocolConfig, Section};
use std::process::ExitCode;
use std::time::Duration;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "sherpaclient")]
#[command(about = "Call Sherpa API functions and print API documentation")]
struct Args {
    /// Show documentation for all functions, or for FUNCTION if given
    #[arg(long, conflicts_with = "info")]
    doc: bool,

    /// Show the API descriptor
    #[arg(long)]
    info: bool,

    /// Request timeout in seconds
    #[arg(long, default_value_t = ClientConfig::REQUEST_TIMEOUT.as_secs())]
    timeout: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Base URL of the API, e.g. https://www.sherpadoc.org/example/
    base_url: String,

    /// Function to call or document
    function: Option<String>,

    /// Function parameters, each a JSON value
    #[arg(allow_hyphen_values = true)]
    params: Vec<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("sherpaclient: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .user_agent(ClientConfig::USER_AGENT)
        .build()
        .context("building HTTP client")?;

    if args.doc {
        if !args.params.is_empty() {
            bail!("--doc takes at most one function name");
        }
        return doc(http, &args.base_url, args.function.as_deref()).await;
    }
    if args.info {
        if args.function.is_some() {
            bail!("--info takes no function or parameters");
        }
        return info(http, &args.base_url).await;
    }

    let Some(function) = args.function else {
        bail!("missing function name");
    };
    let params = args
        .params
        .iter()
        .map(|p| serde_json::from_str::<Value>(p).with_context(|| format!("parsing parameter {}", p)))
        .collect::<Result<Vec<_>>>()?;

    let client = Client::with_http_client(http, &args.base_url, Some(Vec::new())).await?;
    match client.call_value(&function, &params).await {
        Ok(result) => {
            println!("{}", serde_json::to_string(&result)?);
            Ok(())
        }
        Err(err) if err.code.is_empty() => bail!("error: {}", err.message),
        Err(err) => bail!("error {}: {}", err.code, err.message),
    }
}

async fn info(http: reqwest::Client, base_url: &str) -> Result<()> {
    let client = Client::with_http_client(http, base_url, None).await?;
    let Some(descriptor) = client.descriptor() else {
        bail!("no descriptor for {}", base_url);
    };
    println!("ID: {}", descriptor.id);
    println!("Title: {}", descriptor.title);
    println!("Version: {}", descriptor.version);
    println!("BaseURL: {}", client.base_url());
    println!("SherpaVersion: {}", descriptor.sherpa_version);
    println!("Functions:");
    for function in client.functions() {
        println!("- {}", function);
    }
    Ok(())
}

async fn doc(http: reqwest::Client, base_url: &str, function: Option<&str>) -> Result<()> {
    let client = Client::with_http_client(http, base_url, None).await?;
    let docs: Section = client
        .call(ProtocolConfig::DOCS_FUNCTION, &[])
        .await
        .context("fetching documentation")?;

    match function {
        Some(name) => match docs.find_function(name) {
            Some(function) => println!("{}", function.text),
            None => bail!("no documentation for function {}", name),
        },
        None => print!("{}", docs.render()),
    }
    Ok(())
}
