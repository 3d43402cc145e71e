// ABOUTME: CLI binary for the Digests link-preview summarizer.
// ABOUTME: Summarizes URLs or a saved HTML file and prints the result as JSON.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use digests_preview::{Summarizer, Summary};
use reqwest::header::HeaderMap;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "digests-preview")]
#[command(about = "Build link-preview summaries for web pages")]
struct Args {
    /// HTML file to summarize (requires --url)
    #[arg(long = "html")]
    html: Option<PathBuf>,

    /// Page URL the HTML file was fetched from (required with --html)
    #[arg(long = "url")]
    url: Option<String>,

    /// Accept-Language value for outbound requests
    #[arg(long = "lang")]
    lang: Option<String>,

    /// User-Agent header for outbound requests
    #[arg(long = "user-agent")]
    user_agent: Option<String>,

    /// Response timeout in milliseconds
    #[arg(long = "timeout-ms")]
    timeout_ms: Option<u64>,

    /// Overall operation timeout in milliseconds
    #[arg(long = "operation-timeout-ms")]
    operation_timeout_ms: Option<u64>,

    /// Maximum response body size in bytes
    #[arg(long = "content-length-limit")]
    content_length_limit: Option<usize>,

    /// Reject responses without a Content-Length header
    #[arg(long = "content-length-required")]
    content_length_required: bool,

    /// Allow fetching from private/local networks
    #[arg(long = "allow-private-networks")]
    allow_private_networks: bool,

    /// Print compact JSON instead of pretty-printed
    #[arg(long = "compact")]
    compact: bool,

    /// URLs to summarize (fetch mode)
    #[arg()]
    urls: Vec<String>,
}

fn build_summarizer(args: &Args) -> Summarizer {
    let mut builder = Summarizer::builder()
        .content_length_required(args.content_length_required)
        .allow_private_networks(args.allow_private_networks);
    if let Some(ref lang) = args.lang {
        builder = builder.lang(lang.clone());
    }
    if let Some(ref agent) = args.user_agent {
        builder = builder.user_agent(agent.clone());
    }
    if let Some(ms) = args.timeout_ms {
        builder = builder.response_timeout(Duration::from_millis(ms));
    }
    if let Some(ms) = args.operation_timeout_ms {
        builder = builder.operation_timeout(Duration::from_millis(ms));
    }
    if let Some(limit) = args.content_length_limit {
        builder = builder.content_length_limit(limit);
    }
    builder.build()
}

fn format_output(results: &[Summary], compact: bool) -> serde_json::Result<String> {
    match (results, compact) {
        ([only], true) => serde_json::to_string(only),
        ([only], false) => serde_json::to_string_pretty(only),
        (all, true) => serde_json::to_string(all),
        (all, false) => serde_json::to_string_pretty(all),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.html.is_some() && args.url.is_none() {
        eprintln!("error: --url is required when using --html");
        return ExitCode::from(1);
    }

    if args.html.is_none() && args.urls.is_empty() {
        eprintln!("error: at least one URL is required, or use --html with --url");
        return ExitCode::from(1);
    }

    if args.html.is_some() && !args.urls.is_empty() {
        eprintln!("error: cannot use both --html and positional URLs");
        return ExitCode::from(1);
    }

    let summarizer = build_summarizer(&args);
    let mut results: Vec<Summary> = Vec::new();
    let mut had_error = false;

    if let (Some(html_path), Some(url)) = (&args.html, &args.url) {
        // HTML file mode
        match (fs::read(html_path), Url::parse(url)) {
            (Ok(bytes), Ok(page_url)) => {
                results.push(
                    summarizer
                        .summarize_bytes(&page_url, &bytes, &HeaderMap::new())
                        .await,
                );
            }
            (Err(e), _) => {
                eprintln!("error reading file {:?}: {}", html_path, e);
                had_error = true;
            }
            (_, Err(e)) => {
                eprintln!("error: invalid --url {}: {}", url, e);
                had_error = true;
            }
        }
    } else {
        // URL fetch mode
        for url in &args.urls {
            match summarizer.summarize(url).await {
                Ok(summary) => results.push(summary),
                Err(e) => {
                    eprintln!("error summarizing {}: {}", url, e);
                    had_error = true;
                }
            }
        }
    }

    if !results.is_empty() {
        match format_output(&results, args.compact) {
            Ok(output) => println!("{}", output),
            Err(e) => {
                eprintln!("error serializing output: {}", e);
                had_error = true;
            }
        }
    }

    if had_error {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
