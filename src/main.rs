//! SessionProbe CLI

use clap::{ArgAction, Parser};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tabled::builder::Builder;
use tabled::settings::Style;
use tracing::info;
use tracing_subscriber::EnvFilter;

use sessionprobe::config::{self, CliOverrides};
use sessionprobe::models::{OutputFormat, ProbeConfig};
use sessionprobe::probe;
use sessionprobe::report::{self, Report};
use sessionprobe::targets::source;

/// SessionProbe - probe many URLs with one session and record the responses
#[derive(Parser)]
#[command(
    name = "sessionprobe",
    version,
    about,
    long_about = None,
    after_help = "Examples:\n  \
        sessionprobe -u ./urls.txt\n  \
        sessionprobe -u ./urls.txt --out ./unauthenticated-test.txt\n  \
        sessionprobe -u ./urls.txt --threads 15 -H \"Cookie: .AspNetCore.Cookies=<cookie>\" -o ./output.txt\n  \
        sessionprobe -u ./urls.txt -H \"Authorization: Bearer <token>\" --proxy http://localhost:8080\n  \
        sessionprobe -u ./urls.txt -r \"Page Not Found\" -l 0,1337"
)]
struct Cli {
    /// File containing the URLs to be checked, one per line
    #[arg(short, long)]
    urls: Option<String>,

    /// OpenAPI / Swagger document (JSON or YAML) to take GET endpoints from
    #[arg(long)]
    openapi: Option<String>,

    /// HTTP headers in the format "Key1:Value1;Key2:Value2;..."
    #[arg(short = 'H', long)]
    headers: Option<String>,

    /// Number of concurrent probes [default: 10]
    #[arg(short, long)]
    threads: Option<usize>,

    /// Output file [default: output.txt]
    #[arg(short, long)]
    out: Option<String>,

    /// Output format (text or json) [default: text]
    #[arg(short, long)]
    format: Option<String>,

    /// Proxy URL; environment proxy settings apply when omitted
    #[arg(short, long)]
    proxy: Option<String>,

    /// Skip verification of TLS certificates
    #[arg(long)]
    skip_verification: bool,

    /// Ignore URLs ending with .css [default: true]
    #[arg(long, action = ArgAction::Set)]
    ignore_css: Option<bool>,

    /// Ignore URLs ending with .js [default: true]
    #[arg(long, action = ArgAction::Set)]
    ignore_js: Option<bool>,

    /// Responses whose body matches this regex are left out of the output
    #[arg(short = 'r', long)]
    filter_regex: Option<String>,

    /// Responses with one of these body lengths are left out of the output (comma-separated)
    #[arg(short = 'l', long, value_delimiter = ',')]
    exclude_lengths: Option<Vec<usize>>,

    /// Extra methods to probe besides GET: POST, PUT, PATCH, DELETE, OPTIONS (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    methods: Option<Vec<String>>,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn print_banner() {
    let banner = r#"
    ##################################
    #                                #
    #          SessionProbe          #
    #                                #
    ##################################
    "#;
    println!("{}", banner.green());
    println!(
        "  {} {}\n",
        "Version:".bold(),
        env!("CARGO_PKG_VERSION").yellow()
    );
}

fn print_summary(report: &Report) {
    println!("\n{}", "  Probe Summary".bold());
    println!("  {}", "─".repeat(35));

    let mut builder = Builder::default();
    builder.push_record(["Status Code", "Responses"]);

    for (status, outcomes) in report.groups() {
        builder.push_record([status.to_string(), outcomes.len().to_string()]);
    }

    builder.push_record(["Total".to_string(), report.total().to_string()]);

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{table}");
}

fn overrides_from(cli: Cli) -> Result<CliOverrides, Box<dyn std::error::Error>> {
    let format = cli
        .format
        .as_deref()
        .map(str::parse::<OutputFormat>)
        .transpose()?;

    Ok(CliOverrides {
        urls_file: cli.urls,
        openapi_file: cli.openapi,
        headers: cli.headers,
        threads: cli.threads,
        output: cli.out,
        format,
        proxy: cli.proxy,
        skip_verification: cli.skip_verification,
        ignore_css: cli.ignore_css,
        ignore_js: cli.ignore_js,
        filter_regex: cli.filter_regex,
        exclude_lengths: cli.exclude_lengths,
        methods: cli.methods,
    })
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "sessionprobe=debug"
    } else {
        "sessionprobe=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_target(false)
        .init();

    print_banner();

    let mut probe_config = if let Some(ref path) = cli.config {
        config::load_config(path)?
    } else {
        let default_path = Path::new("config/default.toml");
        if default_path.exists() {
            config::load_config(default_path)?
        } else {
            ProbeConfig::default()
        }
    };

    config::merge_cli_args(&mut probe_config, overrides_from(cli)?);
    config::validate(&probe_config)?;

    if probe_config.ignore_css {
        info!("Ignoring URLs that end with .css");
    }
    if probe_config.ignore_js {
        info!("Ignoring URLs that end with .js");
    }
    if let Some(proxy) = probe_config.proxy_url() {
        println!("  {} {}", "Proxy:".bold(), proxy.cyan());
    }

    let targets = source::load_targets(&probe_config)?;
    println!(
        "  {} {}",
        "Targets:".bold(),
        targets.len().to_string().green()
    );
    println!(
        "  {} {}\n",
        "Threads:".bold(),
        probe_config.threads.to_string().cyan()
    );

    let result = probe::run(&probe_config, &targets).await?;

    print_summary(&result);

    let output_path = Path::new(&probe_config.output);
    report::export(&result, output_path, probe_config.format)?;

    println!(
        "\n  {} {}",
        "Report saved to:".bold(),
        probe_config.output.green()
    );

    Ok(())
}
