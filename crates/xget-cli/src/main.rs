//! Xget CLI
//!
//! CLI tool for checking how links are classified and rewritten, without a
//! browser.

mod bench;
mod check;
mod config;

use std::fs;
use std::io::{self, Write};
use std::time::Instant;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use xget_core::{ClassificationInput, Interceptor, InterceptorConfig, PlatformKey, Registry};

use crate::config::SettingsOverrides;

#[derive(Parser)]
#[command(name = "xget-cli")]
#[command(about = "Xget download link classifier and rewriter")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List supported platforms
    Platforms,

    /// Detect the platform a URL belongs to
    Detect {
        #[arg(short, long)]
        url: String,
    },

    /// Classify a link as download or not
    Classify {
        #[arg(short, long)]
        url: String,

        /// The anchor has a download attribute
        #[arg(long)]
        download_attr: bool,

        /// Link text
        #[arg(short, long, default_value = "")]
        text: String,
    },

    /// Rewrite a URL through the proxy
    Rewrite {
        #[arg(short, long)]
        url: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Classify and rewrite a list of links, one JSON line per link
    Check {
        /// Input file with `url<TAB>text<TAB>download` lines
        #[arg(short, long)]
        input: String,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Benchmark classification and rewriting
    Bench {
        /// Number of synthetic links
        #[arg(long, default_value_t = 1000)]
        links: usize,

        #[arg(long, default_value_t = 100)]
        iterations: usize,

        #[arg(long, default_value_t = bench::DEFAULT_SEED)]
        seed: u32,
    },
}

#[derive(clap::Args, Debug, Default)]
struct SettingsArgs {
    /// Settings JSON file, in the extension's storage shape
    #[arg(short, long)]
    settings: Option<String>,

    /// Proxy domain, overrides the settings file
    #[arg(short, long)]
    domain: Option<String>,

    /// Platform keys to switch off
    #[arg(long, value_delimiter = ',')]
    disable: Vec<PlatformKey>,
}

impl SettingsArgs {
    fn overrides(&self) -> SettingsOverrides {
        SettingsOverrides {
            settings_path: self.settings.clone(),
            domain: self.domain.clone(),
            disable: self.disable.clone(),
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let registry = Registry::builtin();
    let interceptor = Interceptor::new(&registry, InterceptorConfig::default());

    let result = match cli.command {
        Commands::Platforms => cmd_platforms(&registry),
        Commands::Detect { url } => cmd_detect(&registry, &url),
        Commands::Classify {
            url,
            download_attr,
            text,
        } => cmd_classify(&interceptor, &url, download_attr, &text),
        Commands::Rewrite { url, settings } => cmd_rewrite(&interceptor, &url, &settings),
        Commands::Check { input, settings } => cmd_check(&interceptor, &input, &settings),
        Commands::Bench {
            links,
            iterations,
            seed,
        } => cmd_bench(&interceptor, links, iterations, seed),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn cmd_platforms(registry: &Registry) -> Result<(), String> {
    for desc in registry.all() {
        println!("{:<4} {:<14} {}", desc.key.as_str(), desc.name, desc.origin);
    }
    Ok(())
}

fn cmd_detect(registry: &Registry, url: &str) -> Result<(), String> {
    match registry.detect(url) {
        Some(key) => {
            println!("{}", key);
            Ok(())
        }
        None => Err(format!("No supported platform for {}", url)),
    }
}

fn cmd_classify(interceptor: &Interceptor<'_>, url: &str, download_attr: bool, text: &str) -> Result<(), String> {
    let classification = interceptor
        .classifier()
        .classify(&ClassificationInput::new(url, download_attr, text));

    let verdict = if classification.is_download { "download" } else { "not a download" };
    println!("{} ({})", verdict, classification.reason);
    Ok(())
}

fn cmd_rewrite(interceptor: &Interceptor<'_>, url: &str, args: &SettingsArgs) -> Result<(), String> {
    let settings = config::resolve(&args.overrides())?;
    match interceptor.rewriter().rewrite(url, &settings) {
        Some(target) => {
            println!("{}", target);
            Ok(())
        }
        None => Err(format!("Not eligible for rewriting: {}", url)),
    }
}

fn cmd_check(interceptor: &Interceptor<'_>, input: &str, args: &SettingsArgs) -> Result<(), String> {
    let settings = config::resolve(&args.overrides())?;
    let text = fs::read_to_string(input).map_err(|e| format!("Failed to read '{}': {}", input, e))?;

    let start = Instant::now();
    let records = check::parse_records(&text);
    debug!(count = records.len(), path = input, "loaded links");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = check::run_check(interceptor, &records, &settings, &mut out)?;
    out.flush().map_err(|e| format!("Failed to write output: {}", e))?;

    eprintln!(
        "Checked {} links in {:?}: {} downloads, {} rewritten",
        summary.total,
        start.elapsed(),
        summary.downloads,
        summary.rewritten
    );
    Ok(())
}

fn cmd_bench(interceptor: &Interceptor<'_>, links: usize, iterations: usize, seed: u32) -> Result<(), String> {
    let options = bench::BenchOptions {
        links,
        iterations,
        seed,
    };
    let settings = xget_core::Settings::with_domain("xget.example.com");

    println!("========================================");
    println!("Xget benchmark: {} links x {} iterations", links, iterations);
    println!("========================================");
    let result = bench::run_bench(interceptor, &settings, &options)?;
    println!("{}", bench::format_result("classify + rewrite", &result));
    Ok(())
}
