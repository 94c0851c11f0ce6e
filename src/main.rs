//! PhenoCurator CLI Entry Point
//!
//! Runs the curation pipeline against the configured repository
//! organization, catalog, and LLM endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default config.yaml (resumes from checkpoints)
//! phenocurator
//!
//! # Run with an explicit configuration file
//! phenocurator curation.yaml
//!
//! # Discard checkpoints and recompute every stage
//! phenocurator --fresh
//!
//! # Enable debug logging
//! phenocurator --verbose
//! ```

use std::env;
use std::process::ExitCode;

use log::info;

use phenocurator::client::{CatalogClient, GithubSource, LlmClient};
use phenocurator::curation::pipeline::{Curator, SYSTEM_PROMPT};
use phenocurator::storage::JsonCheckpointStore;
use phenocurator::{Config, APP_NAME, VERSION};

/// Default configuration file used when none is specified.
const DEFAULT_CONFIG: &str = "config.yaml";

/// Command-line options parsed from arguments.
#[derive(Debug)]
struct CliOptions {
    config_path: String,
    fresh: bool,
    verbose: bool,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            config_path: DEFAULT_CONFIG.to_string(),
            fresh: false,
            verbose: false,
        }
    }
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME, VERSION);
    println!("Clinical Phenotype Workflow Curation");
    println!();
}

/// Prints usage information.
fn print_usage() {
    println!("Usage: phenocurator [OPTIONS] [CONFIG_FILE]");
    println!();
    println!("Arguments:");
    println!("  [CONFIG_FILE]   Path to YAML configuration (default: {})", DEFAULT_CONFIG);
    println!();
    println!("Options:");
    println!("  --fresh         Discard checkpoints and recompute every stage");
    println!("  --verbose       Enable debug logging");
    println!("  --help          Show this help message");
    println!("  --version       Show version information");
    println!();
    println!("Environment:");
    println!("  GITHUB_ACCESS_TOKEN   Token for the repository-source API (required)");
    println!();
    println!("Examples:");
    println!("  phenocurator");
    println!("  phenocurator curation.yaml --fresh");
}

/// Parses command-line arguments into a CliOptions struct.
fn parse_arguments(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut positional_index = 0;
    let mut i = 1; // Skip program name

    while i < args.len() {
        let arg = &args[i];

        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("{} {}", APP_NAME, VERSION);
                std::process::exit(0);
            }
            "--fresh" => {
                options.fresh = true;
            }
            "--verbose" | "-v" => {
                options.verbose = true;
            }
            arg if arg.starts_with('-') => {
                return Err(format!("Unknown option: {}", arg));
            }
            _ => {
                match positional_index {
                    0 => options.config_path = arg.clone(),
                    _ => return Err(format!("Unexpected argument: {}", arg)),
                }
                positional_index += 1;
            }
        }
        i += 1;
    }

    Ok(options)
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    // Parse arguments
    let options = parse_arguments(&args).map_err(|e| {
        eprintln!("Error: {}", e);
        eprintln!();
        print_usage();
        e
    })?;

    // Setup logging
    setup_logging(options.verbose);

    // Print banner
    print_banner();

    // Load configuration and credentials
    info!("Loading configuration: {}", options.config_path);
    let config = Config::load_or_default(&options.config_path)?;
    let token = Config::github_token()?;

    // Wire up collaborators
    let source = GithubSource::new(
        config.github_url.clone(),
        config.github_org.clone(),
        token,
    );
    let catalog = CatalogClient::new(config.catalog_url.clone());
    let mut llm = LlmClient::new(
        config.llm_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.llm_max_tokens,
        config.llm_temperature,
        false,
        SYSTEM_PROMPT,
    );
    let store = JsonCheckpointStore::new(config.checkpoint_dir.clone());

    let mut curator = Curator::new(&source, &mut llm, &catalog, &store, &config);

    if options.fresh {
        info!("Discarding checkpoints");
        curator.clear_checkpoints()?;
    }

    // Run the pipeline
    let (groups, intersections) = curator.run()?;

    println!();
    println!(
        "Curated {} phenotype groups; {} workflow pairs share steps",
        groups.len(),
        intersections.pair_count()
    );
    println!("Outputs written to {}", config.output_dir);

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
