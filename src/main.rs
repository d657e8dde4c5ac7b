//! Command-line entry point for the PDF password recovery utility.

use clap::{ArgAction, Parser};
use indicatif::{HumanCount, HumanDuration};
use tracing::warn;

use pdf_unlocker::config::{DEFAULT_MAX_LENGTH, DEFAULT_MIN_LENGTH, DEFAULT_REPORT_INTERVAL};
use pdf_unlocker::search::SearchStats;
use pdf_unlocker::{
    Alphabet, CancelToken, ConsoleProgress, SearchConfig, SearchOptions, SearchOutcome, logging,
    unlock,
};

use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
/// CLI arguments supported by pdf-unlocker.
struct Cli {
    /// Path to the password-protected PDF
    #[arg(short = 'i', long = "input", value_name = "PDF", required = true)]
    input: PathBuf,

    /// Where to write the unlocked copy (default: unlocked_<name> next to the input)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Minimum password length to brute-force
    #[arg(long = "min", default_value_t = DEFAULT_MIN_LENGTH)]
    min: usize,

    /// Maximum password length to brute-force
    #[arg(long = "max", default_value_t = DEFAULT_MAX_LENGTH)]
    max: usize,

    /// Include alphabetic characters in the candidate alphabet
    #[arg(short = 'a', long = "alphabet", action = ArgAction::SetTrue)]
    alphabet: bool,

    /// Include digits in the candidate alphabet
    #[arg(short = 'd', long = "digit", action = ArgAction::SetTrue)]
    digit: bool,

    /// Include common symbols in the candidate alphabet
    #[arg(short = 's', long = "symbol", action = ArgAction::SetTrue)]
    symbol: bool,

    /// Exact candidate alphabet, in enumeration order (overrides -a/-d/-s)
    #[arg(short = 'c', long = "charset", value_name = "CHARS")]
    charset: Option<String>,

    /// Also try the empty password before anything else
    #[arg(long = "try-empty", action = ArgAction::SetTrue)]
    try_empty: bool,

    /// Number of worker threads to use for brute-force attempts
    #[arg(short = 't', long = "threads", default_value_t = 1)]
    threads: usize,

    /// Milliseconds between progress updates
    #[arg(long = "report-interval-ms", default_value_t = DEFAULT_REPORT_INTERVAL.as_millis() as u64)]
    report_interval_ms: u64,

    /// Log at debug level
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

impl Cli {
    fn alphabet(&self) -> Result<Alphabet, pdf_unlocker::ConfigError> {
        if let Some(charset) = &self.charset {
            return Alphabet::new(charset.chars());
        }
        if !(self.alphabet || self.digit || self.symbol) {
            return Ok(Alphabet::alphanumeric());
        }
        Alphabet::from_classes(self.alphabet, self.digit, self.symbol)
    }

    fn search_config(&self) -> Result<SearchConfig, pdf_unlocker::ConfigError> {
        let alphabet = self.alphabet()?;
        if self.try_empty {
            SearchConfig::with_empty_candidate(alphabet, self.min, self.max)
        } else {
            SearchConfig::new(alphabet, self.min, self.max)
        }
    }
}

/// Entrypoint that validates flags, runs the search and writes the unlocked copy.
fn main() {
    let args = Cli::parse();
    logging::init(args.verbose);

    if args.threads == 0 {
        eprintln!("Error: --threads must be at least 1.");
        exit(1);
    }

    let config = match args.search_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    let options = SearchOptions {
        report_interval: Duration::from_millis(args.report_interval_ms),
        threads: args.threads,
    };

    let cancel = CancelToken::new();
    if let Err(e) = cancel.install_signal_handlers() {
        warn!(error = %e, "could not install signal handlers; Ctrl+C will terminate immediately");
    }

    println!("=== Password search ===");
    println!("PDF: {}", args.input.display());
    println!("Length: {} to {}", config.min_length(), config.max_length());
    println!("Charset size: {}", config.alphabet().len());
    println!("Candidates: {}", HumanCount(config.total_space()));
    println!("=======================");

    let mut progress = ConsoleProgress::new(config.total_space());
    let result = pdf_unlocker::find_password_in_file(
        &args.input,
        &config,
        &cancel,
        &options,
        &mut progress,
    );
    progress.finish();

    let outcome = match result {
        Ok(outcome) => outcome,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit(1);
        }
    };

    match outcome {
        SearchOutcome::Found { password, stats } => {
            println!("=== Password found ===");
            println!("Password: {}", password);
            print_stats(&stats);

            let output = args
                .output
                .clone()
                .unwrap_or_else(|| unlock::default_output_path(&args.input));

            match unlock::unlock_file(&args.input, &output, &password) {
                Ok(path) => println!("Unlocked copy saved to {}", path.display()),
                Err(e) => {
                    eprintln!("Unexpected error writing unlocked PDF: {}", e);
                    exit(3);
                }
            }
        }
        SearchOutcome::NotFound { stats } => {
            println!("=== Password not found in provided search space ===");
            print_stats(&stats);
            exit(2);
        }
        SearchOutcome::Cancelled { stats } => {
            println!("=== Stopped by user ===");
            print_stats(&stats);
            exit(130);
        }
        SearchOutcome::AlreadyUnencrypted => {
            println!("Not encrypted: {}", args.input.display());
        }
    }
}

fn print_stats(stats: &SearchStats) {
    println!(
        "Attempts: {} of {}",
        HumanCount(stats.attempts),
        HumanCount(stats.total_space)
    );
    println!("Elapsed: {} ({:.2?})", HumanDuration(stats.elapsed), stats.elapsed);
}
