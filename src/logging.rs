//! Diagnostic logging for the CLI, written to stderr.

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber filtered by `RUST_LOG`, falling back to
/// `pdf_unlocker=info` (or `debug` when `verbose`).
///
/// Returns `false` if a global subscriber was already set.
pub fn init(verbose: bool) -> bool {
    let default = if verbose {
        "pdf_unlocker=debug"
    } else {
        "pdf_unlocker=info"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
