use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Installs the stderr subscriber. `CLIPMARK_LOG` wins over `RUST_LOG`.
pub fn init_logging(verbose: bool) {
    let requested = std::env::var("CLIPMARK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter(requested.as_deref(), verbose))
        .with_writer(std::io::stderr)
        .finish();

    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("logging disabled: {err}");
    }
}

/// Parses the requested directives, falling back to a level picked by `--verbose`.
fn filter(requested: Option<&str>, verbose: bool) -> EnvFilter {
    let fallback = if verbose { "debug" } else { "warn" };
    requested
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(fallback))
}
