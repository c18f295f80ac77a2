use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize structured logging to stderr based on CLI arguments.
///
/// `RUST_LOG` or `NBPATH_LOG` take precedence over the flags.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let level = match (verbose, log_level) {
        (_, Some(level)) if level.contains('=') => level.to_string(),
        (_, Some(level)) => format!("nbpath={level}"),
        (true, None) => "nbpath=debug".to_string(),
        (false, None) => "nbpath=warn".to_string(),
    };

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env("NBPATH_LOG"))
        .unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .try_init()?;

    Ok(())
}
