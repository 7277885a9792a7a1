use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber.
///
/// `RUST_LOG` wins over `directive`, which wins over the level implied by
/// `verbosity` (number of `-v` flags).
pub fn init(verbosity: u8, directive: Option<&str>) -> anyhow::Result<()> {
    let filter = match std::env::var(EnvFilter::DEFAULT_ENV) {
        Ok(env) if !env.trim().is_empty() => EnvFilter::try_new(env)?,
        _ => match directive {
            Some(directive) if verbosity == 0 => EnvFilter::try_new(directive)?,
            _ => EnvFilter::new(default_directive(verbosity)),
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow!("failed to install logger: {e}"))
}

fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}
