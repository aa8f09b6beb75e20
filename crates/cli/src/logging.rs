use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging for the CLI
///
/// Logs go to stderr so command output on stdout stays machine readable.
/// `RUST_LOG` overrides the level given on the command line.
pub fn init_logging(log_level: Level) -> Result<()> {
    let level_str = log_level.as_str().to_lowercase();
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("gstpro={level_str},gstpro_http={level_str},gstpro_core={level_str}").into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .try_init()?;

    Ok(())
}
