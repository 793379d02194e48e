//! Logging to stderr through `tracing_subscriber`.
//!
//! The level comes from the `-v` count unless `VELLUM_LOG` is set, in which
//! case that filter wins (`VELLUM_LOG=vellum=trace`).

use once_cell::sync::OnceCell;
use tracing_subscriber::{filter::LevelFilter, fmt, util::SubscriberInitExt, EnvFilter};

static INITIALIZED: OnceCell<()> = OnceCell::new();

pub struct Logger;

impl Logger {
    /// Configures logging for the process. Only the first call has an effect.
    pub fn init(verbose: u8) {
        INITIALIZED.get_or_init(|| setup_logging(level_for(verbose)));
    }
}

pub fn level_for(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    }
}

fn setup_logging(level: LevelFilter) {
    fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .with_env_var("VELLUM_LOG")
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .with_file(false)
        .with_target(false)
        .finish()
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for(0), LevelFilter::WARN);
        assert_eq!(level_for(1), LevelFilter::DEBUG);
        assert_eq!(level_for(2), LevelFilter::TRACE);
        assert_eq!(level_for(9), LevelFilter::TRACE);
    }
}
