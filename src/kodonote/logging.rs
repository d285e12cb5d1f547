//! Tracing subscriber setup for binaries. The library only emits events.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `kodonote=debug`.
pub const LOG_ENV: &str = "KODO_LOG";

/// Filter used when `KODO_LOG` is unset or invalid.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "info"
    } else {
        "warn"
    }
}

/// Installs a stderr `fmt` subscriber. Calling it twice is harmless; the
/// second call returns an error that callers may ignore.
pub fn init_logging(verbose: bool) -> Result<(), String> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|error| error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_raises_level() {
        assert_eq!(default_directive(true), "info");
        assert_eq!(default_directive(false), "warn");
    }
}
