// Tracing initialisation for the CLI. Logs go to stderr so that JSON/YAML
// output on stdout stays machine readable.
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Level used when RUST_LOG is not set.
pub fn level_for(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

pub fn init_tracing(verbose: u8) {
    // Prefer RUST_LOG from env, otherwise derive the level from -v flags.
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(level_for(verbose)));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(level_for(0), "warn");
        assert_eq!(level_for(1), "info");
        assert_eq!(level_for(5), "debug");
    }
}
