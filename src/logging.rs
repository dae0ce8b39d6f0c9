use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Sets up the global subscriber. Logs go to stderr so stdout carries only
/// query results. `RUST_LOG`, when set, replaces the verbosity-derived filter.
///
/// `verbose`: 0 for INFO, 1 for DEBUG, 2+ for TRACE.
pub fn init_tracing(json: bool, verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn default_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    // The driver is chatty below warn; only open it up at -vv.
    let driver = if verbose >= 2 { "debug" } else { "warn" };
    format!("warn,bookstore_queries={},mongodb={}", level, driver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_maps_to_levels() {
        assert_eq!(default_directives(0), "warn,bookstore_queries=info,mongodb=warn");
        assert_eq!(default_directives(1), "warn,bookstore_queries=debug,mongodb=warn");
        assert_eq!(default_directives(5), "warn,bookstore_queries=trace,mongodb=debug");
    }

    #[test]
    fn directives_parse() {
        for verbose in 0..3 {
            assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
        }
    }
}
