use crate::config::Environment;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "gdp_dashboard=debug,gdp_server=debug,tower_http=debug,info"
    } else {
        "gdp_dashboard=info,gdp_server=info,tower_http=info,warn"
    }
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the defaults.
/// Production emits JSON lines; every other environment uses the compact format.
pub fn init_logger(environment: Environment, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let registry = tracing_subscriber::registry().with(filter);

    match environment {
        Environment::Production => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .json(),
            )
            .init(),
        Environment::Development | Environment::Testing => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init(),
    }
}
