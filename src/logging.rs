use std::io;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initializes the global tracing subscriber.
///
/// 0 = warn, 1 = info, 2 = debug, 3+ = trace. `RUST_LOG` overrides the
/// verbosity flags; `quiet` overrides both. Logs go to stderr so that they
/// do not interleave with the progress report on stdout.
pub fn init_logging(verbose_level: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "warn",
            1 => "info",
            // -vv: debug but keep the HTTP stack quiet
            2 => "debug,hyper_util=warn,reqwest=info,rustls=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(verbose_level > 1).with_writer(io::stderr))
        .init();
}
