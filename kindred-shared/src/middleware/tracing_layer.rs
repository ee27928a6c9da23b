use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global subscriber for `service_name`.
///
/// `RUST_LOG` wins when set; otherwise the service's own crate logs at debug.
/// `KINDRED_ENV=production` switches to JSON lines. Calling it a second time
/// in the same process is a no-op.
pub fn init_tracing(service_name: &str) {
    let crate_target = service_name.replace('-', "_");
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("info,{crate_target}=debug,kindred_shared=debug,tower_http=debug"))
    });

    let production = matches!(std::env::var("KINDRED_ENV").as_deref(), Ok("production"));

    let installed = if production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_current_span(true))
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_file(true).with_line_number(true))
            .try_init()
    };

    if installed.is_ok() {
        tracing::info!(service = service_name, production, "tracing initialized");
    }
}
