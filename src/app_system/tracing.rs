/// Installs the process-wide subscriber.
///
/// Filtering comes from `RUST_LOG`, falling back to `info`:
///
/// ```bash
/// RUST_LOG=canteen_sync::sync=debug cargo run
/// ```
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
