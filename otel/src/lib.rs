use anyhow::Result;
use tracing::Subscriber;
use tracing_subscriber::{
    filter::LevelFilter, fmt, fmt::MakeWriter, layer::SubscriberExt, util::SubscriberInitExt,
    EnvFilter,
};

/// Logs go to stderr, stdout is reserved for program output.
pub fn init(crates: &[&str], level: LevelFilter, all_level: LevelFilter) -> Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = env_filter(rust_log.as_deref(), crates, level, all_level)?;
    subscriber(std::io::stderr, filter).init();
    Ok(())
}

/// `crates` are set to `level` and everything else to `all_level`, unless
/// `rust_log` already has a directive for that crate.
pub fn env_filter(
    rust_log: Option<&str>,
    crates: &[&str],
    level: LevelFilter,
    all_level: LevelFilter,
) -> Result<EnvFilter> {
    let rust_log = rust_log.unwrap_or_default();
    let mut filter = EnvFilter::builder()
        .with_default_directive(all_level.into())
        .parse_lossy(rust_log)
        .add_directive("hyper=warn".parse()?)
        .add_directive("tower=warn".parse()?)
        .add_directive("rustls=warn".parse()?);

    for name in crates {
        let overridden = rust_log
            .split(',')
            .any(|directive| directive.trim().starts_with(name));
        if !overridden {
            filter = filter.add_directive(format!("{name}={level}").parse()?);
        }
    }

    Ok(filter)
}

fn subscriber<W>(writer: W, filter: EnvFilter) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer))
        .with(filter)
}
