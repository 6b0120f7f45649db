//! Logging bootstrap around `tracing`.
//!
//! Thin by design: the only contract is that initialization and emission
//! never panic and never propagate sink failures to callers of the
//! session manager. A broken file sink degrades to console-only output.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogSettings;

static INITIALIZED: OnceCell<()> = OnceCell::new();

/// Install the process-wide subscriber: a console layer, plus a JSON file
/// layer when `to_file` is set. Idempotent; later calls are no-ops, and
/// a subscriber installed by the host application wins silently.
///
/// Filter precedence: `RUST_LOG`, then `settings.filter`, then
/// `"info,sqlx=warn,sea_orm=warn"`.
pub fn init(settings: &LogSettings) {
    INITIALIZED.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .ok()
            .or_else(|| settings.filter.as_deref().map(EnvFilter::new))
            .unwrap_or_else(|| EnvFilter::new("info,sqlx=warn,sea_orm=warn"));

        let console = fmt::layer().with_target(true).with_ansi(false);
        let registry = tracing_subscriber::registry().with(filter).with(console);

        match file_writer(settings) {
            Some(writer) => {
                let file_layer = fmt::layer()
                    .with_writer(writer)
                    .with_ansi(false)
                    .json();
                registry.with(file_layer).try_init().ok();
            }
            None => {
                registry.try_init().ok();
            }
        }
    });
}

/// Open the configured log file for appending. Any filesystem failure is
/// swallowed and reported as `None`.
fn file_writer(settings: &LogSettings) -> Option<Mutex<std::fs::File>> {
    if !settings.to_file || settings.file.trim().is_empty() {
        return None;
    }
    std::fs::create_dir_all(&settings.dir).ok()?;
    let path = Path::new(&settings.dir).join(&settings.file);
    let file = OpenOptions::new().create(true).append(true).open(path).ok()?;
    Some(Mutex::new(file))
}
