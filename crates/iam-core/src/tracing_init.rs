//! `tracing` bootstrap shared by every binary in the workspace, grounded on
//! the teacher's use of `tracing-subscriber` with an env filter.

use tracing_subscriber::{fmt, EnvFilter};

pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
