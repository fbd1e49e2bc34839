// Logging
//
// Diagnostics go to stderr through `env_logger` so rendered output on
// stdout stays pipeable. The filter comes from `INFRASYNC_LOG`
// (`warn` when unset), using the usual `env_logger` directive syntax.

use env_logger::{Env, Target};

pub const LOG_ENV: &str = "INFRASYNC_LOG";

pub fn setup_logging() {
    env_logger::Builder::from_env(Env::default().filter_or(LOG_ENV, "warn"))
        .target(Target::Stderr)
        .format_timestamp(None)
        .format_target(false)
        .init();
}
