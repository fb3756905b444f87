use env_logger::{Builder, Env};
use std::io::Write;

/// Initializes the logger with the `[timestamp] [level] message` format.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects debug output.
pub fn init_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    Builder::from_env(Env::default().default_filter_or(default_level))
        .format(|buf, record| {
            let timestamp = buf.timestamp();
            writeln!(
                buf,
                "[{}] [{}] {}",
                timestamp,
                record.level(),
                record.args()
            )
        })
        .init();
}
