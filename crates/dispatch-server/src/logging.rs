use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

/// Installs the global logger.
///
/// `RUST_LOG` still wins over the `debug` default. With `log_file` set, records
/// are appended there instead of stderr.
pub fn init_logging(debug: bool, log_file: Option<&Path>) -> io::Result<()> {
    let filter = if debug { "debug" } else { "info" };

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter));
    builder.format(|buf, record| {
        writeln!(
            buf,
            "[{}] {} [{}] {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder
        .try_init()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
}
