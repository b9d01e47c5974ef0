use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Arc, Mutex, OnceLock};

use log::LevelFilter;

/// Log file shared with the env_logger target; empty until a run knows
/// where its movie goes.
type SharedFile = Arc<Mutex<Option<File>>>;

static LOG_FILE: OnceLock<SharedFile> = OnceLock::new();

/// Writes every log line to stderr and, once attached, to the run's log file.
struct TeeTarget {
    file: SharedFile,
}

impl Write for TeeTarget {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stderr().write_all(buf)?;
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                file.write_all(buf)?;
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stderr().flush()?;
        if let Ok(mut guard) = self.file.lock() {
            if let Some(file) = guard.as_mut() {
                file.flush()?;
            }
        }
        Ok(())
    }
}

/// Installs the global logger. `RUST_LOG` still selects module filters;
/// the level cap defaults to `Info` until [`set_debug`] raises it.
pub fn init() {
    let file = LOG_FILE.get_or_init(|| Arc::new(Mutex::new(None))).clone();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {} \t{}",
                record.level(),
                buf.timestamp_seconds(),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(TeeTarget { file })))
        .init();

    if std::env::var_os("RUST_LOG").is_none() {
        log::set_max_level(LevelFilter::Info);
    }
}

pub fn set_debug(debug: bool) {
    if debug {
        log::set_max_level(LevelFilter::Debug);
    }
}

/// Starts a fresh log file at `path`, replacing any earlier one.
pub fn attach_file(path: &Path) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir)?;
        }
    }
    if path.exists() {
        fs::remove_file(path)?;
    }
    let file = File::create(path)?;
    if let Some(shared) = LOG_FILE.get() {
        if let Ok(mut guard) = shared.lock() {
            *guard = Some(file);
        }
    }
    Ok(())
}
