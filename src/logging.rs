use fern::Dispatch;
use log::LevelFilter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Error = 1,
    #[default]
    Warn = 2,
    Info = 3,
    Debug = 4,
}

impl LogLevel {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "error" => Some(Self::Error),
            "warn" | "warning" => Some(Self::Warn),
            "info" => Some(Self::Info),
            "debug" => Some(Self::Debug),
            _ => None,
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warn => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }
}

/// Install the global stderr logger. Errors are red, warnings yellow; at
/// debug level every line is prefixed with its target module.
///
/// Calling this twice keeps the first logger.
pub fn setup_logger(level: LogLevel) {
    let verbose = level == LogLevel::Debug;
    let logger = Dispatch::new()
        .format(move |out, message, record| {
            let (color, reset) = match record.level() {
                log::Level::Error => ("\x1b[31m", "\x1b[0m"),
                log::Level::Warn => ("\x1b[33m", "\x1b[0m"),
                log::Level::Info | log::Level::Debug | log::Level::Trace => ("", ""),
            };
            if verbose {
                out.finish(format_args!(
                    "{}{}: ({}) {}{}",
                    color,
                    record.level(),
                    record.target(),
                    message,
                    reset
                ))
            } else {
                out.finish(format_args!("{}{}: {}{}", color, record.level(), message, reset))
            }
        })
        .level(level.to_level_filter())
        .chain(std::io::stderr());

    if let Err(e) = logger.apply() {
        eprintln!("Failed to apply logger: {:?}", e);
    }
}
