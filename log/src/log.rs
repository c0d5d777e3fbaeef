use std::fmt;
use std::sync::Arc;

pub use log::{Level, LevelFilter};
use downcast::{downcast_sync, AnySync};
pub use hexplay::{self, HexViewBuilder};
pub use termcolor::Buffer;

pub struct ColorHexView<'a> {
    pub builder: HexViewBuilder<'a>,
    pub color_start: usize,
}

impl<'a> ColorHexView<'a> {
    pub fn new(builder: HexViewBuilder<'a>, colors: Vec<(&'a str, usize)>) -> Self {
        Self {
            builder,
            color_start: 0,
        }
        .add_colors(colors)
    }

    pub fn add_colors(mut self, colors: Vec<(&'a str, usize)>) -> Self {
        let mut builder = self.builder;
        for (color, len) in colors {
            let end = self.color_start + len;
            let range = self.color_start..end;
            self.color_start = end;
            builder = builder.add_color(color, range);
        }
        self.builder = builder;
        self
    }

    pub fn add_colors_with_range(mut self, colors: Vec<(&'a str, std::ops::Range<usize>)>) -> Self {
        let mut builder = self.builder;
        for (color, range) in colors {
            builder = builder.add_color(color, range);
        }
        self.builder = builder;
        self
    }

    pub fn try_print(self) -> std::result::Result<(), String> {
        let mut buf = Buffer::ansi();
        match self.builder.finish().fmt(&mut buf) {
            Ok(()) => match String::from_utf8(buf.as_slice().to_vec()) {
                Ok(str) => {
                    log_trace!("{}", str);
                }
                Err(_) => {
                    return Err("Unable to convert HexView to string".to_string());
                }
            },
            Err(_) => {
                return Err("Unable to format HexView".to_string());
            }
        }
        Ok(())
    }
}

/// A log sink trait that can be installed into the log subsystem using the [`pipe`]
/// function and will receive all log messages.
pub trait Sink: AnySync {
    fn write(&self, target: Option<&str>, level: Level, args: &fmt::Arguments<'_>) -> bool;
}

struct SinkHandler {
    sink: Arc<dyn Sink>,
}

downcast_sync!(dyn Sink);

use std::sync::Mutex;

lazy_static::lazy_static! {
    static ref LEVEL_FILTER: Mutex<LevelFilter> = Mutex::new(LevelFilter::Trace);
}

#[inline(always)]
/// Returns true if the current log level is below the
/// currently set [`LevelFilter`]
pub fn log_level_enabled(level: Level) -> bool {
    *LEVEL_FILTER.lock().unwrap() >= level
}

/// Enable filtering of log messages using the [`LevelFilter`]
pub fn set_log_level(level: LevelFilter) {
    *LEVEL_FILTER.lock().unwrap() = level;
}

#[cfg(feature = "sink")]
lazy_static::lazy_static! {
    static ref SINK: Mutex<Option<SinkHandler>> = Mutex::new(None);
}

#[cfg(feature = "sink")]
/// Receives an Option with an `Arc`ed [`Sink`] trait reference
/// and installs it as a log sink / receiver.
/// The sink can be later disabled by invoking `pipe(None)`
pub fn pipe(sink: Option<Arc<dyn Sink>>) {
    match sink {
        Some(sink) => {
            *SINK.lock().unwrap() = Some(SinkHandler { sink });
        }
        None => {
            *SINK.lock().unwrap() = None;
        }
    }
}

#[cfg(feature = "sink")]
#[inline(always)]
fn to_sink(target: Option<&str>, level: Level, args: &fmt::Arguments<'_>) -> bool {
    match SINK.lock().unwrap().as_ref() {
        Some(handler) => handler.sink.write(target, level, args),
        None => false,
    }
}

#[cfg(feature = "external-logger")]
mod external_logger {
    use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

    pub struct Logger;

    impl log::Log for Logger {
        fn enabled(&self, metadata: &Metadata) -> bool {
            super::log_level_enabled(metadata.level())
        }

        fn log(&self, record: &Record) {
            if self.enabled(record.metadata()) {
                match record.metadata().level() {
                    Level::Error => super::error_impl(None, record.args()),
                    Level::Warn => super::warn_impl(None, record.args()),
                    Level::Info => super::info_impl(None, record.args()),
                    Level::Debug => super::debug_impl(None, record.args()),
                    Level::Trace => super::trace_impl(None, record.args()),
                }
            }
        }

        fn flush(&self) {}
    }

    static LOGGER: Logger = Logger;

    pub fn init() -> Result<(), SetLoggerError> {
        log::set_logger(&LOGGER).map(|()| log::set_max_level(LevelFilter::Trace))
    }
}

#[cfg(feature = "external-logger")]
pub fn init() -> Result<(), log::SetLoggerError> {
    external_logger::init()
}

#[inline(always)]
pub fn error_impl(target: Option<&str>, args: &fmt::Arguments<'_>) {
    if log_level_enabled(Level::Error) {
        #[cfg(feature = "sink")]
        {
            if to_sink(target, Level::Error, args) {
                return;
            }
        }
        println!("{args}");
    }
}

#[inline(always)]
pub fn warn_impl(target: Option<&str>, args: &fmt::Arguments<'_>) {
    if log_level_enabled(Level::Warn) {
        #[cfg(feature = "sink")]
        {
            if to_sink(target, Level::Warn, args) {
                return;
            }
        }
        println!("{args}");
    }
}

#[inline(always)]
pub fn info_impl(target: Option<&str>, args: &fmt::Arguments<'_>) {
    if log_level_enabled(Level::Info) {
        #[cfg(feature = "sink")]
        {
            if to_sink(target, Level::Info, args) {
                return;
            }
        }
        println!("{args}");
    }
}

#[inline(always)]
pub fn debug_impl(target: Option<&str>, args: &fmt::Arguments<'_>) {
    if log_level_enabled(Level::Debug) {
        #[cfg(feature = "sink")]
        {
            if to_sink(target, Level::Debug, args) {
                return;
            }
        }
        println!("{args}");
    }
}

#[inline(always)]
pub fn trace_impl(target: Option<&str>, args: &fmt::Arguments<'_>) {
    if log_level_enabled(Level::Trace) {
        #[cfg(feature = "sink")]
        {
            if to_sink(target, Level::Trace, args) {
                return;
            }
        }
        println!("{args}");
    }
}

/// Format and log message with [`Level::Error`]
#[macro_export]
macro_rules! log_error {
    (target: $target:expr, $($t:tt)+) => (
        $crate::error_impl(Some($target), &format_args!($($t)+))
    );

    ($($t:tt)*) => (
        $crate::error_impl(None, &format_args!($($t)*))
    )
}

/// Format and log message with [`Level::Warn`]
#[macro_export]
macro_rules! log_warning {
    (target: $target:expr, $($t:tt)+) => (
        $crate::warn_impl(Some($target), &format_args!($($t)+))
    );

    ($($t:tt)*) => (
        $crate::warn_impl(None, &format_args!($($t)*))
    )
}

/// Format and log message with [`Level::Info`]
#[macro_export]
macro_rules! log_info {
    (target: $target:expr, $($t:tt)+) => (
        $crate::info_impl(Some($target), &format_args!($($t)+))
    );

    ($($t:tt)*) => (
        $crate::info_impl(None, &format_args!($($t)*))
    )
}

/// Format and log message with [`Level::Debug`]
#[macro_export]
macro_rules! log_debug {
    (target: $target:expr, $($t:tt)+) => (
        $crate::debug_impl(Some($target), &format_args!($($t)+))
    );

    ($($t:tt)*) => (
        $crate::debug_impl(None, &format_args!($($t)*))
    )
}

/// Format and log message with [`Level::Trace`]
#[macro_export]
macro_rules! log_trace {
    (target: $target:expr, $($t:tt)+) => (
        $crate::trace_impl(Some($target), &format_args!($($t)+))
    );

    ($($t:tt)*) => (
        $crate::trace_impl(None, &format_args!($($t)*))
    )
}

use log_debug;
use log_error;
use log_info;
use log_trace;
use log_warning;

/// Prints (using [`log_trace`]) a data slice formatted as a hex data dump.
pub fn trace_hex(data: &[u8]) {
    let hex = format_hex(data);
    log_trace!("{}", hex);
}

/// Returns a string formatted as a hex data dump of the supplied slice argument.
pub fn format_hex(data: &[u8]) -> String {
    let view = hexplay::HexViewBuilder::new(data)
        .address_offset(0)
        .row_width(16)
        .finish();

    format!("{view}")
}

/// Formats a hex data dump to contain color ranges
pub fn format_hex_with_colors<'a>(data: &'a [u8], colors: Vec<(&'a str, usize)>) -> ColorHexView<'a> {
    let view_builder = hexplay::HexViewBuilder::new(data)
        .address_offset(0)
        .row_width(16);

    ColorHexView::new(view_builder, colors)
}

pub mod color_log {
    pub use super::*;
    pub type Index = usize;
    pub type Length = usize;
    pub type Color<'a> = &'a str;
    type Result<T> = std::result::Result<T, String>;

    pub trait ColoLogTrace {
        fn log_data(&self) -> Vec<u8>;
        fn log_index_length_color(&self) -> Option<Vec<(Index, Length, Color)>> {
            None
        }

        fn log_trace(&self) -> Result<bool> {
            let data_vec = self.log_data();
            let mut view = format_hex_with_colors(&data_vec, vec![]);
            if let Some(index_length_color) = self.log_index_length_color() {
                let mut colors = Vec::new();
                for (index, length, color) in index_length_color {
                    colors.push((color, index..index + length));
                }
                view = view.add_colors_with_range(colors);
            }

            if view.try_print().is_err() {
                trace_hex(&data_vec);
                return Ok(false);
            }
            Ok(true)
        }
    }
}

pub use color_log::*;
