//!
//! [`duplex_rpc_log`] provides the `log_trace!()` / `log_debug!()` /
//! `log_info!()` / `log_warn!()` / `log_error!()` macros used throughout the
//! duplex-rpc crates. On native targets these invoke `println!()`-style
//! console output through the [`console`] module's colorized writer.
//!
//! The macros operate the same way as regular functions such as `println!()`.
//!
//! The following core macros are available:
//! - `log_trace!()`
//! - `log_debug!()`
//! - `log_info!()`
//! - `log_warn()`
//! - `log_error!()`
//!
//! # Redirecting log output
//!
//! This crate allows you to configure a log sink that will receive
//! all log messages from your application.  This is useful to route log messages
//! to an external receiver or, for example, store logs to a file.
//!
//! Log sink can be installed using [`duplex_rpc_log::pipe`] function and supplying
//! it with an Arc of the [`duplex_rpc_log::Sink`] trait.  The trait function
//! [`duplex_rpc_log::Sink::write`] should return `true` to indicate the the text
//! should be outputed to the console, or `false` to prevent further output
//! (i.e. to consume the log text)
//!
//! ## Example:
//!
//! ```
//! use duplex_rpc_log::*;
//! use std::sync::Arc;
//!
//! pub struct MyStruct;
//! impl Sink for MyStruct {
//!     fn write(&self, target: Option<&str>, level:Level, args : &std::fmt::Arguments<'_>) -> bool {
//!         
//!         println!("target: {target:?}");
//!         println!("level: {level:?}");
//!         println!("args: {args:?}");
//!
//!         // return true to continue output
//!         // return false to prevent further output
//!         true
//!     }
//! }
//!
//! let my_struct = Arc::new(MyStruct{});
//! duplex_rpc_log::pipe(Some(my_struct));
//! log_trace!("test msg");
//! ```
//!
//! To can disable the sink by supplying [`Option::None`] to [`duplex_rpc_log::pipe`].  
//!

extern crate self as duplex_rpc_log;

mod log;
pub use self::log::*;

mod console;
pub use self::console::*;

pub mod levels;

pub mod prelude {
    pub use super::console::*;
    pub use super::levels::*;
    pub use super::log::*;
}

#[cfg(test)]
mod test {
    use crate::*;
    use std::sync::Arc;

    #[test]
    fn log_sink_test() {
        pub struct MyStruct;
        impl Sink for MyStruct {
            fn write(
                &self,
                target: Option<&str>,
                level: Level,
                args: &std::fmt::Arguments<'_>,
            ) -> bool {
                println!("target: {target:?}");
                println!("level: {level:?}");
                println!("args: {args:?}");
                true
            }
        }

        let my_struct = Arc::new(MyStruct {});
        duplex_rpc_log::pipe(Some(my_struct));
        log_trace!("test msg");
    }
}
