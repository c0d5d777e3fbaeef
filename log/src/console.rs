pub use console::style;
