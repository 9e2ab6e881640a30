//! Appender implementations

pub mod console;
pub mod json;
pub mod rotating_file;
pub mod sink;

pub use console::ConsoleAppender;
pub use json::JsonAppender;
pub use rotating_file::{RotatingFile, RotationPolicy};
pub use sink::{SharedBuffer, Sink};

pub use crate::core::Appender;
