//! Market data primitives and incremental sliding-window indicators.

pub mod indicator;
pub mod types;
pub mod window;

pub use window::{Window, WindowError};
