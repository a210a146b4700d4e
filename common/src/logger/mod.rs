//! Process-wide logging setup shared by every binary in the workspace.

mod init;
mod macros;
mod trace_id;

pub use init::{LogFormat, init_logger};
pub use macros::{child_span, root_span};
pub use trace_id::TraceId;
