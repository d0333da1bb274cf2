pub mod diagnostics;

pub use diagnostics::{AppendLog, DiagnosticsLogger};
