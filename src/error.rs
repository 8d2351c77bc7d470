use thiserror::Error;

/// Fatal failures of a generation run. Every variant aborts the run before
/// any table output is written; there is no retry or recovery path.
#[derive(Debug, Error)]
pub enum Error {
    /// The oracle binary is missing, not executable, or exited non-zero.
    #[error("failed to run `{command}`: {detail}")]
    OracleExecution { command: String, detail: String },

    /// An indented code line appeared before any type declaration in the
    /// help text.
    #[error("found code {0:?} before any type declaration")]
    OrphanCode(String),

    /// Expected marker text was absent from the oracle's output, or the
    /// token following it was not an integer. Usually an incompatible
    /// iptables version.
    #[error("unexpected iptables output: {0}")]
    ProbeFormat(String),

    /// A code probe reported a numeric type that disagrees with the
    /// resolved value of its enclosing type declaration.
    #[error("invalid type {found} for {name} (expected {expected})")]
    TypeCodeMismatch {
        name: String,
        found: u32,
        expected: u32,
    },
}
