//! Centralised error hierarchy for the **Mython interpreter**.
//!
//! All subsystems (scanner, parser, runtime, CLI) convert their internal
//! failure modes into one of the variants defined here.  This enables a
//! uniform `Result<T>` alias throughout the crate and ergonomic inter‑operation
//! with `anyhow` in the binary, while still preserving diagnostic detail.
//!
//! Every runtime variant is fatal to the current evaluation.  A `return`
//! travelling out of a method body is *not* an error and never appears here;
//! see [`crate::interpreter::Flow`].
//!
//! The module **does not** print diagnostics itself

use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum MythonError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error: {message}")]
    Parse { message: String, line: usize },

    /// A variable or a segment of a dotted path could not be resolved.
    #[error("Runtime error: name '{0}' is not defined")]
    UndefinedName(String),

    /// No method with the requested name *and* arity exists on the class.
    #[error("Runtime error: method '{method}' taking {arity} argument(s) is not found in class {class}")]
    MethodNotFound {
        class: String,
        method: String,
        arity: usize,
    },

    /// Operand kinds not accepted by an arithmetic or logical operator.
    #[error("Runtime error: cannot {op} {detail}")]
    InvalidOperands { op: &'static str, detail: String },

    /// Integer division with a zero divisor.
    #[error("Runtime error: division by zero")]
    DivisionByZero,

    /// Equal/Less applied to operands that have no ordering between them.
    #[error("Runtime error: cannot compare {0}")]
    CannotCompare(String),

    /// A value of the wrong kind where one specific kind is required
    /// (non‑Bool condition, non‑instance receiver, …).
    #[error("Runtime error: {0}")]
    Type(String),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::string::FromUtf8Error),
}

impl MythonError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        MythonError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Parse error: line={}, msg={}", line, message);

        MythonError::Parse { message, line }
    }

    /// Helper constructor for operator kind mismatches.
    pub fn operands<S: Into<String>>(op: &'static str, detail: S) -> Self {
        let detail: String = detail.into();

        info!("Creating InvalidOperands error: op={}, detail={}", op, detail);

        MythonError::InvalidOperands { op, detail }
    }

    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Type error: {}", message);

        MythonError::Type(message)
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, MythonError>;
