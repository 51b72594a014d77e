//! Values crossing the sandbox boundary.
//!
//! Sandboxed code is untrusted and dynamically typed from the host's point of
//! view, so arguments arrive as a [`SandboxValue`] and are checked for the
//! capability an operation needs before anything is consumed.

use std::fmt;

/// Outcome of running a sandboxed callable. An `Err` counts as an escaped error.
pub type CallableResult = Result<(), anyhow::Error>;

/// A zero-argument unit of work supplied by sandboxed code.
pub type SandboxFn = Box<dyn FnOnce() -> CallableResult + Send + 'static>;

/// A dynamically typed value handed to the host by sandboxed code.
pub enum SandboxValue {
    /// An invocable zero-argument function.
    Callable(SandboxFn),
    /// A string.
    Text(String),
    /// An integer.
    Int(i64),
    /// A real number.
    Real(f64),
    /// A boolean.
    Bool(bool),
    /// The absence of a value.
    Unit,
}

impl SandboxValue {
    /// Wrap a closure as a callable value.
    pub fn callable<F>(f: F) -> Self
    where
        F: FnOnce() -> CallableResult + Send + 'static,
    {
        Self::Callable(Box::new(f))
    }

    /// Whether the value can be invoked with zero arguments.
    #[must_use]
    pub const fn is_callable(&self) -> bool {
        matches!(self, Self::Callable(_))
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Callable(_) => "function",
            Self::Text(_) => "str",
            Self::Int(_) => "int",
            Self::Real(_) => "float",
            Self::Bool(_) => "bool",
            Self::Unit => "none",
        }
    }

    /// Borrow the text content, if this is a string.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Debug for SandboxValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callable(_) => f.write_str("Callable(..)"),
            Self::Text(s) => f.debug_tuple("Text").field(s).finish(),
            Self::Int(i) => f.debug_tuple("Int").field(i).finish(),
            Self::Real(r) => f.debug_tuple("Real").field(r).finish(),
            Self::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            Self::Unit => f.write_str("Unit"),
        }
    }
}

impl From<&str> for SandboxValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for SandboxValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for SandboxValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for SandboxValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for SandboxValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}
