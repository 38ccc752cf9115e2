//! Process-level error type.
//!
//! Every fallible path in the crate funnels into `AppError`, which carries the
//! exit code the binary should terminate with:
//!
//! - `2` — configuration or local I/O problem (bad flags, unreadable store)
//! - `3` — the store or a selection turned out empty
//! - `4` — network or BLS API failure

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Configuration or local I/O failure (exit code 2).
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(2, message)
    }

    /// Empty store / empty selection (exit code 3).
    pub fn no_data(message: impl Into<String>) -> Self {
        Self::new(3, message)
    }

    /// Network or API failure (exit code 4).
    pub fn api(message: impl Into<String>) -> Self {
        Self::new(4, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
