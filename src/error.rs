//! Process-level error type.
//!
//! Only the I/O edges of the program fail: the rate lookup itself reports
//! missing data as an absent rate, never as an error. Bad command-line
//! arguments never get here: clap reports them itself, also with exit code 2.

/// Exit code for unreadable/unwritable files and missing CSV columns.
///
/// Nothing useful can be computed in these cases, so they stop the run in
/// every mode.
pub const EXIT_IO: u8 = 2;
/// Exit code for malformed data rows under `--strict`.
///
/// Without `--strict` the same rows are skipped and the affected ZIPs and rate
/// areas come out absent, so scripts that need all-or-nothing runs check for 3.
pub const EXIT_DATA: u8 = 3;

/// A fatal error carrying the process exit code and a one-line message.
///
/// The message is printed to stderr as is, so it names the table and line
/// (`"plans line 12: ..."`) rather than relying on a source chain.
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

    /// A file or schema problem: see [`EXIT_IO`].
    pub fn io(message: impl Into<String>) -> Self {
        Self::new(EXIT_IO, message)
    }

    /// A malformed row rejected under `--strict`: see [`EXIT_DATA`].
    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_pick_distinct_exit_codes() {
        let io = AppError::io("Failed to open zips CSV");
        let data = AppError::data("plans line 12: Invalid `rate`");

        assert_eq!(io.exit_code(), EXIT_IO);
        assert_eq!(data.exit_code(), EXIT_DATA);
        assert_ne!(EXIT_IO, EXIT_DATA);
        assert_eq!(data.to_string(), "plans line 12: Invalid `rate`");
        assert_eq!(io.message(), "Failed to open zips CSV");
    }
}
