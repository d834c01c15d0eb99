//! Exit codes for the testreport CLI.
//!
//! Exit code ranges:
//! - 0: report written
//! - 10-19: user/input errors (fixable by the caller)
//! - 20-29: internal or I/O errors
//!
//! Test failures inside the report do not change the exit code; the report
//! itself carries them.

/// Exit codes for testreport operations.
///
/// These codes are a stable contract for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Report written / command succeeded
    Clean = 0,

    /// Invalid arguments
    ArgsError = 10,

    /// Configuration rejected (missing CSS, bad regex, unreadable file)
    ConfigError = 11,

    /// Malformed runner stream
    InputError = 12,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// Writing the report or its assets failed
    IoError = 21,
}

impl ExitCode {
    /// Convert to i32 for process exit.
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 10-19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&self.as_i32())
    }

    /// Codes 20-29.
    pub fn is_internal_error(self) -> bool {
        self.as_i32() >= 20
    }

    /// Error code name for JSON output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::InputError => "ERR_INPUT",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}
