//! Process exit codes

use std::fmt;

/// Terminal result of a module invocation, reported as the process status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitCode {
    /// Completed successfully
    Ok = 0,

    /// Failed
    Error = 1,

    /// Arguments were rejected before any work was done
    InvalidArguments = 2,
}

impl ExitCode {
    /// Numeric process status
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Check if this is a successful exit
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Ok)
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitCode::Ok => write!(f, "Ok"),
            ExitCode::Error => write!(f, "Error"),
            ExitCode::InvalidArguments => write!(f, "InvalidArguments"),
        }
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code.code())
    }
}
