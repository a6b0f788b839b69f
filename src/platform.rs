use std::fmt;

use serde::Serialize;

use crate::exec::Executor;

/// Operating system a script can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    /// Linux (and other Unix-like hosts, which share the Linux tooling).
    Linux,
    /// Microsoft Windows.
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linux => write!(f, "linux"),
            Self::Windows => write!(f, "windows"),
        }
    }
}

impl Os {
    /// The OS this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else {
            // Default to Linux for other Unix-like systems
            Self::Linux
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone)]
pub struct Platform {
    /// Detected operating system.
    pub os: Os,
    /// Whether the process runs as root / Administrator.
    pub elevated: bool,
}

impl Platform {
    /// Detect the current platform, probing privileges through `executor`.
    pub fn detect(executor: &dyn Executor) -> Self {
        let os = Os::current();
        Self {
            os,
            elevated: detect_elevated(os, executor),
        }
    }

    /// Create a platform with explicit values (for testing).
    #[must_use]
    pub const fn new(os: Os, elevated: bool) -> Self {
        Self { os, elevated }
    }

    /// Returns `true` on Linux hosts.
    #[must_use]
    pub fn is_linux(&self) -> bool {
        self.os == Os::Linux
    }

    /// Returns `true` on Windows hosts.
    #[must_use]
    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Hint shown when the process lacks the privileges scripts need.
    #[must_use]
    pub const fn privilege_hint(&self) -> &'static str {
        match self.os {
            Os::Linux => "please run this program as root",
            Os::Windows => "please run this program as administrator",
        }
    }
}

/// Root on Linux is uid 0; on Windows `net session` only succeeds from an
/// elevated prompt.
fn detect_elevated(os: Os, executor: &dyn Executor) -> bool {
    match os {
        Os::Linux => executor
            .run_unchecked("id", &["-u"])
            .is_ok_and(|r| r.success && r.stdout.trim() == "0"),
        Os::Windows => executor
            .run_unchecked("net", &["session"])
            .is_ok_and(|r| r.success),
    }
}
