pub mod toml_loader;

use anyhow::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::platform::Os;

/// Environment variable naming the configuration file.
pub const CONFIG_ENV: &str = "OSHARDEN_CONFIG";

/// Tool configuration. Every field has a built-in default.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory whose children are user home directories.
    pub home_root: Option<PathBuf>,
    /// Packages offered for removal by `rmprograms`.
    pub unauthorized_programs: Vec<String>,
    /// File extensions reported by `media-search` (without the dot).
    pub media_extensions: Vec<String>,
    /// Default answers for the password policy prompts.
    pub password: PasswordDefaults,
    /// Extra kernel parameters merged into the `syscfg` directive set.
    pub sysctl: BTreeMap<String, String>,
    /// Overrides for the configuration files scripts patch.
    pub paths: Paths,
}

/// Defaults offered by `pwd-setup`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordDefaults {
    /// `PASS_MIN_DAYS` in login.defs.
    pub min_days: u32,
    /// `PASS_MAX_DAYS` in login.defs.
    pub max_days: u32,
    /// `ENCRYPT_METHOD` in login.defs.
    pub encrypt_method: String,
    /// `LOGIN_RETRIES` in login.defs.
    pub login_retries: u32,
    /// `minlen` in pwquality.conf.
    pub min_length: u32,
}

impl Default for PasswordDefaults {
    fn default() -> Self {
        Self {
            min_days: 7,
            max_days: 30,
            encrypt_method: "SHA512".to_string(),
            login_retries: 3,
            min_length: 8,
        }
    }
}

/// Locations of the system files scripts read and patch.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Paths {
    /// Kernel parameters.
    pub sysctl: PathBuf,
    /// Shadow password suite configuration.
    pub login_defs: PathBuf,
    /// Password quality requirements.
    pub pwquality: PathBuf,
    /// OpenSSH daemon configuration.
    pub sshd_config: PathBuf,
    /// vsftpd configuration.
    pub vsftpd: PathBuf,
    /// Static host table.
    pub hosts: PathBuf,
    /// Resolver configuration.
    pub resolv: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            sysctl: "/etc/sysctl.conf".into(),
            login_defs: "/etc/login.defs".into(),
            pwquality: "/etc/security/pwquality.conf".into(),
            sshd_config: "/etc/ssh/sshd_config".into(),
            vsftpd: "/etc/vsftpd.conf".into(),
            hosts: "/etc/hosts".into(),
            resolv: "/etc/resolv.conf".into(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            home_root: None,
            unauthorized_programs: [
                "wireshark",
                "ophcrack",
                "john",
                "hydra",
                "nmap",
                "snort",
                "netcat",
            ]
            .map(String::from)
            .to_vec(),
            media_extensions: [
                "mp3", "mp4", "txt", "png", "jpg", "jpeg", "gif", "wav", "mov", "avi", "wmv",
                "flv", "m4a", "m4v", "webm", "mkv", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
                "pdf",
            ]
            .map(String::from)
            .to_vec(),
            password: PasswordDefaults::default(),
            sysctl: BTreeMap::new(),
            paths: Paths::default(),
        }
    }
}

impl Config {
    /// Load the configuration.
    ///
    /// `explicit` (from `--config`) wins over `$OSHARDEN_CONFIG`; with
    /// neither, or when the named file does not exist, the built-in defaults
    /// are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let from_env = std::env::var_os(CONFIG_ENV).map(PathBuf::from);
        match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => toml_loader::load_config(&path),
            None => Ok(Self::default()),
        }
    }

    /// Directory holding user homes for `os`.
    #[must_use]
    pub fn home_root(&self, os: Os) -> PathBuf {
        self.home_root.clone().unwrap_or_else(|| match os {
            Os::Linux => PathBuf::from("/home"),
            Os::Windows => PathBuf::from(r"C:\Users"),
        })
    }
}

/// Per-user cache directory for logs and backups.
///
/// `$XDG_CACHE_HOME/osharden`, falling back to `~/.cache/osharden`
/// (`%LOCALAPPDATA%\osharden` on Windows).
#[must_use]
pub fn cache_dir() -> PathBuf {
    if let Some(xdg) = std::env::var_os("XDG_CACHE_HOME").filter(|v| !v.is_empty()) {
        return PathBuf::from(xdg).join("osharden");
    }
    if cfg!(windows)
        && let Some(local) = std::env::var_os("LOCALAPPDATA")
    {
        return PathBuf::from(local).join("osharden");
    }
    let home = std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map_or_else(std::env::temp_dir, PathBuf::from);
    home.join(".cache").join("osharden")
}
