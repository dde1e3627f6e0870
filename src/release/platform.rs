//! Server operating system, as understood by the release endpoint.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::core::InstallerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Mac,
}

impl Platform {
    /// Platform this binary was built for. Unknown Unix flavours fall back to Linux.
    #[must_use]
    pub const fn detect() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::Mac
        } else {
            Self::Linux
        }
    }

    /// Value of the `os` query parameter.
    #[must_use]
    pub const fn as_query(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Windows => "windows",
            Self::Mac => "mac",
        }
    }
}

impl Default for Platform {
    fn default() -> Self {
        Self::detect()
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

impl FromStr for Platform {
    type Err = InstallerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linux" => Ok(Self::Linux),
            "windows" | "win" | "win32" => Ok(Self::Windows),
            "mac" | "macos" | "darwin" | "osx" => Ok(Self::Mac),
            _ => Err(InstallerError::InvalidPlatform {
                value: s.to_string(),
            }),
        }
    }
}
