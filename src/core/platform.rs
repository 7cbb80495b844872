//! Target platform tag.
//!
//! Resolved once at startup and handed to every component as data, so the
//! platform-conditional behaviour (OpenMP, `$ORIGIN` rpath, script suffix
//! stripping, extension suffix) lives in one place.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Environment variable set by MSYS2 shells.
pub const MSYS_MARKER: &str = "MSYSTEM";

/// The platform a build targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetPlatform {
    Linux,
    Darwin,
    /// Native Windows without an MSYS2 environment.
    Windows,
    /// Windows inside an MSYS2 environment.
    Msys,
    /// Any other Unix-like system.
    Other,
}

impl TargetPlatform {
    /// Detect the host platform from the compile-time OS and the MSYS marker.
    pub fn host() -> Self {
        Self::detect(
            std::env::consts::OS,
            std::env::var_os(MSYS_MARKER).is_some(),
        )
    }

    /// Classify an OS name (as in `std::env::consts::OS`).
    pub fn detect(os: &str, msys_marker: bool) -> Self {
        match os {
            "linux" => TargetPlatform::Linux,
            "macos" | "ios" => TargetPlatform::Darwin,
            "windows" if msys_marker => TargetPlatform::Msys,
            "windows" => TargetPlatform::Windows,
            _ => TargetPlatform::Other,
        }
    }

    /// Whether the OpenMP compile/link flag is added.
    pub fn uses_openmp(self) -> bool {
        self != TargetPlatform::Darwin
    }

    /// Whether the module resolves its shared libraries relative to itself.
    pub fn uses_origin_rpath(self) -> bool {
        self == TargetPlatform::Linux
    }

    /// Whether installed scripts lose their `.py` suffix.
    ///
    /// Everything strips except plain Windows, where the suffix is what
    /// associates the script with its interpreter.
    pub fn strips_script_suffix(self) -> bool {
        self != TargetPlatform::Windows
    }

    /// Default filename suffix for the compiled extension module.
    pub fn extension_suffix(self) -> &'static str {
        match self {
            TargetPlatform::Windows | TargetPlatform::Msys => ".pyd",
            _ => ".so",
        }
    }

    /// Separator for search-path environment variables.
    pub fn path_separator(self) -> &'static str {
        match self {
            TargetPlatform::Windows | TargetPlatform::Msys => ";",
            _ => ":",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TargetPlatform::Linux => "linux",
            TargetPlatform::Darwin => "darwin",
            TargetPlatform::Windows => "windows",
            TargetPlatform::Msys => "msys",
            TargetPlatform::Other => "other",
        }
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TargetPlatform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "linux" => Ok(TargetPlatform::Linux),
            "darwin" | "macos" => Ok(TargetPlatform::Darwin),
            "windows" | "win32" => Ok(TargetPlatform::Windows),
            "msys" => Ok(TargetPlatform::Msys),
            "other" => Ok(TargetPlatform::Other),
            _ => Err(format!(
                "unknown platform '{}'; expected linux, darwin, windows, msys or other",
                s
            )),
        }
    }
}
