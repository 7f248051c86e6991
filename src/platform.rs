#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOS,
    Linux,
    Windows,
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::MacOS => "MacOS",
            Platform::Linux => "Linux",
            Platform::Windows => "Windows",
            Platform::Unknown => "Unknown",
        }
    }
}

pub fn detect() -> Platform {
    match std::env::consts::OS {
        "macos" => Platform::MacOS,
        "linux" => Platform::Linux,
        "windows" => Platform::Windows,
        _ => Platform::Unknown,
    }
}

/// Returns true when running inside a WSL2 environment.
/// WSL_INTEROP is set exclusively by WSL2 (not WSL1) and points to the
/// interop socket.
pub fn is_wsl() -> bool {
    std::env::var_os("WSL_INTEROP").is_some()
}
