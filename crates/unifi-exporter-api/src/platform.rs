/// Which kind of controller sits behind the configured URL.
///
/// UniFi OS consoles (UDM, UCG, Cloud Key Gen2+) proxy the network
/// application under `/proxy/network` and authenticate through
/// `/api/auth/*`. A self-hosted Network Application serves everything
/// from the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerPlatform {
    UnifiOs,
    ClassicController,
}

impl ControllerPlatform {
    /// Prepended to every `/api/...` path.
    pub fn api_prefix(self) -> &'static str {
        match self {
            Self::UnifiOs => "/proxy/network",
            Self::ClassicController => "",
        }
    }

    pub fn login_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/login",
            Self::ClassicController => "/api/login",
        }
    }

    pub fn logout_path(self) -> &'static str {
        match self {
            Self::UnifiOs => "/api/auth/logout",
            Self::ClassicController => "/api/logout",
        }
    }
}
