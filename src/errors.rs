use thiserror::Error;

/// Page region the app expects to find before it can start
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRegion {
    /// Container the channel cards are rendered into
    Cards,
    /// The player modal and its frame container
    PlayerModal,
}

impl std::fmt::Display for PageRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl PageRegion {
    pub fn display_name(&self) -> &'static str {
        match self {
            PageRegion::Cards => "cards container",
            PageRegion::PlayerModal => "player modal",
        }
    }
}

/// Errors raised while loading or presenting the channel directory
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TvError {
    /// The data source answered with a non-success status
    #[error("HTTP {0}")]
    ServerError(u16),

    /// Request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// Body was not a channel list
    #[error("Failed to parse channel list: {0}")]
    ParseError(String),

    /// A region of the page is missing
    #[error("Missing page region: {0}")]
    MissingRegion(PageRegion),

    /// Configuration could not be read or written
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TvError {
    /// Text shown in the error panel when the directory cannot be loaded
    pub fn diagnostics(&self) -> String {
        match self {
            TvError::ServerError(status) => {
                format!("Pelayan membalas dengan status {}. Sila cuba lagi sebentar.", status)
            }
            TvError::Network(_) => {
                "Tiada sambungan ke pelayan. Semak sambungan internet anda.".to_string()
            }
            TvError::ParseError(_) => "Senarai channel tidak sah. Sila cuba lagi.".to_string(),
            TvError::MissingRegion(region) => {
                format!("Bahagian halaman tidak dijumpai ({}). Sila refresh halaman.", region)
            }
            TvError::Config(_) => "Tetapan aplikasi tidak dapat dibaca.".to_string(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl From<std::io::Error> for TvError {
    fn from(err: std::io::Error) -> Self {
        TvError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for TvError {
    fn from(err: serde_json::Error) -> Self {
        TvError::ParseError(err.to_string())
    }
}

impl From<reqwest::Error> for TvError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TvError::ServerError(status.as_u16())
        } else if err.is_decode() {
            TvError::ParseError(err.to_string())
        } else {
            TvError::Network(err.to_string())
        }
    }
}
