// Version information for the Fabstir Image Proxy

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Build date
pub const BUILD_DATE: &str = "2025-11-04";

/// Model selectors served by this build
pub const FEATURES: &[&str] = &["gemini_i2i", "ark_t2i", "ark_i2i"];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("Fabstir Image Proxy {} ({})", VERSION_NUMBER, BUILD_DATE)
}
