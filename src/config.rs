use std::path::PathBuf;

/// Application-level constants
pub const APP_NAME: &str = "Clarilab";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
pub fn default_log_filter() -> &'static str {
    "clarilab=info"
}

/// Get the application data directory
/// ~/Clarilab/ on all platforms (user-visible, per design requirement)
pub fn app_data_dir() -> PathBuf {
    let home = dirs::home_dir().expect("Cannot determine home directory");
    home.join("Clarilab")
}

/// Get the resources directory (user-editable benchmark catalogs, etc.)
pub fn resources_dir() -> PathBuf {
    app_data_dir().join("resources")
}
