// Build-time version from Cargo.toml

/// Running version, compared against the remote manifest by the update check.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Package name (from Cargo.toml).
pub const NAME: &str = env!("CARGO_PKG_NAME");
