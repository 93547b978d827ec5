//! Initialization for applications using shaderkit.

/// Sets up logging through `env_logger`.
///
/// Calling this more than once, or after another logger was installed, is
/// harmless.
///
/// # Example
///
/// ```no_run
/// shaderkit::init();
/// // RUST_LOG=shaderkit_core=trace shows every replaced line range
/// ```
pub fn init() {
    if env_logger::try_init().is_ok() {
        log::info!("shaderkit {} initialized", env!("CARGO_PKG_VERSION"));
    }
}
