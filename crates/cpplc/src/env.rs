//! Environment variable name constants and accessors
//!
//! All environment variables read by the compiler are listed here; the rest
//! of the crate goes through these functions rather than `std::env::var()`.

/// Environment variable names
pub mod names {
    /// Name given to the emitted IR module: `CPPL_MODULE_NAME`
    pub const MODULE_NAME: &str = "CPPL_MODULE_NAME";

    /// Target pointer width in bits (32 or 64): `CPPL_POINTER_WIDTH`
    pub const POINTER_WIDTH: &str = "CPPL_POINTER_WIDTH";

    /// `abort` or `collect`: `CPPL_ERROR_MODE`
    pub const ERROR_MODE: &str = "CPPL_ERROR_MODE";

    /// Set to "0" to skip per-function IR verification: `CPPL_VERIFY`
    pub const VERIFY: &str = "CPPL_VERIFY";
}

/// Get the module name override. Returns `None` if not set.
pub fn get_module_name() -> Option<String> {
    std::env::var(names::MODULE_NAME).ok()
}

/// Get the raw pointer width override. Returns `None` if not set.
pub fn get_pointer_width() -> Option<String> {
    std::env::var(names::POINTER_WIDTH).ok()
}

/// Get the raw error mode override. Returns `None` if not set.
pub fn get_error_mode() -> Option<String> {
    std::env::var(names::ERROR_MODE).ok()
}

/// Check whether per-function verification was switched on or off.
/// Returns `None` if not set.
pub fn get_verify() -> Option<bool> {
    std::env::var(names::VERIFY)
        .ok()
        .map(|v| !matches!(v.as_str(), "0" | "false" | "off"))
}
