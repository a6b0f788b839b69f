//! Command: print version information.

/// Version string, overridable at build time with `OSHARDEN_VERSION`.
#[must_use]
pub fn version() -> &'static str {
    option_env!("OSHARDEN_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the osharden version to stdout.
#[allow(clippy::print_stdout)]
pub fn run() {
    println!("osharden {}", version());
}
