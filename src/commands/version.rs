//! Version command

/// Run the version command.
pub fn run() {
    println!("vessel {}", env!("CARGO_PKG_VERSION"));
}
