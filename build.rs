//! Build script for the ADF435x bridge firmware
//!
//! Handles:
//! - Memory layout configuration
//! - Rejecting builds that select both transports

fn main() {
    // Tell Cargo to re-run this if the linker script changes
    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");

    // Link memory.x from project directory
    println!("cargo:rustc-link-search={}", std::env::var("CARGO_MANIFEST_DIR").unwrap());

    // Exactly one transport drives the bus in a firmware image
    let dma = std::env::var_os("CARGO_FEATURE_TRANSPORT_DMA").is_some();
    let bitbang = std::env::var_os("CARGO_FEATURE_TRANSPORT_BITBANG").is_some();
    let embedded = std::env::var_os("CARGO_FEATURE_EMBEDDED").is_some();
    if embedded && dma && bitbang {
        panic!("features `transport-dma` and `transport-bitbang` are mutually exclusive");
    }
}
