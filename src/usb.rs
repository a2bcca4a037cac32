//! USB Subsystem
//!
//! Vendor-specific device presented to the evaluation host tool:
//! - Device identity and descriptors
//! - Vendor request handler feeding the bridge

pub mod descriptor;
pub mod vendor;
