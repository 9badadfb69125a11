//! Optional extensions to the base pan controller.

#[cfg(feature = "extension_toggle_key")]
pub mod toggle_key;
