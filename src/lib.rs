#![doc = include_str!("../README.md")]

pub mod analytics;

#[cfg(not(target_arch = "wasm32"))]
pub mod blocking;

pub mod platform;

pub mod util;

#[cfg(all(test, not(target_arch = "wasm32")))]
pub mod test_support;
