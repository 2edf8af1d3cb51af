//! Wayfarer library exports for testing

pub mod backend;
pub mod core;
pub mod store;

#[cfg(test)]
pub mod test_support;
