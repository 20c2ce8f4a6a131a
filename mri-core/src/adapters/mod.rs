//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - reqwest blocking client for the RestApi port
//! - mock MRI server for end-to-end tests

pub mod rest;

#[cfg(test)]
pub mod mri_mock;
