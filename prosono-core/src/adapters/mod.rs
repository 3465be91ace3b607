//! Adapter implementations
//!
//! Concrete implementations of the ports plus the HTTP client for the
//! ProSono backend.

pub mod api;
pub mod file_store;
pub mod mock_api;
