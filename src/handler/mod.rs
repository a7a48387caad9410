//! Request handler module
//!
//! Routes requests to the console page, the command endpoint and the health
//! probes.

pub mod router;
pub mod run;

// Re-export main entry point
pub use router::handle_request;
