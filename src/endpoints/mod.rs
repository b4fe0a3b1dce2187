//! Endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! config [networks.<name>]
//!     → registry.rs (enabled list, primary, consensus threshold)
//!     → endpoint.rs (request URL = url + api key)
//!     → chain client (submissions) / consensus verifier (status fan-out)
//! ```
//!
//! # Design Decisions
//! - The registry is read-only during a send
//! - Endpoint `id` is the identity; labels are for display only

pub mod endpoint;
pub mod registry;

pub use endpoint::Endpoint;
pub use registry::{EndpointRegistry, StaticRegistry};
