//! BioDataFuse Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, logging, and error handling for the BioDataFuse workspace.
//!
//! # Overview
//!
//! - **Error Handling**: the request-level error taxonomy ([`BdfError`]) and its propagation policy
//! - **Logging**: `tracing` subscriber initialisation shared by every binary
//! - **Types**: identifier namespaces and species understood by the cross-reference service
//!
//! # Example
//!
//! ```no_run
//! use bdf_common::{BdfError, IdentifierType, Result};
//!
//! fn parse_type(raw: &str) -> Result<IdentifierType> {
//!     raw.parse()
//! }
//!
//! let ty = parse_type("NCBI Gene").unwrap();
//! assert_eq!(ty.system_code(), "L");
//! ```

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{BdfError, Result};
pub use types::{IdentifierType, Species};
