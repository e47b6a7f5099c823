//! Post-export verification
//!
//! Every stored artifact is read back through its store and compared with
//! the SHA-256 checksum recorded while exporting.

pub mod checksum;
pub mod report;
pub mod verify;

pub use report::{VerificationFailure, VerificationReport};
pub use verify::Verifier;
