//! ClaimRoot Common Types
//!
//! This crate contains shared types used across the ClaimRoot workspace,
//! including addresses and identifiers, vault levels, the error taxonomy,
//! and the clock abstraction used for voting deadlines.

pub mod identifiers;
pub mod vault;
pub mod status;
pub mod error;
pub mod time;

pub use identifiers::*;
pub use vault::*;
pub use status::*;
pub use error::*;
pub use time::*;
