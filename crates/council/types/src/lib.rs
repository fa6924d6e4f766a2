//! Council Domain Types
//!
//! This crate defines the domain types shared by the council accounting
//! core and its read-model indexer.
//!
//! # Key Concepts
//!
//! - **Council**: a fixed set of members who split a continuously streamed
//!   budget across grantees, weighted by voting power.
//! - **Member**: an account holding non-transferable voting power.
//! - **Grantee**: an eligible recipient, identified by a council-scoped
//!   composite key that is regenerated when the account is re-added.
//! - **Allocation**: a member's current split of their voting power across
//!   grantees.
//! - **Event log**: every state change is published as a [`CouncilEvent`]
//!   stamped with an [`EventPosition`].
//!
//! # Architecture
//!
//! This is a pure types crate. All types implement `Clone`, `Debug`,
//! `Serialize`, `Deserialize`. Identities use the newtype pattern and
//! implement `Display`.

#![deny(unsafe_code)]

mod config;
mod errors;
mod events;
mod ids;
mod limits;
mod records;
mod roles;

pub use config::*;
pub use errors::*;
pub use events::*;
pub use ids::*;
pub use limits::*;
pub use records::*;
pub use roles::*;
