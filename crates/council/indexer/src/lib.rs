//! Council Read-Model Indexer
//!
//! Mirrors council event logs into queryable entities: councils, members,
//! grantees (one entity per generation) and allocations. Delivery is
//! at-least-once; the [`Indexer`] orders each batch by position, skips
//! events it has already applied and keeps a cursor. Events that arrive
//! behind the cursor are replayed in order from a bounded history.
//!
//! ```rust
//! use council_indexer::Indexer;
//! use council_types::{Address, CouncilEvent, CouncilId, EventPosition, LoggedEvent, TxHash};
//!
//! let council = CouncilId::new(Address::from_low_u64(0xc0));
//! let event = LoggedEvent {
//!     council,
//!     tx_hash: TxHash::derive(b"tx"),
//!     position: EventPosition::new(1_700_000_000, 1, 0),
//!     event: CouncilEvent::MemberAdded {
//!         account: Address::from_low_u64(10),
//!         voting_power: 100,
//!     },
//! };
//!
//! let mut indexer = Indexer::new();
//! indexer.ingest(vec![event.clone(), event]);
//! assert_eq!(indexer.model().members(&council).len(), 1);
//! ```

#![deny(unsafe_code)]

mod handlers;
pub mod indexer;
pub mod model;
pub mod service;
pub mod store;

pub use indexer::{EventKey, IngestReport, Indexer, DEFAULT_REPLAY_WINDOW};
pub use model::{
    AllocationEntity, AllocationId, CouncilEntity, CouncilMemberEntity, GranteeEntity,
    ReadModelSnapshot,
};
pub use service::{IndexerHandle, IndexerService};
pub use store::ReadModel;
