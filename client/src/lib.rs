//! I/O boundary of the kakeibo tracker: the HTTP record-store client
//! talking to the ledger endpoint, and the on-disk snapshot cache that
//! lets the dashboard render before the first round-trip completes.

pub mod api;
pub mod cache;
pub mod error;

pub use api::{NewFixedCost, NewTransaction, RecordStore, RecordStoreClient};
pub use cache::SnapshotCache;
pub use error::ClientError;
