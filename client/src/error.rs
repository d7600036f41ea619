//! Error taxonomy for record-store calls.
//!
//! Each variant maps to one recovery policy: transport and HTTP
//! failures get a retry affordance in the UI, parse failures point at
//! a broken upstream contract, and rejections carry the server's
//! message verbatim. The client never retries on its own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network unreachable, connection reset, timeout.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The endpoint answered with a non-success status.
    #[error("ledger service returned HTTP {status}")]
    Http { status: u16 },

    /// The body was not the JSON shape the contract promises.
    #[error("failed to parse ledger response: {0}")]
    Parse(String),

    /// The server processed the mutation and reported failure.
    #[error("mutation rejected: {0}")]
    Rejected(String),
}
