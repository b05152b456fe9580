//! # raiden-client
//!
//! Client library for the REST API of a [Raiden Network](https://raiden.network)
//! node: address lookup, token network membership, channel lifecycle,
//! transfers, atomic token swaps and event queries.
//!
//! The node owns all channel state and consensus. This crate only validates
//! inputs, builds one HTTP request per call and reshapes the JSON response;
//! there is no retry, caching or client-side state machine. Callers that need
//! retries or backoff are expected to layer them on top.
//!
//! ```no_run
//! use raiden_client::RaidenClient;
//!
//! # async fn run() -> Result<(), raiden_client::Error> {
//! // Quick localhost development
//! let node = RaidenClient::local_node();
//! // Custom hostname
//! let node = RaidenClient::new("http://192.168.1.124:5004", "1")?;
//!
//! let our_address = node.get_address().await?;
//! # Ok(())
//! # }
//! ```

use reqwest::StatusCode;

/// The node client, one method per REST endpoint
mod client;
/// Transport-level DTOs exchanged with the node
mod types;
/// Syntactic input validation applied before any network call
mod validate;

pub use client::{RaidenClient, RequestOptions, DEFAULT_API_VERSION, DEFAULT_RPC_HOST};
pub use types::{Channel, ChannelState, ConnectionConfig, TokenPartner, TokenSwap, Transfer};
pub use validate::{
    validate_address, validate_amount, validate_block_number, validate_identifier,
};

/// Errors surfaced by the client.
///
/// The `Invalid*` variants are raised synchronously, before any request is
/// built; `Request` and `Transport` come back from the network stage. All of
/// them propagate to the caller unmodified.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Expected a valid Ethereum address (got: {0})")]
    InvalidAddress(String),
    #[error("Deposit and transfer amounts must not be zero (amount: {0})")]
    InvalidAmount(u64),
    #[error("Block number must not be negative (block: {0})")]
    InvalidBlockNumber(i64),
    #[error("Transfer identifier must be a non-negative integer (got: {0})")]
    InvalidIdentifier(f64),
    #[error("Node returned HTTP {status}: {body}")]
    Request { status: StatusCode, body: String },
    #[error("Error sending HTTP request: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Error parsing URL: {0}")]
    Url(#[from] url::ParseError),
}
