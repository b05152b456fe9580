use serde::{Deserialize, Serialize};

/// Lifecycle state of a payment channel.
///
/// Doubles as the PATCH payload for `close_channel` and `settle_channel`;
/// the wire form is the lowercase state name.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Open,
    Closed,
    Settled,
}

/// A bilateral payment channel as reported by the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub channel_address: String,
    pub partner_address: String,
    pub token_address: String,
    pub balance: u64,
    pub state: ChannelState,
    /// Blocks to wait for settlement after closing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_timeout: Option<u64>,
    /// Blocks within which a mediated transfer secret must be revealed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reveal_timeout: Option<u64>,
}

/// A partner we have an unsettled channel with on some token network, with
/// the node's channel URI already reduced to the channel address.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TokenPartner {
    pub partner_address: String,
    pub channel_address: String,
}

/// A transfer as reported back by the node after `send_tokens`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub initiator_address: String,
    pub target_address: String,
    pub token_address: String,
    pub amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<u64>,
}

/// Terms of an atomic token swap, expressed from the maker's point of view.
///
/// The same value is used on both sides of the swap: the maker submits it via
/// `make_token_swap`, the taker accepts it via `take_token_swap` under the
/// same identifier, and the client inverts the sending/receiving pairs for
/// the taker role.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokenSwap {
    /// Identifier agreed between maker and taker, unique per swap.
    pub identifier: u64,
    pub maker_token: String,
    pub maker_amount: u64,
    pub taker_token: String,
    pub taker_amount: u64,
}

/// Parameters for joining a token network.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionConfig {
    /// Number of channels to open when joining.
    pub initial_channel_target: u64,
    /// Fraction of the deposit kept in reserve for channels opened towards us.
    pub joinable_funds_target: f64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        ConnectionConfig {
            initial_channel_target: 3,
            joinable_funds_target: 0.4,
        }
    }
}
