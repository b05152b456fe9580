use crate::types::{Channel, ChannelState, ConnectionConfig, TokenPartner, TokenSwap, Transfer};
use crate::validate::{validate_address, validate_amount, validate_block_number};
use crate::Error;
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};
use url::Url;

/// Endpoint of a node running on the local machine.
pub const DEFAULT_RPC_HOST: &str = "http://127.0.0.1:5001/";
/// REST API version this client speaks.
pub const DEFAULT_API_VERSION: &str = "1";

/// Per-request overrides merged over the computed defaults.
///
/// The typed methods on [`RaidenClient`] cover the node's documented API;
/// [`RaidenClient::request`] plus these options is the escape hatch for
/// anything else (extra headers, raw bodies, endpoints newer than this
/// client).
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// JSON body to send; `None` sends no body.
    pub body: Option<serde_json::Value>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Headers merged over the defaults; may override `Content-Type`.
    pub headers: HeaderMap,
}

/// An immutable binding to one Raiden node's REST endpoint.
///
/// Holds only the resolved base URL and a shared connection pool, so cloning
/// is cheap and a single instance can serve concurrent calls. Every method
/// issues at most one request; timeouts and cancellation are left to the
/// transport's defaults.
#[derive(Clone)]
pub struct RaidenClient {
    http: Client,
    base_url: Url,
}

impl RaidenClient {
    /// Creates a client for the node at `rpc_host`, speaking `api_version`.
    ///
    /// The two are combined into a `{host}/api/{version}` base URL that
    /// prefixes every request.
    pub fn new(rpc_host: &str, api_version: &str) -> Result<Self, Error> {
        let base_url = Url::parse(rpc_host)?.join(&format!("/api/{}", api_version))?;
        Ok(RaidenClient {
            http: Client::new(),
            base_url,
        })
    }

    /// Creates a client for a node on the default localhost endpoint.
    pub fn local_node() -> Self {
        RaidenClient::new(DEFAULT_RPC_HOST, DEFAULT_API_VERSION)
            .expect("default node URL is valid")
    }

    /// The resolved `{host}/api/{version}` prefix used for every request.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Performs a raw API request with `options` merged over the defaults
    /// and returns the response JSON unshaped.
    ///
    /// One attempt, no retry; a non-2xx response becomes [`Error::Request`]
    /// with the response body attached, a connection-level failure becomes
    /// [`Error::Transport`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<serde_json::Value, Error> {
        self.request_json(method, path, options).await
    }

    async fn request_json<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, Error> {
        let response = self.dispatch(method, path, options).await?;
        Ok(response.json().await?)
    }

    async fn dispatch(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Response, Error> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Sending {} {}", method, url);
        let mut request = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, "application/json")
            .headers(options.headers);
        if !options.query.is_empty() {
            request = request.query(&options.query);
        }
        if let Some(body) = &options.body {
            request = request.json(body);
        }
        let response = request.send().await?;
        let status = response.status();
        trace!("Node responded to {} with HTTP {}", url, status);
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Request { status, body });
        }
        Ok(response)
    }

    /// Retrieves the Ethereum address the node works with.
    pub async fn get_address(&self) -> Result<String, Error> {
        #[derive(Deserialize)]
        struct AddressResponse {
            our_address: String,
        }
        let response: AddressResponse = self
            .request_json(Method::GET, "/address", RequestOptions::default())
            .await?;
        Ok(response.our_address)
    }

    /// Registers `token` by asking the node to deploy a channel manager for
    /// it. Returns the manager's address.
    pub async fn register_token(&self, token: &str) -> Result<String, Error> {
        validate_address(token)?;
        #[derive(Deserialize)]
        struct RegisterResponse {
            channel_manager_address: String,
        }
        let response: RegisterResponse = self
            .request_json(
                Method::PUT,
                &format!("/tokens/{}", token),
                RequestOptions::default(),
            )
            .await?;
        Ok(response.channel_manager_address)
    }

    /// Lists the addresses of all registered tokens.
    pub async fn get_registered_tokens(&self) -> Result<Vec<String>, Error> {
        self.request_json(Method::GET, "/tokens", RequestOptions::default())
            .await
    }

    /// Lists the partners we have unsettled channels with on the `token`
    /// network.
    ///
    /// The node reports each channel as an API URI; only its final path
    /// segment, the channel address, is kept.
    pub async fn get_token_partners(&self, token: &str) -> Result<Vec<TokenPartner>, Error> {
        validate_address(token)?;
        #[derive(Deserialize)]
        struct PartnerResponse {
            partner_address: String,
            channel: String,
        }
        let partners: Vec<PartnerResponse> = self
            .request_json(
                Method::GET,
                &format!("/tokens/{}/partners", token),
                RequestOptions::default(),
            )
            .await?;
        Ok(partners
            .into_iter()
            .map(|partner| TokenPartner {
                partner_address: partner.partner_address,
                channel_address: partner
                    .channel
                    .rsplit('/')
                    .next()
                    .unwrap_or_default()
                    .to_string(),
            })
            .collect())
    }

    /// Queries one of our channels.
    pub async fn get_channel(&self, channel: &str) -> Result<Channel, Error> {
        validate_address(channel)?;
        self.request_json(
            Method::GET,
            &format!("/channels/{}", channel),
            RequestOptions::default(),
        )
        .await
    }

    /// Lists all of our unsettled channels.
    pub async fn get_all_channels(&self) -> Result<Vec<Channel>, Error> {
        self.request_json(Method::GET, "/channels", RequestOptions::default())
            .await
    }

    /// Opens a channel with `partner` for `token`, depositing `balance`.
    ///
    /// `settle_timeout` and `reveal_timeout` are block counts governing the
    /// closure safety window. When `None`, the keys are left out of the
    /// request entirely and the node's defaults apply.
    pub async fn open_channel(
        &self,
        partner: &str,
        token: &str,
        balance: u64,
        settle_timeout: Option<u64>,
        reveal_timeout: Option<u64>,
    ) -> Result<Channel, Error> {
        validate_address(partner)?;
        validate_address(token)?;
        #[derive(Serialize)]
        struct OpenChannelBody<'a> {
            partner_address: &'a str,
            token_address: &'a str,
            balance: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            settle_timeout: Option<u64>,
            #[serde(skip_serializing_if = "Option::is_none")]
            reveal_timeout: Option<u64>,
        }
        self.request_json(
            Method::PUT,
            "/channels",
            RequestOptions {
                body: Some(json!(OpenChannelBody {
                    partner_address: partner,
                    token_address: token,
                    balance,
                    settle_timeout,
                    reveal_timeout,
                })),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// Closes an open channel.
    pub async fn close_channel(&self, channel: &str) -> Result<Channel, Error> {
        validate_address(channel)?;
        self.patch_channel_state(channel, ChannelState::Closed).await
    }

    /// Settles a closed channel once its settlement window has elapsed.
    pub async fn settle_channel(&self, channel: &str) -> Result<Channel, Error> {
        validate_address(channel)?;
        self.patch_channel_state(channel, ChannelState::Settled).await
    }

    async fn patch_channel_state(
        &self,
        channel: &str,
        state: ChannelState,
    ) -> Result<Channel, Error> {
        self.request_json(
            Method::PATCH,
            &format!("/channels/{}", channel),
            RequestOptions {
                body: Some(json!({ "state": state })),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// Deposits `amount` more tokens into a channel. The token was fixed
    /// when the channel was created.
    pub async fn deposit(&self, channel: &str, amount: u64) -> Result<Channel, Error> {
        validate_address(channel)?;
        validate_amount(amount)?;
        self.request_json(
            Method::PATCH,
            &format!("/channels/{}", channel),
            RequestOptions {
                body: Some(json!({ "balance": amount })),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// Joins the `token` network, depositing `funds` and opening channels
    /// according to `config`.
    pub async fn join_network(
        &self,
        token: &str,
        funds: u64,
        config: ConnectionConfig,
    ) -> Result<(), Error> {
        validate_address(token)?;
        validate_amount(funds)?;
        self.dispatch(
            Method::PUT,
            &format!("/connections/{}", token),
            RequestOptions {
                body: Some(json!({
                    "funds": funds,
                    "initial_channel_target": config.initial_channel_target,
                    "joinable_funds_target": config.joinable_funds_target,
                })),
                ..RequestOptions::default()
            },
        )
        .await?;
        Ok(())
    }

    /// Closes and settles our channels on the `token` network. With
    /// `only_receiving_channels` set (the node's default behaviour) only
    /// channels that have received transfers are torn down.
    ///
    /// Returns the addresses of the closed channels; the node replies only
    /// once the closing and settling blockchain calls have completed.
    pub async fn leave_network(
        &self,
        token: &str,
        only_receiving_channels: bool,
    ) -> Result<Vec<String>, Error> {
        validate_address(token)?;
        self.request_json(
            Method::DELETE,
            &format!("/connections/{}", token),
            RequestOptions {
                body: Some(json!({ "only_receiving_channels": only_receiving_channels })),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// Transfers `amount` of `token` to `recipient`.
    ///
    /// The `identifier` is advisory: the node attaches it to the transfer
    /// and echoes it back in events, but the client tracks nothing.
    pub async fn send_tokens(
        &self,
        token: &str,
        recipient: &str,
        amount: u64,
        identifier: Option<u64>,
    ) -> Result<Transfer, Error> {
        validate_address(token)?;
        validate_address(recipient)?;
        validate_amount(amount)?;
        #[derive(Serialize)]
        struct TransferBody {
            amount: u64,
            #[serde(skip_serializing_if = "Option::is_none")]
            identifier: Option<u64>,
        }
        self.request_json(
            Method::POST,
            &format!("/transfers/{}/{}", token, recipient),
            RequestOptions {
                body: Some(json!(TransferBody { amount, identifier })),
                ..RequestOptions::default()
            },
        )
        .await
    }

    /// Offers `swap` to the taker at `taker`: the maker's token/amount pair
    /// is sent, the taker's pair is received.
    pub async fn make_token_swap(&self, taker: &str, swap: &TokenSwap) -> Result<(), Error> {
        validate_address(taker)?;
        let body = token_swap_body(swap, SwapRole::Maker)?;
        self.dispatch(
            Method::PUT,
            &format!("/token_swaps/{}/{}", taker, swap.identifier),
            RequestOptions {
                body: Some(body),
                ..RequestOptions::default()
            },
        )
        .await?;
        Ok(())
    }

    /// Accepts the swap previously offered by `maker` under the same
    /// identifier, with the sending and receiving pairs inverted.
    pub async fn take_token_swap(&self, maker: &str, swap: &TokenSwap) -> Result<(), Error> {
        validate_address(maker)?;
        let body = token_swap_body(swap, SwapRole::Taker)?;
        self.dispatch(
            Method::PUT,
            &format!("/token_swaps/{}/{}", maker, swap.identifier),
            RequestOptions {
                body: Some(body),
                ..RequestOptions::default()
            },
        )
        .await?;
        Ok(())
    }

    /// Queries registry-level network events.
    pub async fn get_network_events(
        &self,
        from_block: i64,
    ) -> Result<Vec<serde_json::Value>, Error> {
        self.get_events("/network", from_block).await
    }

    /// Queries channel-creation events on the `token` network.
    pub async fn get_token_events(
        &self,
        token: &str,
        from_block: i64,
    ) -> Result<Vec<serde_json::Value>, Error> {
        validate_address(token)?;
        self.get_events(&format!("/tokens/{}", token), from_block).await
    }

    /// Queries events tied to one channel.
    pub async fn get_channel_events(
        &self,
        channel: &str,
        from_block: i64,
    ) -> Result<Vec<serde_json::Value>, Error> {
        validate_address(channel)?;
        self.get_events(&format!("/channels/{}", channel), from_block)
            .await
    }

    // A from_block of 0 means "from genesis" and is not sent at all.
    async fn get_events(
        &self,
        path: &str,
        from_block: i64,
    ) -> Result<Vec<serde_json::Value>, Error> {
        validate_block_number(from_block)?;
        let mut options = RequestOptions::default();
        if from_block > 0 {
            options
                .query
                .push(("from_block".to_string(), from_block.to_string()));
        }
        self.request_json(Method::GET, &format!("/events{}", path), options)
            .await
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum SwapRole {
    Maker,
    Taker,
}

fn token_swap_body(swap: &TokenSwap, role: SwapRole) -> Result<serde_json::Value, Error> {
    validate_address(&swap.maker_token)?;
    validate_address(&swap.taker_token)?;
    #[derive(Serialize)]
    struct TokenSwapBody<'a> {
        role: SwapRole,
        sending_token: &'a str,
        sending_amount: u64,
        receiving_token: &'a str,
        receiving_amount: u64,
    }
    let body = match role {
        SwapRole::Maker => TokenSwapBody {
            role,
            sending_token: &swap.maker_token,
            sending_amount: swap.maker_amount,
            receiving_token: &swap.taker_token,
            receiving_amount: swap.taker_amount,
        },
        SwapRole::Taker => TokenSwapBody {
            role,
            sending_token: &swap.taker_token,
            sending_amount: swap.taker_amount,
            receiving_token: &swap.maker_token,
            receiving_amount: swap.maker_amount,
        },
    };
    Ok(json!(body))
}
