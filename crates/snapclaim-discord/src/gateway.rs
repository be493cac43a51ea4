// SPDX-FileCopyrightText: 2026 Snapclaim Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway websocket protocol.
//!
//! One call to [`run_connection`] covers a single connection: `HELLO`,
//! `IDENTIFY`, then heartbeats and dispatches until the gateway goes away
//! or the caller cancels. Sessions are never resumed; every connection
//! identifies afresh.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::{self, Message as WsMessage};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::credentials::Credentials;
use crate::handler::ClaimHandler;

/// Default gateway endpoint.
pub const DEFAULT_GATEWAY_URL: &str = "wss://gateway.discord.gg/?v=10&encoding=json";

pub const OP_DISPATCH: u8 = 0;
pub const OP_HEARTBEAT: u8 = 1;
pub const OP_IDENTIFY: u8 = 2;
pub const OP_RECONNECT: u8 = 7;
pub const OP_INVALID_SESSION: u8 = 9;
pub const OP_HELLO: u8 = 10;
pub const OP_HEARTBEAT_ACK: u8 = 11;

/// Close codes after which reconnecting with the same settings cannot work:
/// authentication failed, invalid shard, sharding required, invalid API
/// version, invalid intents, disallowed intents.
const FATAL_CLOSE_CODES: [u16; 6] = [4004, 4010, 4011, 4012, 4013, 4014];

/// "No status received" in the websocket close code registry.
const CLOSE_NO_STATUS: u16 = 1005;

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Why a gateway connection ended.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("websocket failure: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("gateway closed the connection with code {code}: {reason}")]
    Closed { code: u16, reason: String },

    #[error("gateway stream ended")]
    StreamEnded,

    #[error("gateway requested a reconnect")]
    Reconnect,

    #[error("gateway invalidated the session")]
    InvalidSession,

    #[error("heartbeat was not acknowledged")]
    HeartbeatTimeout,

    #[error("malformed gateway payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected gateway opcode {0}")]
    UnexpectedOpcode(u8),
}

impl GatewayError {
    /// Whether retrying with the same token and settings is pointless.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Closed { code, .. } if FATAL_CLOSE_CODES.contains(code))
    }
}

/// An inbound gateway frame. `d` stays raw until the event name is known.
#[derive(Debug, Deserialize)]
pub struct Frame {
    pub op: u8,
    #[serde(default)]
    pub d: serde_json::Value,
    #[serde(default)]
    pub s: Option<u64>,
    #[serde(default)]
    pub t: Option<String>,
}

#[derive(Debug, Serialize)]
struct Outgoing<T> {
    op: u8,
    d: T,
}

#[derive(Debug, Deserialize)]
struct Hello {
    heartbeat_interval: u64,
}

#[derive(Debug, Serialize)]
struct Identify<'a> {
    token: &'a str,
    properties: Properties,
    compress: bool,
}

#[derive(Debug, Serialize)]
struct Properties {
    os: &'static str,
    browser: &'static str,
    device: &'static str,
}

/// Encodes the `IDENTIFY` payload.
pub fn identify_payload(credentials: &Credentials) -> Result<String, GatewayError> {
    let payload = Outgoing {
        op: OP_IDENTIFY,
        d: Identify {
            token: credentials.authorization(),
            properties: Properties {
                os: std::env::consts::OS,
                browser: "snapclaim",
                device: "snapclaim",
            },
            compress: false,
        },
    };
    Ok(serde_json::to_string(&payload)?)
}

/// Encodes a heartbeat carrying the last seen sequence number.
pub fn heartbeat_payload(sequence: Option<u64>) -> Result<String, GatewayError> {
    Ok(serde_json::to_string(&Outgoing {
        op: OP_HEARTBEAT,
        d: sequence,
    })?)
}

fn closed(frame: Option<CloseFrame>) -> GatewayError {
    match frame {
        Some(frame) => GatewayError::Closed {
            code: u16::from(frame.code),
            reason: frame.reason.to_string(),
        },
        None => GatewayError::Closed {
            code: CLOSE_NO_STATUS,
            reason: String::new(),
        },
    }
}

/// Reads until the next JSON frame. Pings and binary messages are skipped.
async fn next_frame(socket: &mut Socket) -> Result<Frame, GatewayError> {
    loop {
        let message = socket.next().await.ok_or(GatewayError::StreamEnded)??;
        match message {
            WsMessage::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            WsMessage::Close(frame) => return Err(closed(frame)),
            _ => {}
        }
    }
}

async fn send_text(socket: &mut Socket, text: String) -> Result<(), GatewayError> {
    socket.send(WsMessage::text(text)).await?;
    Ok(())
}

/// Runs one connection to `url`, feeding dispatches to `handler`.
///
/// Returns `Ok` only when `cancel` fires.
pub async fn run_connection(
    url: &str,
    credentials: &Credentials,
    handler: &ClaimHandler,
    cancel: &CancellationToken,
) -> Result<(), GatewayError> {
    let (mut socket, _) = tokio::select! {
        connected = tokio_tungstenite::connect_async(url) => connected?,
        _ = cancel.cancelled() => return Ok(()),
    };

    let hello = tokio::select! {
        frame = next_frame(&mut socket) => frame?,
        _ = cancel.cancelled() => return Ok(()),
    };
    if hello.op != OP_HELLO {
        return Err(GatewayError::UnexpectedOpcode(hello.op));
    }
    let Hello { heartbeat_interval } = serde_json::from_value(hello.d)?;
    debug!(heartbeat_interval, "gateway hello received");

    send_text(&mut socket, identify_payload(credentials)?).await?;

    let mut heartbeat = tokio::time::interval(Duration::from_millis(heartbeat_interval.max(1)));
    // Skip the first immediate tick.
    heartbeat.tick().await;

    let mut sequence: Option<u64> = None;
    let mut acked = true;

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                if let Err(e) = socket.close(None).await {
                    debug!(error = %e, "gateway close failed");
                }
                return Ok(());
            }
            _ = heartbeat.tick() => {
                if !acked {
                    return Err(GatewayError::HeartbeatTimeout);
                }
                acked = false;
                send_text(&mut socket, heartbeat_payload(sequence)?).await?;
            }
            frame = next_frame(&mut socket) => {
                let frame = frame?;
                if frame.s.is_some() {
                    sequence = frame.s;
                }
                match frame.op {
                    OP_DISPATCH => {
                        if let Some(event) = frame.t.as_deref() {
                            handler.dispatch(event, frame.d);
                        }
                    }
                    OP_HEARTBEAT => send_text(&mut socket, heartbeat_payload(sequence)?).await?,
                    OP_HEARTBEAT_ACK => acked = true,
                    OP_RECONNECT => return Err(GatewayError::Reconnect),
                    OP_INVALID_SESSION => return Err(GatewayError::InvalidSession),
                    op => debug!(op, "ignoring gateway opcode"),
                }
            }
        }
    }
}
