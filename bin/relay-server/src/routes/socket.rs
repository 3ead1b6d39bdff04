//! Realtime channel (`GET /socket`).
//!
//! Each connection is split into a reader, which handles client frames in
//! order, and a writer task, which merges direct replies with the
//! connection's hub feed. The history replay is written before the writer starts,
//! so `initialData` is always the first frame a client sees.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use futures::{Sink, SinkExt, StreamExt};
use relay_types::{ClientEvent, MessageRecord, ServerEvent};
use tokio::sync::mpsc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use uuid::Uuid;

use crate::entities::MessageStore;
use crate::handlers::{ChatHub, Subscription};
use crate::state::AppState;

/// Register the realtime channel route.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/socket", get(socket_upgrade))
}

pub async fn socket_upgrade(State(state): State<Arc<AppState>>, ws: WebSocketUpgrade) -> Response {
    let hub = Arc::clone(&state.hub);
    ws.on_upgrade(move |socket| {
        let client = Uuid::new_v4();
        serve_client(socket, hub).instrument(info_span!("socket", client = %client))
    })
}

/// Drive one connection until the client goes away.
async fn serve_client<S: MessageStore>(socket: WebSocket, hub: Arc<ChatHub<S>>) {
    let (mut sink, mut stream) = socket.split();

    // Subscribe before reading history so nothing published in between is lost.
    let Subscription { id, feed } = hub.subscribe();
    info!(connections = hub.connections(), "client connected");

    let mut replayed_up_to = None;
    match hub.history().await {
        Ok(records) => {
            replayed_up_to = records.last().map(|r| r.seq);
            if send_event(&mut sink, &ServerEvent::InitialData(records)).await.is_err() {
                debug!("client left before initial data was delivered");
                hub.unsubscribe(id);
                return;
            }
        }
        Err(e) => error!(error = %e, "failed to load message history"),
    }

    let (direct_tx, direct_rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(
        write_loop(sink, feed, direct_rx, replayed_up_to).in_current_span(),
    );

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => handle_text(&hub, &direct_tx, text.as_str()).await,
            Ok(Message::Binary(bytes)) => debug!(len = bytes.len(), "ignoring binary frame"),
            Ok(Message::Close(_)) => break,
            // Pings are answered by the transport.
            Ok(_) => {}
            Err(e) => {
                debug!(error = %e, "socket read failed");
                break;
            }
        }
    }

    writer.abort();
    hub.unsubscribe(id);
    info!(connections = hub.connections(), "client disconnected");
}

/// Handle one client text frame.
async fn handle_text<S: MessageStore>(
    hub: &ChatHub<S>,
    direct_tx: &mpsc::UnboundedSender<ServerEvent>,
    text: &str,
) {
    match ClientEvent::parse(text) {
        Ok(ClientEvent::NewMessage(msg)) => {
            info!(username = %msg.username, len = msg.message.len(), "new message received");
            match hub.publish(msg).await {
                Ok(record) => debug!(id = %record.id, "message broadcast"),
                Err(e) => error!(error = %e, "failed to persist message"),
            }
        }
        Err(e) => {
            warn!(error = %e, "rejected client frame");
            let _ = direct_tx.send(ServerEvent::Error {
                message: e.to_string(),
            });
        }
    }
}

/// Merge direct replies and the hub feed onto `sink` until either side ends.
async fn write_loop<W>(
    mut sink: W,
    mut feed: mpsc::UnboundedReceiver<MessageRecord>,
    mut direct_rx: mpsc::UnboundedReceiver<ServerEvent>,
    replayed_up_to: Option<i64>,
) where
    W: Sink<Message> + Unpin,
{
    loop {
        let event = tokio::select! {
            // Direct replies take priority over the feed.
            biased;
            direct = direct_rx.recv() => match direct {
                Some(event) => event,
                None => break,
            },
            fed = feed.recv() => match fed {
                // Already part of the history this client was sent.
                Some(record) if replayed_up_to.is_some_and(|seq| record.seq <= seq) => {
                    debug!(id = %record.id, "skipping record already replayed");
                    continue;
                }
                Some(record) => ServerEvent::NewMessage(record),
                None => break,
            },
        };
        if send_event(&mut sink, &event).await.is_err() {
            break;
        }
    }
}

async fn send_event<W>(sink: &mut W, event: &ServerEvent) -> Result<(), W::Error>
where
    W: Sink<Message> + Unpin,
{
    let json = match event.to_json() {
        Ok(json) => json,
        Err(e) => {
            error!(error = %e, "failed to encode server event");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}

// ── Tests ──────────────────────────────────────────────────────────────────────
