//! WebSocket handler for the display board.
//!
//! Each connection is synced from the broadcaster on arrival, then receives
//! every fan-out event. Inbound events are handled strictly in arrival
//! order: a refresh is persisted and broadcast before the next frame is
//! read.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{
    sink::SinkExt,
    stream::{SplitSink, StreamExt},
};
use rxboard_core::{ClientEvent, ServerEvent, Subscription};
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::state::DisplayState;

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<DisplayState>,
) -> impl IntoResponse {
    let conn_id = Uuid::new_v4();
    ws.on_upgrade(move |socket| {
        handle_socket(socket, state).instrument(tracing::info_span!("ws", %conn_id))
    })
}

/// Handle individual WebSocket connection.
async fn handle_socket(socket: WebSocket, state: DisplayState) {
    let (mut sender, mut receiver) = socket.split();
    let broadcaster = state.broadcaster.clone();

    let Subscription {
        initial,
        receiver: mut rx,
    } = broadcaster.connect().await;
    info!(
        subscribers = broadcaster.subscriber_count(),
        "Display client connected"
    );

    // Events addressed to this client only.
    let (direct_tx, mut direct_rx) = mpsc::unbounded_channel::<ServerEvent>();

    let resync = broadcaster.clone();
    let mut send_task = tokio::spawn(
        async move {
            for event in &initial {
                if send_event(&mut sender, event).await.is_err() {
                    return;
                }
            }

            loop {
                let received = tokio::select! {
                    Some(event) = direct_rx.recv() => Ok(event),
                    received = rx.recv() => received,
                };
                let batch = match received {
                    Ok(event) => vec![event],
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Client lagged behind, resyncing from store");
                        resync.resync(&mut rx).await
                    }
                    Err(RecvError::Closed) => break,
                };
                for event in &batch {
                    if send_event(&mut sender, event).await.is_err() {
                        debug!("WebSocket send failed, client disconnected");
                        return;
                    }
                }
            }
        }
        .in_current_span(),
    );

    // Handle incoming messages from client
    let mut recv_task = tokio::spawn(
        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        handle_client_event(&state, &direct_tx, text.as_str()).await;
                    }
                    Message::Close(_) => {
                        debug!("WebSocket client sent close frame");
                        break;
                    }
                    _ => {}
                }
            }
        }
        .in_current_span(),
    );

    // Wait for either task to complete, then drop the other so the
    // subscription leaves the fan-out.
    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    info!("Display client disconnected");
}

async fn handle_client_event(
    state: &DisplayState,
    direct_tx: &mpsc::UnboundedSender<ServerEvent>,
    text: &str,
) {
    let event = match serde_json::from_str::<ClientEvent>(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Ignoring malformed client event");
            return;
        }
    };

    match event {
        ClientEvent::RefreshData(payload) => {
            debug!("refreshData received");
            if let Err(e) = state.broadcaster.refresh(payload).await {
                let _ = direct_tx.send(ServerEvent::RefreshFailed(e.to_string()));
            }
        }
        ClientEvent::ToggleFloatingArea(visible) => {
            debug!(visible, "toggle_floating_area received");
            state.broadcaster.toggle_floating_area(visible).await;
        }
    }
}

async fn send_event(
    sender: &mut SplitSink<WebSocket, Message>,
    event: &ServerEvent,
) -> Result<(), axum::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!(error = %e, "Failed to serialize event, skipped");
            return Ok(());
        }
    };
    sender.send(Message::Text(json.into())).await
}
