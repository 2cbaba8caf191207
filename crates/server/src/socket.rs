//! WebSocket bridge between a client connection and a battle session.

use axum::extract::ws::{Message, WebSocket};
use battle_runtime::{BattleRuntime, ClientMessage, SessionContext, SessionHandle};
use futures::stream::SplitStream;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Drive one session over an upgraded socket until either side closes.
///
/// Closing the socket drops the session's inbound channel, which the session
/// treats as a disconnect. When the session ends first, queued events are
/// flushed and the socket is closed.
pub async fn bridge(socket: WebSocket, runtime: &BattleRuntime, ctx: SessionContext) {
    let (mut sink, stream) = socket.split();
    let SessionHandle {
        inbound,
        mut outbound,
        task,
    } = runtime.spawn_session(ctx);

    let writer = tokio::spawn(async move {
        while let Some(event) = outbound.recv().await {
            let text = match event.to_json() {
                Ok(text) => text,
                Err(err) => {
                    error!(target: "battle::socket", error = %err, "Failed to encode event");
                    continue;
                }
            };
            if sink.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.send(Message::Close(None)).await;
    });
    let reader = tokio::spawn(forward_requests(stream, inbound));

    match task.await {
        Ok(report) => info!(
            target: "battle::socket",
            player = %ctx.player,
            game = %ctx.game,
            close = ?report.close,
            encounter = ?report.encounter.map(|encounter| encounter.id),
            "Session finished"
        ),
        Err(err) => error!(target: "battle::socket", error = %err, "Session task failed"),
    }

    reader.abort();
    let _ = writer.await;
}

async fn forward_requests(
    mut stream: SplitStream<WebSocket>,
    inbound: mpsc::Sender<ClientMessage>,
) {
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match ClientMessage::parse(text.as_str()) {
                Ok(request) => {
                    if inbound.send(request).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(target: "battle::socket", error = %err, "Ignoring unrecognized request");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(err) => {
                debug!(target: "battle::socket", error = %err, "Socket read failed");
                break;
            }
        }
    }
}
