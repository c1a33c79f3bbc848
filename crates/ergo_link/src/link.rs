use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use ergo_logging::{ergo_debug, ergo_info, ergo_warn};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::wire::{self, EnginePacket, SocketPacket};
use crate::{LinkError, LinkEvent, LinkSettings};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

enum LinkCommand {
    Emit { name: String, data: Value },
}

/// Builds the websocket URL for the event channel, forcing the websocket
/// transport.
pub fn socket_url(server_url: &str, socket_path: &str) -> Result<Url, LinkError> {
    let mut url = Url::parse(server_url)?;
    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => return Err(LinkError::UnsupportedScheme(other.to_string())),
    };
    url.set_scheme(scheme)
        .map_err(|()| LinkError::UnsupportedScheme(scheme.to_string()))?;
    url.set_path(socket_path);
    url.query_pairs_mut()
        .clear()
        .append_pair("EIO", wire::ENGINE_IO_VERSION)
        .append_pair("transport", "websocket");
    Ok(url)
}

/// Owner side of a running backend link.
///
/// The socket runs on a dedicated thread with its own tokio runtime; emits are
/// queued to it and inbound events are drained with [`LinkHandle::try_recv`].
/// Dropping the handle shuts the link down.
pub struct LinkHandle {
    cmd_tx: UnboundedSender<LinkCommand>,
    event_rx: mpsc::Receiver<LinkEvent>,
    cancel: CancellationToken,
}

impl LinkHandle {
    pub fn connect(settings: LinkSettings) -> Result<Self, LinkError> {
        let url = socket_url(&settings.server_url, &settings.socket_path)?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();

        let task_cancel = cancel.clone();
        thread::spawn(move || {
            runtime.block_on(run_link(url, settings, cmd_rx, event_tx, task_cancel));
        });

        Ok(Self {
            cmd_tx,
            event_rx,
            cancel,
        })
    }

    /// Queues an event for the backend. Dropped if no socket is open when the
    /// link gets to it.
    pub fn emit(&self, name: &str, data: Value) {
        let _ = self.cmd_tx.send(LinkCommand::Emit {
            name: name.to_string(),
            data,
        });
    }

    pub fn try_recv(&self) -> Option<LinkEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<LinkEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

}

impl Drop for LinkHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_link(
    url: Url,
    settings: LinkSettings,
    mut cmd_rx: UnboundedReceiver<LinkCommand>,
    event_tx: mpsc::Sender<LinkEvent>,
    cancel: CancellationToken,
) {
    loop {
        ergo_info!("Dialing {}", url);
        let dial = tokio::time::timeout(settings.connect_timeout, connect_async(url.as_str()));
        let outcome = tokio::select! {
            _ = cancel.cancelled() => break,
            outcome = dial => outcome,
        };
        match outcome {
            Ok(Ok((socket, _response))) => {
                let end = drive_socket(socket, &mut cmd_rx, &event_tx, &cancel).await;
                ergo_info!("Link closed: {}", end.reason);
                if end.announced {
                    let _ = event_tx.send(LinkEvent::Disconnected { reason: end.reason });
                }
            }
            Ok(Err(err)) => ergo_warn!("Dial failed: {}", LinkError::from(err)),
            Err(_) => ergo_warn!("{}", LinkError::Timeout(settings.connect_timeout)),
        }

        if cancel.is_cancelled() {
            break;
        }
        // Emits queued while offline are stale by the time we reconnect.
        while cmd_rx.try_recv().is_ok() {}
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(settings.reconnect_delay) => {}
        }
    }
    ergo_debug!("Link loop finished");
}

struct SocketEnd {
    /// Whether the owner saw `Connected` for this socket.
    announced: bool,
    reason: String,
}

async fn drive_socket(
    socket: Socket,
    cmd_rx: &mut UnboundedReceiver<LinkCommand>,
    event_tx: &mpsc::Sender<LinkEvent>,
    cancel: &CancellationToken,
) -> SocketEnd {
    let (mut sink, mut stream) = socket.split();
    let mut announced = false;
    // Set by the handshake: how long the server may stay silent.
    let mut silence_limit: Option<Duration> = None;
    let mut deadline: Option<Instant> = None;
    let end = |announced: bool, reason: &str| SocketEnd {
        announced,
        reason: reason.to_string(),
    };

    loop {
        // Commands before frames: emits from an outage are dropped before the
        // namespace reopens.
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                let _ = sink.send(Message::text(wire::encode_disconnect())).await;
                let _ = sink.close().await;
                return end(announced, "shutdown");
            }
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)),
                if deadline.is_some() =>
            {
                ergo_warn!("No packet from the server within {:?}", silence_limit);
                return end(announced, "ping timeout");
            }
            command = cmd_rx.recv() => match command {
                Some(LinkCommand::Emit { name, data }) => {
                    if !announced {
                        ergo_debug!("Dropping `{}` emitted before the namespace opened", name);
                        continue;
                    }
                    let frame = wire::encode_event(&name, &data);
                    if let Err(err) = sink.send(Message::text(frame)).await {
                        return end(announced, &err.to_string());
                    }
                }
                None => return end(announced, "link handle dropped"),
            },
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    deadline = silence_limit.map(|limit| Instant::now() + limit);
                    let packet = match wire::decode_frame(&text) {
                        Ok(packet) => packet,
                        Err(err) => {
                            ergo_warn!("Ignoring malformed frame: {}", err);
                            continue;
                        }
                    };
                    let reply = match packet {
                        EnginePacket::Open(handshake) => {
                            ergo_debug!("Engine session {} opened", handshake.sid);
                            silence_limit = handshake.silence_limit();
                            deadline = silence_limit.map(|limit| Instant::now() + limit);
                            Some(wire::encode_connect())
                        }
                        EnginePacket::Ping(probe) => Some(wire::encode_pong(&probe)),
                        EnginePacket::Message(SocketPacket::Connect(_)) => {
                            announced = true;
                            let _ = event_tx.send(LinkEvent::Connected);
                            None
                        }
                        EnginePacket::Message(SocketPacket::Event { name, data }) => {
                            let _ = event_tx.send(LinkEvent::Event { name, data });
                            None
                        }
                        EnginePacket::Message(SocketPacket::ConnectError(detail)) => {
                            return end(announced, &format!("connect refused: {detail}"));
                        }
                        EnginePacket::Message(SocketPacket::Disconnect) | EnginePacket::Close => {
                            return end(announced, "closed by server");
                        }
                        EnginePacket::Message(SocketPacket::Ack)
                        | EnginePacket::Pong(_)
                        | EnginePacket::Upgrade
                        | EnginePacket::Noop => None,
                    };
                    if let Some(reply) = reply {
                        if let Err(err) = sink.send(Message::text(reply)).await {
                            return end(announced, &err.to_string());
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => return end(announced, "socket closed"),
                Some(Ok(_)) => {}
                Some(Err(err)) => return end(announced, &err.to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn socket_url_maps_scheme_and_forces_websocket() {
        let url = socket_url("https://example.com:8443/ignored?x=1", "/socket.io/").unwrap();
        assert_eq!(
            url.as_str(),
            "wss://example.com:8443/socket.io/?EIO=4&transport=websocket"
        );
    }

    #[test]
    fn socket_url_rejects_other_schemes() {
        assert!(matches!(
            socket_url("ftp://example.com", "/socket.io/"),
            Err(LinkError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
    }
}
