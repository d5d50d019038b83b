/// WebSocket connection to the remote timer device
use crate::types::{Command, NetworkError, NetworkEvent, NetworkEventKind, StatusMessage};
use futures::{SinkExt, StreamExt};
use log::{debug, info, warn};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use uuid::Uuid;

pub const DEFAULT_PORT: u16 = 8080;

/// Requests from the GUI to a connection task
#[derive(Debug, PartialEq)]
pub(crate) enum Outbound {
    Command(Command),
    Close,
}

pub fn endpoint_url(host: &str, port: u16) -> String {
    format!("ws://{}:{}", host.trim(), port)
}

/// Handle to one live connection. Dropping it closes the socket.
pub struct Connection {
    id: Uuid,
    outbound_tx: mpsc::UnboundedSender<Outbound>,
}

impl Connection {
    /// Open `ws://host:port` on a background thread. Lifecycle events are
    /// reported on `events_tx` tagged with this connection's id.
    pub fn open(host: &str, port: u16, events_tx: mpsc::UnboundedSender<NetworkEvent>) -> Self {
        let id = Uuid::new_v4();
        let url = endpoint_url(host, port);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();

        std::thread::spawn(move || {
            let result = tokio::runtime::Runtime::new()
                .map_err(NetworkError::from)
                .and_then(|rt| rt.block_on(run_connection(id, &url, outbound_rx, &events_tx)));

            let kind = match result {
                Ok(()) => {
                    info!("connection {} to {} closed", id, url);
                    NetworkEventKind::Closed
                }
                Err(e) => {
                    warn!("connection {} to {} failed: {}", id, url, e);
                    NetworkEventKind::Failed(e.to_string())
                }
            };
            let _ = events_tx.send(NetworkEvent { connection_id: id, kind });
        });

        Self { id, outbound_tx }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Queue a command for the socket. Returns false if the task is gone.
    pub fn send(&self, command: Command) -> bool {
        self.outbound_tx.send(Outbound::Command(command)).is_ok()
    }

    #[cfg(test)]
    pub(crate) fn detached() -> (Self, mpsc::UnboundedReceiver<Outbound>) {
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (Self { id: Uuid::new_v4(), outbound_tx }, outbound_rx)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.outbound_tx.send(Outbound::Close);
    }
}

/// Drive one connection until either side closes it
async fn run_connection(
    id: Uuid,
    url: &str,
    mut outbound_rx: mpsc::UnboundedReceiver<Outbound>,
    events_tx: &mpsc::UnboundedSender<NetworkEvent>,
) -> Result<(), NetworkError> {
    info!("connection {} dialing {}", id, url);

    // A close request while still dialing abandons the attempt
    let (ws_stream, _) = tokio::select! {
        result = connect_async(url) => result?,
        _ = outbound_rx.recv() => return Ok(()),
    };

    info!("connection {} open", id);
    let _ = events_tx.send(NetworkEvent { connection_id: id, kind: NetworkEventKind::Opened });

    let (mut write_half, mut read_half) = ws_stream.split();

    loop {
        tokio::select! {
            outbound = outbound_rx.recv() => {
                match outbound {
                    Some(Outbound::Command(command)) => {
                        debug!("connection {} sending {}", id, command);
                        write_half.send(Message::text(command.as_str())).await?;
                    }
                    Some(Outbound::Close) | None => {
                        let _ = write_half.close().await;
                        return Ok(());
                    }
                }
            }

            incoming = read_half.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => handle_text(id, text.as_str(), events_tx),
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                }
            }
        }
    }
}

fn handle_text(id: Uuid, text: &str, events_tx: &mpsc::UnboundedSender<NetworkEvent>) {
    match StatusMessage::parse(text) {
        Ok(status) => {
            debug!("connection {} status {:?}", id, status);
            let _ = events_tx.send(NetworkEvent { connection_id: id, kind: NetworkEventKind::Status(status) });
        }
        Err(e) => warn!("connection {} discarding malformed message {:?}: {}", id, text, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::time::timeout;

    const WAIT: Duration = Duration::from_secs(5);

    async fn next_event(rx: &mut mpsc::UnboundedReceiver<NetworkEvent>) -> NetworkEvent {
        timeout(WAIT, rx.recv()).await.unwrap().unwrap()
    }

    #[test]
    fn builds_plain_websocket_url() {
        assert_eq!(endpoint_url(" 192.168.10.105 ", DEFAULT_PORT), "ws://192.168.10.105:8080");
    }

    #[tokio::test]
    async fn exchanges_commands_and_status() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let connection = Connection::open("127.0.0.1", port, events_tx);
        let (stream, _) = listener.accept().await.unwrap();
        let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();

        let event = next_event(&mut events_rx).await;
        assert_eq!(event.connection_id, connection.id());
        assert_eq!(event.kind, NetworkEventKind::Opened);

        assert!(connection.send(Command::Start));
        let received = timeout(WAIT, server.next()).await.unwrap().unwrap().unwrap();
        assert_eq!(received, Message::text("start"));

        server.send(Message::text("not json")).await.unwrap();
        server.send(Message::text("[1, 2]")).await.unwrap();
        server.send(Message::text(r#"{"running": false}"#)).await.unwrap();

        // Invalid JSON is dropped; other shapes arrive as an empty status
        let event = next_event(&mut events_rx).await;
        assert_eq!(event.kind, NetworkEventKind::Status(StatusMessage::default()));

        let event = next_event(&mut events_rx).await;
        assert_eq!(event.kind, NetworkEventKind::Status(StatusMessage { running: Some(false) }));

        server.close(None).await.unwrap();
        let event = next_event(&mut events_rx).await;
        assert_eq!(event.kind, NetworkEventKind::Closed);
    }

    #[tokio::test]
    async fn refused_connect_reports_failure() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let (events_tx, mut events_rx) = mpsc::unbounded_channel();
        let connection = Connection::open("127.0.0.1", port, events_tx);

        let event = next_event(&mut events_rx).await;
        assert_eq!(event.connection_id, connection.id());
        assert!(matches!(event.kind, NetworkEventKind::Failed(_)));
    }

    #[tokio::test]
    async fn dropping_the_handle_closes_the_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (events_tx, mut events_rx) = mpsc::unbounded_channel();

        let connection = Connection::open("127.0.0.1", port, events_tx);
        let (stream, _) = listener.accept().await.unwrap();
        let mut server = tokio_tungstenite::accept_async(stream).await.unwrap();
        assert_eq!(next_event(&mut events_rx).await.kind, NetworkEventKind::Opened);

        drop(connection);

        let received = timeout(WAIT, server.next()).await.unwrap();
        assert!(matches!(received, Some(Ok(Message::Close(_)))));
        assert_eq!(next_event(&mut events_rx).await.kind, NetworkEventKind::Closed);
    }
}
