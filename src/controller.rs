/// Connection and countdown state owned by the GUI thread
use crate::network::Connection;
use crate::timer::TimerEngine;
use crate::types::{Command, ConnectionStatus, NetworkEvent, NetworkEventKind};
use log::{debug, info, warn};
use std::time::Instant;
use tokio::sync::mpsc;

pub struct Controller {
    status: ConnectionStatus,
    connection: Option<Connection>,
    timer: TimerEngine,
    events_tx: mpsc::UnboundedSender<NetworkEvent>,
    events_rx: mpsc::UnboundedReceiver<NetworkEvent>,
}

impl Controller {
    pub fn new(initial_secs: f64) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            status: ConnectionStatus::Disconnected,
            connection: None,
            timer: TimerEngine::new(initial_secs),
            events_tx,
            events_rx,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    pub fn is_connected(&self) -> bool {
        self.status == ConnectionStatus::Connected
    }

    /// True while a socket exists, open or still dialing
    pub fn has_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn set_initial_duration(&mut self, secs: f64) {
        self.timer.set_initial(secs);
    }

    /// Start dialing `host:port`. Ignored while another connection is live.
    pub fn connect(&mut self, host: &str, port: u16) {
        if self.connection.is_some() {
            warn!("connect to {} ignored: a connection is already open", host);
            return;
        }

        self.status = ConnectionStatus::Connecting;
        self.attach(Connection::open(host, port, self.events_tx.clone()));
    }

    fn attach(&mut self, connection: Connection) {
        debug!("tracking connection {}", connection.id());
        self.connection = Some(connection);
    }

    /// Close the open connection, if any. Also cancels a pending dial.
    pub fn disconnect(&mut self) {
        if let Some(connection) = self.connection.take() {
            info!("disconnecting connection {}", connection.id());
            self.status = ConnectionStatus::Disconnected;
        }
    }

    /// Transmit a command if connected; otherwise drop it
    pub fn send(&self, command: Command) {
        match &self.connection {
            Some(connection) if self.is_connected() => {
                if !connection.send(command) {
                    debug!("command {} dropped: connection task has exited", command);
                }
            }
            _ => debug!("command {} dropped: not connected", command),
        }
    }

    /// Start/stop button
    pub fn toggle(&mut self, now: Instant) {
        if !self.is_connected() {
            return;
        }

        if self.timer.is_running() {
            self.timer.stop();
            self.send(Command::Stop);
        } else {
            self.timer.restart(now);
            self.send(Command::Start);
        }
    }

    /// Run due timer ticks, dispatching the timeout if the countdown expires
    pub fn poll_timer(&mut self, now: Instant) {
        if let Some(command) = self.timer.advance(now) {
            info!("countdown expired");
            self.send(command);
        }
    }

    /// Drain pending network events
    pub fn process_network_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    pub fn handle_event(&mut self, event: NetworkEvent) {
        let current = self.connection.as_ref().map(Connection::id);
        if current != Some(event.connection_id) {
            debug!("ignoring event from stale connection {}", event.connection_id);
            return;
        }

        match event.kind {
            NetworkEventKind::Opened => {
                self.status = ConnectionStatus::Connected;
            }
            NetworkEventKind::Status(status) => {
                // Remote state wins; never echo a command back
                if let Some(running) = status.running {
                    if running != self.timer.is_running() {
                        info!("device reports running={}", running);
                        self.timer.set_running(running);
                    }
                }
            }
            NetworkEventKind::Closed => {
                self.connection = None;
                self.status = ConnectionStatus::Disconnected;
            }
            NetworkEventKind::Failed(reason) => {
                self.connection = None;
                self.status = if self.status == ConnectionStatus::Connecting {
                    ConnectionStatus::Error
                } else {
                    ConnectionStatus::Disconnected
                };
                warn!("connection lost: {}", reason);
            }
        }
    }

    /// Release the tick interval and the socket
    pub fn shutdown(&mut self) {
        self.timer.stop();
        self.disconnect();
    }
}
