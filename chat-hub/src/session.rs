use crate::errors::session_error::SessionError;
use crate::event::{Event, EventKind};
use crate::hub::HubHandle;
use crate::transport::{MessageReader, MessageWriter};
use guid_create::GUID;
use log::{debug, trace, warn};
use tokio::sync::mpsc;

/// Outbound queue capacity per session. A session that falls this many
/// messages behind is dropped by the hub.
pub const OUTBOUND_QUEUE_SIZE: usize = 256;

/// One attached client. The username is set by the first login event and
/// never changes again for the rest of the session's lifetime.
pub struct Session {
    id: String,
    addr: String,
    hub: HubHandle,
    username: Option<String>,
}

impl Session {
    pub fn new(addr: String, hub: HubHandle) -> Self {
        Session {
            id: GUID::rand().to_string(),
            addr,
            hub,
            username: None,
        }
    }

    /// Runs the session to completion: registers with the hub, spawns the
    /// send loop, and drives the receive loop until the client leaves.
    /// Unregisters exactly once on the way out.
    pub async fn run<R, W>(mut self, mut reader: R, writer: W)
    where
        R: MessageReader,
        W: MessageWriter + 'static,
    {
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_SIZE);
        if self
            .hub
            .register(self.id.clone(), self.addr.clone(), outbound_tx)
            .await
            .is_err()
        {
            return;
        }

        let send_loop = tokio::spawn(send_loop(writer, outbound_rx));

        match self.receive_loop(&mut reader).await {
            Ok(()) => debug!("Session {} logged out", self.id),
            Err(SessionError::Disconnected(reason)) => {
                debug!("Session {}: {reason}", self.id);

                // The departure was never announced, announce it ourselves
                if let Some(username) = self.username.take() {
                    let logout = Event::logout(self.addr.clone(), username);
                    let _ = self.hub.broadcast(logout).await;
                }
            }
            Err(SessionError::Hub(error)) => debug!("Session {}: {error}", self.id),
        }

        let _ = self.hub.unregister(self.id.clone()).await;
        let _ = send_loop.await;
    }

    async fn receive_loop<R: MessageReader>(&mut self, reader: &mut R) -> Result<(), SessionError> {
        loop {
            let message = reader
                .read()
                .await
                .map_err(|error| SessionError::Disconnected(error.to_string()))?;
            let Some(bytes) = message else {
                return Err(SessionError::Disconnected(
                    "client closed the connection".to_string(),
                ));
            };

            let event = match Event::from_bytes(&bytes) {
                Ok(event) => event,
                Err(error) => {
                    debug!("Dropping undecodable message from {}: {error}", self.addr);
                    continue;
                }
            };

            trace!("C {}: {:?} {}", self.addr, event.kind, event.content);

            match event.kind {
                EventKind::Login => self.handle_login(event).await?,
                EventKind::User => self.handle_user(event).await?,
                EventKind::Logout => {
                    self.handle_logout(event).await?;
                    return Ok(());
                }
                EventKind::Handshake | EventKind::Unknown => {
                    warn!("Ignoring {:?} event from {}", event.kind, self.addr);
                }
            }
        }
    }

    async fn handle_login(&mut self, event: Event) -> Result<(), SessionError> {
        if self.username.is_some() {
            warn!("Session {} sent a second login, ignoring it", self.id);
            return Ok(());
        }

        let username = event.content.clone();
        self.username = Some(username.clone());

        // user_list is stamped by the hub together with the roster append
        self.hub
            .broadcast(Event {
                ip: self.addr.clone(),
                user: username.clone(),
                from: username,
                kind: EventKind::Login,
                content: event.content,
                user_list: Vec::new(),
            })
            .await?;

        Ok(())
    }

    async fn handle_user(&mut self, mut event: Event) -> Result<(), SessionError> {
        // Chat payloads pass through untouched apart from the address stamp
        event.ip = self.addr.clone();
        self.hub.broadcast(event).await?;

        Ok(())
    }

    async fn handle_logout(&mut self, event: Event) -> Result<(), SessionError> {
        // A logout before any login has nothing to announce
        let Some(username) = self.username.take() else {
            return Ok(());
        };

        self.hub
            .broadcast(Event {
                ip: self.addr.clone(),
                user: username.clone(),
                from: username,
                kind: EventKind::Logout,
                content: event.content,
                user_list: Vec::new(),
            })
            .await?;

        Ok(())
    }
}

/// Drains the outbound queue to the transport in order, one write at a
/// time, until the hub closes the queue. Then closes the connection.
async fn send_loop<W: MessageWriter>(mut writer: W, mut outbound_rx: mpsc::Receiver<Vec<u8>>) {
    while let Some(message) = outbound_rx.recv().await {
        // Writes are not retried; unregistration is the read side's job
        if let Err(error) = writer.write(message).await {
            debug!("{error}");
        }
    }

    writer.close().await;
}
