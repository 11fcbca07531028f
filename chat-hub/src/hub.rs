use crate::errors::hub_error::HubError;
use crate::event::{Event, EventKind};
use crate::roster::Roster;
use log::{debug, error, info, warn};
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Requests queued ahead of the control loop while it works one off.
const REQUEST_QUEUE_SIZE: usize = 64;

#[derive(Debug)]
pub enum HubRequest {
    Register {
        id: String,
        addr: String,
        outbound_tx: mpsc::Sender<Vec<u8>>,
    },
    Unregister {
        id: String,
    },
    Broadcast {
        event: Event,
    },
}

/// The single coordinator. Owns the registry of live sessions and the
/// roster; both are touched only inside [`Hub::run`], one request at a
/// time, in arrival order.
pub struct Hub {
    request_rx: mpsc::Receiver<HubRequest>,
    sessions: HashMap<String, mpsc::Sender<Vec<u8>>>,
    roster: Roster,
}

/// Cloneable entry point the acceptor and the sessions use to reach the hub.
#[derive(Clone)]
pub struct HubHandle {
    request_tx: mpsc::Sender<HubRequest>,
}

impl Hub {
    pub fn new() -> (Hub, HubHandle) {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_QUEUE_SIZE);
        let hub = Hub {
            request_rx,
            sessions: HashMap::new(),
            roster: Roster::new(),
        };

        (hub, HubHandle { request_tx })
    }

    /// Control loop. Runs until every handle has been dropped.
    pub async fn run(mut self) {
        while let Some(request) = self.request_rx.recv().await {
            match request {
                HubRequest::Register {
                    id,
                    addr,
                    outbound_tx,
                } => self.register(id, addr, outbound_tx),
                HubRequest::Unregister { id } => self.unregister(&id),
                HubRequest::Broadcast { event } => self.broadcast(event),
            }
        }
    }

    fn register(&mut self, id: String, addr: String, outbound_tx: mpsc::Sender<Vec<u8>>) {
        let handshake = Event::handshake(addr.clone(), self.roster.snapshot());
        let bytes = match handshake.to_bytes() {
            Ok(bytes) => bytes,
            Err(error) => {
                error!("Could not encode handshake event: {error}");
                return;
            }
        };

        // The queue is freshly created, so this only fails if the session
        // is already gone
        if outbound_tx.try_send(bytes).is_err() {
            warn!("Session {id} went away before its handshake");
            return;
        }

        debug!("Session {id} attached from {addr}");
        self.sessions.insert(id, outbound_tx);
    }

    fn unregister(&mut self, id: &str) {
        if self.sessions.remove(id).is_some() {
            debug!("Session {id} detached");
        }
    }

    fn broadcast(&mut self, mut event: Event) {
        match event.kind {
            EventKind::Login => {
                self.roster.add(event.user.clone());
                event.user_list = self.roster.snapshot();
                info!("{} logged in", event.user);
            }
            EventKind::Logout => {
                self.roster.remove(&event.user);
                event.user_list = self.roster.snapshot();
                info!("{} logged out", event.user);
            }
            _ => (),
        }

        let bytes = match event.to_bytes() {
            Ok(bytes) => bytes,
            Err(error) => {
                error!("Could not encode {:?} event: {error}", event.kind);
                return;
            }
        };

        // A full queue marks the session unresponsive; fan-out never blocks
        self.sessions.retain(|id, outbound_tx| {
            match outbound_tx.try_send(bytes.clone()) {
                Ok(()) => true,
                Err(_) => {
                    warn!("Session {id} cannot keep up, dropping it");
                    false
                }
            }
        });
    }
}

impl HubHandle {
    pub async fn register(
        &self,
        id: String,
        addr: String,
        outbound_tx: mpsc::Sender<Vec<u8>>,
    ) -> Result<(), HubError> {
        self.request_tx
            .send(HubRequest::Register {
                id,
                addr,
                outbound_tx,
            })
            .await
            .map_err(|_| HubError::Closed)
    }

    pub async fn unregister(&self, id: String) -> Result<(), HubError> {
        self.request_tx
            .send(HubRequest::Unregister { id })
            .await
            .map_err(|_| HubError::Closed)
    }

    pub async fn broadcast(&self, event: Event) -> Result<(), HubError> {
        self.request_tx
            .send(HubRequest::Broadcast { event })
            .await
            .map_err(|_| HubError::Closed)
    }
}
