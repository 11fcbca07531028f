use serde::{Deserialize, Serialize};

/// One wire message. Everything exchanged between the hub and a client is
/// an `Event` carried as JSON with exactly these fields.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub ip: String,
    pub user: String,
    pub from: String,
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub content: String,
    pub user_list: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Handshake,
    Login,
    User,
    Logout,
    /// Any other tag. Kept as a variant so an unrecognized kind is not a
    /// decode failure.
    #[default]
    #[serde(other)]
    Unknown,
}

impl Event {
    /// Hub-to-session greeting sent once at registration.
    pub fn handshake(ip: String, user_list: Vec<String>) -> Self {
        Event {
            ip,
            kind: EventKind::Handshake,
            user_list,
            ..Event::default()
        }
    }

    /// Departure announcement for a session that did not send one itself.
    pub fn logout(ip: String, username: String) -> Self {
        Event {
            ip,
            user: username.clone(),
            from: username.clone(),
            kind: EventKind::Logout,
            content: username,
            user_list: Vec::new(),
        }
    }

    pub fn to_bytes(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> serde_json::Result<Event> {
        serde_json::from_slice(bytes)
    }
}
