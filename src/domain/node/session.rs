//! Node session state machine

use std::fmt;
use thiserror::Error;

use super::epoch::ServerEpoch;
use crate::domain::clipboard::Payload;

/// Role a host plays for the subnet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Hosts the relay server and is authoritative for the shared payload
    Server,
    /// Talks to a relay server run by a peer
    Client,
}

impl Role {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Server => "server",
            Self::Client => "client",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which relay server, if any, this host currently talks to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Link {
    /// No server known (local bind failed or a remote server was abandoned)
    #[default]
    Detached,
    /// Running our own relay server
    Hosting { url: String, epoch: ServerEpoch },
    /// Client of a peer's relay server
    Joined { url: String, epoch: ServerEpoch },
}

/// Error when a role change is attempted that the election rules forbid
#[derive(Debug, Clone, Error)]
#[error("Invalid role transition: cannot {action} while {current_state}")]
pub struct InvalidRoleTransition {
    pub current_state: String,
    pub action: String,
}

/// The single owned node state shared by discovery and the sync loop.
///
/// Holds the active link together with the sync loop's cache, so a role
/// change and the cache it invalidates are always updated together.
///
/// State machine:
///
/// ```text
/// DETACHED -> HOSTING  (host)
/// HOSTING  -> JOINED   (join, peer epoch strictly older than ours)
/// JOINED   -> JOINED   (join, peer epoch strictly older than current peer)
/// DETACHED -> JOINED   (join, any peer)
/// ANY      -> DETACHED (detach)
/// ANY      -> HOSTING  (host, restart or port change)
/// ```
#[derive(Debug, Default)]
pub struct NodeSession {
    link: Link,
    last_payload: Option<Payload>,
    applied_version: Option<u64>,
    consecutive_failures: u32,
}

impl NodeSession {
    /// Create a new detached session with an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link(&self) -> &Link {
        &self.link
    }

    /// Current role, `None` while detached
    pub fn role(&self) -> Option<Role> {
        match self.link {
            Link::Detached => None,
            Link::Hosting { .. } => Some(Role::Server),
            Link::Joined { .. } => Some(Role::Client),
        }
    }

    pub fn server_url(&self) -> Option<&str> {
        match &self.link {
            Link::Detached => None,
            Link::Hosting { url, .. } | Link::Joined { url, .. } => Some(url),
        }
    }

    /// Epoch of the server currently adopted
    pub fn epoch(&self) -> Option<ServerEpoch> {
        match self.link {
            Link::Detached => None,
            Link::Hosting { epoch, .. } | Link::Joined { epoch, .. } => Some(epoch),
        }
    }

    pub fn is_hosting(&self) -> bool {
        matches!(self.link, Link::Hosting { .. })
    }

    /// Whether a peer with `epoch` would win against the adopted server.
    /// Anything beats a detached session.
    pub fn is_beaten_by(&self, epoch: ServerEpoch) -> bool {
        match self.epoch() {
            None => true,
            Some(current) => epoch.is_older_than(&current),
        }
    }

    /// Transition to HOSTING our own freshly started server
    pub fn host(&mut self, url: impl Into<String>, epoch: ServerEpoch) {
        self.link = Link::Hosting {
            url: url.into(),
            epoch,
        };
        self.reset_server_view();
    }

    /// Transition to JOINED on a peer with seniority
    pub fn join(
        &mut self,
        url: impl Into<String>,
        epoch: ServerEpoch,
    ) -> Result<(), InvalidRoleTransition> {
        if !self.is_beaten_by(epoch) {
            return Err(InvalidRoleTransition {
                current_state: self.describe(),
                action: format!("join a server with epoch {}", epoch),
            });
        }
        self.link = Link::Joined {
            url: url.into(),
            epoch,
        };
        self.reset_server_view();
        Ok(())
    }

    /// Forget the active server
    pub fn detach(&mut self) {
        self.link = Link::Detached;
        self.reset_server_view();
    }

    /// Last payload seen on (or written to) the local clipboard
    pub fn last_payload(&self) -> Option<&Payload> {
        self.last_payload.as_ref()
    }

    pub fn remember_payload(&mut self, payload: Payload) {
        self.last_payload = Some(payload);
    }

    /// Version of the server payload already applied locally
    pub fn applied_version(&self) -> Option<u64> {
        self.applied_version
    }

    pub fn mark_applied(&mut self, version: Option<u64>) {
        self.applied_version = version;
    }

    /// Count a failed sync tick, returning the running total
    pub fn record_failure(&mut self) -> u32 {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.consecutive_failures
    }

    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    fn reset_server_view(&mut self) {
        self.applied_version = None;
        self.consecutive_failures = 0;
    }

    fn describe(&self) -> String {
        match &self.link {
            Link::Detached => "detached".to_string(),
            Link::Hosting { epoch, .. } => format!("hosting with epoch {}", epoch),
            Link::Joined { url, epoch } => format!("joined to {} with epoch {}", url, epoch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn epoch(secs: f64) -> ServerEpoch {
        ServerEpoch::from_secs_f64(secs)
    }

    #[test]
    fn new_session_is_detached() {
        let session = NodeSession::new();
        assert_eq!(session.role(), None);
        assert!(session.server_url().is_none());
        assert!(session.last_payload().is_none());
    }

    #[test]
    fn host_sets_server_role() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.2:5000", epoch(100.0));

        assert_eq!(session.role(), Some(Role::Server));
        assert_eq!(session.server_url(), Some("http://10.0.0.2:5000"));
        assert_eq!(session.epoch(), Some(epoch(100.0)));
    }

    #[test]
    fn join_older_peer_from_hosting() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.2:5000", epoch(105.0));

        session.join("http://10.0.0.1:5000", epoch(100.0)).unwrap();
        assert_eq!(session.role(), Some(Role::Client));
        assert_eq!(session.server_url(), Some("http://10.0.0.1:5000"));
    }

    #[test]
    fn join_newer_peer_fails() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.1:5000", epoch(100.0));

        let err = session.join("http://10.0.0.2:5000", epoch(105.0)).unwrap_err();
        assert!(err.current_state.contains("hosting"));
        assert_eq!(session.role(), Some(Role::Server));
    }

    #[test]
    fn join_equal_epoch_fails() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.1:5000", epoch(100.0));
        assert!(session.join("http://10.0.0.2:5000", epoch(100.0)).is_err());
    }

    #[test]
    fn smallest_epoch_wins_across_joins() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.9:5000", epoch(300.0));

        session.join("http://10.0.0.5:5000", epoch(200.0)).unwrap();
        assert!(session.join("http://10.0.0.6:5000", epoch(250.0)).is_err());
        session.join("http://10.0.0.4:5000", epoch(100.0)).unwrap();

        assert_eq!(session.server_url(), Some("http://10.0.0.4:5000"));
    }

    #[test]
    fn detached_accepts_any_peer() {
        let mut session = NodeSession::new();
        assert!(session.is_beaten_by(epoch(f64::MAX)));
        session.join("http://10.0.0.4:5000", epoch(999.0)).unwrap();
        assert_eq!(session.role(), Some(Role::Client));
    }

    #[test]
    fn role_change_resets_server_view_but_keeps_payload() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.2:5000", epoch(105.0));
        session.remember_payload(Payload::text("hello"));
        session.mark_applied(Some(3));
        session.record_failure();

        session.join("http://10.0.0.1:5000", epoch(100.0)).unwrap();

        assert_eq!(session.applied_version(), None);
        assert_eq!(session.consecutive_failures(), 0);
        assert_eq!(session.last_payload(), Some(&Payload::text("hello")));
    }

    #[test]
    fn failures_count_until_success() {
        let mut session = NodeSession::new();
        assert_eq!(session.record_failure(), 1);
        assert_eq!(session.record_failure(), 2);
        session.record_success();
        assert_eq!(session.consecutive_failures(), 0);
    }

    #[test]
    fn detach_clears_link() {
        let mut session = NodeSession::new();
        session.host("http://10.0.0.2:5000", epoch(105.0));
        session.detach();
        assert_eq!(session.link(), &Link::Detached);
    }

    #[test]
    fn role_display() {
        assert_eq!(Role::Server.to_string(), "server");
        assert_eq!(Role::Client.to_string(), "client");
    }
}
