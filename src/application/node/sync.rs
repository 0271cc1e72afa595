//! One pull-then-push reconciliation step

use tracing::{debug, info, warn};

use crate::domain::node::{NodeSession, Role};

use super::{Node, NodeError};
use crate::application::ports::{
    LocalClipboard, PeerSource, RelayClient, RelayError, RelayHost, ServerHandle,
};

/// What a sync tick changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Server payload written to the local clipboard
    pub pulled: bool,
    /// Local payload uploaded to the server
    pub pushed: bool,
}

impl<C, R, H, P> Node<C, R, H, P>
where
    C: LocalClipboard,
    R: RelayClient,
    H: RelayHost,
    P: PeerSource,
{
    /// Reconcile the local clipboard with the active server once.
    ///
    /// Pull always precedes push, so a change made elsewhere is applied
    /// before the local clipboard is compared with the cache. The session
    /// lock is held for the whole step.
    pub async fn sync_once(&self) -> Result<SyncReport, NodeError> {
        let mut session = self.session.lock().await;
        let Some(url) = session.server_url().map(str::to_owned) else {
            return Err(NodeError::NoServer);
        };

        match self.reconcile(&mut session, &url).await {
            Ok(report) => {
                session.record_success();
                Ok(report)
            }
            Err(NodeError::Relay(e @ (RelayError::Rejected(_) | RelayError::Protocol(_)))) => {
                // The server is alive; only this request failed
                warn!(error = %e, "Relay request refused, skipping tick");
                Err(NodeError::Relay(e))
            }
            Err(NodeError::Relay(e)) => {
                let failures = session.record_failure();
                let lost = match session.role() {
                    Some(Role::Client) => {
                        let threshold = self.config.failover_after;
                        threshold > 0 && failures >= threshold
                    }
                    _ => !self.local_server_running().await,
                };
                if lost {
                    session.detach();
                    return Err(NodeError::ServerLost { url, failures });
                }
                Err(NodeError::Relay(e))
            }
            Err(e) => {
                warn!(error = %e, "Clipboard access failed, skipping tick");
                Err(e)
            }
        }
    }

    async fn local_server_running(&self) -> bool {
        self.server
            .lock()
            .await
            .as_ref()
            .map(|s| s.is_running())
            .unwrap_or(false)
    }

    async fn reconcile(&self, session: &mut NodeSession, url: &str) -> Result<SyncReport, NodeError> {
        let pulled = self.pull(session, url).await?;
        let pushed = self.push(session, url).await?;
        Ok(SyncReport { pulled, pushed })
    }

    async fn pull(&self, session: &mut NodeSession, url: &str) -> Result<bool, NodeError> {
        let state = self.relay.probe(url).await?;
        if !state.attached {
            return Ok(false);
        }
        if state.version.is_some() && state.version == session.applied_version() {
            return Ok(false);
        }

        let fetched = self.relay.fetch(url).await?;
        if session.last_payload() == Some(&fetched.payload) {
            session.mark_applied(fetched.version);
            return Ok(false);
        }

        self.clipboard.write(&fetched.payload).await?;
        session.mark_applied(fetched.version);

        // The platform may normalize what we wrote; cache what it reports back
        let current = match self.clipboard.read().await {
            Ok(Some(payload)) => payload,
            _ => fetched.payload,
        };
        info!(
            format = %current.format(),
            size = %current.human_readable_size(),
            "Pulled clipboard"
        );
        session.remember_payload(current);
        Ok(true)
    }

    async fn push(&self, session: &mut NodeSession, url: &str) -> Result<bool, NodeError> {
        let Some(local) = self.clipboard.read().await? else {
            return Ok(false);
        };
        if session.last_payload() == Some(&local) {
            return Ok(false);
        }

        let version = match self.relay.push(url, &local).await {
            Ok(version) => version,
            Err(RelayError::Rejected(status)) => {
                // Remember it so the same payload is not offered every tick
                session.remember_payload(local);
                return Err(RelayError::Rejected(status).into());
            }
            Err(e) => return Err(e.into()),
        };
        debug!(?version, "Server accepted payload");
        info!(
            format = %local.format(),
            size = %local.human_readable_size(),
            "Pushed clipboard"
        );
        session.mark_applied(version);
        session.remember_payload(local);
        Ok(true)
    }
}
