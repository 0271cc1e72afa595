//! Subnet scan and server adoption

use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::domain::node::ServerEpoch;

use super::{server_url, Node};
use crate::application::ports::{LocalClipboard, PeerSource, RelayClient, RelayHost};

impl<C, R, H, P> Node<C, R, H, P>
where
    C: LocalClipboard,
    R: RelayClient,
    H: RelayHost,
    P: PeerSource,
{
    /// Probe every candidate and adopt whichever responding server beats the
    /// one we currently follow. Responses are handled in completion order.
    pub(super) async fn scan(&self) {
        let candidates = self.peers.candidates(self.port());
        debug!(count = candidates.len(), "Scanning for relay servers");

        let relay = &self.relay;
        let mut probes = stream::iter(candidates)
            .map(move |addr| {
                let url = server_url(addr);
                async move {
                    let epoch = relay.timestamp(&url).await;
                    (url, epoch)
                }
            })
            .buffer_unordered(self.config.scan_concurrency.max(1));

        while let Some((url, epoch)) = probes.next().await {
            match epoch {
                Ok(epoch) => {
                    debug!(%url, %epoch, "Found relay server");
                    self.adopt(&url, epoch).await;
                }
                Err(e) => debug!(%url, error = %e, "No relay server"),
            }
        }
    }

    /// Switch to `url` if its epoch is strictly older than the adopted one.
    ///
    /// We register with the winner before giving up our own server, so an
    /// unreachable peer never leaves us without one.
    async fn adopt(&self, url: &str, epoch: ServerEpoch) -> bool {
        if !self.session.lock().await.is_beaten_by(epoch) {
            return false;
        }

        if let Err(e) = self.relay.register(url, &self.config.device_name).await {
            warn!(%url, error = %e, "Could not register with senior relay server");
            return false;
        }

        let mut session = self.session.lock().await;
        if let Err(e) = session.join(url, epoch) {
            debug!(error = %e, "Skipping relay server");
            return false;
        }
        self.stop_local().await;
        drop(session);

        info!(%url, %epoch, "Joined relay server");
        true
    }
}
