//! Peer poll task: refreshes the peer colour list from the registry.
//!
//! Fail-closed: any failure clears the list instead of keeping the last
//! good one, so a transient outage blanks the breath animation until the
//! next successful poll.

use core::time::Duration;

use log::{info, warn};

use super::events::AppEvent;
use super::ports::{EventSink, SessionRegistry};
use super::session::SharedRegistry;
use super::state::PeerWriter;
use crate::config::DeviceConfig;
use crate::error::RemoteError;

pub struct PeerPollTask<R: SessionRegistry, E: EventSink> {
    registry: SharedRegistry<R>,
    peers: PeerWriter,
    sink: E,
    period: Duration,
}

impl<R: SessionRegistry, E: EventSink> PeerPollTask<R, E> {
    pub fn new(
        registry: SharedRegistry<R>,
        peers: PeerWriter,
        sink: E,
        config: &DeviceConfig,
    ) -> Self {
        Self {
            registry,
            peers,
            sink,
            period: Duration::from_millis(config.poll_interval_ms()),
        }
    }

    /// Poll once.  Returns the number of colours now held, or the error
    /// that cleared the list.
    pub fn tick(&mut self) -> Result<usize, RemoteError> {
        let result = self.registry.borrow_mut().list_active_peers();
        match result {
            Ok(colors) => {
                let dropped = self.peers.replace(&colors);
                if dropped > 0 {
                    warn!("Peer poll: {} colours beyond capacity dropped", dropped);
                }
                let count = colors.len() - dropped;
                info!("Peer poll: {} active", count);
                self.sink.emit(&AppEvent::PeersUpdated { count });
                Ok(count)
            }
            Err(e) => {
                self.peers.clear();
                warn!("Peer poll failed: {}", e);
                self.sink.emit(&AppEvent::PeerPollFailed(e));
                Err(e)
            }
        }
    }

    pub async fn run(mut self) {
        loop {
            // Outcome already logged and emitted.
            let _ = self.tick();
            async_io_mini::Timer::after(self.period).await;
        }
    }
}
