use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

use endocalc_types::PlatformEvent;

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Polls a URL with `HEAD` and reports reachability.
///
/// Any HTTP response counts as online; only transport failures count as
/// offline. Every poll is reported; deduplication is the cache manager's job.
#[derive(Debug, Clone)]
pub struct ConnectivityProbe {
    client: Client,
    url: Url,
    interval: Duration,
}

impl ConnectivityProbe {
    pub fn new(url: Url, interval: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(PROBE_TIMEOUT).build()?;
        Ok(Self {
            client,
            url,
            interval,
        })
    }

    pub async fn probe_once(&self) -> bool {
        match self.client.head(self.url.clone()).send().await {
            Ok(response) => {
                tracing::debug!("Probe {} answered {}", self.url, response.status());
                true
            }
            Err(err) => {
                tracing::debug!("Probe {} failed: {err}", self.url);
                false
            }
        }
    }

    /// Poll until the receiving side goes away.
    pub fn spawn(self, events: mpsc::UnboundedSender<PlatformEvent>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;
                let online = self.probe_once().await;
                if events.send(PlatformEvent::Connectivity { online }).is_err() {
                    tracing::debug!("Connectivity probe stopping: shell gone");
                    break;
                }
            }
        })
    }
}
