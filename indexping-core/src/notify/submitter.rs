//! Builds payloads and delivers them to the endpoint

use std::sync::Arc;

use crate::client::IndexNowClient;
use crate::config::IndexNowConfig;
use crate::error::Result;
use crate::hooks::Hooks;
use crate::key;
use crate::payload::build_payload;
use crate::report::ErrorReporter;
use crate::site::Site;
use crate::store::{OptionStore, USE_KEY_FILE};

use super::{Origin, Outcome, SkipReason};

/// Sends URL lists to IndexNow
pub struct Submitter {
    site: Site,
    store: Arc<dyn OptionStore>,
    client: IndexNowClient,
    endpoint: String,
    hooks: Arc<dyn Hooks>,
}

impl Submitter {
    /// Create a submitter for `site` using the endpoint settings in `config`
    pub fn new(
        site: Site,
        config: &IndexNowConfig,
        store: Arc<dyn OptionStore>,
        hooks: Arc<dyn Hooks>,
    ) -> Result<Self> {
        Ok(Self {
            site,
            store,
            client: IndexNowClient::new(config)?,
            endpoint: config.endpoint.clone(),
            hooks,
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn store(&self) -> &dyn OptionStore {
        self.store.as_ref()
    }

    pub fn client(&self) -> &IndexNowClient {
        &self.client
    }

    /// Endpoint after hooks are applied
    pub fn endpoint(&self) -> String {
        self.hooks.endpoint(self.endpoint.clone())
    }

    /// Submit `urls` once
    ///
    /// A missing key or an empty URL list is a silent no-op. Failures are
    /// logged, recorded for operators when `origin` is [`Origin::Admin`] and
    /// passed to [`Hooks::on_failure`]; they are never returned as errors.
    pub async fn submit(&self, urls: &[String], origin: Origin) -> Outcome {
        let key = match key::active_key(self.store.as_ref()) {
            Ok(Some(key)) => key,
            Ok(None) => {
                tracing::debug!("No IndexNow key configured, skipping submission");
                return Outcome::Skipped(SkipReason::MissingKey);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Could not read IndexNow key, skipping submission");
                return Outcome::Skipped(SkipReason::MissingKey);
            }
        };

        let use_key_file = self.store.get_flag(USE_KEY_FILE).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Could not read key file flag, assuming disabled");
            false
        });

        let urls = self.hooks.before_build(urls.to_vec());
        let Some(payload) =
            build_payload(&self.site, &key, urls, use_key_file, self.hooks.as_ref())
        else {
            tracing::debug!("No URLs to submit");
            return Outcome::Skipped(SkipReason::NoUrls);
        };

        let endpoint = self.endpoint();
        let options = self.hooks.request_options(self.client.request_options());
        self.hooks.before_send(&payload, &endpoint);

        match self.client.submit(&endpoint, &payload, &options).await {
            Ok(status) => {
                tracing::info!(
                    endpoint = %endpoint,
                    status,
                    urls = payload.url_list.len(),
                    "Submitted URLs to IndexNow"
                );
                self.hooks.on_success(&payload, status);
                Outcome::Accepted {
                    status,
                    urls: payload.url_list.len(),
                }
            }
            Err(e) => {
                let message = e.to_string();
                tracing::warn!(
                    endpoint = %endpoint,
                    urls = payload.url_list.len(),
                    error = %message,
                    "IndexNow submission failed"
                );
                if origin == Origin::Admin {
                    if let Err(record_err) = ErrorReporter::new(self.store.as_ref()).record(&message)
                    {
                        tracing::warn!(error = %record_err, "Could not record IndexNow failure");
                    }
                }
                self.hooks.on_failure(&payload, &e);
                Outcome::Failed { message }
            }
        }
    }
}
