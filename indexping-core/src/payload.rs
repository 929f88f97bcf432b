//! IndexNow submission payload
//!
//! Matches the JSON body expected by `POST /indexnow`:
//!
//! ```json
//! {
//!   "host": "example.com",
//!   "key": "0123456789abcdef0123456789abcdef",
//!   "urlList": ["https://example.com/hello-world/"],
//!   "keyLocation": "https://example.com/0123456789abcdef0123456789abcdef.txt"
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::collector::UrlSet;
use crate::hooks::Hooks;
use crate::site::Site;

/// Body of a submission request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionPayload {
    /// Host of the site the URLs belong to
    pub host: String,

    /// Identification key
    pub key: String,

    /// Changed addresses
    pub url_list: Vec<String>,

    /// Where the key file is published, if the site asserts one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_location: Option<String>,
}

/// Build a payload, or `None` when there is nothing to send
///
/// `urls` are deduplicated with empties removed. The key is trimmed; a blank
/// key or an empty URL list yields `None`. When `use_key_file` is set the key
/// file address is offered to [`Hooks::key_location`] and kept only if it comes
/// back non-empty.
pub fn build_payload<I, S>(
    site: &Site,
    key: &str,
    urls: I,
    use_key_file: bool,
    hooks: &dyn Hooks,
) -> Option<SubmissionPayload>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let key = key.trim();
    if key.is_empty() {
        return None;
    }

    let url_list = urls.into_iter().collect::<UrlSet>().into_vec();
    if url_list.is_empty() {
        return None;
    }

    let key_location = if use_key_file {
        let default = match site.key_file_url(key) {
            Ok(url) => Some(url.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "Could not derive key file location");
                None
            }
        };
        hooks
            .key_location(default)
            .filter(|location| !location.trim().is_empty())
    } else {
        None
    };

    Some(SubmissionPayload {
        host: site.host(),
        key: key.to_string(),
        url_list,
        key_location,
    })
}
