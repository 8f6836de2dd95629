//! Client for the server's tag mutation endpoints.

use tokio::task::JoinHandle;
use url::Url;

use crate::SanityError;
use crate::config::Config;

/// One tag mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    /// Attach `tag` to paper `pid`
    Add { pid: String, tag: String },
    /// Detach `tag` from paper `pid`
    Sub { pid: String, tag: String },
    /// Delete `tag` from every paper
    Delete { tag: String },
}

impl TagAction {
    /// Path segments below the endpoint root, unencoded.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            TagAction::Add { pid, tag } => vec!["add", pid, tag],
            TagAction::Sub { pid, tag } => vec!["sub", pid, tag],
            TagAction::Delete { tag } => vec!["del", tag],
        }
    }
}

#[derive(Debug, Clone)]
pub struct TagClient {
    pub client: reqwest::Client,
    endpoint: Url,
}

impl TagClient {
    pub fn new(endpoint: &str) -> Result<Self, SanityError> {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str) -> Result<Self, SanityError> {
        let endpoint =
            Url::parse(endpoint).map_err(|e| SanityError::Endpoint(format!("{endpoint}: {e}")))?;
        if endpoint.cannot_be_a_base() {
            return Err(SanityError::Endpoint(endpoint.to_string()));
        }
        Ok(Self { client, endpoint })
    }

    pub fn from_config(config: &Config) -> Result<Self, SanityError> {
        Self::new(&config.endpoint)
    }

    /// Full request URL for `action`, with tag and paper id percent-encoded.
    pub fn url_for(&self, action: &TagAction) -> Url {
        let mut url = self.endpoint.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty();
            path.extend(action.segments());
        }
        url
    }

    /// Performs the request and returns the response body.
    #[tracing::instrument(skip(self), fields(url = tracing::field::Empty))]
    pub async fn send(&self, action: TagAction) -> Result<String, SanityError> {
        let url = self.url_for(&action);
        tracing::Span::current().record("url", url.as_str());

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| SanityError::Http {
                url: url.to_string(),
                source,
            })?;
        let status = response.status();
        let body = response.text().await.map_err(|source| SanityError::Http {
            url: url.to_string(),
            source,
        })?;
        tracing::debug!(status = status.as_u16(), %body, "tag endpoint responded");

        if !status.is_success() {
            return Err(SanityError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(body)
    }

    /// Spawns the request without waiting for it; the outcome is only logged.
    ///
    /// Must be called from within a tokio runtime.
    pub fn send_detached(&self, action: TagAction) -> JoinHandle<()> {
        let client = self.clone();
        tokio::spawn(async move {
            if let Err(e) = client.send(action).await {
                tracing::warn!(error = %e, "tag request failed");
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(endpoint: &str) -> TagClient {
        TagClient::new(endpoint).unwrap()
    }

    #[test]
    fn builds_add_and_sub_urls() {
        let c = client("http://localhost:5000");
        let add = TagAction::Add {
            pid: "2401.00001".into(),
            tag: "interp".into(),
        };
        assert_eq!(
            c.url_for(&add).as_str(),
            "http://localhost:5000/add/2401.00001/interp"
        );
        let sub = TagAction::Sub {
            pid: "2401.00001".into(),
            tag: "interp".into(),
        };
        assert_eq!(
            c.url_for(&sub).as_str(),
            "http://localhost:5000/sub/2401.00001/interp"
        );
    }

    #[test]
    fn delete_url_has_single_tag_segment() {
        let c = client("http://localhost:5000/");
        let del = TagAction::Delete { tag: "old".into() };
        assert_eq!(c.url_for(&del).as_str(), "http://localhost:5000/del/old");
    }

    #[test]
    fn keeps_endpoint_prefix_and_encodes_segments() {
        let c = client("https://example.org/sanity/");
        let add = TagAction::Add {
            pid: "2401.00001".into(),
            tag: "a/b c".into(),
        };
        assert_eq!(
            c.url_for(&add).as_str(),
            "https://example.org/sanity/add/2401.00001/a%2Fb%20c"
        );
    }

    #[test]
    fn rejects_non_base_endpoint() {
        assert!(matches!(
            TagClient::new("mailto:someone@example.org"),
            Err(SanityError::Endpoint(_))
        ));
        assert!(matches!(
            TagClient::new("not a url"),
            Err(SanityError::Endpoint(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        // Port 9 (discard) is essentially never listening on loopback.
        let c = client("http://127.0.0.1:9");
        let err = c
            .send(TagAction::Delete { tag: "x".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, SanityError::Http { .. }));
    }

    #[tokio::test]
    async fn detached_request_swallows_failure() {
        let c = client("http://127.0.0.1:9");
        let handle = c.send_detached(TagAction::Add {
            pid: "1".into(),
            tag: "t".into(),
        });
        assert!(handle.await.is_ok());
    }
}
