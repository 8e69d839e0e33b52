//! Server directory download and flattening.
//!
//! # Document shape
//! ```text
//! <RESULT>
//!   <PARAMETERS>
//!     <INSTANCE>
//!       <LANGUAGE><LANG_ID>en</LANG_ID></LANGUAGE>
//!       <SUBJECT><SUBJ_ID>1</SUBJ_ID></SUBJECT>
//!       <BASE_LOGIQUE_ID>0</BASE_LOGIQUE_ID>
//!       <URL_BASE_WS>https://srv1.akinator.com:9398/ws</URL_BASE_WS>
//!       <CANDIDATS><URL>https://srv1m.akinator.com:9398/ws</URL></CANDIDATS>
//!     </INSTANCE>
//!   </PARAMETERS>
//! </RESULT>
//! ```

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;

use crate::config::DiscoveryConfig;
use crate::discovery::error::{DiscoveryError, DiscoveryResult};
use crate::observability::metrics;
use crate::server::{Language, ServerDescriptor, ServerType};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Default, Deserialize)]
struct DirectoryDocument {
    #[serde(rename = "PARAMETERS", default)]
    parameters: Option<Parameters>,
}

#[derive(Debug, Default, Deserialize)]
struct Parameters {
    #[serde(rename = "INSTANCE", default)]
    instances: Vec<Instance>,
}

#[derive(Debug, Deserialize)]
struct Instance {
    #[serde(rename = "LANGUAGE", default)]
    language: Option<LanguageNode>,
    #[serde(rename = "SUBJECT", default)]
    subject: Option<SubjectNode>,
    #[serde(rename = "BASE_LOGIQUE_ID", default)]
    base_id: String,
    #[serde(rename = "URL_BASE_WS", default)]
    url: String,
    #[serde(rename = "CANDIDATS", default)]
    candidates: Option<Candidates>,
}

#[derive(Debug, Deserialize)]
struct LanguageNode {
    #[serde(rename = "LANG_ID", default)]
    id: String,
}

#[derive(Debug, Deserialize)]
struct SubjectNode {
    #[serde(rename = "SUBJ_ID", default)]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct Candidates {
    #[serde(rename = "URL", default)]
    urls: Vec<String>,
}

/// Flatten a directory document into descriptors, in document order.
///
/// Each instance yields its primary URL followed by its mirrors. Blank URLs
/// are skipped. Any unknown language or subject code fails the whole parse.
pub fn parse_directory(xml: &str) -> DiscoveryResult<Vec<ServerDescriptor>> {
    let document: DirectoryDocument =
        quick_xml::de::from_str(xml).map_err(|e| DiscoveryError::Malformed(e.to_string()))?;

    let instances = document
        .parameters
        .map(|p| p.instances)
        .unwrap_or_default();

    let mut servers = Vec::new();
    for instance in instances {
        let language_code = instance.language.map(|l| l.id).unwrap_or_default();
        let subject_code = instance.subject.map(|s| s.id).unwrap_or_default();
        let language = Language::from_code(language_code.trim())?;
        let server_type = ServerType::from_code(subject_code.trim())?;
        let base_id = instance.base_id.trim().to_string();

        let mirrors = instance.candidates.map(|c| c.urls).unwrap_or_default();
        for url in std::iter::once(instance.url).chain(mirrors) {
            let url = url.trim();
            if url.is_empty() {
                tracing::warn!(base_id = %base_id, language = %language, "Skipping blank server URL");
                continue;
            }
            servers.push(ServerDescriptor::new(language, server_type, base_id.clone(), url));
        }
    }

    Ok(servers)
}

/// Downloads the server directory.
pub struct DirectoryFetcher {
    transport: Arc<dyn Transport>,
    url: String,
    timeout: Duration,
}

impl DirectoryFetcher {
    pub fn new(transport: Arc<dyn Transport>, config: &DiscoveryConfig) -> Self {
        Self {
            transport,
            url: config.url.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch and flatten the directory. Issues exactly one request.
    pub async fn fetch(&self, cancel: &CancellationToken) -> DiscoveryResult<Vec<ServerDescriptor>> {
        if cancel.is_cancelled() {
            return Err(DiscoveryError::Cancelled);
        }

        let result = self.fetch_inner(cancel).await;
        match &result {
            Ok(servers) => {
                tracing::info!(url = %self.url, servers = servers.len(), "Server directory loaded");
                metrics::record_directory_fetch("success");
            }
            Err(DiscoveryError::Cancelled) => metrics::record_directory_fetch("cancelled"),
            Err(e) => {
                tracing::error!(url = %self.url, error = %e, "Server directory fetch failed");
                metrics::record_directory_fetch("failure");
            }
        }
        result
    }

    async fn fetch_inner(&self, cancel: &CancellationToken) -> DiscoveryResult<Vec<ServerDescriptor>> {
        let response = match time::timeout(self.timeout, self.transport.get(&self.url, cancel)).await {
            Ok(response) => response?,
            Err(_) => {
                return Err(DiscoveryError::from(TransportError::Timeout {
                    url: self.url.clone(),
                }))
            }
        };

        if !response.is_ok() {
            return Err(DiscoveryError::Status {
                url: self.url.clone(),
                status: response.status,
            });
        }

        parse_directory(&response.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    const DIRECTORY_URL: &str = "https://directory.test/instances";

    const TWO_INSTANCES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<RESULT>
  <COMPLETION>OK</COMPLETION>
  <PARAMETERS>
    <INSTANCE>
      <TRANSLATED_LANGUAGE>English</TRANSLATED_LANGUAGE>
      <LANGUAGE><LANG_ID>en</LANG_ID><LANG_NAME>English</LANG_NAME></LANGUAGE>
      <SUBJECT><SUBJ_ID>1</SUBJ_ID><NAME>Characters</NAME></SUBJECT>
      <BASE_LOGIQUE_ID>b1</BASE_LOGIQUE_ID>
      <URL_BASE_WS>https://srv1</URL_BASE_WS>
      <CANDIDATS><URL>https://srv1m</URL></CANDIDATS>
    </INSTANCE>
    <INSTANCE>
      <LANGUAGE><LANG_ID>fr</LANG_ID></LANGUAGE>
      <SUBJECT><SUBJ_ID>14</SUBJ_ID></SUBJECT>
      <BASE_LOGIQUE_ID>b2</BASE_LOGIQUE_ID>
      <URL_BASE_WS>https://srv2</URL_BASE_WS>
      <CANDIDATS></CANDIDATS>
    </INSTANCE>
  </PARAMETERS>
</RESULT>"#;

    fn fetcher(mock: MockTransport) -> (Arc<MockTransport>, DirectoryFetcher) {
        let mock = Arc::new(mock);
        let config = DiscoveryConfig {
            url: DIRECTORY_URL.into(),
            timeout_secs: 5,
        };
        let fetcher = DirectoryFetcher::new(mock.clone(), &config);
        (mock, fetcher)
    }

    #[test]
    fn test_primary_and_mirror_share_identity() {
        let servers = parse_directory(TWO_INSTANCES).unwrap();
        assert_eq!(
            servers,
            vec![
                ServerDescriptor::new(Language::English, ServerType::Person, "b1", "https://srv1"),
                ServerDescriptor::new(Language::English, ServerType::Person, "b1", "https://srv1m"),
                ServerDescriptor::new(Language::French, ServerType::Animal, "b2", "https://srv2"),
            ]
        );
    }

    #[test]
    fn test_interleaved_elements_are_ignored() {
        let xml = r#"<RESULT><PARAMETERS>
            <INSTANCE>
              <LANGUAGE><LANG_ID>en</LANG_ID></LANGUAGE>
              <SUBJECT><SUBJ_ID>1</SUBJ_ID></SUBJECT>
              <BASE_LOGIQUE_ID>b1</BASE_LOGIQUE_ID>
              <URL_BASE_WS>https://srv1</URL_BASE_WS>
              <CANDIDATS><URL>https://srv1m</URL><WEIGHT>3</WEIGHT><URL>https://srv1n</URL></CANDIDATS>
            </INSTANCE>
            <NOTE>maintenance window</NOTE>
            <INSTANCE>
              <LANGUAGE><LANG_ID>fr</LANG_ID></LANGUAGE>
              <SUBJECT><SUBJ_ID>14</SUBJ_ID></SUBJECT>
              <BASE_LOGIQUE_ID>b2</BASE_LOGIQUE_ID>
              <URL_BASE_WS>https://srv2</URL_BASE_WS>
            </INSTANCE>
        </PARAMETERS></RESULT>"#;

        let urls: Vec<_> = parse_directory(xml)
            .unwrap()
            .into_iter()
            .map(|server| server.url)
            .collect();
        assert_eq!(
            urls,
            vec!["https://srv1", "https://srv1m", "https://srv1n", "https://srv2"]
        );
    }

    #[test]
    fn test_no_instances_is_empty() {
        assert!(parse_directory("<RESULT><PARAMETERS></PARAMETERS></RESULT>")
            .unwrap()
            .is_empty());
        assert!(parse_directory("<RESULT><COMPLETION>OK</COMPLETION></RESULT>")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_language_fails_everything() {
        let xml = TWO_INSTANCES.replace("<LANG_ID>fr</LANG_ID>", "<LANG_ID>xx</LANG_ID>");
        let err = parse_directory(&xml).unwrap_err();
        assert!(matches!(err, DiscoveryError::UnsupportedCode(ref c) if c.code == "xx"));
    }

    #[test]
    fn test_unknown_subject_fails_everything() {
        let xml = TWO_INSTANCES.replace("<SUBJ_ID>14</SUBJ_ID>", "<SUBJ_ID>99</SUBJ_ID>");
        assert!(matches!(parse_directory(&xml), Err(DiscoveryError::UnsupportedCode(_))));
    }

    #[test]
    fn test_missing_language_fails() {
        let xml = TWO_INSTANCES.replace(
            "<LANGUAGE><LANG_ID>fr</LANG_ID></LANGUAGE>",
            "",
        );
        assert!(matches!(parse_directory(&xml), Err(DiscoveryError::UnsupportedCode(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            parse_directory("<RESULT><PARAMETERS>"),
            Err(DiscoveryError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_issues_one_request() {
        let (mock, fetcher) = fetcher(MockTransport::new().respond(DIRECTORY_URL, 200, TWO_INSTANCES));
        let servers = fetcher.fetch(&CancellationToken::new()).await.unwrap();
        assert_eq!(servers.len(), 3);
        assert_eq!(mock.call_count(DIRECTORY_URL), 1);
    }

    #[tokio::test]
    async fn test_fetch_non_ok_status() {
        let (_, fetcher) = fetcher(MockTransport::new().respond(DIRECTORY_URL, 502, "bad gateway"));
        let err = fetcher.fetch(&CancellationToken::new()).await.unwrap_err();
        assert_eq!(
            err,
            DiscoveryError::Status {
                url: DIRECTORY_URL.into(),
                status: 502
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let (_, fetcher) = fetcher(MockTransport::new().fail(DIRECTORY_URL));
        let err = fetcher.fetch(&CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, DiscoveryError::Transport(TransportError::Request { .. })));
    }

    #[tokio::test]
    async fn test_fetch_cancelled_before_start() {
        let (mock, fetcher) = fetcher(MockTransport::new().respond(DIRECTORY_URL, 200, TWO_INSTANCES));
        let cancel = CancellationToken::new();
        cancel.cancel();
        assert_eq!(fetcher.fetch(&cancel).await, Err(DiscoveryError::Cancelled));
        assert!(mock.calls().is_empty());
    }
}
