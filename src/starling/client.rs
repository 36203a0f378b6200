use reqwest::blocking::Client;
use serde_json::json;

use super::ItemSource;
use crate::core::item::RawItem;
use crate::core::person_date::PersonSource;
use crate::core::props::Person;
use crate::core::repeat::RecurrenceSource;
use crate::core::timestamp::Timestamp;
use crate::error::{Error, Result};

/// Blocking HTTP client for the Starling note-graph server. Every run is a
/// handful of sequential fetches followed by in-memory transforms, so
/// there's nothing to gain from an async client here.
pub struct StarlingClient {
    base_url: String,
    http: Client,
}

impl StarlingClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| Error::Starling(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
        what: &str,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .json(body)
            .send()
            .map_err(|e| Error::Starling(format!("failed to get {what}: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().unwrap_or_default();
            return Err(Error::Starling(format!(
                "failed to get {what}: {status}: {text}"
            )));
        }

        resp.json()
            .map_err(|e| Error::Starling(format!("failed to parse {what}: {e}")))
    }
}

impl ItemSource for StarlingClient {
    fn action_items(&self, extra: &[String]) -> Result<Vec<RawItem>> {
        let mut body = json!({
            "conn_format": "markdown",
            "metadata": true,
            "children": true,
        });
        for key in extra {
            body[key] = json!(true);
        }
        log::debug!("fetching action items with extra fields {extra:?}");
        self.get_json("/index/action_items/nodes", &body, "action items")
    }
}

impl RecurrenceSource for StarlingClient {
    fn next_timestamp(&self, ts: &Timestamp) -> Result<Timestamp> {
        // Normalization may have dropped the activity flag conceptually, but
        // the endpoint expects a fully-formed timestamp.
        let mut ts = ts.clone();
        ts.active = true;
        self.get_json(
            "/utils/next-timestamp",
            &serde_json::to_value(&ts)
                .map_err(|e| Error::Starling(format!("failed to encode timestamp: {e}")))?,
            "next timestamp",
        )
    }
}

#[derive(serde::Deserialize)]
struct PersonNode {
    id: String,
    title: Vec<String>,
}

impl PersonSource for StarlingClient {
    fn person(&self, path: &str) -> Result<Person> {
        let root_id: String = self.get_json(
            &format!("/root-id/{}", percent_encode(path)),
            &json!({}),
            "person root ID",
        )?;
        let node: PersonNode = self.get_json(
            &format!("/node/{root_id}"),
            &json!({ "conn_format": "markdown" }),
            "person name",
        )?;
        let name = node
            .title
            .last()
            .map(|t| t.strip_prefix("(Person) ").unwrap_or(t).to_string())
            .unwrap_or_default();
        Ok(Person { name, id: node.id })
    }
}

/// Percent-encode every byte outside the unreserved set, including `/`, so a
/// file path fits into a single URL segment.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}
