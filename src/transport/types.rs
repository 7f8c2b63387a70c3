//! Wire payloads for the per-mode routes

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Request body. The mode is carried by the route, not here.
#[derive(Debug, Serialize)]
pub(crate) struct MessageRequest<'a> {
    pub message: &'a str,
}

/// A retrieved source passage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    pub book: String,
    #[serde(deserialize_with = "string_or_number")]
    pub chapter: String,
    pub text: String,
}

/// Successful response, in one of the two shapes an operation may return
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponsePayload {
    /// A single free-text reply
    Reply(String),
    /// Zero or more retrieved passages, in backend order
    Passages(Vec<Passage>),
}

impl ResponsePayload {
    pub fn shape(&self) -> &'static str {
        match self {
            ResponsePayload::Reply(_) => "reply",
            ResponsePayload::Passages(_) => "passages",
        }
    }

    /// Number of transcript entries this payload will produce
    pub fn entry_count(&self) -> usize {
        match self {
            ResponsePayload::Reply(_) => 1,
            ResponsePayload::Passages(passages) => passages.len(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireResponse {
    Passages { passages: Vec<Passage> },
    Reply { reply: String },
}

impl From<WireResponse> for ResponsePayload {
    fn from(wire: WireResponse) -> Self {
        match wire {
            WireResponse::Passages { passages } => ResponsePayload::Passages(passages),
            WireResponse::Reply { reply } => ResponsePayload::Reply(reply),
        }
    }
}

pub(crate) fn decode_payload(body: &str) -> Result<ResponsePayload, serde_json::Error> {
    serde_json::from_str::<WireResponse>(body).map(ResponsePayload::from)
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!(
            "expected string or number for chapter, got {other}"
        ))),
    }
}
