use crate::api::Error;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::value::RawValue;

/* Some firmware versions omit parts of `Head`; missing or null fields read as success */
#[derive(Deserialize, Default)]
#[serde(default)]
struct Status {
    #[serde(rename = "Code")]
    code: Option<i64>,
    #[serde(rename = "Reason")]
    reason: Option<String>,
    #[serde(rename = "UserMessage")]
    user_message: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Head {
    #[serde(rename = "Status")]
    status: Status,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Body {
    #[serde(rename = "Data", deserialize_with = "present")]
    data: Option<Box<RawValue>>,
}

/* An explicit `"Data": null` is a payload of its own; only a missing field is `None` */
fn present<'de, D>(d: D) -> Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(d).map(Some)
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(rename = "Head", default)]
    head: Head,
    #[serde(rename = "Body", default)]
    body: Body,
}

/// `Body.Data` of a successful response, kept as the exact JSON text the device sent.
#[derive(Debug)]
pub struct Payload(Box<RawValue>);

impl Payload {
    pub fn get(&self) -> &str {
        self.0.get()
    }

    /// Decode the payload into the shape expected for the request that produced it.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(self.0.get())
    }
}

/// Parse a response envelope, returning its payload if `Head.Status.Code` is 0.
pub fn parse(bytes: &[u8]) -> Result<Payload, Error> {
    let envelope: Envelope = serde_json::from_slice(bytes)?;
    let status = envelope.head.status;

    match status.code.unwrap_or(0) {
        0 => envelope
            .body
            .data
            .map(Payload)
            .ok_or_else(|| Error::Decode(String::from("missing Body.Data in response"))),
        code => Err(Error::Protocol {
            code,
            reason: status.reason.unwrap_or_default(),
            message: status.user_message.unwrap_or_default(),
        }),
    }
}
