use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

pub const FOUND_STATUS_CODE: u16 = 302;
pub const LOCATION_HEADER: &str = "Location";

/// Proxied request as delivered by an API Gateway proxy integration.
///
/// Only the fields the handler consumes are modelled; everything else in the
/// event is ignored during deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyRequest {
    #[serde(rename = "httpMethod", default, deserialize_with = "null_as_default")]
    pub http_method: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
}

impl ProxyRequest {
    pub fn new<N, V>(
        http_method: impl Into<String>,
        headers: impl IntoIterator<Item = (N, V)>,
        body: impl Into<String>,
    ) -> Self
    where
        N: Into<String>,
        V: Into<String>,
    {
        Self {
            http_method: http_method.into(),
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
            body: body.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProxyResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl ProxyResponse {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status_code: FOUND_STATUS_CODE,
            headers: BTreeMap::from([(LOCATION_HEADER.to_string(), location.into())]),
            body: String::new(),
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.headers.get(LOCATION_HEADER).map(String::as_str)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
