use std::collections::BTreeMap;

use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::HeaderMap;
use tracing::warn;
use url::form_urlencoded;

use crate::contract::ProxyRequest;
use crate::media_type::{self, MediaTypeError};

pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Methods whose body is read as form data.
const BODY_METHODS: [&str; 3] = ["POST", "PUT", "PATCH"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    InvalidMediaType(#[from] MediaTypeError),
    #[error("invalid URL escape in {segment:?}")]
    InvalidEscape { segment: String },
    #[error("invalid semicolon separator in {segment:?}")]
    SemicolonSeparator { segment: String },
}

/// Decoded form fields. A field may carry several values; order of arrival is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedForm {
    values: BTreeMap<String, Vec<String>>,
}

impl ParsedForm {
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values
            .entry(name.into())
            .or_default()
            .push(value.into());
    }

    /// First value submitted for `name`, if any.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.values
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn values(&self, name: &str) -> &[String] {
        self.values.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for ParsedForm
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut form = ParsedForm::default();
        for (name, value) in iter {
            form.append(name, value);
        }
        form
    }
}

#[derive(Debug, Clone)]
pub struct ParsedSubmission {
    method: String,
    headers: HeaderMap,
    form: ParsedForm,
}

impl ParsedSubmission {
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Header lookup; `name` is matched case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .and_then(|value| value.to_str().ok())
    }

    pub fn content_type(&self) -> Option<&str> {
        self.header(CONTENT_TYPE.as_str())
    }

    pub fn form(&self) -> &ParsedForm {
        &self.form
    }
}

/// Builds the submission view of a proxied request.
///
/// The body is decoded only for POST, PUT and PATCH requests declaring
/// `application/x-www-form-urlencoded`; anything else yields an empty form.
/// A `Content-Type` that is not a valid media type is an error for those
/// methods.
pub fn parse_submission(request: &ProxyRequest) -> Result<ParsedSubmission, FormError> {
    let reads_body = BODY_METHODS.contains(&request.http_method.as_str());
    let headers = build_header_map(&request.headers, reads_body)?;
    let form = if reads_body && declares_form_body(&headers)? {
        parse_form_body(&request.body)?
    } else {
        ParsedForm::default()
    };

    Ok(ParsedSubmission {
        method: request.http_method.clone(),
        headers,
        form,
    })
}

fn declares_form_body(headers: &HeaderMap) -> Result<bool, FormError> {
    let Some(value) = headers.get(CONTENT_TYPE) else {
        return Ok(false);
    };
    let raw = String::from_utf8_lossy(value.as_bytes());
    if raw.is_empty() {
        return Ok(false);
    }
    Ok(media_type::essence(&raw)? == FORM_URLENCODED)
}

/// Headers `http` cannot represent are skipped. When the body will be read,
/// an unrepresentable `Content-Type` is an error instead: it can never name a
/// valid media type.
fn build_header_map(
    raw: &BTreeMap<String, String>,
    reads_body: bool,
) -> Result<HeaderMap, FormError> {
    let mut headers = HeaderMap::with_capacity(raw.len());
    for (name, value) in raw {
        let Ok(header_name) = HeaderName::from_bytes(name.as_bytes()) else {
            warn!(
                component = "form_parser",
                event = "header_skipped",
                header = %name,
                reason = "invalid name"
            );
            continue;
        };
        match HeaderValue::from_str(value) {
            Ok(header_value) => {
                headers.append(header_name, header_value);
            }
            Err(_) if reads_body && header_name == CONTENT_TYPE => {
                return Err(MediaTypeError::new(value.as_str()).into());
            }
            Err(_) => warn!(
                component = "form_parser",
                event = "header_skipped",
                header = %name,
                reason = "invalid value"
            ),
        }
    }
    Ok(headers)
}

/// Decodes an `application/x-www-form-urlencoded` body.
///
/// Rejects bodies the lenient `form_urlencoded` decoder would silently accept:
/// broken `%` escapes and `;` used as a pair separator.
pub fn parse_form_body(body: &str) -> Result<ParsedForm, FormError> {
    let mut form = ParsedForm::default();
    for segment in body.split('&') {
        if segment.is_empty() {
            continue;
        }
        if segment.contains(';') {
            return Err(FormError::SemicolonSeparator {
                segment: segment.to_string(),
            });
        }
        if !has_valid_escapes(segment) {
            return Err(FormError::InvalidEscape {
                segment: segment.to_string(),
            });
        }
        for (name, value) in form_urlencoded::parse(segment.as_bytes()) {
            form.append(name.into_owned(), value.into_owned());
        }
    }
    Ok(form)
}

fn has_valid_escapes(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'%' {
            let escape = bytes.get(index + 1..index + 3);
            match escape {
                Some([high, low]) if high.is_ascii_hexdigit() && low.is_ascii_hexdigit() => {
                    index += 3;
                }
                _ => return false,
            }
        } else {
            index += 1;
        }
    }
    true
}
