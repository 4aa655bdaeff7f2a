//! Settings codec for the per-kind discriminated unions.
//!
//! [`ContactChannel`] and [`MonitorType`] are closed sum types; each variant
//! has an explicit encoder to the opaque wire object and an explicit parser
//! back from it. `encode` omits absent optionals, `decode` leaves them
//! `None`, and defaults are applied separately by `canonical()` so that
//! `decode(tag, encode(v)) == v` holds for every variant.

pub mod channel;
pub mod monitor;

pub use channel::{
    ContactChannel, DiscordSettings, EmailSettings, IncidentIoSettings, OpsgenieResponder,
    OpsgenieSettings, PagerDutySettings, SeverityMapping, SlackSettings, SmsSettings,
    WebhookSettings, ZendeskCustomField, ZendeskSettings,
};
pub use monitor::{HttpsSettings, MonitorType, PingSettings, TcpSettings};

use crate::error::{Error, Result};
use serde_json::{Map, Value};

/// Placeholder printed instead of credentials.
pub(crate) const REDACTED: &str = "[redacted]";

/// Builds a wire payload field by field.
#[derive(Debug, Default)]
pub(crate) struct PayloadWriter {
    map: Map<String, Value>,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn str(mut self, key: &str, value: &str) -> Self {
        self.map.insert(key.to_string(), Value::String(value.to_string()));
        self
    }

    pub fn opt_str(self, key: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.str(key, v),
            None => self,
        }
    }

    pub fn opt_bool(mut self, key: &str, value: Option<bool>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), Value::Bool(v));
        }
        self
    }

    pub fn opt_str_list(mut self, key: &str, value: Option<&[String]>) -> Self {
        if let Some(items) = value {
            let items = items.iter().cloned().map(Value::String).collect();
            self.map.insert(key.to_string(), Value::Array(items));
        }
        self
    }

    pub fn opt_value(mut self, key: &str, value: Option<Value>) -> Self {
        if let Some(v) = value {
            self.map.insert(key.to_string(), v);
        }
        self
    }

    pub fn finish(self) -> Map<String, Value> {
        self.map
    }
}

/// Reads typed fields out of a wire payload, failing with
/// [`Error::MalformedPayload`] on missing or mistyped fields.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PayloadReader<'a> {
    tag: &'a str,
    prefix: &'a str,
    map: &'a Map<String, Value>,
}

impl<'a> PayloadReader<'a> {
    pub fn new(tag: &'a str, payload: &'a Value) -> Result<Self> {
        match payload {
            Value::Object(map) => Ok(Self {
                tag,
                prefix: "",
                map,
            }),
            _ => Err(Error::malformed(tag, "<payload>", "must be an object")),
        }
    }

    /// Reader for a nested object, reporting fields as `prefix.field`.
    pub fn nested(tag: &'a str, prefix: &'a str, value: &'a Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self { tag, prefix, map }),
            _ => Err(Error::malformed(tag, prefix, "must be an object")),
        }
    }

    fn path(&self, field: &str) -> String {
        if self.prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{field}", self.prefix)
        }
    }

    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|v| !v.is_null())
    }

    pub fn required_str(&self, field: &str) -> Result<String> {
        self.opt_str(field)?
            .ok_or_else(|| Error::malformed(self.tag, self.path(field), "is required"))
    }

    pub fn opt_str(&self, field: &str) -> Result<Option<String>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::malformed(self.tag, self.path(field), "must be a string")),
        }
    }

    pub fn required_i64(&self, field: &str) -> Result<i64> {
        match self.get(field) {
            None => Err(Error::malformed(self.tag, self.path(field), "is required")),
            Some(v) => v
                .as_i64()
                .ok_or_else(|| Error::malformed(self.tag, self.path(field), "must be an integer")),
        }
    }

    pub fn opt_bool(&self, field: &str) -> Result<Option<bool>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(_) => Err(Error::malformed(self.tag, self.path(field), "must be a boolean")),
        }
    }

    pub fn opt_array(&self, field: &str) -> Result<Option<&'a Vec<Value>>> {
        match self.get(field) {
            None => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(Error::malformed(self.tag, self.path(field), "must be an array")),
        }
    }

    pub fn opt_str_list(&self, field: &str) -> Result<Option<Vec<String>>> {
        let Some(items) = self.opt_array(field)? else {
            return Ok(None);
        };
        items
            .iter()
            .map(|item| match item {
                Value::String(s) => Ok(s.clone()),
                _ => Err(Error::malformed(self.tag, self.path(field), "must contain only strings")),
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    pub fn opt_nested(&self, field: &'a str) -> Result<Option<PayloadReader<'a>>> {
        match self.get(field) {
            None => Ok(None),
            Some(value) => Self::nested(self.tag, field, value).map(Some),
        }
    }
}

/// `Some(empty)` becomes `None`.
pub(crate) fn non_empty<T>(items: Option<Vec<T>>) -> Option<Vec<T>> {
    items.filter(|v| !v.is_empty())
}
