//! Generic REST resource plumbing: URL templates, action descriptions, and
//! the dispatch pipeline that runs an action's transforms around a transport call.

pub mod transport;

use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::dates::DateConverter;
use crate::error::ClientError;

pub use transport::{
    HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError, ACCEPT_JSON,
};

/// Builds an optional JSON body from the caller's input.
pub type RequestTransform<I> = fn(&I, &dyn DateConverter) -> Result<Option<Value>, ClientError>;

/// Shapes the decoded response body (`None` when the server sent no data).
pub type ResponseTransform<O> = fn(Option<Value>, &dyn DateConverter) -> Result<O, ClientError>;

/// What an action expects back: a JSON array, a single object, or nothing it cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultShape {
    Array,
    Object,
    /// The body is never decoded; any payload is accepted and dropped.
    Discarded,
}

impl ResultShape {
    fn accepts(self, value: &Value) -> bool {
        match self {
            ResultShape::Array => value.is_array(),
            ResultShape::Object => value.is_object(),
            ResultShape::Discarded => true,
        }
    }
}

impl fmt::Display for ResultShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultShape::Array => f.write_str("an array"),
            ResultShape::Object => f.write_str("an object"),
            ResultShape::Discarded => f.write_str("no body"),
        }
    }
}

/// One verb of a resource, with its request builder and response parser.
pub struct ResourceAction<I, O> {
    pub name: &'static str,
    pub method: Method,
    pub shape: ResultShape,
    pub transform_request: RequestTransform<I>,
    pub transform_response: ResponseTransform<O>,
}

impl<I, O> Clone for ResourceAction<I, O> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            method: self.method.clone(),
            shape: self.shape,
            transform_request: self.transform_request,
            transform_response: self.transform_response,
        }
    }
}

impl<I, O> fmt::Debug for ResourceAction<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceAction")
            .field("name", &self.name)
            .field("method", &self.method)
            .field("shape", &self.shape)
            .finish_non_exhaustive()
    }
}

/// Request builder for actions that send no body.
pub fn no_body<I>(_input: &I, _dates: &dyn DateConverter) -> Result<Option<Value>, ClientError> {
    Ok(None)
}

/// Response parser that drops whatever the server returned.
pub fn discard(_body: Option<Value>, _dates: &dyn DateConverter) -> Result<(), ClientError> {
    Ok(())
}

/// URL pattern with `:name` placeholders, e.g. `api/application-forms/:id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTemplate {
    pattern: String,
}

impl ResourceTemplate {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// Substitutes `params` into the pattern. A placeholder with no value is
    /// removed together with its leading slash.
    pub fn expand(&self, params: &[(&str, &str)]) -> String {
        let mut segments = Vec::new();
        for segment in self.pattern.split('/') {
            match segment.strip_prefix(':') {
                Some(name) => {
                    if let Some((_, value)) = params.iter().find(|(key, _)| *key == name) {
                        segments.push((*value).to_string());
                    }
                }
                None => segments.push(segment.to_string()),
            }
        }
        segments.join("/")
    }

    /// Convenience for the common single `:id` template.
    pub fn expand_id(&self, id: Option<&str>) -> String {
        match id {
            Some(id) => self.expand(&[("id", id)]),
            None => self.expand(&[]),
        }
    }
}

/// A template bound to a transport.
pub struct Resource<T: ?Sized> {
    transport: Arc<T>,
    template: ResourceTemplate,
}

impl<T: ?Sized> Clone for Resource<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            template: self.template.clone(),
        }
    }
}

impl<T> Resource<T>
where
    T: Transport + ?Sized,
{
    pub fn new(transport: Arc<T>, template: ResourceTemplate) -> Self {
        Self {
            transport,
            template,
        }
    }

    /// Runs `action`: builds and serializes the request body, dispatches it,
    /// decodes the response, checks its shape, and hands it to the parser.
    pub async fn invoke<I, O>(
        &self,
        action: &ResourceAction<I, O>,
        id: Option<&str>,
        params: &[(&str, &str)],
        input: &I,
        dates: &dyn DateConverter,
    ) -> Result<O, ClientError> {
        let body = (action.transform_request)(input, dates)?
            .map(|value| serde_json::to_string(&value))
            .transpose()
            .map_err(ClientError::Encode)?;

        let request = HttpRequest {
            method: action.method.clone(),
            path: self.template.expand_id(id),
            query: params
                .iter()
                .map(|(key, value)| (key.to_string(), value.to_string()))
                .collect(),
            body,
        };

        debug!(
            action = action.name,
            method = %request.method,
            path = %request.path,
            "dispatching resource request"
        );

        let response = self.transport.execute(request).await?;
        let data = decode_body(action, response.body.as_deref())?;
        (action.transform_response)(data, dates)
    }
}

fn decode_body<I, O>(
    action: &ResourceAction<I, O>,
    raw: Option<&str>,
) -> Result<Option<Value>, ClientError> {
    if action.shape == ResultShape::Discarded {
        return Ok(None);
    }
    let raw = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(raw) => raw,
    };

    let value: Value = serde_json::from_str(raw).map_err(ClientError::Decode)?;
    if value.is_null() {
        return Ok(None);
    }
    if !action.shape.accepts(&value) {
        return Err(ClientError::ShapeMismatch {
            action: action.name,
            expected: action.shape,
            found: json_kind(&value),
        });
    }
    Ok(Some(value))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
