use reqwest::Method;
use serde_json::Value;

use super::domain::{ApplicationForm, ApplicationFormPayload};
use crate::dates::DateConverter;
use crate::error::ClientError;
use crate::resource::{discard, no_body, ResourceAction, ResultShape};

/// Item and collection endpoint for application forms.
pub const APPLICATION_FORMS_TEMPLATE: &str = "api/application-forms/:id";

/// Full-text search endpoint backed by the search index.
pub const APPLICATION_FORMS_SEARCH_TEMPLATE: &str = "api/_search/application-forms/:id";

/// The verbs exposed for application forms, each with its request builder and response parser.
#[derive(Debug, Clone)]
pub struct ApplicationFormActions {
    pub query: ResourceAction<(), Vec<ApplicationFormPayload>>,
    pub get: ResourceAction<(), Option<ApplicationForm>>,
    pub save: ResourceAction<ApplicationForm, Option<ApplicationFormPayload>>,
    pub update: ResourceAction<ApplicationForm, Option<ApplicationFormPayload>>,
    pub delete: ResourceAction<(), ()>,
}

impl Default for ApplicationFormActions {
    fn default() -> Self {
        Self {
            query: ResourceAction {
                name: "query",
                method: Method::GET,
                shape: ResultShape::Array,
                transform_request: no_body::<()>,
                transform_response: parse_payloads,
            },
            get: ResourceAction {
                name: "get",
                method: Method::GET,
                shape: ResultShape::Object,
                transform_request: no_body::<()>,
                transform_response: parse_form,
            },
            save: ResourceAction {
                name: "save",
                method: Method::POST,
                shape: ResultShape::Object,
                transform_request: form_to_wire,
                transform_response: parse_payload,
            },
            update: ResourceAction {
                name: "update",
                method: Method::PUT,
                shape: ResultShape::Object,
                transform_request: form_to_wire,
                transform_response: parse_payload,
            },
            delete: ResourceAction {
                name: "delete",
                method: Method::DELETE,
                shape: ResultShape::Discarded,
                transform_request: no_body::<()>,
                transform_response: discard,
            },
        }
    }
}

/// Copies the form, renders `dob` in the server format, and emits the JSON body.
pub(crate) fn form_to_wire(
    form: &ApplicationForm,
    dates: &dyn DateConverter,
) -> Result<Option<Value>, ClientError> {
    let payload = ApplicationFormPayload::from_form(form, dates)?;
    let body = serde_json::to_value(payload).map_err(ClientError::Encode)?;
    Ok(Some(body))
}

/// Parses a single form and converts `dob` to a local date. No body, no form.
pub(crate) fn parse_form(
    body: Option<Value>,
    dates: &dyn DateConverter,
) -> Result<Option<ApplicationForm>, ClientError> {
    body.map(|value| -> Result<ApplicationForm, ClientError> {
        let payload: ApplicationFormPayload =
            serde_json::from_value(value).map_err(ClientError::Decode)?;
        payload.into_form(dates)
    })
    .transpose()
}

pub(crate) fn parse_payload(
    body: Option<Value>,
    _dates: &dyn DateConverter,
) -> Result<Option<ApplicationFormPayload>, ClientError> {
    body.map(|value| serde_json::from_value(value).map_err(ClientError::Decode))
        .transpose()
}

pub(crate) fn parse_payloads(
    body: Option<Value>,
    _dates: &dyn DateConverter,
) -> Result<Vec<ApplicationFormPayload>, ClientError> {
    match body {
        Some(value) => serde_json::from_value(value).map_err(ClientError::Decode),
        None => Ok(Vec::new()),
    }
}
