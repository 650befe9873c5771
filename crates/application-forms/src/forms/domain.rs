use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::dates::{DateConversionError, DateConverter};
use crate::error::ClientError;

/// Keys carried by typed attributes; they never travel inside the opaque field map.
pub const RESERVED_FIELDS: [&str; 2] = ["id", "dob"];

/// Identifier assigned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationFormId(pub i64);

impl fmt::Display for ApplicationFormId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ApplicationFormId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// An application form as callers work with it: `dob` is a local date.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationForm {
    pub id: Option<ApplicationFormId>,
    pub dob: Option<NaiveDate>,
    /// Every other attribute, passed through untouched.
    pub fields: Map<String, Value>,
}

impl ApplicationForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id(mut self, id: ApplicationFormId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_dob(mut self, dob: NaiveDate) -> Self {
        self.dob = Some(dob);
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }
}

/// Wire shape of an application form, held exactly as the server sent it.
///
/// Operations that do not shape their responses (list, search, save, update)
/// return this type. Nothing is typed or converted here: `dob` keeps whatever
/// representation the server chose, and keys that were absent stay absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationFormPayload(pub Map<String, Value>);

impl ApplicationFormPayload {
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id")
    }

    pub fn dob(&self) -> Option<&Value> {
        self.0.get("dob")
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Deep copies `form` into its wire shape. The caller's record is only borrowed.
    ///
    /// `dob` is always written (`null` when absent); `id` only when known.
    pub fn from_form(
        form: &ApplicationForm,
        dates: &dyn DateConverter,
    ) -> Result<Self, DateConversionError> {
        let mut map: Map<String, Value> = form
            .fields
            .iter()
            .filter(|(key, _)| !RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if let Some(id) = form.id {
            map.insert("id".to_string(), Value::from(id.0));
        }
        let dob = dates.to_server(form.dob)?.map_or(Value::Null, Value::String);
        map.insert("dob".to_string(), dob);

        Ok(Self(map))
    }

    /// Types `id` and converts `dob` to a local date. A non-integer id or a
    /// non-string `dob` is a decode error; a malformed date string is a date error.
    pub fn into_form(self, dates: &dyn DateConverter) -> Result<ApplicationForm, ClientError> {
        let mut fields = self.0;

        let id = match fields.remove("id") {
            None | Some(Value::Null) => None,
            Some(raw) => Some(
                serde_json::from_value::<ApplicationFormId>(raw).map_err(ClientError::Decode)?,
            ),
        };
        let dob = match fields.remove("dob") {
            None => None,
            Some(raw) => {
                serde_json::from_value::<Option<String>>(raw).map_err(ClientError::Decode)?
            }
        };

        Ok(ApplicationForm {
            id,
            dob: dates.from_server(dob.as_deref())?,
            fields,
        })
    }
}
