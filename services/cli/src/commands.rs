use std::io::{self, Write};
use std::sync::Arc;

use application_forms::config::AppConfig;
use application_forms::error::AppError;
use application_forms::forms::{ApplicationForm, ApplicationFormClient, ApplicationFormId};
use application_forms::resource::ReqwestTransport;
use application_forms::ServerDateConverter;
use chrono::NaiveDate;
use clap::Args;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::info;

pub(crate) type FormsClient = ApplicationFormClient<ReqwestTransport, ServerDateConverter>;

#[derive(Args, Debug, Default)]
pub(crate) struct QueryArgs {
    /// Query parameter passed through verbatim (repeatable), e.g. --param page=0
    #[arg(long = "param", value_parser = parse_pair)]
    pub(crate) params: Vec<(String, String)>,
}

impl QueryArgs {
    fn as_pairs(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
            .collect()
    }
}

#[derive(Args, Debug, Default)]
pub(crate) struct FormArgs {
    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) dob: Option<NaiveDate>,
    /// Additional field (repeatable); JSON values are kept typed, anything else is a string
    #[arg(long = "field", value_parser = parse_field)]
    pub(crate) fields: Vec<(String, Value)>,
}

impl FormArgs {
    fn into_form(self, id: Option<i64>) -> ApplicationForm {
        ApplicationForm {
            id: id.map(ApplicationFormId),
            dob: self.dob,
            fields: self.fields.into_iter().collect(),
        }
    }
}

/// Local view of a form for printing: `dob` rendered as an ISO date.
#[derive(Debug, Serialize)]
struct FormView<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<ApplicationFormId>,
    dob: Option<NaiveDate>,
    #[serde(flatten)]
    fields: &'a Map<String, Value>,
}

impl<'a> From<&'a ApplicationForm> for FormView<'a> {
    fn from(form: &'a ApplicationForm) -> Self {
        Self {
            id: form.id,
            dob: form.dob,
            fields: &form.fields,
        }
    }
}

pub(crate) fn connect(config: &AppConfig) -> Result<FormsClient, AppError> {
    let dates = ServerDateConverter::new(config.api.date_format.clone())?;
    let transport = ReqwestTransport::with_timeout(config.api.base_url.clone(), config.api.timeout);

    info!(
        ?config.environment,
        base_url = %config.api.base_url,
        "application form client ready"
    );

    Ok(ApplicationFormClient::new(
        Arc::new(transport),
        Arc::new(dates),
    ))
}

pub(crate) async fn list(client: &FormsClient, args: QueryArgs) -> Result<(), AppError> {
    let forms = client.list(&args.as_pairs()).await?;
    print_json(&forms)
}

pub(crate) async fn get(client: &FormsClient, id: i64) -> Result<(), AppError> {
    let form = client.get(ApplicationFormId(id)).await?;
    print_json(&form.as_ref().map(FormView::from))
}

pub(crate) async fn create(client: &FormsClient, args: FormArgs) -> Result<(), AppError> {
    let created = client.save(&args.into_form(None)).await?;
    print_json(&created)
}

pub(crate) async fn update(client: &FormsClient, id: i64, args: FormArgs) -> Result<(), AppError> {
    let updated = client.update(&args.into_form(Some(id))).await?;
    print_json(&updated)
}

pub(crate) async fn delete(client: &FormsClient, id: i64) -> Result<(), AppError> {
    client.delete(ApplicationFormId(id)).await?;
    info!(id, "application form deleted");
    Ok(())
}

pub(crate) async fn search(
    client: &FormsClient,
    query: &str,
    args: QueryArgs,
) -> Result<(), AppError> {
    let hits = client.search(query, &args.as_pairs()).await?;
    print_json(&hits)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    serde_json::to_writer_pretty(&mut handle, value)?;
    writeln!(handle)?;
    Ok(())
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{raw}'")),
    }
}

pub(crate) fn parse_field(raw: &str) -> Result<(String, Value), String> {
    let (key, value) = parse_pair(raw)?;
    let value = serde_json::from_str(&value).unwrap_or(Value::String(value));
    Ok((key, value))
}
