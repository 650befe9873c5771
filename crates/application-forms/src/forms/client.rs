use std::sync::Arc;

use super::actions::{
    ApplicationFormActions, APPLICATION_FORMS_SEARCH_TEMPLATE, APPLICATION_FORMS_TEMPLATE,
};
use super::domain::{ApplicationForm, ApplicationFormId, ApplicationFormPayload};
use crate::dates::DateConverter;
use crate::error::ClientError;
use crate::resource::{Resource, ResourceTemplate, Transport};

/// Stateless accessor for `api/application-forms/:id`.
///
/// The transport and date converter are handed in by the caller; the client
/// keeps no state between calls, so one instance can serve concurrent
/// requests from behind an `Arc`.
pub struct ApplicationFormClient<T, D> {
    forms: Resource<T>,
    search: Resource<T>,
    dates: Arc<D>,
    actions: ApplicationFormActions,
}

impl<T, D> ApplicationFormClient<T, D>
where
    T: Transport + 'static,
    D: DateConverter + 'static,
{
    pub fn new(transport: Arc<T>, dates: Arc<D>) -> Self {
        Self::with_actions(transport, dates, ApplicationFormActions::default())
    }

    pub fn with_actions(transport: Arc<T>, dates: Arc<D>, actions: ApplicationFormActions) -> Self {
        Self {
            forms: Resource::new(
                Arc::clone(&transport),
                ResourceTemplate::new(APPLICATION_FORMS_TEMPLATE),
            ),
            search: Resource::new(
                transport,
                ResourceTemplate::new(APPLICATION_FORMS_SEARCH_TEMPLATE),
            ),
            dates,
            actions,
        }
    }

    /// GET the collection. Records come back as sent, `dob` included.
    pub async fn list(
        &self,
        params: &[(&str, &str)],
    ) -> Result<Vec<ApplicationFormPayload>, ClientError> {
        self.forms
            .invoke(&self.actions.query, None, params, &(), self.dates())
            .await
    }

    /// GET one form with `dob` converted to a local date. `None` when the body is empty.
    pub async fn get(&self, id: ApplicationFormId) -> Result<Option<ApplicationForm>, ClientError> {
        let id = id.to_string();
        self.forms
            .invoke(&self.actions.get, Some(&id), &[], &(), self.dates())
            .await
    }

    /// POST a new form. The server's reply is returned without date conversion.
    pub async fn save(
        &self,
        form: &ApplicationForm,
    ) -> Result<Option<ApplicationFormPayload>, ClientError> {
        self.forms
            .invoke(&self.actions.save, None, &[], form, self.dates())
            .await
    }

    /// PUT an existing form to its item URL, or to the collection when it has no id yet.
    pub async fn update(
        &self,
        form: &ApplicationForm,
    ) -> Result<Option<ApplicationFormPayload>, ClientError> {
        let id = form.id.map(|id| id.to_string());
        self.forms
            .invoke(&self.actions.update, id.as_deref(), &[], form, self.dates())
            .await
    }

    pub async fn delete(&self, id: ApplicationFormId) -> Result<(), ClientError> {
        let id = id.to_string();
        self.forms
            .invoke(&self.actions.delete, Some(&id), &[], &(), self.dates())
            .await
    }

    /// Full-text search. Extra `params` (paging, sorting) are passed through.
    pub async fn search(
        &self,
        query: &str,
        params: &[(&str, &str)],
    ) -> Result<Vec<ApplicationFormPayload>, ClientError> {
        let mut all_params = Vec::with_capacity(params.len() + 1);
        all_params.push(("query", query));
        all_params.extend_from_slice(params);

        self.search
            .invoke(&self.actions.query, None, &all_params, &(), self.dates())
            .await
    }

    fn dates(&self) -> &dyn DateConverter {
        self.dates.as_ref()
    }
}
