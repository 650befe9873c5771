//! Application form resource: the record types, the action table, and the client.

pub mod actions;
pub mod client;
pub mod domain;

#[cfg(test)]
mod tests;

pub use actions::{
    ApplicationFormActions, APPLICATION_FORMS_SEARCH_TEMPLATE, APPLICATION_FORMS_TEMPLATE,
};
pub use client::ApplicationFormClient;
pub use domain::{ApplicationForm, ApplicationFormId, ApplicationFormPayload, RESERVED_FIELDS};
