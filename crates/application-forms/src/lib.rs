pub mod config;
pub mod dates;
pub mod error;
pub mod forms;
pub mod resource;
pub mod telemetry;

pub use dates::{DateConversionError, DateConverter, ServerDateConverter};
pub use error::{AppError, ClientError};
pub use forms::{ApplicationForm, ApplicationFormClient, ApplicationFormId, ApplicationFormPayload};
pub use resource::{ReqwestTransport, Transport, TransportError};
