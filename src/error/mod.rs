mod grantdesk;

pub use grantdesk::{ApiErrorBody, ApiErrorObject, GrantDeskError};
