//! Grants.gov `search2` request/response schema.

mod search_request;
mod search_response;

pub use search_request::{POSTED_STATUS, Search2Request};
pub use search_response::{OpportunityHit, Search2Data, Search2Response};
