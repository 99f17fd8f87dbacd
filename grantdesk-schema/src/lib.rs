pub mod grants_gov;

mod lax;

pub use grants_gov::{OpportunityHit, Search2Data, Search2Request, Search2Response};
