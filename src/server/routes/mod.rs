pub mod dashboard;
pub mod extract;
pub mod grants;
pub mod search;
pub mod settings;
