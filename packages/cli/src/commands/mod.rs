pub mod account;
pub mod assistant;
pub mod draft;
pub mod sections;
