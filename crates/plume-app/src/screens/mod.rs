pub mod accounts;
pub mod compose;
pub mod dashboard;
pub mod posts;
