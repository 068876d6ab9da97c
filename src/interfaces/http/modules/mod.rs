pub mod health;
pub mod metrics;
pub mod nearby;
pub mod request_id;
