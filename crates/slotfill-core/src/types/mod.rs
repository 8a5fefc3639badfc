//! Request, response and health types shared by providers and the server.

mod health;
mod query;

pub use health::{ServiceHealth, ServiceStatus};
pub use query::{Prediction, Query};
