//! Commands module - service layer for provisioning operations

mod accounts;
mod broker;
mod provision;
mod reconcile;
pub(crate) mod service;

pub use accounts::render_request_table;
pub use broker::RetryPolicy;
pub use provision::{render_account_table, Outcome};
pub use reconcile::reconcile_user;
pub use service::ProvisioningService;
