//! Policy synthesis (deterministic JSON generation)

pub mod policy_builder;

pub use policy_builder::{inline_user_policy, managed_user_policy};
