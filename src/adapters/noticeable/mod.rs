//! Noticeable source system adapter.

mod mock_source_system;
mod noticeable_adapter;
mod wire_types;

pub use mock_source_system::MockSourceSystem;
pub use noticeable_adapter::{NoticeableClient, NoticeableConfig, DEFAULT_GRAPHQL_ENDPOINT};
