mod api;
mod relay;
mod store;

pub use api::ApiError;
pub use relay::RelayError;
pub use store::StoreError;
