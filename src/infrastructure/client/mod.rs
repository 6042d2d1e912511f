//! Client infrastructure - local cache, transports and the request coordinator

mod cache_store;
mod coordinator;
mod http_client;
mod local;
mod retry;

pub use cache_store::ClientCacheStore;
pub use coordinator::RequestCoordinator;
pub use http_client::HttpDecisionClient;
pub use local::LocalDecisionClient;
pub use retry::RetryPolicy;
