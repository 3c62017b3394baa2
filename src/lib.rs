pub mod config;
pub mod errors;
pub mod repo;
pub mod response;
pub mod sandbox;
pub mod snapshot;

pub use config::DrydockConfig;
pub use errors::{AdapterError, SnapshotError};
pub use repo::VirtualRepo;
pub use response::{ProcessedResponse, ResponseProcessor};
pub use sandbox::SandboxAdapter;
pub use snapshot::{RepoKey, RepositorySnapshot, SnapshotStore};
