//! Typed error hierarchy for the drydock subsystem.
//!
//! Two top-level enums cover the two fallible subsystems:
//! - `SnapshotError` — snapshot fetch and store failures
//! - `AdapterError` — sandbox adapter contract violations
//!
//! The virtual repository store deliberately has no error type of its own:
//! every lookup against an unobtainable snapshot surfaces as "not found"
//! (`None`), and the response processor cannot fail at all — ambiguous input
//! classifies as plain text.

use thiserror::Error;

/// Errors from the snapshot fetch job and backing store.
///
/// These never escape the virtual repository store: `VirtualRepo` converts
/// all of them into not-found results. They exist so the fetch job can log
/// and report precisely what went wrong.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot fetch for {repo} failed: {source}")]
    FetchFailed {
        repo: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("Snapshot fetch for {repo} timed out after {secs}s")]
    FetchTimeout { repo: String, secs: u64 },

    #[error("Branch {branch} not found in {repo}")]
    BranchNotFound { repo: String, branch: String },

    #[error("Repository host rate limit hit while fetching {repo}")]
    RateLimited { repo: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Errors from the sandbox adapter's caller-facing contract.
///
/// Engine failures are intentionally absent: the adapter is the error
/// boundary and converts them into an `AdapterResponse` with `error` set
/// rather than returning them.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("File {path} does not exist in the repository snapshot")]
    FileNotInRepo { path: String },

    #[error("File {path} is not in the conversation context")]
    FileNotInContext { path: String },

    #[error("Unknown model alias '{alias}'")]
    InvalidModel { alias: String },

    #[error("Scratch directory operation on {path} failed: {source}")]
    Scratch {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_error_fetch_timeout_carries_fields() {
        let err = SnapshotError::FetchTimeout {
            repo: "octo/widgets".to_string(),
            secs: 30,
        };
        match &err {
            SnapshotError::FetchTimeout { repo, secs } => {
                assert_eq!(repo, "octo/widgets");
                assert_eq!(*secs, 30);
            }
            _ => panic!("Expected FetchTimeout"),
        }
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn snapshot_error_fetch_failed_preserves_source() {
        let err = SnapshotError::FetchFailed {
            repo: "octo/widgets".to_string(),
            source: anyhow::anyhow!("connection refused"),
        };
        assert!(err.to_string().contains("octo/widgets"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn adapter_error_file_not_in_repo_carries_path() {
        let err = AdapterError::FileNotInRepo {
            path: "src/ghost.py".to_string(),
        };
        match &err {
            AdapterError::FileNotInRepo { path } => assert_eq!(path, "src/ghost.py"),
            _ => panic!("Expected FileNotInRepo"),
        }
        assert!(err.to_string().contains("src/ghost.py"));
    }

    #[test]
    fn adapter_error_invalid_model_is_matchable() {
        let err = AdapterError::InvalidModel {
            alias: "gpt-9".to_string(),
        };
        assert!(matches!(err, AdapterError::InvalidModel { .. }));
        assert!(err.to_string().contains("gpt-9"));
    }

    #[test]
    fn adapter_error_variants_are_distinct() {
        let repo_err = AdapterError::FileNotInRepo { path: "a".into() };
        let ctx_err = AdapterError::FileNotInContext { path: "a".into() };
        assert!(matches!(repo_err, AdapterError::FileNotInRepo { .. }));
        assert!(!matches!(repo_err, AdapterError::FileNotInContext { .. }));
        assert!(matches!(ctx_err, AdapterError::FileNotInContext { .. }));
    }

    #[test]
    fn all_error_types_implement_std_error_trait() {
        fn assert_std_error<E: std::error::Error>(_: &E) {}
        let snap_err = SnapshotError::RateLimited {
            repo: "octo/widgets".into(),
        };
        assert_std_error(&snap_err);
        let adapter_err = AdapterError::FileNotInContext { path: "x".into() };
        assert_std_error(&adapter_err);
    }
}
