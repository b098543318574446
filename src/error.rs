use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `shopscout`.
///
/// Each subsystem defines its own error variant. Library callers can match on
/// these to decide recovery strategy; internal code continues to use
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum ScoutError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Planner ─────────────────────────────────────────────────────────
    #[error("plan: {0}")]
    Plan(#[from] PlanError),

    // ── Report store ────────────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load config: {0}")]
    Load(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ─── Planner errors ─────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("planner response was not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("planner returned an empty task list")]
    Empty,
}

// ─── Report store errors ────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("invalid database path: {0}")]
    Path(String),
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, ScoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_displays_correctly() {
        let err = ScoutError::Config(ConfigError::Validation("bad temperature".into()));
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn plan_empty_displays_correctly() {
        let err = ScoutError::Plan(PlanError::Empty);
        assert!(err.to_string().contains("empty task list"));
    }

    #[test]
    fn anyhow_interop() {
        let anyhow_err = anyhow::anyhow!("something went wrong");
        let scout_err: ScoutError = anyhow_err.into();
        assert!(scout_err.to_string().contains("something went wrong"));
    }

    #[test]
    fn store_path_error_displays_correctly() {
        let err = ScoutError::Store(StoreError::Path("/nonexistent".into()));
        assert!(err.to_string().contains("/nonexistent"));
    }
}
