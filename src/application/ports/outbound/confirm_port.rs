use std::path::Path;

/// Operator yes/no decision for overwriting an existing output artifact.
///
/// Injected so the pipeline's abort logic is testable without a terminal.
pub trait ConfirmPort: Send + Sync {
    fn confirm_overwrite(&self, path: &Path) -> bool;
}
