// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{normalize_target, probe_config, render_outcome, resolve_log_dir, scan_config};
