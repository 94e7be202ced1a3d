//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `analyze` - Receipt upload and report rendering
//! - `setup` - Shared utilities (config loading)
//! - `status` - Service health and configuration display

pub mod analyze;
pub mod setup;
pub mod status;

// Re-export command functions for main.rs
pub use analyze::*;
pub use setup::*;
pub use status::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
