//! Logging and debugging facilities for mediashelf.
//!
//! This module provides:
//! - Integration with the `tracing` crate for structured logging
//! - Shared formatting options for tree-shaped debug output
//! - Performance tracing hooks for profiling
//!
//! # Tracing Integration
//!
//! mediashelf uses the `tracing` crate for instrumentation. To see logs,
//! install a tracing subscriber in your application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("mediashelf::group_list=debug")
//!     .init();
//! ```

/// Span names used throughout mediashelf for tracing.
pub mod span_names {
    /// Bulk regroup/resort work on a group list.
    pub const REGROUP: &str = "mediashelf::regroup";
    /// Draining a transaction's queued actions.
    pub const TRANSACTION_FLUSH: &str = "mediashelf::transaction_flush";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "mediashelf_core::signal";
    /// Observable collection target.
    pub const COLLECTION: &str = "mediashelf_core::collection";
    /// Grouping tree target.
    pub const GROUP_LIST: &str = "mediashelf::group_list";
    /// Transaction and notification coalescing target.
    pub const TRANSACTION: &str = "mediashelf::transaction";
    /// Play-order target.
    pub const ORDER: &str = "mediashelf::order";
    /// Performance spans target.
    pub const PERF: &str = "mediashelf::perf";
}

/// Style options for tree visualization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TreeStyle {
    /// ASCII characters for tree branches.
    Ascii,
    /// Unicode box-drawing characters.
    #[default]
    Unicode,
    /// Compact single-line-per-node representation.
    Compact,
}

/// Configuration for tree-shaped debug output.
#[derive(Debug, Clone)]
pub struct TreeFormatOptions {
    /// The style of tree visualization.
    pub style: TreeStyle,
    /// Whether to show node IDs.
    pub show_ids: bool,
    /// Whether to list the items held by leaves.
    pub show_items: bool,
    /// Maximum depth to traverse (None for unlimited).
    pub max_depth: Option<usize>,
    /// Indent size for each level.
    pub indent_size: usize,
}

impl Default for TreeFormatOptions {
    fn default() -> Self {
        Self {
            style: TreeStyle::default(),
            show_ids: false,
            show_items: true,
            max_depth: None,
            indent_size: 2,
        }
    }
}

impl TreeFormatOptions {
    /// Create options for detailed debugging output.
    pub fn detailed() -> Self {
        Self {
            show_ids: true,
            ..Default::default()
        }
    }

    /// Create options for minimal output: group headers only.
    pub fn minimal() -> Self {
        Self {
            show_ids: false,
            show_items: false,
            ..Default::default()
        }
    }

    /// Build the prefix string for a tree line.
    ///
    /// `lineage` holds one `is_last` flag per level below the root, ending
    /// with the line's own. Levels whose node was the last sibling get no
    /// vertical bar. An empty lineage is the root line.
    pub fn build_prefix(&self, lineage: &[bool]) -> String {
        let Some((&is_last, ancestors)) = lineage.split_last() else {
            return String::new();
        };

        let (branch, corner, last) = match self.style {
            TreeStyle::Ascii => ("|", "+--", "`--"),
            TreeStyle::Unicode => ("\u{2502}", "\u{251c}\u{2500}\u{2500}", "\u{2514}\u{2500}\u{2500}"),
            TreeStyle::Compact => ("", "-", "-"),
        };

        let mut prefix = String::new();
        for &ancestor_last in ancestors {
            if ancestor_last {
                prefix.push_str(&" ".repeat(branch.chars().count()));
            } else {
                prefix.push_str(branch);
            }
            prefix.push_str(&" ".repeat(self.indent_size));
        }

        prefix.push_str(if is_last { last } else { corner });
        prefix.push(' ');
        prefix
    }
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::debug_span!(target: "mediashelf::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_root_is_empty() {
        let options = TreeFormatOptions::default();
        assert_eq!(options.build_prefix(&[]), "");
    }

    #[test]
    fn test_prefix_ascii() {
        let options = TreeFormatOptions {
            style: TreeStyle::Ascii,
            ..Default::default()
        };
        assert_eq!(options.build_prefix(&[false]), "+-- ");
        assert_eq!(options.build_prefix(&[true]), "`-- ");
        assert_eq!(options.build_prefix(&[false, true]), "|  `-- ");
        assert_eq!(options.build_prefix(&[true, false]), "   +-- ");
    }

    #[test]
    fn test_perf_span() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
        let _span = PerfSpan::new("test_operation");
    }
}
