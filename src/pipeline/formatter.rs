//! Markdown assembly for per-file results.
//!
//! Collaborator output is inserted verbatim; ordering is the only contract.

use super::{FileSummary, StructuredDoc};

/// Render the documentation artifact: one `# File:` section per document.
pub fn render_documentation(docs: &[StructuredDoc]) -> String {
    let mut out = String::new();
    for doc in docs {
        out.push_str(&format!("# File: {}\n\n", doc.path.display()));
        out.push_str(&doc.structure);
        out.push_str("\n\n---\n\n");
    }
    out
}

/// Render the summary artifact: `## Summary for` sections separated by blank lines.
pub fn render_summary(summaries: &[FileSummary]) -> String {
    summaries
        .iter()
        .map(|s| format!("## Summary for {}\n\n{}", s.path.display(), s.summary))
        .collect::<Vec<_>>()
        .join("\n\n")
}
