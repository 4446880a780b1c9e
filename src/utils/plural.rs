//! Count formatting for log lines.

/// Format a count with its noun: `"1 file"`, `"3 files"`, `"0 fragments"`.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}
