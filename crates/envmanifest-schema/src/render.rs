//! Canonical text rendering of an [`Environment`].
//!
//! Re-parsing the rendered document yields an equal `Environment`. Group
//! headings are written whenever the group changes between consecutive
//! dependencies. Comments the model does not hold (on key lines, or between
//! sections other than `dependencies`) are not rendered; [`dropped_comments`]
//! lists them so a caller can refuse to rewrite.

use crate::manifest::Environment;
use crate::scan::{comment_text, quote_if_needed, split_comment};
use std::fmt::Write;

const INDENT: &str = "  ";

pub fn render_manifest(env: &Environment) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    if let Some(header) = env.header() {
        write_comment_block(&mut out, "", header);
    }
    let _ = writeln!(out, "name: {}", quote_if_needed(env.name()));

    out.push_str("channels:\n");
    for (idx, channel) in env.channels().iter().enumerate() {
        let _ = write!(out, "{INDENT}- {}", quote_if_needed(channel));
        if let Some(comment) = env.channel_comment(idx) {
            let _ = write!(out, "  # {comment}");
        }
        out.push('\n');
    }
    out.push('\n');

    if env.dependencies().is_empty() {
        out.push_str("dependencies: []\n");
    } else {
        out.push_str("dependencies:\n");
    }

    let mut current_group: Option<&str> = None;
    for dep in env.dependencies() {
        let group = dep.group.as_deref();
        if let Some(heading) = group.filter(|g| Some(*g) != current_group) {
            write_comment_block(&mut out, INDENT, heading);
        }
        current_group = group;

        let _ = write!(out, "{INDENT}- {dep}");
        if let Some(comment) = &dep.comment {
            let _ = write!(out, "  # {comment}");
        }
        out.push('\n');
    }

    if let Some(footer) = env.footer() {
        write_comment_block(&mut out, INDENT, footer);
    }
    out
}

fn write_comment_block(out: &mut String, indent: &str, block: &str) {
    for line in block.split('\n') {
        if line.is_empty() {
            let _ = writeln!(out, "{indent}#");
        } else {
            let _ = writeln!(out, "{indent}# {line}");
        }
    }
}

/// Comments present in `original` that `rendered` no longer carries.
///
/// Comments are compared by text, counting repeats, so moving a comment
/// is fine but dropping one is reported.
pub fn dropped_comments(original: &str, rendered: &str) -> Vec<String> {
    let mut kept = comments_in(rendered);
    comments_in(original)
        .into_iter()
        .filter(|comment| match kept.iter().position(|k| k == comment) {
            Some(pos) => {
                kept.swap_remove(pos);
                false
            }
            None => true,
        })
        .collect()
}

fn comments_in(doc: &str) -> Vec<String> {
    doc.lines()
        .filter_map(|raw| {
            let trimmed = raw.trim();
            if let Some(comment) = trimmed.strip_prefix('#') {
                return comment_text(Some(comment));
            }
            let body = match trimmed.strip_prefix('-') {
                Some(item) => item.trim_start(),
                None => trimmed.split_once(':')?.1.trim_start(),
            };
            comment_text(split_comment(body).1)
        })
        .collect()
}
