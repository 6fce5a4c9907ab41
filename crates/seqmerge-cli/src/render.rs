//! Text output: unified diffs and git-style conflict blocks.

use seqmerge_core::{Chunk, Diff, MergeResult};

use crate::tokenize::TokenMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Context,
    Removed,
    Added,
}

impl Tag {
    fn prefix(self) -> char {
        match self {
            Tag::Context => ' ',
            Tag::Removed => '-',
            Tag::Added => '+',
        }
    }
}

/// One output line, with the number of previous/next tokens before it.
struct Line<'a> {
    tag: Tag,
    text: &'a str,
    old: usize,
    new: usize,
}

fn flatten<'a>(previous: &'a [String], diff: &'a Diff<String>) -> Vec<Line<'a>> {
    let mut lines = Vec::new();
    let mut new = 0;
    for chunk in diff {
        let range = chunk.previous_range();
        let removed = |lines: &mut Vec<Line<'a>>, tag| {
            for (old, text) in range.clone().zip(&previous[range.clone()]) {
                lines.push(Line { tag, text, old, new });
            }
        };
        match chunk {
            Chunk::Unchanged { .. } => {
                for (old, text) in range.clone().zip(&previous[range.clone()]) {
                    lines.push(Line {
                        tag: Tag::Context,
                        text,
                        old,
                        new,
                    });
                    new += 1;
                }
            }
            Chunk::Deleted { .. } => removed(&mut lines, Tag::Removed),
            Chunk::Inserted { elements, .. } | Chunk::Changed { elements, .. } => {
                if matches!(chunk, Chunk::Changed { .. }) {
                    removed(&mut lines, Tag::Removed);
                }
                for text in elements {
                    lines.push(Line {
                        tag: Tag::Added,
                        text,
                        old: range.end,
                        new,
                    });
                    new += 1;
                }
            }
        }
    }
    lines
}

/// Group changed lines into hunks with `context` lines around them.
fn hunks(lines: &[Line<'_>], context: usize) -> Vec<std::ops::Range<usize>> {
    let changed: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.tag != Tag::Context)
        .map(|(i, _)| i)
        .collect();

    let mut out: Vec<std::ops::Range<usize>> = Vec::new();
    for i in changed {
        let start = i.saturating_sub(context);
        let end = (i + context + 1).min(lines.len());
        match out.last_mut() {
            Some(last) if start <= last.end => last.end = end,
            _ => out.push(start..end),
        }
    }
    out
}

fn push_token(out: &mut String, prefix: char, text: &str, mode: TokenMode) {
    out.push(prefix);
    match mode {
        TokenMode::Lines => {
            out.push_str(text);
            if !text.ends_with('\n') {
                out.push_str("\n\\ No newline at end of file\n");
            }
        }
        TokenMode::Words | TokenMode::Chars => {
            out.push_str(&format!("{}\n", text.escape_debug()));
        }
    }
}

/// Render `diff` as a unified diff. Empty when nothing changed.
pub fn unified(
    previous: &[String],
    diff: &Diff<String>,
    labels: (&str, &str),
    context: usize,
    mode: TokenMode,
) -> String {
    let lines = flatten(previous, diff);
    let groups = hunks(&lines, context);
    if groups.is_empty() {
        return String::new();
    }

    let mut out = String::new();
    out.push_str(&format!("--- {}\n", labels.0));
    out.push_str(&format!("+++ {}\n", labels.1));
    for group in groups {
        let hunk = &lines[group];
        let old_count = hunk.iter().filter(|l| l.tag != Tag::Added).count();
        let new_count = hunk.iter().filter(|l| l.tag != Tag::Removed).count();
        let old_start = hunk[0].old + usize::from(old_count > 0);
        let new_start = hunk[0].new + usize::from(new_count > 0);
        out.push_str(&format!(
            "@@ -{old_start},{old_count} +{new_start},{new_count} @@\n"
        ));
        for line in hunk {
            push_token(&mut out, line.tag.prefix(), line.text, mode);
        }
    }
    out
}

fn push_section(out: &mut String, marker: &str, tokens: &[String]) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(marker);
    out.push('\n');
    out.push_str(&tokens.concat());
}

/// Merged text with every conflict replaced by a marker block.
pub fn with_markers(result: &MergeResult<String>) -> String {
    let merged = result.merged();
    let mut out = String::new();
    let mut at = 0;
    for conflict in result.conflicts() {
        out.push_str(&merged[at..conflict.merged_range.start].concat());
        push_section(&mut out, "<<<<<<< current", &conflict.current);
        push_section(&mut out, "||||||| previous", &conflict.previous);
        push_section(&mut out, "=======", &conflict.next);
        push_section(&mut out, ">>>>>>> next", &[]);
        at = conflict.merged_range.end;
    }
    out.push_str(&merged[at..].concat());
    out
}
