//! Inserts a new release block into the `%changelog` of an RPM spec.
use chrono::NaiveDate;
use log::*;

use crate::{
    analyzer::commit::ChangelogEntry,
    error::{BumpverError, Result},
    repo::Author,
};

/// Line that starts the changelog section of a spec file.
pub const CHANGELOG_MARKER: &str = "%changelog";
/// Width changelog summaries are wrapped to.
pub const WRAP_WIDTH: usize = 77;

/// Signature line values for a new changelog block.
#[derive(Debug, Clone)]
pub struct ChangelogHeader {
    pub date: NaiveDate,
    pub author: Author,
    pub version: String,
    pub release: String,
}

impl ChangelogHeader {
    fn line(&self) -> String {
        format!(
            "* {} {} <{}> - {}-{}",
            self.date.format("%a %b %d %Y"),
            self.author.name,
            self.author.email,
            self.version,
            self.release
        )
    }
}

/// Double every `%` that is not already part of a `%%` escape so RPM macro
/// expansion reproduces the literal text.
///
/// Mirrors the substitution `(?<!%)%%(?!%)|(?<!%%)%(?!%%)` → `%%`: a lone
/// `%` is doubled, `%%` is kept and `%%%` becomes `%%%%`.
pub fn escape_macros(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    let is_pct = |i: usize, offset: isize| -> bool {
        i.checked_add_signed(offset)
            .and_then(|j| chars.get(j))
            .is_some_and(|c| *c == '%')
    };

    let mut escaped = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        if chars[i] != '%' {
            escaped.push(chars[i]);
            i += 1;
            continue;
        }

        // an existing escape with no percent on either side
        if is_pct(i, 1) && !is_pct(i, -1) && !is_pct(i, 2) {
            escaped.push_str("%%");
            i += 2;
            continue;
        }

        let after_escape = is_pct(i, -1) && is_pct(i, -2);
        let before_escape = is_pct(i, 1) && is_pct(i, 2);

        if !after_escape && !before_escape {
            escaped.push_str("%%");
        } else {
            escaped.push('%');
        }

        i += 1;
    }

    escaped
}

fn write_entry(block: &mut Vec<String>, entry: &ChangelogEntry) {
    let summary = escape_macros(&entry.summary);
    let lines = textwrap::wrap(&summary, WRAP_WIDTH);

    let mut lines = lines.iter();

    match lines.next() {
        Some(first) => block.push(format!("- {first}")),
        None => block.push("- ".to_string()),
    }

    for line in lines {
        block.push(format!("  {line}"));
    }

    for annotation in entry.annotations.iter() {
        block.push(format!("  {annotation}"));
    }
}

/// Return `spec` with a new release block directly below the `%changelog`
/// line. Everything before and after the marker is preserved verbatim.
pub fn insert_block(
    spec: &str,
    header: &ChangelogHeader,
    entries: &[ChangelogEntry],
) -> Result<String> {
    let mut lines: Vec<&str> = spec.split_inclusive('\n').collect();

    let marker = lines
        .iter()
        .position(|l| l.trim_end_matches(['\n', '\r']) == CHANGELOG_MARKER)
        .ok_or_else(|| BumpverError::missing_anchor("spec file", CHANGELOG_MARKER))?;

    let bottom = lines.split_off(marker + 1);

    let mut block = vec![header.line()];
    for entry in entries.iter() {
        write_entry(&mut block, entry);
    }
    block.push(String::new());

    debug!("new changelog block:\n{}", block.join("\n"));

    let mut updated: String = lines.concat();

    if !updated.ends_with('\n') {
        updated.push('\n');
    }

    for line in block {
        updated.push_str(&line);
        updated.push('\n');
    }

    updated.push_str(&bottom.concat());

    Ok(updated)
}
