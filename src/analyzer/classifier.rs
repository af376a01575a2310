//! Turns the commit range into changelog entries.
//!
//! On a stabilization branch every commit must reference tracker bugs that
//! are ready to ship. Problems are collected for the whole range and only
//! reported as a failure once every commit has been looked at, so one run
//! shows everything that needs fixing.
use log::*;
use regex::Regex;
use std::{collections::HashMap, sync::LazyLock};

use crate::{
    analyzer::{
        commit::{BugAction, BugReference, ChangelogEntry, CommitRecord},
        validate::{self, Diagnostic, Finding},
    },
    bugzilla::{cache::BugCache, types::BugRecord},
    error::{BumpverError, Result},
};

/// Subject prefixes of commits that never appear in the changelog.
pub const NOISE_PREFIXES: [&str; 3] = ["l10n: ", "Merge commit", "Merge branch"];

static SUMMARY_BUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(#\d+(,.*)*\)").unwrap());

static BODY_BUG_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(Resolves|Related|Conflicts): +rhbz#(\d+)").unwrap()
});

/// Settings that decide how strictly commits are checked.
#[derive(Debug, Clone, Default)]
pub struct ClassifierOptions {
    /// Commits must reference validated tracker bugs.
    pub stabilization: bool,
    /// Skip every tracker query.
    pub skip_all: bool,
    /// Don't require ack flags.
    pub skip_acks: bool,
    /// Fixed-in-version resolved bugs must carry.
    pub fixed_in: String,
    /// Bug ids to substitute before querying and annotating.
    pub bug_map: HashMap<String, String>,
    /// Hash prefixes of commits to leave out.
    pub ignore: Vec<String>,
}

/// Outcome of classifying one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Noise or ignored commit.
    Skipped,
    Valid(ChangelogEntry),
    Invalid(Vec<Diagnostic>),
}

/// Bug reference found in a commit subject.
struct SummaryReference {
    /// Matched text, e.g. `(#123456, jdoe)`.
    matched: String,
    id: String,
    author: Option<String>,
}

fn find_summary_reference(subject: &str) -> Option<SummaryReference> {
    let matched = SUMMARY_BUG_REGEX.find(subject)?.as_str();

    // strip "(#" and ")"
    let inner = &matched[2..matched.len() - 1];

    let digits = inner.len()
        - inner
            .trim_start_matches(|c: char| c.is_ascii_digit())
            .len();

    let id = inner[..digits].to_string();

    let author = inner[digits..].trim_start_matches(|c: char| !c.is_alphabetic());

    Some(SummaryReference {
        matched: matched.to_string(),
        id,
        author: (!author.is_empty()).then(|| author.to_string()),
    })
}

fn find_body_references(body: &[String]) -> Vec<BugReference> {
    body.iter()
        .filter_map(|line| BODY_BUG_REGEX.captures(line))
        .filter_map(|caps| {
            Some(BugReference {
                action: BugAction::parse(&caps[1])?,
                id: caps[2].to_string(),
            })
        })
        .collect()
}

fn is_noise(subject: &str) -> bool {
    NOISE_PREFIXES.iter().any(|prefix| subject.starts_with(prefix))
}

pub struct Classifier<'a> {
    options: &'a ClassifierOptions,
    bugs: &'a mut BugCache,
}

impl<'a> Classifier<'a> {
    pub fn new(options: &'a ClassifierOptions, bugs: &'a mut BugCache) -> Self {
        Self { options, bugs }
    }

    fn map_id(&self, id: &str) -> String {
        self.options
            .bug_map
            .get(id)
            .cloned()
            .unwrap_or_else(|| id.to_string())
    }

    fn is_ignored(&self, commit: &CommitRecord) -> bool {
        self.options
            .ignore
            .iter()
            .any(|prefix| !prefix.is_empty() && commit.hash.starts_with(prefix))
    }

    /// Look up `id` and run the existence and product check. `Ok(None)` means
    /// validation is skipped.
    async fn checked_bug(
        &mut self,
        id: &str,
    ) -> Result<std::result::Result<Option<BugRecord>, Finding>> {
        if self.options.skip_all {
            return Ok(Ok(None));
        }

        let bug = self.bugs.lookup(id).await?;

        Ok(validate::check_product(id, bug.as_ref()).map(|b| Some(b.clone())))
    }

    /// Classify a single commit.
    pub async fn classify(&mut self, commit: &CommitRecord) -> Result<Classification> {
        if self.is_ignored(commit) {
            debug!("ignoring commit {}", commit.hash);
            return Ok(Classification::Skipped);
        }

        if is_noise(&commit.subject) {
            debug!("skipping commit {}: {}", commit.hash, commit.subject);
            return Ok(Classification::Skipped);
        }

        if !self.options.stabilization {
            let summary = format!("{} ({})", commit.subject.trim(), commit.author);
            return Ok(Classification::Valid(ChangelogEntry::new(summary)));
        }

        self.classify_stabilization(commit).await
    }

    async fn classify_stabilization(
        &mut self,
        commit: &CommitRecord,
    ) -> Result<Classification> {
        let options = self.options;

        let mut entry = ChangelogEntry::new(commit.subject.clone());
        // findings about the summary bug's release readiness; a granted
        // Related reference to the same bug clears them
        let mut summary_findings: Vec<Finding> = vec![];
        let mut findings: Vec<Finding> = vec![];
        let mut summary_bug: Option<String> = None;

        match find_summary_reference(&commit.subject) {
            Some(reference) => {
                let author = reference.author.unwrap_or_else(|| commit.author.clone());
                let id = self.map_id(&reference.id);

                match self.checked_bug(&id).await? {
                    Ok(bug) => {
                        entry.summary = entry
                            .summary
                            .replace(&reference.matched, &format!("({author})"));
                        entry.add_annotation(
                            BugReference {
                                id: id.clone(),
                                action: BugAction::Resolves,
                            }
                            .annotation(),
                        );

                        if let Some(bug) = bug {
                            summary_findings.extend(validate::check_release(
                                &id,
                                &bug,
                                &options.fixed_in,
                                options.skip_acks,
                            ));
                        }
                    }
                    Err(finding) => findings.push(finding),
                }

                summary_bug = Some(id);
            }
            None => {
                entry.summary = format!("{} ({})", commit.subject.trim(), commit.author);
            }
        }

        for reference in find_body_references(&commit.body) {
            let reference = BugReference {
                id: self.map_id(&reference.id),
                action: reference.action,
            };
            let same_as_summary = summary_bug.as_deref() == Some(reference.id.as_str());

            let bug = match self.checked_bug(&reference.id).await? {
                Ok(bug) => {
                    if reference.action == BugAction::Related && same_as_summary {
                        entry.remove_annotation(
                            &BugReference {
                                id: reference.id.clone(),
                                action: BugAction::Resolves,
                            }
                            .annotation(),
                        );
                    }
                    entry.add_annotation(reference.annotation());
                    bug
                }
                Err(finding) => {
                    findings.push(finding);
                    None
                }
            };

            let Some(bug) = bug else {
                continue;
            };

            match reference.action {
                BugAction::Resolves => findings.extend(validate::check_release(
                    &reference.id,
                    &bug,
                    &options.fixed_in,
                    options.skip_acks,
                )),
                // an acked Related bug overrides the summary bug's findings;
                // without an ack it is just a reference
                BugAction::Related => {
                    let acked =
                        validate::check_ack(&reference.id, &bug, options.skip_acks)
                            .is_none();

                    if acked && same_as_summary {
                        summary_findings.clear();
                    }
                }
                BugAction::Conflicts => {}
            }
        }

        if entry.annotations.is_empty() && !options.skip_all {
            findings.push(Finding::NoBugsReferenced);
        }

        summary_findings.extend(findings);

        if summary_findings.is_empty() {
            entry.summary = entry.summary.trim().to_string();
            return Ok(Classification::Valid(entry));
        }

        let diagnostics = summary_findings
            .into_iter()
            .map(|finding| Diagnostic {
                commit: commit.hash.clone(),
                summary: commit.subject.clone(),
                finding,
            })
            .collect();

        Ok(Classification::Invalid(diagnostics))
    }

    /// Classify the whole range, failing after the scan if any commit is
    /// invalid.
    pub async fn classify_all(
        &mut self,
        commits: &[CommitRecord],
    ) -> Result<Vec<ChangelogEntry>> {
        let mut entries = vec![];
        let mut invalid = 0;

        for commit in commits {
            match self.classify(commit).await? {
                Classification::Skipped => {}
                Classification::Valid(entry) => entries.push(entry),
                Classification::Invalid(diagnostics) => {
                    invalid += 1;
                    for diagnostic in diagnostics.iter() {
                        diagnostic.log();
                    }
                }
            }
        }

        if invalid > 0 {
            return Err(BumpverError::InvalidCommits(invalid));
        }

        info!("{} changelog entries", entries.len());

        Ok(entries)
    }
}

#[cfg(test)]
#[path = "./classifier_tests.rs"]
mod tests;
