//! Git history access for a bump run.
//!
//! The [`History`] trait is the seam between the bump workflow and version
//! control. [`Repository`] implements it over a local `git2` repository:
//!
//! - the current branch decides whether commits need bug validation
//! - `user.name` / `user.email` sign the changelog header
//! - the range `<previous tag>..HEAD` provides the commits, oldest first,
//!   with merge commits excluded
use git2::Sort;
use log::*;
use std::path::Path;

use crate::{
    analyzer::commit::CommitRecord,
    error::{BumpverError, Result},
};

/// Name and email that sign the new changelog header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub email: String,
}

/// Provider of the commit range and repository metadata.
#[cfg_attr(test, mockall::automock)]
pub trait History {
    /// Short name of the checked out branch.
    fn current_branch(&self) -> Result<String>;
    /// Author configured in git for the changelog header.
    fn author(&self) -> Result<Author>;
    /// Non-merge commits reachable from HEAD but not from `since`, oldest
    /// first.
    fn commits_since(&self, since: &str) -> Result<Vec<CommitRecord>>;
}

/// Local git repository backed by `git2`.
pub struct Repository {
    repo: git2::Repository,
}

/// Author identity used in changelog summaries: the local part of the
/// author email.
pub fn author_identity(email: &str) -> String {
    match email.split_once('@') {
        Some((local, _)) if !local.is_empty() => local.to_string(),
        _ => email.to_string(),
    }
}

impl Repository {
    /// Open the repository containing `path`.
    pub fn open(path: &Path) -> Result<Self> {
        let repo = git2::Repository::discover(path)?;
        Ok(Self { repo })
    }

    fn commit_record(commit: &git2::Commit) -> CommitRecord {
        let message = commit.message().unwrap_or("");
        let subject = commit.summary().unwrap_or("").trim().to_string();

        let body = commit
            .body()
            .map(|b| {
                b.lines()
                    .map(|l| l.trim_end().to_string())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<String>>()
            })
            .unwrap_or_default();

        if subject.is_empty() {
            debug!("commit {} has an empty message: {message:?}", commit.id());
        }

        CommitRecord {
            hash: commit.id().to_string(),
            subject,
            body,
            author: author_identity(commit.author().email().unwrap_or("")),
        }
    }
}

impl History for Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;

        let branch = head
            .shorthand()
            .ok_or_else(|| {
                BumpverError::invalid_args("unable to determine current branch")
            })?
            .to_string();

        Ok(branch)
    }

    fn author(&self) -> Result<Author> {
        let config = self.repo.config()?.snapshot()?;
        let name = config.get_str("user.name")?.to_string();
        let email = config.get_str("user.email")?.to_string();
        Ok(Author { name, email })
    }

    fn commits_since(&self, since: &str) -> Result<Vec<CommitRecord>> {
        let start = self.repo.revparse_single(since)?.peel_to_commit()?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push_head()?;
        revwalk.hide(start.id())?;

        let mut commits = vec![];

        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;

            if commit.parent_count() > 1 {
                debug!("skipping merge commit {}", commit.id());
                continue;
            }

            commits.push(Self::commit_record(&commit));
        }

        debug!("found {} commits since {since}", commits.len());

        Ok(commits)
    }
}
