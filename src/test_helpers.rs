//! Common test helper functions shared across test modules.
//!
//! Provides throwaway git repositories, commit records and bug records so
//! test suites don't rebuild the same fixtures.
use git2::Signature;
use std::{cell::RefCell, path::Path};
use tempfile::TempDir;

use crate::{
    analyzer::commit::CommitRecord,
    bugzilla::types::{BugFlag, BugRecord},
};

/// Product of a bug that passes the product check.
pub const RHEL_PRODUCT: &str = "Red Hat Enterprise Linux 8";

/// Git repository in a temporary directory with a configured author.
pub struct TestRepo {
    tmp: TempDir,
    repo: git2::Repository,
    head: RefCell<Option<git2::Oid>>,
}

impl TestRepo {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let repo = git2::Repository::init(tmp.path()).unwrap();

        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "tester@example.com").unwrap();

        Self {
            tmp,
            repo,
            head: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        self.tmp.path()
    }

    /// Commit an empty tree change with the given subject and body.
    pub fn commit(&self, subject: &str, body: &str) -> git2::Oid {
        let signature =
            Signature::now("Test User", "tester@example.com").unwrap();

        let tree_id = self.repo.index().unwrap().write_tree().unwrap();
        let tree = self.repo.find_tree(tree_id).unwrap();

        let message = if body.is_empty() {
            subject.to_string()
        } else {
            format!("{subject}\n\n{body}")
        };

        let parent = self
            .head
            .borrow()
            .map(|oid| self.repo.find_commit(oid).unwrap());

        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &message,
                &tree,
                &parents,
            )
            .unwrap();

        *self.head.borrow_mut() = Some(oid);

        oid
    }

    /// Lightweight tag at the current HEAD.
    pub fn tag(&self, name: &str) {
        let oid = self.head.borrow().unwrap();
        let object = self.repo.find_object(oid, None).unwrap();
        self.repo.tag_lightweight(name, &object, false).unwrap();
    }

    /// Create `branch` at HEAD and check it out.
    pub fn checkout_branch(&self, branch: &str) {
        let oid = self.head.borrow().unwrap();
        let commit = self.repo.find_commit(oid).unwrap();
        self.repo.branch(branch, &commit, true).unwrap();
        self.repo.set_head(&format!("refs/heads/{branch}")).unwrap();
    }
}

/// Commit record with a fixed author.
pub fn create_test_commit(hash: &str, subject: &str, body: &[&str]) -> CommitRecord {
    CommitRecord {
        hash: hash.to_string(),
        subject: subject.to_string(),
        body: body.iter().map(|l| l.to_string()).collect(),
        author: "a@b.com".to_string(),
    }
}

/// Bug that passes every check for `fixed_in`.
pub fn create_valid_bug(fixed_in: &str) -> BugRecord {
    BugRecord {
        product: RHEL_PRODUCT.to_string(),
        status: "ON_QA".to_string(),
        fixed_in: fixed_in.to_string(),
        flags: vec![
            BugFlag {
                name: "qa_ack".to_string(),
                status: "+".to_string(),
            },
            BugFlag {
                name: "rhel-8.1.0".to_string(),
                status: "+".to_string(),
            },
        ],
    }
}
