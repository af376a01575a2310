use secrecy::SecretString;
use std::fs;
use tempfile::TempDir;

use super::*;
use crate::{
    analyzer::commit::CommitRecord,
    bugzilla::{traits::MockBugTracker, types::BugRecord},
    repo::{Author, MockHistory},
    test_helpers::{create_test_commit, create_valid_bug},
};

const BUGREPORT: &str = "anaconda-devel@example.org";

const CONFIGURE: &str = "AC_PREREQ([2.63])
AC_INIT([anaconda], [33.16.3], [anaconda-devel@example.org])
AC_SUBST(PACKAGE_RELEASE, [1])
";

const SPEC: &str = "Name: anaconda
Version: @PACKAGE_VERSION@

%changelog
* Mon Jan 04 2021 Old Author <old@example.com> - 33.16.3-1
- Old change (old)
";

struct Fixture {
    tmp: TempDir,
    files: SourceFiles,
}

impl Fixture {
    fn new(zanata_version: &str) -> Self {
        let tmp = TempDir::new().unwrap();

        fs::write(tmp.path().join("configure.ac"), CONFIGURE).unwrap();
        fs::write(tmp.path().join("anaconda.spec.in"), SPEC).unwrap();
        fs::write(
            tmp.path().join("zanata.xml"),
            format!("<config><project-version>{zanata_version}</project-version></config>"),
        )
        .unwrap();

        let files = SourceFiles::locate(&args_for(tmp.path(), &[])).unwrap();

        Self { tmp, files }
    }

    fn args(&self, extra: &[&str]) -> Args {
        args_for(self.tmp.path(), extra)
    }

    fn configure(&self) -> String {
        fs::read_to_string(&self.files.configure).unwrap()
    }

    fn spec(&self) -> String {
        fs::read_to_string(&self.files.spec).unwrap()
    }
}

fn args_for(dir: &Path, extra: &[&str]) -> Args {
    use clap::Parser;

    let dir = dir.to_str().unwrap();
    let base = [
        "bumpver",
        "-n",
        "anaconda",
        "-v",
        "33.16.3",
        "-r",
        "1",
        "-b",
        BUGREPORT,
        "--source-dir",
        dir,
        "--skip-jenkins",
    ];

    Args::try_parse_from(base.iter().chain(extra.iter())).unwrap()
}

fn history(branch: &str, commits: Vec<CommitRecord>) -> MockHistory {
    let branch = branch.to_string();

    let mut history = MockHistory::new();
    history
        .expect_current_branch()
        .returning(move || Ok(branch.clone()));
    history.expect_author().returning(|| {
        Ok(Author {
            name: "Test User".into(),
            email: "tester@example.com".into(),
        })
    });
    history
        .expect_commits_since()
        .withf(|since| since == "anaconda-33.16.3-1")
        .returning(move |_| Ok(commits.clone()));
    history
}

fn untouched_tracker() -> Box<MockBugTracker> {
    let mut tracker = MockBugTracker::new();
    tracker.expect_login().never();
    tracker.expect_get_bug().never();
    Box::new(tracker)
}

fn tracker_with(id: &'static str, bug: BugRecord) -> Box<MockBugTracker> {
    let mut tracker = MockBugTracker::new();
    tracker.expect_login().times(1).returning(|_, _| Ok(()));
    tracker
        .expect_get_bug()
        .withf(move |bug_id| bug_id == id)
        .times(1)
        .returning(move |_| Ok(Some(bug.clone())));
    Box::new(tracker)
}

fn credentials() -> Credentials {
    Credentials {
        username: Some("jdoe@example.com".into()),
        password: Some(SecretString::from("secret".to_string())),
        ..Credentials::default()
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 1, 11).unwrap()
}

#[tokio::test]
async fn bumps_development_branch() {
    let fixture = Fixture::new("master");
    let commits = vec![
        create_test_commit("a1", "Fix typo", &[]),
        create_test_commit("a2", "Merge branch 'topic'", &[]),
        create_test_commit("a3", "Use 100% of the screen", &[]),
    ];

    run(
        &fixture.args(&[]),
        &fixture.files,
        &Credentials::default(),
        &history("master", commits),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap();

    assert_eq!(
        fixture.configure(),
        "AC_PREREQ([2.63])\nAC_INIT([anaconda], [33.16.4], [anaconda-devel@example.org])\nAC_SUBST(PACKAGE_RELEASE, [1])\n"
    );
    assert_eq!(
        fixture.spec(),
        "Name: anaconda\nVersion: @PACKAGE_VERSION@\n\n%changelog\n\
* Mon Jan 11 2021 Test User <tester@example.com> - 33.16.4-1\n\
- Fix typo (a@b.com)\n\
- Use 100%% of the screen (a@b.com)\n\
\n\
* Mon Jan 04 2021 Old Author <old@example.com> - 33.16.3-1\n- Old change (old)\n"
    );
}

#[tokio::test]
async fn new_release_is_stamped() {
    let fixture = Fixture::new("master");

    run(
        &fixture.args(&["-R", "2"]),
        &fixture.files,
        &Credentials::default(),
        &history("master", vec![]),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap();

    assert!(fixture.configure().contains("AC_SUBST(PACKAGE_RELEASE, [2])"));
    assert!(fixture.spec().contains("> - 33.16.4-2\n"));
}

#[tokio::test]
async fn validates_bugs_on_stabilization_branch() {
    let fixture = Fixture::new("rhel-8");
    let commits = vec![create_test_commit("a1", "Fix crash (#123456)", &[])];

    run(
        &fixture.args(&[]),
        &fixture.files,
        &credentials(),
        &history("rhel-8", commits),
        tracker_with("123456", create_valid_bug("anaconda-33.16.4-1")),
        today(),
    )
    .await
    .unwrap();

    assert!(
        fixture
            .spec()
            .contains("- Fix crash (a@b.com)\n  Resolves: rhbz#123456\n\n")
    );
}

#[test_log::test(tokio::test)]
async fn invalid_commit_writes_nothing() {
    let fixture = Fixture::new("rhel-8");
    let commits = vec![create_test_commit("a1", "Fix crash (#123456)", &[])];

    let err = run(
        &fixture.args(&[]),
        &fixture.files,
        &credentials(),
        &history("rhel-8", commits),
        tracker_with("123456", create_valid_bug("anaconda-33.16.3-1")),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BumpverError::InvalidCommits(1)));
    assert_eq!(fixture.configure(), CONFIGURE);
    assert_eq!(fixture.spec(), SPEC);
}

#[tokio::test]
async fn zanata_mismatch_aborts_before_reading_commits() {
    let fixture = Fixture::new("master");

    let mut history = MockHistory::new();
    history
        .expect_current_branch()
        .returning(|| Ok("rhel-8".into()));
    history.expect_commits_since().never();
    history.expect_author().never();

    let err = run(
        &fixture.args(&[]),
        &fixture.files,
        &credentials(),
        &history,
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BumpverError::ZanataMismatch { .. }));
    assert_eq!(fixture.configure(), CONFIGURE);
}

#[tokio::test]
async fn skip_all_skips_zanata_and_bugs() {
    let fixture = Fixture::new("master");
    let commits = vec![create_test_commit("a1", "Fix crash (#123456)", &[])];

    run(
        &fixture.args(&["-S"]),
        &fixture.files,
        &Credentials::default(),
        &history("rhel-8", commits),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap();

    assert!(
        fixture
            .spec()
            .contains("- Fix crash (a@b.com)\n  Resolves: rhbz#123456\n")
    );
}

#[tokio::test]
async fn missing_anchor_leaves_files_untouched() {
    let fixture = Fixture::new("master");
    fs::write(
        &fixture.files.configure,
        "AC_INIT([anaconda], [33.16.2], [anaconda-devel@example.org])\n",
    )
    .unwrap();

    let err = run(
        &fixture.args(&[]),
        &fixture.files,
        &Credentials::default(),
        &history("master", vec![]),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BumpverError::MissingAnchor { .. }));
    assert_eq!(fixture.spec(), SPEC);
}

#[test]
fn locate_requires_configure_and_spec() {
    let tmp = TempDir::new().unwrap();

    let err = SourceFiles::locate(&args_for(tmp.path(), &[])).unwrap_err();
    assert!(matches!(err, BumpverError::MissingSourceFile(f) if f.ends_with("configure.ac")));

    fs::write(tmp.path().join("configure.ac"), CONFIGURE).unwrap();

    let err = SourceFiles::locate(&args_for(tmp.path(), &[])).unwrap_err();
    assert!(matches!(err, BumpverError::MissingSourceFile(f) if f.ends_with("anaconda.spec.in")));
}

#[tokio::test]
async fn failed_staging_write_leaves_files_untouched() {
    let fixture = Fixture::new("master");
    let blocked = staging_path(&fixture.files.spec);
    fs::create_dir(&blocked).unwrap();

    let err = run(
        &fixture.args(&[]),
        &fixture.files,
        &Credentials::default(),
        &history("master", vec![create_test_commit("a1", "Fix typo", &[])]),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, BumpverError::IoError(_)));
    assert_eq!(fixture.configure(), CONFIGURE);
    assert_eq!(fixture.spec(), SPEC);
    assert!(!staging_path(&fixture.files.configure).exists());
}

#[tokio::test]
async fn successful_bump_leaves_no_staging_files() {
    let fixture = Fixture::new("master");

    run(
        &fixture.args(&[]),
        &fixture.files,
        &Credentials::default(),
        &history("master", vec![]),
        untouched_tracker(),
        today(),
    )
    .await
    .unwrap();

    assert!(!staging_path(&fixture.files.configure).exists());
    assert!(!staging_path(&fixture.files.spec).exists());
}

#[test]
fn read_keeps_io_errors_other_than_missing_file() {
    let tmp = TempDir::new().unwrap();

    let err = read(&tmp.path().join("configure.ac")).unwrap_err();
    assert!(matches!(err, BumpverError::MissingSourceFile(_)));

    let binary = tmp.path().join("configure.ac");
    fs::write(&binary, [0xff, 0xfe, 0x00]).unwrap();

    let err = read(&binary).unwrap_err();
    assert!(matches!(err, BumpverError::IoError(_)));
}
