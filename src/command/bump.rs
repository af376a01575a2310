//! The bump workflow: pre-flight checks, commit classification and the
//! rewrite of `configure.ac` and the RPM spec.
use chrono::{Local, NaiveDate};
use log::*;
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{
    analyzer::classifier::{Classifier, ClassifierOptions},
    bugzilla::{cache::BugCache, client::Bugzilla, traits::BugTracker},
    cli::Args,
    config::{Credentials, STABILIZATION_BRANCH_PREFIX},
    error::{BumpverError, Result},
    preflight::{jenkins::Jenkins, zanata},
    repo::{History, Repository},
    updater::{
        changelog::{self, ChangelogHeader},
        configure,
    },
    version::VersionTuple,
};

/// Files a bump reads and rewrites.
#[derive(Debug, Clone)]
pub struct SourceFiles {
    pub configure: PathBuf,
    pub spec: PathBuf,
    pub zanata: PathBuf,
}

impl SourceFiles {
    /// Resolve the file paths from `args`, failing if the build
    /// configuration or spec template does not exist.
    pub fn locate(args: &Args) -> Result<Self> {
        let files = Self {
            configure: args.configure_path(),
            spec: args.spec_path(),
            zanata: args.zanata_path(),
        };

        for path in [&files.configure, &files.spec] {
            if !path.is_file() {
                return Err(BumpverError::MissingSourceFile(
                    path.display().to_string(),
                ));
            }
        }

        Ok(files)
    }
}

/// Suffix of the staging file each output is written to before renaming.
const STAGING_SUFFIX: &str = ".bumpver-tmp";

fn read(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => {
            BumpverError::MissingSourceFile(path.display().to_string())
        }
        _ => BumpverError::IoError(err),
    })
}

fn staging_path(path: &Path) -> PathBuf {
    let mut staged = path.as_os_str().to_owned();
    staged.push(STAGING_SUFFIX);
    PathBuf::from(staged)
}

fn discard(path: &Path) {
    if let Err(err) = fs::remove_file(path) {
        warn!("unable to remove {}: {err}", path.display());
    }
}

/// Write every output to a staging file, then rename them all into place.
/// A failed staging write removes the staged files and leaves the targets
/// untouched.
fn write_outputs(outputs: &[(&Path, String)]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = vec![];

    for (target, content) in outputs.iter() {
        let staging = staging_path(target);

        if let Err(err) = fs::write(&staging, content) {
            if staging.is_file() {
                discard(&staging);
            }
            for (path, _) in staged.iter() {
                discard(path);
            }
            return Err(err.into());
        }

        staged.push((staging, *target));
    }

    for (staging, target) in staged {
        fs::rename(&staging, target)?;
        info!("updated {}", target.display());
    }

    Ok(())
}

/// Run a bump from the command line.
pub async fn execute(args: &Args) -> Result<()> {
    let files = SourceFiles::locate(args)?;
    let credentials = Credentials::load_default()?;
    let repo = Repository::open(&args.source_dir)?;
    let tracker = Bugzilla::new(credentials.bugzilla_url())?;

    run(
        args,
        &files,
        &credentials,
        &repo,
        Box::new(tracker),
        Local::now().date_naive(),
    )
    .await
}

async fn check_jenkins(args: &Args, credentials: &Credentials, branch: &str) {
    let Some(url) = credentials.jenkins_url.as_deref() else {
        warn!("JENKINS is not set: skipping build status check");
        return;
    };

    match Jenkins::new(url, credentials.jenkins_proxy.as_deref()) {
        Ok(jenkins) => jenkins.check(&args.name, branch).await,
        Err(err) => warn!("unable to check jenkins: {err}"),
    }
}

/// Bump the package in `files` using `history` for the commit range and
/// `tracker` for bug validation. Nothing is written unless every step
/// succeeds.
pub async fn run(
    args: &Args,
    files: &SourceFiles,
    credentials: &Credentials,
    history: &dyn History,
    tracker: Box<dyn BugTracker>,
    today: NaiveDate,
) -> Result<()> {
    let branch = history.current_branch()?;
    debug!("current branch: {branch}");

    if args.skips_zanata() {
        debug!("skipping zanata check");
    } else {
        zanata::check(&files.zanata, &branch)?;
    }

    if args.skips_jenkins() {
        debug!("skipping jenkins check");
    } else {
        check_jenkins(args, credentials, &branch).await;
    }

    let versions = VersionTuple::new(
        &args.name,
        &args.version,
        &args.release,
        args.newrelease.as_deref(),
    )?;

    info!(
        "bumping {} {}-{} to {}-{}",
        versions.name,
        versions.version,
        versions.release,
        versions.next_version,
        versions.next_release
    );

    let options = ClassifierOptions {
        stabilization: branch.starts_with(STABILIZATION_BRANCH_PREFIX),
        skip_all: args.skip_all,
        skip_acks: args.skips_acks(),
        fixed_in: versions.fixed_in(),
        bug_map: args.bug_map()?,
        ignore: args.ignore_list(),
    };

    if options.stabilization {
        info!("{branch} is a stabilization branch: validating bugs");
    }

    let commits = history.commits_since(&versions.previous_tag())?;

    let mut bugs = BugCache::new(
        tracker,
        credentials.username.clone(),
        credentials.password.clone(),
    );

    let entries = Classifier::new(&options, &mut bugs)
        .classify_all(&commits)
        .await?;

    let header = ChangelogHeader {
        date: today,
        author: history.author()?,
        version: versions.next_version.clone(),
        release: versions.next_release.clone(),
    };

    let configure = configure::stamp(&read(&files.configure)?, &versions, &args.bugreport)?;
    let spec = changelog::insert_block(&read(&files.spec)?, &header, &entries)?;

    write_outputs(&[
        (files.configure.as_path(), configure),
        (files.spec.as_path(), spec),
    ])
}

#[cfg(test)]
#[path = "./bump_tests.rs"]
mod tests;
