//! Command line arguments.
use clap::Parser;
use std::{collections::HashMap, path::PathBuf};

use crate::{
    config::{DEFAULT_CONFIGURE_FILE, DEFAULT_ZANATA_FILE},
    error::{BumpverError, Result},
};

/// Bump the version of a package, stamp configure.ac and write the new
/// changelog block into the RPM spec.
#[derive(Parser, Debug, Clone)]
#[command(about, long_about = None, disable_version_flag = true)]
pub struct Args {
    #[arg(short, long)]
    /// Package name.
    pub name: String,

    #[arg(short, long)]
    /// Current package version.
    pub version: String,

    #[arg(short, long)]
    /// Current package release.
    pub release: String,

    #[arg(short, long)]
    /// Bug reporting address from configure.ac.
    pub bugreport: String,

    #[arg(short = 'R', long)]
    /// Release of the new version. Defaults to the current release.
    pub newrelease: Option<String>,

    #[arg(short, long, default_value = "")]
    /// Comma separated commit hash prefixes to leave out.
    pub ignore: String,

    #[arg(short, long, default_value = "")]
    /// Comma separated bug id substitutions, old=new.
    pub map: String,

    #[arg(short, long, default_value_t = false)]
    /// Don't require ack flags on bugs.
    pub skip_acks: bool,

    #[arg(short = 'S', long, default_value_t = false)]
    /// Skip every bug tracker and pre-flight check.
    pub skip_all: bool,

    #[arg(short, long, default_value_t = false)]
    /// Enable debug logging.
    pub debug: bool,

    #[arg(long, default_value_t = false)]
    /// Skip the zanata.xml project-version check.
    pub skip_zanata: bool,

    #[arg(long, default_value_t = false)]
    /// Skip the Jenkins build status check.
    pub skip_jenkins: bool,

    #[arg(long, default_value = ".")]
    /// Source tree to bump.
    pub source_dir: PathBuf,

    #[arg(long)]
    /// Build configuration file. Defaults to configure.ac in the source tree.
    pub configure: Option<PathBuf>,

    #[arg(long)]
    /// RPM spec template. Defaults to <name>.spec.in in the source tree.
    pub spec: Option<PathBuf>,

    #[arg(long)]
    /// Translation config. Defaults to zanata.xml in the source tree.
    pub zanata: Option<PathBuf>,
}

impl Args {
    /// Hash prefixes passed with `--ignore`.
    pub fn ignore_list(&self) -> Vec<String> {
        self.ignore
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect()
    }

    /// Bug id substitutions passed with `--map`.
    pub fn bug_map(&self) -> Result<HashMap<String, String>> {
        let mut map = HashMap::new();

        for pair in self.map.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (old, new) = pair
                .split_once('=')
                .map(|(old, new)| (old.trim(), new.trim()))
                .filter(|(old, new)| !old.is_empty() && !new.is_empty())
                .ok_or_else(|| {
                    BumpverError::invalid_args(format!(
                        "malformed --map entry \"{pair}\", expected old=new"
                    ))
                })?;

            map.insert(old.to_string(), new.to_string());
        }

        Ok(map)
    }

    pub fn skips_acks(&self) -> bool {
        self.skip_acks || self.skip_all
    }

    pub fn skips_zanata(&self) -> bool {
        self.skip_zanata || self.skip_all
    }

    pub fn skips_jenkins(&self) -> bool {
        self.skip_jenkins || self.skip_all
    }

    pub fn configure_path(&self) -> PathBuf {
        self.configure
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_CONFIGURE_FILE))
    }

    pub fn spec_path(&self) -> PathBuf {
        self.spec
            .clone()
            .unwrap_or_else(|| self.source_dir.join(format!("{}.spec.in", self.name)))
    }

    pub fn zanata_path(&self) -> PathBuf {
        self.zanata
            .clone()
            .unwrap_or_else(|| self.source_dir.join(DEFAULT_ZANATA_FILE))
    }
}
