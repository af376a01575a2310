//! Stamps the new version and release into `configure.ac`.
use log::*;

use crate::{
    error::{BumpverError, Result},
    version::VersionTuple,
};

fn init_line(name: &str, version: &str, bugreport: &str) -> String {
    format!("AC_INIT([{name}], [{version}], [{bugreport}])")
}

fn release_line(release: &str) -> String {
    format!("AC_SUBST(PACKAGE_RELEASE, [{release}])")
}

/// Line `configure.ac` must carry for the release placeholder.
pub const RELEASE_PLACEHOLDER: &str = "AC_SUBST(PACKAGE_RELEASE, [1])";

/// Replace the `AC_INIT` and `PACKAGE_RELEASE` lines of `content`.
///
/// Both lines are matched verbatim. An `AC_INIT` carrying any other version
/// or bug report address means the file was not what we expected, so
/// nothing is stamped.
pub fn stamp(content: &str, versions: &VersionTuple, bugreport: &str) -> Result<String> {
    let current_init = init_line(&versions.name, &versions.version, bugreport);
    let next_init = init_line(&versions.name, &versions.next_version, bugreport);
    let next_release = release_line(&versions.next_release);

    let mut found_init = false;
    let mut found_release = false;

    let mut stamped = String::with_capacity(content.len());

    for line in content.split_inclusive('\n') {
        let (text, ending) = match line.strip_suffix('\n') {
            Some(text) => (text, "\n"),
            None => (line, ""),
        };

        if text == current_init {
            found_init = true;
            stamped.push_str(&next_init);
        } else if text == RELEASE_PLACEHOLDER {
            found_release = true;
            stamped.push_str(&next_release);
        } else {
            stamped.push_str(text);
        }

        stamped.push_str(ending);
    }

    if !found_init {
        return Err(BumpverError::missing_anchor("configure.ac", &current_init));
    }

    if !found_release {
        return Err(BumpverError::missing_anchor(
            "configure.ac",
            RELEASE_PLACEHOLDER,
        ));
    }

    debug!("stamped {next_init} and {next_release}");

    Ok(stamped)
}
