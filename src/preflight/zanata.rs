//! Translation platform gate: `zanata.xml` must point at the branch being
//! released.
use log::*;
use quick_xml::{Reader, events::Event};
use std::{fs, path::Path};

use crate::error::{BumpverError, Result};

const PROJECT_VERSION_TAG: &[u8] = b"project-version";

/// Text of the first `<project-version>` element, trimmed.
pub fn project_version(xml: &str) -> Result<Option<String>> {
    let mut reader = Reader::from_str(xml);
    let mut in_version = false;
    let mut text = String::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.local_name().as_ref() == PROJECT_VERSION_TAG => {
                in_version = true;
            }
            Event::Empty(e) if e.local_name().as_ref() == PROJECT_VERSION_TAG => {
                return Ok(Some(String::new()));
            }
            Event::Text(t) if in_version => text.push_str(&t.unescape()?),
            Event::CData(c) if in_version => {
                text.push_str(&String::from_utf8(c.into_inner().into_owned())?)
            }
            Event::End(e) if in_version && e.local_name().as_ref() == PROJECT_VERSION_TAG => {
                return Ok(Some(text.trim().to_string()));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}

/// Fail unless the project-version in `path` equals `branch`.
pub fn check(path: &Path, branch: &str) -> Result<()> {
    let xml = fs::read_to_string(path)
        .map_err(|_| BumpverError::MissingSourceFile(path.display().to_string()))?;

    let found = project_version(&xml)?;

    if found.as_deref() != Some(branch) {
        return Err(BumpverError::ZanataMismatch {
            found,
            expected: branch.to_string(),
        });
    }

    info!("zanata project-version matches branch {branch}");

    Ok(())
}
