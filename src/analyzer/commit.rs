use std::fmt;

/// A commit in the bump range as returned by the history provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRecord {
    pub hash: String,
    pub subject: String,
    /// Non-empty lines of the commit body.
    pub body: Vec<String>,
    /// Author identity shown in the changelog.
    pub author: String,
}

/// What a commit does to a referenced bug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BugAction {
    Resolves,
    Related,
    Conflicts,
}

impl BugAction {
    pub fn parse(action: &str) -> Option<Self> {
        match action {
            "Resolves" => Some(Self::Resolves),
            "Related" => Some(Self::Related),
            "Conflicts" => Some(Self::Conflicts),
            _ => None,
        }
    }
}

impl fmt::Display for BugAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let action = match self {
            Self::Resolves => "Resolves",
            Self::Related => "Related",
            Self::Conflicts => "Conflicts",
        };
        write!(f, "{action}")
    }
}

/// A bug id paired with the commit's action on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BugReference {
    pub id: String,
    pub action: BugAction,
}

impl BugReference {
    /// Changelog annotation line, e.g. `Resolves: rhbz#123456`.
    pub fn annotation(&self) -> String {
        format!("{}: rhbz#{}", self.action, self.id)
    }
}

/// One bullet of the changelog block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangelogEntry {
    pub summary: String,
    /// Annotation lines in insertion order, without duplicates.
    pub annotations: Vec<String>,
}

impl ChangelogEntry {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            annotations: vec![],
        }
    }

    pub fn add_annotation(&mut self, annotation: String) {
        if !self.annotations.contains(&annotation) {
            self.annotations.push(annotation);
        }
    }

    pub fn remove_annotation(&mut self, annotation: &str) {
        self.annotations.retain(|a| a != annotation);
    }
}
