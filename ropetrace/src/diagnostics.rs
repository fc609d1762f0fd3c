use std::fmt;

use log::Level;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// A node couldn't be split the preferred way, so a cruder split (or no
    /// split at all) was used
    StructuralFallback,

    /// A node was too large for SAH and got split at the mean center
    SahLimitExceeded,

    /// A k-d tree was requested for an object without triangles
    EmptyObject,

    /// An object without triangles made it into the BVH as an empty leaf
    EmptySceneObject,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Diagnostic {
    pub level: Level,
    pub kind: DiagnosticKind,
    pub object: Option<String>,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(object) = &self.object {
            write!(f, "[{}] ", object)?;
        }

        write!(f, "{}", self.message)
    }
}

/// Anomalies noticed while building, returned alongside the result instead
/// of being printed on the spot.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn push(
        &mut self,
        level: Level,
        kind: DiagnosticKind,
        object: Option<&str>,
        message: impl Into<String>,
    ) {
        self.entries.push(Diagnostic {
            level,
            kind,
            object: object.map(ToOwned::to_owned),
            message: message.into(),
        });
    }

    pub fn debug(
        &mut self,
        kind: DiagnosticKind,
        object: &str,
        message: impl Into<String>,
    ) {
        self.push(Level::Debug, kind, Some(object), message);
    }

    pub fn warn(
        &mut self,
        kind: DiagnosticKind,
        object: &str,
        message: impl Into<String>,
    ) {
        self.push(Level::Warn, kind, Some(object), message);
    }

    pub fn error(
        &mut self,
        kind: DiagnosticKind,
        object: &str,
        message: impl Into<String>,
    ) {
        self.push(Level::Error, kind, Some(object), message);
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.entries.iter()
    }

    pub fn of_kind(
        &self,
        kind: DiagnosticKind,
    ) -> impl Iterator<Item = &Diagnostic> + '_ {
        self.iter().filter(move |entry| entry.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forwards all entries to the `log` facade.
    pub fn emit(&self) {
        for entry in &self.entries {
            log::log!(entry.level, "{}", entry);
        }
    }
}
