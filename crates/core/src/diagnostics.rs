//! Structured reporting for recoverable resource errors.
//!
//! Shader compile failures, unresolved uniforms and incomplete framebuffers
//! do not abort pipeline construction. They are collected into a
//! [`Diagnostics`] value returned next to the object being built, and each
//! entry is mirrored to `tracing` as it is pushed.

use std::fmt;

/// How serious a diagnostic is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// The object is usable; some optional input is missing.
    Warning,
    /// The object is degraded (null program, disabled subpass, unbound input).
    Error,
}

/// Category of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    ShaderCompile,
    ProgramLink,
    UniformNotFound,
    InvalidAccessor,
    FramebufferIncomplete,
    CapacityExceeded,
}

impl DiagnosticKind {
    /// Severity attached to this kind.
    pub const fn severity(self) -> Severity {
        match self {
            Self::UniformNotFound => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Short human readable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::ShaderCompile => "shader compile",
            Self::ProgramLink => "program link",
            Self::UniformNotFound => "uniform not found",
            Self::InvalidAccessor => "invalid field accessor",
            Self::FramebufferIncomplete => "framebuffer incomplete",
            Self::CapacityExceeded => "capacity exceeded",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single reported problem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
    /// What the problem is about: a pass, a program or a uniform name.
    pub subject: String,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.kind, self.subject, self.message)
    }
}

/// Collected diagnostics.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and log it.
    pub fn push(
        &mut self,
        kind: DiagnosticKind,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) {
        let diagnostic = Diagnostic {
            severity: kind.severity(),
            kind,
            subject: subject.into(),
            message: message.into(),
        };

        match diagnostic.severity {
            Severity::Warning => tracing::warn!(
                kind = %diagnostic.kind,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
            Severity::Error => tracing::error!(
                kind = %diagnostic.kind,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.message
            ),
        }

        self.entries.push(diagnostic);
    }

    /// Move every entry of `other` into `self` without logging them again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if any entry has [`Severity::Error`].
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_assigns_severity_from_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::UniformNotFound, "lighting", "uColor");
        assert!(!diagnostics.has_errors());

        diagnostics.push(DiagnosticKind::FramebufferIncomplete, "velocity", "no attachments");
        assert!(diagnostics.has_errors());
        assert_eq!(diagnostics.len(), 2);
    }

    #[test]
    fn test_of_kind_filters() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::ShaderCompile, "taa", "syntax error");
        diagnostics.push(DiagnosticKind::UniformNotFound, "taa", "uJitterVec2");
        diagnostics.push(DiagnosticKind::UniformNotFound, "taa", "uFrameCountUint");

        let missing: Vec<_> = diagnostics
            .of_kind(DiagnosticKind::UniformNotFound)
            .map(|d| d.message.as_str())
            .collect();
        assert_eq!(missing, ["uJitterVec2", "uFrameCountUint"]);
    }

    #[test]
    fn test_extend_merges() {
        let mut a = Diagnostics::new();
        a.push(DiagnosticKind::ProgramLink, "debug", "link failed");
        let mut b = Diagnostics::new();
        b.push(DiagnosticKind::CapacityExceeded, "debug", "9 dependencies");

        a.extend(b);
        assert_eq!(a.len(), 2);
        assert_eq!(
            a.iter().last().map(|d| d.kind),
            Some(DiagnosticKind::CapacityExceeded)
        );
    }

    #[test]
    fn test_display() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::UniformNotFound, "shadow", "uViewMat");
        let text = diagnostics.iter().next().map(ToString::to_string);
        assert_eq!(text.as_deref(), Some("uniform not found [shadow]: uViewMat"));
    }
}
