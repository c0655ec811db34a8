//! Field paths and the validation error taxonomy.
//!
//! Rendered messages are matched on by callers, e.g.
//! `spec.template.containers[0].name: Missing field: must be specified`.

use std::fmt;
use thiserror::Error;

/// Dotted path to a field, with `[i]` for list positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath(String);

impl FieldPath {
    pub fn new(root: &str) -> Self {
        Self(root.to_string())
    }

    pub fn child(&self, name: &str) -> Self {
        Self(format!("{}.{}", self.0, name))
    }

    pub fn index(&self, i: usize) -> Self {
        Self(format!("{}[{}]", self.0, i))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Missing,
    Invalid,
    Unsupported,
    BeyondRange,
    ContainerCountUnsupported,
    SizeLimitExceeded,
    UnsupportedResourceSpecification,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Missing => "ErrMissing",
            Self::Invalid => "ErrInvalid",
            Self::Unsupported => "ErrUnsupported",
            Self::BeyondRange => "ErrBeyondRange",
            Self::ContainerCountUnsupported => "ErrContainerCountUnsupported",
            Self::SizeLimitExceeded => "ErrSizeLimitExceeded",
            Self::UnsupportedResourceSpecification => "ErrUnsupportedResourceSpecification",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{field}: Missing field: must be specified")]
    Missing { field: FieldPath },

    #[error("{field}: Invalid value: {value:?}: {detail}")]
    Invalid {
        field: FieldPath,
        value: String,
        detail: String,
    },

    #[error("{field}: Unsupported field{}", suffix(.detail))]
    Unsupported { field: FieldPath, detail: String },

    #[error("{field}: Out of range: {value}: {detail}")]
    BeyondRange {
        field: FieldPath,
        value: String,
        detail: String,
    },

    #[error("{field}: Unsupported container count: {count}: {detail}")]
    ContainerCountUnsupported {
        field: FieldPath,
        count: usize,
        detail: String,
    },

    #[error("{field}: Exceeding size limit: {detail}")]
    SizeLimitExceeded { field: FieldPath, detail: String },

    #[error("{field}: Unsupported resource specification: {requested}: must be one of {allowed}")]
    UnsupportedResourceSpecification {
        field: FieldPath,
        requested: String,
        allowed: String,
    },
}

fn suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {detail}")
    }
}

impl FieldError {
    pub fn missing(field: FieldPath) -> Self {
        Self::Missing { field }
    }

    pub fn invalid(field: FieldPath, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            value: value.into(),
            detail: detail.into(),
        }
    }

    pub fn unsupported(field: FieldPath, detail: impl Into<String>) -> Self {
        Self::Unsupported {
            field,
            detail: detail.into(),
        }
    }

    pub fn beyond_range(field: FieldPath, value: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::BeyondRange {
            field,
            value: value.into(),
            detail: detail.into(),
        }
    }

    pub fn container_count(field: FieldPath, count: usize) -> Self {
        Self::ContainerCountUnsupported {
            field,
            count,
            detail: "there must be exactly one container".to_string(),
        }
    }

    pub fn size_limit(field: FieldPath, detail: impl Into<String>) -> Self {
        Self::SizeLimitExceeded {
            field,
            detail: detail.into(),
        }
    }

    pub fn unsupported_resources(
        field: FieldPath,
        requested: impl Into<String>,
        allowed: impl Into<String>,
    ) -> Self {
        Self::UnsupportedResourceSpecification {
            field,
            requested: requested.into(),
            allowed: allowed.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Missing { .. } => ErrorKind::Missing,
            Self::Invalid { .. } => ErrorKind::Invalid,
            Self::Unsupported { .. } => ErrorKind::Unsupported,
            Self::BeyondRange { .. } => ErrorKind::BeyondRange,
            Self::ContainerCountUnsupported { .. } => ErrorKind::ContainerCountUnsupported,
            Self::SizeLimitExceeded { .. } => ErrorKind::SizeLimitExceeded,
            Self::UnsupportedResourceSpecification { .. } => {
                ErrorKind::UnsupportedResourceSpecification
            }
        }
    }

    pub fn field(&self) -> &FieldPath {
        match self {
            Self::Missing { field }
            | Self::Invalid { field, .. }
            | Self::Unsupported { field, .. }
            | Self::BeyondRange { field, .. }
            | Self::ContainerCountUnsupported { field, .. }
            | Self::SizeLimitExceeded { field, .. }
            | Self::UnsupportedResourceSpecification { field, .. } => field,
        }
    }
}

/// Ordered collection of field errors; checks append rather than short-circuit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", aggregate(.0))]
pub struct ErrorList(Vec<FieldError>);

fn aggregate(errors: &[FieldError]) -> String {
    match errors {
        [] => String::new(),
        [only] => only.to_string(),
        many => format!(
            "[{}]",
            many.iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.0.push(error);
    }

    pub fn append(&mut self, mut other: ErrorList) {
        self.0.append(&mut other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.0.iter()
    }

    /// `Ok(())` when empty, otherwise the list itself as the error.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.0.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<FieldError> for ErrorList {
    fn from(error: FieldError) -> Self {
        Self(vec![error])
    }
}

impl FromIterator<FieldError> for ErrorList {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ErrorList {
    type Item = FieldError;
    type IntoIter = std::vec::IntoIter<FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ErrorList {
    type Item = &'a FieldError;
    type IntoIter = std::slice::Iter<'a, FieldError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
