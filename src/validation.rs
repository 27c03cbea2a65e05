//! Explicit validators for every trust boundary: inbound API payloads,
//! optimizer wire payloads and internally assembled results.
//!
//! `serde` decides the shape; [`Validate`] decides whether the values make
//! sense. Nothing crosses a boundary without passing both.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub path: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Accumulates issues while walking a value.
#[derive(Debug, Default)]
pub struct Issues(Vec<ValidationIssue>);

impl Issues {
    pub fn push(&mut self, path: &str, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(path, message));
    }

    pub fn check(&mut self, ok: bool, path: &str, message: impl Into<String>) {
        if !ok {
            self.push(path, message);
        }
    }

    pub fn check_range(&mut self, value: f64, min: f64, max: f64, path: &str) {
        if !value.is_finite() {
            self.push(path, "must be a finite number");
        } else if value < min {
            self.push(path, format!("must be >= {}", min));
        } else if value > max {
            self.push(path, format!("must be <= {}", max));
        }
    }

    pub fn check_non_negative(&mut self, value: f64, path: &str) {
        if !value.is_finite() || value < 0.0 {
            self.push(path, "must be a finite number >= 0");
        }
    }

    pub fn check_non_empty(&mut self, value: &str, path: &str) {
        self.check(!value.is_empty(), path, "must not be empty");
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

/// Joins a parent path and a field name the way issue paths are rendered.
pub fn field(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", path, name)
    }
}

pub fn index(path: &str, idx: usize) -> String {
    format!("{}[{}]", path, idx)
}

pub trait Validate {
    fn collect_issues(&self, path: &str, issues: &mut Issues);

    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::default();
        self.collect_issues("", &mut issues);
        issues.finish()
    }
}

impl<T: Validate> Validate for Option<T> {
    fn collect_issues(&self, path: &str, issues: &mut Issues) {
        if let Some(value) = self {
            value.collect_issues(path, issues);
        }
    }
}
