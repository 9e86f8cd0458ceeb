//! Merging field, group and form errors into one report.

use super::errors::{ErrorScope, ValidationError};
use crate::form::FormModel;

/// Every current error of a form, plus the touched state needed to decide
/// which of them to show.
#[derive(Debug, Clone, Default)]
pub struct ValidationSummary {
    entries: Vec<(ValidationError, bool)>,
}

impl ValidationSummary {
    /// All errors in report order: field and group errors in schema order,
    /// then form errors.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationError> {
        self.entries.iter().map(|(e, _)| e)
    }

    /// Errors to display: field and group errors of touched controls, and
    /// every form error.
    pub fn visible(&self) -> Vec<&ValidationError> {
        self.entries.iter().filter(|(_, touched)| *touched).map(|(e, _)| e).collect()
    }

    /// Number of errors blocking submission.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Submission is allowed only with no errors at all, touched or not.
    pub fn can_submit(&self) -> bool {
        self.entries.is_empty()
    }

    /// Errors of one scope.
    pub fn by_scope(&self, scope: ErrorScope) -> Vec<&ValidationError> {
        self.errors().filter(|e| e.scope == scope).collect()
    }

    /// Errors of one array item.
    pub fn for_item(&self, array: &str, index: usize) -> Vec<&ValidationError> {
        self.errors()
            .filter(|e| e.path == array && e.item.as_ref().is_some_and(|i| i.index == index))
            .collect()
    }
}

/// Collect every error of `form`.
pub fn aggregate(form: &FormModel) -> ValidationSummary {
    let mut entries = Vec::new();

    for field in form.schema().fields() {
        if let Some(control) = form.control(&field.path) {
            for kind in control.errors() {
                let error = ValidationError::field(&field.path, kind.clone());
                entries.push((error, control.is_touched()));
            }
        } else if let Some(array) = form.array(&field.path) {
            for (index, item) in array.items().iter().enumerate() {
                for (sub, control) in item.controls() {
                    for kind in control.errors() {
                        entries.push((
                            ValidationError::group(&field.path, index, sub, kind.clone()),
                            control.is_touched(),
                        ));
                    }
                }
            }
        }
    }

    entries.extend(form.form_errors().iter().cloned().map(|e| (e, true)));

    ValidationSummary { entries }
}
