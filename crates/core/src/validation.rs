//! Request validation and input sanitisation.

use crate::error::ValidationError;
use crate::grade::{GradeSet, parse_grade_range};
use crate::language::validate_language_support;
use crate::task::{TaskRequest, TaskType};

/// A `TaskRequest` that passed validation, with its task type and grades resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    pub request: TaskRequest,
    pub task_type: TaskType,
    pub grades: GradeSet,
}

/// Checks every field of `request`; the first problem found is returned.
pub fn validate_task_request<S: AsRef<str>>(
    request: &TaskRequest,
    supported_languages: &[S],
) -> Result<ValidatedRequest, ValidationError> {
    if request.task_type.trim().is_empty() {
        return Err(ValidationError::MissingField("Task type"));
    }
    let task_type: TaskType = request
        .task_type
        .parse()
        .map_err(|_| ValidationError::InvalidTaskType(request.task_type.clone()))?;

    if request.topic.trim().is_empty() {
        return Err(ValidationError::MissingField("Topic"));
    }
    if request.subject.trim().is_empty() {
        return Err(ValidationError::MissingField("Subject"));
    }
    if request.grade_level.trim().is_empty() {
        return Err(ValidationError::MissingField("Grade level"));
    }
    let grades = parse_grade_range(&request.grade_level)?;

    if !validate_language_support(&request.language, supported_languages) {
        return Err(ValidationError::UnsupportedLanguage(request.language.clone()));
    }

    Ok(ValidatedRequest {
        request: request.clone(),
        task_type,
        grades,
    })
}

/// Strips characters that have no place in a teacher's request and trims the rest.
pub fn sanitize_input(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | '[' | ']' | '\\'))
        .collect::<String>()
        .trim()
        .to_string()
}
