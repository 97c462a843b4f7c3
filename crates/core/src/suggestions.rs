//! Suggestions for incomplete requests, plus per-task enhancement ideas.
//!
//! Everything here is a pure function of its inputs; no generation calls.

use serde::Serialize;

use crate::classifier::RequestAnalysis;
use crate::error::ValidationError;
use crate::grade::{GradeSet, parse_grade_range};
use crate::task::TaskType;

const CULTURAL_SUGGESTIONS: [&str; 4] = [
    "Include local festivals or traditions",
    "Use familiar rural examples",
    "Reference agricultural cycles",
    "Include community values",
];

const DEFAULT_SUBJECTS: [&str; 6] = [
    "Mathematics",
    "Environmental Studies",
    "Science",
    "English",
    "Hindi",
    "Social Studies",
];

const DEFAULT_GRADE_BANDS: [&str; 3] = ["1-3", "4-6", "7-8"];

/// Fixed-shape guidance returned when a request cannot be used as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Suggestions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub missing_information: Vec<String>,
    pub suggested_task_types: Vec<TaskType>,
    pub suggested_grade_levels: Vec<String>,
    pub recommended_subjects: Vec<String>,
    pub cultural_suggestions: Vec<String>,
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

/// Builds suggestions from a classification and the validation failure it produced, if any.
pub fn provide_suggestions(
    analysis: &RequestAnalysis,
    failure: Option<&ValidationError>,
) -> Suggestions {
    let signals = analysis.signals;
    let mut missing = Vec::new();

    match failure {
        Some(ValidationError::MissingField(field)) => push_unique(&mut missing, field),
        Some(ValidationError::InvalidGradeFormat(_)) => {
            push_unique(&mut missing, "Grade level(s) between 1 and 12")
        }
        Some(ValidationError::UnsupportedLanguage(_)) => {
            push_unique(&mut missing, "A supported language")
        }
        Some(ValidationError::InvalidTaskType(_)) => push_unique(&mut missing, "Content type"),
        None => {}
    }
    if !signals.task_type {
        push_unique(&mut missing, "Content type (story, worksheet, visual aid or lesson plan)");
    }
    if !signals.topic {
        push_unique(&mut missing, "Specific topic or learning objective");
    }
    if !signals.grade_level {
        push_unique(&mut missing, "Grade level(s)");
    }
    if !signals.subject {
        push_unique(&mut missing, "Subject area");
    }
    if !signals.language {
        push_unique(&mut missing, "Language preference");
    }

    let suggested_task_types = if signals.task_type {
        analysis.task_types.clone()
    } else {
        vec![
            TaskType::Story,
            TaskType::Worksheet,
            TaskType::VisualAid,
            TaskType::LessonPlan,
        ]
    };

    let mut suggested_grade_levels = Vec::new();
    if let Ok(grades) = parse_grade_range(&analysis.request.grade_level) {
        if signals.grade_level {
            push_unique(&mut suggested_grade_levels, &grades.to_range_string());
        }
    }
    for band in DEFAULT_GRADE_BANDS {
        push_unique(&mut suggested_grade_levels, band);
    }

    let recommended_subjects = if signals.subject {
        vec![analysis.request.subject.clone()]
    } else {
        DEFAULT_SUBJECTS.iter().map(|s| s.to_string()).collect()
    };

    Suggestions {
        reason: failure.map(ToString::to_string),
        missing_information: missing,
        suggested_task_types,
        suggested_grade_levels,
        recommended_subjects,
        cultural_suggestions: CULTURAL_SUGGESTIONS.iter().map(|s| s.to_string()).collect(),
    }
}

/// Ideas that make a story more engaging for a given class.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoryEnhancements {
    pub interactive_elements: Vec<&'static str>,
    pub cultural_connections: Vec<&'static str>,
    pub extension_activities: Vec<&'static str>,
}

pub fn story_enhancements(grades: &GradeSet) -> StoryEnhancements {
    let interactive_elements = match grades.max() {
        ..=3 => vec![
            "Simple sound effects students can make",
            "Basic hand gestures or movements",
            "Repetitive phrases students can join in",
        ],
        4..=6 => vec![
            "Character voice changes",
            "Prediction questions at key moments",
            "Simple role-playing opportunities",
        ],
        _ => vec![
            "Discussion questions about character motivations",
            "Alternative ending brainstorming",
            "Connect to real-world examples",
        ],
    };
    StoryEnhancements {
        interactive_elements,
        cultural_connections: vec![
            "Local festivals and celebrations",
            "Traditional games and activities",
            "Agricultural cycles and seasons",
            "Family and community structures",
            "Local wildlife and nature",
        ],
        extension_activities: vec![
            "Draw a favorite scene from the story",
            "Act out the story in small groups",
            "Create their own ending",
            "Share similar stories from their families",
        ],
    }
}

/// Worksheet adaptations per learner profile, in a fixed order.
pub fn worksheet_adaptations() -> Vec<(&'static str, Vec<&'static str>)> {
    vec![
        (
            "visual_learners",
            vec!["Add simple diagrams or drawings", "Include picture-based questions"],
        ),
        (
            "hands_on_learners",
            vec!["Include counting or measuring with local objects", "Use seeds or stones as manipulatives"],
        ),
        (
            "collaborative_learners",
            vec!["Design pair-work sections", "Add peer teaching opportunities"],
        ),
        (
            "struggling_learners",
            vec!["Provide worked examples", "Break complex problems into steps"],
        ),
        (
            "advanced_learners",
            vec!["Add challenge questions", "Include open-ended problems"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Classifier, KeywordClassifier};
    use crate::validation::validate_task_request;

    fn suggestions_for(text: &str) -> Suggestions {
        let analysis = KeywordClassifier::new().analyze(text, None);
        let failure = validate_task_request(&analysis.request, &["en", "hi", "te"]).err();
        provide_suggestions(&analysis, failure.as_ref())
    }

    #[test]
    fn test_empty_input_lists_everything_missing() {
        let s = suggestions_for("");
        assert_eq!(s.reason.as_deref(), Some("Topic is required"));
        assert_eq!(s.missing_information[0], "Topic");
        assert!(s.missing_information.contains(&"Grade level(s)".to_string()));
        assert!(s.missing_information.contains(&"Subject area".to_string()));
        assert_eq!(s.suggested_task_types.len(), 4);
        assert_eq!(s.suggested_grade_levels, vec!["1-3", "4-6", "7-8"]);
        assert_eq!(s.recommended_subjects.len(), DEFAULT_SUBJECTS.len());
        assert_eq!(s.cultural_suggestions.len(), 4);
    }

    #[test]
    fn test_bad_grade_is_reported() {
        let s = suggestions_for("a science worksheet on plants for grade 15 in hindi");
        assert_eq!(s.reason.as_deref(), Some("Invalid grade level format: 15"));
        assert_eq!(s.missing_information, vec!["Grade level(s) between 1 and 12"]);
        assert_eq!(s.suggested_task_types, vec![TaskType::Worksheet]);
        assert_eq!(s.recommended_subjects, vec!["science"]);
    }

    #[test]
    fn test_same_input_same_suggestions() {
        assert_eq!(suggestions_for("help me"), suggestions_for("help me"));
    }

    #[test]
    fn test_known_grade_is_suggested_first() {
        let s = suggestions_for("story about rain for grades 2 to 4");
        assert_eq!(s.suggested_grade_levels[0], "2-4");
        assert!(s.reason.is_none());
    }

    #[test]
    fn test_story_enhancements_by_grade() {
        let young = story_enhancements(&parse_grade_range("1-3").unwrap());
        assert_eq!(young.interactive_elements[0], "Simple sound effects students can make");
        let older = story_enhancements(&parse_grade_range("7").unwrap());
        assert_eq!(older.interactive_elements[1], "Alternative ending brainstorming");
    }

    #[test]
    fn test_worksheet_adaptations_order() {
        let names: Vec<_> = worksheet_adaptations().into_iter().map(|(k, _)| k).collect();
        assert_eq!(names.first(), Some(&"visual_learners"));
        assert_eq!(names.last(), Some(&"advanced_learners"));
    }
}
