//! Intent Classifier
//!
//! Turns a free-text teacher request into a structured `TaskRequest`. The
//! keyword classifier below is the reference implementation; anything that
//! implements [`Classifier`] can replace it without touching the dispatcher
//! or the merger.
//!
//! Classification is total: every input, including the empty string, yields a
//! fully populated request. Bad classifications are caught later by validation.
//!
//! Task-type tie-break: every task type whose indicators appear is reported in
//! [`RequestAnalysis::task_types`] (routing-table order) so callers can fan out
//! to all of them. The single primary task type is the first match in
//! [`PRIMARY_PRIORITY`], which puts the specific categories (worksheet, visual
//! aid) ahead of the generic story default.

use regex::Regex;
use serde::Serialize;
use serde_json::Map;
use std::sync::LazyLock;

use crate::language::{LANGUAGE_HINTS, detect_language};
use crate::task::{TaskRequest, TaskType};
use crate::validation::sanitize_input;

pub const DEFAULT_GRADE_LEVEL: &str = "3-5";
pub const DEFAULT_SUBJECT: &str = "general";

/// Primary task type when several are mentioned, most specific first.
pub const PRIMARY_PRIORITY: [TaskType; 6] = [
    TaskType::Worksheet,
    TaskType::VisualAid,
    TaskType::LessonPlan,
    TaskType::Translation,
    TaskType::Story,
    TaskType::Qna,
];

static TASK_INDICATORS: LazyLock<Vec<(TaskType, Regex)>> = LazyLock::new(|| {
    [
        (TaskType::Story, r"\b(?:stor(?:y|ies)|tales?|narratives?|fables?)\b"),
        (
            TaskType::Worksheet,
            r"\b(?:worksheets?|exercises?|practice|questions?|quiz(?:zes)?|assignments?)\b",
        ),
        (
            TaskType::VisualAid,
            r"\b(?:diagrams?|visuals?|pictures?|draw(?:ing|ings)?|charts?|illustrations?|images?|posters?)\b",
        ),
        (TaskType::LessonPlan, r"\blesson(?:s|\s*plans?)?\b"),
        (TaskType::Qna, r"\b(?:explain|explanation|what\s+(?:is|are)|how\s+(?:does|do))\b"),
        (TaskType::Translation, r"\btranslat(?:e|ed|es|ion|ing)\b"),
    ]
    .into_iter()
    .map(|(t, pattern)| (t, Regex::new(pattern).expect("valid task indicator pattern")))
    .collect()
});

const GRADE_WORD: &str = r"\b(?:grades?|class(?:es)?|standards?|std)";

static GRADE_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{GRADE_WORD}\s*(\d+)\s*(?:-|–|to)\s*(\d+)\b"))
        .expect("valid grade range pattern")
});
static GRADE_LIST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{GRADE_WORD}\s*(\d+(?:\s*(?:,|and|&)\s*\d+)+)\b"))
        .expect("valid grade list pattern")
});
static GRADE_SINGLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"{GRADE_WORD}\s*(\d+)\b")).expect("valid grade pattern")
});
static GRADE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+)(?:st|nd|rd|th)[\s-]*(?:grade|class|standard)")
        .expect("valid ordinal grade pattern")
});
static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid number pattern"));

/// A language named as the destination: "into telugu", "to hindi", "in english".
static TARGET_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:into|to|in)\s+([\p{L}\p{M}]+)").expect("valid target language pattern")
});

/// Material to translate, quoted or after a colon.
static SOURCE_TEXT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"”]+)["”]|:\s*(.+)$"#).expect("valid source text pattern")
});

static TOPIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:about|on|of)\s+(.+?)(?:\s+(?:for|in|into|to|with)\b|[.?!,;]|$)")
        .expect("valid topic pattern")
});

/// Subject vocabulary: word prefix and canonical subject name, in match priority order.
const SUBJECTS: &[(&str, &str)] = &[
    ("math", "mathematics"),
    ("arithmetic", "mathematics"),
    ("multiplication", "mathematics"),
    ("addition", "mathematics"),
    ("subtraction", "mathematics"),
    ("division", "mathematics"),
    ("fraction", "mathematics"),
    ("geometry", "mathematics"),
    ("science", "science"),
    ("environment", "environmental studies"),
    ("evs", "environmental studies"),
    ("social", "social studies"),
    ("history", "history"),
    ("geography", "geography"),
    ("english", "english"),
    ("hindi", "hindi"),
    ("telugu", "telugu"),
];

/// Subjects that double as languages; "in hindi" names the medium, not the subject.
const LANGUAGE_SUBJECTS: &[&str] = &["english", "hindi", "telugu"];

/// Which parts of a request were found in the text rather than defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Signals {
    pub task_type: bool,
    pub topic: bool,
    pub subject: bool,
    pub grade_level: bool,
    pub language: bool,
}

/// Full classification result: the primary request plus every task type mentioned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestAnalysis {
    pub request: TaskRequest,
    /// Mentioned task types in routing-table order; never empty.
    pub task_types: Vec<TaskType>,
    pub confidence: f32,
    pub signals: Signals,
    /// The sanitized input the request was read from.
    pub original_input: String,
}

impl RequestAnalysis {
    pub fn is_multi_task(&self) -> bool {
        self.task_types.len() > 1
    }
}

/// Converts free text into a structured request. Must never fail.
pub trait Classifier: Send + Sync {
    fn analyze(&self, text: &str, default_language: Option<&str>) -> RequestAnalysis;

    fn classify(&self, text: &str, default_language: Option<&str>) -> TaskRequest {
        self.analyze(text, default_language).request
    }
}

/// Keyword-driven reference classifier.
#[derive(Debug, Clone, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    pub fn new() -> Self {
        Self
    }

    fn task_types(lower: &str) -> Vec<TaskType> {
        TASK_INDICATORS
            .iter()
            .filter(|(_, re)| re.is_match(lower))
            .map(|(t, _)| *t)
            .collect()
    }

    fn subject(lower: &str) -> Option<&'static str> {
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        SUBJECTS.iter().find_map(|(prefix, canonical)| {
            tokens
                .iter()
                .enumerate()
                .any(|(i, token)| {
                    token.starts_with(prefix)
                        && !(LANGUAGE_SUBJECTS.contains(prefix) && i > 0 && tokens[i - 1] == "in")
                })
                .then_some(*canonical)
        })
    }

    /// Grades as written, without range checks; out-of-range values are left
    /// for validation to reject.
    fn grade_level(lower: &str) -> Option<String> {
        if let Some(caps) = GRADE_RANGE.captures(lower) {
            let (a, b) = (strip_zeros(&caps[1]), strip_zeros(&caps[2]));
            let reversed = matches!(
                (a.parse::<u64>(), b.parse::<u64>()),
                (Ok(x), Ok(y)) if x > y
            );
            return Some(if reversed { format!("{b}-{a}") } else { format!("{a}-{b}") });
        }
        if let Some(caps) = GRADE_LIST.captures(lower) {
            let list: Vec<&str> = NUMBER
                .find_iter(&caps[1])
                .map(|m| strip_zeros(m.as_str()))
                .collect();
            return Some(list.join(","));
        }
        GRADE_SINGLE
            .captures(lower)
            .or_else(|| GRADE_ORDINAL.captures(lower))
            .map(|caps| strip_zeros(&caps[1]).to_string())
    }

    /// The requested language. A translation targets the language named after
    /// `into`, `to` or `in`; otherwise the first language named in the text wins.
    fn language(lower: &str, translating: bool) -> Option<&'static str> {
        if translating {
            let target = TARGET_LANGUAGE
                .captures_iter(lower)
                .find_map(|caps| hint_code(&caps[1]));
            if target.is_some() {
                return target;
            }
        }
        LANGUAGE_HINTS
            .iter()
            .filter_map(|(hint, code)| lower.find(hint).map(|pos| (pos, *code)))
            .min_by_key(|(pos, _)| *pos)
            .map(|(_, code)| code)
    }

    fn source_text(text: &str) -> Option<String> {
        SOURCE_TEXT
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().trim().to_string())
            .filter(|t| !t.is_empty())
    }

    fn topic(text: &str) -> Option<String> {
        TOPIC
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn strip_zeros(digits: &str) -> &str {
    match digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    }
}

fn hint_code(word: &str) -> Option<&'static str> {
    LANGUAGE_HINTS
        .iter()
        .find(|(hint, _)| *hint == word)
        .map(|(_, code)| *code)
}

impl Classifier for KeywordClassifier {
    fn analyze(&self, text: &str, default_language: Option<&str>) -> RequestAnalysis {
        let cleaned = sanitize_input(text);
        let lower = cleaned.to_lowercase();
        let default_language = default_language.unwrap_or("en");

        let mentioned = Self::task_types(&lower);
        let matched = !mentioned.is_empty();
        let primary = PRIMARY_PRIORITY
            .into_iter()
            .find(|t| mentioned.contains(t))
            .unwrap_or(TaskType::Story);
        let task_types = if mentioned.is_empty() { vec![primary] } else { mentioned };

        let topic = Self::topic(&cleaned);
        let subject = Self::subject(&lower);
        let grade_level = Self::grade_level(&lower);
        let translating = task_types.contains(&TaskType::Translation);
        let named_language = Self::language(&lower, translating);
        let language = named_language
            .unwrap_or_else(|| detect_language(&cleaned, default_language))
            .to_string();

        let signals = Signals {
            task_type: matched,
            topic: topic.is_some(),
            subject: subject.is_some(),
            grade_level: grade_level.is_some(),
            language: named_language.is_some() || language != default_language,
        };

        let confidence = match (signals.task_type, task_types.len()) {
            (false, _) => 0.3,
            (true, 1) => 0.9,
            (true, _) => 0.7,
        };

        let mut additional_params = Map::new();
        if translating {
            if let Some(source) = Self::source_text(&cleaned) {
                additional_params.insert("source_text".into(), source.into());
            }
        }

        let request = TaskRequest {
            task_type: primary.as_str().to_string(),
            topic: topic.unwrap_or_else(|| cleaned.clone()),
            grade_level: grade_level.unwrap_or_else(|| DEFAULT_GRADE_LEVEL.to_string()),
            subject: subject.unwrap_or(DEFAULT_SUBJECT).to_string(),
            language,
            context: None,
            additional_params,
        };

        RequestAnalysis {
            request,
            task_types,
            confidence,
            signals,
            original_input: cleaned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grade::parse_grade_range;

    fn analyze(text: &str) -> RequestAnalysis {
        KeywordClassifier::new().analyze(text, None)
    }

    #[test]
    fn test_story_in_hindi() {
        let request = KeywordClassifier::new()
            .classify("I need a story about honesty for grade 3 in Hindi", None);

        assert_eq!(request.task_type, "story");
        assert_eq!(parse_grade_range(&request.grade_level).unwrap().as_slice(), &[3]);
        assert_eq!(request.language, "hi");
        assert_eq!(request.topic, "honesty");
        assert_eq!(request.subject, "general");
    }

    #[test]
    fn test_math_exercises_grade_span() {
        let request = KeywordClassifier::new()
            .classify("Create math exercises for grades 2 to 4 on multiplication", None);

        assert_eq!(request.task_type, "worksheet");
        assert!(request.subject.contains("math"));
        assert_eq!(parse_grade_range(&request.grade_level).unwrap().as_slice(), &[2, 3, 4]);
        assert_eq!(request.topic, "multiplication");
        assert_eq!(request.language, "en");
    }

    #[test]
    fn test_total_function_on_odd_input() {
        let classifier = KeywordClassifier::new();
        for input in ["", "   ", "asdkj qwe 123 !!", "<<<>>>", "grade 99", "\u{0}\u{1}", "ग्रेड"] {
            let request = classifier.classify(input, None);
            assert!(request.kind().is_ok(), "input {input:?}");
            assert!(!request.grade_level.is_empty());
            assert!(!request.subject.is_empty());
            assert!(!request.language.is_empty());
        }
    }

    #[test]
    fn test_defaults_when_nothing_matches() {
        let analysis = analyze("something for my class");
        assert_eq!(analysis.request.task_type, "story");
        assert_eq!(analysis.request.grade_level, DEFAULT_GRADE_LEVEL);
        assert_eq!(analysis.request.subject, DEFAULT_SUBJECT);
        assert_eq!(analysis.task_types, vec![TaskType::Story]);
        assert!(!analysis.signals.task_type);
        assert!(!analysis.signals.grade_level);
        assert_eq!(analysis.confidence, 0.3);
    }

    #[test]
    fn test_specific_category_wins_over_story() {
        let analysis = analyze("A story with practice questions about the monsoon for grade 4");
        assert_eq!(analysis.request.task_type, "worksheet");
        assert_eq!(analysis.task_types, vec![TaskType::Story, TaskType::Worksheet]);
        assert!(analysis.is_multi_task());
    }

    #[test]
    fn test_multi_task_order_follows_routing_table() {
        let analysis = analyze("Draw a diagram, write a story and a worksheet on plants");
        assert_eq!(
            analysis.task_types,
            vec![TaskType::Story, TaskType::Worksheet, TaskType::VisualAid]
        );
        assert_eq!(analysis.request.task_type, "worksheet");
    }

    #[test]
    fn test_visual_aid_and_translation() {
        assert_eq!(analyze("a chart of the water cycle").request.task_type, "visual_aid");
        let analysis = analyze("Translate this lesson into Telugu");
        assert_eq!(analysis.request.task_type, "lesson_plan");
        assert!(analysis.task_types.contains(&TaskType::Translation));
        assert_eq!(analysis.request.language, "te");
    }

    #[test]
    fn test_word_boundaries() {
        // "details" must not count as "tale", "storm" not as "story".
        let analysis = analyze("give me details about the storm");
        assert!(!analysis.signals.task_type);
    }

    #[test]
    fn test_grade_forms() {
        assert_eq!(analyze("worksheet for grade 5").request.grade_level, "5");
        assert_eq!(analyze("worksheet for class 7-5").request.grade_level, "5-7");
        assert_eq!(analyze("worksheet for grades 1, 3 and 5").request.grade_level, "1,3,5");
        assert_eq!(analyze("worksheet for 4th grade").request.grade_level, "4");
        assert_eq!(analyze("worksheet for std 6").request.grade_level, "6");
        assert_eq!(analyze("an upgrade 2 plan").request.grade_level, DEFAULT_GRADE_LEVEL);
    }

    #[test]
    fn test_language_from_script_and_default() {
        let analysis = KeywordClassifier::new().analyze("ईमानदारी पर कहानी", Some("en"));
        assert_eq!(analysis.request.language, "hi");
        assert!(analysis.signals.language);

        let analysis = KeywordClassifier::new().analyze("a story about rain", Some("te"));
        assert_eq!(analysis.request.language, "te");
        assert!(!analysis.signals.language);
    }

    #[test]
    fn test_subject_medium_is_not_subject() {
        assert_eq!(analyze("a hindi worksheet on verbs").request.subject, "hindi");
        assert_eq!(analyze("a science story in hindi").request.subject, "science");
        assert_eq!(analyze("a story in hindi").request.subject, DEFAULT_SUBJECT);
    }

    #[test]
    fn test_input_kept_out_of_context() {
        let analysis = analyze("story about kindness");
        assert_eq!(analysis.request.context, None);
        assert!(analysis.request.additional_params.is_empty());
        assert_eq!(analysis.original_input, "story about kindness");
    }

    #[test]
    fn test_translation_targets_named_destination() {
        let request = analyze("Translate this Hindi story about honesty into English for grade 3").request;
        assert_eq!(request.language, "en");
        assert_eq!(request.topic, "honesty");

        let request = analyze("Translate the Telugu lesson on plants to Hindi for class 4").request;
        assert_eq!(request.language, "hi");

        let request = analyze("Translate the English story about the moon in Telugu").request;
        assert_eq!(request.language, "te");
    }

    #[test]
    fn test_language_without_translation_is_first_mentioned() {
        assert_eq!(analyze("an english story with a few hindi words").request.language, "en");
        assert_eq!(analyze("a telugu poem and an english glossary").request.language, "te");
    }

    #[test]
    fn test_translation_source_text() {
        let request = analyze(r#"Translate "The rain came to the village" into Hindi"#).request;
        assert_eq!(request.param_str("source_text"), Some("The rain came to the village"));
        assert_eq!(request.language, "hi");

        let request = analyze("Translate into Telugu: Plants need water and sunlight.").request;
        assert_eq!(request.param_str("source_text"), Some("Plants need water and sunlight."));

        let request = analyze("a story about rain: with a twist").request;
        assert!(request.param_str("source_text").is_none());
    }

    #[test]
    fn test_out_of_range_grades_are_kept() {
        assert_eq!(analyze("worksheet for grade 123").request.grade_level, "123");
        assert_eq!(analyze("worksheet for class 10 to 150").request.grade_level, "10-150");
        assert_eq!(analyze("worksheet for grades 2, 30 and 5").request.grade_level, "2,30,5");
        assert_eq!(analyze("worksheet for grade 007").request.grade_level, "7");
        assert!(analyze("worksheet for grade 123").signals.grade_level);
    }
}
