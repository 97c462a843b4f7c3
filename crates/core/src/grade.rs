//! Grade range parsing and multi-grade classification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::ValidationError;

pub const MIN_GRADE: u8 = 1;
pub const MAX_GRADE: u8 = 12;

/// A non-empty, sorted, deduplicated set of school grades in `1..=12`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GradeSet(Vec<u8>);

/// Coarse age band of a class, used to pick tone and length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeGroup {
    Primary,
    MiddlePrimary,
    UpperPrimary,
    MultiGrade,
}

impl AgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeGroup::Primary => "primary",
            AgeGroup::MiddlePrimary => "middle_primary",
            AgeGroup::UpperPrimary => "upper_primary",
            AgeGroup::MultiGrade => "multi_grade",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grades partitioned into worksheet difficulty bands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DifficultyLevels {
    pub basic: Vec<u8>,
    pub intermediate: Vec<u8>,
    pub advanced: Vec<u8>,
}

/// Number of questions to ask per difficulty band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionCounts {
    pub basic: usize,
    pub intermediate: usize,
    pub advanced: usize,
}

const QUESTIONS_PER_GRADE: usize = 2;
const MIN_QUESTIONS_PER_LEVEL: usize = 2;

impl DifficultyLevels {
    pub fn question_counts(&self) -> QuestionCounts {
        let count = |grades: &[u8]| {
            if grades.is_empty() {
                0
            } else {
                (grades.len() * QUESTIONS_PER_GRADE).max(MIN_QUESTIONS_PER_LEVEL)
            }
        };
        QuestionCounts {
            basic: count(&self.basic),
            intermediate: count(&self.intermediate),
            advanced: count(&self.advanced),
        }
    }
}

impl GradeSet {
    /// Builds a set from arbitrary grades, rejecting empty input and out-of-range values.
    pub fn new(grades: impl IntoIterator<Item = u8>) -> Result<Self, ValidationError> {
        let set: BTreeSet<u8> = grades.into_iter().collect();
        if set.is_empty() {
            return Err(ValidationError::InvalidGradeFormat(String::new()));
        }
        if let Some(bad) = set.iter().find(|g| !(MIN_GRADE..=MAX_GRADE).contains(*g)) {
            return Err(ValidationError::InvalidGradeFormat(bad.to_string()));
        }
        Ok(Self(set.into_iter().collect()))
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn min(&self) -> u8 {
        self.0[0]
    }

    pub fn max(&self) -> u8 {
        self.0[self.0.len() - 1]
    }

    /// The span-based tie-break matters: `[2, 8]` is multi-grade, not middle primary.
    pub fn age_group(&self) -> AgeGroup {
        let (min, max) = (self.min(), self.max());
        if max <= 3 {
            AgeGroup::Primary
        } else if min >= 7 {
            AgeGroup::UpperPrimary
        } else if min <= 3 && max >= 7 {
            AgeGroup::MultiGrade
        } else {
            AgeGroup::MiddlePrimary
        }
    }

    pub fn difficulty_levels(&self) -> DifficultyLevels {
        let mut levels = DifficultyLevels::default();
        for &g in &self.0 {
            match g {
                ..=3 => levels.basic.push(g),
                4..=6 => levels.intermediate.push(g),
                _ => levels.advanced.push(g),
            }
        }
        levels
    }

    /// Compact textual form: `"3"`, `"5-7"` for contiguous runs, `"1,3,5"` otherwise.
    pub fn to_range_string(&self) -> String {
        let contiguous = self.0.windows(2).all(|w| w[1] == w[0] + 1);
        match self.0.len() {
            1 => self.min().to_string(),
            _ if contiguous => format!("{}-{}", self.min(), self.max()),
            _ => self
                .0
                .iter()
                .map(u8::to_string)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

fn parse_grade(component: &str, original: &str) -> Result<u8, ValidationError> {
    let invalid = || ValidationError::InvalidGradeFormat(original.to_string());
    let trimmed = component.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    let grade: u8 = trimmed.parse().map_err(|_| invalid())?;
    if !(MIN_GRADE..=MAX_GRADE).contains(&grade) {
        return Err(invalid());
    }
    Ok(grade)
}

/// Parses `"3"`, `"5-7"` (inclusive) or `"1,3,5"` into a [`GradeSet`].
///
/// Every component must be numeric and within `1..=12`; a reversed range such as
/// `"7-5"` is rejected rather than treated as empty.
pub fn parse_grade_range(input: &str) -> Result<GradeSet, ValidationError> {
    let invalid = || ValidationError::InvalidGradeFormat(input.to_string());
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(invalid());
    }

    let grades: Vec<u8> = if let Some((start, end)) = trimmed.split_once('-') {
        let start = parse_grade(start, input)?;
        let end = parse_grade(end, input)?;
        if start > end {
            return Err(invalid());
        }
        (start..=end).collect()
    } else if trimmed.contains(',') {
        trimmed
            .split(',')
            .map(|g| parse_grade(g, input))
            .collect::<Result<_, _>>()?
    } else {
        vec![parse_grade(trimmed, input)?]
    };

    GradeSet::new(grades).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grades(input: &str) -> Vec<u8> {
        parse_grade_range(input).unwrap().as_slice().to_vec()
    }

    #[test]
    fn test_parse_single_range_and_list() {
        assert_eq!(grades("3"), vec![3]);
        assert_eq!(grades("5-7"), vec![5, 6, 7]);
        assert_eq!(grades("1,3,5"), vec![1, 3, 5]);
        assert_eq!(grades(" 2 - 4 "), vec![2, 3, 4]);
    }

    #[test]
    fn test_parse_sorts_and_deduplicates() {
        assert_eq!(grades("5,1,3,3,1"), vec![1, 3, 5]);
        assert_eq!(grades("4-4"), vec![4]);
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        for input in ["abc", "0-15", "", "  ", "0", "13", "3-", "-3", "1,,2", "1,x", "7-5", "2.5", "1-2-3", "+3"] {
            assert_eq!(
                parse_grade_range(input),
                Err(ValidationError::InvalidGradeFormat(input.to_string())),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_age_group() {
        assert_eq!(parse_grade_range("1-3").unwrap().age_group(), AgeGroup::Primary);
        assert_eq!(parse_grade_range("7,8").unwrap().age_group(), AgeGroup::UpperPrimary);
        assert_eq!(parse_grade_range("2,8").unwrap().age_group(), AgeGroup::MultiGrade);
        assert_eq!(parse_grade_range("4,5").unwrap().age_group(), AgeGroup::MiddlePrimary);
        assert_eq!(parse_grade_range("3-6").unwrap().age_group(), AgeGroup::MiddlePrimary);
        assert_eq!(parse_grade_range("4-9").unwrap().age_group(), AgeGroup::MiddlePrimary);
    }

    #[test]
    fn test_difficulty_levels_and_question_counts() {
        let levels = parse_grade_range("2-8").unwrap().difficulty_levels();
        assert_eq!(levels.basic, vec![2, 3]);
        assert_eq!(levels.intermediate, vec![4, 5, 6]);
        assert_eq!(levels.advanced, vec![7, 8]);

        let counts = levels.question_counts();
        assert_eq!(counts, QuestionCounts { basic: 4, intermediate: 6, advanced: 4 });

        let single = parse_grade_range("5").unwrap().difficulty_levels().question_counts();
        assert_eq!(single, QuestionCounts { basic: 0, intermediate: 2, advanced: 0 });
    }

    #[test]
    fn test_range_string() {
        assert_eq!(parse_grade_range("3").unwrap().to_range_string(), "3");
        assert_eq!(parse_grade_range("5,6,7").unwrap().to_range_string(), "5-7");
        assert_eq!(parse_grade_range("1,3,5").unwrap().to_range_string(), "1,3,5");
    }

    #[test]
    fn test_grade_set_serializes_as_list() {
        let set = parse_grade_range("2-4").unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "[2,3,4]");
    }
}
