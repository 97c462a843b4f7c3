//! Prompt Library
//!
//! Named prompt templates used by the sub-agents. Built-in defaults can be
//! overridden by a directory of `*.md` files, one per template, keyed by file stem.
//! Templates use `{name}` placeholders.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const STORY_SYSTEM: &str = "story_system";
pub const STORY_GENERATION: &str = "story_generation";
pub const WORKSHEET_SYSTEM: &str = "worksheet_system";
pub const WORKSHEET_GENERATION: &str = "worksheet_generation";
pub const VISUAL_AID_SYSTEM: &str = "visual_aid_system";
pub const VISUAL_AID_GENERATION: &str = "visual_aid_generation";
pub const CONTENT_SYSTEM: &str = "content_system";
pub const LESSON_PLAN_GENERATION: &str = "lesson_plan_generation";
pub const QNA_GENERATION: &str = "qna_generation";
pub const TRANSLATION_SYSTEM: &str = "translation_system";
pub const TRANSLATION_GENERATION: &str = "translation_generation";

const BUILTIN: &[(&str, &str)] = &[
    (
        STORY_SYSTEM,
        "You are the Sahayak Story Agent. You write engaging, age-appropriate educational \
stories for rural multi-grade classrooms in India. Use simple language, familiar village \
settings, local festivals and traditions, and end with a clear moral or takeaway.",
    ),
    (
        STORY_GENERATION,
        "Create an educational story with the following parameters:

Topic: {topic}
Grade Level: {grade_level}
Language: {language}
Subject: {subject}
Additional Context: {context}

Additional Requirements:
- Story length: {word_count}
- Use simple, age-appropriate language for a {age_group} class
- Include interactive elements or questions within the story
- Write primarily in {language} and open with a greeting in the style of \"{greeting}\"

Please provide the story, 2-3 discussion questions and a brief moral.",
    ),
    (
        WORKSHEET_SYSTEM,
        "You are the Sahayak Worksheet Agent. You create differentiated exercises for \
multi-grade classrooms that can be completed without computers, using local examples, \
and always include an answer key for the teacher.",
    ),
    (
        WORKSHEET_GENERATION,
        "Create a differentiated worksheet with the following parameters:

Topic: {topic}
Grade Levels: {grade_level}
Subject: {subject}
Language: {language}
Skills to Practice: {skills}

Create three sections:
1. BASIC LEVEL (Grades {basic_grades}): {basic_count} simple questions
2. INTERMEDIATE LEVEL (Grades {intermediate_grades}): {intermediate_count} moderate questions
3. ADVANCED LEVEL (Grades {advanced_grades}): {advanced_count} challenging questions

Skip any section with zero questions. Label levels with \"{level_label}\", instruction \
headers with \"{instructions_label}\" and question sections with \"{questions_label}\". \
Provide a separate answer key at the end.",
    ),
    (
        VISUAL_AID_SYSTEM,
        "You are the Sahayak Visual Aid Agent. You describe simple diagrams a teacher \
with basic drawing skills can reproduce on a blackboard with chalk, using familiar \
objects from rural life.",
    ),
    (
        VISUAL_AID_GENERATION,
        "Create a visual aid description for the following parameters:

Topic: {topic}
Grade Level: {grade_level}
Subject: {subject}
Learning Objective: {objective}
Language: {language}

Provide:
1. A description of the visual aid
2. Step-by-step drawing instructions
3. How to use it in the lesson
4. 2-3 questions students can answer using the visual
5. Materials needed (basic classroom supplies only)

It must be appropriate for grade {max_grade} and drawable in {drawing_time}.",
    ),
    (
        CONTENT_SYSTEM,
        "You are the Sahayak Content Agent. You write practical lesson plans and clear \
explanations for teachers in low-resource, multi-grade classrooms.",
    ),
    (
        LESSON_PLAN_GENERATION,
        "Create a lesson plan with the following parameters:

Topic: {topic}
Grade Level: {grade_level} ({age_group})
Subject: {subject}
Language: {language}
Additional Context: {context}

Include learning objectives, a timed lesson flow, activities for each grade band, \
required materials and an assessment idea.",
    ),
    (
        QNA_GENERATION,
        "Answer the following question for a teacher of grade {grade_level} {subject} \
students, in {language}. Give a short explanation a child can follow and one example \
from everyday village life.

Question: {topic}
Additional Context: {context}",
    ),
    (
        TRANSLATION_SYSTEM,
        "You are the Sahayak Translation Agent. You translate classroom material into \
regional Indian languages, keeping meaning, tone and reading level intact.",
    ),
    (
        TRANSLATION_GENERATION,
        "Translate the following material into {language_name} ({language}). Keep the \
formatting, keep it suitable for grade {grade_level} students and use natural, \
everyday vocabulary.

Material:
{source_text}",
    ),
];

/// A set of named prompt templates.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    templates: HashMap<String, String>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::builtin()
    }
}

impl PromptLibrary {
    pub fn builtin() -> Self {
        Self {
            templates: BUILTIN
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    /// Built-in templates overridden by every `*.md` file found in `dir`.
    pub fn with_overrides_from(dir: &Path) -> Result<Self> {
        let mut library = Self::builtin();
        for entry in fs::read_dir(dir)
            .with_context(|| format!("Failed to read prompts directory {}", dir.display()))?
        {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
                let key = path
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .context("Could not get file stem")?
                    .to_string();
                let content = fs::read_to_string(&path)?;
                library.templates.insert(key, content);
            }
        }
        Ok(library)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.templates.get(key).map(String::as_str)
    }

    /// Renders `key`, substituting each `{name}` placeholder from `vars`.
    pub fn render(&self, key: &str, vars: &[(&str, &str)]) -> Result<String> {
        let template = self
            .get(key)
            .with_context(|| format!("Missing prompt template: '{key}'"))?;
        Ok(vars.iter().fold(template.to_string(), |acc, (name, value)| {
            acc.replace(&format!("{{{name}}}"), value)
        }))
    }
}
