//! Response Merger
//!
//! Combines the content produced by several agents into one lesson package.
//! Output depends only on the input: sections come in a fixed order, unknown
//! agents are kept under "Additional Materials" sorted by name, and the
//! teacher guide at the end is derived from which sections are present.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::agents::materials_needed;
use crate::error::{Result, SahayakError};
use crate::grade::parse_grade_range;

const STORY: &str = "story_agent";
const WORKSHEET: &str = "worksheet_agent";
const VISUAL_AID: &str = "visual_aid_agent";
const CONTENT: &str = "content_agent";
const TRANSLATION: &str = "translation_agent";

/// Known sections, in document order.
const SECTIONS: [(&str, &str); 5] = [
    (STORY, "## 📖 Story Component"),
    (WORKSHEET, "## 📋 Worksheet Component"),
    (VISUAL_AID, "## 🎨 Visual Aid Component"),
    (CONTENT, "## 📝 Lesson Plan Component"),
    (TRANSLATION, "## 🌐 Translation Component"),
];

/// Lesson flow steps: agent, minutes, activity. Listed in teaching order.
const FLOW: [(&str, u32, &str); 5] = [
    (STORY, 10, "Read the story aloud and ask the discussion questions"),
    (VISUAL_AID, 5, "Draw the visual aid on the blackboard and walk through it"),
    (CONTENT, 10, "Run the lesson plan activities"),
    (WORKSHEET, 10, "Students work on the worksheet section for their level"),
    (TRANSLATION, 5, "Revisit key ideas using the translated material"),
];

const WRAP_UP_MINUTES: u32 = 5;

/// Everything the merger needs: the package title and each agent's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeInput {
    pub topic: String,
    pub grade_level: String,
    pub contents: BTreeMap<String, String>,
}

impl MergeInput {
    pub fn new(topic: impl Into<String>, grade_level: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            grade_level: grade_level.into(),
            contents: BTreeMap::new(),
        }
    }

    pub fn with_content(mut self, agent: impl Into<String>, content: impl Into<String>) -> Self {
        self.contents.insert(agent.into(), content.into());
        self
    }

    /// Reads the `{agent_name: content}` mapping from untyped JSON.
    pub fn contents_from_json(value: &Value) -> Result<BTreeMap<String, String>> {
        let object = value
            .as_object()
            .ok_or_else(|| SahayakError::Merge("expected a mapping of agent name to content".into()))?;
        object
            .iter()
            .map(|(agent, content)| match content {
                Value::String(text) => Ok((agent.clone(), text.clone())),
                _ => Err(SahayakError::Merge(format!("content for '{agent}' is not text"))),
            })
            .collect()
    }

    /// Renders the lesson package.
    pub fn merge(&self) -> Result<String> {
        let present: BTreeMap<&str, &str> = self
            .contents
            .iter()
            .map(|(k, v)| (k.as_str(), v.trim()))
            .filter(|(_, v)| !v.is_empty())
            .collect();
        if present.is_empty() {
            return Err(SahayakError::Merge("no agent content to merge".into()));
        }

        let mut doc = format!("# {} - Grade {} Lesson Package\n", self.title(), self.grade_level.trim());

        for (agent, header) in SECTIONS {
            if let Some(content) = present.get(agent) {
                doc.push_str(&format!("\n{header}\n\n{content}\n"));
            }
        }

        let extras: Vec<_> = present
            .iter()
            .filter(|(agent, _)| !SECTIONS.iter().any(|(known, _)| known == *agent))
            .collect();
        if !extras.is_empty() {
            doc.push_str("\n## 📎 Additional Materials\n");
            for (agent, content) in extras {
                doc.push_str(&format!("\n### {}\n\n{content}\n", display_name(agent)));
            }
        }

        doc.push_str(&self.teacher_guide(&present));
        Ok(doc)
    }

    fn title(&self) -> &str {
        match self.topic.trim() {
            "" => "Lesson",
            t => t,
        }
    }

    fn teacher_guide(&self, present: &BTreeMap<&str, &str>) -> String {
        let mut guide = String::from("\n## 👩‍🏫 Teacher Implementation Guide\n");

        let steps: Vec<_> = FLOW
            .iter()
            .filter(|(agent, _, _)| present.contains_key(agent))
            .collect();
        let total: u32 = steps.iter().map(|(_, m, _)| m).sum::<u32>() + WRAP_UP_MINUTES;
        guide.push_str(&format!("\n### Suggested Lesson Flow ({total} minutes)\n\n"));
        for (i, (_, minutes, activity)) in steps.iter().enumerate() {
            guide.push_str(&format!("{}. {activity} ({minutes} min)\n", i + 1));
        }
        guide.push_str(&format!(
            "{}. Wrap up with a quick recap of {} ({WRAP_UP_MINUTES} min)\n",
            steps.len() + 1,
            self.title()
        ));

        guide.push_str("\n### Multi-Grade Adaptation\n\n");
        match parse_grade_range(&self.grade_level) {
            Ok(grades) => {
                let levels = grades.difficulty_levels();
                for (label, band, tip) in [
                    ("basic", &levels.basic, "use pictures, objects and oral answers"),
                    ("intermediate", &levels.intermediate, "pair students and ask them to explain their reasoning"),
                    ("advanced", &levels.advanced, "let them lead group work and attempt the challenge questions"),
                ] {
                    if !band.is_empty() {
                        let list: Vec<String> = band.iter().map(u8::to_string).collect();
                        guide.push_str(&format!("- Grades {} ({label}): {tip}\n", list.join(", ")));
                    }
                }
                if levels.basic.len() + levels.intermediate.len() + levels.advanced.len() > 1 {
                    guide.push_str("- Let older students help younger ones while you work with each group\n");
                }
            }
            Err(_) => guide.push_str(
                "- Group students by level and give each group the part of the material that fits them\n",
            ),
        }

        let combined: String = present.values().copied().collect::<Vec<_>>().join("\n");
        guide.push_str(&format!(
            "\n### Resources Needed\n\n- {}\n",
            materials_needed(&combined).join(", ")
        ));

        let assessment = if present.contains_key(WORKSHEET) {
            "Check worksheet answers level by level and note who needs another round of practice."
        } else if present.contains_key(STORY) {
            "Ask each student to retell one part of the story and explain its lesson."
        } else {
            "Ask students to explain the main idea in their own words, then draw or write one example."
        };
        guide.push_str(&format!("\n### Assessment Suggestion\n\n{assessment}\n"));
        guide
    }
}

/// "visual_aid_agent" becomes "Visual Aid Agent"; unknown names get the same treatment.
fn display_name(agent: &str) -> String {
    agent
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}
