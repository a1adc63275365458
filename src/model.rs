use std::fmt;

use serde::{Deserialize, Serialize};

/// Score fraction at or above which a graded attempt counts as passed.
pub const PASS_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Mcq,
    Open,
    Vf,
    Multi,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Mcq => "Multiple choice",
            ItemKind::Open => "Open answer",
            ItemKind::Vf => "True/False",
            ItemKind::Multi => "Multiple answer",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Mcq => "mcq",
            ItemKind::Open => "open",
            ItemKind::Vf => "vf",
            ItemKind::Multi => "multi",
        }
    }

    /// Whether answers to this kind are chosen from a list of options.
    pub fn has_choices(self) -> bool {
        !matches!(self, ItemKind::Open)
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseItem {
    pub id: String,
    pub kind: ItemKind,
    pub question: String,
    #[serde(rename = "options_json", default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Server-side answer key. Never read by the session.
    #[serde(rename = "answer_json", default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<serde_json::Value>,
}

impl ExerciseItem {
    /// Choices shown for this item. True/false items fall back to the two
    /// fixed labels when the server sends no options.
    pub fn choices(&self) -> Vec<&str> {
        match (self.kind, &self.options) {
            (ItemKind::Open, _) => Vec::new(),
            (ItemKind::Vf, None) => vec!["Verdadeiro", "Falso"],
            (_, Some(options)) => options.iter().map(String::as_str).collect(),
            (_, None) => Vec::new(),
        }
    }

    pub fn choice_count(&self) -> usize {
        self.choices().len()
    }
}

/// What the user answered for one item. The variant is fixed by the item kind:
/// `Index` for mcq/vf, `Text` for open, `Indices` for multi.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AnswerPayload {
    #[serde(rename = "answer_index")]
    Index(u32),
    #[serde(rename = "answer_text")]
    Text(String),
    #[serde(rename = "answer_indices")]
    Indices(Vec<u32>),
}

impl AnswerPayload {
    pub fn fits(&self, kind: ItemKind) -> bool {
        matches!(
            (self, kind),
            (AnswerPayload::Index(_), ItemKind::Mcq | ItemKind::Vf)
                | (AnswerPayload::Text(_), ItemKind::Open)
                | (AnswerPayload::Indices(_), ItemKind::Multi)
        )
    }

    /// False for a multi answer with nothing selected or a blank open answer.
    pub fn has_content(&self) -> bool {
        match self {
            AnswerPayload::Index(_) => true,
            AnswerPayload::Text(text) => !text.trim().is_empty(),
            AnswerPayload::Indices(indices) => !indices.is_empty(),
        }
    }
}

/// Display label for the choice at `index`: `a` to `z`, then `27`, `28`, ...
pub fn choice_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(i) if i < 26 => char::from(b'a' + i).to_string(),
        _ => (index + 1).to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Answer {
    pub item_id: String,
    pub kind: ItemKind,
    #[serde(flatten)]
    pub payload: AnswerPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSummary {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub discipline_id: Option<String>,
    #[serde(default)]
    pub note_id: Option<String>,
    #[serde(default)]
    pub meta_json: Option<serde_json::Value>,
}

impl ExerciseSummary {
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled exercise")
    }

    fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta_json.as_ref()?.get(key)?.as_str()
    }

    pub fn difficulty(&self) -> Option<&str> {
        self.meta_str("difficulty")
    }

    pub fn subject(&self) -> Option<&str> {
        self.meta_str("subject")
    }

    pub fn kind(&self) -> Option<&str> {
        self.meta_str("kind")
    }

    pub fn tags(&self) -> Vec<&str> {
        self.meta_json
            .as_ref()
            .and_then(|m| m.get("tags"))
            .and_then(|t| t.as_array())
            .map(|tags| tags.iter().filter_map(|t| t.as_str()).collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDetail {
    #[serde(flatten)]
    pub summary: ExerciseSummary,
    #[serde(default)]
    pub items: Vec<ExerciseItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExerciseGradeIn {
    pub answers_json: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub raw: f64,
    pub max: f64,
    /// Fraction in `[0, 1]`.
    pub percent: f64,
}

impl Score {
    pub fn passed(&self) -> bool {
        self.percent >= PASS_THRESHOLD
    }

    pub fn percent_rounded(&self) -> u32 {
        (self.percent.clamp(0.0, 1.0) * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub item_id: String,
    #[serde(default)]
    pub correct: Option<bool>,
    #[serde(default)]
    pub explanation: Option<String>,
    #[serde(default)]
    pub similarity: Option<f64>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseGradeOut {
    pub exercise_id: String,
    pub score: Score,
    #[serde(default)]
    pub items_results: Vec<ItemResult>,
}

/// Query filters for listing exercises. Unset fields are left out of the query string.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ExerciseFilters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
}
