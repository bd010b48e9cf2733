use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// `answer_start` value for an answer the locator could not place.
pub const UNRESOLVED_START: i64 = -1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub data: Vec<Article>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub paragraphs: Vec<Paragraph>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Paragraph {
    pub context: String,
    pub qas: Vec<Qa>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Qa {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub question: String,
    #[serde(default)]
    pub answers: Vec<Answer>,
}

/// `answer_start` counts characters into the containing paragraph's
/// context, or is [`UNRESOLVED_START`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Answer {
    pub text: String,
    pub answer_start: i64,
}

pub fn load_dataset(path: &Path) -> anyhow::Result<Dataset> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read dataset: {}", path.display()))?;
    let dataset: Dataset = serde_json::from_str(&text)
        .with_context(|| format!("parse dataset: {}", path.display()))?;
    Ok(dataset)
}

pub fn save_dataset(path: &Path, dataset: &Dataset) -> anyhow::Result<()> {
    let mut text = serde_json::to_string_pretty(dataset).context("serialize dataset")?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("write dataset: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn one_answer_dataset() -> Dataset {
        Dataset {
            version: Some("1.1".to_string()),
            data: vec![Article {
                title: Some("Paris".to_string()),
                paragraphs: vec![Paragraph {
                    context: "Paris is the capital of France.".to_string(),
                    qas: vec![Qa {
                        id: Some("q1".to_string()),
                        question: "What is the capital of France?".to_string(),
                        answers: vec![Answer {
                            text: "Paris".to_string(),
                            answer_start: 0,
                        }],
                    }],
                }],
            }],
        }
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data.json");
        save_dataset(&path, &one_answer_dataset()).expect("save");

        let loaded = load_dataset(&path).expect("load");
        assert_eq!(loaded.version.as_deref(), Some("1.1"));
        assert_eq!(loaded.data.len(), 1);
        let para = &loaded.data[0].paragraphs[0];
        assert_eq!(para.context, "Paris is the capital of France.");
        assert_eq!(para.qas[0].answers[0].answer_start, 0);
    }

    #[test]
    fn absent_optional_fields_stay_absent() {
        let input = r#"{"data":[{"paragraphs":[{"context":"x","qas":[{"question":"q","answers":[]}]}]}]}"#;
        let dataset: Dataset = serde_json::from_str(input).expect("parse");
        assert!(dataset.version.is_none());
        assert!(dataset.data[0].title.is_none());

        let out = serde_json::to_string(&dataset).expect("serialize");
        assert!(!out.contains("version"));
        assert!(!out.contains("title"));
        assert!(!out.contains("\"id\""));
    }

    #[test]
    fn missing_answers_defaults_to_empty() {
        let input = r#"{"data":[{"paragraphs":[{"context":"x","qas":[{"question":"q"}]}]}]}"#;
        let dataset: Dataset = serde_json::from_str(input).expect("parse");
        assert!(dataset.data[0].paragraphs[0].qas[0].answers.is_empty());
    }
}
