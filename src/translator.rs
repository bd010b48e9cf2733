use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};

use crate::chunk::split_for_translation;

/// External translation capability. Implementations see one chunk at a
/// time; chunk length is bounded by the chunker budget.
pub trait Translate {
    fn translate(&mut self, text: &str) -> anyhow::Result<String>;
}

/// Translates `text` chunk by chunk and reassembles the outputs in order.
/// Whitespace-only text is returned unchanged without calling the adapter.
pub fn translate_text(
    translator: &mut dyn Translate,
    text: &str,
    max_chunk_chars: usize,
) -> anyhow::Result<String> {
    if text.trim().is_empty() {
        return Ok(text.to_string());
    }
    let mut out = String::new();
    for chunk in split_for_translation(text, max_chunk_chars) {
        out.push_str(&translator.translate(&chunk)?);
    }
    Ok(out)
}

#[derive(Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
}

#[derive(Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Adapter for a LibreTranslate-compatible `POST /translate` endpoint.
pub struct HttpTranslator {
    client: reqwest::blocking::Client,
    endpoint: String,
    source_lang: String,
    target_lang: String,
}

impl HttpTranslator {
    pub fn new(
        endpoint: &str,
        source_lang: &str,
        target_lang: &str,
        timeout_secs: u64,
    ) -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        })
    }
}

impl Translate for HttpTranslator {
    fn translate(&mut self, text: &str) -> anyhow::Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&TranslateRequest {
                q: text,
                source: &self.source_lang,
                target: &self.target_lang,
            })
            .send()
            .and_then(|r| r.error_for_status())
            .with_context(|| format!("translate request: {}", self.endpoint))?;
        let body: TranslateResponse = response.json().context("parse translate response")?;
        Ok(body.translated_text)
    }
}

/// Deterministic adapter backed by a source -> target table. A lookup miss
/// is a translation failure, so a run against an incomplete table aborts
/// instead of passing source text through silently.
pub struct GlossaryTranslator {
    entries: HashMap<String, String>,
}

impl GlossaryTranslator {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// Loads a `source<TAB>target` table. Blank lines and `#` comments are
    /// skipped.
    pub fn from_tsv_path(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("read glossary: {}", path.display()))?;
        let mut entries = HashMap::new();
        for (lineno, line) in text.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let (src, tgt) = line.split_once('\t').ok_or_else(|| {
                anyhow!(
                    "glossary line {} has no tab separator: {}",
                    lineno + 1,
                    path.display()
                )
            })?;
            if src.is_empty() {
                continue;
            }
            entries.insert(src.to_string(), tgt.to_string());
        }
        Ok(Self { entries })
    }
}

impl Translate for GlossaryTranslator {
    fn translate(&mut self, text: &str) -> anyhow::Result<String> {
        self.entries.get(text).cloned().ok_or_else(|| {
            let preview: String = text.chars().take(40).collect();
            anyhow!("glossary has no entry for chunk: {preview:?}")
        })
    }
}
