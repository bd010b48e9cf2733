use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context};
use serde::Deserialize;

use crate::chunk::DEFAULT_MAX_CHUNK_CHARS;

pub const CONFIG_FILE_NAME: &str = "qa-translator.toml";
pub const CONFIG_ENV_VAR: &str = "QA_TRANSLATOR_CONFIG";

const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/translate";
const DEFAULT_SOURCE_LANG: &str = "en";
const DEFAULT_TARGET_LANG: &str = "sq";
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_WARN_PREVIEW_CHARS: usize = 30;

#[derive(Clone, Debug, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub pipeline: PipelineSection,
    #[serde(default)]
    pub translator: TranslatorSection,
    #[serde(default)]
    pub dataset: DatasetSection,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct PipelineSection {
    /// Per-chunk character budget for translation requests.
    #[serde(default)]
    pub max_chunk_chars: Option<usize>,
    /// Answer preview length in unresolved-answer warnings.
    #[serde(default)]
    pub warn_preview_chars: Option<usize>,
    /// Optional dev-only limiter: process at most N articles.
    #[serde(default)]
    pub max_articles: Option<usize>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TranslatorSection {
    /// Backend kind: "http" or "glossary". Defaults to "glossary" when a
    /// glossary path is configured, "http" otherwise.
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub source_lang: Option<String>,
    #[serde(default)]
    pub target_lang: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub glossary: Option<PathBuf>,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DatasetSection {
    #[serde(default)]
    pub input: Option<PathBuf>,
    #[serde(default)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub enum TranslatorBackend {
    Http {
        endpoint: String,
        source_lang: String,
        target_lang: String,
        timeout_secs: u64,
    },
    Glossary {
        path: PathBuf,
    },
}

#[derive(Clone, Debug)]
pub struct PipelineConfig {
    pub config_path: Option<PathBuf>,
    pub max_chunk_chars: usize,
    pub warn_preview_chars: usize,
    pub max_articles: Option<usize>,
    pub backend: TranslatorBackend,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

pub fn find_file_upwards(start: &Path, filename: &str, max_depth: usize) -> Option<PathBuf> {
    let mut dir = Some(start.to_path_buf());
    for _ in 0..max_depth {
        let d = dir?;
        let candidate = d.join(filename);
        if candidate.is_file() {
            return Some(candidate);
        }
        dir = d.parent().map(|p| p.to_path_buf());
    }
    None
}

pub fn find_default_config(workdir: &Path) -> Option<PathBuf> {
    if let Ok(cwd) = std::env::current_dir() {
        if let Some(p) = find_file_upwards(&cwd, CONFIG_FILE_NAME, 8) {
            return Some(p);
        }
    }
    if let Some(p) = find_file_upwards(workdir, CONFIG_FILE_NAME, 8) {
        return Some(p);
    }
    if let Ok(exe) = std::env::current_exe() {
        if let Some(dir) = exe.parent() {
            if let Some(p) = find_file_upwards(dir, CONFIG_FILE_NAME, 8) {
                return Some(p);
            }
        }
    }
    None
}

pub fn load_config(path: &Path) -> anyhow::Result<AppConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: AppConfig = toml::from_str(&text).context("parse config toml")?;
    Ok(cfg)
}

impl PipelineConfig {
    /// Merges CLI overrides over the config file over built-in defaults.
    #[allow(clippy::too_many_arguments)]
    pub fn from_paths_and_args(
        workdir: &Path,
        config_path: Option<PathBuf>,
        backend: Option<String>,
        endpoint: Option<String>,
        source_lang: Option<String>,
        target_lang: Option<String>,
        glossary: Option<PathBuf>,
        max_chunk_chars: Option<usize>,
        max_articles: Option<usize>,
    ) -> anyhow::Result<Self> {
        let cfg_file = config_path
            .or_else(|| std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from))
            .or_else(|| find_default_config(workdir));

        let mut file_cfg = AppConfig::default();
        if let Some(p) = cfg_file.as_ref() {
            if p.exists() {
                file_cfg = load_config(p)?;
            }
        }
        let cfg_dir = cfg_file
            .as_deref()
            .and_then(Path::parent)
            .unwrap_or(workdir)
            .to_path_buf();

        // Relative paths from the config file resolve against its directory;
        // CLI paths stay relative to the caller.
        let resolve_cfg_path = |p: PathBuf| {
            if p.is_relative() {
                cfg_dir.join(p)
            } else {
                p
            }
        };

        let glossary = glossary.or_else(|| {
            file_cfg
                .translator
                .glossary
                .clone()
                .map(&resolve_cfg_path)
        });

        let backend_kind = backend
            .or_else(|| file_cfg.translator.backend.clone())
            .map(|s| s.trim().to_ascii_lowercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| {
                if glossary.is_some() {
                    "glossary".to_string()
                } else {
                    "http".to_string()
                }
            });

        let backend = match backend_kind.as_str() {
            "glossary" => TranslatorBackend::Glossary {
                path: glossary.ok_or_else(|| {
                    anyhow!("glossary backend needs a table path (--glossary or [translator].glossary)")
                })?,
            },
            "http" => TranslatorBackend::Http {
                endpoint: endpoint
                    .or_else(|| file_cfg.translator.endpoint.clone())
                    .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
                source_lang: source_lang
                    .or_else(|| file_cfg.translator.source_lang.clone())
                    .unwrap_or_else(|| DEFAULT_SOURCE_LANG.to_string()),
                target_lang: target_lang
                    .or_else(|| file_cfg.translator.target_lang.clone())
                    .unwrap_or_else(|| DEFAULT_TARGET_LANG.to_string()),
                timeout_secs: file_cfg
                    .translator
                    .timeout_secs
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            },
            other => return Err(anyhow!("unknown translator backend: {other}")),
        };

        let max_chunk_chars = max_chunk_chars
            .or(file_cfg.pipeline.max_chunk_chars)
            .unwrap_or(DEFAULT_MAX_CHUNK_CHARS)
            .max(1);
        let warn_preview_chars = file_cfg
            .pipeline
            .warn_preview_chars
            .unwrap_or(DEFAULT_WARN_PREVIEW_CHARS)
            .max(1);
        let max_articles = max_articles
            .or(file_cfg.pipeline.max_articles)
            .filter(|n| *n > 0);

        let input = file_cfg.dataset.input.clone().map(&resolve_cfg_path);
        let output = file_cfg.dataset.output.clone().map(&resolve_cfg_path);

        Ok(Self {
            config_path: cfg_file,
            max_chunk_chars,
            warn_preview_chars,
            max_articles,
            backend,
            input,
            output,
        })
    }
}

pub fn init_default_config(dir: &Path, force: bool) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("create config dir: {}", dir.display()))?;
    let cfg_path = dir.join(CONFIG_FILE_NAME);
    if cfg_path.exists() && !force {
        return Ok(cfg_path);
    }

    let cfg_text = r#"[pipeline]
max_chunk_chars = 800
warn_preview_chars = 30
# Dev-only limiter: process at most N articles.
# max_articles = 2

[translator]
# "http" sends chunks to a LibreTranslate-compatible server.
backend = "http"
endpoint = "http://127.0.0.1:5000/translate"
source_lang = "en"
target_lang = "sq"
timeout_secs = 120
# Deterministic offline alternative: a source<TAB>target table.
# backend = "glossary"
# glossary = "glossary.tsv"

[dataset]
# Default input/output paths; CLI arguments override.
# input = "xquad.en.json"
# output = "xquad.sq.json"
"#;

    std::fs::write(&cfg_path, cfg_text)
        .with_context(|| format!("write config: {}", cfg_path.display()))?;
    Ok(cfg_path)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{init_default_config, load_config, PipelineConfig, TranslatorBackend};

    #[test]
    fn default_config_parses() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = init_default_config(dir.path(), false).expect("init");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.pipeline.max_chunk_chars, Some(800));
        assert_eq!(cfg.translator.backend.as_deref(), Some("http"));
    }

    #[test]
    fn init_respects_existing_file_without_force() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(super::CONFIG_FILE_NAME);
        std::fs::write(&path, "[pipeline]\nmax_chunk_chars = 42\n").expect("seed");

        init_default_config(dir.path(), false).expect("init");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.pipeline.max_chunk_chars, Some(42));

        init_default_config(dir.path(), true).expect("init force");
        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.pipeline.max_chunk_chars, Some(800));
    }

    #[test]
    fn cli_overrides_file_overrides_default() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(super::CONFIG_FILE_NAME);
        std::fs::write(
            &path,
            "[pipeline]\nmax_chunk_chars = 300\n\n[translator]\nendpoint = \"http://file.example/translate\"\n",
        )
        .expect("seed");

        let cfg = PipelineConfig::from_paths_and_args(
            dir.path(),
            Some(path),
            None,
            None,
            None,
            Some("de".to_string()),
            None,
            Some(123),
            None,
        )
        .expect("merge");

        assert_eq!(cfg.max_chunk_chars, 123);
        match &cfg.backend {
            TranslatorBackend::Http {
                endpoint,
                source_lang,
                target_lang,
                ..
            } => {
                assert_eq!(endpoint, "http://file.example/translate");
                assert_eq!(source_lang, "en");
                assert_eq!(target_lang, "de");
            }
            other => panic!("expected http backend, got {other:?}"),
        }
    }

    #[test]
    fn glossary_path_selects_glossary_backend() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cfg = PipelineConfig::from_paths_and_args(
            dir.path(),
            Some(dir.path().join("missing.toml")),
            None,
            None,
            None,
            None,
            Some(PathBuf::from("terms.tsv")),
            None,
            None,
        )
        .expect("merge");
        match &cfg.backend {
            TranslatorBackend::Glossary { path } => {
                assert_eq!(path, &PathBuf::from("terms.tsv"));
            }
            other => panic!("expected glossary backend, got {other:?}"),
        }
    }

    #[test]
    fn relative_glossary_from_file_resolves_against_config_dir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join(super::CONFIG_FILE_NAME);
        std::fs::write(&path, "[translator]\nglossary = \"terms.tsv\"\n").expect("seed");

        let cfg = PipelineConfig::from_paths_and_args(
            dir.path(),
            Some(path),
            None,
            None,
            None,
            None,
            None,
            None,
            None,
        )
        .expect("merge");
        match &cfg.backend {
            TranslatorBackend::Glossary { path } => {
                assert_eq!(path, &dir.path().join("terms.tsv"));
            }
            other => panic!("expected glossary backend, got {other:?}"),
        }
    }
}
