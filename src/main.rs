use std::path::PathBuf;

use anyhow::Context;
use clap::{CommandFactory, Parser};

use qa_translator::config::{init_default_config, PipelineConfig, TranslatorBackend};
use qa_translator::pipeline::DatasetPipeline;
use qa_translator::progress::ConsoleProgress;
use qa_translator::translator::{GlossaryTranslator, HttpTranslator, Translate};

#[derive(Parser, Debug)]
#[command(name = "qa-translator")]
#[command(about = "SQuAD-style dataset translator with answer-span realignment", long_about = None)]
struct Args {
    /// Generate a default config file, then exit
    #[arg(long)]
    init_config: bool,

    /// Directory to write the config file (default: current directory)
    #[arg(long, value_name = "DIR")]
    init_config_dir: Option<PathBuf>,

    /// Overwrite an existing config file when used with --init-config
    #[arg(long)]
    force: bool,

    /// Input dataset JSON
    #[arg(value_name = "JSON")]
    input: Option<PathBuf>,

    /// Output dataset JSON (default: <input_stem>.translated.json)
    #[arg(short, long, value_name = "JSON")]
    output: Option<PathBuf>,

    /// Config file path (default: search for qa-translator.toml upwards)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Translator backend: "http" or "glossary"
    #[arg(long)]
    backend: Option<String>,

    /// Translation server endpoint (http backend)
    #[arg(long)]
    endpoint: Option<String>,

    /// Source language code (e.g. en)
    #[arg(long)]
    source_lang: Option<String>,

    /// Target language code (e.g. sq)
    #[arg(long)]
    target_lang: Option<String>,

    /// Glossary TSV path (glossary backend)
    #[arg(long, value_name = "TSV")]
    glossary: Option<PathBuf>,

    /// Per-chunk character budget for translation requests
    #[arg(long)]
    max_chunk_chars: Option<usize>,

    /// Process at most N articles (dev-only)
    #[arg(long)]
    max_articles: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let progress = ConsoleProgress::new(true);

    if args.init_config {
        let dir = args
            .init_config_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        let cfg_path = init_default_config(&dir, args.force).context("init default config")?;
        eprintln!("Wrote config: {}", cfg_path.display());
        return Ok(());
    }

    let workdir = args
        .input
        .as_deref()
        .and_then(|p| p.parent())
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let cfg = PipelineConfig::from_paths_and_args(
        &workdir,
        args.config,
        args.backend,
        args.endpoint,
        args.source_lang,
        args.target_lang,
        args.glossary,
        args.max_chunk_chars,
        args.max_articles,
    )
    .context("build config")?;

    let input = match args.input.or_else(|| cfg.input.clone()) {
        Some(p) => p,
        None => {
            let mut cmd = Args::command();
            cmd.print_help().context("print help")?;
            eprintln!(
                "\n\nUSAGE:\n  qa-translator <dataset.json>\n\nTIPS:\n  - Defaults can live in qa-translator.toml ([dataset].input/output), or set QA_TRANSLATOR_CONFIG.\n  - Run --init-config to generate a commented config file.\n"
            );
            return Ok(());
        }
    };
    let output = args
        .output
        .or_else(|| cfg.output.clone())
        .unwrap_or_else(|| {
            let stem = input
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("output");
            input.with_file_name(format!("{stem}.translated.json"))
        });

    let mut translator: Box<dyn Translate> = match &cfg.backend {
        TranslatorBackend::Http {
            endpoint,
            source_lang,
            target_lang,
            timeout_secs,
        } => {
            progress.info(format!("Translator: {endpoint} ({source_lang} -> {target_lang})"));
            Box::new(HttpTranslator::new(
                endpoint,
                source_lang,
                target_lang,
                *timeout_secs,
            )?)
        }
        TranslatorBackend::Glossary { path } => {
            progress.info(format!("Translator: glossary {}", path.display()));
            Box::new(GlossaryTranslator::from_tsv_path(path)?)
        }
    };

    let pipeline = DatasetPipeline::new(cfg, progress);
    pipeline.translate_file(translator.as_mut(), &input, &output)?;
    Ok(())
}
