use std::path::Path;

use anyhow::Context;

use crate::align::locate_answer;
use crate::config::PipelineConfig;
use crate::dataset::{
    load_dataset, save_dataset, Answer, Article, Dataset, Paragraph, Qa, UNRESOLVED_START,
};
use crate::progress::ConsoleProgress;
use crate::translator::{translate_text, Translate};

/// One answer the locator could not place, addressed by its position in
/// the output tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnresolvedAnswer {
    pub article: usize,
    pub paragraph: usize,
    pub qa: usize,
    pub answer: usize,
    pub preview: String,
}

pub struct DatasetPipeline {
    cfg: PipelineConfig,
    progress: ConsoleProgress,
}

impl DatasetPipeline {
    pub fn new(cfg: PipelineConfig, progress: ConsoleProgress) -> Self {
        Self { cfg, progress }
    }

    pub fn translate_file(
        &self,
        translator: &mut dyn Translate,
        input: &Path,
        output: &Path,
    ) -> anyhow::Result<()> {
        self.progress.info(format!("Read dataset: {}", input.display()));
        let dataset = load_dataset(input)?;
        let (translated, unresolved) = self.translate_dataset(translator, dataset)?;
        self.progress.info(format!("Write output: {}", output.display()));
        save_dataset(output, &translated)?;
        if unresolved.is_empty() {
            self.progress.info("Done.");
        } else {
            self.progress
                .info(format!("Done. Unresolved answers: {}", unresolved.len()));
        }
        Ok(())
    }

    /// Rebuilds the dataset tree with translated strings and relocated
    /// answer offsets. Alignment misses become `answer_start = -1` plus a
    /// warning; translation failures abort the run.
    pub fn translate_dataset(
        &self,
        translator: &mut dyn Translate,
        mut dataset: Dataset,
    ) -> anyhow::Result<(Dataset, Vec<UnresolvedAnswer>)> {
        if let Some(max) = self.cfg.max_articles {
            let keep = max.min(dataset.data.len());
            if keep < dataset.data.len() {
                dataset.data.truncate(keep);
                self.progress.info(format!("Max articles: {keep}"));
            }
        }

        let total_paragraphs: usize = dataset.data.iter().map(|a| a.paragraphs.len()).sum();
        let mut done_paragraphs = 0usize;
        let mut unresolved: Vec<UnresolvedAnswer> = Vec::new();
        let mut articles: Vec<Article> = Vec::with_capacity(dataset.data.len());

        for (ai, article) in dataset.data.into_iter().enumerate() {
            let mut paragraphs: Vec<Paragraph> = Vec::with_capacity(article.paragraphs.len());
            for (pi, paragraph) in article.paragraphs.into_iter().enumerate() {
                done_paragraphs += 1;
                self.progress
                    .progress("translate", done_paragraphs, total_paragraphs);

                let context =
                    translate_text(translator, &paragraph.context, self.cfg.max_chunk_chars)
                        .with_context(|| format!("translate context (article {ai}, paragraph {pi})"))?;

                let mut qas: Vec<Qa> = Vec::with_capacity(paragraph.qas.len());
                for (qi, qa) in paragraph.qas.into_iter().enumerate() {
                    let question =
                        translate_text(translator, &qa.question, self.cfg.max_chunk_chars)
                            .with_context(|| {
                                format!("translate question (article {ai}, paragraph {pi}, qa {qi})")
                            })?;

                    let mut answers: Vec<Answer> = Vec::with_capacity(qa.answers.len());
                    for (ni, answer) in qa.answers.into_iter().enumerate() {
                        let text =
                            translate_text(translator, &answer.text, self.cfg.max_chunk_chars)
                                .with_context(|| {
                                    format!(
                                        "translate answer (article {ai}, paragraph {pi}, qa {qi}, answer {ni})"
                                    )
                                })?;
                        let answer_start = match locate_answer(&context, &text) {
                            Some(idx) => idx as i64,
                            None => {
                                let preview =
                                    truncate_chars(&text, self.cfg.warn_preview_chars);
                                self.progress.warn(format!(
                                    "could not align answer {preview:?} (article {ai}, paragraph {pi})"
                                ));
                                unresolved.push(UnresolvedAnswer {
                                    article: ai,
                                    paragraph: pi,
                                    qa: qi,
                                    answer: ni,
                                    preview,
                                });
                                UNRESOLVED_START
                            }
                        };
                        answers.push(Answer { text, answer_start });
                    }
                    qas.push(Qa {
                        id: qa.id,
                        question,
                        answers,
                    });
                }
                paragraphs.push(Paragraph { context, qas });
            }
            articles.push(Article {
                title: article.title,
                paragraphs,
            });
        }

        Ok((
            Dataset {
                version: dataset.version,
                data: articles,
            },
            unresolved,
        ))
    }
}

fn truncate_chars(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars).collect();
    out.push_str("...");
    out
}
