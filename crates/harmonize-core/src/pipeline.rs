//! Batch orchestration.
//!
//! 1. **Validate** the batch structure (fatal on failure)
//! 2. **Translate** headers into column candidates and language hints
//! 3. **Resolve** one mapping decision per column
//! 4. **Transform** rows on a bounded pool of blocking workers; a worker that
//!    dies costs only its own rows, which are reported as errors
//! 5. **Enrich** missing fields that declare an enricher
//! 6. **Score** the outcomes and assemble the report

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use harmonize_ingest::read_batch;
use harmonize_map::{
    Classifier, GlossaryTranslator, GuardedClassifier, GuardedTranslator, LexicalScorer,
    MappingResolver, Translation, Translator, build_classifier,
};
use harmonize_model::{
    ColumnCandidate, HarmonizationReport, HarmonizedRecord, OutcomeTally, RecordBatch,
    TargetSchema,
};
use harmonize_standards::HarmonizerConfig;
use harmonize_transform::{Enricher, EnricherRegistry, FieldTransformer, QualityScorer};
use tokio::sync::Semaphore;
use tracing::{Instrument, debug, error, info, info_span, warn};

use crate::error::PipelineError;
use crate::rows::{FieldStep, RowJob, chunk_ranges};

/// Assembles a [`HarmonizationPipeline`] from configuration, optionally
/// with caller-supplied external capabilities.
pub struct PipelineBuilder {
    config: HarmonizerConfig,
    classifier: Option<Arc<dyn Classifier>>,
    translator: Option<Arc<dyn Translator>>,
    enrichers: Vec<(String, Arc<dyn Enricher>)>,
}

impl PipelineBuilder {
    pub fn new(config: HarmonizerConfig) -> Self {
        Self {
            config,
            classifier: None,
            translator: None,
            enrichers: Vec::new(),
        }
    }

    /// Adds an enricher for `field`, used when the field is missing from the
    /// mapping. Enrichers declared in the config take precedence.
    #[must_use]
    pub fn with_enricher(mut self, field: impl Into<String>, enricher: Arc<dyn Enricher>) -> Self {
        self.enrichers.push((field.into(), enricher));
        self
    }

    /// Replaces the backend selected by `[classifier] kind`.
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn Classifier>) -> Self {
        self.classifier = Some(classifier);
        self
    }

    /// Replaces the glossary translator.
    #[must_use]
    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    pub fn build(self) -> Result<HarmonizationPipeline, PipelineError> {
        let config = self.config;
        let schema = Arc::new(config.schema());
        let permits = Arc::new(Semaphore::new(config.runtime.max_external_calls.max(1)));
        let timeout = Duration::from_millis(config.runtime.call_timeout_ms);

        let classifier = match self.classifier {
            Some(classifier) => classifier,
            None => build_classifier(&config)?,
        };
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(GlossaryTranslator::new(&config.glossary)));

        let resolver = MappingResolver::new(
            Arc::clone(&schema),
            LexicalScorer::from_config(&config),
            config.thresholds,
        )
        .with_classifier(GuardedClassifier::new(
            classifier,
            Arc::clone(&permits),
            timeout,
        ));

        let enrichers = self
            .enrichers
            .into_iter()
            .fold(EnricherRegistry::from_config(&config), |registry, (field, enricher)| {
                registry.with_enricher(field, enricher)
            });

        debug!(
            profile = %config.name,
            fields = schema.len(),
            workers = config.runtime.workers,
            chunk_size = config.runtime.chunk_size,
            "pipeline assembled"
        );

        Ok(HarmonizationPipeline {
            translator: GuardedTranslator::new(translator, permits, timeout),
            resolver,
            transformer: Arc::new(FieldTransformer::new(&config)?),
            enrichers,
            workers: Arc::new(Semaphore::new(config.runtime.workers.max(1))),
            chunk_size: config.runtime.chunk_size.max(1),
            schema,
        })
    }
}

/// Harmonizes record batches into the configured target schema.
///
/// Mapping is resolved once per batch from the headers; rows are then
/// processed independently against the shared, read-only decisions.
pub struct HarmonizationPipeline {
    schema: Arc<TargetSchema>,
    translator: GuardedTranslator,
    resolver: MappingResolver,
    transformer: Arc<FieldTransformer>,
    enrichers: EnricherRegistry,
    workers: Arc<Semaphore>,
    chunk_size: usize,
}

impl HarmonizationPipeline {
    pub fn builder(config: HarmonizerConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Pipeline with the backends named in the configuration.
    pub fn from_config(config: HarmonizerConfig) -> Result<Self, PipelineError> {
        PipelineBuilder::new(config).build()
    }

    pub fn schema(&self) -> &TargetSchema {
        &self.schema
    }

    /// Reads `path` and harmonizes it. An unreadable file yields a failed
    /// report.
    pub async fn run_file(&self, path: &Path) -> HarmonizationReport {
        let owned = path.to_path_buf();
        match tokio::task::spawn_blocking(move || read_batch(&owned)).await {
            Ok(Ok(batch)) => self.run(batch).await,
            Ok(Err(err)) => {
                let message = format!("{err:#}");
                error!(path = %path.display(), error = %message, "input unreadable");
                let mut report = HarmonizationReport::failed(message);
                report.source = Some(path.display().to_string());
                report
            }
            Err(err) => {
                error!(path = %path.display(), error = %err, "reader task failed");
                HarmonizationReport::failed(format!("reader task failed: {err}"))
            }
        }
    }

    /// Harmonizes one batch. Never panics or errors: batch-level failures are
    /// returned as a failed report without rows.
    pub async fn run(&self, batch: RecordBatch) -> HarmonizationReport {
        let span = info_span!(
            "batch",
            source = batch.source.as_deref().unwrap_or("<memory>"),
            rows = batch.row_count(),
            columns = batch.headers.len()
        );
        self.run_batch(batch).instrument(span).await
    }

    async fn run_batch(&self, batch: RecordBatch) -> HarmonizationReport {
        let started = Instant::now();
        if let Err(err) = batch.validate() {
            error!(error = %err, "batch rejected");
            return failed_for(&batch, err.to_string());
        }

        let (candidates, language_hints) = self.candidates(&batch).await;
        let resolution = self.resolver.resolve(&candidates).await;

        let steps = FieldStep::plan(&batch, &resolution.decisions);
        let enrichers: Vec<_> = self
            .enrichers
            .for_missing(&resolution.missing_fields)
            .into_iter()
            .map(|(field, enricher)| (field.to_string(), Arc::clone(enricher)))
            .collect();
        let enriched_fields: Vec<String> = enrichers.iter().map(|(f, _)| f.clone()).collect();

        let source = batch.source.clone();
        let digest = batch.digest.clone();
        let total_records = batch.row_count();
        let job = Arc::new(RowJob {
            batch: Arc::new(batch),
            steps,
            enrichers,
            language_hints,
            transformer: Arc::clone(&self.transformer),
        });

        let (enhanced_rows, tally) = match self.transform_rows(job, total_records).await {
            Ok(result) => result,
            Err(message) => {
                let mut report = HarmonizationReport::failed(message);
                report.source = source;
                report.digest = digest;
                return report;
            }
        };

        let quality_score = QualityScorer::score_tally(&tally);
        let rejected_count = resolution.rejected_count();
        info!(
            records = total_records,
            mapped = resolution.mapped().count(),
            rejected = rejected_count,
            enriched = enriched_fields.len(),
            quality_score,
            duration_ms = started.elapsed().as_millis() as u64,
            "batch harmonized"
        );

        HarmonizationReport {
            success: true,
            error: None,
            source,
            digest,
            total_records,
            decisions: resolution.decisions,
            enhanced_rows,
            missing_fields: resolution.missing_fields,
            enriched_fields,
            rejected_count,
            quality_score,
            tally,
        }
    }

    /// One candidate and one language hint per header, in header order.
    async fn candidates(
        &self,
        batch: &RecordBatch,
    ) -> (Vec<ColumnCandidate>, Vec<Option<String>>) {
        let handles: Vec<_> = batch
            .headers
            .iter()
            .map(|header| {
                let translator = self.translator.clone();
                let header = header.clone();
                tokio::spawn(async move { translator.translate(&header).await })
            })
            .collect();

        let mut candidates = Vec::with_capacity(handles.len());
        let mut hints = Vec::with_capacity(handles.len());
        for (idx, handle) in handles.into_iter().enumerate() {
            let header = &batch.headers[idx];
            let translation = handle.await.unwrap_or_else(|err| {
                warn!(header = %header, error = %err, "translation task failed");
                Translation::untranslated(header)
            });
            debug!(
                header = %header,
                normalized = %translation.normalized_text,
                language = translation.language.as_deref().unwrap_or("-"),
                "header normalized"
            );
            candidates.push(ColumnCandidate::new(
                header,
                translation.normalized_text,
                batch.sample_value(idx),
            ));
            hints.push(translation.language);
        }
        (candidates, hints)
    }

    /// Runs row chunks on blocking workers, at most `workers` at a time, and
    /// reassembles them in input order. Rows of a panicked worker come back
    /// empty with error outcomes.
    async fn transform_rows(
        &self,
        job: Arc<RowJob>,
        rows: usize,
    ) -> Result<(Vec<HarmonizedRecord>, OutcomeTally), String> {
        let span = info_span!("transform", rows, steps = job.steps.len());
        async {
            let mut handles = Vec::new();
            for range in chunk_ranges(rows, self.chunk_size) {
                let permit = Arc::clone(&self.workers)
                    .acquire_owned()
                    .await
                    .map_err(|err| format!("worker pool closed: {err}"))?;
                let worker_job = Arc::clone(&job);
                let worker_range = range.clone();
                let handle = tokio::task::spawn_blocking(move || {
                    let _permit = permit;
                    worker_job.run(worker_range)
                });
                handles.push((range, handle));
            }

            let mut records = Vec::with_capacity(rows);
            let mut tally = OutcomeTally::default();
            for (range, handle) in handles {
                let (chunk, chunk_tally) = match handle.await {
                    Ok(result) => result,
                    Err(err) => {
                        error!(
                            first_row = range.start + 1,
                            rows = range.len(),
                            error = %err,
                            "row worker failed, rows reported as errors"
                        );
                        job.failed(range)
                    }
                };
                records.extend(chunk);
                tally.merge(&chunk_tally);
            }
            debug!(records = records.len(), outcomes = tally.total(), "rows transformed");
            Ok((records, tally))
        }
        .instrument(span)
        .await
    }
}

fn failed_for(batch: &RecordBatch, message: String) -> HarmonizationReport {
    let mut report = HarmonizationReport::failed(message);
    report.source = batch.source.clone();
    report.digest = batch.digest.clone();
    report
}
