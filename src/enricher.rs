//! Best-effort enrichment of error reports with source code.
//!
//! [`MessageEnricher`] drives one report through the pipeline
//!
//! ```text
//! parse trace -> select candidate frames -> resolve source -> extract window -> attach
//! ```
//!
//! Every step can end the attempt early. The report is only written to in the final step,
//! when a snippet exists, so it is never left half-annotated. Errors never reach the caller;
//! they are reported through [`EnrichmentOutcome`] and, for unexpected failures, an optional
//! [`crate::report::CODE_ERROR_KEY`] annotation.
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotsource::prelude::*;
//! use std::sync::Arc;
//!
//! let locator = StaticModuleLocator::new().with_module("MyApp", "/app/MyApp.dll");
//! let enricher = MessageEnricher::new(
//!     PdbResolver::new(Arc::new(SourceCache::new()), locator),
//!     EnricherConfig::default(),
//! );
//!
//! let mut report = ErrorReport::new(
//!     "System.Exception: boom\n   at MyApp.Program.Main() in /src/MyApp/Program.cs:line 12",
//! );
//! if let EnrichmentOutcome::Attached { .. } = enricher.enrich(&mut report) {
//!     println!("{}", report.code.unwrap_or_default());
//! }
//! ```

use std::fmt;

use strum::Display;

use crate::{
    config::EnricherConfig,
    report::{ErrorReport, CODE_ERROR_KEY},
    snippet::Snippet,
    source::{FileSystemResolver, ModuleLocator, PdbResolver, SourceResolver, SourceText},
    stacktrace::{self, StackFrame},
    Error,
};

/// The pipeline step an enrichment attempt stopped at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Stage {
    /// Before parsing; the report has no exception text
    NotAttempted,
    /// Parsing the stack trace
    Parsed,
    /// Selecting frames the resolver can handle
    CandidatesSelected,
    /// Resolving source text for a candidate
    Resolved,
    /// Cutting the window around the line that threw
    Extracted,
}

/// Result of one enrichment attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// Code and annotations were added to the report
    Attached {
        /// Source file of the snippet
        file: String,
        /// First line of the snippet
        start_line: u32,
        /// Line that threw
        target_line: u32,
    },
    /// Nothing usable was found; the report is unchanged
    Skipped {
        /// Where the attempt ended
        stage: Stage,
    },
    /// An unexpected error ended the attempt
    Failed {
        /// Where the attempt ended
        stage: Stage,
        /// Message of the error
        message: String,
    },
}

impl EnrichmentOutcome {
    /// `true` if the report received a snippet.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        matches!(self, EnrichmentOutcome::Attached { .. })
    }
}

impl fmt::Display for EnrichmentOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnrichmentOutcome::Attached {
                file,
                start_line,
                target_line,
            } => write!(f, "attached {file}:{start_line}-{target_line}"),
            EnrichmentOutcome::Skipped { stage } => write!(f, "skipped at {stage}"),
            EnrichmentOutcome::Failed { stage, message } => {
                write!(f, "failed at {stage}: {message}")
            }
        }
    }
}

/// Attaches the source code around the throwing line to error reports.
#[derive(Debug, Clone)]
pub struct MessageEnricher<R> {
    resolver: R,
    config: EnricherConfig,
}

impl<R: SourceResolver> MessageEnricher<R> {
    /// An enricher resolving source through `resolver`.
    pub fn new(resolver: R, config: EnricherConfig) -> Self {
        MessageEnricher { resolver, config }
    }

    /// The resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// The configuration.
    pub fn config(&self) -> &EnricherConfig {
        &self.config
    }

    /// Enrich `report` in place.
    ///
    /// The first frame (in trace order) whose source resolves is used; later frames are not
    /// tried even if no window can be cut from that source.
    pub fn enrich(&self, report: &mut ErrorReport) -> EnrichmentOutcome {
        let outcome = match report.detail.as_deref() {
            Some(detail) if !detail.trim().is_empty() => self.snippet_for(detail),
            _ => Err(EnrichmentOutcome::Skipped {
                stage: Stage::NotAttempted,
            }),
        };

        match outcome {
            Ok(snippet) => {
                report.code = Some(snippet.render(self.config.style));
                report.data.extend(snippet.annotations(self.config.style));

                EnrichmentOutcome::Attached {
                    file: snippet.file,
                    start_line: snippet.start_line,
                    target_line: snippet.target_line,
                }
            }
            Err(EnrichmentOutcome::Failed { stage, message }) => {
                log::warn!(
                    "Source enrichment through {} failed at {}: {}",
                    self.resolver.name(),
                    stage,
                    message
                );
                if self.config.report_errors {
                    report.push_annotation(CODE_ERROR_KEY, message.clone());
                }

                EnrichmentOutcome::Failed { stage, message }
            }
            Err(skipped) => {
                log::debug!("Source enrichment {}", skipped);
                skipped
            }
        }
    }

    fn snippet_for(&self, detail: &str) -> Result<Snippet, EnrichmentOutcome> {
        let mut frames = stacktrace::parse(detail).peekable();
        if frames.peek().is_none() {
            return Err(EnrichmentOutcome::Skipped {
                stage: Stage::Parsed,
            });
        }

        let mut candidates = frames
            .filter(|frame| self.resolver.is_candidate(frame))
            .peekable();
        if candidates.peek().is_none() {
            return Err(EnrichmentOutcome::Skipped {
                stage: Stage::CandidatesSelected,
            });
        }

        let Some((frame, source)) = self.first_resolved(candidates)? else {
            return Err(EnrichmentOutcome::Skipped {
                stage: Stage::Resolved,
            });
        };

        Snippet::for_frame(&source, &frame).ok_or(EnrichmentOutcome::Skipped {
            stage: Stage::Extracted,
        })
    }

    fn first_resolved(
        &self,
        candidates: impl Iterator<Item = StackFrame>,
    ) -> Result<Option<(StackFrame, SourceText)>, EnrichmentOutcome> {
        for frame in candidates {
            match self.resolver.resolve(&frame, self.config.use_cache) {
                Ok(source) => return Ok(Some((frame, source))),
                Err(error) if error.is_recoverable() => {
                    log::debug!(
                        "Skipping frame {}.{}: {}",
                        frame.declaring_type,
                        frame.method_name,
                        error
                    );
                }
                Err(error) => return Err(failed(Stage::Resolved, &error)),
            }
        }

        Ok(None)
    }
}

fn failed(stage: Stage, error: &Error) -> EnrichmentOutcome {
    EnrichmentOutcome::Failed {
        stage,
        message: error.to_string(),
    }
}

/// Enrich `report` from source files on disk, using the process-wide cache.
pub fn with_source_code_from_file_system(
    report: &mut ErrorReport,
    use_cache: bool,
) -> EnrichmentOutcome {
    MessageEnricher::new(
        FileSystemResolver::with_global_cache(),
        EnricherConfig::default().with_cache(use_cache),
    )
    .enrich(report)
}

/// Enrich `report` from sources embedded in Portable PDBs, using the process-wide cache.
pub fn with_source_code_from_pdb(
    report: &mut ErrorReport,
    locator: impl ModuleLocator + 'static,
    use_cache: bool,
) -> EnrichmentOutcome {
    MessageEnricher::new(
        PdbResolver::with_global_cache(locator),
        EnricherConfig::default().with_cache(use_cache),
    )
    .enrich(report)
}

/// Enrichment entry points as methods of [`ErrorReport`].
pub trait ErrorReportExt {
    /// See [`with_source_code_from_file_system`].
    fn with_source_code_from_file_system(&mut self, use_cache: bool) -> EnrichmentOutcome;

    /// See [`with_source_code_from_pdb`].
    fn with_source_code_from_pdb(
        &mut self,
        locator: impl ModuleLocator + 'static,
        use_cache: bool,
    ) -> EnrichmentOutcome;
}

impl ErrorReportExt for ErrorReport {
    fn with_source_code_from_file_system(&mut self, use_cache: bool) -> EnrichmentOutcome {
        with_source_code_from_file_system(self, use_cache)
    }

    fn with_source_code_from_pdb(
        &mut self,
        locator: impl ModuleLocator + 'static,
        use_cache: bool,
    ) -> EnrichmentOutcome {
        with_source_code_from_pdb(self, locator, use_cache)
    }
}
