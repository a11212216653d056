//! End-to-end enrichment from source files on disk.

mod common;

use std::sync::Arc;

use common::{builders::numbered_source, numbered_window, trace, trace_path, write_file};
use dotsource::{
    prelude::*,
    report::{CODE_FILENAME_KEY, CODE_LINE_KEY, CODE_SNIPPET_KEY, CODE_START_LINE_KEY},
    snippet::{INLINE_MARKER, LINE_TERMINATOR},
};

fn enricher(cache: Arc<SourceCache>, config: EnricherConfig) -> MessageEnricher<FileSystemResolver> {
    MessageEnricher::new(FileSystemResolver::new(cache), config)
}

/// The common case: a deployed source file and a frame pointing into its middle.
#[test]
fn test_attach_window_from_disk() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Program.cs",
        numbered_source(40, LINE_TERMINATOR).as_bytes(),
    )?;
    let file = trace_path(&path)?;

    let mut report = ErrorReport::new(trace(&[("MyApp.Program", "Main", Some((file, 15)))]));
    let outcome = report.with_source_code_from_file_system(true);

    assert_eq!(
        outcome,
        EnrichmentOutcome::Attached {
            file: file.to_string(),
            start_line: 5,
            target_line: 15,
        }
    );
    assert_eq!(report.code.as_deref(), Some(numbered_window(5, 25).as_str()));
    assert_eq!(report.annotation(CODE_START_LINE_KEY), Some("5"));
    assert_eq!(report.annotation(CODE_LINE_KEY), Some("15"));
    assert_eq!(report.annotation(CODE_FILENAME_KEY), Some(file));

    Ok(())
}

/// Frames without a location and frames whose file is gone are skipped in favour of the
/// next frame that resolves.
#[test]
fn test_first_resolvable_frame_wins() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("Deleted.cs");
    let path = write_file(
        dir.path(),
        "Service.cs",
        numbered_source(8, LINE_TERMINATOR).as_bytes(),
    )?;
    let file = trace_path(&path)?;

    let mut report = ErrorReport::new(trace(&[
        ("System.Linq.Enumerable", "First", None),
        ("MyApp.Repository", "Load", Some((trace_path(&missing)?, 3))),
        ("MyApp.Service", "Run", Some((file, 2))),
        ("MyApp.Program", "Main", Some((file, 7))),
    ]));
    let outcome = enricher(Arc::new(SourceCache::new()), EnricherConfig::default())
        .enrich(&mut report);

    assert!(outcome.is_attached());
    assert_eq!(report.code.as_deref(), Some(numbered_window(1, 8).as_str()));
    assert_eq!(report.annotation(CODE_START_LINE_KEY), Some("1"));
    assert_eq!(report.annotation(CODE_LINE_KEY), Some("2"));

    Ok(())
}

/// Frames pointing at files that do not exist are not candidates; the report is unchanged.
#[test]
fn test_untouched_when_nothing_resolves() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let missing = dir.path().join("Missing.cs");

    let original = ErrorReport::new(trace(&[(
        "MyApp.Program",
        "Main",
        Some((trace_path(&missing)?, 4)),
    )]));
    let mut report = original.clone();
    let outcome = enricher(Arc::new(SourceCache::new()), EnricherConfig::default())
        .enrich(&mut report);

    assert_eq!(
        outcome,
        EnrichmentOutcome::Skipped {
            stage: Stage::CandidatesSelected
        }
    );
    assert_eq!(report, original);

    Ok(())
}

/// A target line past the end of the file resolves the source but yields no window.
#[test]
fn test_line_past_end_of_file() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Short.cs",
        numbered_source(3, LINE_TERMINATOR).as_bytes(),
    )?;

    let mut report = ErrorReport::new(trace(&[(
        "MyApp.Short",
        "Run",
        Some((trace_path(&path)?, 60)),
    )]));
    let outcome = enricher(Arc::new(SourceCache::new()), EnricherConfig::default())
        .enrich(&mut report);

    assert_eq!(
        outcome,
        EnrichmentOutcome::Skipped {
            stage: Stage::Extracted
        }
    );
    assert!(report.code.is_none());
    assert!(report.data.is_empty());

    Ok(())
}

/// A cached source outlives changes on disk until the cache is bypassed.
#[test]
fn test_cache_served_until_bypassed() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Cached.cs",
        numbered_source(5, LINE_TERMINATOR).as_bytes(),
    )?;
    let file = trace_path(&path)?;
    let detail = trace(&[("MyApp.Cached", "Run", Some((file, 1)))]);

    let cache = Arc::new(SourceCache::new());
    let cached = enricher(cache.clone(), EnricherConfig::default());
    let uncached = enricher(cache.clone(), EnricherConfig::uncached());

    let mut first = ErrorReport::new(detail.clone());
    assert!(cached.enrich(&mut first).is_attached());
    assert_eq!(cache.len(), 1);

    std::fs::write(&path, "    rewritten();")?;

    let mut second = ErrorReport::new(detail.clone());
    assert!(cached.enrich(&mut second).is_attached());
    assert_eq!(second.code, first.code);

    let mut third = ErrorReport::new(detail);
    assert!(uncached.enrich(&mut third).is_attached());
    assert_eq!(third.code.as_deref(), Some("    rewritten();"));

    Ok(())
}

/// Byte order marks are dropped and UTF-16 files are decoded.
#[test]
fn test_encoded_source_files() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let mut utf8 = vec![0xEF, 0xBB, 0xBF];
    utf8.extend_from_slice(b"var first = 1;");
    let utf8_path = write_file(dir.path(), "Utf8.cs", &utf8)?;

    let mut utf16 = vec![0xFF, 0xFE];
    for unit in "var second = 2;".encode_utf16() {
        utf16.extend_from_slice(&unit.to_le_bytes());
    }
    let utf16_path = write_file(dir.path(), "Utf16.cs", &utf16)?;

    let enricher = enricher(Arc::new(SourceCache::new()), EnricherConfig::default());

    let mut report = ErrorReport::new(trace(&[(
        "MyApp.First",
        "Run",
        Some((trace_path(&utf8_path)?, 1)),
    )]));
    assert!(enricher.enrich(&mut report).is_attached());
    assert_eq!(report.code.as_deref(), Some("var first = 1;"));

    let mut report = ErrorReport::new(trace(&[(
        "MyApp.Second",
        "Run",
        Some((trace_path(&utf16_path)?, 1)),
    )]));
    assert!(enricher.enrich(&mut report).is_attached());
    assert_eq!(report.code.as_deref(), Some("var second = 2;"));

    Ok(())
}

/// The inline marker style flags the target line and uses a single annotation.
#[test]
fn test_inline_marker_style() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Marked.cs",
        numbered_source(4, LINE_TERMINATOR).as_bytes(),
    )?;
    let file = trace_path(&path)?;

    let mut report = ErrorReport::new(trace(&[("MyApp.Marked", "Run", Some((file, 2)))]));
    let config = EnricherConfig::default().with_style(SnippetStyle::InlineMarker);
    assert!(enricher(Arc::new(SourceCache::new()), config)
        .enrich(&mut report)
        .is_attached());

    let code = report.code.as_deref().unwrap_or_default();
    let lines: Vec<&str> = code.split(LINE_TERMINATOR).collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1], format!("    var line2 = 2;{INLINE_MARKER}"));
    assert!(!lines[0].ends_with(INLINE_MARKER));

    assert_eq!(report.data.len(), 1);
    assert_eq!(
        report.annotation(CODE_SNIPPET_KEY),
        Some(format!("{file}:1-2").as_str())
    );

    Ok(())
}

/// Existing annotations are kept in place; new ones are appended.
#[test]
fn test_existing_annotations_preserved() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_file(
        dir.path(),
        "Kept.cs",
        numbered_source(3, LINE_TERMINATOR).as_bytes(),
    )?;

    let mut report = ErrorReport::new(trace(&[(
        "MyApp.Kept",
        "Run",
        Some((trace_path(&path)?, 3)),
    )]));
    report.push_annotation("X-Request-Id", "42");

    assert!(enricher(Arc::new(SourceCache::new()), EnricherConfig::default())
        .enrich(&mut report)
        .is_attached());
    assert_eq!(report.data[0], Annotation::new("X-Request-Id", "42"));
    assert_eq!(report.data.len(), 4);

    Ok(())
}
