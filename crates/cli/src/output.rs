use std::path::Path;

use chunkwise_ingest::ChunkOutcome;
use serde::Serialize;

#[derive(Serialize)]
struct FileReport<'a> {
    file: String,
    #[serde(flatten)]
    outcome: &'a ChunkOutcome,
}

/// One JSON line per file.
pub fn render_json(path: &Path, outcome: &ChunkOutcome) -> serde_json::Result<String> {
    serde_json::to_string(&FileReport {
        file: path.display().to_string(),
        outcome,
    })
}

pub fn render_plain(path: &Path, outcome: &ChunkOutcome) -> String {
    let mut out = format!(
        "== {} ({}, {}, {} chunks) ==\n",
        path.display(),
        outcome.doc_type,
        outcome.strategy,
        outcome.chunks.len()
    );
    if let Some(fallback) = &outcome.fallback {
        out.push_str(&format!("   fell back from {}: {}\n", fallback.from, fallback.reason));
    }
    for (i, chunk) in outcome.chunks.iter().enumerate() {
        out.push_str(&format!("--- chunk {} ({} chars) ---\n", i + 1, chunk.chars().count()));
        out.push_str(chunk);
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chunkwise_ingest::{DocType, Fallback, Strategy};

    fn outcome() -> ChunkOutcome {
        ChunkOutcome {
            chunks: vec!["Title\nBody.".into(), "Next".into()],
            doc_type: DocType::Structured,
            strategy: Strategy::Recursive,
            fallback: Some(Fallback {
                from: Strategy::Structural,
                reason: "no chunks".into(),
            }),
        }
    }

    #[test]
    fn json_report_is_flat() {
        let line = render_json(Path::new("doc.md"), &outcome()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["file"], "doc.md");
        assert_eq!(value["doc_type"], "structured");
        assert_eq!(value["strategy"], "recursive");
        assert_eq!(value["fallback"]["from"], "structural");
        assert_eq!(value["chunks"][1], "Next");
    }

    #[test]
    fn plain_report_lists_chunks() {
        let text = render_plain(Path::new("doc.md"), &outcome());
        assert!(text.starts_with("== doc.md (structured, recursive, 2 chunks) =="));
        assert!(text.contains("fell back from structural: no chunks"));
        assert!(text.contains("--- chunk 2 (4 chars) ---\nNext\n"));
    }
}
