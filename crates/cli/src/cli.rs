use std::path::PathBuf;

use chunkwise_ingest::DocType;
use clap::{Parser, ValueEnum};

/// Split documents into retrieval-sized chunks.
///
/// Reads each file as UTF-8, picks a chunking strategy from the document's
/// shape (or the one forced with `--strategy`) and prints the chunks.
#[derive(Parser, Debug)]
#[command(name = "chunkwise", about = "Adaptive document chunker")]
pub struct CliArgs {
    /// Files to chunk
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Document type; `auto` detects it per file
    #[arg(long, value_enum, default_value = "auto")]
    pub doc_type: DocTypeArg,

    /// Strategy to run: the adaptive dispatcher or one strategy directly
    #[arg(long, value_enum, default_value = "adaptive")]
    pub strategy: StrategyArg,

    /// Heading syntax for `--strategy structural`: outline (markdown) or tagged (html).
    /// Detected from the text when omitted.
    #[arg(long)]
    pub flavor: Option<String>,

    /// Print one JSON object per file instead of plain text
    #[arg(long)]
    pub json: bool,

    /// Skip embedding/LLM providers; narrative documents fall back to recursive chunking
    #[arg(long, env = "CHUNKWISE_OFFLINE")]
    pub offline: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocTypeArg {
    Auto,
    Structured,
    Narrative,
    Mixed,
}

impl From<DocTypeArg> for DocType {
    fn from(arg: DocTypeArg) -> Self {
        match arg {
            DocTypeArg::Auto => DocType::Auto,
            DocTypeArg::Structured => DocType::Structured,
            DocTypeArg::Narrative => DocType::Narrative,
            DocTypeArg::Mixed => DocType::Mixed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    Adaptive,
    Recursive,
    Structural,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_adaptive_auto() {
        let args = CliArgs::try_parse_from(["chunkwise", "a.md"]).unwrap();
        assert_eq!(args.doc_type, DocTypeArg::Auto);
        assert_eq!(args.strategy, StrategyArg::Adaptive);
        assert!(args.flavor.is_none());
        assert!(!args.json);
    }

    #[test]
    fn parses_forced_strategy() {
        let args = CliArgs::try_parse_from([
            "chunkwise",
            "--strategy",
            "structural",
            "--flavor",
            "html",
            "--json",
            "a.html",
            "b.html",
        ])
        .unwrap();
        assert_eq!(args.strategy, StrategyArg::Structural);
        assert_eq!(args.flavor.as_deref(), Some("html"));
        assert_eq!(args.files.len(), 2);
        assert!(args.json);
    }

    #[test]
    fn requires_a_file() {
        assert!(CliArgs::try_parse_from(["chunkwise"]).is_err());
    }

    #[test]
    fn doc_type_maps_onto_engine_type() {
        assert_eq!(DocType::from(DocTypeArg::Narrative), DocType::Narrative);
    }
}
