use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use embedrank_core::{CanonicalVector, LengthPolicy, ProfileFilter};
use embedrank_corpus::{CorpusSource, HashingVectorizer, JsonFileSource, QueryVectorizer};
use embedrank_search::{
    AuditConfig, AuditReport, CorpusRanker, FormatAuditor, SearchConfig, SearchResult,
    SearchSummary,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

/// Rank a document corpus by embedding similarity
#[derive(Parser, Debug)]
#[command(name = "embedrank")]
#[command(about = "Format-tolerant semantic similarity search", long_about = None)]
struct Args {
    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify the embedding encodings found in a corpus snapshot
    Audit {
        /// Corpus snapshot (.json array or .jsonl)
        corpus: PathBuf,

        /// Number of leading documents to examine
        #[arg(long, default_value_t = 10)]
        sample_size: usize,

        /// Maximum parse errors to report
        #[arg(long, default_value_t = 5)]
        max_errors: usize,
    },
    /// Rank a corpus snapshot against a query
    Search(SearchArgs),
}

#[derive(ClapArgs, Debug)]
struct SearchArgs {
    /// Corpus snapshot (.json array or .jsonl)
    corpus: PathBuf,

    /// Query vector as a JSON array
    #[arg(long, conflicts_with = "text", required_unless_present = "text")]
    vector: Option<String>,

    /// Query text, embedded with the local hashing vectorizer
    #[arg(long)]
    text: Option<String>,

    /// Dimension of the hashing vectorizer
    #[arg(long, default_value_t = 256)]
    dim: usize,

    /// Similarity threshold for flagging matches
    #[arg(long, conflicts_with = "adaptive", allow_negative_numbers = true)]
    threshold: Option<f64>,

    /// Pick the threshold from an audit of the corpus
    #[arg(long)]
    adaptive: bool,

    /// Number of leading documents the adaptive audit examines
    #[arg(long, default_value_t = 10)]
    audit_sample_size: usize,

    /// Maximum number of results
    #[arg(long, allow_negative_numbers = true)]
    limit: Option<i64>,

    /// Only rank documents owned by this profile
    #[arg(long)]
    profile: Option<String>,

    /// Length mismatch policy: truncate or reject
    #[arg(long)]
    length_policy: Option<LengthPolicy>,

    /// JSON search config; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Serialize)]
struct AuditOutput {
    report: AuditReport,
    recommended_threshold: f64,
}

#[derive(Serialize)]
struct SearchOutput {
    threshold: f64,
    summary: SearchSummary,
    results: Vec<SearchResult>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = match args.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("embedrank v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Audit {
            corpus,
            sample_size,
            max_errors,
        } => run_audit(corpus, sample_size, max_errors),
        Command::Search(search) => run_search(search),
    }
}

fn load_corpus(path: PathBuf) -> anyhow::Result<Vec<embedrank_core::Document>> {
    let source = JsonFileSource::new(path);
    source
        .load()
        .with_context(|| format!("failed to load corpus from {}", source.path().display()))
}

fn run_audit(corpus: PathBuf, sample_size: usize, max_errors: usize) -> anyhow::Result<()> {
    let config = AuditConfig {
        sample_size,
        max_error_samples: max_errors,
        ..Default::default()
    };
    let auditor = FormatAuditor::try_new(config)?;
    let documents = load_corpus(corpus)?;

    let report = auditor.audit(&documents);
    let output = AuditOutput {
        recommended_threshold: auditor.recommend_threshold(&report),
        report,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_search(args: SearchArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => SearchConfig::from_json_file(path)
            .with_context(|| format!("failed to read search config {}", path.display()))?,
        None => SearchConfig::default(),
    };
    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    if let Some(policy) = args.length_policy {
        config.length_policy = policy;
    }

    let documents = load_corpus(args.corpus.clone())?;
    let query = build_query(&args)?;

    if args.adaptive {
        let audit_config = AuditConfig::default().with_sample_size(args.audit_sample_size);
        let auditor = FormatAuditor::try_new(audit_config)?;
        let report = auditor.audit(&documents);
        config.threshold = auditor.recommend_threshold(&report);
        info!(threshold = config.threshold, "adaptive threshold selected");
    } else if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }

    let ranker = CorpusRanker::try_new(config)?;
    let results = match &args.profile {
        Some(profile) => {
            let filter = ProfileFilter::new(profile.clone());
            ranker.search_filtered(&query, &documents, Some(&filter))
        }
        None => ranker.search(&query, &documents),
    };

    let output = SearchOutput {
        threshold: ranker.config().threshold,
        summary: SearchSummary::from_results(&results),
        results,
    };
    if !output.summary.has_matches() && output.summary.results_count > 0 {
        info!("no documents passed the threshold, showing best available matches");
    }
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn build_query(args: &SearchArgs) -> anyhow::Result<CanonicalVector> {
    match (&args.vector, &args.text) {
        (Some(vector), _) => CanonicalVector::from_json(vector).context("invalid --vector"),
        (None, Some(text)) => {
            let vectorizer = HashingVectorizer::new(args.dim)?;
            Ok(vectorizer.vectorize(text)?)
        }
        (None, None) => bail!("either --vector or --text is required"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_search_flags() {
        let args = Args::try_parse_from([
            "embedrank",
            "search",
            "corpus.json",
            "--vector",
            "[1, 0]",
            "--threshold",
            "-0.2",
            "--limit",
            "3",
            "--length-policy",
            "reject",
        ])
        .unwrap();

        match args.command {
            Command::Search(search) => {
                assert_eq!(search.vector.as_deref(), Some("[1, 0]"));
                assert_eq!(search.threshold, Some(-0.2));
                assert_eq!(search.limit, Some(3));
                assert_eq!(search.length_policy, Some(LengthPolicy::Reject));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_search_requires_a_query() {
        assert!(Args::try_parse_from(["embedrank", "search", "corpus.json"]).is_err());
    }

    #[test]
    fn test_adaptive_conflicts_with_threshold() {
        let res = Args::try_parse_from([
            "embedrank",
            "search",
            "corpus.json",
            "--text",
            "rust",
            "--adaptive",
            "--threshold",
            "0.3",
        ]);
        assert!(res.is_err());
    }

    #[test]
    fn test_build_query_from_text() {
        let args = SearchArgs {
            corpus: PathBuf::from("corpus.json"),
            vector: None,
            text: Some("rust developer".to_string()),
            dim: 16,
            threshold: None,
            adaptive: false,
            audit_sample_size: 10,
            limit: None,
            profile: None,
            length_policy: None,
            config: None,
        };
        assert_eq!(build_query(&args).unwrap().dim(), 16);
    }
}
