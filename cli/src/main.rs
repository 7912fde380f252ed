use anyhow::{Context, Result};
use boolsearch_core::persist::{render_index, render_results, FileStorage, Storage, INDEX_FILE, RESULTS_FILE};
use boolsearch_core::{
    build, parse_query, Ast, DocId, Document, Evaluator, Language, NormalizerConfig, ResultSet, TextNormalizer,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing_subscriber::{EnvFilter, fmt};
use walkdir::WalkDir;

use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "boolsearch")]
#[command(about = "Boolean retrieval over a small document collection", long_about = None)]
struct Cli {
    #[command(flatten)]
    normalizer: NormalizerArgs,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct NormalizerArgs {
    /// Language used for stemming and stopwords
    #[arg(long, value_enum, default_value_t = LanguageArg::Portuguese, global = true)]
    language: LanguageArg,
    /// Index terms as written, without stemming
    #[arg(long, default_value_t = false, global = true)]
    no_stem: bool,
    /// Keep stopwords in the index
    #[arg(long, default_value_t = false, global = true)]
    keep_stopwords: bool,
    /// JSON normalizer config; overrides the flags above
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum LanguageArg {
    English,
    Portuguese,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the inverted index and write it as text
    Index {
        /// Collection list file (one document path per line) or a directory of .txt files
        #[arg(long)]
        base: String,
        /// Output directory
        #[arg(long, default_value = ".")]
        output: String,
    },
    /// Build the index and answer a boolean query
    Search {
        /// Collection list file (one document path per line) or a directory of .txt files
        #[arg(long)]
        base: String,
        /// File holding the query text
        #[arg(long, conflicts_with = "expr", required_unless_present = "expr")]
        query: Option<String>,
        /// Query given inline, e.g. "casa & !rua"
        #[arg(long)]
        expr: Option<String>,
        /// Output directory
        #[arg(long, default_value = ".")]
        output: String,
        #[arg(long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
}

#[derive(Serialize)]
struct SearchSummary<'a> {
    query: &'a str,
    parsed: String,
    total_hits: usize,
    results: Vec<Hit<'a>>,
}

#[derive(Serialize)]
struct Hit<'a> {
    doc_id: DocId,
    name: &'a str,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();
    let normalizer = TextNormalizer::new(normalizer_config(&cli.normalizer)?);

    match cli.command {
        Commands::Index { base, output } => {
            let docs = load_documents(Path::new(&base), &normalizer)?;
            let index = build(&docs);
            FileStorage::new(&output).write(INDEX_FILE, &render_index(&index))?;
            tracing::info!(num_docs = index.num_docs(), num_terms = index.len(), output = %output, "index written");
            Ok(())
        }
        Commands::Search { base, query, expr, output, format } => {
            let text = match (query, expr) {
                (_, Some(expr)) => expr,
                (Some(file), None) => fs::read_to_string(&file).with_context(|| format!("reading query file {file}"))?,
                (None, None) => anyhow::bail!("either --query or --expr is required"),
            };
            run_search(Path::new(&base), text.trim(), &output, format, &normalizer)
        }
    }
}

fn normalizer_config(args: &NormalizerArgs) -> Result<NormalizerConfig> {
    if let Some(path) = &args.config {
        return Ok(NormalizerConfig::from_json_file(path)?);
    }
    let language = match args.language {
        LanguageArg::English => Language::English,
        LanguageArg::Portuguese => Language::Portuguese,
    };
    Ok(NormalizerConfig { language, stem: !args.no_stem, stopwords: !args.keep_stopwords })
}

fn run_search(base: &Path, text: &str, output: &str, format: Format, normalizer: &TextNormalizer) -> Result<()> {
    let docs = load_documents(base, normalizer)?;
    let index = build(&docs);
    let storage = FileStorage::new(output);
    storage.write(INDEX_FILE, &render_index(&index))?;

    let ast = parse_query(text, normalizer).with_context(|| format!("invalid query: {text}"))?;
    let hits = Evaluator::for_index(&index).evaluate(&ast).with_context(|| format!("cannot evaluate query: {text}"))?;
    storage.write(RESULTS_FILE, &render_results(&hits, &docs))?;
    tracing::info!(query = text, total_hits = hits.len(), output, "search complete");

    if let Format::Json = format {
        println!("{}", summary_json(text, &ast, &hits, &docs)?);
    }
    Ok(())
}

fn summary_json(text: &str, ast: &Ast, hits: &ResultSet, docs: &[Document]) -> Result<String> {
    let results = hits
        .iter()
        .filter_map(|&doc_id| (doc_id as usize).checked_sub(1).and_then(|i| docs.get(i)).map(|d| Hit { doc_id, name: &d.name }))
        .collect::<Vec<_>>();
    let summary = SearchSummary { query: text, parsed: ast.to_string(), total_hits: results.len(), results };
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Read the collection in order; ids follow that order starting at 1.
fn load_documents(base: &Path, normalizer: &TextNormalizer) -> Result<Vec<Document>> {
    let files = if base.is_dir() { walk_collection(base) } else { read_collection_list(base)? };
    let mut docs = Vec::with_capacity(files.len());
    for (name, path) in files {
        let body = fs::read_to_string(&path).with_context(|| format!("reading document {}", path.display()))?;
        let doc_id = docs.len() as DocId + 1;
        docs.push(Document::from_text(doc_id, name, &body, normalizer));
    }
    tracing::info!(num_docs = docs.len(), base = %base.display(), "loaded documents");
    Ok(docs)
}

/// Entries are returned as (name as listed, resolved path).
fn read_collection_list(list: &Path) -> Result<Vec<(String, PathBuf)>> {
    let text = fs::read_to_string(list).with_context(|| format!("reading collection list {}", list.display()))?;
    let dir = list.parent().unwrap_or_else(|| Path::new(""));
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| (line.to_string(), dir.join(line)))
        .collect())
}

fn walk_collection(root: &Path) -> Vec<(String, PathBuf)> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && p.extension().and_then(|s| s.to_str()) == Some("txt"))
        .collect();
    files.sort();
    files
        .into_iter()
        .map(|p| (p.strip_prefix(root).unwrap_or(&p).display().to_string(), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_list_resolves_relative_to_list_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "Casa amarela").unwrap();
        fs::write(dir.path().join("b.txt"), "Rua da casa").unwrap();
        fs::write(dir.path().join("base.txt"), "a.txt\n\nb.txt\n").unwrap();

        let normalizer = TextNormalizer::default();
        let docs = load_documents(&dir.path().join("base.txt"), &normalizer).unwrap();
        assert_eq!(docs.iter().map(|d| (d.id, d.name.as_str())).collect::<Vec<_>>(), vec![(1, "a.txt"), (2, "b.txt")]);
    }

    fn collection(dir: &Path) -> PathBuf {
        fs::write(dir.join("um.txt"), "A casa amarela").unwrap();
        fs::write(dir.join("dois.txt"), "A rua da casa").unwrap();
        fs::write(dir.join("tres.txt"), "A rua escura").unwrap();
        let base = dir.join("base.txt");
        fs::write(&base, "um.txt\ndois.txt\ntres.txt\n").unwrap();
        base
    }

    fn verbatim() -> TextNormalizer {
        TextNormalizer::new(NormalizerConfig { stem: false, ..NormalizerConfig::default() })
    }

    #[test]
    fn search_writes_index_and_results() {
        let dir = tempfile::tempdir().unwrap();
        let base = collection(dir.path());
        let out = dir.path().join("out");
        let output = out.to_str().unwrap();

        run_search(&base, "casa & !rua", output, Format::Text, &verbatim()).unwrap();

        let index = fs::read_to_string(out.join(INDEX_FILE)).unwrap();
        assert!(index.lines().any(|l| l == "casa: 1,1 2,1"));
        assert!(index.lines().any(|l| l == "rua: 2,1 3,1"));
        assert_eq!(fs::read_to_string(out.join(RESULTS_FILE)).unwrap(), "1\num.txt\n");
    }

    #[test]
    fn malformed_query_fails_without_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = collection(dir.path());
        let out = dir.path().join("out");

        let err = run_search(&base, "casa &", out.to_str().unwrap(), Format::Text, &verbatim()).unwrap_err();
        assert!(err.downcast_ref::<boolsearch_core::ParseError>().is_some());
        assert!(!out.join(RESULTS_FILE).exists());
    }

    #[test]
    fn unknown_term_fails_without_results_file() {
        let dir = tempfile::tempdir().unwrap();
        let base = collection(dir.path());
        let out = dir.path().join("out");

        let err = run_search(&base, "casa | bola", out.to_str().unwrap(), Format::Json, &verbatim()).unwrap_err();
        assert!(err.downcast_ref::<boolsearch_core::LookupError>().is_some());
        assert!(!out.join(RESULTS_FILE).exists());
    }

    #[test]
    fn json_summary_lists_hits() {
        let dir = tempfile::tempdir().unwrap();
        let normalizer = verbatim();
        let docs = load_documents(&collection(dir.path()), &normalizer).unwrap();
        let index = build(&docs);
        let ast = parse_query("rua | amarela", &normalizer).unwrap();
        let hits = Evaluator::for_index(&index).evaluate(&ast).unwrap();

        let json: serde_json::Value = serde_json::from_str(&summary_json("rua | amarela", &ast, &hits, &docs).unwrap()).unwrap();
        assert_eq!(json["parsed"], "(rua | amarela)");
        assert_eq!(json["total_hits"], 3);
        let names: Vec<&str> = json["results"].as_array().unwrap().iter().map(|h| h["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["um.txt", "dois.txt", "tres.txt"]);
    }

    #[test]
    fn directory_collection_is_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("z.txt"), "zebra").unwrap();
        fs::write(dir.path().join("sub/m.txt"), "macaco").unwrap();
        fs::write(dir.path().join("notes.md"), "ignored").unwrap();

        let names: Vec<String> = walk_collection(dir.path()).into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec![Path::new("sub").join("m.txt").display().to_string(), "z.txt".to_string()]);
    }
}
