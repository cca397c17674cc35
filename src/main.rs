use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use mdchunker::config::{self, ChunkerConfig, EmbeddingConfig, QuestionsConfig, SearchConfig};
use mdchunker::pipeline;
use mdchunker::{Chunk, ChunkRecord, MarkdownChunker, QuestionIndex};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "mdchunker")]
#[command(about = "Split Markdown documents into hierarchy-tagged chunks", long_about = None)]
#[command(version)]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chunk: ChunkArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate questions for every chunk of a Markdown file and embed them
    Questions {
        /// Markdown file to chunk
        input: PathBuf,

        /// Where to write the question index (JSON)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        budget: BudgetArgs,

        /// Write the questions without embeddings
        #[arg(long)]
        no_embed: bool,
    },

    /// Embed every question of an index file that has no vector yet
    Embed {
        /// Question index written by `questions`
        index: PathBuf,

        /// Output file (default: overwrite the index)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rank the indexed questions against a free-text query
    Search {
        /// Embedded question index
        index: PathBuf,

        /// Query text
        query: String,

        /// Number of hits (default: SEARCH_TOP_K or 4)
        #[arg(short)]
        k: Option<usize>,

        /// Print hits as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ChunkArgs {
    /// Markdown file, or a directory searched for *.md files
    #[arg(required = true)]
    input: Option<PathBuf>,

    #[command(flatten)]
    budget: BudgetArgs,

    /// Print chunk records as JSON instead of summary lines
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BudgetArgs {
    /// Maximum chunk length in characters (default: MDCHUNKER_MAX_CHUNK_SIZE or 1024)
    #[arg(long, conflicts_with = "no_split")]
    max_chunk_size: Option<usize>,

    /// Keep every section whole, whatever its length
    #[arg(long)]
    no_split: bool,
}

impl BudgetArgs {
    /// CLI flags win over the environment
    fn chunker(&self) -> Result<MarkdownChunker> {
        let budget = if self.no_split {
            None
        } else {
            match self.max_chunk_size {
                Some(size) => Some(size),
                None => {
                    ChunkerConfig::from_env()
                        .context("Invalid chunker configuration")?
                        .max_chunk_size
                }
            }
        };
        Ok(MarkdownChunker::from_budget(budget)?)
    }
}

#[derive(Serialize)]
struct FileChunks {
    path: String,
    chunks: Vec<ChunkRecord>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mdchunker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    config::load_dotenv();

    match cli.command {
        Some(Commands::Questions {
            input,
            output,
            budget,
            no_embed,
        }) => run_questions(&input, &output, &budget, no_embed).await,
        Some(Commands::Embed { index, output }) => {
            let output = output.unwrap_or_else(|| index.clone());
            run_embed(&index, &output).await
        }
        Some(Commands::Search {
            index,
            query,
            k,
            json,
        }) => run_search(&index, &query, k, json).await,
        None => run_chunk(&cli.chunk),
    }
}

fn run_chunk(args: &ChunkArgs) -> Result<()> {
    let Some(input) = args.input.as_deref() else {
        anyhow::bail!("No input given");
    };
    let chunker = args.budget.chunker()?;

    let files = collect_inputs(input)?;
    info!(files = files.len(), max_chunk_size = ?chunker.max_chunk_size(), "chunking");

    let mut results = Vec::with_capacity(files.len());
    for file in &files {
        let chunks = chunker
            .load_and_chunk(file)
            .with_context(|| format!("Failed to chunk {}", file.display()))?;
        results.push((file, chunks));
    }

    if args.json {
        let output: Vec<FileChunks> = results
            .iter()
            .map(|(path, chunks)| FileChunks {
                path: path.display().to_string(),
                chunks: chunks.iter().map(Chunk::to_record).collect(),
            })
            .collect();

        let json = if input.is_dir() {
            serde_json::to_string_pretty(&output)?
        } else {
            let records: &[ChunkRecord] = output
                .first()
                .map(|f| f.chunks.as_slice())
                .unwrap_or_default();
            serde_json::to_string_pretty(records)?
        };
        println!("{}", json);
        return Ok(());
    }

    let show_paths = input.is_dir();
    for (path, chunks) in &results {
        if show_paths {
            println!("== {} ==", path.display());
        }
        println!("Number of chunks: {}", chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            println!("{}", chunk.summary_line(i));
        }
    }

    Ok(())
}

async fn run_questions(
    input: &Path,
    output: &Path,
    budget: &BudgetArgs,
    no_embed: bool,
) -> Result<()> {
    let chunker = budget.chunker()?;
    let questions = QuestionsConfig::from_env().context("Invalid question configuration")?;
    if questions.api_key.is_none() {
        warn!(endpoint = %questions.endpoint, "GROQ_API_KEY is not set, sending unauthenticated requests");
    }
    let generator = questions
        .client()
        .context("Failed to create question client")?;

    let chunks = chunker
        .load_and_chunk(input)
        .with_context(|| format!("Failed to chunk {}", input.display()))?;

    let index = if no_embed {
        QuestionIndex::new(pipeline::generate_questions(&chunks, &generator).await?)
    } else {
        let embedding = EmbeddingConfig::from_env().context("Invalid embedding configuration")?;
        pipeline::build_question_index(&chunks, &generator, &embedding.client()).await?
    };

    index
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} chunks, {} questions ({} embedded) written to {}",
        index.items().len(),
        index.question_count(),
        index.embedded_count(),
        output.display()
    );
    Ok(())
}

async fn run_embed(index_path: &Path, output: &Path) -> Result<()> {
    let embedding = EmbeddingConfig::from_env().context("Invalid embedding configuration")?;
    let mut index = QuestionIndex::load(index_path)
        .with_context(|| format!("Failed to load {}", index_path.display()))?;

    pipeline::embed_questions(index.items_mut(), &embedding.client()).await?;

    index
        .save(output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "{} of {} questions embedded, written to {}",
        index.embedded_count(),
        index.question_count(),
        output.display()
    );
    Ok(())
}

async fn run_search(index_path: &Path, query: &str, k: Option<usize>, json: bool) -> Result<()> {
    let embedding = EmbeddingConfig::from_env().context("Invalid embedding configuration")?;
    let k = match k {
        Some(k) => k,
        None => {
            SearchConfig::from_env()
                .context("Invalid search configuration")?
                .top_k
        }
    };

    let index = QuestionIndex::load(index_path)
        .with_context(|| format!("Failed to load {}", index_path.display()))?;
    if index.embedded_count() == 0 {
        warn!(index = %index_path.display(), "index has no embedded questions");
    }

    let hits = pipeline::search_query(&index, &embedding.client(), query, k).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&hits)?);
        return Ok(());
    }

    for (rank, hit) in hits.iter().enumerate() {
        println!(
            "{}. ({:.4}) chunk {}: {}",
            rank + 1,
            hit.similarity,
            hit.chunk_id,
            hit.question
        );
        for line in hit.chunk_content.lines() {
            println!("    {}", line);
        }
    }

    Ok(())
}

/// A single file as given, or every Markdown file under a directory in sorted order
fn collect_inputs(input: &Path) -> Result<Vec<PathBuf>> {
    if !input.is_dir() {
        return Ok(vec![input.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(input)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
    {
        let entry = entry.context("Failed to read directory entry")?;
        let path = entry.path();

        if path.is_file() && is_markdown(path) {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| matches!(ext.to_lowercase().as_str(), "md" | "markdown"))
}
