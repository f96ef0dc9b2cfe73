use std::{env, fs, io::{self, Read, Write}, path::{Path, PathBuf}, process::ExitCode, time::Instant};

use entity_vectorizer::{AnalyzerConfig, Document, DocumentSource, EntityAnalyzer};
use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const DOCS_DIR_ENV: &str = "ENTITY_DOCS_DIR";
const DEFAULT_DOCS_DIR: &str = "dataset";

#[derive(Debug, Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("CBOR encoding failed: {0}")]
    Cbor(#[from] serde_cbor::Error),
    #[error(transparent)]
    Analyze(#[from] entity_vectorizer::AnalyzeError),
}

impl CliError {
    fn io(path: &Path, source: io::Error) -> Self {
        CliError::Io { path: path.to_path_buf(), source }
    }
}

/// 文書ディレクトリ (直下のファイルのみ)
/// ファイル名がそのまま文書IDになる
struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File names sorted so the row order is stable across platforms
    fn file_names(&self) -> Result<Vec<String>, CliError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| CliError::io(&self.dir, e))? {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(dir = %self.dir.display(), "skipping unreadable directory entry: {e}");
                    continue;
                }
            };
            if !entry.path().is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => tracing::warn!(name = ?raw, "skipping non UTF-8 file name"),
            }
        }
        names.sort();
        Ok(names)
    }

    fn read(&self, name: &str) -> Result<String, CliError> {
        // ディレクトリ外を指す名前は拒否
        if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(CliError::NotFound(name.to_string()));
        }
        let path = self.dir.join(name);
        let bytes = fs::read(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CliError::NotFound(name.to_string()),
            _ => CliError::io(&path, e),
        })?;
        // 不正なバイト列は U+FFFD に置き換える
        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                tracing::warn!(file = name, "file is not valid UTF-8, decoding lossily");
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }

    /// Read every listed file. A file that cannot be read is logged and skipped
    /// so one bad file does not sink the batch.
    fn read_all(&self) -> Result<IndexMap<String, String>, CliError> {
        let names = self.file_names()?;
        let mut contents = IndexMap::with_capacity(names.len());
        for name in names {
            match self.read(&name) {
                Ok(text) => {
                    contents.insert(name, text);
                }
                Err(e) => tracing::warn!(file = %name, "skipping unreadable file: {e}"),
            }
        }
        Ok(contents)
    }
}

impl DocumentSource for DirectorySource {
    type Error = CliError;

    fn list_documents(&self) -> Result<Vec<Document>, Self::Error> {
        Ok(self
            .read_all()?
            .into_iter()
            .map(|(id, content)| Document { id, content })
            .collect())
    }
}

#[derive(Serialize)]
struct FileListing {
    files: Vec<String>,
    #[serde(rename = "fileContents")]
    file_contents: IndexMap<String, String>,
}

#[derive(Serialize)]
struct FileContent {
    #[serde(rename = "fileName")]
    file_name: String,
    content: String,
}

#[derive(Serialize)]
struct Entities {
    entities: Vec<String>,
}

#[derive(Serialize)]
struct Clusters {
    clusters: Vec<entity_vectorizer::Cluster>,
}

#[derive(Clone, Copy, PartialEq)]
enum Format {
    Json,
    Cbor,
}

enum Command {
    Files,
    File(String),
    Entities(Option<String>),
    Cluster,
    Matrix,
    Project,
}

struct Options {
    command: Command,
    docs_dir: PathBuf,
    input: Option<PathBuf>,
    config: Option<PathBuf>,
    format: Format,
}

fn main() -> ExitCode {
    // RUST_LOG 未指定なら info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let program_start = Instant::now();
    let options = match parse_args(env::args().skip(1)) {
        Ok(Some(o)) => o,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            tracing::error!("{e}");
            print_usage();
            return ExitCode::from(2);
        }
    };

    let result = run(options);
    tracing::debug!(elapsed_ms = program_start.elapsed().as_secs_f64() * 1000.0, "program_total");
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn print_usage() {
    eprintln!("Usage: entity-vectorizer [OPTIONS] <COMMAND>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  files              list file names and contents of the docs directory");
    eprintln!("  file NAME          print one file of the docs directory");
    eprintln!("  entities [TEXT]    extract entities from TEXT (or stdin)");
    eprintln!("  cluster            cluster documents by shared entities");
    eprintln!("  matrix             document x entity-category matrix");
    eprintln!("  project            2-D projection of the matrix");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --docs DIR         documents directory (env {DOCS_DIR_ENV}, default ./{DEFAULT_DOCS_DIR})");
    eprintln!("  --input FILE       JSON batch [{{\"id\":..,\"content\":..}}] instead of --docs");
    eprintln!("  --config FILE      JSON analyzer config");
    eprintln!("  --format FMT       json (default) or cbor");
}

fn parse_args<I>(args: I) -> Result<Option<Options>, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut docs_dir: Option<PathBuf> = None;
    let mut input = None;
    let mut config = None;
    let mut format = Format::Json;
    let mut positional: Vec<String> = Vec::new();

    while let Some(a) = args.next() {
        let mut value = |flag: &str| {
            args.next().ok_or_else(|| CliError::Usage(format!("{flag} requires a value")))
        };
        match a.as_str() {
            "--docs" => docs_dir = Some(PathBuf::from(value("--docs")?)),
            "--input" => input = Some(PathBuf::from(value("--input")?)),
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--format" => {
                format = match value("--format")?.as_str() {
                    "json" => Format::Json,
                    "cbor" => Format::Cbor,
                    other => return Err(CliError::Usage(format!("unknown format: {other}"))),
                }
            }
            "-h" | "--help" => return Ok(None),
            flag if flag.starts_with("--") => return Err(CliError::Usage(format!("unknown option: {flag}"))),
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let command = match positional.next().as_deref() {
        Some("files") => Command::Files,
        Some("file") => Command::File(
            positional.next().ok_or_else(|| CliError::Usage("file requires a NAME".into()))?,
        ),
        Some("entities") => {
            let rest: Vec<String> = positional.by_ref().collect();
            Command::Entities(if rest.is_empty() { None } else { Some(rest.join(" ")) })
        }
        Some("cluster") => Command::Cluster,
        Some("matrix") => Command::Matrix,
        Some("project") => Command::Project,
        Some(other) => return Err(CliError::Usage(format!("unknown command: {other}"))),
        None => return Err(CliError::Usage("missing command".into())),
    };
    if let Some(extra) = positional.next() {
        tracing::warn!("extra arg ignored: {extra}");
    }

    let docs_dir = docs_dir
        .or_else(|| env::var_os(DOCS_DIR_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DOCS_DIR));

    Ok(Some(Options { command, docs_dir, input, config, format }))
}

fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, CliError> {
    match path {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| CliError::io(p, e))?;
            let config = serde_json::from_str(&text)?;
            tracing::info!("loaded config from {}", p.display());
            Ok(config)
        }
        None => Ok(AnalyzerConfig::default()),
    }
}

/// Caller supplied batch wins over the docs directory
fn load_documents(options: &Options) -> Result<Vec<Document>, CliError> {
    let start = Instant::now();
    let docs = match &options.input {
        Some(p) => {
            let text = fs::read_to_string(p).map_err(|e| CliError::io(p, e))?;
            serde_json::from_str::<Vec<Document>>(&text)?
        }
        None => DirectorySource::new(&options.docs_dir).list_documents()?,
    };
    tracing::info!(
        documents = docs.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "loaded documents"
    );
    Ok(docs)
}

fn run(options: Options) -> Result<(), CliError> {
    let config = load_config(options.config.as_deref())?;
    let analyzer = EntityAnalyzer::new(&config);
    let source = DirectorySource::new(&options.docs_dir);

    match &options.command {
        Command::Files => {
            let file_contents = source.read_all()?;
            let files = file_contents.keys().cloned().collect();
            emit(options.format, &FileListing { files, file_contents })
        }
        Command::File(name) => {
            let content = source.read(name)?;
            emit(options.format, &FileContent { file_name: name.clone(), content })
        }
        Command::Entities(text) => {
            let text = match text {
                Some(t) => t.clone(),
                None => {
                    let mut buf = String::new();
                    io::stdin()
                        .read_to_string(&mut buf)
                        .map_err(|e| CliError::io(Path::new("<stdin>"), e))?;
                    buf
                }
            };
            emit(options.format, &Entities { entities: analyzer.extract_entities(&text) })
        }
        Command::Cluster => {
            let docs = load_documents(&options)?;
            let clusters = analyzer.cluster_documents(&docs);
            tracing::info!(clusters = clusters.len(), "clustered documents");
            emit(options.format, &Clusters { clusters })
        }
        Command::Matrix => {
            let docs = load_documents(&options)?;
            emit(options.format, &analyzer.build_document_entity_matrix(&docs))
        }
        Command::Project => {
            let docs = load_documents(&options)?;
            let start = Instant::now();
            let matrix = analyzer.build_document_entity_matrix(&docs);
            let projection = analyzer.compute_projection(&matrix)?;
            tracing::info!(
                points = projection.len(),
                elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
                "computed projection"
            );
            if projection.degenerate {
                tracing::warn!("all columns have zero variance, every document projects to (0, 0)");
            }
            emit(options.format, &projection.points)
        }
    }
}

fn emit<T: Serialize>(format: Format, value: &T) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out).map_err(|e| CliError::io(Path::new("<stdout>"), e))
        }
        Format::Cbor => {
            serde_cbor::to_writer(&mut out, value)?;
            out.flush().map_err(|e| CliError::io(Path::new("<stdout>"), e))
        }
    }
}
