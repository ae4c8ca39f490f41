//! The deployment pipeline.
//!
//! Turns a content directory into rendered pages plus a manifest:
//!
//! ```text
//! 1. Discover   ContentFiles/*.{txt,md}  →  files in order
//! 2. Parse      every file               →  LocaleDocument per file
//! 3. Render     template + document      →  DeploymentFiles/<name>.html
//! 4. Manifest   rendered files           →  DeploymentFiles/manifest.txt
//! ```
//!
//! ## Failure model
//!
//! Parsing is a barrier: every file is parsed before anything is written,
//! and one bad file stops the run with nothing written. All failing files
//! are reported together, each with every missing field.
//!
//! Past the barrier a failed page write stops the run with
//! [`DeployError::Write`], which lists the pages already written, so the
//! caller knows the output directory is partial. A failed manifest write
//! after all pages succeeded is [`DeployError::Manifest`]: every page is
//! valid, only the manifest is missing.
//!
//! Each file is written to a temporary file next to its destination and
//! renamed into place, so no page is ever observed half-written.
//!
//! The pipeline is single-threaded: one document at a time, each owned by
//! the step that is working on it.

use crate::config::{ConfigError, DeployConfig};
use crate::document::LocaleDocument;
use crate::image_token::ImageSyntax;
use crate::manifest::{Manifest, order_files};
use crate::naming::{output_file_name, unordered_reason};
use crate::parse::{self, ParseError};
use crate::render::{Template, TemplateError};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io::{self, Write as _};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Content file extensions picked up by discovery.
const CONTENT_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("cannot read {path}: {source}")]
    UnreadableInput { path: PathBuf, source: io::Error },
    #[error("cannot create {path}: {source}")]
    UnwritableOutput { path: PathBuf, source: io::Error },
    #[error("template {path}: {source}")]
    Template {
        path: PathBuf,
        source: TemplateError,
    },
    #[error("no content files (.txt, .md) found in {0}")]
    NoContent(PathBuf),
    #[error("several files share order {order}: {}", .files.join(", "))]
    DuplicateOrder { order: u32, files: Vec<String> },
    #[error("{} file(s) failed to parse, nothing was written", .0.len())]
    Parse(Vec<FileFailure>),
    #[error("cannot write {path}: {source} ({} page(s) already written, output is partial)", .written.len())]
    Write {
        path: PathBuf,
        source: io::Error,
        written: Vec<PathBuf>,
    },
    #[error("all {} page(s) written, but manifest {path} could not be written: {source}", .written.len())]
    Manifest {
        path: PathBuf,
        source: io::Error,
        written: Vec<PathBuf>,
    },
}

impl DeployError {
    /// Pages already on disk when the run stopped.
    pub fn written(&self) -> &[PathBuf] {
        match self {
            DeployError::Write { written, .. } | DeployError::Manifest { written, .. } => written,
            _ => &[],
        }
    }
}

/// A content file that could not be parsed.
#[derive(Debug)]
pub struct FileFailure {
    pub file: String,
    pub error: ParseError,
}

impl fmt::Display for FileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.error)
    }
}

/// A content file that parsed successfully.
#[derive(Debug)]
pub struct ParsedFile {
    pub order: u32,
    pub file_name: String,
    pub document: LocaleDocument,
}

/// Everything needed to render, gathered without writing anything.
#[derive(Debug)]
pub struct Prepared {
    pub template: Template,
    pub syntax: ImageSyntax,
    pub files: Vec<ParsedFile>,
    /// Unnumbered files left out of the run.
    pub skipped: Vec<String>,
}

/// One page written by [`deploy`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedPage {
    pub order: u32,
    pub source: String,
    pub output: String,
}

/// Result of a successful run.
#[derive(Debug)]
pub struct DeployReport {
    pub pages: Vec<DeployedPage>,
    pub manifest: Manifest,
    pub manifest_path: PathBuf,
    /// Output file names that replaced an existing file.
    pub overwritten: Vec<String>,
    pub skipped: Vec<String>,
}

/// Load the template, discover and parse every content file. Writes nothing.
pub fn prepare(root: &Path, config: &DeployConfig) -> Result<Prepared, DeployError> {
    let template = load_template(&config.template_path(root))?;
    let syntax = ImageSyntax::new(&config.images.marker);

    let content_dir = config.content_path(root);
    let names = discover(&content_dir)?;
    let ordering = order_files(&names, config.manifest.unnumbered);
    for name in &ordering.skipped {
        warn!("{}: {}; skipping", name, unordered_reason(name));
    }
    check_duplicates(&ordering.ordered)?;

    let mut files = Vec::with_capacity(ordering.ordered.len());
    let mut failures = Vec::new();
    for (order, file_name) in ordering.ordered {
        match parse::parse_content_file(&content_dir.join(&file_name), &syntax) {
            Ok(document) => {
                debug!("Parsed {} ({} images)", file_name, document.images.len());
                files.push(ParsedFile {
                    order,
                    file_name,
                    document,
                });
            }
            Err(error) => {
                warn!("Failed to parse {}: {}", file_name, error);
                failures.push(FileFailure {
                    file: file_name,
                    error,
                });
            }
        }
    }
    if !failures.is_empty() {
        return Err(DeployError::Parse(failures));
    }
    info!("Parsed {} content file(s)", files.len());

    Ok(Prepared {
        template,
        syntax,
        files,
        skipped: ordering.skipped,
    })
}

/// Run the whole pipeline: parse everything, then render and write every
/// page, then write the manifest.
pub fn deploy(root: &Path, config: &DeployConfig) -> Result<DeployReport, DeployError> {
    let output_dir = config.output_path(root);
    let template_dir = config
        .template_path(root)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| root.to_path_buf());
    for dir in [config.content_path(root), template_dir, output_dir.clone()] {
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| DeployError::UnwritableOutput {
                path: dir.clone(),
                source,
            })?;
            info!("Created folder: {}", dir.display());
        }
    }

    let prepared = prepare(root, config)?;
    let image_class = config.images.class.as_str();

    let mut pages = Vec::with_capacity(prepared.files.len());
    let mut written = Vec::with_capacity(prepared.files.len());
    let mut overwritten = Vec::new();
    for file in prepared.files {
        let output = output_file_name(&file.file_name);
        let path = output_dir.join(&output);
        let html = prepared
            .template
            .render(&file.document, &prepared.syntax, image_class);

        let existed = path.exists();
        if let Err(source) = write_atomic(&path, &html) {
            return Err(DeployError::Write {
                path,
                source,
                written,
            });
        }
        info!("Generated {}", output);
        if existed {
            overwritten.push(output.clone());
        }
        written.push(path);
        pages.push(DeployedPage {
            order: file.order,
            source: file.file_name,
            output,
        });
    }

    let sources: Vec<&str> = pages.iter().map(|page| page.source.as_str()).collect();
    let manifest = Manifest::build(&config.manifest.header, &sources, config.manifest.unnumbered);
    let manifest_path = config.manifest_path(root);
    if let Err(source) = write_atomic(&manifest_path, &manifest.to_text()) {
        return Err(DeployError::Manifest {
            path: manifest_path,
            source,
            written,
        });
    }
    info!("Manifest written: {}", manifest_path.display());

    if !overwritten.is_empty() {
        warn!("{} file(s) were overwritten", overwritten.len());
    }

    Ok(DeployReport {
        pages,
        manifest,
        manifest_path,
        overwritten,
        skipped: prepared.skipped,
    })
}

fn load_template(path: &Path) -> Result<Template, DeployError> {
    let source = fs::read_to_string(path).map_err(|source| DeployError::UnreadableInput {
        path: path.to_path_buf(),
        source,
    })?;
    let template = Template::parse(source).map_err(|source| DeployError::Template {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Template loaded: {}", path.display());
    Ok(template)
}

/// File names of all content files in `dir`, sorted.
fn discover(dir: &Path) -> Result<Vec<String>, DeployError> {
    let unreadable = |source| DeployError::UnreadableInput {
        path: dir.to_path_buf(),
        source,
    };
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        if path.is_file() && is_content_file(&path) {
            if let Some(name) = path.file_name() {
                names.push(name.to_string_lossy().into_owned());
            }
        }
    }
    if names.is_empty() {
        return Err(DeployError::NoContent(dir.to_path_buf()));
    }
    names.sort();
    Ok(names)
}

fn is_content_file(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    CONTENT_EXTENSIONS.contains(&ext.as_str())
}

fn check_duplicates(ordered: &[(u32, String)]) -> Result<(), DeployError> {
    let mut groups: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (order, name) in ordered {
        groups.entry(*order).or_default().push(name.clone());
    }
    match groups.into_iter().find(|(_, files)| files.len() > 1) {
        Some((order, files)) => Err(DeployError::DuplicateOrder { order, files }),
        None => Ok(()),
    }
}

/// Write `contents` to `path` via a temp file in the same directory.
fn write_atomic(path: &Path, contents: &str) -> io::Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(contents.as_bytes())?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}
