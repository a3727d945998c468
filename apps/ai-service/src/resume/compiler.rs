//! LaTeX → PDF compilation via an external toolchain subprocess.
//!
//! Each compile gets its own scratch directory, removed on every exit path.

use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, info, warn};

pub const DEFAULT_PROGRAM: &str = "pdflatex";
const SOURCE_FILE: &str = "resume.tex";
const ARTIFACT_FILE: &str = "resume.pdf";
/// Second pass resolves references emitted by the first.
const PASSES: usize = 2;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("LaTeX compilation failed: {log}")]
    CompilationFailed { log: String },

    #[error("PDF file was not generated after successful compilation")]
    ArtifactMissing,

    #[error("Scratch directory I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct LatexCompiler {
    program: String,
    extra_args: Vec<String>,
    scratch_root: Option<PathBuf>,
}

impl LatexCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
            scratch_root: None,
        }
    }

    /// Arguments placed before the fixed `-interaction`/`-output-directory` flags.
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Parent directory for scratch directories. Defaults to the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Compiles `source` and returns the PDF bytes.
    pub async fn compile(&self, source: &str) -> Result<Vec<u8>, CompileError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("latex-");
        let scratch = match &self.scratch_root {
            Some(root) => builder.tempdir_in(root)?,
            None => builder.tempdir()?,
        };
        debug!("LaTeX scratch directory: {}", scratch.path().display());

        let result = self.compile_in(scratch.path(), source).await;

        if let Err(e) = scratch.close() {
            warn!("Failed to remove LaTeX scratch directory: {e}");
        }
        result
    }

    async fn compile_in(&self, dir: &Path, source: &str) -> Result<Vec<u8>, CompileError> {
        let tex_path = dir.join(SOURCE_FILE);
        tokio::fs::write(&tex_path, source).await?;

        let mut output = self.run_pass(dir, &tex_path).await?;
        for pass in 2..=PASSES {
            if !output.status.success() {
                debug!("LaTeX pass {} exited with {}", pass - 1, output.status);
            }
            output = self.run_pass(dir, &tex_path).await?;
        }

        if !output.status.success() {
            return Err(CompileError::CompilationFailed {
                log: self.failure_log(&output),
            });
        }

        match tokio::fs::read(dir.join(ARTIFACT_FILE)).await {
            Ok(pdf) => {
                info!("Compiled LaTeX to PDF ({} bytes)", pdf.len());
                Ok(pdf)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(CompileError::ArtifactMissing),
            Err(e) => Err(CompileError::Io(e)),
        }
    }

    async fn run_pass(&self, dir: &Path, tex_path: &Path) -> Result<Output, CompileError> {
        Command::new(&self.program)
            .args(&self.extra_args)
            .arg("-interaction=nonstopmode")
            .arg("-output-directory")
            .arg(dir)
            .arg(tex_path)
            .current_dir(dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| CompileError::CompilationFailed {
                log: format!("failed to launch {}: {e}", self.program),
            })
    }

    /// Combined stdout and stderr; never empty.
    fn failure_log(&self, output: &Output) -> String {
        let mut log = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            if !log.is_empty() && !log.ends_with('\n') {
                log.push('\n');
            }
            log.push_str(&stderr);
        }

        let log = log.trim();
        if log.is_empty() {
            format!("{} exited with {}", self.program, output.status)
        } else {
            log.to_string()
        }
    }
}
