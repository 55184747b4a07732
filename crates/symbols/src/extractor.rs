//! Drives an external doxygen-compatible binary to produce the XML symbol
//! dump the table loads. Macro expansion is disabled: the engine reasons
//! about source text as written, not as the preprocessor would see it.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use proc::{ProcessRunner, RunRequest};
use utils::shell::resolve_executable;

use crate::error::SymbolIndexError;

const DOXYGEN_ENV: &str = "DOXYGEN_PATH";
const OUTPUT_DIRNAME: &str = "xml_unexpanded";

/// Invokes the extractor binary against a repository checkout, writing XML
/// output under `{repo_root}/doxygen_output/xml_unexpanded/`.
pub struct Extractor {
    repo_root: PathBuf,
    runner: ProcessRunner,
    timeout: Duration,
}

impl Extractor {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
            runner: ProcessRunner::new(),
            timeout: Duration::from_secs(600),
        }
    }

    pub fn output_dir(&self) -> PathBuf {
        self.repo_root.join("doxygen_output").join(OUTPUT_DIRNAME)
    }

    /// Regenerate the XML dump unconditionally.
    pub fn run(&self) -> Result<PathBuf, SymbolIndexError> {
        let doxygen = resolve_executable("doxygen", DOXYGEN_ENV)
            .ok_or(SymbolIndexError::ExtractorNotAvailable)?;

        let output_dir = self.output_dir();
        fs::create_dir_all(&output_dir)?;

        let doxyfile_path = self.repo_root.join("doxygen_output").join("Doxyfile.levelup");
        fs::write(&doxyfile_path, self.render_doxyfile(&output_dir))?;

        let req = RunRequest::new(doxygen, &self.repo_root)
            .arg(doxyfile_path.display().to_string())
            .timeout(self.timeout);
        let output = self.runner.run(&req)?;
        if !output.success() {
            return Err(SymbolIndexError::ExtractionFailed { stderr: output.stderr });
        }

        Ok(output_dir)
    }

    /// Run the extractor only if the output directory is absent or empty.
    pub fn ensure_generated(&self) -> Result<PathBuf, SymbolIndexError> {
        let output_dir = self.output_dir();
        let already_populated = fs::read_dir(&output_dir)
            .map(|mut entries| entries.next().is_some())
            .unwrap_or(false);
        if already_populated {
            return Ok(output_dir);
        }
        self.run()
    }

    fn render_doxyfile(&self, output_dir: &Path) -> String {
        format!(
            "INPUT = {input}\n\
             RECURSIVE = YES\n\
             GENERATE_XML = YES\n\
             GENERATE_HTML = NO\n\
             GENERATE_LATEX = NO\n\
             XML_OUTPUT = {xml_output}\n\
             MACRO_EXPANSION = NO\n\
             EXPAND_ONLY_PREDEF = NO\n\
             QUIET = YES\n\
             WARN_IF_UNDOCUMENTED = NO\n",
            input = self.repo_root.display(),
            xml_output = output_dir
                .strip_prefix(&self.repo_root)
                .unwrap_or(output_dir)
                .display(),
        )
    }
}
