use std::{
    fs,
    path::Path,
    time::Duration,
};

use proc::{ProcessRunner, RunRequest};
use utils::shell::resolve_executable;

use crate::{
    driver::{CompileResult, CompilerDriver},
    error::CompilerError,
    prelude::PRELUDE_HEADER_NAME,
};

const ENV_VAR: &str = "CLANG_PATH";

#[derive(Debug, Clone, Copy)]
pub struct Clang;

impl CompilerDriver for Clang {
    fn id(&self) -> &'static str {
        "clang"
    }

    fn compile_file(
        &self,
        source: &Path,
        optimization_level: u8,
        prelude_dir: &Path,
    ) -> Result<CompileResult, CompilerError> {
        let clang = resolve_executable("clang++", ENV_VAR)
            .ok_or(CompilerError::ExecutableNotAvailable { variant: "clang", env_var: ENV_VAR })?;

        let cwd = source.parent().unwrap_or_else(|| Path::new("."));
        let output_path = cwd.join(format!(
            "{}.levelup.asm",
            source.file_stem().and_then(|s| s.to_str()).unwrap_or("out")
        ));

        let mut req = RunRequest::new(clang, cwd)
            .args(["-S", "-masm=intel", "-std=c++17"])
            .args(self.get_optimization_flags(optimization_level))
            .arg("-include")
            .arg(prelude_dir.join(PRELUDE_HEADER_NAME).display().to_string())
            .arg(source.display().to_string())
            .arg("-o")
            .arg(output_path.display().to_string());
        req = req.timeout(Duration::from_secs(120));

        let runner = ProcessRunner::new();
        let output = runner.run(&req)?;
        if !output.success() {
            return Ok(CompileResult {
                source_path: source.to_path_buf(),
                asm_text: String::new(),
                diagnostics: output.stderr,
            });
        }

        let asm_text = fs::read_to_string(&output_path).unwrap_or_default();
        Ok(CompileResult {
            source_path: source.to_path_buf(),
            asm_text,
            diagnostics: output.stderr,
        })
    }

    fn get_optimization_flags(&self, optimization_level: u8) -> Vec<String> {
        let level = match optimization_level {
            0 => "0",
            1 => "1",
            2 => "2",
            _ => "3",
        };
        vec![format!("-O{level}")]
    }
}
