use std::{fs, path::Path, time::Duration};

use proc::{ProcessRunner, RunRequest};
use utils::shell::resolve_executable;

use crate::{
    driver::{CompileResult, CompilerDriver},
    error::CompilerError,
    prelude::PRELUDE_HEADER_NAME,
};

const ENV_VAR: &str = "MSVC_PATH";

#[derive(Debug, Clone, Copy)]
pub struct Msvc;

impl CompilerDriver for Msvc {
    fn id(&self) -> &'static str {
        "msvc"
    }

    fn compile_file(
        &self,
        source: &Path,
        optimization_level: u8,
        prelude_dir: &Path,
    ) -> Result<CompileResult, CompilerError> {
        let cl = resolve_executable("cl.exe", ENV_VAR)
            .ok_or(CompilerError::ExecutableNotAvailable { variant: "msvc", env_var: ENV_VAR })?;

        let cwd = source.parent().unwrap_or_else(|| Path::new("."));
        let asm_path = cwd.join(format!(
            "{}.levelup.asm",
            source.file_stem().and_then(|s| s.to_str()).unwrap_or("out")
        ));

        let mut req = RunRequest::new(cl, cwd)
            .args(["/c", "/EHsc", "/nologo"])
            .args(self.get_optimization_flags(optimization_level))
            .arg("/FI")
            .arg(prelude_dir.join(PRELUDE_HEADER_NAME).display().to_string())
            .arg("/FAs")
            .arg(format!("/Fa{}", asm_path.display()))
            .arg(source.display().to_string());
        req = req.timeout(Duration::from_secs(120));

        let runner = ProcessRunner::new();
        let output = runner.run(&req)?;
        if !output.success() {
            return Ok(CompileResult {
                source_path: source.to_path_buf(),
                asm_text: String::new(),
                diagnostics: output.stdout + &output.stderr,
            });
        }

        let asm_text = fs::read_to_string(&asm_path).unwrap_or_default();
        Ok(CompileResult {
            source_path: source.to_path_buf(),
            asm_text,
            diagnostics: output.stdout,
        })
    }

    fn get_optimization_flags(&self, optimization_level: u8) -> Vec<String> {
        // MSVC has no direct -O1 analog; collapse 1 into /O2 per the spec's
        // "levels with no direct analog map to 2" rule.
        match optimization_level {
            0 => vec!["/Od".to_string()],
            3 => vec!["/Ox".to_string()],
            _ => vec!["/O2".to_string()],
        }
    }
}
