//! Recording fakes for the process and upstream seams

use crate::error::{MixpodError, MixpodResult};
use crate::orchestration::{ProcessOutput, ProcessRunner};
use crate::upstream::UpstreamSource;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Process runner answering like a docker CLI, recording every invocation
#[derive(Default)]
pub struct FakeProcess {
    calls: Mutex<Vec<Vec<String>>>,
    images_output: String,
    build_failure: Option<String>,
    run_code: i32,
    binary_missing: bool,
}

impl FakeProcess {
    pub fn new() -> Self {
        Self::default()
    }

    /// Output of `images -q`; non-empty means the image exists
    pub fn with_images_output(mut self, output: &str) -> Self {
        self.images_output = output.to_string();
        self
    }

    pub fn with_build_failure(mut self, stderr: &str) -> Self {
        self.build_failure = Some(stderr.to_string());
        self
    }

    pub fn with_run_code(mut self, code: i32) -> Self {
        self.run_code = code;
        self
    }

    pub fn without_binary(mut self) -> Self {
        self.binary_missing = true;
        self
    }

    /// Every invocation as `[program, args...]`
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().unwrap().clone()
    }

    /// Invocations whose first argument is `subcommand`
    pub fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.get(1).map(String::as_str) == Some(subcommand))
            .collect()
    }

    fn record(&self, program: &str, args: &[String]) -> MixpodResult<()> {
        let mut call = vec![program.to_string()];
        call.extend(args.iter().cloned());
        self.calls.lock().unwrap().push(call);

        if self.binary_missing {
            return Err(MixpodError::RuntimeNotFound {
                program: program.to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl ProcessRunner for FakeProcess {
    async fn output(&self, program: &str, args: &[String]) -> MixpodResult<ProcessOutput> {
        self.record(program, args)?;

        let output = match args.first().map(String::as_str) {
            Some("images") => ProcessOutput {
                code: Some(0),
                stdout: self.images_output.clone(),
                ..Default::default()
            },
            Some("build") => match &self.build_failure {
                Some(stderr) => ProcessOutput {
                    code: Some(1),
                    stderr: stderr.clone(),
                    ..Default::default()
                },
                None => ProcessOutput {
                    code: Some(0),
                    ..Default::default()
                },
            },
            _ => ProcessOutput {
                code: Some(0),
                ..Default::default()
            },
        };
        Ok(output)
    }

    async fn status(&self, program: &str, args: &[String]) -> MixpodResult<i32> {
        self.record(program, args)?;
        Ok(self.run_code)
    }
}

/// Upstream serving fixed content, recording what was requested
#[derive(Default)]
pub struct FakeUpstream {
    texts: HashMap<String, String>,
    files: HashMap<String, Vec<u8>>,
    text_calls: Mutex<Vec<String>>,
    file_calls: Mutex<Vec<String>>,
}

impl FakeUpstream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, remote_path: &str, content: &str) -> Self {
        self.texts
            .insert(remote_path.to_string(), content.trim().to_string());
        self
    }

    pub fn with_file(mut self, remote_path: &str, content: &[u8]) -> Self {
        self.files.insert(remote_path.to_string(), content.to_vec());
        self
    }

    /// Paths requested through `fetch_to_file`
    pub fn file_calls(&self) -> Vec<String> {
        self.file_calls.lock().unwrap().clone()
    }

    /// Paths requested through `fetch_text`
    pub fn text_calls(&self) -> Vec<String> {
        self.text_calls.lock().unwrap().clone()
    }

    fn not_found(remote_path: &str) -> MixpodError {
        MixpodError::UpstreamFetch {
            url: remote_path.to_string(),
            reason: "http status: 404".to_string(),
        }
    }
}

#[async_trait]
impl UpstreamSource for FakeUpstream {
    async fn fetch_text(&self, remote_path: &str) -> MixpodResult<String> {
        self.text_calls.lock().unwrap().push(remote_path.to_string());
        self.texts
            .get(remote_path)
            .cloned()
            .ok_or_else(|| Self::not_found(remote_path))
    }

    async fn fetch_to_file(&self, remote_path: &str, dest: &Path) -> MixpodResult<()> {
        self.file_calls.lock().unwrap().push(remote_path.to_string());
        let content = self
            .files
            .get(remote_path)
            .ok_or_else(|| Self::not_found(remote_path))?;
        std::fs::write(dest, content)
            .map_err(|e| MixpodError::io(format!("writing {}", dest.display()), e))
    }
}
