use crate::core::ranker::Matcher;
use crate::error::{Error, Result};
use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use tracing::debug;

/// Lets the user pick candidates interactively with `fzf`.
///
/// Every line handed to fzf is prefixed with the candidate's position and a
/// tab, which fzf hides and echoes back, so selections map to candidates
/// even when two of them read the same.
pub struct FzfSelector {
    program: String,
}

impl FzfSelector {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into() }
    }

    fn args(&self, query: &str) -> Vec<String> {
        let mut args = vec![
            "--style=minimal".to_string(),
            "--multi".to_string(),
            "--cycle".to_string(),
            "--delimiter=\t".to_string(),
            "--with-nth=2..".to_string(),
        ];
        if !query.is_empty() {
            // Select everything matching the query without showing the UI.
            args.push("--bind=load:toggle-all+accept".to_string());
            args.push(format!("--query={}", query));
        }
        args
    }
}

fn input_lines(candidates: &[String]) -> String {
    candidates
        .iter()
        .enumerate()
        .map(|(i, text)| format!("{}\t{}", i, text.replace(['\n', '\r'], " ")))
        .collect::<Vec<_>>()
        .join("\n")
}

fn parse_selection(output: &str) -> Vec<usize> {
    output
        .lines()
        .filter_map(|line| line.split_once('\t')?.0.parse().ok())
        .collect()
}

impl Matcher for FzfSelector {
    fn select(&self, query: &str, candidates: &[String]) -> Result<Vec<usize>> {
        let mut child = Command::new(&self.program)
            .args(self.args(query))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| Error::Selector(format!("could not start {}: {}", self.program, e)))?;

        // fzf may exit before reading everything, e.g. when accepting early.
        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input_lines(candidates).as_bytes()) {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("{} stopped reading its input", self.program);
                }
                Err(e) => {
                    drop(stdin);
                    let _ = child.wait();
                    return Err(e.into());
                }
            }
        }

        let output = child.wait_with_output()?;
        match output.status.code() {
            Some(0) => {}
            // 1: nothing matched, 130: the user backed out.
            Some(1) | Some(130) => {
                debug!("fzf exited with {}, nothing selected", output.status);
                return Ok(Vec::new());
            }
            _ => return Err(Error::Selector(format!("{} exited with {}", self.program, output.status))),
        }

        let selected = parse_selection(&String::from_utf8_lossy(&output.stdout));
        debug!("fzf selected {} of {} candidates", selected.len(), candidates.len());
        Ok(selected)
    }
}
