use super::{HookError, TranslateHook};
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

/// Pipes file text through an external program (stdin -> stdout).
///
/// Used for tools such as HTML minifiers that are not reimplemented here.
pub struct CommandHook {
    name: String,
    program: String,
    args: Vec<String>,
}

impl CommandHook {
    pub fn new(name: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

impl TranslateHook for CommandHook {
    fn name(&self) -> &str {
        &self.name
    }

    fn translate(&self, path: &Path, source: String) -> Result<String, HookError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HookError::Spawn {
                hook: self.name.clone(),
                program: self.program.clone(),
                source,
            })?;

        // Feed stdin from another thread so a chatty child cannot fill its
        // stdout pipe while we are still writing
        let stdin = child.stdin.take();
        let (output, written) = thread::scope(|scope| {
            let writer = scope.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(source.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let written = writer.join().unwrap_or(Ok(()));
            (output, written)
        });
        let output = output.map_err(|source| HookError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        // Broken pipe just means the program stopped reading early
        match written {
            Err(err) if err.kind() != ErrorKind::BrokenPipe => {
                return Err(HookError::Io {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
            _ => {}
        }

        if !output.status.success() {
            return Err(HookError::CommandFailed {
                hook: self.name.clone(),
                path: path.to_path_buf(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
