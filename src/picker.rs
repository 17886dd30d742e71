use std::io::{ErrorKind, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::{Result, SelectorError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerResponse {
    pub exit_code: i32,
    pub raw_text: Option<String>,
}

impl PickerResponse {
    pub fn is_cancelled(&self) -> bool {
        self.exit_code != 0
    }
}

/// Talks to a dmenu-style picker (rofi by default): candidates go in on
/// stdin, the chosen line comes back on stdout.
#[derive(Debug, Clone)]
pub struct PickerClient {
    program: String,
    leading_args: Vec<String>,
    theme: PathBuf,
}

impl PickerClient {
    /// `theme` is the `.rasi` file every menu is drawn with; a per-call
    /// theme string is layered on top of it.
    pub fn new(program: impl Into<String>, theme: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            theme: theme.into(),
        }
    }

    /// Builds a client from an argv list such as `["rofi"]`.
    pub fn from_command(command: &[String], theme: impl Into<PathBuf>) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| SelectorError::InvalidConfig("picker command is empty".to_owned()))?;

        Ok(Self::new(program.as_str(), theme).with_args(args.iter().cloned()))
    }

    /// Arguments placed before the picker's own flags.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self, title: &str, theme_override: Option<&str>) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args);
        cmd.args(["-dmenu", "-i", "-p", title]);
        cmd.arg("-theme").arg(&self.theme);

        if let Some(theme_str) = theme_override {
            cmd.args(["-theme-str", theme_str]);
        }
        cmd
    }

    /// Blocks until the picker exits. A non-zero exit is a normal cancel; only
    /// a picker that can't be started or dies from a signal is an error.
    pub fn run(&self, title: &str, entries: &[String], theme_override: Option<&str>) -> Result<PickerResponse> {
        let mut child = self
            .command(title, theme_override)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .spawn()
            .map_err(|e| SelectorError::PickerLaunch(format!("{}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            // A picker may exit before reading everything, which is fine.
            if let Err(e) = stdin.write_all(entries.join("\n").as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(SelectorError::PickerLaunch(format!("{}: {}", self.program, e)));
                }
            }
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SelectorError::PickerLaunch(format!("{}: {}", self.program, e)))?;

        let exit_code = output.status.code().ok_or_else(|| {
            SelectorError::PickerLaunch(format!("{} was terminated by a signal", self.program))
        })?;

        Ok(PickerResponse {
            exit_code,
            raw_text: parse_selection(&String::from_utf8_lossy(&output.stdout)),
        })
    }
}

/// Label of the chosen line: the first line, cut at the first NUL, trimmed.
pub fn parse_selection(stdout: &str) -> Option<String> {
    let line = stdout.trim().lines().next()?;
    let label = line.split('\0').next().unwrap_or_default().trim();
    if label.is_empty() {
        None
    } else {
        Some(label.to_owned())
    }
}
