//! Copy text and open links using whatever the desktop provides.
//!
//! Native helpers are tried in order; when none works the OSC 52 escape is
//! written to a terminal on stderr, which most modern terminals turn into a
//! clipboard write.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::{self, IsTerminal, Write};
use std::process::{Command, Stdio};
use tracing::debug;

const COPY_PROGRAMS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

const OPEN_PROGRAMS: &[&str] = &["open", "xdg-open"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyMethod {
    Program(&'static str),
    Osc52,
    /// Nothing could reach a clipboard; the caller should show the text.
    Unavailable,
}

/// The OSC 52 "set clipboard" escape for `text`.
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text.as_bytes()))
}

fn pipe_to(program: &str, args: &[&str], text: &str) -> io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;
    let written = match child.stdin.take() {
        // Dropping stdin closes it so the helper sees EOF.
        Some(mut stdin) => stdin.write_all(text.as_bytes()),
        None => Ok(()),
    };
    let status = child.wait()?;
    written?;
    Ok(status.success())
}

pub fn copy_text(text: &str) -> io::Result<CopyMethod> {
    if !crate::config::headless() {
        for (program, args) in COPY_PROGRAMS {
            match pipe_to(program, args, text) {
                Ok(true) => return Ok(CopyMethod::Program(*program)),
                Ok(false) => debug!(program, "clipboard helper failed"),
                Err(e) => debug!(program, error = %e, "clipboard helper unavailable"),
            }
        }
    }
    let mut stderr = io::stderr();
    if stderr.is_terminal() {
        stderr.write_all(osc52_sequence(text).as_bytes())?;
        stderr.flush()?;
        return Ok(CopyMethod::Osc52);
    }
    Ok(CopyMethod::Unavailable)
}

/// Hand `url` to the system opener. Returns false when nothing could open it.
pub fn open_link(url: &str) -> bool {
    if crate::config::headless() {
        return false;
    }
    OPEN_PROGRAMS.iter().any(|program| {
        Command::new(program)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .is_ok_and(|s| s.success())
    })
}
