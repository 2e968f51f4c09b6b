//! Helpers shared by the command handlers.

use crate::clipboard::{self, CopyMethod};
use crate::node::Node;
use crate::store::{BUNDLED_SEED, DirStore, Store};
use std::error::Error;
use std::io::{self, BufRead, IsTerminal, Read, Write};
use std::path::Path;
use tracing::debug;
use yansi::Paint;

/// Open the collection in `dir`, printing any load notices as warnings.
pub fn open_store(dir: &Path) -> Result<Store<DirStore>, Box<dyn Error>> {
    let mut store = Store::new(DirStore::new(dir));
    let outcome = store.load(BUNDLED_SEED)?;
    debug!(source = ?outcome.source, dir = %dir.display(), "collection opened");
    for notice in &outcome.notices {
        let label = if crate::config::color_enabled() {
            Paint::yellow("Warning:").bold().to_string()
        } else {
            "Warning:".to_string()
        };
        eprintln!("{label} {notice}");
    }
    Ok(store)
}

/// Look up a node by id or fail with a user-facing message.
pub fn require_node<'a>(forest: &'a [Node], id: &str) -> Result<&'a Node, Box<dyn Error>> {
    crate::tree::find(forest, id)
        .map(|found| found.node)
        .ok_or_else(|| format!("Node {id} not found").into())
}

/// Ask a yes/no question on stderr; anything but y/yes is a no.
pub fn confirm(question: &str) -> Result<bool, Box<dyn Error>> {
    let mut stderr = io::stderr();
    write!(stderr, "{question} [y/N] ")?;
    stderr.flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// `-` reads the whole of stdin, anything else is taken literally.
pub fn prompt_value(raw: String) -> Result<String, Box<dyn Error>> {
    if raw != "-" {
        return Ok(raw);
    }
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Err("Refusing to read a prompt from an interactive terminal; pipe it in".into());
    }
    let mut text = String::new();
    stdin.lock().read_to_string(&mut text)?;
    Ok(text.trim_end_matches(['\n', '\r']).to_string())
}

/// Put a node's prompt on the clipboard, or print it when that is impossible.
pub fn copy_prompt(node: &Node) -> Result<(), Box<dyn Error>> {
    if node.prompt.is_empty() {
        return Err(format!("Node {} has no prompt to copy", node.id).into());
    }
    match clipboard::copy_text(&node.prompt)? {
        CopyMethod::Program(program) => println!("Copied \"{}\" via {program}", node.title),
        CopyMethod::Osc52 => println!("Copied \"{}\" via terminal", node.title),
        CopyMethod::Unavailable => {
            eprintln!("No clipboard available; printing the prompt instead.");
            println!("{}", node.prompt);
        }
    }
    Ok(())
}
