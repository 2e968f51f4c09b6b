//! Prompt Grove: a hierarchical prompt library for the terminal.
//!
//! The binaries are thin wrappers around [`entry`]; everything else is a
//! library module so it can be tested without spawning processes.

pub mod args;
pub mod clipboard;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod formatting;
mod help;
pub mod layout;
pub mod logging;
pub mod node;
pub mod normalize;
pub mod operations;
pub mod pointer;
pub mod render;
pub mod shared;
pub mod store;
pub mod tags;
pub mod tree;
pub mod views;

use crate::args::ArgParser;
use crate::export::Format;
use crate::filter::{CategoryFilter, FilterState};
use crate::formatting::FormatContext;
use crate::layout::{GrowAnimation, NodeAction, Viewport};
use crate::node::Node;
use crate::operations::{confirm, copy_prompt, open_store, prompt_value, require_node};
use crate::shared::table::{Align, render_table};
use crate::store::{BUNDLED_SEED, DirStore, Store};
use crate::tree::{MoveTarget, NodeEdit, Placement};
use crate::views::map::MapOptions;
use chrono::Local;
use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, IsTerminal, Read, Write};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use terminal_size::{Height, Width, terminal_size};
use tracing::{debug, info};

type Grove = Store<DirStore>;

pub fn entry() -> Result<(), Box<dyn Error>> {
    logging::init();
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        return help::run(Vec::new());
    }

    let cmd = args.remove(0);
    if matches!(cmd.as_str(), "help" | "--help" | "-h") {
        return help::run(args);
    }

    let dir = config::grove_dir()?;
    if cmd == "path" {
        println!("{}", dir.display());
        return Ok(());
    }

    let mut store = open_store(&dir)?;
    debug!(command = %cmd, "dispatching");
    match cmd.as_str() {
        "list" | "ls" => list_prompts(args, &store)?,
        "categories" | "cats" => list_categories(args, &store)?,
        "tree" => show_tree(args, &store)?,
        "view" | "show" => view_node(args, &store)?,
        "add" | "new" => add_node(args, &mut store)?,
        "edit" => edit_node(args, &mut store)?,
        "delete" | "rm" => delete_node(args, &mut store)?,
        "favorite" | "fav" => favorite_node(args, &mut store)?,
        "move" | "mv" => move_node(args, &mut store)?,
        "copy" | "cp" => copy_node(args, &store)?,
        "import" => import_file(args, &mut store)?,
        "export" => export_collection(args, &store)?,
        "reset" => reset_collection(args, &mut store)?,
        "map" => draw_map(args, &mut store)?,
        "toggle" => toggle_node(args, &mut store)?,
        "tap" => tap_node(args, &mut store)?,
        "prefs" => preferences(args, &mut store)?,
        other => {
            return Err(format!("Unknown command: {other} (see `grove help`)").into());
        }
    }

    Ok(())
}

/// Width of the attached terminal, if any.
pub(crate) fn terminal_columns() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

fn terminal_rows() -> Option<usize> {
    terminal_size().map(|(_, Height(h))| h as usize)
}

/// Print `lines` to stdout, through `$PAGER` (default `less -FRX`) when they
/// would not fit on an interactive screen.
pub(crate) fn paginate_and_print(lines: &[String]) -> io::Result<()> {
    let stdout = io::stdout();
    let overflows = terminal_rows().is_some_and(|rows| lines.len() + 1 > rows);
    if stdout.is_terminal() && overflows && !config::headless() {
        let pager = env::var("PAGER").unwrap_or_else(|_| "less -FRX".to_string());
        let mut parts = pager.split_whitespace();
        if let Some(program) = parts.next() {
            match Command::new(program).args(parts).stdin(Stdio::piped()).spawn() {
                Ok(mut child) => {
                    if let Some(mut stdin) = child.stdin.take() {
                        for line in lines {
                            if let Err(e) = writeln!(stdin, "{line}") {
                                if e.kind() == io::ErrorKind::BrokenPipe {
                                    break;
                                }
                                return Err(e);
                            }
                        }
                    }
                    child.wait()?;
                    return Ok(());
                }
                Err(e) => debug!(pager = %pager, error = %e, "pager unavailable"),
            }
        }
    }

    let mut out = stdout.lock();
    for line in lines {
        match writeln!(out, "{line}") {
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe => return Ok(()),
            other => other?,
        }
    }
    Ok(())
}

fn single_id(args: Vec<String>, command: &str, usage: &str) -> Result<String, Box<dyn Error>> {
    let mut parser = ArgParser::new(args, command);
    let mut id: Option<String> = None;
    while let Some(arg) = parser.next() {
        if (arg.starts_with('-') && arg != "-") || id.is_some() {
            return Err(parser.unknown(&arg));
        }
        id = Some(arg);
    }
    id.ok_or_else(|| usage.into())
}

fn write_output(out: Option<PathBuf>, text: &str, default_name: &str) -> Result<(), Box<dyn Error>> {
    match out {
        Some(path) => {
            let path = if path.is_dir() { path.join(default_name) } else { path };
            fs::write(&path, text)?;
            println!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            if !text.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }
    Ok(())
}

/// Keep the collapsed set in step with nodes that still exist.
fn prune_collapsed(store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut collapsed = store.collapsed();
    let before = collapsed.len();
    collapsed.retain_existing(store.nodes());
    if collapsed.len() != before {
        store.set_collapsed(&collapsed)?;
    }
    Ok(())
}

fn list_prompts(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "list");
    let mut filter = FilterState::default();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-s" | "--search" => filter.search = parser.extract_value(&arg)?,
            "-c" | "--category" => {
                filter.category = CategoryFilter::parse(&parser.extract_value(&arg)?)
            }
            "-t" | "--tag" => filter.tags.push(parser.extract_tag()?),
            "-f" | "--favorites" => filter.favorites_only = true,
            other if !other.starts_with('-') && filter.search.is_empty() => {
                filter.search = other.to_string()
            }
            other => return Err(parser.unknown(other)),
        }
    }

    let prefs = store.preferences();
    let ctx = FormatContext::from_env(prefs.dark);
    let width = terminal_columns().unwrap_or(100);
    let lines = views::list::render_list(store.nodes(), &filter, &prefs, &ctx, width);
    paginate_and_print(&lines)?;
    Ok(())
}

fn list_categories(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    if let Some(extra) = args.first() {
        return Err(format!("Unexpected argument for categories: {extra}").into());
    }
    let counts = filter::category_counts(store.nodes());
    if counts.is_empty() {
        println!("No categories yet.");
        return Ok(());
    }

    let ctx = FormatContext::from_env(store.preferences().dark);
    let headers = vec![ctx.format_header("Category"), ctx.format_header("Items")];
    let rows: Vec<Vec<String>> = counts
        .iter()
        .map(|(name, n)| vec![name.clone(), n.to_string()])
        .collect();
    let mut lines = render_table(&headers, &rows, &[Align::Left, Align::Right]);

    let stats = filter::stats(store.nodes());
    lines.push(String::new());
    lines.push(ctx.format_muted(&format!(
        "{} items in {} categories, {} favorites",
        stats.items, stats.categories, stats.favorites
    )));
    paginate_and_print(&lines)?;
    Ok(())
}

fn show_tree(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    if let Some(extra) = args.first() {
        return Err(format!("Unexpected argument for tree: {extra}").into());
    }
    let ctx = FormatContext::from_env(store.preferences().dark);
    let lines = views::tree::render_tree(store.nodes(), &store.collapsed(), &ctx);
    paginate_and_print(&lines)?;
    Ok(())
}

fn view_node(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "view");
    let mut id: Option<String> = None;
    let mut render = false;
    let mut plain = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--render" | "-r" => render = true,
            "--plain" => plain = true,
            other if !other.starts_with('-') && id.is_none() => id = Some(other.to_string()),
            other => return Err(parser.unknown(other)),
        }
    }
    let id = id.ok_or("Usage: grove view <id> [--render] [--plain]")?;
    let found = tree::find(store.nodes(), &id).ok_or_else(|| format!("Node {id} not found"))?;
    let node = found.node;
    let use_color = !plain && config::color_enabled();
    let ctx = FormatContext::new(use_color);

    let mut lines = vec![format!("# {} ({})", node.title, node.id)];
    lines.push(format!("Type: {}", node.kind));
    lines.push(format!("Category: {}", filter::category_of(node)));
    if let Some(parent) = found.parent {
        lines.push(format!("Parent: {} ({})", parent.title, parent.id));
    }
    if !node.tags.is_empty() {
        lines.push(format!("Tags: {}", ctx.format_tags(&node.tags)));
    }
    if node.favorite {
        lines.push("Favorite: yes".to_string());
    }
    if let Some(href) = node.href.as_deref().filter(|h| !h.is_empty()) {
        lines.push(format!("Link: {href}"));
    }
    if node.has_children() {
        lines.push(format!("Children: {}", node.children.len()));
    }
    if !node.summary.is_empty() {
        lines.push(format!("Summary: {}", node.summary));
    }
    if !node.prompt.is_empty() {
        lines.push(String::new());
        let body = if render {
            render::render_markdown(&node.prompt, use_color)
        } else {
            node.prompt.clone()
        };
        lines.extend(body.lines().map(str::to_string));
    }
    paginate_and_print(&lines)?;
    Ok(())
}

/// Consume one of the field flags shared by `add` and `edit`. Returns false
/// when `flag` is not one of them.
fn node_flag(flag: &str, parser: &mut ArgParser, edit: &mut NodeEdit) -> Result<bool, Box<dyn Error>> {
    match flag {
        "-p" | "--prompt" => edit.prompt = Some(prompt_value(parser.extract_value(flag)?)?),
        "--summary" => edit.summary = Some(parser.extract_value(flag)?),
        "-t" | "--tag" => {
            let tag = parser.extract_tag()?;
            edit.tags.get_or_insert_with(Vec::new).push(tag);
        }
        "--type" => edit.kind = Some(parser.extract_value(flag)?.trim().to_ascii_lowercase()),
        "--color" => edit.color = Some(parser.extract_value(flag)?),
        "--href" => edit.href = Some(parser.extract_value(flag)?),
        _ => return Ok(false),
    }
    Ok(true)
}

fn add_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "add");
    let mut title: Option<String> = None;
    let mut parent: Option<String> = None;
    let mut category: Option<String> = None;
    let mut edit = NodeEdit::default();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--parent" => parent = Some(parser.extract_value(&arg)?),
            "--category" | "-c" => category = Some(parser.extract_value(&arg)?),
            "--favorite" => edit.favorite = Some(true),
            flag if node_flag(flag, &mut parser, &mut edit)? => {}
            other if !other.starts_with('-') && title.is_none() => title = Some(other.to_string()),
            other => return Err(parser.unknown(other)),
        }
    }
    let title = title.ok_or("Usage: grove add <title> [--parent <id>] [--category <name>] [options]")?;
    if parent.is_some() && category.is_some() {
        return Err("Use either --parent or --category, not both".into());
    }

    let id = store.mutate(|forest| -> Result<String, error::GroveError> {
        let mut node = Node::new("", title);
        edit.apply(&mut node)?;
        let id = tree::insert(forest, node, parent.as_deref())?;
        if let Some(name) = category.filter(|c| !c.trim().is_empty()) {
            tree::move_node(forest, &id, &MoveTarget::Category(name.trim().to_string()), &Placement::End)?;
        }
        Ok(id)
    })?;
    info!(id = %id, "node added");
    println!("{id}");
    Ok(())
}

fn edit_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "edit");
    let mut id: Option<String> = None;
    let mut edit = NodeEdit::default();
    let mut clear_tags = false;
    let mut changed = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--title" => {
                edit.title = Some(parser.extract_value(&arg)?);
                changed = true;
            }
            "--clear-tags" => {
                clear_tags = true;
                changed = true;
            }
            flag if node_flag(flag, &mut parser, &mut edit)? => changed = true,
            other if !other.starts_with('-') && id.is_none() => id = Some(other.to_string()),
            other => return Err(parser.unknown(other)),
        }
    }
    let id = id.ok_or("Usage: grove edit <id> [--title <text>] [options]")?;
    if !changed {
        return Err(format!("Nothing to change for {id}; see `grove help edit`").into());
    }
    if clear_tags && edit.tags.is_none() {
        edit.tags = Some(Vec::new());
    }

    store.mutate(|forest| tree::update_node(forest, &id, edit).map_err(error::GroveError::from))?;
    info!(id = %id, "node edited");
    println!("Updated {id}");
    Ok(())
}

fn delete_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "delete");
    let mut id: Option<String> = None;
    let mut yes = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-y" | "--yes" => yes = true,
            other if !other.starts_with('-') && id.is_none() => id = Some(other.to_string()),
            other => return Err(parser.unknown(other)),
        }
    }
    let id = id.ok_or("Usage: grove delete <id> [--yes]")?;
    let node = require_node(store.nodes(), &id)?;
    let descendants = tree::count(&node.children);
    let question = match descendants {
        0 => format!("Delete \"{}\"?", node.title),
        1 => format!("Delete \"{}\" and 1 node under it?", node.title),
        n => format!("Delete \"{}\" and {n} nodes under it?", node.title),
    };
    if !yes && !confirm(&question)? {
        println!("Canceled.");
        return Ok(());
    }

    let removed = store.mutate(|forest| tree::delete_subtree(forest, &id).map_err(error::GroveError::from))?;
    prune_collapsed(store)?;
    let total = tree::count(std::slice::from_ref(&removed));
    info!(id = %id, removed = total, "subtree deleted");
    if total == 1 {
        println!("Deleted {id}");
    } else {
        println!("Deleted {id} and {} nodes under it", total - 1);
    }
    Ok(())
}

fn favorite_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let id = single_id(args, "favorite", "Usage: grove favorite <id>")?;
    let now = store.mutate(|forest| tree::toggle_favorite(forest, &id).map_err(error::GroveError::from))?;
    let title = require_node(store.nodes(), &id)?.title.clone();
    if now {
        println!("★ Favorited {title}");
    } else {
        println!("Unfavorited {title}");
    }
    Ok(())
}

fn move_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "move");
    let mut id: Option<String> = None;
    let mut target: Option<MoveTarget> = None;
    let mut placement = Placement::End;
    while let Some(arg) = parser.next() {
        let next_target = match arg.as_str() {
            "--category" | "-c" => Some(MoveTarget::Category(parser.extract_value(&arg)?)),
            "--parent" => Some(MoveTarget::Parent(parser.extract_value(&arg)?)),
            "--root" => Some(MoveTarget::Root),
            "--before" => {
                placement = Placement::Before(parser.extract_value(&arg)?);
                None
            }
            "--after" => {
                placement = Placement::After(parser.extract_value(&arg)?);
                None
            }
            other if !other.starts_with('-') && id.is_none() => {
                id = Some(other.to_string());
                None
            }
            other => return Err(parser.unknown(other)),
        };
        if let Some(t) = next_target {
            if target.is_some() {
                return Err("Give exactly one of --category, --parent or --root".into());
            }
            target = Some(t);
        }
    }
    let usage = "Usage: grove move <id> (--category <name>|--parent <id>|--root) [--before <ref>|--after <ref>]";
    let id = id.ok_or(usage)?;
    let target = target.ok_or(usage)?;

    store.mutate(|forest| {
        tree::move_node(forest, &id, &target, &placement).map_err(error::GroveError::from)
    })?;
    info!(id = %id, ?target, "node moved");
    println!("Moved {id}");
    Ok(())
}

fn copy_node(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    let id = single_id(args, "copy", "Usage: grove copy <id>")?;
    copy_prompt(require_node(store.nodes(), &id)?)
}

fn import_file(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let path = single_id(args, "import", "Usage: grove import <file|->")?;
    let ticket = store.begin_request();
    let text = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        text
    } else {
        fs::read_to_string(&path).map_err(|e| format!("Could not read {path}: {e}"))?
    };
    let forest = normalize::parse_document(&text)
        .map_err(|e| format!("Import failed: {e}. The collection was not changed."))?;
    let imported = tree::count(&forest);

    if !store.complete(ticket, forest)? {
        println!("A newer load finished first; import discarded.");
        return Ok(());
    }
    prune_collapsed(store)?;
    info!(nodes = imported, path = %path, "collection imported");
    println!("Imported {imported} nodes");
    Ok(())
}

fn export_collection(args: Vec<String>, store: &Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "export");
    let mut format: Option<Format> = None;
    let mut out: Option<PathBuf> = None;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-o" | "--out" => out = Some(PathBuf::from(parser.extract_value(&arg)?)),
            other if !other.starts_with('-') && format.is_none() => format = Some(other.parse()?),
            other => return Err(parser.unknown(other)),
        }
    }
    let format = format.unwrap_or(Format::Json);
    let text = export::export(store.nodes(), format, Local::now().fixed_offset())?;
    write_output(out, &text, format.file_name())
}

fn reset_collection(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "reset");
    let mut yes = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-y" | "--yes" => yes = true,
            other => return Err(parser.unknown(other)),
        }
    }
    if !yes && !confirm("Replace the whole collection with the default set?")? {
        println!("Canceled.");
        return Ok(());
    }
    store.reset_to_seed(BUNDLED_SEED)?;
    println!("Collection reset ({} nodes)", tree::count(store.nodes()));
    Ok(())
}

fn parse_pan(raw: &str) -> Result<(f64, f64), Box<dyn Error>> {
    let invalid = || format!("Expected --pan <x,y>, got {raw}");
    let (x, y) = raw.split_once(',').ok_or_else(invalid)?;
    let x = x.trim().parse::<f64>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f64>().map_err(|_| invalid())?;
    Ok((x, y))
}

fn draw_map(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "map");
    let mut out: Option<PathBuf> = None;
    let mut animate = false;
    let mut fold: Option<bool> = None;
    let mut viewport = Viewport::default();
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "-o" | "--out" => out = Some(PathBuf::from(parser.extract_value(&arg)?)),
            "--animate" => animate = true,
            "--expand-all" | "--collapse-all" => {
                let collapse = arg == "--collapse-all";
                if fold.is_some_and(|f| f != collapse) {
                    return Err("Use only one of --expand-all and --collapse-all".into());
                }
                fold = Some(collapse);
            }
            "--zoom" => {
                let raw = parser.extract_value(&arg)?;
                let scale = raw
                    .parse::<f64>()
                    .map_err(|_| format!("Expected a number after --zoom, got {raw}"))?;
                viewport.set_scale(scale);
            }
            "--pan" => {
                let (x, y) = parse_pan(&parser.extract_value(&arg)?)?;
                viewport.pan(x, y);
            }
            other => return Err(parser.unknown(other)),
        }
    }

    let mut collapsed = store.collapsed();
    match fold {
        Some(true) => collapsed.collapse_all(store.nodes()),
        Some(false) => collapsed.expand_all(),
        None => {}
    }
    if fold.is_some() {
        store.set_collapsed(&collapsed)?;
    }

    let opts = MapOptions {
        viewport,
        animate: animate.then(GrowAnimation::default),
        dark: store.preferences().dark,
    };
    let map = layout::layout(store.nodes(), &collapsed);
    let svg = views::map::render_svg(&map, &opts);
    write_output(out, &svg, "prompt_grove.svg")
}

fn flip_collapsed(store: &mut Grove, node: &Node) -> Result<(), Box<dyn Error>> {
    let mut collapsed = store.collapsed();
    let now = collapsed.toggle(&node.id);
    store.set_collapsed(&collapsed)?;
    if now {
        println!("Collapsed {} (+{})", node.title, tree::count(&node.children));
    } else {
        println!("Expanded {}", node.title);
    }
    Ok(())
}

fn toggle_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let id = single_id(args, "toggle", "Usage: grove toggle <id>")?;
    let node = require_node(store.nodes(), &id)?.clone();
    if !node.has_children() {
        return Err(format!("Node {id} has nothing to collapse").into());
    }
    flip_collapsed(store, &node)
}

fn tap_node(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let id = single_id(args, "tap", "Usage: grove tap <id>")?;
    let node = require_node(store.nodes(), &id)?.clone();
    match layout::tap(&node) {
        NodeAction::Toggle(_) => flip_collapsed(store, &node)?,
        NodeAction::Open(href) => {
            if clipboard::open_link(&href) {
                println!("Opened {href}");
            } else {
                println!("{href}");
            }
        }
        NodeAction::Copy(_) => copy_prompt(&node)?,
        NodeAction::Info(what) => println!("{}: {what}", node.title),
    }
    Ok(())
}

fn on_off(value: bool) -> &'static str {
    if value { "on" } else { "off" }
}

fn preferences(args: Vec<String>, store: &mut Grove) -> Result<(), Box<dyn Error>> {
    let mut parser = ArgParser::new(args, "prefs");
    let mut prefs = store.preferences();
    let mut changed = false;
    while let Some(arg) = parser.next() {
        match arg.as_str() {
            "--summaries" => prefs.show_summaries = parser.extract_switch(&arg)?,
            "--compact" => prefs.compact = parser.extract_switch(&arg)?,
            "--dark" => prefs.dark = parser.extract_switch(&arg)?,
            other => return Err(parser.unknown(other)),
        }
        changed = true;
    }
    if changed {
        store.set_preferences(&prefs)?;
    }
    println!("summaries: {}", on_off(prefs.show_summaries));
    println!("compact:   {}", on_off(prefs.compact));
    println!("dark:      {}", on_off(prefs.dark));
    Ok(())
}
