#![allow(deprecated)]

use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn cmd(temp: &TempDir) -> assert_cmd::Command {
    let mut c = assert_cmd::Command::cargo_bin("prompt_grove").unwrap();
    c.env("GROVE_DIR", temp.path())
        .env("NO_COLOR", "1")
        .env("GROVE_HEADLESS", "1")
        .env_remove("GROVE_LOG");
    c
}

fn stdout_of(temp: &TempDir, args: &[&str]) -> String {
    let out = cmd(temp).args(args).assert().success().get_output().stdout.clone();
    String::from_utf8_lossy(&out).to_string()
}

fn add(temp: &TempDir, args: &[&str]) -> String {
    let mut full = vec!["add"];
    full.extend_from_slice(args);
    stdout_of(temp, &full).trim().to_string()
}

fn nodes_file(dir: &Path) -> std::path::PathBuf {
    dir.join("grove.nodes.v1.json")
}

#[test]
fn path_and_help() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("path")
        .assert()
        .success()
        .stdout(predicate::str::contains(temp.path().to_string_lossy().to_string()));

    cmd(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("usage: grove"))
        .stdout(predicate::str::contains("Commands"));

    cmd(&temp)
        .args(["help", "mv"])
        .assert()
        .success()
        .stdout(predicate::str::contains("move: "))
        .stdout(predicate::str::contains("--before"));
}

#[test]
fn unknown_command_fails() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .arg("frobnicate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown command: frobnicate"));
}

#[test]
fn first_run_lists_seed_by_category() {
    let temp = TempDir::new().unwrap();
    let out = stdout_of(&temp, &["list"]);
    assert!(out.contains("Writing (2)"), "{out}");
    assert!(out.contains("System Dev (3)"), "{out}");
    assert!(out.contains("seed-summarize Summarize a document"));
    assert!(out.contains("Condense long text into key points"));
    // Groups are headings, not items.
    assert!(!out.contains("seed-writing"));
    assert!(nodes_file(temp.path()).exists());
}

#[test]
fn list_filters_by_tag_search_and_category() {
    let temp = TempDir::new().unwrap();
    let out = stdout_of(&temp, &["list", "-t", "#urgent"]);
    assert!(out.contains("seed-incident"));
    assert!(!out.contains("seed-summarize"));

    // Tags are inherited from ancestor groups.
    let out = stdout_of(&temp, &["list", "-t", "infra"]);
    assert!(out.contains("seed-incident"));
    assert!(out.contains("seed-runbook"));
    assert!(!out.contains("seed-review"));

    let out = stdout_of(&temp, &["ls", "-s", "DIFF"]);
    assert!(out.contains("seed-review"));
    assert!(!out.contains("seed-tone"));

    let out = stdout_of(&temp, &["list", "-c", "Writing"]);
    assert!(out.contains("seed-tone"));
    assert!(!out.contains("seed-review"));

    let out = stdout_of(&temp, &["list", "-s", "nothing-like-this"]);
    assert!(out.contains("No prompts match the current filters."));
}

#[test]
fn compact_preference_hides_summaries() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["prefs", "--compact", "on"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compact:   on"));
    cmd(&temp)
        .arg("prefs")
        .assert()
        .success()
        .stdout(predicate::str::contains("compact:   on"))
        .stdout(predicate::str::contains("summaries: on"));
    let out = stdout_of(&temp, &["list"]);
    assert!(!out.contains("Condense long text"));
    assert!(!out.contains("\n\n"));

    cmd(&temp)
        .args(["prefs", "--dark", "sometimes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("sometimes"));
}

#[test]
fn add_view_edit_delete() {
    let temp = TempDir::new().unwrap();
    let id = add(
        &temp,
        &["Explain a trace", "-p", "Explain this **trace**", "--category", "Debugging", "-t", "rust"],
    );
    assert!(!id.is_empty());

    cmd(&temp)
        .args(["view", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("# Explain a trace ({id})")))
        .stdout(predicate::str::contains("Category: Debugging"))
        .stdout(predicate::str::contains("Tags: #rust"))
        .stdout(predicate::str::contains("Explain this **trace**"));

    cmd(&temp)
        .args(["view", &id, "--render", "--plain"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Explain this trace"));

    cmd(&temp)
        .args(["edit", &id, "--summary", "Short", "--clear-tags", "--title", "Explain a stack trace"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated {id}")));
    let view = stdout_of(&temp, &["show", &id]);
    assert!(view.contains("# Explain a stack trace"));
    assert!(view.contains("Summary: Short"));
    assert!(!view.contains("Tags:"));

    cmd(&temp)
        .args(["edit", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));

    cmd(&temp)
        .args(["delete", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Deleted {id}")));
    cmd(&temp)
        .args(["view", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn add_reads_prompt_from_stdin_and_unknown_parent_means_root() {
    let temp = TempDir::new().unwrap();
    let id = stdout_of_with_stdin(&temp, &["add", "Piped", "-p", "-", "--parent", "nope"], "hello from stdin\n");
    let view = stdout_of(&temp, &["view", &id]);
    assert!(view.contains("hello from stdin"));
    assert!(!view.contains("Parent:"));
    assert!(view.contains("Category: Unsorted"));
}

fn stdout_of_with_stdin(temp: &TempDir, args: &[&str], input: &str) -> String {
    let out = cmd(temp)
        .args(args)
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    String::from_utf8_lossy(&out).trim().to_string()
}

#[test]
fn add_rejects_empty_title() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["add", "   "])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title must not be empty"));
}

#[test]
fn delete_asks_before_removing_a_subtree() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["delete", "seed-writing"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Canceled."))
        .stderr(predicate::str::contains("and 2 nodes under it? [y/N]"));
    assert!(stdout_of(&temp, &["list"]).contains("seed-summarize"));

    cmd(&temp)
        .args(["rm", "seed-writing"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted seed-writing and 2 nodes under it"));
    let out = stdout_of(&temp, &["list"]);
    assert!(!out.contains("seed-summarize"));
    assert!(!out.contains("seed-tone"));
}

#[test]
fn move_under_parent_and_reject_cycles() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["move", "seed-tone", "--parent", "seed-infra", "--before", "seed-incident"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Moved seed-tone"));
    let view = stdout_of(&temp, &["view", "seed-tone"]);
    assert!(view.contains("Parent: Infrastructure (seed-infra)"));
    assert!(view.contains("Category: System Dev"));

    let tree = stdout_of(&temp, &["tree"]);
    let tone = tree.find("Adjust tone").unwrap();
    let incident = tree.find("Incident timeline").unwrap();
    assert!(tone < incident);

    cmd(&temp)
        .args(["move", "seed-dev", "--parent", "seed-incident"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("own subtree"));
    assert!(stdout_of(&temp, &["view", "seed-dev"]).contains("Children: 2"));

    cmd(&temp)
        .args(["move", "seed-tone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage: grove move"));
}

#[test]
fn move_to_new_category_creates_group() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["mv", "seed-tone", "--category", "Misc"])
        .assert()
        .success();
    assert!(stdout_of(&temp, &["view", "seed-tone"]).contains("Category: Misc"));
    let cats = stdout_of(&temp, &["categories"]);
    assert!(cats.contains("Misc"));
    assert!(cats.contains("5 items in 3 categories, 0 favorites"));
}

#[test]
fn added_group_is_its_own_category() {
    let temp = TempDir::new().unwrap();
    stdout_of_with_stdin(&temp, &["import", "-"], "[]");
    let ops = add(&temp, &["Ops", "--type", "group"]);
    let disk = add(&temp, &["Disk", "--parent", &ops, "--prompt", "df -h"]);
    let loose = add(&temp, &["Loose", "--prompt", "x"]);

    let view = stdout_of(&temp, &["view", &ops]);
    assert!(view.contains("Type: group"));
    assert!(view.contains("Category: Ops"));
    assert!(stdout_of(&temp, &["view", &disk]).contains("Category: Ops"));
    assert!(stdout_of(&temp, &["view", &loose]).contains("Category: Unsorted"));

    cmd(&temp)
        .args(["move", &loose, "--category", "Unsorted"])
        .assert()
        .success();
    let view = stdout_of(&temp, &["view", &loose]);
    assert!(view.contains("Category: Unsorted"));
    assert!(!view.contains(&format!("({ops})")));
    assert!(stdout_of(&temp, &["view", &ops]).contains("Children: 1"));
}

#[test]
fn categories_table_counts_items() {
    let temp = TempDir::new().unwrap();
    let out = stdout_of(&temp, &["cats"]);
    assert!(out.contains("Category"));
    assert!(out.contains("Items"));
    assert!(out.lines().any(|l| l.starts_with("System Dev") && l.trim_end().ends_with('3')));
    assert!(out.lines().any(|l| l.starts_with("Writing") && l.trim_end().ends_with('2')));
    assert!(out.contains("5 items in 2 categories, 0 favorites"));
}

#[test]
fn favorite_toggles_and_filters() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["fav", "seed-tone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Favorited Adjust tone"));
    let out = stdout_of(&temp, &["list", "--favorites"]);
    assert!(out.contains("★ seed-tone"));
    assert!(!out.contains("seed-summarize"));

    cmd(&temp)
        .args(["favorite", "seed-tone"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Unfavorited Adjust tone"));
}

#[test]
fn copy_prints_prompt_without_clipboard() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["copy", "seed-summarize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarize the following text"));
    cmd(&temp)
        .args(["cp", "seed-writing"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no prompt"));
}

#[test]
fn export_then_import_round_trips() {
    let temp = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let json = out.path().join("grove.json");
    let json_arg = json.to_string_lossy().to_string();

    cmd(&temp)
        .args(["export", "json", "-o", &json_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote"));
    cmd(&temp).args(["delete", "seed-dev", "-y"]).assert().success();

    cmd(&temp)
        .args(["import", &json_arg])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 8 nodes"));
    assert!(stdout_of(&temp, &["list"]).contains("seed-incident"));

    cmd(&temp)
        .args(["export", "pointer", "-o", out.path().to_str().unwrap()])
        .assert()
        .success();
    let pointer = out.path().join("prompt_grove.nodes.json");
    let text = fs::read_to_string(&pointer).unwrap();
    assert!(text.contains("parentId"));
    cmd(&temp)
        .args(["import", pointer.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 8 nodes"));
}

#[test]
fn import_reads_stdin_when_given_dash() {
    let temp = TempDir::new().unwrap();
    let pointer = stdout_of(&temp, &["export", "pointer"]);
    cmd(&temp).args(["delete", "seed-dev", "-y"]).assert().success();
    cmd(&temp)
        .args(["import", "-"])
        .write_stdin(pointer)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 8 nodes"));
    assert!(stdout_of(&temp, &["view", "seed-dev"]).contains("Children: 2"));
}

#[test]
fn export_markdown_and_opml_to_stdout() {
    let temp = TempDir::new().unwrap();
    let md = stdout_of(&temp, &["export", "md"]);
    assert!(md.starts_with("# Prompt Grove"));
    assert!(md.contains("## Writing"));
    assert!(md.contains("### Summarize a document"));
    assert!(md.contains("Link: <https://example.com/runbooks>"));

    let opml = stdout_of(&temp, &["export", "opml"]);
    assert!(opml.contains("<opml version=\"2.0\">"));
    assert!(opml.contains("<title>Prompt Grove</title>"));
    assert!(opml.contains("text=\"Code review\""));

    cmd(&temp)
        .args(["export", "yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown export format"));
}

#[test]
fn invalid_import_leaves_collection_unchanged() {
    let temp = TempDir::new().unwrap();
    stdout_of(&temp, &["list"]);
    let bad = temp.path().join("bad.json");
    fs::write(&bad, r#"{"nodes": [{"id": "a", "title": "A"}, {"id": "a", "title": "Again"}]}"#).unwrap();
    let before = fs::read_to_string(nodes_file(temp.path())).unwrap();

    cmd(&temp)
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Import failed"))
        .stderr(predicate::str::contains("duplicate id"));

    fs::write(&bad, "[1, 2").unwrap();
    cmd(&temp)
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid JSON"));

    let after = fs::read_to_string(nodes_file(temp.path())).unwrap();
    assert_eq!(before, after);
    assert!(stdout_of(&temp, &["list"]).contains("seed-summarize"));
}

#[test]
fn corrupt_storage_falls_back_to_seed_with_warning() {
    let temp = TempDir::new().unwrap();
    fs::write(nodes_file(temp.path()), "not json at all").unwrap();
    cmd(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed-summarize"))
        .stderr(predicate::str::contains("Warning:"))
        .stderr(predicate::str::contains("unreadable"));
    // The unreadable blob stays on disk for the user to recover.
    assert_eq!(fs::read_to_string(nodes_file(temp.path())).unwrap(), "not json at all");
}

#[test]
fn reset_restores_seed() {
    let temp = TempDir::new().unwrap();
    add(&temp, &["Temporary prompt"]);
    cmd(&temp)
        .arg("reset")
        .write_stdin("no\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Canceled."));
    assert!(stdout_of(&temp, &["list"]).contains("Temporary prompt"));

    cmd(&temp)
        .args(["reset", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Collection reset (8 nodes)"));
    assert!(!stdout_of(&temp, &["list"]).contains("Temporary prompt"));
}

#[test]
fn map_draws_svg_with_viewport_and_animation() {
    let temp = TempDir::new().unwrap();
    let svg = stdout_of(&temp, &["map"]);
    assert!(svg.starts_with("<svg"));
    assert!(svg.contains("data-id=\"seed-writing\""));
    assert!(svg.contains("data-id=\"seed-runbook\""));
    assert!(!svg.contains("animateTransform"));

    let svg = stdout_of(&temp, &["map", "--zoom", "9", "--pan", "10,-5", "--animate"]);
    assert!(svg.contains("translate(10,-5) scale(4)"));
    assert!(svg.contains("animateTransform"));

    cmd(&temp)
        .args(["map", "--pan", "ten"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--pan <x,y>"));
}

#[test]
fn collapse_state_is_shared_by_map_and_tree() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["toggle", "seed-dev"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Collapsed System Dev (+4)"));
    let tree = stdout_of(&temp, &["tree"]);
    assert!(tree.contains("▸ System Dev [seed-dev]"));
    assert!(!tree.contains("seed-review"));
    let svg = stdout_of(&temp, &["map"]);
    assert!(!svg.contains("data-id=\"seed-review\""));

    cmd(&temp)
        .args(["toggle", "seed-tone"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("nothing to collapse"));

    let out = TempDir::new().unwrap();
    let file = out.path().join("map.svg");
    cmd(&temp)
        .args(["map", "--expand-all", "-o", file.to_str().unwrap()])
        .assert()
        .success();
    assert!(fs::read_to_string(&file).unwrap().contains("data-id=\"seed-review\""));
    assert!(stdout_of(&temp, &["tree"]).contains("▾ System Dev [seed-dev]"));

    cmd(&temp)
        .args(["map", "--collapse-all", "--expand-all"])
        .assert()
        .failure();
}

#[test]
fn tap_follows_node_kind() {
    let temp = TempDir::new().unwrap();
    cmd(&temp)
        .args(["tap", "seed-runbook"])
        .assert()
        .success()
        .stdout(predicate::str::contains("https://example.com/runbooks"));
    cmd(&temp)
        .args(["tap", "seed-summarize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Summarize the following text"));
    cmd(&temp)
        .args(["tap", "seed-writing"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Collapsed Writing (+2)"));

    let id = add(&temp, &["Empty note"]);
    cmd(&temp)
        .args(["tap", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains("Empty note: nothing to copy"));
}
