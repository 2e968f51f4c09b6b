use super::{HelpBook, HelpFlag, HelpTopic, Section};

pub(crate) fn book() -> HelpBook<'static> {
    HelpBook {
        title: "Prompt Grove",
        usage: "grove <command> [options]",
        topics: ALL_TOPICS,
        footer: &[
            "Use `grove help <topic>` for focused docs, e.g. `grove help move` or `grove help import`.",
        ],
    }
}

const NODE_FLAGS: &[HelpFlag<'static>] = &[
    HelpFlag {
        name: "-p, --prompt <text>",
        desc: "Prompt body; `-` reads it from stdin.",
    },
    HelpFlag {
        name: "--summary <text>",
        desc: "Short description shown under the title.",
    },
    HelpFlag {
        name: "-t, --tag <tag>",
        desc: "Attach a tag (repeatable); a leading # is stripped.",
    },
    HelpFlag {
        name: "--type <kind>",
        desc: "prompt (default), group, link or any label.",
    },
    HelpFlag {
        name: "--color <key|#hex>",
        desc: "accent|good|warn|bad or a literal #rrggbb.",
    },
    HelpFlag {
        name: "--href <url>",
        desc: "Link target for link nodes.",
    },
];

const ALL_TOPICS: &[HelpTopic<'static>] = &[
    HelpTopic {
        name: "list",
        summary: "List prompts grouped by category.",
        usage: "grove list [-s text] [-c category] [-t tag]... [--favorites]",
        details: &[
            "Search matches title, summary, prompt body and tags, case-insensitively.",
            "Tag filters require every listed tag; a node without tags inherits its nearest tagged ancestor's.",
            "Groups are headings and never listed as items.",
        ],
        flags: &[
            HelpFlag {
                name: "-s, --search <text>",
                desc: "Substring search across all text fields.",
            },
            HelpFlag {
                name: "-c, --category <name>",
                desc: "Only this category (`All` clears the filter).",
            },
            HelpFlag {
                name: "-t, --tag <tag>",
                desc: "Require a tag; repeat to require several.",
            },
            HelpFlag {
                name: "-f, --favorites",
                desc: "Only favorites.",
            },
        ],
        aliases: &["ls"],
        section: Section::Command,
        examples: &["grove list -t infra -t urgent", "grove list -s review -c \"System Dev\""],
    },
    HelpTopic {
        name: "categories",
        summary: "Show categories with item counts.",
        usage: "grove categories",
        details: &["Counts only items; group headings are not counted."],
        flags: &[],
        aliases: &["cats"],
        section: Section::Command,
        examples: &["grove categories"],
    },
    HelpTopic {
        name: "tree",
        summary: "Print the hierarchy, honoring collapsed nodes.",
        usage: "grove tree",
        details: &["Collapsed nodes show ▸ and a count of hidden descendants; use `grove toggle <id>` to flip one."],
        flags: &[],
        aliases: &[],
        section: Section::Command,
        examples: &["grove tree"],
    },
    HelpTopic {
        name: "view",
        summary: "Show one node with its prompt body.",
        usage: "grove view <id> [--render] [--plain]",
        details: &["--render formats the body as Markdown; --plain disables color."],
        flags: &[
            HelpFlag {
                name: "--render, -r",
                desc: "Render the prompt as Markdown.",
            },
            HelpFlag {
                name: "--plain",
                desc: "Disable color for this command.",
            },
        ],
        aliases: &["show"],
        section: Section::Command,
        examples: &["grove view seed-review --render"],
    },
    HelpTopic {
        name: "add",
        summary: "Create a node at the root or under a parent.",
        usage: "grove add <title> [--parent <id>] [--category <name>] [options]",
        details: &[
            "Without --parent the node goes to the root; an unknown parent also means root.",
            "--category files the node under that category's root group, creating it when missing.",
            "The new id is printed so it can be piped into other commands.",
        ],
        flags: NODE_FLAGS,
        aliases: &["new"],
        section: Section::Command,
        examples: &[
            "grove add \"Explain a stack trace\" -p \"Explain this trace\" --category Debugging -t rust",
            "grove add Docs --type link --href https://docs.rs --parent seed-dev",
        ],
    },
    HelpTopic {
        name: "edit",
        summary: "Change fields of an existing node.",
        usage: "grove edit <id> [--title <text>] [options]",
        details: &[
            "Only the given fields change. Tags given here replace the node's tags; --clear-tags empties them.",
        ],
        flags: NODE_FLAGS,
        aliases: &[],
        section: Section::Command,
        examples: &["grove edit seed-tone --summary \"Plain-language rewrite\" -t writing"],
    },
    HelpTopic {
        name: "delete",
        summary: "Delete a node and everything under it.",
        usage: "grove delete <id> [--yes]",
        details: &["Asks for confirmation unless --yes is given; answering no changes nothing."],
        flags: &[HelpFlag {
            name: "-y, --yes",
            desc: "Skip the confirmation prompt.",
        }],
        aliases: &["rm"],
        section: Section::Command,
        examples: &["grove delete seed-infra --yes"],
    },
    HelpTopic {
        name: "favorite",
        summary: "Toggle the favorite star on a node.",
        usage: "grove favorite <id>",
        details: &[],
        flags: &[],
        aliases: &["fav"],
        section: Section::Command,
        examples: &["grove favorite seed-review"],
    },
    HelpTopic {
        name: "move",
        summary: "Move a node to another parent, category or the root.",
        usage: "grove move <id> (--category <name>|--parent <id>|--root) [--before <ref>|--after <ref>]",
        details: &[
            "Moving into the node's own subtree is refused.",
            "Without --before/--after the node lands at the end of its new siblings; sibling order is renumbered 0..n-1.",
            "A category that does not exist yet gets a new root group.",
        ],
        flags: &[
            HelpFlag {
                name: "--category <name>",
                desc: "Target the root group for this category.",
            },
            HelpFlag {
                name: "--parent <id>",
                desc: "Target a specific node.",
            },
            HelpFlag {
                name: "--root",
                desc: "Make it a root.",
            },
            HelpFlag {
                name: "--before/--after <ref>",
                desc: "Place next to a sibling in the target group.",
            },
        ],
        aliases: &["mv"],
        section: Section::Command,
        examples: &["grove move seed-tone --category \"System Dev\" --before seed-review"],
    },
    HelpTopic {
        name: "copy",
        summary: "Copy a prompt body to the clipboard.",
        usage: "grove copy <id>",
        details: &[
            "Tries pbcopy, wl-copy, xclip and xsel, then the OSC 52 terminal escape.",
            "When no clipboard is reachable the prompt is printed instead.",
        ],
        flags: &[],
        aliases: &["cp"],
        section: Section::Command,
        examples: &["grove copy seed-summarize"],
    },
    HelpTopic {
        name: "import",
        summary: "Replace the collection with a JSON file.",
        usage: "grove import <file|->",
        details: &[
            "Accepts a nested forest (nodes with children), flat records with a category, or {\"nodes\": [...]} with parentId links.",
            "Any invalid record rejects the whole file and leaves the current collection untouched.",
            "Pass - to read the document from stdin.",
        ],
        flags: &[],
        aliases: &[],
        section: Section::Command,
        examples: &["grove import prompts.json"],
    },
    HelpTopic {
        name: "export",
        summary: "Write the collection as JSON, pointer JSON, Markdown or OPML.",
        usage: "grove export <json|pointer|md|opml> [--out <file>]",
        details: &["Prints to stdout unless --out is given. JSON exports can be imported again."],
        flags: &[HelpFlag {
            name: "-o, --out <file>",
            desc: "Write to a file instead of stdout.",
        }],
        aliases: &[],
        section: Section::Command,
        examples: &["grove export md --out prompts.md", "grove export opml > prompts.opml"],
    },
    HelpTopic {
        name: "reset",
        summary: "Restore the default collection.",
        usage: "grove reset [--yes]",
        details: &["Replaces everything with the snapshot saved on first run and expands all map nodes."],
        flags: &[HelpFlag {
            name: "-y, --yes",
            desc: "Skip the confirmation prompt.",
        }],
        aliases: &[],
        section: Section::Command,
        examples: &["grove reset --yes"],
    },
    HelpTopic {
        name: "map",
        summary: "Draw the collection as an SVG mind map.",
        usage: "grove map [--out <file>] [--animate] [--expand-all|--collapse-all] [--zoom <f>] [--pan <x,y>]",
        details: &[
            "Each root gets its own band; children branch to the right and parents center on their subtree.",
            "Zoom is clamped to 0.2..4.0. --animate adds the one-shot grow intro.",
            "--expand-all and --collapse-all are saved for later runs.",
        ],
        flags: &[
            HelpFlag {
                name: "-o, --out <file>",
                desc: "Write the SVG to a file instead of stdout.",
            },
            HelpFlag {
                name: "--animate",
                desc: "Add the grow animation.",
            },
            HelpFlag {
                name: "--expand-all / --collapse-all",
                desc: "Reset the collapsed set.",
            },
            HelpFlag {
                name: "--zoom <f>",
                desc: "Initial scale.",
            },
            HelpFlag {
                name: "--pan <x,y>",
                desc: "Initial translation.",
            },
        ],
        aliases: &[],
        section: Section::Command,
        examples: &["grove map --animate --out grove.svg"],
    },
    HelpTopic {
        name: "toggle",
        summary: "Collapse or expand a node in the map and tree.",
        usage: "grove toggle <id>",
        details: &[],
        flags: &[],
        aliases: &[],
        section: Section::Command,
        examples: &["grove toggle seed-infra"],
    },
    HelpTopic {
        name: "tap",
        summary: "Do what tapping the node in the map does.",
        usage: "grove tap <id>",
        details: &[
            "A node with children toggles; a link opens; a prompt is copied; anything else just reports itself.",
        ],
        flags: &[],
        aliases: &[],
        section: Section::Command,
        examples: &["grove tap seed-runbook"],
    },
    HelpTopic {
        name: "prefs",
        summary: "Show or change display preferences.",
        usage: "grove prefs [--summaries on|off] [--compact on|off] [--dark on|off]",
        details: &["With no flags the current values are printed."],
        flags: &[
            HelpFlag {
                name: "--summaries on|off",
                desc: "Show summaries in list output.",
            },
            HelpFlag {
                name: "--compact on|off",
                desc: "One line per item, no spacing.",
            },
            HelpFlag {
                name: "--dark on|off",
                desc: "Dark palette for the terminal and map.",
            },
        ],
        aliases: &[],
        section: Section::Command,
        examples: &["grove prefs --compact on"],
    },
    HelpTopic {
        name: "path",
        summary: "Print the storage directory.",
        usage: "grove path",
        details: &[],
        flags: &[],
        aliases: &[],
        section: Section::Command,
        examples: &["grove path"],
    },
    HelpTopic {
        name: "help",
        summary: "Show the overview or a specific topic.",
        usage: "grove help [topic]",
        details: &["`grove help` shows the overview; `grove help list` drills into one command."],
        flags: &[],
        aliases: &["--help", "-h"],
        section: Section::Command,
        examples: &["grove help map", "grove --help"],
    },
    HelpTopic {
        name: "getting-started",
        summary: "First steps with the default collection.",
        usage: "grove help getting-started",
        details: &[
            "The first command seeds the collection from the bundled set; `grove tree` shows it.",
            "Copy a prompt with `grove copy <id>` and draw everything with `grove map --out grove.svg`.",
        ],
        flags: &[],
        aliases: &["quickstart"],
        section: Section::Guide,
        examples: &["grove tree", "grove list -t dev", "grove copy seed-review"],
    },
    HelpTopic {
        name: "formats",
        summary: "Accepted import shapes.",
        usage: "grove help formats",
        details: &[
            "Forest: [{\"title\": ..., \"children\": [...]}]. The first element must carry a children key.",
            "Flat: [{\"category\": ..., \"title\": ..., \"prompt\": ...}]. One group is made per category and its items are tagged with it.",
            "Pointer: {\"nodes\": [{\"id\": ..., \"parentId\": ...}]}. Unknown parents become roots; parent cycles are rejected.",
        ],
        flags: &[],
        aliases: &["shapes"],
        section: Section::Guide,
        examples: &["grove export pointer | grove import -"],
    },
    HelpTopic {
        name: "GROVE_DIR",
        summary: "Override the storage directory (default ~/.prompt_grove).",
        usage: "GROVE_DIR=/path grove list",
        details: &["Created on first write. Each key is a JSON file inside it."],
        flags: &[],
        aliases: &[],
        section: Section::Environment,
        examples: &["GROVE_DIR=/tmp/grove grove tree"],
    },
    HelpTopic {
        name: "GROVE_HEADLESS",
        summary: "Never launch clipboard or browser helpers.",
        usage: "GROVE_HEADLESS=1 grove copy <id>",
        details: &["Useful in CI and over ssh; copy falls back to OSC 52 or printing."],
        flags: &[],
        aliases: &[],
        section: Section::Environment,
        examples: &["GROVE_HEADLESS=1 grove tap seed-runbook"],
    },
    HelpTopic {
        name: "GROVE_LOG",
        summary: "Log filter for stderr diagnostics (default warn).",
        usage: "GROVE_LOG=debug grove import file.json",
        details: &["Accepts tracing EnvFilter directives such as `debug` or `prompt_grove::store=trace`."],
        flags: &[],
        aliases: &[],
        section: Section::Environment,
        examples: &["GROVE_LOG=debug grove list"],
    },
    HelpTopic {
        name: "NO_COLOR",
        summary: "Disable colored output.",
        usage: "NO_COLOR=1 grove list",
        details: &["Honored by list, tree, view, categories and log output."],
        flags: &[],
        aliases: &[],
        section: Section::Environment,
        examples: &["NO_COLOR=1 grove tree"],
    },
];
