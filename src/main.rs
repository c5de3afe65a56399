use clap::{Parser, Subcommand};
use eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use todostore::{Config, Filter, Medium, MediumKind, TodoStore, view};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "todostore")]
#[command(about = "TodoStore CLI - Persistent todo list")]
#[command(version = env!("GIT_DESCRIBE"))]
struct Cli {
    /// Directory holding the todo storage (overrides config)
    #[arg(short, long)]
    store_path: Option<PathBuf>,

    /// Storage medium (overrides config)
    #[arg(short, long, value_enum)]
    medium: Option<MediumKind>,

    /// Storage key for the collection (overrides config)
    #[arg(short, long)]
    key: Option<String>,

    /// Config file (default: <config dir>/todostore/todostore.yml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a todo
    Add {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// List todos
    List {
        /// all, active or completed
        #[arg(short, long, default_value = "all")]
        filter: Filter,
    },

    /// Flip a todo between active and completed
    Toggle { id: i64 },

    /// Delete a todo
    Delete { id: i64 },

    /// Replace the text of a todo
    Edit {
        id: i64,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        text: Vec<String>,
    },

    /// Remove all completed todos
    ClearCompleted,

    /// Show counts
    Stats,
}

fn main() -> Result<()> {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(store_path) = cli.store_path {
        config.store_path = store_path;
    }
    if let Some(medium) = cli.medium {
        config.medium = medium;
    }
    if let Some(key) = cli.key {
        config.key = key;
    }

    let mut store = TodoStore::open_with_key(config.open_medium()?, &config.key)?;

    let result = run(&mut store, cli.command, &mut std::io::stdout().lock());

    // Feedback is printed even when the command failed
    for notification in store.take_notifications() {
        println!("{}", view::render_notification(&notification));
    }

    result
}

fn run(store: &mut TodoStore<Box<dyn Medium>>, command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Add { text } => {
            let item = store.add(&text.join(" "))?;
            writeln!(out, "{}", view::render_item(&item))?;
        }
        Commands::List { filter } => {
            store.set_filter(filter);
            let items = store.query();
            if items.is_empty() {
                writeln!(out, "{}", view::empty_state_message(filter))?;
            } else {
                for item in items {
                    writeln!(out, "{}", view::render_item(item))?;
                }
            }
            writeln!(out, "{}", view::items_left_label(store.active_count()))?;
        }
        Commands::Toggle { id } => match store.toggle(id)? {
            Some(true) => writeln!(out, "Completed {}", id)?,
            Some(false) => writeln!(out, "Reopened {}", id)?,
            None => writeln!(out, "No todo with id {}", id)?,
        },
        Commands::Delete { id } => {
            store.delete(id)?;
        }
        Commands::Edit { id, text } => {
            if store.edit(id, &text.join(" "))? {
                if let Some(item) = store.get(id) {
                    writeln!(out, "{}", view::render_item(item))?;
                }
            }
        }
        Commands::ClearCompleted => {
            store.clear_completed()?;
        }
        Commands::Stats => {
            writeln!(out, "{}", view::items_left_label(store.active_count()))?;
            writeln!(out, "{} completed", store.len() - store.active_count())?;
            writeln!(out, "{} total", store.len())?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use todostore::{Level, MemoryMedium, Notification, TodoError};

    fn new_store() -> TodoStore<Box<dyn Medium>> {
        colored::control::set_override(false);
        let medium: Box<dyn Medium> = Box::new(MemoryMedium::new());
        TodoStore::open(medium).unwrap()
    }

    fn run_cli(store: &mut TodoStore<Box<dyn Medium>>, args: &[&str]) -> (Result<()>, String) {
        let cli = Cli::try_parse_from(std::iter::once("todostore").chain(args.iter().copied())).unwrap();
        let mut out = Vec::new();
        let result = run(store, cli.command, &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_add_empty_text_fails() {
        let mut store = new_store();

        let (result, output) = run_cli(&mut store, &["add", "   "]);
        let err = result.unwrap_err();
        assert!(matches!(err.downcast_ref::<TodoError>(), Some(TodoError::EmptyText)));
        assert!(output.is_empty());
        assert!(store.is_empty());
        assert_eq!(
            store.take_notifications(),
            vec![Notification::new(Level::Error, "Please enter a todo item!")]
        );

        let (result, _) = run_cli(&mut store, &["add"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_joins_words() {
        let mut store = new_store();

        let (result, output) = run_cli(&mut store, &["add", "Buy", "milk"]);
        result.unwrap();
        let id = store.items()[0].id;
        assert_eq!(output, format!("[ ] {} Buy milk\n", id));
    }

    #[test]
    fn test_list_empty_state_per_filter() {
        let mut store = new_store();

        let (_, output) = run_cli(&mut store, &["list"]);
        assert_eq!(output, "No todos yet! Add one above to get started.\n0 items left\n");

        store.add("A").unwrap();
        let (_, output) = run_cli(&mut store, &["list", "--filter", "completed"]);
        assert_eq!(output, "No completed todos yet. Start checking some off!\n1 item left\n");
        assert_eq!(store.filter(), Filter::Completed);
    }

    #[test]
    fn test_list_and_toggle() {
        let mut store = new_store();
        let a = store.add("A").unwrap().id;
        let b = store.add("B").unwrap().id;
        let b_arg = b.to_string();

        let (_, output) = run_cli(&mut store, &["toggle", b_arg.as_str()]);
        assert_eq!(output, format!("Completed {}\n", b));

        let (_, output) = run_cli(&mut store, &["list", "-f", "active"]);
        assert_eq!(output, format!("[ ] {} A\n1 item left\n", a));

        let (_, output) = run_cli(&mut store, &["toggle", "1"]);
        assert_eq!(output, "No todo with id 1\n");
    }

    #[test]
    fn test_edit_and_clear_completed() {
        let mut store = new_store();
        let id = store.add("Old").unwrap().id;
        let id_arg = id.to_string();

        let (_, output) = run_cli(&mut store, &["edit", id_arg.as_str(), "New", "text"]);
        assert_eq!(output, format!("[ ] {} New text\n", id));

        let (_, output) = run_cli(&mut store, &["edit", id_arg.as_str(), "  "]);
        assert!(output.is_empty());
        assert_eq!(store.get(id).unwrap().text, "New text");

        store.toggle(id).unwrap();
        let (result, _) = run_cli(&mut store, &["clear-completed"]);
        result.unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_rejects_unknown_filter() {
        assert!(Cli::try_parse_from(["todostore", "list", "--filter", "done"]).is_err());
    }
}
