use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use eyre::Result;
use std::io::{self, Write};
use std::path::PathBuf;
use taskman::{CompleteOutcome, Config, Priority, Status, StoreError, Task, TaskFilter, TaskStore};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskman")]
#[command(about = "taskman - a file-backed task manager")]
#[command(version)]
struct Cli {
    /// Path to the tasks file (overrides the config file)
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Path to an alternate config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new task
    Add {
        /// Task description
        description: Option<String>,

        /// Task priority
        #[arg(short, long, value_enum)]
        priority: Option<PriorityArg>,

        /// Due date (YYYY-MM-DD)
        #[arg(long, value_name = "YYYY-MM-DD")]
        due: Option<String>,

        /// Prompt for any fields not given on the command line
        #[arg(short, long)]
        interactive: bool,
    },

    /// List tasks (pending only by default)
    List {
        /// Show only tasks with this status
        #[arg(long, value_enum)]
        status: Option<StatusArg>,

        /// Show only tasks with this priority
        #[arg(long, value_enum)]
        priority: Option<PriorityArg>,

        /// Include completed tasks
        #[arg(short, long)]
        all: bool,
    },

    /// Mark a task as completed
    Complete {
        /// Task id
        id: u64,
    },

    /// Delete a task
    Delete {
        /// Task id
        id: u64,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PriorityArg {
    Low,
    Medium,
    High,
}

impl From<PriorityArg> for Priority {
    fn from(arg: PriorityArg) -> Self {
        match arg {
            PriorityArg::Low => Priority::Low,
            PriorityArg::Medium => Priority::Medium,
            PriorityArg::High => Priority::High,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Pending,
    Completed,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Pending => Status::Pending,
            StatusArg::Completed => Status::Completed,
        }
    }
}

fn main() -> Result<()> {
    // Setup tracing; quiet unless RUST_LOG is set
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(file) = cli.file {
        config.data_file = file;
    }

    let store = TaskStore::open(&config)?;

    match cli.command {
        Commands::Add {
            description,
            priority,
            due,
            interactive,
        } => {
            let description = match (description, interactive) {
                (Some(d), _) => d,
                (None, true) => prompt("Description:")?,
                (None, false) => {
                    eyre::bail!("a description is required (or pass --interactive)")
                }
            };

            let priority = match (priority, interactive) {
                (Some(p), _) => p.into(),
                (None, true) => prompt_priority(config.default_priority)?,
                (None, false) => config.default_priority,
            };

            let due_date = match (due, interactive) {
                (Some(s), _) => Some(parse_due(&s)?),
                (None, true) => {
                    let answer = prompt("Due date (YYYY-MM-DD, empty for none):")?;
                    if answer.is_empty() {
                        None
                    } else {
                        Some(parse_due(&answer)?)
                    }
                }
                (None, false) => None,
            };

            let task = store.add(&description, priority, due_date)?;
            println!(
                "{} {}: {}",
                "Added task".green(),
                task.id,
                task.description
            );
        }

        Commands::List {
            status,
            priority,
            all,
        } => {
            let status = match (status, all) {
                (Some(s), _) => Some(s.into()),
                (None, true) => None,
                (None, false) => Some(Status::Pending),
            };
            let filter = TaskFilter {
                status,
                priority: priority.map(Into::into),
            };
            render_tasks(&store.list(&filter)?);
        }

        Commands::Complete { id } => match store.complete(id)? {
            CompleteOutcome::Completed(task) => {
                println!(
                    "{} {}: {}",
                    "Completed task".green(),
                    task.id,
                    task.description
                );
            }
            CompleteOutcome::AlreadyCompleted(task) => {
                println!(
                    "{} task {} was already completed",
                    "Note:".yellow(),
                    task.id
                );
            }
        },

        Commands::Delete { id } => {
            let task = store.delete(id)?;
            println!(
                "{} {}: {}",
                "Deleted task".red(),
                task.id,
                task.description
            );
        }
    }

    Ok(())
}

fn render_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks.");
        return;
    }

    for task in tasks {
        let status = match task.status {
            Status::Pending => "pending".yellow(),
            Status::Completed => "completed".green(),
        };
        let priority = match task.priority {
            Priority::Low => "low".blue(),
            Priority::Medium => "medium".normal(),
            Priority::High => "high".red().bold(),
        };
        let due = task
            .due_date
            .map(|d| format!("  (due {})", d.format("%Y-%m-%d")))
            .unwrap_or_default();

        println!(
            "{:>4}  [{}] {}  {}{}",
            task.id, status, priority, task.description, due
        );
    }
}

fn parse_due(s: &str) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| {
        StoreError::Validation(format!("malformed due date: {s} (expected YYYY-MM-DD)"))
    })?;
    Ok(date.and_time(NaiveTime::MIN).and_utc())
}

fn prompt(label: &str) -> Result<String> {
    print!("{} ", label.bold());
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn prompt_priority(default: Priority) -> Result<Priority> {
    let answer = prompt(&format!("Priority [low/medium/high] (default {default}):"))?;
    if answer.is_empty() {
        return Ok(default);
    }
    match answer.to_lowercase().as_str() {
        "low" | "l" => Ok(Priority::Low),
        "medium" | "m" => Ok(Priority::Medium),
        "high" | "h" => Ok(Priority::High),
        other => eyre::bail!("unknown priority: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_due_valid() {
        let due = parse_due("2024-03-15").unwrap();
        assert_eq!(due.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-15 00:00:00");
    }

    #[test]
    fn test_parse_due_malformed() {
        assert!(parse_due("15/03/2024").is_err());
        assert!(parse_due("not a date").is_err());
    }
}
