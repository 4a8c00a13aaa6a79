//! Task manipulation commands
//!
//! Implements `tb add`, `tb list`, `tb toggle`, `tb move`, `tb delete`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{self, Config};
use crate::error::Result;
use crate::events::{Event, EventDestination, EventKind, EventSink};
use crate::output::{emit_success, HumanOutput, OutputOptions};
use crate::storage::Storage;
use crate::task::{Status, Task, TaskStore};

/// Shared per-command state: the hydrated store plus the optional
/// event sink.
struct CommandEnv {
    store: TaskStore,
    sink: Option<EventSink>,
    sink_warning: Option<String>,
}

fn open_env(data_dir: Option<&Path>, events: Option<&str>, json: bool) -> Result<CommandEnv> {
    let config = Config::load_default()?;
    let dir = config::resolve_data_dir(data_dir, &config)?;
    let store = TaskStore::load(Storage::new(dir));

    let destination = EventDestination::parse(events.or(config.events.destination.as_deref()));
    let (sink, sink_warning) = match destination {
        None => (None, None),
        // Mixing JSON lines with the pretty envelope would leave stdout
        // unparseable as a single document.
        Some(EventDestination::Stdout) if json => (
            None,
            Some("events to stdout are skipped with --json".to_string()),
        ),
        Some(destination) => match destination.open() {
            Ok(sink) => (Some(sink), None),
            Err(err) => (None, Some(format!("events disabled: {err}"))),
        },
    };

    Ok(CommandEnv {
        store,
        sink,
        sink_warning,
    })
}

impl CommandEnv {
    /// Best-effort event write. A failing sink downgrades to a warning
    /// instead of failing the command.
    fn record(&mut self, event: Result<Event>, human: &mut HumanOutput) {
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let outcome = event.and_then(|event| sink.emit(&event));
        if let Err(err) = outcome {
            human.push_warning(format!("event not recorded: {err}"));
        }
    }

    fn carry_warning(&mut self, human: &mut HumanOutput) {
        if let Some(warning) = self.sink_warning.take() {
            human.push_warning(warning);
        }
    }
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Options for `tb add`
pub struct AddOptions {
    pub title: String,
    pub note: String,
    pub data_dir: Option<PathBuf>,
    pub events: Option<String>,
    pub output: OutputOptions,
}

/// Run `tb add`
pub fn run_add(opts: AddOptions) -> Result<()> {
    let mut env = open_env(
        opts.data_dir.as_deref(),
        opts.events.as_deref(),
        opts.output.json,
    )?;

    let task = env.store.add(&opts.title, &opts.note)?;

    let mut human = HumanOutput::new(format!("Added '{}'", task.title));
    human.push_summary("id", short_id(&task.id));
    human.push_summary("status", task.status.as_str());
    if !task.note.is_empty() {
        human.push_summary("note", &task.note);
    }
    env.carry_warning(&mut human);
    env.record(
        Event::new(EventKind::TaskAdded, &task.id).with_task(&task),
        &mut human,
    );

    emit_success(opts.output, "add", &task, Some(&human))
}

/// Options for `tb list`
pub struct ListOptions {
    pub status: Option<String>,
    pub limit: Option<usize>,
    pub data_dir: Option<PathBuf>,
    pub output: OutputOptions,
}

/// Output for `tb list`
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub tasks: Vec<Task>,
    pub todo: usize,
    pub done: usize,
}

/// Run `tb list`
pub fn run_list(opts: ListOptions) -> Result<()> {
    let config = Config::load_default()?;
    let dir = config::resolve_data_dir(opts.data_dir.as_deref(), &config)?;
    let mut store = TaskStore::load(Storage::new(dir));

    let filter = opts.status.as_deref().map(Status::parse).transpose()?;

    let (todo, done, column) = {
        let partition = store.partition();
        (
            partition.todo.len(),
            partition.done.len(),
            filter.map(|status| partition.column(status).to_vec()),
        )
    };
    let mut tasks = column.unwrap_or_else(|| store.tasks().to_vec());
    if let Some(limit) = opts.limit {
        tasks.truncate(limit);
    }

    let header = if store.is_empty() { "No tasks yet" } else { "Tasks" };
    let mut human = HumanOutput::new(header);
    human.push_summary("todo", todo.to_string());
    human.push_summary("done", done.to_string());
    for task in &tasks {
        let mark = match task.status {
            Status::Todo => ' ',
            Status::Done => 'x',
        };
        let mut line = format!("[{mark}] {}  {}", short_id(&task.id), task.title);
        if !task.note.is_empty() {
            line.push_str("  (");
            line.push_str(&task.note);
            line.push(')');
        }
        human.push_detail(line);
    }

    let output = ListOutput { tasks, todo, done };
    emit_success(opts.output, "list", &output, Some(&human))
}

/// Outcome payload for the id-addressed mutations
#[derive(Debug, Serialize)]
pub struct ChangeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

fn emit_no_match(
    mut env: CommandEnv,
    raw: &str,
    command: &str,
    options: OutputOptions,
) -> Result<()> {
    let mut human = HumanOutput::new("No matching task");
    human.push_warning(format!("no task matches '{}'", raw.trim()));
    human.push_next_step("tb list to see task ids");
    env.carry_warning(&mut human);

    let output = ChangeOutput {
        id: None,
        changed: false,
        status: None,
    };
    emit_success(options, command, &output, Some(&human))
}

/// Options for `tb toggle`
pub struct ToggleOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub events: Option<String>,
    pub output: OutputOptions,
}

/// Run `tb toggle`
pub fn run_toggle(opts: ToggleOptions) -> Result<()> {
    let mut env = open_env(
        opts.data_dir.as_deref(),
        opts.events.as_deref(),
        opts.output.json,
    )?;

    let Some(id) = env.store.resolve_id(&opts.id)? else {
        return emit_no_match(env, &opts.id, "toggle", opts.output);
    };

    let changed = env.store.toggle(&id)?;
    let task = env.store.get(&id).cloned();

    let mut human = match &task {
        Some(task) => {
            let mut human = HumanOutput::new(format!("Toggled '{}'", task.title));
            human.push_summary("id", short_id(&task.id));
            human.push_summary("status", task.status.as_str());
            human
        }
        None => HumanOutput::new("Toggled"),
    };
    env.carry_warning(&mut human);
    if changed {
        if let Some(task) = &task {
            env.record(
                Event::new(EventKind::TaskToggled, &task.id)
                    .with_data(serde_json::json!({ "status": task.status })),
                &mut human,
            );
        }
    }

    let output = ChangeOutput {
        id: Some(id),
        changed,
        status: task.map(|task| task.status),
    };
    emit_success(opts.output, "toggle", &output, Some(&human))
}

/// Options for `tb move`
pub struct MoveOptions {
    pub id: String,
    pub status: String,
    pub data_dir: Option<PathBuf>,
    pub events: Option<String>,
    pub output: OutputOptions,
}

/// Run `tb move`
pub fn run_move(opts: MoveOptions) -> Result<()> {
    let status = Status::parse(&opts.status)?;
    let mut env = open_env(
        opts.data_dir.as_deref(),
        opts.events.as_deref(),
        opts.output.json,
    )?;

    let Some(id) = env.store.resolve_id(&opts.id)? else {
        return emit_no_match(env, &opts.id, "move", opts.output);
    };

    let changed = env.store.move_to(&id, status)?;
    let title = env.store.get(&id).map(|task| task.title.clone());

    let mut human = match &title {
        Some(title) => HumanOutput::new(format!("Moved '{title}' to {status}")),
        None => HumanOutput::new(format!("Moved to {status}")),
    };
    human.push_summary("id", short_id(&id));
    human.push_summary("status", status.as_str());
    env.carry_warning(&mut human);
    if changed {
        env.record(
            Event::new(EventKind::TaskMoved, &id)
                .with_data(serde_json::json!({ "status": status })),
            &mut human,
        );
    }

    let output = ChangeOutput {
        id: Some(id),
        changed,
        status: Some(status),
    };
    emit_success(opts.output, "move", &output, Some(&human))
}

/// Options for `tb delete`
pub struct DeleteOptions {
    pub id: String,
    pub data_dir: Option<PathBuf>,
    pub events: Option<String>,
    pub output: OutputOptions,
}

/// Run `tb delete`
pub fn run_delete(opts: DeleteOptions) -> Result<()> {
    let mut env = open_env(
        opts.data_dir.as_deref(),
        opts.events.as_deref(),
        opts.output.json,
    )?;

    let Some(id) = env.store.resolve_id(&opts.id)? else {
        return emit_no_match(env, &opts.id, "delete", opts.output);
    };

    let title = env.store.get(&id).map(|task| task.title.clone());
    let changed = env.store.delete(&id)?;

    let mut human = match &title {
        Some(title) => HumanOutput::new(format!("Deleted '{title}'")),
        None => HumanOutput::new("Deleted"),
    };
    human.push_summary("id", short_id(&id));
    env.carry_warning(&mut human);
    if changed {
        env.record(Ok(Event::new(EventKind::TaskDeleted, &id)), &mut human);
    }

    let output = ChangeOutput {
        id: Some(id),
        changed,
        status: None,
    };
    emit_success(opts.output, "delete", &output, Some(&human))
}
