//! Built-in task tray tools
//!
//! A small in-memory task list the model can drive, used by the REPL and the
//! one-shot runner as the default tool set.

use std::sync::{Arc, Mutex};

use futures::FutureExt;
use serde_json::{Value, json};
use synapse_domain::{ParamKind, ParamSpec, ToolDescriptor};
use synapse_infrastructure::{SchemaError, ToolRegistry};

const PRIORITIES: [&str; 4] = ["p1", "p2", "p3", "p4"];

#[derive(Debug, Clone)]
struct TrayTask {
    id: u64,
    content: String,
    priority: String,
    done: bool,
}

#[derive(Default)]
struct TaskTray {
    tasks: Vec<TrayTask>,
    next_id: u64,
}

impl TaskTray {
    fn add(&mut self, content: String, priority: String) -> u64 {
        self.next_id += 1;
        self.tasks.push(TrayTask {
            id: self.next_id,
            content,
            priority,
            done: false,
        });
        self.next_id
    }

    fn open_tasks(&self) -> Vec<&TrayTask> {
        self.tasks.iter().filter(|t| !t.done).collect()
    }

    fn complete(&mut self, id: u64) -> bool {
        match self.tasks.iter_mut().find(|t| t.id == id && !t.done) {
            Some(task) => {
                task.done = true;
                true
            }
            None => false,
        }
    }
}

/// Register the task tray tool set on the given registry.
pub fn register_task_tray(registry: &mut ToolRegistry) -> Result<(), SchemaError> {
    let tray = Arc::new(Mutex::new(TaskTray::default()));

    let handle = tray.clone();
    registry.register(
        ToolDescriptor::new("add_task", "Add a task to the task tray.")
            .with_param(
                ParamSpec::new("content", ParamKind::String)
                    .with_description("What needs to be done"),
            )
            .with_param(
                ParamSpec::optional(
                    "priority",
                    ParamKind::Enum(PRIORITIES.iter().map(|p| p.to_string()).collect()),
                )
                .with_description("Priority, p1 is most urgent"),
            ),
        move |args| {
            let tray = handle.clone();
            async move {
                let content = args
                    .get("content")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let priority = args
                    .get("priority")
                    .and_then(Value::as_str)
                    .unwrap_or("p4")
                    .to_string();
                let id = tray
                    .lock()
                    .map_err(|_| "task tray is unavailable".to_string())?
                    .add(content.clone(), priority.clone());
                Ok(json!({ "id": id, "content": content, "priority": priority }))
            }
            .boxed()
        },
    )?;

    let handle = tray.clone();
    registry.register(
        ToolDescriptor::new("list_tasks", "List all open tasks in the tray."),
        move |_args| {
            let tray = handle.clone();
            async move {
                let tray = tray
                    .lock()
                    .map_err(|_| "task tray is unavailable".to_string())?;
                let open: Vec<Value> = tray
                    .open_tasks()
                    .iter()
                    .map(|t| json!({ "id": t.id, "content": t.content, "priority": t.priority }))
                    .collect();
                if open.is_empty() {
                    Ok(json!("no open tasks"))
                } else {
                    Ok(json!({ "tasks": open }))
                }
            }
            .boxed()
        },
    )?;

    let handle = tray;
    registry.register(
        ToolDescriptor::new("complete_task", "Mark an open task as done.").with_param(
            ParamSpec::new("id", ParamKind::Integer).with_description("Id of the task to complete"),
        ),
        move |args| {
            let tray = handle.clone();
            async move {
                let id = args.get("id").and_then(Value::as_u64).unwrap_or(0);
                let completed = tray
                    .lock()
                    .map_err(|_| "task tray is unavailable".to_string())?
                    .complete(id);
                if completed {
                    Ok(json!(format!("task {id} completed")))
                } else {
                    Err(format!("no open task with id {id}"))
                }
            }
            .boxed()
        },
    )?;

    Ok(())
}
