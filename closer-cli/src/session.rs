//! Line-oriented session over a single in-memory TaskStore.
//!
//! Every command mutates or reads the store directly; rankings and metrics
//! are recomputed from the store on each print. Nothing is written to disk.

use anyhow::{anyhow, bail, Context, Result};
use chrono_tz::Tz;
use closer_core::{Clock, IdSource, Priority, TaskInput, TaskPatch, TaskStatus, TaskStore};
use std::io::{BufRead, Write};

use crate::report::{render_metrics, render_ranked, render_task, short_id};

pub const HELP: &str = "\
commands:
  add <priority> <status> <revenue> <hours> <title...>
  update <id> field=value ...     (title, revenue, hours, priority, status, notes)
  done <id>                       mark Done
  delete <id>
  undo                            restore the last deleted task
  show <id>
  list [n]
  metrics
  help
  quit
ids may be abbreviated to any unique prefix";

#[derive(Debug, Clone, PartialEq)]
pub enum SessionCommand {
    Add(TaskInput),
    Update { id: String, patch: TaskPatch },
    Done(String),
    Delete(String),
    Undo,
    Show(String),
    List(Option<usize>),
    Metrics,
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

pub fn parse_command(line: &str) -> Result<Option<SessionCommand>> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        return Ok(None);
    };
    let rest: Vec<&str> = words.collect();

    let parsed = match cmd.to_ascii_lowercase().as_str() {
        "add" => {
            if rest.len() < 5 {
                bail!("usage: add <priority> <status> <revenue> <hours> <title...>");
            }
            let priority = parse_priority(rest[0])?;
            let status = parse_status(rest[1])?;
            let revenue = parse_number("revenue", rest[2])?;
            let hours = parse_number("hours", rest[3])?;
            let title = rest[4..].join(" ");
            SessionCommand::Add(
                TaskInput::new(title, revenue, hours)
                    .with_priority(priority)
                    .with_status(status),
            )
        }
        "update" | "set" => {
            let (id, fields) = rest.split_first().context("usage: update <id> field=value ...")?;
            SessionCommand::Update {
                id: id.to_string(),
                patch: parse_patch(fields)?,
            }
        }
        "done" => SessionCommand::Done(single_id(&rest, "done")?),
        "delete" | "rm" => SessionCommand::Delete(single_id(&rest, "delete")?),
        "undo" => SessionCommand::Undo,
        "show" => SessionCommand::Show(single_id(&rest, "show")?),
        "list" | "ls" => SessionCommand::List(match rest.first() {
            Some(n) => Some(n.parse().with_context(|| format!("invalid count: {n}"))?),
            None => None,
        }),
        "metrics" => SessionCommand::Metrics,
        "help" | "?" => SessionCommand::Help,
        "quit" | "exit" | "q" => SessionCommand::Quit,
        other => bail!("unknown command: {other} (try `help`)"),
    };
    Ok(Some(parsed))
}

fn single_id(rest: &[&str], cmd: &str) -> Result<String> {
    match rest {
        [id] => Ok(id.to_string()),
        _ => bail!("usage: {cmd} <id>"),
    }
}

fn parse_priority(s: &str) -> Result<Priority> {
    Priority::parse(s).ok_or_else(|| anyhow!("invalid priority: {s} (high|medium|low)"))
}

fn parse_status(s: &str) -> Result<TaskStatus> {
    TaskStatus::parse(s).ok_or_else(|| anyhow!("invalid status: {s} (todo|in-progress|done)"))
}

fn parse_number(field: &str, s: &str) -> Result<f64> {
    let n: f64 = s
        .trim_start_matches('$')
        .parse()
        .with_context(|| format!("invalid {field}: {s}"))?;
    if !n.is_finite() {
        bail!("invalid {field}: {s} (must be a finite number)");
    }
    Ok(n)
}

/// `title=Call back Acme revenue=500` -> words without `=` continue the previous value.
fn parse_patch(words: &[&str]) -> Result<TaskPatch> {
    let mut pairs: Vec<(String, String)> = Vec::new();
    for w in words {
        match w.split_once('=') {
            Some((k, v)) => pairs.push((k.to_ascii_lowercase(), v.to_string())),
            None => match pairs.last_mut() {
                Some((_, v)) => {
                    v.push(' ');
                    v.push_str(w);
                }
                None => bail!("expected field=value, got: {w}"),
            },
        }
    }

    let mut patch = TaskPatch::default();
    for (k, v) in pairs {
        patch = match k.as_str() {
            "title" => patch.title(v),
            "revenue" => patch.revenue(parse_number("revenue", &v)?),
            "hours" | "time" | "timetaken" => patch.time_taken(parse_number("hours", &v)?),
            "priority" => patch.priority(parse_priority(&v)?),
            "status" => patch.status(parse_status(&v)?),
            "notes" => patch.notes(v),
            other => bail!("unknown field: {other}"),
        };
    }
    if patch.is_empty() {
        bail!("nothing to update");
    }
    Ok(patch)
}

/// Expand a unique id prefix to the full id. Exact matches win.
pub fn resolve_id<C: Clock, I: IdSource>(store: &TaskStore<C, I>, prefix: &str) -> Option<String> {
    if store.get(prefix).is_some() {
        return Some(prefix.to_string());
    }
    let mut matches = store.tasks().iter().filter(|t| t.id.starts_with(prefix));
    match (matches.next(), matches.next()) {
        (Some(t), None) => Some(t.id.clone()),
        _ => None,
    }
}

pub struct Session<C: Clock, I: IdSource> {
    pub store: TaskStore<C, I>,
    pub tz: Tz,
    pub limit: usize,
}

impl<C: Clock, I: IdSource> Session<C, I> {
    pub fn new(store: TaskStore<C, I>, tz: Tz, limit: usize) -> Self {
        Self { store, tz, limit }
    }

    pub fn run<R: BufRead, W: Write>(&mut self, input: R, out: &mut W) -> Result<()> {
        writeln!(out, "{} tasks loaded. Type `help` for commands.", self.store.len())?;
        if let Some(err) = self.store.error() {
            writeln!(out, "error: {err}")?;
        }
        write!(out, "> ")?;
        out.flush()?;

        for line in input.lines() {
            let line = line.context("read input")?;
            match parse_command(&line) {
                Ok(Some(cmd)) => {
                    if self.execute(cmd, out)? == Flow::Stop {
                        return Ok(());
                    }
                }
                Ok(None) => {}
                Err(e) => writeln!(out, "error: {e:#}")?,
            }
            write!(out, "> ")?;
            out.flush()?;
        }
        writeln!(out)?;
        Ok(())
    }

    pub fn execute<W: Write>(&mut self, cmd: SessionCommand, out: &mut W) -> Result<Flow> {
        match cmd {
            SessionCommand::Add(input) => {
                let id = self.store.add(input);
                writeln!(out, "added {}", short_id(&id))?;
            }
            SessionCommand::Update { id, patch } => {
                if let Some(full) = self.resolve(&id, out)? {
                    self.store.update(&full, &patch);
                    writeln!(out, "updated {}", short_id(&full))?;
                }
            }
            SessionCommand::Done(id) => {
                if let Some(full) = self.resolve(&id, out)? {
                    self.store
                        .update(&full, &TaskPatch::default().status(TaskStatus::Done));
                    writeln!(out, "marked {} done", short_id(&full))?;
                }
            }
            SessionCommand::Delete(id) => {
                if let Some(full) = self.resolve(&id, out)? {
                    self.store.delete(&full);
                    writeln!(out, "deleted {} (undo available)", short_id(&full))?;
                }
            }
            SessionCommand::Undo => match self.store.last_deleted().map(|t| t.id.clone()) {
                Some(id) => {
                    self.store.undo_delete();
                    writeln!(out, "restored {}", short_id(&id))?;
                }
                None => writeln!(out, "nothing to undo")?,
            },
            SessionCommand::Show(id) => {
                if let Some(full) = self.resolve(&id, out)? {
                    if let Some(t) = self.store.get(&full) {
                        write!(out, "{}", render_task(t, self.tz))?;
                    }
                }
            }
            SessionCommand::List(n) => {
                let ranked = self.store.derived_sorted();
                write!(out, "{}", render_ranked(&ranked, n.unwrap_or(self.limit), self.tz))?;
            }
            SessionCommand::Metrics => {
                write!(out, "{}", render_metrics(&self.store.metrics()))?;
            }
            SessionCommand::Help => writeln!(out, "{HELP}")?,
            SessionCommand::Quit => return Ok(Flow::Stop),
        }
        Ok(Flow::Continue)
    }

    fn resolve<W: Write>(&self, id: &str, out: &mut W) -> Result<Option<String>> {
        let full = resolve_id(&self.store, id);
        if full.is_none() {
            writeln!(out, "no single task matches {id}")?;
        }
        Ok(full)
    }
}
