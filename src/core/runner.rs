//! Command runner
//!
//! Walks a resolved command chain in order. Each command moves through a
//! small state machine: `Pending -> Skipped` when its fingerprint is
//! unchanged and the last run succeeded, otherwise `Pending -> Running ->
//! Succeeded | Failed`. The first failure aborts the chain; downstream
//! commands must never run against an inconsistent upstream state.
//!
//! Execution is strictly sequential. The only concurrency in an
//! invocation belongs to the external build tool's own worker processes,
//! which the runner treats as a single blocking step.

use std::collections::BTreeMap;
use std::fmt;

use crate::core::fingerprint::{self, Fingerprint, FingerprintStore, Outcome};
use crate::core::graph::{CommandGraph, CommandId, CommandSpec};
use crate::core::options::ResolvedOptions;
use crate::core::paths::ProjectPaths;
use crate::error::{FrostingError, ToolError};

/// Terminal (or in-flight) state of one command in an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandState {
    Pending,
    Skipped,
    Running,
    Succeeded,
    Failed,
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CommandState::Pending => "pending",
            CommandState::Skipped => "skipped",
            CommandState::Running => "running",
            CommandState::Succeeded => "succeeded",
            CommandState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// One command's result within an invocation
#[derive(Debug, Clone, Copy)]
pub struct CommandReport {
    pub id: CommandId,
    pub state: CommandState,
}

/// Result of walking a resolved chain
#[derive(Debug)]
pub struct RunReport {
    /// Per-command terminal states, in resolved order; stops at the first
    /// failure
    pub commands: Vec<CommandReport>,
    /// The failure that aborted the chain, if any
    pub failure: Option<ToolError>,
}

impl RunReport {
    /// Whether the whole chain completed without a failure
    pub fn succeeded(&self) -> bool {
        self.failure.is_none()
    }

    /// Whether every command was skipped
    pub fn all_skipped(&self) -> bool {
        self.commands
            .iter()
            .all(|report| report.state == CommandState::Skipped)
    }
}

/// Seam between the runner and the external tools.
///
/// Production code shells out; tests substitute a recording executor.
pub trait ActionExecutor {
    /// Run the command's action. Returning `Err` marks the command failed.
    fn invoke(
        &self,
        spec: &CommandSpec,
        opts: &ResolvedOptions,
        paths: &ProjectPaths,
    ) -> Result<(), ToolError>;
}

/// Walks resolved command chains, consulting and updating the fingerprint
/// store
pub struct Runner<'a, E: ActionExecutor> {
    graph: &'a CommandGraph,
    store: &'a mut FingerprintStore,
    executor: &'a E,
    opts: &'a ResolvedOptions,
    paths: &'a ProjectPaths,
}

impl<'a, E: ActionExecutor> Runner<'a, E> {
    pub fn new(
        graph: &'a CommandGraph,
        store: &'a mut FingerprintStore,
        executor: &'a E,
        opts: &'a ResolvedOptions,
        paths: &'a ProjectPaths,
    ) -> Self {
        Self {
            graph,
            store,
            executor,
            opts,
            paths,
        }
    }

    /// Run the target command and every stale prerequisite, in order.
    pub fn run(&mut self, target: CommandId) -> Result<RunReport, FrostingError> {
        let chain = self.graph.resolve(target);
        let mut digests: BTreeMap<String, String> = BTreeMap::new();
        let mut commands = Vec::with_capacity(chain.len());

        for spec in chain {
            let key = fingerprint::store_key(spec.name(), self.opts.flavor);
            let current = Fingerprint::collect(spec, self.opts, self.paths, &digests);

            if !fingerprint::is_stale(self.store.get(&key), &current) {
                tracing::info!("{} is up to date, skipping", spec.name());
                digests.insert(spec.name().to_string(), current.digest());
                commands.push(CommandReport {
                    id: spec.id,
                    state: CommandState::Skipped,
                });
                continue;
            }

            tracing::debug!("{} is stale, running", spec.name());
            let result = self.executor.invoke(spec, self.opts, self.paths);

            // The action has returned; only now may an outcome be
            // recorded. An interrupted action leaves the old fingerprint
            // in place and stays stale.
            let mut fingerprint = current;
            fingerprint.outcome = match result {
                Ok(()) => Outcome::Succeeded,
                Err(_) => Outcome::Failed,
            };
            self.store.commit(&key, fingerprint.clone())?;

            match result {
                Ok(()) => {
                    digests.insert(spec.name().to_string(), fingerprint.digest());
                    commands.push(CommandReport {
                        id: spec.id,
                        state: CommandState::Succeeded,
                    });
                }
                Err(error) => {
                    commands.push(CommandReport {
                        id: spec.id,
                        state: CommandState::Failed,
                    });
                    return Ok(RunReport {
                        commands,
                        failure: Some(error),
                    });
                }
            }
        }

        Ok(RunReport {
            commands,
            failure: None,
        })
    }
}
