//! Forward execution and rollback of the command pipeline.

use std::sync::Arc;

use tracing::{error, warn};

use crate::config::AssignmentEnvConfig;
use crate::error::PipelineError;
use crate::execution::ContainerEngine;

use super::commands::{
    BuildCommand, Command, PublishCommand, VerifyCommand, WriteDockerfileCommand,
};
use super::context::BuildContext;

/// Already-executed commands, popped LIFO during rollback.
#[derive(Default)]
pub struct UndoStack {
    commands: Vec<Box<dyn Command>>,
}

impl UndoStack {
    fn new() -> Self {
        Self::default()
    }

    /// Pushes a command and returns a borrow of it for execution.
    fn push(&mut self, command: Box<dyn Command>) -> &dyn Command {
        self.commands.push(command);
        self.commands[self.commands.len() - 1].as_ref()
    }

    fn pop(&mut self) -> Option<Box<dyn Command>> {
        self.commands.pop()
    }

    /// Whether every executed command has been compensated.
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Number of executed commands awaiting undo.
    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

/// Drives the fixed stage sequence Verify → Write → Build → Publish.
///
/// Each command is pushed onto the undo stack *before* it executes, so a
/// stage that fails midway (e.g. a partially written Dockerfile) is
/// still compensated during rollback. The pipeline ends `Completed`
/// (all stages succeeded) or `Failed` (rollback attempted, original
/// error returned).
pub struct BuildManager {
    commands: Vec<Box<dyn Command>>,
    undo_stack: UndoStack,
    context: BuildContext,
}

impl BuildManager {
    /// Assembles the standard pipeline over the given engine and configuration.
    pub fn new(
        engine: Arc<dyn ContainerEngine>,
        config: Arc<AssignmentEnvConfig>,
        context: BuildContext,
    ) -> Self {
        let commands: Vec<Box<dyn Command>> = vec![
            Box::new(VerifyCommand::new(engine.clone(), config)),
            Box::new(WriteDockerfileCommand::new()),
            Box::new(BuildCommand::new(engine.clone())),
            Box::new(PublishCommand::new(engine)),
        ];
        Self::with_commands(commands, context)
    }

    /// Assembles a pipeline from an explicit command sequence.
    pub fn with_commands(commands: Vec<Box<dyn Command>>, context: BuildContext) -> Self {
        Self {
            commands,
            undo_stack: UndoStack::new(),
            context,
        }
    }

    /// The shared pipeline state.
    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Number of executed commands whose undo has not run.
    pub fn pending_undos(&self) -> usize {
        self.undo_stack.len()
    }

    /// Executes all stages in order.
    ///
    /// On the first failure, rolls back every already-executed command
    /// (including the failing one) and returns the original error,
    /// wrapped with the failing stage's name. Rollback failures are
    /// logged, not propagated, so they never mask the root cause.
    pub async fn execute(&mut self) -> Result<(), PipelineError> {
        let queued: Vec<Box<dyn Command>> = self.commands.drain(..).collect();
        for command in queued {
            let stage = command.name();
            let result = {
                let command = self.undo_stack.push(command);
                command.execute(&mut self.context).await
            };

            if let Err(source) = result {
                let err = PipelineError::Stage { stage, source };
                error!("{err}; rolling back executed stages");
                if let Err(undo_err) = self.rollback().await {
                    warn!("error in undoing operations: {undo_err}");
                }
                return Err(err);
            }
        }
        Ok(())
    }

    /// Pops and undoes executed commands in reverse execution order.
    ///
    /// A failing undo aborts further popping and returns that undo
    /// error; commands below it stay on the stack.
    pub async fn rollback(&mut self) -> Result<(), PipelineError> {
        while let Some(command) = self.undo_stack.pop() {
            command
                .undo(&mut self.context)
                .await
                .map_err(|source| PipelineError::Undo {
                    stage: command.name(),
                    source,
                })?;
        }
        Ok(())
    }
}
