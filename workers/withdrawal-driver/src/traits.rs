//! The task abstraction the withdrawal workflows are written against

use std::fmt::{Debug, Display};

use async_trait::async_trait;

use crate::error::WithdrawalTaskError;

/// The state of a task's execution
pub trait TaskState: Clone + Debug + Display + Send {
    /// Whether the state is the task's final state
    fn completed(&self) -> bool;
}

/// The task trait defines a sequence of largely async flows, each step of
/// which may fail and end the task
#[async_trait]
pub trait Task: Send {
    /// The state type of the task, used for task introspection
    type State: TaskState;

    /// Get the current state of the task
    fn state(&self) -> Self::State;
    /// Whether or not the task is completed
    fn completed(&self) -> bool {
        self.state().completed()
    }
    /// Get a displayable name for the task
    fn name(&self) -> String;
    /// Take a step in the task, steps should represent largely async behavior
    async fn step(&mut self) -> Result<(), WithdrawalTaskError>;
}
