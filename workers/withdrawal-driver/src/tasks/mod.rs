//! The withdrawal workflows, and the loop that steps them to completion

use tracing::info;

use crate::{error::WithdrawalTaskError, traits::Task};

pub mod force_close;
pub mod withdraw;

/// Step a task until it completes or a step fails
///
/// A failed step ends the task; steps are never retried
pub async fn run_task<T: Task>(task: &mut T) -> Result<(), WithdrawalTaskError> {
    let name = task.name();
    while !task.completed() {
        if let Err(e) = task.step().await {
            info!("task {name} stopped at state {}: {e}", task.state());
            return Err(e);
        }

        info!("task {name} transitioning to state {}", task.state());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fmt::{Display, Formatter, Result as FmtResult};

    use async_trait::async_trait;

    use super::*;
    use crate::traits::TaskState;

    /// The state of a task counting its steps
    #[derive(Clone, Debug)]
    struct StepCount(usize);

    impl TaskState for StepCount {
        fn completed(&self) -> bool {
            self.0 >= 3
        }
    }

    impl Display for StepCount {
        fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
            write!(f, "step {}", self.0)
        }
    }

    /// A task that counts its steps, failing at a given step
    struct CountingTask {
        /// The number of steps taken
        steps: usize,
        /// The step that fails, if any
        fail_at: Option<usize>,
    }

    #[async_trait]
    impl Task for CountingTask {
        type State = StepCount;

        fn state(&self) -> Self::State {
            StepCount(self.steps)
        }

        fn name(&self) -> String {
            "counting".to_string()
        }

        async fn step(&mut self) -> Result<(), WithdrawalTaskError> {
            self.steps += 1;
            if self.fail_at == Some(self.steps) {
                return Err(WithdrawalTaskError::Ledger("node unreachable".to_string()));
            }

            Ok(())
        }
    }

    #[tokio::test]
    async fn test_runs_to_completion() {
        let mut task = CountingTask { steps: 0, fail_at: None };
        assert!(run_task(&mut task).await.is_ok());
        assert_eq!(task.steps, 3);
    }

    #[tokio::test]
    async fn test_failed_step_is_not_retried() {
        let mut task = CountingTask { steps: 0, fail_at: Some(2) };
        let err = run_task(&mut task).await.unwrap_err();

        assert_eq!(err, WithdrawalTaskError::Ledger("node unreachable".to_string()));
        assert_eq!(task.steps, 2);
    }
}
