use std::time::{Duration, Instant};

use log::{error, info};
use uuid::Uuid;

use crate::error::ConversionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Starting,
    Started,
    Success,
    Failed,
}

/// Execution details of one step run.
#[derive(Debug, Clone)]
pub struct StepExecution {
    /// Unique identifier for this step instance
    pub id: Uuid,
    /// Human-readable name for the step
    pub name: String,
    /// Current status of the step execution
    pub status: StepStatus,
    pub start_time: Option<Instant>,
    pub end_time: Option<Instant>,
    pub duration: Option<Duration>,
    /// Number of data rows read
    pub read_count: usize,
    /// Number of records written
    pub write_count: usize,
    /// Number of rows left out of the output
    pub skip_count: usize,
    /// Name of the blob produced by the step, if any
    pub output: Option<String>,
}

impl StepExecution {
    pub fn new(name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            status: StepStatus::Starting,
            start_time: None,
            end_time: None,
            duration: None,
            read_count: 0,
            write_count: 0,
            skip_count: 0,
            output: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatStatus {
    /// The tasklet can continue to execute.
    Continuable,
    /// The tasklet has finished executing.
    Finished,
}

/// A single-task unit of work, executed until it reports `Finished`.
pub trait Tasklet {
    fn execute(&self, step_execution: &mut StepExecution) -> Result<RepeatStatus, ConversionError>;
}

/// A step running a [`Tasklet`].
pub struct TaskletStep<'a> {
    name: String,
    tasklet: &'a dyn Tasklet,
}

impl TaskletStep<'_> {
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Runs the tasklet, recording timing and final status in `step_execution`.
    pub fn execute(&self, step_execution: &mut StepExecution) -> Result<(), ConversionError> {
        let start_time = Instant::now();
        step_execution.start_time = Some(start_time);
        step_execution.status = StepStatus::Started;

        info!(
            "Start of step: {}, id: {}",
            step_execution.name, step_execution.id
        );

        let result = loop {
            match self.tasklet.execute(step_execution) {
                Ok(RepeatStatus::Continuable) => continue,
                Ok(RepeatStatus::Finished) => break Ok(()),
                Err(error) => break Err(error),
            }
        };

        step_execution.end_time = Some(Instant::now());
        step_execution.duration = Some(start_time.elapsed());

        match result {
            Ok(()) => {
                step_execution.status = StepStatus::Success;
                info!(
                    "End of step: {}, id: {}",
                    step_execution.name, step_execution.id
                );
                Ok(())
            }
            Err(err) => {
                step_execution.status = StepStatus::Failed;
                error!(
                    "Step {} failed, id: {}: {}",
                    step_execution.name, step_execution.id, err
                );
                Err(err)
            }
        }
    }
}

pub struct StepBuilder<'a> {
    name: String,
    tasklet: Option<&'a dyn Tasklet>,
}

impl<'a> StepBuilder<'a> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            tasklet: None,
        }
    }

    pub fn tasklet(mut self, tasklet: &'a dyn Tasklet) -> Self {
        self.tasklet = Some(tasklet);
        self
    }

    pub fn build(self) -> Result<TaskletStep<'a>, ConversionError> {
        let tasklet = self.tasklet.ok_or_else(|| {
            ConversionError::Configuration(format!("Tasklet is required for step {}", self.name))
        })?;

        Ok(TaskletStep {
            name: self.name,
            tasklet,
        })
    }
}
