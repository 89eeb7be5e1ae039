//! # Answer Race Module
//!
//! Runs the description lookup and both model answers for one question
//! concurrently, reports each result as soon as it lands, and cancels
//! whatever is still running when the deadline fires.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::task::{self, JoinError, JoinSet};
use tracing::{debug, error, info, warn};

use crate::errors::UpstreamError;
use crate::llm::ChatModel;
use crate::question::Question;
use crate::search::WebSearch;

/// One of the concurrent lookups started for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    /// Web snippet about the stem
    Description,
    /// Model answer to the full prompt
    Answer,
    /// Model answer to the stem alone, asked to be brief
    ConciseAnswer,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Description => "description",
            TaskKind::Answer => "answer",
            TaskKind::ConciseAnswer => "concise_answer",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where race results are reported
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn delivered(&self, kind: TaskKind, text: &str) -> Result<()>;
    async fn failed(&self, kind: TaskKind, error: &UpstreamError) -> Result<()>;
    /// Called once, with the tasks about to be cancelled
    async fn timed_out(&self, pending: &[TaskKind]) -> Result<()>;
}

/// What happened to each task of a race
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RaceReport {
    /// In completion order
    pub delivered: Vec<TaskKind>,
    pub failed: Vec<TaskKind>,
    /// Not started, or finished without anything to report
    pub skipped: Vec<TaskKind>,
    /// Cancelled by the deadline
    pub timed_out: Vec<TaskKind>,
}

type TaskOutcome = (TaskKind, Result<Option<String>, UpstreamError>);

/// Spawned lookups, tracked by task id so a crashed one can still be named
struct RaceTasks {
    set: JoinSet<TaskOutcome>,
    kinds: HashMap<task::Id, TaskKind>,
    /// In spawn order
    pending: Vec<TaskKind>,
}

impl RaceTasks {
    fn new() -> Self {
        Self {
            set: JoinSet::new(),
            kinds: HashMap::with_capacity(3),
            pending: Vec::with_capacity(3),
        }
    }

    fn spawn<F>(&mut self, kind: TaskKind, lookup: F)
    where
        F: Future<Output = Result<Option<String>, UpstreamError>> + Send + 'static,
    {
        let handle = self.set.spawn(async move { (kind, lookup.await) });
        self.kinds.insert(handle.id(), kind);
        self.pending.push(kind);
    }

    /// Turn a join result into the outcome of the task it belongs to
    fn resolve(&self, joined: Result<TaskOutcome, JoinError>) -> Option<TaskOutcome> {
        match joined {
            Ok(done) => Some(done),
            Err(join_error) => {
                let Some(kind) = self.kinds.get(&join_error.id()).copied() else {
                    error!(error = %join_error, "Unknown race task did not complete");
                    return None;
                };
                error!(task = %kind, error = %join_error, "Race task did not complete");
                let crashed = UpstreamError::Crashed {
                    task: kind.as_str(),
                    message: join_error.to_string(),
                };
                Some((kind, Err(crashed)))
            }
        }
    }

    fn finish(&mut self, kind: TaskKind) {
        self.pending.retain(|k| *k != kind);
    }
}

pub struct AnswerRace {
    chat: Arc<dyn ChatModel>,
    search: Option<Arc<dyn WebSearch>>,
    deadline: Option<Duration>,
}

impl AnswerRace {
    /// `deadline: None` waits for every task
    pub fn new(
        chat: Arc<dyn ChatModel>,
        search: Option<Arc<dyn WebSearch>>,
        deadline: Option<Duration>,
    ) -> Self {
        Self {
            chat,
            search,
            deadline,
        }
    }

    fn spawn_tasks(&self, question: &Question, report: &mut RaceReport) -> RaceTasks {
        let mut tasks = RaceTasks::new();

        match &self.search {
            Some(search) if !question.is_selection() => {
                let search = Arc::clone(search);
                let stem = question.stem.clone();
                tasks.spawn(TaskKind::Description, async move {
                    search.describe(&stem).await
                });
            }
            Some(_) => {
                debug!("Selection question, skipping description lookup");
                report.skipped.push(TaskKind::Description);
            }
            None => report.skipped.push(TaskKind::Description),
        }

        let chat = Arc::clone(&self.chat);
        let prompt = question.prompt.clone();
        tasks.spawn(TaskKind::Answer, async move {
            chat.complete(&prompt).await.map(Some)
        });

        let chat = Arc::clone(&self.chat);
        let prompt = question.concise_prompt();
        tasks.spawn(TaskKind::ConciseAnswer, async move {
            chat.complete(&prompt).await.map(Some)
        });

        tasks
    }

    /// Race the lookups for `question`, reporting through `sink`
    ///
    /// Returns as soon as every task has finished or the deadline fires. A
    /// task that panics is reported as failed. A sink error ends the race
    /// early and cancels the remaining tasks.
    pub async fn run(&self, question: &Question, sink: &dyn ReplySink) -> Result<RaceReport> {
        let mut report = RaceReport::default();
        let mut tasks = self.spawn_tasks(question, &mut report);

        info!(
            tasks = tasks.pending.len(),
            deadline_ms = self.deadline.map(|d| d.as_millis() as u64),
            "Answer race started"
        );

        let deadline = self.deadline;
        let guard = async move {
            match deadline {
                Some(limit) => tokio::time::sleep(limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(guard);

        let mut expired = false;

        loop {
            tokio::select! {
                biased;

                joined = tasks.set.join_next() => {
                    let Some(joined) = joined else { break };
                    let Some((kind, outcome)) = tasks.resolve(joined) else { continue };
                    tasks.finish(kind);

                    match outcome {
                        Ok(Some(text)) => {
                            info!(task = %kind, text = %text, "Task completed");
                            sink.delivered(kind, &text).await?;
                            report.delivered.push(kind);
                        }
                        Ok(None) => {
                            debug!(task = %kind, "Task completed with nothing to report");
                            report.skipped.push(kind);
                        }
                        Err(e) => {
                            if e.is_timeout() {
                                warn!(
                                    task = %kind,
                                    error = %e,
                                    "Task timed out waiting for the service"
                                );
                            } else {
                                warn!(task = %kind, error = %e, "Task failed");
                            }
                            sink.failed(kind, &e).await?;
                            report.failed.push(kind);
                        }
                    }
                }
                _ = &mut guard => {
                    expired = true;
                    break;
                }
            }
        }

        if expired && !tasks.pending.is_empty() {
            warn!(pending = ?tasks.pending, "Answer deadline reached, cancelling pending tasks");
            sink.timed_out(&tasks.pending).await?;
            tasks.set.abort_all();
            while tasks.set.join_next().await.is_some() {}
            report.timed_out = std::mem::take(&mut tasks.pending);
        }

        info!(
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            timed_out = report.timed_out.len(),
            "Answer race finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_kind_names() {
        assert_eq!(TaskKind::Description.to_string(), "description");
        assert_eq!(TaskKind::Answer.to_string(), "answer");
        assert_eq!(TaskKind::ConciseAnswer.to_string(), "concise_answer");
    }
}
