//! Orchestrator: fans the agent roster out over one project's working
//! directory, aggregates their findings into a `Report`, and streams
//! progress over the Progress Bus.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use aar_domain::entities::{
    AgentKind, Finding, HealthScoreWeights, JobCheckpoint, Phase, Project, ProjectStatus, Report,
};
use aar_domain::error::{Error, ErrorKind, Result};
use aar_domain::events::{CompletionStatistics, ProgressEvent};
use aar_domain::ports::{
    CheckpointStore, FindingRepository, ProgressBus, ProjectRepository, ReportRepository,
};
use aar_domain::value_objects::ProjectId;

use crate::agents::AnalysisAgent;

/// Tunables for one orchestrator run.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorConfig {
    /// Maximum agents run concurrently (`min(numAgents, this)` per `spec.md` §5).
    pub max_concurrency: usize,
    /// Whole-run deadline; exceeding it cancels every outstanding agent.
    pub timeout: Duration,
    /// Health-score weighting.
    pub health_score_weights: HealthScoreWeights,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout: Duration::from_secs(30 * 60),
            health_score_weights: HealthScoreWeights::default(),
        }
    }
}

/// Runs the fixed agent roster over a project and persists the aggregated report.
pub struct Orchestrator {
    agents: Vec<Arc<dyn AnalysisAgent>>,
    projects: Arc<dyn ProjectRepository>,
    findings: Arc<dyn FindingRepository>,
    reports: Arc<dyn ReportRepository>,
    checkpoints: Arc<dyn CheckpointStore>,
    progress: Arc<dyn ProgressBus>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Construct an orchestrator from its collaborators and the full agent roster.
    #[must_use]
    pub fn new(
        agents: Vec<Arc<dyn AnalysisAgent>>,
        projects: Arc<dyn ProjectRepository>,
        findings: Arc<dyn FindingRepository>,
        reports: Arc<dyn ReportRepository>,
        checkpoints: Arc<dyn CheckpointStore>,
        progress: Arc<dyn ProgressBus>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            agents,
            projects,
            findings,
            reports,
            checkpoints,
            progress,
            config,
        }
    }

    /// Run the full roster over `working_dir`, producing and persisting a `Report`.
    ///
    /// Refuses to start a second concurrent run for a project whose checkpoint
    /// phase is not yet terminal/`FilesReady` (the reset-vs-in-flight race
    /// resolution recorded in `DESIGN.md`).
    pub async fn analyze(
        &self,
        project_id: ProjectId,
        working_dir: PathBuf,
        cancel: CancellationToken,
    ) -> Result<Report> {
        let started = Instant::now();
        let mut project = self.projects.get(project_id).await?;

        let existing = self.checkpoints.get(project_id).await?;
        if let Some(existing) = &existing {
            if !existing.phase.is_terminal() && existing.phase != Phase::Pending {
                return Err(Error::conflict(
                    "analysis is already in progress for this project",
                ));
            }
        }

        if project.status == ProjectStatus::FilesReady {
            project.transition(ProjectStatus::Queued)?;
        }
        project.transition(ProjectStatus::Analyzing)?;
        self.projects.update(&project).await?;

        let mut checkpoint = existing.unwrap_or_else(|| JobCheckpoint::new(project_id));
        checkpoint.advance(Phase::Analyzing, true);
        self.checkpoints.upsert(checkpoint.clone()).await?;

        let run_cancel = cancel.child_token();
        let timeout_guard = run_cancel.clone();
        let timeout = self.config.timeout;
        let timeout_task = tokio::spawn(async move {
            tokio::select! {
                _ = tokio::time::sleep(timeout) => timeout_guard.cancel(),
                _ = timeout_guard.cancelled() => {}
            }
        });

        let result = self
            .run_roster(&project, &working_dir, run_cancel.clone())
            .await;
        let was_cancelled = run_cancel.is_cancelled();
        run_cancel.cancel();
        timeout_task.abort();

        let result = if was_cancelled {
            Err(Error::cancelled(
                "analysis run was cancelled before completion; no report was persisted",
            ))
        } else {
            result
        };

        match result {
            Ok((raw_findings, agents_succeeded, agents_failed)) => {
                let report = self
                    .finish_success(&mut project, &mut checkpoint, raw_findings, agents_succeeded, agents_failed)
                    .await?;
                self.progress.publish(
                    project_id,
                    ProgressEvent::Completion {
                        success: true,
                        duration_seconds: started.elapsed().as_secs_f64(),
                        statistics: Some(CompletionStatistics {
                            raw_finding_count: report.counts.values().sum::<usize>() as u32,
                            persisted_finding_count: report.counts.values().sum::<usize>() as u32,
                            agents_succeeded,
                            agents_failed,
                        }),
                    },
                );
                Ok(report)
            }
            Err(err) => {
                checkpoint.record_error(&err.to_string());
                if err.kind() == ErrorKind::Cancellation {
                    // Leave the job retryable: reset to `Pending`/`FilesReady`
                    // rather than the terminal `Failed` state, so the Worker
                    // Loop's redelivery of this still-in-flight message can
                    // start a fresh run instead of being refused by the
                    // in-flight guard or stuck behind a terminal status.
                    checkpoint.advance(Phase::Pending, false);
                    self.checkpoints.upsert(checkpoint).await?;
                    if project.status == ProjectStatus::Analyzing {
                        project.transition(ProjectStatus::FilesReady)?;
                        self.projects.update(&project).await?;
                    }
                } else {
                    checkpoint.advance(Phase::Failed, false);
                    self.checkpoints.upsert(checkpoint).await?;
                    project.transition(ProjectStatus::Failed)?;
                    self.projects.update(&project).await?;
                }
                self.progress.publish(
                    project_id,
                    ProgressEvent::Completion {
                        success: false,
                        duration_seconds: started.elapsed().as_secs_f64(),
                        statistics: None,
                    },
                );
                Err(err)
            }
        }
    }

    async fn run_roster(
        &self,
        project: &Project,
        working_dir: &Path,
        cancel: CancellationToken,
    ) -> Result<(Vec<Finding>, u32, u32)> {
        let mut join_set: JoinSet<(AgentKind, Result<Vec<Finding>>)> = JoinSet::new();
        let permits = Arc::new(tokio::sync::Semaphore::new(self.config.max_concurrency.max(1)));

        for agent in &self.agents {
            let agent = Arc::clone(agent);
            let project = project.clone();
            let working_dir = working_dir.to_path_buf();
            let cancel = cancel.clone();
            let permits = Arc::clone(&permits);
            join_set.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let kind = agent.kind();
                let outcome = agent.analyze(&project, &working_dir, cancel).await;
                (kind, outcome)
            });
        }

        let mut raw_findings = Vec::new();
        let mut agents_succeeded = 0u32;
        let mut agents_failed = 0u32;

        while let Some(joined) = join_set.join_next().await {
            let (kind, outcome) = joined.map_err(|e| Error::internal(format!("agent task panicked: {e}")))?;
            match outcome {
                Ok(findings) => {
                    agents_succeeded += 1;
                    for finding in &findings {
                        self.progress.publish(
                            project.id,
                            ProgressEvent::Finding {
                                finding: Box::new(finding.clone()),
                            },
                        );
                    }
                    raw_findings.extend(findings);
                }
                Err(err) => {
                    agents_failed += 1;
                    raw_findings.push(Finding::project_level(
                        project.id,
                        kind,
                        "AgentFailure",
                        aar_domain::value_objects::Severity::Info,
                        format!("{} agent failed: {err}", kind.label()),
                        "this agent's findings are missing from the report; other agents completed normally",
                    ));
                }
            }
        }

        Ok((raw_findings, agents_succeeded, agents_failed))
    }

    async fn finish_success(
        &self,
        project: &mut Project,
        checkpoint: &mut JobCheckpoint,
        raw_findings: Vec<Finding>,
        _agents_succeeded: u32,
        _agents_failed: u32,
    ) -> Result<Report> {
        let mut deduped = Vec::new();
        let mut seen = HashSet::new();
        for finding in raw_findings {
            if !finding.is_persistable() {
                continue;
            }
            if seen.insert(finding.dedup_key()) {
                deduped.push(finding);
            }
        }
        deduped.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| {
                    a.anchor
                        .line_range
                        .map(|r| r.start)
                        .cmp(&b.anchor.line_range.map(|r| r.start))
                })
        });

        let report = Report::aggregate(project.id, &deduped, &self.config.health_score_weights);
        let mut findings_with_report = deduped;
        for finding in &mut findings_with_report {
            finding.report_id = Some(report.id);
        }

        self.findings.create_many(&findings_with_report).await?;
        self.reports.create(&report).await?;

        checkpoint.advance(Phase::Completed, false);
        self.checkpoints.upsert(checkpoint.clone()).await?;

        project.transition(ProjectStatus::Completed)?;
        self.projects.update(project).await?;

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use async_trait::async_trait;

    use aar_domain::value_objects::{OwnerId, Severity};
    use aar_providers::checkpoint::InMemoryCheckpointStore;
    use aar_providers::progress::BroadcastProgressBus;
    use aar_providers::repositories::{
        InMemoryFindingRepository, InMemoryProjectRepository, InMemoryReportRepository,
    };

    struct StubAgent {
        kind: AgentKind,
        findings: Vec<Finding>,
    }

    #[async_trait]
    impl AnalysisAgent for StubAgent {
        fn kind(&self) -> AgentKind {
            self.kind
        }

        async fn analyze(
            &self,
            _project: &Project,
            _working_dir: &Path,
            _cancel: CancellationToken,
        ) -> Result<Vec<Finding>> {
            Ok(self.findings.clone())
        }
    }

    struct FailingAgent {
        kind: AgentKind,
    }

    #[async_trait]
    impl AnalysisAgent for FailingAgent {
        fn kind(&self) -> AgentKind {
            self.kind
        }

        async fn analyze(
            &self,
            _project: &Project,
            _working_dir: &Path,
            _cancel: CancellationToken,
        ) -> Result<Vec<Finding>> {
            Err(Error::fatal("simulated model outage"))
        }
    }

    fn anchored(project_id: ProjectId, kind: AgentKind, severity: Severity, path: &str) -> Finding {
        let anchor = aar_domain::entities::Anchor {
            file_path: Some(path.to_string()),
            line_range: Some(aar_domain::entities::LineRange { start: 1, end: 1 }),
            symbol: None,
        };
        Finding::anchored(project_id, kind, "cat", severity, anchor, "d", "e").unwrap()
    }

    #[tokio::test]
    async fn runs_roster_dedups_and_persists_report() {
        let projects = Arc::new(InMemoryProjectRepository::default());
        let findings = Arc::new(InMemoryFindingRepository::default());
        let reports = Arc::new(InMemoryReportRepository::default());
        let checkpoints = Arc::new(InMemoryCheckpointStore::default());
        let progress = Arc::new(BroadcastProgressBus::default());

        let mut project = Project::new("demo", None, OwnerId::new());
        project.transition(ProjectStatus::FilesReady).unwrap();
        projects.create(&project).await.unwrap();

        let duplicate = anchored(project.id, AgentKind::Security, Severity::High, "src/a.rs");
        let agents: Vec<Arc<dyn AnalysisAgent>> = vec![
            Arc::new(StubAgent {
                kind: AgentKind::Security,
                findings: vec![duplicate.clone(), duplicate.clone()],
            }),
            Arc::new(FailingAgent {
                kind: AgentKind::CodeQuality,
            }),
        ];

        let orchestrator = Orchestrator::new(
            agents,
            projects.clone(),
            findings,
            reports.clone(),
            checkpoints,
            progress,
            OrchestratorConfig::default(),
        );

        let report = orchestrator
            .analyze(project.id, std::env::temp_dir(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.counts[&Severity::High], 1);
        let stored = reports.get_for_project(project.id).await.unwrap();
        assert!(stored.is_some());

        let reloaded = projects.get(project.id).await.unwrap();
        assert_eq!(reloaded.status, ProjectStatus::Completed);
    }

    #[tokio::test]
    async fn refuses_concurrent_run_for_in_flight_project() {
        let projects = Arc::new(InMemoryProjectRepository::default());
        let findings = Arc::new(InMemoryFindingRepository::default());
        let reports = Arc::new(InMemoryReportRepository::default());
        let checkpoints = Arc::new(InMemoryCheckpointStore::default());
        let progress = Arc::new(BroadcastProgressBus::default());

        let mut project = Project::new("demo", None, OwnerId::new());
        project.transition(ProjectStatus::FilesReady).unwrap();
        projects.create(&project).await.unwrap();

        let mut in_flight = JobCheckpoint::new(project.id);
        in_flight.advance(Phase::Analyzing, true);
        checkpoints.upsert(in_flight).await.unwrap();

        let agents: Vec<Arc<dyn AnalysisAgent>> = vec![Arc::new(StubAgent {
            kind: AgentKind::Security,
            findings: vec![],
        })];
        let orchestrator = Orchestrator::new(
            agents,
            projects,
            findings,
            reports,
            checkpoints,
            progress,
            OrchestratorConfig::default(),
        );

        let err = orchestrator
            .analyze(project.id, std::env::temp_dir(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), aar_domain::error::ErrorKind::Internal);
    }
}
