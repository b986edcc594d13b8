use super::{Pipeline, PipelineError, Plan, RunContext, StageExecutor};
use crate::report::{Artifact, RunReport, StageRecord, StageStatus};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Executes a plan layer by layer, running the stages of each layer
/// concurrently and stopping at the first fatal failure.
pub struct Scheduler {
    jobs: usize,
}

impl Scheduler {
    /// `jobs` bounds how many stages run at once (minimum 1)
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    pub fn jobs(&self) -> usize {
        self.jobs
    }

    /// Run every stage of `plan`.
    ///
    /// Once a stage fails, no further stage starts: the rest of its layer
    /// and all later layers are recorded as skipped. Stages already running
    /// are allowed to finish.
    pub fn run(
        &self,
        pipeline: &Pipeline,
        plan: &Plan,
        ctx: &RunContext,
        executor: &dyn StageExecutor,
    ) -> Result<RunReport, PipelineError> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .thread_name(|i| format!("assetline-stage-{}", i))
            .build()?;

        let aborted = AtomicBool::new(false);
        let mut report = RunReport::new(ctx.policy);

        eprintln!(
            "[pipeline] Running {} stages in {} layers ({} jobs)",
            plan.stage_count(),
            plan.layers().len(),
            self.jobs
        );

        for layer in plan.layers() {
            if aborted.load(Ordering::SeqCst) {
                for name in layer {
                    report.record(StageRecord::skipped(name));
                }
                continue;
            }

            let records: Vec<_> = pool.install(|| {
                layer
                    .par_iter()
                    .map(|name| -> Result<(StageRecord, Vec<Artifact>), PipelineError> {
                        let stage = pipeline
                            .stage(name)
                            .ok_or_else(|| PipelineError::UnknownStage(name.clone()))?;

                        if aborted.load(Ordering::SeqCst) {
                            return Ok((StageRecord::skipped(name), Vec::new()));
                        }

                        eprintln!("[pipeline] ▶ {} ({})", name, stage.action.kind());
                        let started = Instant::now();
                        let result = executor.execute(stage, ctx);
                        let duration_ms = started.elapsed().as_millis() as u64;

                        Ok(match result {
                            Ok(output) => {
                                let status = match output.tolerated {
                                    Some(message) => StageStatus::Tolerated { message },
                                    None => StageStatus::Succeeded,
                                };
                                eprintln!("[pipeline] ✓ {} [{}ms]", name, duration_ms);
                                (StageRecord::new(name, status, duration_ms), output.artifacts)
                            }
                            Err(e) => {
                                aborted.store(true, Ordering::SeqCst);
                                let message = format!("{:#}", e);
                                eprintln!("[pipeline] ✗ {}: {}", name, message);
                                (
                                    StageRecord::new(name, StageStatus::Failed { message }, duration_ms),
                                    Vec::new(),
                                )
                            }
                        })
                    })
                    .collect::<Result<Vec<_>, PipelineError>>()
            })?;

            for (record, artifacts) in records {
                report.record(record);
                report.add_artifacts(artifacts);
            }
        }

        report.finish();
        Ok(report)
    }
}
