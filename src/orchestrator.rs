//! Drives a run over every source repository, one at a time.
use derive_builder::Builder;
use log::*;
use std::{path::Path, rc::Rc};

use crate::{
    NotesaurusError, Result,
    bucket::{MonthBucket, bucket_releases},
    config::Config,
    draft::{DraftKey, DraftWriter, WriteOutcome, WritePolicy},
    fetcher::{fetch_release, fetch_releases_in_month},
    forge::{
        github::Github,
        manager::ForgeManager,
        types::{Release, RepoSlug},
    },
    generator::{FallbackChain, gemini::GeminiBackend},
    references,
    render::{RenderStrategy, Renderer, load_style_guide},
    sync::{SyncOptions, Synchronizer, WorkingCopy, state::branch_name},
};

pub mod summary;

pub use summary::{RepoOutcome, RepoStatus, RunSummary};

#[derive(Builder)]
#[builder(setter(into), build_fn(private, name = "_build"))]
pub struct OrchestratorParams {
    pub config: Rc<Config>,
    pub forge: Rc<ForgeManager>,
    pub chain: Rc<FallbackChain>,
    pub renderer: Rc<Renderer>,
    /// Absent in dry runs, monthly runs and when no target repo is set.
    #[builder(default)]
    pub synchronizer: Option<Rc<Synchronizer>>,
}

impl OrchestratorParamsBuilder {
    pub fn build(&self) -> Result<Orchestrator> {
        let params = self._build().map_err(|e| {
            NotesaurusError::invalid_config(format!(
                "Failed to build orchestrator: {e}"
            ))
        })?;
        Ok(Orchestrator::new(params))
    }
}

/// Text written for one draft and who wrote it.
struct Drafted {
    outcome: WriteOutcome,
    generated_by: Option<String>,
}

pub struct Orchestrator {
    config: Rc<Config>,
    forge: Rc<ForgeManager>,
    chain: Rc<FallbackChain>,
    renderer: Rc<Renderer>,
    synchronizer: Option<Rc<Synchronizer>>,
    writer: DraftWriter,
}

impl Orchestrator {
    pub fn builder() -> OrchestratorParamsBuilder {
        OrchestratorParamsBuilder::default()
    }

    pub fn new(params: OrchestratorParams) -> Self {
        let writer = DraftWriter::new(
            params.config.repo_path.clone(),
            params.config.settings.drafts_dir.clone(),
            params.config.write_policy(),
        );

        Self {
            config: params.config,
            forge: params.forge,
            chain: params.chain,
            renderer: params.renderer,
            synchronizer: params.synchronizer,
            writer,
        }
    }

    /// Wires the GitHub forge, Gemini backends, renderer and synchronizer
    /// for `strategy` from a resolved configuration.
    pub async fn from_config(
        config: Config,
        strategy: RenderStrategy,
    ) -> Result<Self> {
        let config = Rc::new(config);
        let settings = &config.settings;

        let github = Github::new(&config.remote_config())?;
        let forge =
            Rc::new(ForgeManager::new(Box::new(github), config.timeout()));

        let backends = match &config.gemini_api_key {
            Some(key) => GeminiBackend::chain_for(
                &settings.models,
                &settings.api_base,
                key,
            ),
            None => vec![],
        };
        let chain = Rc::new(FallbackChain::new(backends, config.timeout()));

        let style_guide =
            load_style_guide(&config.repo_path.join(&settings.style_guide))
                .await;
        let renderer = Rc::new(Renderer::new(
            strategy,
            &settings.templates,
            style_guide,
            settings.web_base.clone(),
        )?);

        let synchronizer = match &config.target_repo {
            Some(target) if !config.dry_run && !strategy.is_monthly() => {
                let working_copy = WorkingCopy::open(
                    config.repo_path.clone(),
                    settings.remote.clone(),
                    settings.base_branch.clone(),
                    config.timeout(),
                );
                Some(Rc::new(Synchronizer::new(
                    working_copy,
                    Rc::clone(&forge),
                    target.clone(),
                    SyncOptions {
                        branch_prefix: settings.branch_prefix.clone(),
                        rebase: settings.rebase,
                        update_pr_body: settings.update_pr_body,
                    },
                )))
            }
            _ => None,
        };

        Orchestrator::builder()
            .config(Rc::clone(&config))
            .forge(forge)
            .chain(chain)
            .renderer(renderer)
            .synchronizer(synchronizer)
            .build()
    }

    /// Runs the pipeline the renderer was built for.
    pub async fn run(&self) -> RunSummary {
        if self.chain.is_empty() {
            warn!("no generation backends configured: using release text");
        } else {
            debug!("generation backends: {:?}", self.chain.backend_names());
        }

        match self.renderer.strategy() {
            RenderStrategy::PerRelease => self.run_releases().await,
            RenderStrategy::MonthlyByProduct | RenderStrategy::MonthlyFlat => {
                self.run_monthly().await
            }
        }
    }

    /// Drafts one release per source repository.
    pub async fn run_releases(&self) -> RunSummary {
        let mut summary = RunSummary::default();

        for repo in self.config.source_repos.iter() {
            info!("processing {repo}");

            let status = match self.process_release(repo).await {
                Ok(status) => status,
                Err(err) => {
                    error!("{repo} failed: {err}");
                    RepoStatus::Failed {
                        error: err.to_string(),
                    }
                }
            };

            summary.push(repo, status);
        }

        summary
    }

    /// Drafts one document covering every release in the target month.
    pub async fn run_monthly(&self) -> RunSummary {
        let month = self.config.target_month;
        let mut summary = RunSummary::default();
        let mut included = vec![];
        let mut releases = vec![];

        info!("collecting releases published in {month}");

        for repo in self.config.source_repos.iter() {
            match fetch_releases_in_month(&self.forge, repo, month).await {
                Ok(found) if found.is_empty() => summary.push(
                    repo,
                    RepoStatus::Skipped {
                        reason: format!("no releases in {month}"),
                    },
                ),
                Ok(found) => {
                    info!("{repo}: {} releases in {month}", found.len());
                    included.push(repo.clone());
                    releases.extend(found);
                }
                Err(err) => {
                    error!("{repo} failed: {err}");
                    summary.push(
                        repo,
                        RepoStatus::Failed {
                            error: err.to_string(),
                        },
                    );
                }
            }
        }

        let bucket =
            bucket_releases(month, releases, &self.config.product_map());

        if bucket.is_empty() {
            warn!("no releases found for {month}: nothing to draft");
            return summary;
        }

        let status = match self.draft_month(&bucket).await {
            Ok(drafted) => status_for(drafted, false, None),
            Err(err) => {
                error!("drafting {month} failed: {err}");
                RepoStatus::Failed {
                    error: err.to_string(),
                }
            }
        };

        for repo in included.iter() {
            summary.push(repo, status.clone());
        }

        summary
    }

    async fn process_release(&self, repo: &RepoSlug) -> Result<RepoStatus> {
        let tag = self.config.release_tag.as_deref();

        let release = match fetch_release(&self.forge, repo, tag).await {
            Ok(release) => release,
            Err(err @ NotesaurusError::NotFound { .. }) => {
                warn!("{err}");
                return Ok(RepoStatus::Skipped {
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        if !release.has_content() {
            warn!("{repo} {} has no release notes", release.tag);
            return Ok(RepoStatus::Skipped {
                reason: format!("release {} has no notes", release.tag),
            });
        }

        let key = DraftKey::release(repo, &release.tag);

        let Some(sync) = self.synchronizer.as_ref() else {
            if let Some(target) = &self.config.target_repo {
                info!(
                    "dry run: leaving branch {} of {target} untouched",
                    branch_name(&self.config.settings.branch_prefix, repo)
                );
            }
            let drafted = self.draft_release(&release, &key).await?;
            return Ok(status_for(drafted, false, None));
        };

        let relative = self.writer.relative_path(&key)?;
        let result = self.sync_release(sync, &release, &key, &relative).await;
        let finished = sync.finish(&relative).await;

        if let Err(err) = &finished {
            error!(
                "failed to return to {}: {err}",
                sync.working_copy().base_branch()
            );
        }

        let status = result?;
        finished?;
        Ok(status)
    }

    async fn sync_release(
        &self,
        sync: &Synchronizer,
        release: &Release,
        key: &DraftKey,
        relative: &Path,
    ) -> Result<RepoStatus> {
        let prepared = sync.prepare(&release.repo).await?;
        let drafted = self.draft_release(release, key).await?;
        let report = sync.publish(prepared, release, relative).await?;

        Ok(status_for(drafted, report.committed, report.pull_request))
    }

    async fn draft_release(
        &self,
        release: &Release,
        key: &DraftKey,
    ) -> Result<Drafted> {
        if let Some(skipped) = self.skip_existing(key).await? {
            return Ok(skipped);
        }

        let web_base = self.renderer.web_base();
        let refs = references::extract(&release.body, &release.repo, web_base);
        let prompt = self.renderer.release_prompt(release, &refs)?;
        debug!("prompt for {key}:\n{prompt}");

        let (content, generated_by) = match self.chain.generate(&prompt).await {
            Ok(generated) => (
                references::relink(&generated.text, &refs),
                Some(generated.backend),
            ),
            Err(err) => {
                warn!("{err}: using release text for {key}");
                (self.renderer.release_fallback(release), None)
            }
        };

        Ok(Drafted {
            outcome: self.writer.write(key, &content).await?,
            generated_by,
        })
    }

    async fn draft_month(
        &self,
        bucket: &MonthBucket,
    ) -> Result<Drafted> {
        let key = DraftKey::Month(bucket.month);

        if let Some(skipped) = self.skip_existing(&key).await? {
            return Ok(skipped);
        }

        info!(
            "drafting {} releases across {} groups for {}",
            bucket.release_count(),
            bucket.groups.len(),
            bucket.month
        );

        let payload = self.renderer.monthly_payload(bucket)?;
        let prompt = self.renderer.monthly_prompt(bucket, &payload)?;
        debug!("prompt for {key}:\n{prompt}");

        let (content, generated_by) = match self.chain.generate(&prompt).await {
            Ok(generated) => (generated.text, Some(generated.backend)),
            Err(err) => {
                warn!("{err}: using consolidated release text for {key}");
                (payload, None)
            }
        };

        Ok(Drafted {
            outcome: self.writer.write(&key, &content).await?,
            generated_by,
        })
    }

    /// Existing draft under [`WritePolicy::SkipExisting`], checked before
    /// any generation call.
    async fn skip_existing(&self, key: &DraftKey) -> Result<Option<Drafted>> {
        if self.writer.policy() != WritePolicy::SkipExisting
            || !self.writer.exists(key).await?
        {
            return Ok(None);
        }

        let path = self.writer.path_for(key)?;
        info!("draft for {key} exists at {}: skipping", path.display());

        Ok(Some(Drafted {
            outcome: WriteOutcome::Skipped(path),
            generated_by: None,
        }))
    }
}

fn status_for(
    drafted: Drafted,
    committed: bool,
    pull_request: Option<u64>,
) -> RepoStatus {
    match drafted.outcome {
        WriteOutcome::Written(path) => RepoStatus::Drafted {
            path,
            generated_by: drafted.generated_by,
            committed,
            pull_request,
        },
        WriteOutcome::Skipped(path) => RepoStatus::Skipped {
            reason: format!("draft already exists at {}", path.display()),
        },
    }
}
