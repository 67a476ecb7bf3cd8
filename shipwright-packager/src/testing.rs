//! In-memory repository host for tests
//!
//! Records every call, serves scripted release listings and injects
//! one-shot failures per operation.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shipwright_client::{ClientError, RemoteRepositoryClient, Result};
use shipwright_core::domain::release::{Release, ReleaseAsset};
use shipwright_core::domain::repository::{Owner, RepoRef, Repository};
use shipwright_core::dto::content::PutFileContents;
use shipwright_core::dto::repository::CreateRepository;
use shipwright_core::dto::workflow::WorkflowDispatch;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

pub const OWNER: &str = "octocat";

#[derive(Debug, Clone)]
pub enum Call {
    Create(CreateRepository),
    Write {
        repo: RepoRef,
        path: String,
        request: PutFileContents,
    },
    Dispatch {
        repo: RepoRef,
        workflow: String,
        dispatch: WorkflowDispatch,
    },
    ListReleases(RepoRef),
    Delete(RepoRef),
    ListRepositories,
}

#[derive(Default)]
pub struct FakeRemote {
    calls: Mutex<Vec<Call>>,
    releases: Mutex<VecDeque<Result<Vec<Release>>>>,
    repositories: Mutex<Vec<Repository>>,
    create_error: Mutex<Option<ClientError>>,
    write_error: Mutex<Option<ClientError>>,
    dispatch_error: Mutex<Option<ClientError>>,
    delete_error: Mutex<Option<ClientError>>,
    delete_stall: Mutex<Option<Duration>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the result of the next release listing; an empty queue lists nothing
    pub fn push_releases(&self, result: Result<Vec<Release>>) {
        self.releases.lock().unwrap().push_back(result);
    }

    pub fn push_empty(&self, times: usize) {
        for _ in 0..times {
            self.push_releases(Ok(Vec::new()));
        }
    }

    pub fn add_repository(&self, name: &str) {
        self.repositories
            .lock()
            .unwrap()
            .push(repository(&CreateRepository::new(name, true, true)));
    }

    pub fn fail_create(&self, error: ClientError) {
        *self.create_error.lock().unwrap() = Some(error);
    }

    pub fn fail_write(&self, error: ClientError) {
        *self.write_error.lock().unwrap() = Some(error);
    }

    pub fn fail_dispatch(&self, error: ClientError) {
        *self.dispatch_error.lock().unwrap() = Some(error);
    }

    pub fn fail_delete(&self, error: ClientError) {
        *self.delete_error.lock().unwrap() = Some(error);
    }

    /// Makes the next delete hang for `duration` before answering
    pub fn stall_delete(&self, duration: Duration) {
        *self.delete_stall.lock().unwrap() = Some(duration);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| predicate(*c)).count()
    }

    pub fn created_names(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Create(req) => Some(req.name),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> Vec<(RepoRef, String, PutFileContents)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Write {
                    repo,
                    path,
                    request,
                } => Some((repo, path, request)),
                _ => None,
            })
            .collect()
    }

    pub fn deleted(&self) -> Vec<RepoRef> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Delete(repo) => Some(repo),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn take(slot: &Mutex<Option<ClientError>>) -> Result<()> {
        match slot.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RemoteRepositoryClient for FakeRemote {
    async fn create_repository(&self, req: &CreateRepository) -> Result<Repository> {
        self.record(Call::Create(req.clone()));
        Self::take(&self.create_error)?;
        Ok(repository(req))
    }

    async fn create_or_update_file(
        &self,
        repo: &RepoRef,
        path: &str,
        req: &PutFileContents,
    ) -> Result<()> {
        self.record(Call::Write {
            repo: repo.clone(),
            path: path.to_string(),
            request: req.clone(),
        });
        Self::take(&self.write_error)
    }

    async fn create_workflow_dispatch(
        &self,
        repo: &RepoRef,
        workflow_id: &str,
        dispatch: &WorkflowDispatch,
    ) -> Result<()> {
        self.record(Call::Dispatch {
            repo: repo.clone(),
            workflow: workflow_id.to_string(),
            dispatch: dispatch.clone(),
        });
        Self::take(&self.dispatch_error)
    }

    async fn list_releases(&self, repo: &RepoRef) -> Result<Vec<Release>> {
        self.record(Call::ListReleases(repo.clone()));
        self.releases
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn delete_repository(&self, repo: &RepoRef) -> Result<()> {
        self.record(Call::Delete(repo.clone()));
        let stall = self.delete_stall.lock().unwrap().take();
        if let Some(duration) = stall {
            tokio::time::sleep(duration).await;
        }
        Self::take(&self.delete_error)
    }

    async fn list_repositories(&self) -> Result<Vec<Repository>> {
        self.record(Call::ListRepositories);
        Ok(self.repositories.lock().unwrap().clone())
    }
}

fn repository(req: &CreateRepository) -> Repository {
    Repository {
        id: 1,
        name: req.name.clone(),
        full_name: format!("{}/{}", OWNER, req.name),
        owner: Owner {
            login: OWNER.to_string(),
        },
        private: req.private,
        default_branch: Some("main".to_string()),
        html_url: None,
    }
}

/// A published release created `minute` minutes past a fixed hour
pub fn release(id: u64, minute: u32, asset_urls: &[&str]) -> Release {
    Release {
        id,
        tag_name: format!("build-{}", id),
        name: None,
        draft: false,
        prerelease: false,
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, minute, 0).unwrap(),
        published_at: None,
        assets: asset_urls
            .iter()
            .enumerate()
            .map(|(i, url)| ReleaseAsset {
                id: id * 10 + i as u64,
                name: format!("asset-{}", i),
                size: 0,
                browser_download_url: url.to_string(),
            })
            .collect(),
    }
}
