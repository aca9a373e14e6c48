use std::sync::{Arc, Mutex};

use shared::{
    daily_series,
    github::{Profile, RepositorySummary},
    DailyActivityPoint,
};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

use crate::github::{ApiError, GithubApi};

/// Everything the dashboard renders, replaced wholesale on every
/// transition. Profile and repositories are always set or cleared together;
/// `loading` is the only field that toggles on its own at search start.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DashboardState {
    pub profile: Option<Profile>,
    pub repositories: Vec<RepositorySummary>,
    pub activity: Vec<DailyActivityPoint>,
    pub loading: bool,
    pub error: Option<String>,
}

impl DashboardState {
    pub fn top_repository(&self) -> Option<&str> {
        self.repositories.first().map(|repository| repository.name.as_str())
    }
}

struct SearchOutcome {
    profile: Profile,
    repositories: Vec<RepositorySummary>,
    activity: Vec<DailyActivityPoint>,
}

/// Runs search cycles against the GitHub API and publishes the resulting
/// state through a single watch channel. A new search supersedes the
/// in-flight one: the old cycle is woken through its cancel signal and its
/// result is discarded.
pub struct SearchCoordinator {
    github: Arc<dyn GithubApi>,
    state: watch::Sender<DashboardState>,
    // Guards both search registration and result publication, so a
    // superseded search can never overwrite its successor's state.
    active: Mutex<Option<watch::Sender<bool>>>,
}

impl SearchCoordinator {
    pub fn new(github: Arc<dyn GithubApi>) -> Self {
        Self {
            github,
            state: watch::channel(DashboardState::default()).0,
            active: Mutex::new(None),
        }
    }

    /// Current state snapshot for rendering.
    pub fn current(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    #[instrument(skip(self))]
    pub async fn search(&self, username: &str) {
        let username = username.trim();
        if username.is_empty() {
            debug!("ignoring blank search input");
            return;
        }

        let mut cancelled = self.begin();

        tokio::select! {
            _ = cancelled.changed() => {
                info!("search for {username} was superseded before it finished");
            }
            outcome = self.fetch(username) => {
                self.finish(&cancelled, outcome);
            }
        }
    }

    /// Registers this search as the active one, cancelling its predecessor,
    /// and publishes the loading state. Returns the signal that flips once
    /// a later search takes over.
    fn begin(&self) -> watch::Receiver<bool> {
        let (cancel, cancelled) = watch::channel(false);

        let mut active = self.active.lock().expect("cancellation lock poisoned");
        if let Some(previous) = active.replace(cancel) {
            info!("cancelling the in-flight search");
            let _ = previous.send(true);
        }
        let started = DashboardState {
            loading: true,
            error: None,
            ..self.state.borrow().clone()
        };
        self.state.send_replace(started);

        cancelled
    }

    fn finish(&self, cancelled: &watch::Receiver<bool>, outcome: Result<SearchOutcome, ApiError>) {
        let _active = self.active.lock().expect("cancellation lock poisoned");
        if *cancelled.borrow() {
            info!("dropping the result of a superseded search");
            return;
        }

        let state = match outcome {
            Ok(outcome) => DashboardState {
                profile: Some(outcome.profile),
                repositories: outcome.repositories,
                activity: outcome.activity,
                loading: false,
                error: None,
            },
            Err(error) => {
                warn!("search failed: {error}");
                DashboardState {
                    error: Some(error.to_string()),
                    ..DashboardState::default()
                }
            }
        };
        self.state.send_replace(state);
    }

    async fn fetch(&self, username: &str) -> Result<SearchOutcome, ApiError> {
        let (profile, repositories) = tokio::join!(
            self.github.profile(username),
            self.github.repositories(username),
        );

        // The profile outcome decides the fate of the whole search; a
        // repository failure only matters once the account itself resolved.
        let profile = profile?;
        let repositories = repositories?;

        let buckets = match repositories.first() {
            Some(top) => match self.github.commit_activity(username, &top.name).await {
                Ok(buckets) => buckets,
                Err(error) => {
                    warn!(
                        "commit activity for {username}/{} is unavailable: {error}",
                        top.name
                    );
                    Vec::new()
                }
            },
            None => Vec::new(),
        };

        Ok(SearchOutcome {
            profile,
            repositories,
            activity: daily_series(&buckets),
        })
    }
}
