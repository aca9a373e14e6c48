use std::path::Path;

use chrono::{DateTime, Utc};
use rocket::FromFormField;
use shared::github::{Profile, RepositorySummary};
use tokio::fs::read_to_string;

use crate::{
    chart::{render_activity_chart, ChartKind, ChartOptions},
    search::DashboardState,
};

const TEMPLATE_DIR: &str = "./public/templates";
const REPOSITORY_CARD_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromFormField)]
pub enum Theme {
    Light,
    Dark,
    System,
}

impl Theme {
    /// Cookie value and stylesheet class in one.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    /// Unknown or absent cookies fall back to following the system scheme.
    pub fn from_cookie(value: Option<&str>) -> Self {
        match value {
            Some("light") => Self::Light,
            Some("dark") => Self::Dark,
            _ => Self::System,
        }
    }
}

/// Page fragments read once at ignite; placeholders are substituted per
/// request.
#[derive(Debug, Clone)]
pub struct Templates {
    dashboard: String,
    profile_card: String,
    repository_list: String,
    repository_card: String,
    chart_card: String,
    error_banner: String,
    loading_skeleton: String,
}

impl Templates {
    pub async fn load() -> anyhow::Result<Self> {
        Self::load_from(Path::new(TEMPLATE_DIR)).await
    }

    pub async fn load_from(dir: &Path) -> anyhow::Result<Self> {
        Ok(Self {
            dashboard: read_to_string(dir.join("dashboard.html")).await?,
            profile_card: read_to_string(dir.join("profile_card.html")).await?,
            repository_list: read_to_string(dir.join("repository_list.html")).await?,
            repository_card: read_to_string(dir.join("repository_card.html")).await?,
            chart_card: read_to_string(dir.join("chart_card.html")).await?,
            error_banner: read_to_string(dir.join("error_banner.html")).await?,
            loading_skeleton: read_to_string(dir.join("loading_skeleton.html")).await?,
        })
    }

    /// Assembles the whole page. An in-flight search shows the skeleton
    /// instead of stale content, a failed one shows only the banner, and
    /// before any search the content area stays empty.
    pub fn render_dashboard(
        &self,
        state: &DashboardState,
        options: &ChartOptions,
        theme: Theme,
    ) -> String {
        let content = if state.loading {
            self.loading_skeleton.clone()
        } else if let Some(error) = &state.error {
            self.error_banner.replace("{message}", &escape_html(error))
        } else if let Some(profile) = &state.profile {
            let mut sections = self.render_profile(profile);
            sections.push_str(&self.render_repositories(&state.repositories));
            if let Some(chart) = render_activity_chart(&state.activity, options) {
                sections.push_str(&self.render_chart_card(state, options, &chart));
            }
            sections
        } else {
            String::new()
        };

        let refresh = if state.loading {
            r#"<meta http-equiv="refresh" content="2">"#
        } else {
            ""
        };

        // User-supplied text lands in `content`, so that substitution has to
        // come after every other one.
        self.dashboard
            .replace("{refresh}", refresh)
            .replace("{theme}", theme.as_str())
            .replace("{disabled}", if state.loading { "disabled" } else { "" })
            .replace("{content}", &content)
    }

    fn render_profile(&self, profile: &Profile) -> String {
        self.profile_card
            .replace("{followers}", &profile.followers.to_string())
            .replace("{following}", &profile.following.to_string())
            .replace("{repos}", &profile.public_repos.to_string())
            .replace("{joined}", &profile.created_at.format("%B %Y").to_string())
            .replace("{avatar}", &escape_html(&profile.avatar_url))
            .replace("{url}", &escape_html(&profile.html_url))
            .replace("{login}", &escape_html(&profile.login))
            .replace("{name}", &escape_html(profile.display_name()))
            .replace("{bio}", &escape_html(profile.bio.as_deref().unwrap_or_default()))
    }

    fn render_repositories(&self, repositories: &[RepositorySummary]) -> String {
        if repositories.is_empty() {
            return String::new();
        }

        let cards: String = repositories
            .iter()
            .take(REPOSITORY_CARD_LIMIT)
            .map(|repository| self.render_repository(repository))
            .collect();
        self.repository_list
            .replace("{count}", &repositories.len().to_string())
            .replace("{cards}", &cards)
    }

    fn render_repository(&self, repository: &RepositorySummary) -> String {
        self.repository_card
            .replace("{stars}", &repository.stargazers_count.to_string())
            .replace("{forks}", &repository.forks_count.to_string())
            .replace("{updated}", &relative_age(repository.updated_at, Utc::now()))
            .replace("{url}", &escape_html(&repository.html_url))
            .replace("{name}", &escape_html(&repository.name))
            .replace(
                "{language}",
                &escape_html(repository.language.as_deref().unwrap_or_default()),
            )
            .replace(
                "{description}",
                &escape_html(repository.description.as_deref().unwrap_or_default()),
            )
    }

    fn render_chart_card(
        &self,
        state: &DashboardState,
        options: &ChartOptions,
        chart: &str,
    ) -> String {
        self.chart_card
            .replace("{bar_selected}", selected(options.kind == ChartKind::Bar))
            .replace("{line_selected}", selected(options.kind == ChartKind::Line))
            .replace("{area_selected}", selected(options.kind == ChartKind::Area))
            .replace("{grid_checked}", checked(options.grid))
            .replace("{legend_checked}", checked(options.legend))
            .replace("{repo}", &escape_html(state.top_repository().unwrap_or_default()))
            .replace("{chart}", chart)
    }
}

fn selected(on: bool) -> &'static str {
    if on {
        "selected"
    } else {
        ""
    }
}

fn checked(on: bool) -> &'static str {
    if on {
        "checked"
    } else {
        ""
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// "Updated 3 days ago" style label for repository cards.
pub fn relative_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(timestamp);
    let days = elapsed.num_days();
    if days >= 365 {
        plural(days / 365, "year")
    } else if days >= 30 {
        plural(days / 30, "month")
    } else if days >= 1 {
        plural(days, "day")
    } else if elapsed.num_hours() >= 1 {
        plural(elapsed.num_hours(), "hour")
    } else if elapsed.num_minutes() >= 1 {
        plural(elapsed.num_minutes(), "minute")
    } else {
        "just now".to_string()
    }
}

fn plural(amount: i64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {unit} ago")
    } else {
        format!("{amount} {unit}s ago")
    }
}
