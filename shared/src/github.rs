use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public account record as returned by `GET /users/{username}`. Fields the
/// API is allowed to null out are optional here and stay `None` instead of
/// failing the whole search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub login: String,
    pub name: Option<String>,
    pub avatar_url: String,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
    pub html_url: String,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

/// One entry of `GET /users/{username}/repos`, ordered by the API itself
/// when queried with `sort=updated`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositorySummary {
    pub id: u64,
    pub name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub stargazers_count: u32,
    pub forks_count: u32,
    pub language: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// One week of `GET /repos/{owner}/{repo}/stats/commit_activity`: a
/// seconds-since-epoch week marker plus seven Sunday-first daily counts.
/// The statistics endpoint misbehaves under load, so every field the
/// transform depends on is optional and checked there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyActivityBucket {
    #[serde(default)]
    pub total: u64,
    pub week: Option<i64>,
    pub days: Option<Vec<u64>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_tolerates_nulled_optional_fields() {
        let payload = r#"{
            "login": "octocat",
            "name": null,
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "bio": null,
            "public_repos": 8,
            "followers": 3938,
            "following": 9,
            "created_at": "2011-01-25T18:44:36Z",
            "html_url": "https://github.com/octocat",
            "type": "User"
        }"#;

        let profile: Profile = serde_json::from_str(payload).unwrap();
        assert_eq!(profile.login, "octocat");
        assert_eq!(profile.name, None);
        assert_eq!(profile.bio, None);
        assert_eq!(profile.display_name(), "octocat");
        assert_eq!(profile.followers, 3938);
    }

    #[test]
    fn display_name_prefers_the_set_name() {
        let payload = r#"{
            "login": "octocat",
            "name": "The Octocat",
            "avatar_url": "https://avatars.githubusercontent.com/u/583231",
            "public_repos": 8,
            "followers": 3938,
            "following": 9,
            "created_at": "2011-01-25T18:44:36Z",
            "html_url": "https://github.com/octocat"
        }"#;

        let profile: Profile = serde_json::from_str(payload).unwrap();
        assert_eq!(profile.display_name(), "The Octocat");
    }

    #[test]
    fn repository_missing_language_and_description_parses() {
        let payload = r#"{
            "id": 1296269,
            "name": "Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "stargazers_count": 80,
            "forks_count": 9,
            "updated_at": "2024-06-10T08:03:06Z",
            "fork": false
        }"#;

        let repository: RepositorySummary = serde_json::from_str(payload).unwrap();
        assert_eq!(repository.name, "Hello-World");
        assert_eq!(repository.description, None);
        assert_eq!(repository.language, None);
    }

    #[test]
    fn activity_bucket_fields_are_all_optional() {
        let bucket: WeeklyActivityBucket = serde_json::from_str("{}").unwrap();
        assert_eq!(bucket.total, 0);
        assert_eq!(bucket.week, None);
        assert_eq!(bucket.days, None);

        let bucket: WeeklyActivityBucket =
            serde_json::from_str(r#"{"total": 6, "week": 1717286400, "days": [0,1,2,0,1,2,0]}"#)
                .unwrap();
        assert_eq!(bucket.total, 6);
        assert_eq!(bucket.week, Some(1717286400));
        assert_eq!(bucket.days, Some(vec![0, 1, 2, 0, 1, 2, 0]));
    }
}
