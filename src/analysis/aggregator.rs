use std::cmp::Reverse;
use std::collections::HashMap;

use crate::models::{GitHubUser, LanguageCount, ProfileStats, ProfileSummary, RepoCard, Repository, Totals};

pub const TOP_LANGUAGES: usize = 5;
pub const LATEST_REPOS: usize = 6;

/// Reduces a profile and its repositories to the portfolio payload.
///
/// Only eligible repositories (neither private nor archived) contribute.
/// Repositories without a detected language are left out of the histogram.
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    top_languages: usize,
    latest_repos: usize,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self {
            top_languages: TOP_LANGUAGES,
            latest_repos: LATEST_REPOS,
        }
    }

    pub fn aggregate(&self, user: &GitHubUser, repos: &[Repository]) -> ProfileStats {
        let eligible: Vec<&Repository> = repos.iter().filter(|r| r.is_eligible()).collect();

        ProfileStats {
            profile: ProfileSummary::from(user),
            stats: self.totals(&eligible),
            top_languages: self.rank_languages(&eligible),
            repo_count: eligible.len(),
            latest: self.latest(&eligible),
        }
    }

    fn totals(&self, repos: &[&Repository]) -> Totals {
        repos.iter().fold(Totals::default(), |mut acc, repo| {
            let stars = u64::from(repo.stargazers_count);
            let forks = u64::from(repo.forks_count);
            acc.total_stars += stars;
            acc.total_forks += forks;
            acc.total_watchers += stars + forks;
            acc
        })
    }

    fn rank_languages(&self, repos: &[&Repository]) -> Vec<LanguageCount> {
        let mut counts: Vec<LanguageCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for language in repos.iter().filter_map(|r| r.language.as_deref()) {
            match index.get(language) {
                Some(&i) => counts[i].count += 1,
                None => {
                    index.insert(language, counts.len());
                    counts.push(LanguageCount {
                        name: language.to_string(),
                        count: 1,
                    });
                }
            }
        }

        // Stable sort keeps first-seen order among equal counts
        counts.sort_by_key(|l| Reverse(l.count));
        counts.truncate(self.top_languages);
        counts
    }

    fn latest(&self, repos: &[&Repository]) -> Vec<RepoCard> {
        let mut by_push: Vec<&Repository> = repos.to_vec();
        // None sorts below any timestamp, so never-pushed repos land last
        by_push.sort_by_key(|r| Reverse(r.pushed_at));

        by_push
            .into_iter()
            .take(self.latest_repos)
            .map(RepoCard::from)
            .collect()
    }
}

impl Default for StatsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn user() -> GitHubUser {
        GitHubUser {
            login: "octocat".to_string(),
            name: Some("The Octocat".to_string()),
            avatar_url: "https://avatars.githubusercontent.com/u/583231".to_string(),
            html_url: "https://github.com/octocat".to_string(),
            followers: 10,
            following: 2,
            public_repos: 8,
        }
    }

    fn repo(name: &str, language: Option<&str>, stars: u32, forks: u32, days_ago: i64) -> Repository {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        Repository {
            name: name.to_string(),
            html_url: format!("https://github.com/octocat/{}", name),
            description: None,
            stargazers_count: stars,
            forks_count: forks,
            language: language.map(str::to_string),
            private: false,
            archived: false,
            fork: false,
            pushed_at: Some(now - Duration::days(days_ago)),
        }
    }

    #[test]
    fn test_totals_and_derived_watchers() {
        let repos = vec![
            repo("a", Some("Rust"), 5, 1, 1),
            repo("b", Some("Go"), 3, 2, 2),
        ];
        let stats = StatsAggregator::new().aggregate(&user(), &repos);

        assert_eq!(stats.stats.total_stars, 8);
        assert_eq!(stats.stats.total_forks, 3);
        assert_eq!(stats.stats.total_watchers, 11);
        assert_eq!(stats.repo_count, 2);
        assert_eq!(stats.profile.login, "octocat");
    }

    #[test]
    fn test_private_and_archived_are_excluded_everywhere() {
        let mut private = repo("secret", Some("Haskell"), 100, 50, 0);
        private.private = true;
        let mut archived = repo("old", Some("Perl"), 40, 4, 0);
        archived.archived = true;
        let repos = vec![private, archived, repo("public", Some("Rust"), 1, 0, 3)];

        let stats = StatsAggregator::new().aggregate(&user(), &repos);

        assert_eq!(stats.repo_count, 1);
        assert_eq!(stats.stats.total_stars, 1);
        assert_eq!(stats.stats.total_forks, 0);
        assert_eq!(
            stats.top_languages,
            vec![LanguageCount { name: "Rust".to_string(), count: 1 }]
        );
        assert_eq!(stats.latest.len(), 1);
        assert_eq!(stats.latest[0].name, "public");
    }

    #[test]
    fn test_language_ranking_with_ties_in_first_seen_order() {
        let repos: Vec<_> = ["A", "A", "B", "C", "A", "B"]
            .iter()
            .enumerate()
            .map(|(i, lang)| repo(&format!("r{}", i), Some(*lang), 0, 0, i as i64))
            .collect();

        let stats = StatsAggregator::new().aggregate(&user(), &repos);
        let ranked: Vec<(&str, u32)> = stats
            .top_languages
            .iter()
            .map(|l| (l.name.as_str(), l.count))
            .collect();

        assert_eq!(ranked, vec![("A", 3), ("B", 2), ("C", 1)]);
    }

    #[test]
    fn test_language_histogram_is_capped_and_skips_unknown() {
        let repos = vec![
            repo("1", Some("Go"), 0, 0, 1),
            repo("2", Some("Rust"), 0, 0, 1),
            repo("3", Some("Zig"), 0, 0, 1),
            repo("4", Some("Rust"), 0, 0, 1),
            repo("5", Some("C"), 0, 0, 1),
            repo("6", Some("Lua"), 0, 0, 1),
            repo("7", Some("Nim"), 0, 0, 1),
            repo("8", None, 0, 0, 1),
            repo("9", None, 0, 0, 1),
        ];

        let stats = StatsAggregator::new().aggregate(&user(), &repos);
        let names: Vec<&str> = stats.top_languages.iter().map(|l| l.name.as_str()).collect();

        assert_eq!(names, vec!["Rust", "Go", "Zig", "C", "Lua"]);
        assert!(stats.top_languages.iter().all(|l| l.name != "Other"));
        assert_eq!(stats.repo_count, 9);
    }

    #[test]
    fn test_latest_sorted_by_push_time() {
        let repos = vec![
            repo("one-day", None, 0, 0, 1),
            repo("three-days", None, 0, 0, 3),
            repo("two-days", None, 0, 0, 2),
        ];

        let stats = StatsAggregator::new().aggregate(&user(), &repos);
        let names: Vec<&str> = stats.latest.iter().map(|r| r.name.as_str()).collect();

        assert_eq!(names, vec!["one-day", "two-days", "three-days"]);
    }

    #[test]
    fn test_latest_compares_calendar_time_not_strings() {
        // As text "00Z" sorts after "00.5Z"
        let a: Repository = serde_json::from_value(serde_json::json!({
            "name": "whole-second",
            "html_url": "https://github.com/octocat/whole-second",
            "description": null,
            "stargazers_count": 0,
            "forks_count": 0,
            "language": null,
            "pushed_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let b: Repository = serde_json::from_value(serde_json::json!({
            "name": "later",
            "html_url": "https://github.com/octocat/later",
            "description": null,
            "stargazers_count": 0,
            "forks_count": 0,
            "language": null,
            "pushed_at": "2024-05-01T10:00:00.5Z"
        }))
        .unwrap();

        let stats = StatsAggregator::new().aggregate(&user(), &[a, b]);
        assert_eq!(stats.latest[0].name, "later");
    }

    #[test]
    fn test_latest_is_capped_and_never_pushed_last() {
        let mut repos: Vec<_> = (0..8).map(|i| repo(&format!("r{}", i), None, 0, 0, i + 1)).collect();
        let mut empty = repo("empty", None, 0, 0, 0);
        empty.pushed_at = None;
        repos.insert(0, empty);

        let stats = StatsAggregator::new().aggregate(&user(), &repos);

        assert_eq!(stats.latest.len(), LATEST_REPOS);
        assert!(stats.latest.iter().all(|r| r.name != "empty"));
        assert_eq!(stats.latest[0].name, "r0");
    }

    #[test]
    fn test_aggregate_is_pure() {
        let repos = vec![
            repo("x", Some("Rust"), 2, 1, 4),
            repo("y", Some("Go"), 7, 0, 1),
        ];
        let snapshot = repos.clone();
        let aggregator = StatsAggregator::new();

        let first = aggregator.aggregate(&user(), &repos);
        let second = aggregator.aggregate(&user(), &repos);

        assert_eq!(first, second);
        assert_eq!(repos, snapshot);
    }
}
