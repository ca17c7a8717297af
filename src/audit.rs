use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::server::{AuditResult, JobOverview};

/// View that every job belongs to; it says nothing about curation.
pub const ALL_VIEW: &str = "All";

pub const DEFAULT_STALE_AFTER_DAYS: i64 = 7;

/// A job whose last build is older than the staleness threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaleJob {
    pub name: String,
    /// Whole days since the last build started
    pub days: i64,
}

impl fmt::Display for StaleJob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} days ago", self.name, self.days)
    }
}

/// The four audit findings for one server snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Findings {
    pub collected_at: DateTime<Utc>,
    pub outside_views: Vec<String>,
    pub never_run: Vec<String>,
    pub never_passed: Vec<String>,
    pub stale: Vec<StaleJob>,
}

impl Findings {
    pub fn collect(result: &AuditResult, now: DateTime<Utc>, stale_after: TimeDelta) -> Self {
        Self {
            collected_at: now,
            outside_views: outside_views(result),
            never_run: never_run(result),
            never_passed: never_passed(result),
            stale: stale_jobs(result, now, stale_after),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.outside_views.is_empty()
            && self.never_run.is_empty()
            && self.never_passed.is_empty()
            && self.stale.is_empty()
    }
}

/// Jobs paired with their overview; jobs that could not be enriched drop out.
fn enriched(result: &AuditResult) -> impl Iterator<Item = (&str, &JobOverview)> {
    result
        .jobs
        .iter()
        .filter_map(|job| job.overview.as_ref().map(|ov| (job.name.as_str(), ov)))
}

/// Jobs last built longer than `stale_after` before `now`, oldest first.
///
/// Jobs without a build or without a build timestamp are left to
/// [`never_run`].
pub fn stale_jobs(result: &AuditResult, now: DateTime<Utc>, stale_after: TimeDelta) -> Vec<StaleJob> {
    let mut jobs: Vec<_> = enriched(result).collect();
    jobs.sort_by_key(|(_, overview)| overview.last_build_timestamp());

    jobs.into_iter()
        .filter(|(_, overview)| overview.last_build.exists())
        .filter_map(|(name, overview)| {
            let timestamp = overview.last_build_timestamp();
            if timestamp <= 0 {
                return None;
            }
            let built_at = DateTime::<Utc>::from_timestamp_millis(timestamp)?;
            let elapsed = now - built_at;

            (elapsed > stale_after).then(|| StaleJob {
                name: name.to_string(),
                days: elapsed.num_hours() / 24,
            })
        })
        .collect()
}

/// Jobs that have run but never succeeded.
pub fn never_passed(result: &AuditResult) -> Vec<String> {
    enriched(result)
        .filter(|(_, ov)| ov.last_build.exists() && !ov.last_successful_build.exists())
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Jobs with no build at all.
pub fn never_run(result: &AuditResult) -> Vec<String> {
    enriched(result)
        .filter(|(_, ov)| !ov.last_build.exists() && !ov.last_successful_build.exists())
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Jobs not listed by any view other than [`ALL_VIEW`], in listing order.
pub fn outside_views(result: &AuditResult) -> Vec<String> {
    let assigned: IndexSet<&str> = result
        .views
        .iter()
        .filter(|view| view.name != ALL_VIEW)
        .filter_map(|view| view.detail.as_ref())
        .flat_map(|detail| detail.jobs.iter().map(|job| job.name.as_str()))
        .collect();

    result
        .jobs
        .iter()
        .filter(|job| !assigned.contains(job.name.as_str()))
        .map(|job| job.name.clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::{BuildOverview, BuildReference, JobSummary, ViewDetail, ViewSummary};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-10-18T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn build(number: u64, timestamp: Option<DateTime<Utc>>) -> BuildReference {
        BuildReference {
            number,
            url: String::new(),
            overview: timestamp.map(|ts| BuildOverview {
                timestamp: ts.timestamp_millis(),
                duration_millis: 1000,
            }),
        }
    }

    fn job(name: &str, last: BuildReference, success: u64) -> JobSummary {
        JobSummary {
            name: name.to_string(),
            url: format!("http://ci/job/{name}/"),
            color: "blue".to_string(),
            overview: Some(JobOverview {
                name: name.to_string(),
                last_build: last,
                last_successful_build: build(success, None),
                ..JobOverview::default()
            }),
        }
    }

    fn bare_job(name: &str) -> JobSummary {
        JobSummary {
            name: name.to_string(),
            ..JobSummary::default()
        }
    }

    fn view(name: &str, members: &[&str]) -> ViewSummary {
        ViewSummary {
            name: name.to_string(),
            detail: Some(ViewDetail {
                name: name.to_string(),
                jobs: members.iter().map(|m| bare_job(m)).collect(),
                ..ViewDetail::default()
            }),
            ..ViewSummary::default()
        }
    }

    fn days_ago(days: i64) -> Option<DateTime<Utc>> {
        Some(now() - TimeDelta::days(days))
    }

    fn week() -> TimeDelta {
        TimeDelta::days(DEFAULT_STALE_AFTER_DAYS)
    }

    #[cfg(test)]
    mod stale_jobs {
        use super::*;

        #[test]
        fn sorts_oldest_first() {
            let result = AuditResult {
                jobs: vec![
                    job("recent", build(1, days_ago(10)), 1),
                    job("ancient", build(1, days_ago(400)), 1),
                    job("middle", build(1, days_ago(30)), 1),
                ],
                views: vec![],
            };

            let names: Vec<_> = stale_jobs(&result, now(), week())
                .into_iter()
                .map(|s| s.name)
                .collect();
            assert_eq!(names, vec!["ancient", "middle", "recent"]);
        }

        #[test]
        fn reports_whole_days() {
            let built = now() - TimeDelta::days(8) - TimeDelta::hours(23);
            let result = AuditResult {
                jobs: vec![job("A", build(5, Some(built)), 5)],
                views: vec![],
            };

            let stale = stale_jobs(&result, now(), week());
            assert_eq!(stale[0].days, 8);
            assert_eq!(stale[0].to_string(), "A 8 days ago");
        }

        #[test]
        fn ignores_recent_builds() {
            let result = AuditResult {
                jobs: vec![
                    job("yesterday", build(3, days_ago(1)), 3),
                    job("exactly-a-week", build(3, days_ago(7)), 3),
                ],
                views: vec![],
            };

            assert!(stale_jobs(&result, now(), week()).is_empty());
        }

        #[test]
        fn ignores_jobs_without_builds_or_timestamps() {
            let result = AuditResult {
                jobs: vec![
                    job("never", build(0, None), 0),
                    job("no-overview", build(4, None), 4),
                    bare_job("unreachable"),
                ],
                views: vec![],
            };

            assert!(stale_jobs(&result, now(), week()).is_empty());
        }

        #[test]
        fn honours_custom_threshold() {
            let result = AuditResult {
                jobs: vec![job("A", build(1, days_ago(3)), 1)],
                views: vec![],
            };

            assert_eq!(stale_jobs(&result, now(), TimeDelta::days(2)).len(), 1);
            assert!(stale_jobs(&result, now(), week()).is_empty());
        }
    }

    #[cfg(test)]
    mod build_history {
        use super::*;

        #[test]
        fn job_without_builds_never_ran() {
            let result = AuditResult {
                jobs: vec![job("B", build(0, None), 0)],
                views: vec![],
            };

            assert_eq!(never_run(&result), vec!["B"]);
            assert!(never_passed(&result).is_empty());
            assert!(stale_jobs(&result, now(), week()).is_empty());
        }

        #[test]
        fn failing_job_never_passed() {
            let result = AuditResult {
                jobs: vec![job("C", build(3, days_ago(1)), 0)],
                views: vec![],
            };

            assert_eq!(never_passed(&result), vec!["C"]);
            assert!(never_run(&result).is_empty());
        }

        #[test]
        fn unenriched_job_has_no_build_findings() {
            let result = AuditResult {
                jobs: vec![bare_job("lost")],
                views: vec![],
            };

            assert!(never_run(&result).is_empty());
            assert!(never_passed(&result).is_empty());
            assert_eq!(outside_views(&result), vec!["lost"]);
        }

        #[test]
        fn preserves_listing_order() {
            let result = AuditResult {
                jobs: vec![
                    job("z", build(0, None), 0),
                    job("a", build(0, None), 0),
                    job("m", build(0, None), 0),
                ],
                views: vec![],
            };

            assert_eq!(never_run(&result), vec!["z", "a", "m"]);
        }
    }

    #[cfg(test)]
    mod outside_views {
        use super::*;

        #[test]
        fn ignores_membership_of_all_view() {
            let result = AuditResult {
                jobs: vec![bare_job("A"), bare_job("B")],
                views: vec![view("All", &["A", "B"]), view("team", &["A"])],
            };

            assert_eq!(outside_views(&result), vec!["B"]);
        }

        #[test]
        fn union_of_all_curated_views() {
            let result = AuditResult {
                jobs: vec![bare_job("A"), bare_job("B"), bare_job("C")],
                views: vec![view("team", &["A"]), view("ops", &["C", "A"])],
            };

            assert_eq!(outside_views(&result), vec!["B"]);
        }

        #[test]
        fn every_job_outside_when_only_all_exists() {
            let result = AuditResult {
                jobs: vec![bare_job("A"), bare_job("B")],
                views: vec![view("All", &["A", "B"])],
            };

            assert_eq!(outside_views(&result), vec!["A", "B"]);
        }
    }

    #[test]
    fn test_collect_is_idempotent() {
        let result = AuditResult {
            jobs: vec![
                job("A", build(5, days_ago(8)), 5),
                job("B", build(0, None), 0),
                job("C", build(3, days_ago(1)), 0),
            ],
            views: vec![view("team", &["A"])],
        };

        let first = Findings::collect(&result, now(), week());
        let second = Findings::collect(&result, now(), week());

        assert_eq!(first, second);
        assert!(!first.is_empty());
        assert_eq!(first.stale[0].to_string(), "A 8 days ago");
        assert_eq!(first.never_run, vec!["B"]);
        assert_eq!(first.never_passed, vec!["C"]);
        assert_eq!(first.outside_views, vec!["B", "C"]);
    }
}
