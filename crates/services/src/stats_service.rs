use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use quiz_core::model::{SubjectId, SubjectStatistics, UserId, UserQuizStats};
use storage::repository::{StatisticsRepository, SubjectRepository};

use crate::error::StatsServiceError;

/// Subjects shown per user on the ranking board.
const TOP_SUBJECTS: usize = 3;

/// Name shown when a counter row outlives its subject.
const UNKNOWN_SUBJECT: &str = "Unknown";

//
// ─── VIEW TYPES ────────────────────────────────────────────────────────────────
//

/// Per-subject aggregate across all users, for the admin dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectOverview {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub total_attempts: u32,
    pub total_correct: u32,
    pub total_wrong: u32,
    /// Distinct signed-in users; guest attempts count toward the totals
    /// but not here.
    pub unique_users: u32,
}

/// One subject's contribution to a user's total score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubjectScore {
    pub subject_id: SubjectId,
    pub subject_name: String,
    pub correct_answers: u32,
}

/// One row of the ranking board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserRanking {
    pub position: u32,
    pub user_id: UserId,
    pub username: String,
    pub total_quizzes: u32,
    pub total_first_attempt_correct: u32,
    pub accuracy_percent: u32,
    /// Sum of first-attempt correct answers across all subjects.
    pub total_score: u32,
    /// The user's strongest subjects, best first.
    pub top_subjects: Vec<SubjectScore>,
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

fn subject_name(names: &HashMap<SubjectId, String>, subject_id: SubjectId) -> String {
    names
        .get(&subject_id)
        .cloned()
        .unwrap_or_else(|| UNKNOWN_SUBJECT.to_owned())
}

/// Collapses per-(subject, user) counter rows into one overview per
/// subject, most attempted first.
fn aggregate_subjects(
    rows: &[SubjectStatistics],
    names: &HashMap<SubjectId, String>,
) -> Vec<SubjectOverview> {
    struct Bucket {
        total_attempts: u32,
        total_correct: u32,
        total_wrong: u32,
        users: HashSet<UserId>,
    }

    let mut buckets: HashMap<SubjectId, Bucket> = HashMap::new();
    for row in rows {
        let bucket = buckets.entry(row.subject_id()).or_insert_with(|| Bucket {
            total_attempts: 0,
            total_correct: 0,
            total_wrong: 0,
            users: HashSet::new(),
        });
        bucket.total_attempts = bucket.total_attempts.saturating_add(row.total_attempts());
        bucket.total_correct = bucket.total_correct.saturating_add(row.correct_answers());
        bucket.total_wrong = bucket.total_wrong.saturating_add(row.wrong_answers());
        if let Some(user_id) = row.user_id() {
            bucket.users.insert(user_id);
        }
    }

    let mut overviews: Vec<SubjectOverview> = buckets
        .into_iter()
        .map(|(subject_id, bucket)| SubjectOverview {
            subject_id,
            subject_name: subject_name(names, subject_id),
            total_attempts: bucket.total_attempts,
            total_correct: bucket.total_correct,
            total_wrong: bucket.total_wrong,
            unique_users: u32::try_from(bucket.users.len()).unwrap_or(u32::MAX),
        })
        .collect();

    overviews.sort_by(|a, b| {
        b.total_attempts
            .cmp(&a.total_attempts)
            .then(a.subject_id.cmp(&b.subject_id))
    });
    overviews
}

/// Builds the ranking board from the aggregate rows.
///
/// Ordered by total score, then quizzes played, then first-attempt
/// corrects, then accuracy; positions are assigned after the sort.
fn build_rankings(
    user_rows: &[UserQuizStats],
    subject_rows: &[SubjectStatistics],
    names: &HashMap<SubjectId, String>,
) -> Vec<UserRanking> {
    let mut per_user_subject: HashMap<UserId, HashMap<SubjectId, u32>> = HashMap::new();
    for row in subject_rows {
        let Some(user_id) = row.user_id() else {
            continue; // the guest bucket never ranks
        };
        let subjects = per_user_subject.entry(user_id).or_default();
        let score = subjects.entry(row.subject_id()).or_insert(0);
        *score = score.saturating_add(row.correct_answers());
    }

    let mut rankings: Vec<UserRanking> = user_rows
        .iter()
        .map(|stats| {
            let subjects = per_user_subject.remove(&stats.user_id()).unwrap_or_default();

            let mut subject_scores: Vec<SubjectScore> = subjects
                .into_iter()
                .map(|(subject_id, correct_answers)| SubjectScore {
                    subject_id,
                    subject_name: subject_name(names, subject_id),
                    correct_answers,
                })
                .collect();
            subject_scores.sort_by(|a, b| {
                b.correct_answers
                    .cmp(&a.correct_answers)
                    .then(a.subject_id.cmp(&b.subject_id))
            });

            let total_score = subject_scores
                .iter()
                .fold(0_u32, |acc, s| acc.saturating_add(s.correct_answers));
            subject_scores.truncate(TOP_SUBJECTS);

            UserRanking {
                position: 0, // assigned after the sort
                user_id: stats.user_id(),
                username: stats.username().to_owned(),
                total_quizzes: stats.total_quizzes(),
                total_first_attempt_correct: stats.total_first_attempt_correct(),
                accuracy_percent: stats.accuracy_percent(),
                total_score,
                top_subjects: subject_scores,
            }
        })
        .collect();

    rankings.sort_by(|a, b| {
        b.total_score
            .cmp(&a.total_score)
            .then(b.total_quizzes.cmp(&a.total_quizzes))
            .then(
                b.total_first_attempt_correct
                    .cmp(&a.total_first_attempt_correct),
            )
            .then(b.accuracy_percent.cmp(&a.accuracy_percent))
            .then(a.username.cmp(&b.username))
    });

    for (index, ranking) in rankings.iter_mut().enumerate() {
        ranking.position = u32::try_from(index + 1).unwrap_or(u32::MAX);
    }
    rankings
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Read-side statistics queries for the admin dashboard and the ranking
/// board.
#[derive(Clone)]
pub struct StatsService {
    subjects: Arc<dyn SubjectRepository>,
    statistics: Arc<dyn StatisticsRepository>,
}

impl StatsService {
    #[must_use]
    pub fn new(
        subjects: Arc<dyn SubjectRepository>,
        statistics: Arc<dyn StatisticsRepository>,
    ) -> Self {
        Self {
            subjects,
            statistics,
        }
    }

    async fn subject_names(&self) -> Result<HashMap<SubjectId, String>, StatsServiceError> {
        let subjects = self.subjects.list_subjects(u32::MAX).await?;
        Ok(subjects
            .into_iter()
            .map(|s| (s.id(), s.name().to_owned()))
            .collect())
    }

    /// Raw per-(subject, user) counter rows, most recent attempt first.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn subject_statistics(
        &self,
        limit: u32,
    ) -> Result<Vec<SubjectStatistics>, StatsServiceError> {
        let rows = self.statistics.list_subject_statistics(limit).await?;
        Ok(rows)
    }

    /// Per-subject aggregates with distinct-user counts, most attempted
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn subject_overview(&self) -> Result<Vec<SubjectOverview>, StatsServiceError> {
        let rows = self.statistics.list_subject_statistics(u32::MAX).await?;
        let names = self.subject_names().await?;
        Ok(aggregate_subjects(&rows, &names))
    }

    /// Per-user aggregate rows, most quizzes first.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn user_stats(&self, limit: u32) -> Result<Vec<UserQuizStats>, StatsServiceError> {
        let rows = self.statistics.list_user_stats(limit).await?;
        Ok(rows)
    }

    /// The full ranking board.
    ///
    /// # Errors
    ///
    /// Returns `StatsServiceError::Storage` if repository access fails.
    pub async fn rankings(&self) -> Result<Vec<UserRanking>, StatsServiceError> {
        let user_rows = self.statistics.list_user_stats(u32::MAX).await?;
        let subject_rows = self.statistics.list_subject_statistics(u32::MAX).await?;
        let names = self.subject_names().await?;
        Ok(build_rankings(&user_rows, &subject_rows, &names))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{SubjectDelta, UserDelta};
    use quiz_core::time::fixed_now;

    fn subject_row(
        subject: u64,
        user: Option<UserId>,
        attempts: u32,
        correct: u32,
        wrong: u32,
    ) -> SubjectStatistics {
        SubjectStatistics::from_persisted(
            SubjectId::new(subject),
            user,
            attempts,
            correct,
            wrong,
            Some(fixed_now()),
        )
    }

    fn user_row(user: UserId, name: &str, quizzes: u32, correct: u32, questions: u32) -> UserQuizStats {
        UserQuizStats::from_persisted(user, name, quizzes, correct, questions, Some(fixed_now()))
    }

    fn names() -> HashMap<SubjectId, String> {
        HashMap::from([
            (SubjectId::new(1), "History".to_owned()),
            (SubjectId::new(2), "Math".to_owned()),
        ])
    }

    #[test]
    fn aggregate_subjects_sums_rows_and_counts_distinct_users() {
        let ana = UserId::random();
        let bo = UserId::random();
        let rows = vec![
            subject_row(1, Some(ana), 2, 5, 1),
            subject_row(1, Some(bo), 1, 2, 2),
            subject_row(1, None, 3, 1, 5), // guests count in totals only
            subject_row(2, Some(ana), 1, 4, 0),
        ];

        let overviews = aggregate_subjects(&rows, &names());
        assert_eq!(overviews.len(), 2);

        // subject 1 has the most attempts, so it leads
        assert_eq!(overviews[0].subject_id, SubjectId::new(1));
        assert_eq!(overviews[0].subject_name, "History");
        assert_eq!(overviews[0].total_attempts, 6);
        assert_eq!(overviews[0].total_correct, 8);
        assert_eq!(overviews[0].total_wrong, 8);
        assert_eq!(overviews[0].unique_users, 2);

        assert_eq!(overviews[1].subject_id, SubjectId::new(2));
        assert_eq!(overviews[1].unique_users, 1);
    }

    #[test]
    fn aggregate_subjects_falls_back_for_unknown_names() {
        let rows = vec![subject_row(9, None, 1, 0, 1)];
        let overviews = aggregate_subjects(&rows, &names());
        assert_eq!(overviews[0].subject_name, UNKNOWN_SUBJECT);
    }

    #[test]
    fn rankings_order_by_score_then_tiebreakers() {
        let ana = UserId::random();
        let bo = UserId::random();
        let cal = UserId::random();

        let user_rows = vec![
            user_row(ana, "ana", 3, 9, 12),
            user_row(bo, "bo", 5, 9, 15),
            user_row(cal, "cal", 1, 2, 4),
        ];
        let subject_rows = vec![
            subject_row(1, Some(ana), 2, 6, 2),
            subject_row(2, Some(ana), 1, 3, 1),
            subject_row(1, Some(bo), 5, 9, 6),
            subject_row(1, Some(cal), 1, 2, 2),
            subject_row(2, None, 4, 8, 8), // guest bucket never ranks
        ];

        let rankings = build_rankings(&user_rows, &subject_rows, &names());
        assert_eq!(rankings.len(), 3);

        // ana and bo tie on score 9; bo played more quizzes
        assert_eq!(rankings[0].username, "bo");
        assert_eq!(rankings[0].position, 1);
        assert_eq!(rankings[0].total_score, 9);

        assert_eq!(rankings[1].username, "ana");
        assert_eq!(rankings[1].position, 2);
        assert_eq!(rankings[1].accuracy_percent, 75);
        // ana's strongest subject first
        assert_eq!(rankings[1].top_subjects.len(), 2);
        assert_eq!(rankings[1].top_subjects[0].subject_id, SubjectId::new(1));
        assert_eq!(rankings[1].top_subjects[0].correct_answers, 6);

        assert_eq!(rankings[2].username, "cal");
        assert_eq!(rankings[2].position, 3);
    }

    #[test]
    fn rankings_keep_at_most_three_top_subjects() {
        let ana = UserId::random();
        let user_rows = vec![user_row(ana, "ana", 4, 10, 16)];
        let subject_rows = vec![
            subject_row(1, Some(ana), 1, 4, 0),
            subject_row(2, Some(ana), 1, 3, 1),
            subject_row(3, Some(ana), 1, 2, 2),
            subject_row(4, Some(ana), 1, 1, 3),
        ];

        let rankings = build_rankings(&user_rows, &subject_rows, &names());
        assert_eq!(rankings[0].top_subjects.len(), TOP_SUBJECTS);
        assert_eq!(rankings[0].total_score, 10); // score counts all subjects
        assert_eq!(rankings[0].top_subjects[0].correct_answers, 4);
    }

    #[tokio::test]
    async fn service_queries_flow_through_the_repositories() {
        use storage::repository::{InMemoryRepository, NewSubjectRecord, StatisticsRepository};

        let repo = InMemoryRepository::new();
        let subject = quiz_core::model::Subject::new(
            SubjectId::new(1),
            "Solo",
            None,
            fixed_now(),
        )
        .unwrap();
        let subject_id = repo
            .insert_new_subject(NewSubjectRecord::from_subject(&subject))
            .await
            .unwrap();

        let ana = UserId::random();
        repo.apply_subject_delta(
            subject_id,
            Some(ana),
            &SubjectDelta {
                attempts_increment: 1,
                correct_increment: 2,
                wrong_increment: 1,
                recorded_at: fixed_now(),
            },
        )
        .await
        .unwrap();
        repo.apply_user_delta(
            ana,
            "ana",
            &UserDelta {
                quizzes_increment: 1,
                first_attempt_correct_increment: 2,
                questions_increment: 3,
                recorded_at: fixed_now(),
            },
        )
        .await
        .unwrap();

        let service = StatsService::new(Arc::new(repo.clone()), Arc::new(repo));
        let overview = service.subject_overview().await.unwrap();
        assert_eq!(overview.len(), 1);
        assert_eq!(overview[0].subject_name, "Solo");
        assert_eq!(overview[0].unique_users, 1);

        let rankings = service.rankings().await.unwrap();
        assert_eq!(rankings.len(), 1);
        assert_eq!(rankings[0].username, "ana");
        assert_eq!(rankings[0].total_score, 2);
        assert_eq!(rankings[0].accuracy_percent, 67);
    }
}
