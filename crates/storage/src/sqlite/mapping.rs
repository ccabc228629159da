use quiz_core::model::{
    Question, QuestionId, Subject, SubjectId, SubjectStatistics, User, UserId, UserQuizStats,
    UserRole,
};
use sqlx::Row;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn id_i64(field: &'static str, v: u64) -> Result<i64, StorageError> {
    i64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} overflow")))
}

pub(crate) fn u32_from_i64(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

pub(crate) fn subject_id_from_i64(v: i64) -> Result<SubjectId, StorageError> {
    Ok(SubjectId::new(i64_to_u64("subject_id", v)?))
}

pub(crate) fn question_id_from_i64(v: i64) -> Result<QuestionId, StorageError> {
    Ok(QuestionId::new(i64_to_u64("question_id", v)?))
}

/// The guest bucket is stored as the empty string so the
/// `UNIQUE (subject_id, user_id)` constraint collapses guest rows.
pub(crate) fn user_id_to_text(user_id: Option<UserId>) -> String {
    user_id.map(|id| id.to_string()).unwrap_or_default()
}

pub(crate) fn user_id_from_text(value: &str) -> Result<Option<UserId>, StorageError> {
    if value.is_empty() {
        return Ok(None);
    }
    value.parse::<UserId>().map(Some).map_err(ser)
}

pub(crate) fn required_user_id(value: &str) -> Result<UserId, StorageError> {
    value.parse::<UserId>().map_err(ser)
}

pub(crate) fn map_subject_row(row: &sqlx::sqlite::SqliteRow) -> Result<Subject, StorageError> {
    Subject::new(
        subject_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<Option<String>, _>("description").map_err(ser)?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_question_row(row: &sqlx::sqlite::SqliteRow) -> Result<Question, StorageError> {
    let correct_option_i64: i64 = row.try_get("correct_option").map_err(ser)?;
    let correct_option = usize::try_from(correct_option_i64).map_err(|_| {
        StorageError::Serialization(format!("invalid correct_option: {correct_option_i64}"))
    })?;

    let options = vec![
        row.try_get::<String, _>("option_a").map_err(ser)?,
        row.try_get::<String, _>("option_b").map_err(ser)?,
        row.try_get::<String, _>("option_c").map_err(ser)?,
        row.try_get::<String, _>("option_d").map_err(ser)?,
    ];

    Question::new(
        question_id_from_i64(row.try_get::<i64, _>("id").map_err(ser)?)?,
        subject_id_from_i64(row.try_get::<i64, _>("subject_id").map_err(ser)?)?,
        row.try_get::<String, _>("prompt").map_err(ser)?,
        options,
        correct_option,
        row.try_get::<Option<String>, _>("fun_fact").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_user_row(row: &sqlx::sqlite::SqliteRow) -> Result<User, StorageError> {
    let role_str: String = row.try_get("role").map_err(ser)?;
    User::new(
        required_user_id(row.try_get::<String, _>("id").map_err(ser)?.as_str())?,
        row.try_get::<String, _>("username").map_err(ser)?,
        UserRole::parse(&role_str).map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_subject_stats_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<SubjectStatistics, StorageError> {
    Ok(SubjectStatistics::from_persisted(
        subject_id_from_i64(row.try_get::<i64, _>("subject_id").map_err(ser)?)?,
        user_id_from_text(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        u32_from_i64(
            "total_attempts",
            row.try_get::<i64, _>("total_attempts").map_err(ser)?,
        )?,
        u32_from_i64(
            "correct_answers",
            row.try_get::<i64, _>("correct_answers").map_err(ser)?,
        )?,
        u32_from_i64(
            "wrong_answers",
            row.try_get::<i64, _>("wrong_answers").map_err(ser)?,
        )?,
        row.try_get("last_attempt_at").map_err(ser)?,
    ))
}

pub(crate) fn map_user_stats_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<UserQuizStats, StorageError> {
    Ok(UserQuizStats::from_persisted(
        required_user_id(row.try_get::<String, _>("user_id").map_err(ser)?.as_str())?,
        row.try_get::<String, _>("username").map_err(ser)?,
        u32_from_i64(
            "total_quizzes",
            row.try_get::<i64, _>("total_quizzes").map_err(ser)?,
        )?,
        u32_from_i64(
            "total_first_attempt_correct",
            row.try_get::<i64, _>("total_first_attempt_correct")
                .map_err(ser)?,
        )?,
        u32_from_i64(
            "total_questions",
            row.try_get::<i64, _>("total_questions").map_err(ser)?,
        )?,
        row.try_get("last_quiz_at").map_err(ser)?,
    ))
}
