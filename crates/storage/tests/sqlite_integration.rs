use quiz_core::model::{
    Question, Subject, SubjectDelta, SubjectId, User, UserDelta, UserId, UserRole,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    NewQuestionRecord, NewSubjectRecord, QuestionRepository, StatisticsRepository,
    SubjectRepository, UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn subject_record(name: &str) -> NewSubjectRecord {
    NewSubjectRecord {
        name: name.to_owned(),
        description: Some("seeded".into()),
        created_at: fixed_now(),
    }
}

fn question_record(subject_id: SubjectId, prompt: &str, correct: usize) -> NewQuestionRecord {
    NewQuestionRecord {
        subject_id,
        prompt: prompt.to_owned(),
        options: vec![
            "north".into(),
            "south".into(),
            "east".into(),
            "west".into(),
        ],
        correct_option: correct,
        fun_fact: Some("compass points".into()),
    }
}

fn subject_delta(correct: u32, wrong: u32) -> SubjectDelta {
    SubjectDelta {
        attempts_increment: 1,
        correct_increment: correct,
        wrong_increment: wrong,
        recorded_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_round_trips_subjects_and_questions() {
    let repo = connect("memdb_catalog").await;

    let subject_id = repo
        .insert_new_subject(subject_record("Geography"))
        .await
        .unwrap();
    let fetched = repo.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(fetched.name(), "Geography");
    assert_eq!(fetched.description(), Some("seeded"));
    assert_eq!(fetched.created_at(), fixed_now());

    let q1 = repo
        .insert_new_question(question_record(subject_id, "Where does the sun rise?", 2))
        .await
        .unwrap();
    let q2 = repo
        .insert_new_question(question_record(subject_id, "Where does the sun set?", 3))
        .await
        .unwrap();
    assert_ne!(q1, q2);

    let questions = repo.questions_for_subject(subject_id).await.unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].prompt(), "Where does the sun rise?");
    assert_eq!(questions[0].correct_option(), 2);
    assert_eq!(questions[0].fun_fact(), Some("compass points"));
    assert_eq!(questions[0].options().len(), 4);
    assert_eq!(repo.count_for_subject(subject_id).await.unwrap(), 2);
}

#[tokio::test]
async fn sqlite_updates_preserve_subject_created_at() {
    let repo = connect("memdb_update").await;

    let subject_id = repo
        .insert_new_subject(subject_record("Biology"))
        .await
        .unwrap();
    let later = fixed_now() + chrono::Duration::days(1);
    let renamed = Subject::new(subject_id, "Marine Biology", None, later).unwrap();
    repo.upsert_subject(&renamed).await.unwrap();

    let fetched = repo.get_subject(subject_id).await.unwrap().unwrap();
    assert_eq!(fetched.name(), "Marine Biology");
    // created_at sticks to the original insert
    assert_eq!(fetched.created_at(), fixed_now());
}

#[tokio::test]
async fn sqlite_question_update_and_delete() {
    let repo = connect("memdb_questions").await;

    let subject_id = repo
        .insert_new_subject(subject_record("History"))
        .await
        .unwrap();
    let question_id = repo
        .insert_new_question(question_record(subject_id, "First question", 0))
        .await
        .unwrap();

    let updated = Question::new(
        question_id,
        subject_id,
        "Rewritten question",
        vec!["1".into(), "2".into(), "3".into(), "4".into()],
        1,
        None,
    )
    .unwrap();
    repo.upsert_question(&updated).await.unwrap();

    let fetched = repo.get_question(question_id).await.unwrap().unwrap();
    assert_eq!(fetched.prompt(), "Rewritten question");
    assert_eq!(fetched.correct_option(), 1);
    assert_eq!(fetched.fun_fact(), None);

    repo.delete_question(question_id).await.unwrap();
    assert!(repo.get_question(question_id).await.unwrap().is_none());
    assert!(matches!(
        repo.delete_question(question_id).await,
        Err(storage::repository::StorageError::NotFound)
    ));
}

#[tokio::test]
async fn sqlite_deleting_a_subject_cascades() {
    let repo = connect("memdb_cascade").await;

    let subject_id = repo
        .insert_new_subject(subject_record("Chemistry"))
        .await
        .unwrap();
    let question_id = repo
        .insert_new_question(question_record(subject_id, "Q", 0))
        .await
        .unwrap();
    repo.apply_subject_delta(subject_id, None, &subject_delta(1, 0))
        .await
        .unwrap();

    repo.delete_subject(subject_id).await.unwrap();
    assert!(repo.get_question(question_id).await.unwrap().is_none());
    assert!(
        repo.get_subject_statistics(subject_id, None)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn sqlite_accumulates_subject_deltas_per_bucket() {
    let repo = connect("memdb_subject_stats").await;

    let subject_id = repo
        .insert_new_subject(subject_record("Math"))
        .await
        .unwrap();
    let user = UserId::random();

    repo.apply_subject_delta(subject_id, Some(user), &subject_delta(2, 1))
        .await
        .unwrap();
    repo.apply_subject_delta(subject_id, Some(user), &subject_delta(3, 0))
        .await
        .unwrap();
    repo.apply_subject_delta(subject_id, None, &subject_delta(1, 2))
        .await
        .unwrap();
    repo.apply_subject_delta(subject_id, None, &subject_delta(0, 3))
        .await
        .unwrap();

    let user_row = repo
        .get_subject_statistics(subject_id, Some(user))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user_row.total_attempts(), 2);
    assert_eq!(user_row.correct_answers(), 5);
    assert_eq!(user_row.wrong_answers(), 1);
    assert_eq!(user_row.last_attempt_at(), Some(fixed_now()));
    assert_eq!(user_row.user_id(), Some(user));

    // repeat guest attempts collapse into one bucket row
    let guest_row = repo
        .get_subject_statistics(subject_id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guest_row.total_attempts(), 2);
    assert_eq!(guest_row.wrong_answers(), 5);
    assert_eq!(guest_row.user_id(), None);

    let listed = repo.list_subject_statistics(10).await.unwrap();
    assert_eq!(listed.len(), 2);
}

#[tokio::test]
async fn sqlite_user_stats_round_trip_and_cascade() {
    let repo = connect("memdb_user_stats").await;

    let user = User::new(UserId::random(), "ana", UserRole::Student).unwrap();
    repo.upsert_user(&user).await.unwrap();

    let fetched = repo.get_user(user.id()).await.unwrap().unwrap();
    assert_eq!(fetched.username(), "ana");
    assert_eq!(fetched.role(), UserRole::Student);

    let delta = UserDelta {
        quizzes_increment: 1,
        first_attempt_correct_increment: 2,
        questions_increment: 3,
        recorded_at: fixed_now(),
    };
    repo.apply_user_delta(user.id(), "ana", &delta).await.unwrap();
    repo.apply_user_delta(user.id(), "ana", &delta).await.unwrap();

    let stats = repo.get_user_stats(user.id()).await.unwrap().unwrap();
    assert_eq!(stats.total_quizzes(), 2);
    assert_eq!(stats.total_first_attempt_correct(), 4);
    assert_eq!(stats.total_questions(), 6);

    let listed = repo.list_user_stats(10).await.unwrap();
    assert_eq!(listed.len(), 1);

    // deleting the account removes the aggregate row via the foreign key
    repo.delete_user(user.id()).await.unwrap();
    assert!(repo.get_user(user.id()).await.unwrap().is_none());
    assert!(repo.get_user_stats(user.id()).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_lists_users_by_username() {
    let repo = connect("memdb_users").await;

    for name in ["zoe", "ana", "mia"] {
        let user = User::new(UserId::random(), name, UserRole::Student).unwrap();
        repo.upsert_user(&user).await.unwrap();
    }
    let admin = User::new(UserId::random(), "root", UserRole::Admin).unwrap();
    repo.upsert_user(&admin).await.unwrap();

    let users = repo.list_users(10).await.unwrap();
    let names: Vec<&str> = users.iter().map(User::username).collect();
    assert_eq!(names, vec!["ana", "mia", "root", "zoe"]);
    assert!(users.iter().any(User::is_admin));

    let limited = repo.list_users(2).await.unwrap();
    assert_eq!(limited.len(), 2);
}

#[tokio::test]
async fn sqlite_rejects_duplicate_usernames() {
    let repo = connect("memdb_conflict").await;

    let first = User::new(UserId::random(), "sam", UserRole::Student).unwrap();
    repo.upsert_user(&first).await.unwrap();

    // a different id with the same username violates the UNIQUE constraint
    let second = User::new(UserId::random(), "sam", UserRole::Student).unwrap();
    assert!(repo.upsert_user(&second).await.is_err());
}
