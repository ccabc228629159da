use quiz_core::model::UserRole;
use quiz_core::time::fixed_clock;
use services::AppServices;

/// The four-option bank used across the flow tests; the second option is
/// always the answer key.
fn options() -> Vec<String> {
    vec!["a".into(), "b".into(), "c".into(), "d".into()]
}

#[tokio::test]
async fn full_quiz_flow_records_statistics_once() {
    let services = AppServices::new_in_memory(fixed_clock());

    let subject_id = services
        .subject_service()
        .create_subject("Geography".to_string(), None)
        .await
        .unwrap();
    for prompt in ["Q1", "Q2", "Q3"] {
        services
            .question_service()
            .create_question(subject_id, prompt.to_string(), options(), 1, None)
            .await
            .unwrap();
    }
    let user_id = services
        .user_service()
        .create_user("ana".to_string(), UserRole::Student)
        .await
        .unwrap();

    let quiz = services.quiz_loop();
    let mut session = quiz.start_quiz(subject_id, Some(user_id)).await.unwrap();

    // Q1 correct, Q2 wrong, Q3 correct, then Q2 again: the miss recycles
    // to the back of the queue.
    let mut presented = Vec::new();
    for selection in [1, 0, 1, 1] {
        presented.push(session.current_question().unwrap().prompt().to_owned());
        let event = quiz.submit_answer(&mut session, selection).unwrap();
        assert_eq!(event.is_correct, selection == 1);
        quiz.advance(&mut session).await.unwrap();
    }
    assert_eq!(presented, vec!["Q1", "Q2", "Q3", "Q2"]);
    assert!(session.is_complete());

    let deltas = session
        .recorded_deltas()
        .expect("recorded at completion")
        .clone();
    assert_eq!(deltas.subject_delta.attempts_increment, 1);
    assert_eq!(deltas.subject_delta.correct_increment, 2);
    assert_eq!(deltas.subject_delta.wrong_increment, 1);

    // the retry hook is idempotent once the deltas landed
    let again = quiz.record_outcome(&mut session).await.unwrap();
    assert_eq!(again, deltas);

    let rankings = services.stats_service().rankings().await.unwrap();
    assert_eq!(rankings.len(), 1);
    assert_eq!(rankings[0].username, "ana");
    assert_eq!(rankings[0].total_quizzes, 1);
    assert_eq!(rankings[0].total_first_attempt_correct, 2);
    assert_eq!(rankings[0].accuracy_percent, 67);
    assert_eq!(rankings[0].total_score, 2);

    let overview = services.stats_service().subject_overview().await.unwrap();
    assert_eq!(overview.len(), 1);
    assert_eq!(overview[0].subject_name, "Geography");
    assert_eq!(overview[0].total_attempts, 1);
    assert_eq!(overview[0].total_correct, 2);
    assert_eq!(overview[0].total_wrong, 1);
    assert_eq!(overview[0].unique_users, 1);
}

#[tokio::test]
async fn repeated_sessions_accumulate_counters() {
    let services = AppServices::new_in_memory(fixed_clock());

    let subject_id = services
        .subject_service()
        .create_subject("Math".to_string(), None)
        .await
        .unwrap();
    for prompt in ["Q1", "Q2"] {
        services
            .question_service()
            .create_question(subject_id, prompt.to_string(), options(), 1, None)
            .await
            .unwrap();
    }
    let user_id = services
        .user_service()
        .create_user("bo".to_string(), UserRole::Student)
        .await
        .unwrap();

    let quiz = services.quiz_loop();
    for _ in 0..2 {
        let mut session = quiz.start_quiz(subject_id, Some(user_id)).await.unwrap();
        while !session.is_complete() {
            quiz.submit_answer(&mut session, 1).unwrap();
            quiz.advance(&mut session).await.unwrap();
        }
    }

    let stats = services.stats_service().user_stats(10).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].total_quizzes(), 2);
    assert_eq!(stats[0].total_first_attempt_correct(), 4);
    assert_eq!(stats[0].total_questions(), 4);
    assert_eq!(stats[0].accuracy_percent(), 100);
}

#[tokio::test]
async fn worst_case_session_terminates_and_records_zero_accuracy() {
    let services = AppServices::new_in_memory(fixed_clock());

    let subject_id = services
        .subject_service()
        .create_subject("Hardest".to_string(), None)
        .await
        .unwrap();
    for i in 0..4 {
        services
            .question_service()
            .create_question(subject_id, format!("Q{i}"), options(), 1, None)
            .await
            .unwrap();
    }

    let quiz = services.quiz_loop();
    let mut session = quiz.start_quiz(subject_id, None).await.unwrap();

    // miss every question once before answering it correctly
    let mut missed = std::collections::HashSet::new();
    let mut steps = 0;
    while !session.is_complete() {
        let id = session.current_question().unwrap().id();
        let selection = if missed.insert(id) { 0 } else { 1 };
        quiz.submit_answer(&mut session, selection).unwrap();
        quiz.advance(&mut session).await.unwrap();

        steps += 1;
        assert!(steps <= 20, "queue must drain in bounded steps");
        assert!(session.remaining_count() <= 4, "queue must never grow");
    }
    assert_eq!(steps, 8);

    let deltas = session.recorded_deltas().unwrap();
    assert_eq!(deltas.subject_delta.correct_increment, 0);
    assert_eq!(deltas.subject_delta.wrong_increment, 4);
    assert!(deltas.user_delta.is_none());
}

#[tokio::test]
async fn out_of_turn_calls_leave_the_session_usable() {
    let services = AppServices::new_in_memory(fixed_clock());

    let subject_id = services
        .subject_service()
        .create_subject("Strict".to_string(), None)
        .await
        .unwrap();
    services
        .question_service()
        .create_question(subject_id, "Q".to_string(), options(), 1, None)
        .await
        .unwrap();

    let quiz = services.quiz_loop();
    let mut session = quiz.start_quiz(subject_id, None).await.unwrap();

    // advance before any submission is rejected
    assert!(quiz.advance(&mut session).await.is_err());
    let progress = session.progress();
    assert_eq!(progress.mastered, 0);
    assert_eq!(progress.remaining, 1);

    // the session still runs to completion afterwards
    quiz.submit_answer(&mut session, 1).unwrap();
    let advance = quiz.advance(&mut session).await.unwrap();
    assert!(advance.is_complete);
    assert!(advance.recorded.is_some());
}
