use chrono::NaiveDate;
use ghotidle_core::db::open_db_in_memory;
use ghotidle_core::{
    evaluate_guess, ComposeRequest, GuessService, GuessServiceError, LetterStatus,
    MemoryDictionary, PuzzleService, SqlitePuzzleRepository,
};
use std::collections::HashMap;

const WORDS: &[&str] = &["fish", "ball", "llama", "eerie", "abcd", "sheep", "speed", "a"];

#[test]
fn verdict_invariants_hold_for_word_pairs() {
    for secret in WORDS {
        for guess in WORDS {
            let result = evaluate_guess(secret, guess);
            assert_eq!(result.feedback.len(), guess.chars().count());
            assert_eq!(result.is_correct, secret == guess, "{secret}/{guess}");

            if !result.length_match {
                assert!(result.statuses().iter().all(|s| *s == LetterStatus::Absent));
                continue;
            }

            // Correct and present letters never outnumber the secret's copies.
            let mut available: HashMap<char, usize> = HashMap::new();
            for letter in secret.chars() {
                *available.entry(letter).or_default() += 1;
            }
            for item in &result.feedback {
                if item.status != LetterStatus::Absent {
                    let left = available.get_mut(&item.letter).unwrap();
                    assert!(*left > 0, "{secret}/{guess} over-claims {}", item.letter);
                    *left -= 1;
                }
            }
        }
    }
}

#[test]
fn repeated_guess_letters_claim_secret_copies_once() {
    use LetterStatus::{Absent, Correct, Present};

    assert_eq!(
        evaluate_guess("speed", "eerie").statuses(),
        vec![Present, Present, Absent, Absent, Absent]
    );
    assert_eq!(
        evaluate_guess("sheep", "speed").statuses(),
        vec![Correct, Present, Correct, Correct, Absent]
    );
}

#[test]
fn feedback_serializes_to_snake_case_statuses() {
    let json = serde_json::to_value(evaluate_guess("fish", "fist")).unwrap();
    assert_eq!(json["is_correct"], false);
    assert_eq!(json["length_match"], true);
    assert_eq!(json["feedback"][0]["letter"], "f");
    assert_eq!(json["feedback"][0]["status"], "correct");
    assert_eq!(json["feedback"][3]["status"], "absent");
    assert_eq!(json["feedback"][3]["position"], 3);
}

#[test]
fn guesses_resolve_scheduled_puzzles_by_date_and_id() {
    let conn = open_db_in_memory().unwrap();
    let today = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
    let composer = PuzzleService::new(
        MemoryDictionary::new(["fish"]),
        SqlitePuzzleRepository::new(&conn),
    );
    let composed = composer
        .compose_on(
            &ComposeRequest {
                secret: "fish".to_string(),
                phonetic: "ghoti".to_string(),
                ..ComposeRequest::default()
            },
            today,
        )
        .unwrap();

    let service = GuessService::new(SqlitePuzzleRepository::new(&conn));
    assert!(service.evaluate_for_date(today, " FISH ").unwrap().is_correct);
    assert!(service
        .evaluate_for_puzzle(composed.puzzle.id, "fish")
        .unwrap()
        .is_correct);

    let tomorrow = today.succ_opt().unwrap();
    let err = service.evaluate_for_date(tomorrow, "fish").unwrap_err();
    assert!(matches!(err, GuessServiceError::NoPuzzleOnDate(date) if date == tomorrow));
    assert_eq!(err.code(), "not_found");

    let err = service.evaluate_for_date(today, "  ").unwrap_err();
    assert_eq!(err.code(), "invalid_input");
}
