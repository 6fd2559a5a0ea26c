use ghotidle_core::db::open_db_in_memory;
use ghotidle_core::{
    Dictionary, MemoryDictionary, SqliteDictionary, WordService, WordServiceError,
};
use std::collections::HashSet;

#[test]
fn import_words_normalizes_and_counts() {
    let conn = open_db_in_memory().unwrap();
    let dictionary = SqliteDictionary::new(&conn);

    let report = dictionary
        .import_words(["Fish", "lamb ", "fish", "", "two words", "knight"])
        .unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(report.skipped, 1);
    assert_eq!(report.rejected, 1);
    assert_eq!(dictionary.word_count().unwrap(), 3);

    assert!(dictionary.contains("FISH").unwrap());
    assert!(!dictionary.contains("ghoti").unwrap());
}

#[test]
fn random_pick_reaches_every_word() {
    let conn = open_db_in_memory().unwrap();
    let dictionary = SqliteDictionary::new(&conn);
    let words = ["fish", "lamb", "knight"];
    dictionary.import_words(words).unwrap();
    let service = WordService::new(dictionary);

    let mut seen = HashSet::new();
    for _ in 0..300 {
        let word = service.pick_random_word().unwrap();
        assert!(words.contains(&word.as_str()));
        seen.insert(word);
    }
    assert_eq!(seen.len(), words.len());
}

#[test]
fn empty_word_set_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = WordService::new(SqliteDictionary::new(&conn));
    let err = service.pick_random_word().unwrap_err();
    assert!(matches!(err, WordServiceError::NotFound));
    assert_eq!(err.code(), "not_found");

    let memory = WordService::new(MemoryDictionary::default());
    assert!(matches!(
        memory.pick_random_word(),
        Err(WordServiceError::NotFound)
    ));
}

#[test]
fn memory_dictionary_picks_from_its_words() {
    let service = WordService::new(MemoryDictionary::new(["only"]));
    assert_eq!(service.pick_random_word().unwrap(), "only");
    assert!(service.is_valid_word("ONLY").unwrap());
}
