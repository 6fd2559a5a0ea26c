//! Command-line front end for the Ghotidle engine.
//!
//! # Responsibility
//! - Map subcommands onto `ghotidle_api` operations.
//! - Print every response envelope as one JSON document on stdout.
//!
//! Exit code is 0 when the envelope is `ok`, 1 otherwise, 2 on usage errors.

use ghotidle_api::{ApiResponse, SecretRef};
use ghotidle_core::db::migrations::latest_version;
use serde::Serialize;
use std::env;
use std::process::ExitCode;

const USAGE: &str = "Usage: ghotidle <command> [args]

Commands:
  info                                   print engine version and store location
  today                                  show today's puzzle
  puzzle <YYYY-MM-DD>                    show the puzzle on a date
  guess <secret|id:UUID|date:YYYY-MM-DD> <guess>
  suggest <sounds>                       e.g. suggest f-i-sh
  compose <secret> <phonetic> <sounds> <ids> [YYYY-MM-DD]
                                         ids: comma separated, `-` keeps a sound
  random                                 pick a random practice word
  add-pattern <letters> <sound> <reference>
  seed-patterns                          load the built-in pattern catalog
  import-patterns <file>                 one `letters<TAB>sound<TAB>reference` per line
  import-words <file>                    one word per line";

fn main() -> ExitCode {
    if let Err(err) = ghotidle_core::init_logging_from_env() {
        eprintln!("logging disabled: {err}");
    }

    let args: Vec<String> = env::args().skip(1).collect();
    let command = args.first().map(String::as_str).unwrap_or("");
    let rest = args.get(1..).unwrap_or_default();
    let engine = ghotidle_api::engine();

    match (command, rest) {
        ("info", []) => {
            println!("version={}", ghotidle_core::core_version());
            println!("schema_version={}", latest_version());
            println!("db_path={}", engine.db_path().display());
            ExitCode::SUCCESS
        }
        ("today", []) => emit(&engine.today_puzzle()),
        ("puzzle", [date]) => emit(&engine.puzzle_on(date)),
        ("guess", [secret, guess]) => emit(&engine.evaluate_guess(&parse_secret_ref(secret), guess)),
        ("suggest", [sounds]) => emit(&engine.suggest_patterns(sounds)),
        ("compose", [secret, phonetic, sounds, ids, date @ ..]) if date.len() <= 1 => {
            let Some(ids) = parse_selections(ids) else {
                eprintln!("invalid pattern ids `{ids}`; expected e.g. 3,-,7");
                return ExitCode::from(2);
            };
            let date = date.first().map(String::as_str);
            emit(&engine.compose_puzzle(secret, phonetic, sounds, &ids, date))
        }
        ("random", []) => emit(&engine.random_word()),
        ("add-pattern", [letters, sound, reference]) => {
            emit(&engine.add_pattern(letters, sound, reference))
        }
        ("seed-patterns", []) => emit(&engine.seed_patterns()),
        ("import-patterns", [path]) => match read_lines(path) {
            Ok(lines) => emit(&engine.import_pattern_lines(&lines)),
            Err(code) => code,
        },
        ("import-words", [path]) => match read_lines(path) {
            Ok(words) => emit(&engine.import_words(&words)),
            Err(code) => code,
        },
        _ => {
            eprintln!("{USAGE}");
            ExitCode::from(2)
        }
    }
}

fn emit<T: Serialize>(response: &ApiResponse<T>) -> ExitCode {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("failed to encode response: {err}");
            return ExitCode::FAILURE;
        }
    }
    if response.ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn read_lines(path: &str) -> Result<Vec<String>, ExitCode> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents.lines().map(str::to_string).collect()),
        Err(err) => {
            eprintln!("failed to read `{path}`: {err}");
            Err(ExitCode::FAILURE)
        }
    }
}

fn parse_secret_ref(raw: &str) -> SecretRef {
    if let Some(id) = raw.strip_prefix("id:") {
        SecretRef::PuzzleId(id.to_string())
    } else if let Some(date) = raw.strip_prefix("date:") {
        SecretRef::Date(date.to_string())
    } else {
        SecretRef::Value(raw.to_string())
    }
}

/// Parses `3,-,7` into `[Some(3), None, Some(7)]`.
fn parse_selections(raw: &str) -> Option<Vec<Option<i64>>> {
    raw.split(',')
        .map(str::trim)
        .map(|token| match token {
            "-" | "" => Some(None),
            id => id.parse::<i64>().ok().map(Some),
        })
        .collect()
}
