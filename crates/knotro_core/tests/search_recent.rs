mod common;

use common::{names, repo};
use knotro_core::db::open_db_in_memory;
use knotro_core::Note;
use std::collections::HashSet;

#[test]
fn search_matches_name_or_content_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    repo.save(Note::new("foo-in-name", "plain")).unwrap();
    repo.save(Note::new("content-match", "has foo inside")).unwrap();
    repo.save(Note::new("neither", "bar baz")).unwrap();
    repo.save(Note::new("Upper", "FOO shouting")).unwrap();

    let hits: HashSet<String> = repo.search("foo").unwrap().into_iter().collect();

    assert_eq!(
        hits,
        HashSet::from(["foo-in-name".to_string(), "content-match".to_string()])
    );
}

#[test]
fn search_without_hits_is_empty() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    repo.save(Note::new("a", "b")).unwrap();

    assert!(repo.search("zzz").unwrap().is_empty());
}

#[test]
fn search_spans_more_than_one_store_page() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    for idx in 0..250 {
        repo.save(Note::new(format!("page-{idx}"), "needle")).unwrap();
    }

    assert_eq!(repo.search("needle").unwrap().len(), 250);
}

#[test]
fn recent_returns_highest_recent_index_first() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    for name in ["one", "two", "three", "four", "five"] {
        repo.save(Note::new(name, "")).unwrap();
    }

    assert_eq!(repo.recent(3).unwrap(), names(&["five", "four", "three"]));
}

#[test]
fn resaving_moves_note_to_front() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    for name in ["one", "two", "three"] {
        repo.save(Note::new(name, "")).unwrap();
    }
    let one = repo.get("one").unwrap().unwrap();
    repo.save(one).unwrap();

    assert_eq!(repo.recent(10).unwrap(), names(&["one", "three", "two"]));
}

#[test]
fn recent_limit_larger_than_store_returns_everything() {
    let conn = open_db_in_memory().unwrap();
    let repo = repo(&conn);
    repo.save(Note::new("only", "")).unwrap();

    assert_eq!(repo.recent(10).unwrap(), names(&["only"]));
    assert!(repo.recent(0).unwrap().is_empty());
}
