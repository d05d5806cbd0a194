use std::sync::Arc;

use college_records::db;
use college_records::domain::{
    DomainError, Lecturer, LecturerInput, LibraryItemInput, LoanRequest, StudentInput,
};
use college_records::infrastructure::AppState;
use college_records::infrastructure::audit::{AuditEvent, AuditSink, AuditWorker};
use college_records::infrastructure::auth::AuthKeys;
use college_records::infrastructure::cache::{CachePolicy, FingerprintCache, MemoryCache};
use college_records::models::{lecturer, library_item, loan_record};
use college_records::services::{lecturer_service, library_service, student_service};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
};

const ACTOR: &str = "registrar";

struct Harness {
    state: AppState,
    cache: Arc<MemoryCache>,
    audit: AuditWorker,
}

// Helper to create a test app state backed by in-memory SQLite and cache
async fn setup() -> Harness {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let cache = Arc::new(MemoryCache::new());
    let (sink, audit) = AuditSink::channel(256);
    let state = AppState::new(
        db,
        cache.clone(),
        CachePolicy::default(),
        sink,
        AuthKeys::new("test-secret"),
    );
    Harness {
        state,
        cache,
        audit,
    }
}

fn lecturer_input(name: &str) -> LecturerInput {
    LecturerInput {
        name: name.to_string(),
        age: 45,
        email: format!("{}@gmail.com", name.to_lowercase()),
        designation: "Senior Lecturer".to_string(),
    }
}

fn book_input(copies: i32) -> LibraryItemInput {
    LibraryItemInput {
        book_name: "SICP".to_string(),
        title: "Structure and Interpretation of Computer Programs".to_string(),
        author: "Abelson".to_string(),
        available_copies: copies,
    }
}

fn loan(user_id: i32, user_type: &str, book_id: i32) -> LoanRequest {
    LoanRequest {
        user_id,
        user_type: user_type.to_string(),
        book_id,
        ..Default::default()
    }
}

async fn copies_in_store(state: &AppState, book_id: i32) -> i32 {
    library_item::Entity::find_by_id(book_id)
        .one(state.db())
        .await
        .unwrap()
        .expect("book row")
        .available_copies
}

fn drain(worker: &mut AuditWorker) -> Vec<AuditEvent> {
    std::iter::from_fn(|| worker.try_recv()).collect()
}

#[tokio::test]
async fn test_invalid_student_creates_no_row() {
    let h = setup().await;

    let bad = [
        StudentInput {
            name: "Sam".to_string(),
            age: 20,
            email: "sam@outlook.com".to_string(),
            year: None,
        },
        StudentInput {
            name: "Sam".to_string(),
            age: 20,
            email: "@gmail.com".to_string(),
            year: None,
        },
        StudentInput {
            name: "Sam".to_string(),
            age: 0,
            email: "sam@gmail.com".to_string(),
            year: None,
        },
        StudentInput {
            name: "Sam".to_string(),
            age: 100,
            email: "sam@gmail.com".to_string(),
            year: None,
        },
    ];

    for input in bad {
        let err = student_service::create_student(&h.state, ACTOR, input)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "got {:?}", err);
    }

    let rows = college_records::models::student::Entity::find()
        .count(h.state.db())
        .await
        .unwrap();
    assert_eq!(rows, 0);
}

#[tokio::test]
async fn test_create_then_get_round_trip() {
    let h = setup().await;

    let input = StudentInput {
        name: "Grace".to_string(),
        age: 21,
        email: "grace@gmail.com".to_string(),
        year: Some("Third".to_string()),
    };
    let created = student_service::create_student(&h.state, ACTOR, input)
        .await
        .unwrap();
    assert!(created.id > 0);

    let fetched = student_service::get_student(&h.state, ACTOR, created.id)
        .await
        .unwrap();
    assert_eq!(fetched, created);
    assert_eq!(fetched.name, "Grace");
    assert_eq!(fetched.year.as_deref(), Some("Third"));
}

#[tokio::test]
async fn test_get_populates_cache_and_delete_invalidates() {
    let h = setup().await;

    let created = lecturer_service::create_lecturer(&h.state, ACTOR, lecturer_input("Turing"))
        .await
        .unwrap();
    let key = format!("lecturer:{}", created.id);
    assert!(h.cache.get(&key).await.unwrap().is_none());

    lecturer_service::get_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();
    let cached = h.cache.get(&key).await.unwrap().expect("cache entry");
    let snapshot: Lecturer = serde_json::from_slice(&cached).unwrap();
    assert_eq!(snapshot, created);

    lecturer_service::delete_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();
    assert!(h.cache.get(&key).await.unwrap().is_none());

    let err = lecturer_service::get_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_reads_are_served_from_cache_until_invalidated() {
    let h = setup().await;

    let created = lecturer_service::create_lecturer(&h.state, ACTOR, lecturer_input("Hopper"))
        .await
        .unwrap();
    lecturer_service::get_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();

    // Change the row behind the service's back.
    let mut row: lecturer::ActiveModel = lecturer::Entity::find_by_id(created.id)
        .one(h.state.db())
        .await
        .unwrap()
        .unwrap()
        .into();
    row.designation = Set("Dean".to_string());
    row.update(h.state.db()).await.unwrap();

    let stale = lecturer_service::get_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();
    assert_eq!(stale.designation, "Senior Lecturer");

    // An update through the service refreshes the entry.
    let mut input = lecturer_input("Hopper");
    input.designation = "Professor".to_string();
    lecturer_service::update_lecturer(&h.state, ACTOR, created.id, input)
        .await
        .unwrap();
    let fresh = lecturer_service::get_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();
    assert_eq!(fresh.designation, "Professor");
}

#[tokio::test]
async fn test_update_and_delete_missing_rows_are_not_found() {
    let h = setup().await;

    let err = lecturer_service::update_lecturer(&h.state, ACTOR, 999, lecturer_input("Nobody"))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let err = student_service::delete_student(&h.state, ACTOR, 999)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    // Nothing was cached for the missing rows.
    assert!(h.cache.is_empty());
}

#[tokio::test]
async fn test_cache_keys_are_scoped_per_kind() {
    let h = setup().await;

    let student = student_service::create_student(
        &h.state,
        ACTOR,
        StudentInput {
            name: "Linus".to_string(),
            age: 22,
            email: "linus@gmail.com".to_string(),
            year: None,
        },
    )
    .await
    .unwrap();
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();
    assert_eq!(student.id, book.book_id);

    student_service::get_student(&h.state, ACTOR, student.id)
        .await
        .unwrap();
    let item = library_service::get_item(&h.state, ACTOR, book.book_id)
        .await
        .unwrap();
    assert_eq!(item, book);

    let again = student_service::get_student(&h.state, ACTOR, student.id)
        .await
        .unwrap();
    assert_eq!(again, student);
    assert_eq!(h.cache.len(), 2);
}

#[tokio::test]
async fn test_library_item_requires_copies() {
    let h = setup().await;

    let err = library_service::create_item(&h.state, ACTOR, book_input(0))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));

    let item = library_service::create_item(&h.state, ACTOR, book_input(5))
        .await
        .unwrap();
    assert!(item.book_id > 0);
    assert_eq!(item.available_copies, 5);
}

#[tokio::test]
async fn test_borrow_last_copy_then_conflict() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(1))
        .await
        .unwrap();

    let first = library_service::borrow_book(&h.state, ACTOR, loan(1, "student", book.book_id))
        .await
        .unwrap();
    assert!(first.return_date.is_none());
    assert_eq!(first.user_type, "student");
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 0);

    let err = library_service::borrow_book(&h.state, ACTOR, loan(2, "lecturer", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Conflict(_)), "got {:?}", err);
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 0);

    // The failed borrow left no loan behind.
    let loans = loan_record::Entity::find().count(h.state.db()).await.unwrap();
    assert_eq!(loans, 1);
}

#[tokio::test]
async fn test_concurrent_borrows_never_go_negative() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(1))
        .await
        .unwrap();
    let book_id = book.book_id;

    let a = {
        let state = h.state.clone();
        tokio::spawn(async move {
            library_service::borrow_book(&state, ACTOR, loan(1, "student", book_id)).await
        })
    };
    let b = {
        let state = h.state.clone();
        tokio::spawn(async move {
            library_service::borrow_book(&state, ACTOR, loan(2, "student", book_id)).await
        })
    };

    let results = [a.await.unwrap(), b.await.unwrap()];
    let ok = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(DomainError::Conflict(_))))
        .count();
    assert_eq!((ok, conflicts), (1, 1));
    assert_eq!(copies_in_store(&h.state, book_id).await, 0);
}

#[tokio::test]
async fn test_borrow_unknown_book_is_not_found() {
    let h = setup().await;

    let err = library_service::borrow_book(&h.state, ACTOR, loan(1, "student", 404))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_borrow_rejects_unknown_borrower_kind() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(3))
        .await
        .unwrap();

    let err = library_service::borrow_book(&h.state, ACTOR, loan(1, "visitor", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(_)));
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 3);
}

#[tokio::test]
async fn test_return_without_loan_is_not_found() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(3))
        .await
        .unwrap();

    let err = library_service::return_book(&h.state, ACTOR, loan(7, "student", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 3);

    let err = library_service::return_book(&h.state, ACTOR, loan(7, "student", 3))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_return_closes_loan_and_restores_copy() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();

    let borrowed = library_service::borrow_book(&h.state, ACTOR, loan(7, "lecturer", book.book_id))
        .await
        .unwrap();
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 1);

    // Same id, other kind: not this borrower's loan.
    let err = library_service::return_book(&h.state, ACTOR, loan(7, "student", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let returned = library_service::return_book(&h.state, ACTOR, loan(7, "lecturer", book.book_id))
        .await
        .unwrap();
    assert_eq!(returned.borrow_id, borrowed.borrow_id);
    let stamp = returned.return_date.as_deref().expect("return date");
    assert!(chrono::DateTime::parse_from_rfc3339(stamp).is_ok());
    assert!(stamp >= returned.borrow_date.as_str());
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 2);

    // A second return has nothing left to close.
    let err = library_service::return_book(&h.state, ACTOR, loan(7, "lecturer", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 2);
}

#[tokio::test]
async fn test_borrow_invalidates_cached_item() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();

    library_service::get_item(&h.state, ACTOR, book.book_id)
        .await
        .unwrap();
    library_service::borrow_book(&h.state, ACTOR, loan(1, "student", book.book_id))
        .await
        .unwrap();

    let item = library_service::get_item(&h.state, ACTOR, book.book_id)
        .await
        .unwrap();
    assert_eq!(item.available_copies, 1);
}

#[tokio::test]
async fn test_delete_item_cascades_loans() {
    let h = setup().await;
    let doomed = library_service::create_item(&h.state, ACTOR, book_input(3))
        .await
        .unwrap();
    let kept = library_service::create_item(&h.state, ACTOR, book_input(3))
        .await
        .unwrap();

    library_service::borrow_book(&h.state, ACTOR, loan(1, "student", doomed.book_id))
        .await
        .unwrap();
    library_service::borrow_book(&h.state, ACTOR, loan(2, "lecturer", doomed.book_id))
        .await
        .unwrap();
    library_service::return_book(&h.state, ACTOR, loan(2, "lecturer", doomed.book_id))
        .await
        .unwrap();
    library_service::borrow_book(&h.state, ACTOR, loan(1, "student", kept.book_id))
        .await
        .unwrap();

    library_service::delete_item(&h.state, ACTOR, doomed.book_id)
        .await
        .unwrap();

    let history = library_service::loan_history(&h.state).await.unwrap();
    assert_eq!(history.len(), 1);
    assert!(history.iter().all(|e| e.book_id == kept.book_id));

    let err = library_service::delete_item(&h.state, ACTOR, doomed.book_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));

    let err = library_service::get_item(&h.state, ACTOR, doomed.book_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_history_is_most_recent_first_with_book_names() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(5))
        .await
        .unwrap();

    for user_id in 1..=3 {
        library_service::borrow_book(&h.state, ACTOR, loan(user_id, "student", book.book_id))
            .await
            .unwrap();
    }
    library_service::return_book(&h.state, ACTOR, loan(2, "student", book.book_id))
        .await
        .unwrap();

    let history = library_service::loan_history(&h.state).await.unwrap();
    let users: Vec<i32> = history.iter().map(|e| e.user_id).collect();
    assert_eq!(users, vec![3, 2, 1]);
    assert!(history.iter().all(|e| e.book_name == "SICP"));
    assert!(history[1].return_date.is_some());
    assert!(history[0].return_date.is_none());
    assert!(history[2].return_date.is_none());
}

#[tokio::test]
async fn test_mutations_emit_audit_events() {
    let mut h = setup().await;

    let created = lecturer_service::create_lecturer(&h.state, ACTOR, lecturer_input("Knuth"))
        .await
        .unwrap();
    lecturer_service::delete_lecturer(&h.state, ACTOR, created.id)
        .await
        .unwrap();

    let actions: Vec<String> = drain(&mut h.audit)
        .iter()
        .map(|e| e.action().to_string())
        .collect();
    assert_eq!(
        actions,
        vec!["CREATE_LECTURER", "CREATE", "DELETE_LECTURER", "DELETE"]
    );

    // A rejected payload emits nothing.
    let _ = lecturer_service::create_lecturer(&h.state, ACTOR, lecturer_input(""))
        .await
        .unwrap_err();
    assert!(drain(&mut h.audit).is_empty());
}

#[tokio::test]
async fn test_manual_row_edit_visible_after_ttl() {
    let db = db::init_db("sqlite::memory:").await.unwrap();
    let cache = Arc::new(MemoryCache::new());
    let (sink, _worker) = AuditSink::channel(64);
    let policy = CachePolicy {
        read_ttl: std::time::Duration::from_millis(50),
        ..CachePolicy::default()
    };
    let state = AppState::new(db, cache, policy, sink, AuthKeys::new("k"));

    let book = library_service::create_item(&state, ACTOR, book_input(4))
        .await
        .unwrap();
    library_service::get_item(&state, ACTOR, book.book_id)
        .await
        .unwrap();

    let mut row: library_item::ActiveModel = library_item::Entity::find_by_id(book.book_id)
        .one(state.db())
        .await
        .unwrap()
        .unwrap()
        .into();
    row.available_copies = Set(9);
    row.update(state.db()).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    let item = library_service::get_item(&state, ACTOR, book.book_id)
        .await
        .unwrap();
    assert_eq!(item.available_copies, 9);
}

async fn open_loans_for_book(state: &AppState, book_id: i32) -> u64 {
    loan_record::Entity::find()
        .filter(loan_record::Column::BookId.eq(book_id))
        .filter(loan_record::Column::ReturnDate.is_null())
        .count(state.db())
        .await
        .unwrap()
}

#[tokio::test]
async fn test_failed_loan_insert_rolls_back_decrement() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();

    // The decrement succeeds, then the loan insert has nowhere to go.
    h.state
        .db()
        .execute_unprepared("DROP TABLE borrow_records")
        .await
        .unwrap();

    let err = library_service::borrow_book(&h.state, ACTOR, loan(1, "student", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Database(_)), "got {:?}", err);
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 2);
}

#[tokio::test]
async fn test_failed_increment_rolls_back_return() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();
    library_service::borrow_book(&h.state, ACTOR, loan(4, "lecturer", book.book_id))
        .await
        .unwrap();

    // The loan closes, then putting the copy back is refused.
    h.state
        .db()
        .execute_unprepared(
            "CREATE TRIGGER shelf_locked BEFORE UPDATE OF available_copies ON libraries \
             BEGIN SELECT RAISE(ABORT, 'shelf locked'); END",
        )
        .await
        .unwrap();

    let err = library_service::return_book(&h.state, ACTOR, loan(4, "lecturer", book.book_id))
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Database(_)), "got {:?}", err);
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 1);
    assert_eq!(open_loans_for_book(&h.state, book.book_id).await, 1);
}

#[tokio::test]
async fn test_failed_item_delete_keeps_its_loans() {
    let h = setup().await;
    let book = library_service::create_item(&h.state, ACTOR, book_input(2))
        .await
        .unwrap();
    library_service::borrow_book(&h.state, ACTOR, loan(1, "student", book.book_id))
        .await
        .unwrap();

    // Loans are removed first, then the item delete is refused.
    h.state
        .db()
        .execute_unprepared(
            "CREATE TRIGGER catalogue_locked BEFORE DELETE ON libraries \
             BEGIN SELECT RAISE(ABORT, 'catalogue locked'); END",
        )
        .await
        .unwrap();

    let err = library_service::delete_item(&h.state, ACTOR, book.book_id)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Database(_)), "got {:?}", err);
    assert_eq!(open_loans_for_book(&h.state, book.book_id).await, 1);
    assert_eq!(copies_in_store(&h.state, book.book_id).await, 1);
}
