use school_admin::{Record, SchoolStore};
use std::collections::HashSet;

fn ids(records: &[Record]) -> Vec<String> {
    records
        .iter()
        .filter_map(|r| r.id().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_insert_then_list_returns_new_record_with_id_3() {
    let mut store = SchoolStore::local();
    assert_eq!(store.list("students").await.value().len(), 2);

    let record = Record::default()
        .field("Name", "Test")
        .field("Class", "Class 9")
        .field("RollNumber", 5);
    let inserted = store
        .insert("students", record.clone())
        .await
        .into_value()
        .expect("local insert succeeds");

    assert_eq!(inserted.id(), Some("3"));

    let students = store.list("students").await.into_value();
    assert_eq!(students.len(), 3);
    let found: Vec<&Record> = students.iter().filter(|r| r.id() == Some("3")).collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].without_id(), record);
}

#[tokio::test]
async fn test_delete_seeded_student_leaves_s2() {
    let mut store = SchoolStore::local();

    let outcome = store.delete("students", "s1").await;
    assert!(!outcome.is_degraded());
    assert!(outcome.into_value());

    let students = store.list("students").await.into_value();
    assert_eq!(ids(&students), vec!["s2"]);
}

#[tokio::test]
async fn test_delete_twice_equals_delete_once() {
    let mut once = SchoolStore::local();
    let mut twice = SchoolStore::local();

    once.delete("teachers", "t2").await;
    twice.delete("teachers", "t2").await;
    let second = twice.delete("teachers", "t2").await;

    assert!(!second.is_degraded());
    assert!(!second.into_value());
    assert_eq!(
        once.list("teachers").await.into_value(),
        twice.list("teachers").await.into_value()
    );
}

#[tokio::test]
async fn test_deleted_id_never_listed() {
    let mut store = SchoolStore::local();

    let inserted = store
        .insert("teachers", Record::default().field("Name", "Mr. Karim"))
        .await
        .into_value()
        .unwrap();
    let id = inserted.id().unwrap().to_string();

    store.delete("teachers", &id).await;

    let teachers = store.list("teachers").await.into_value();
    assert!(teachers.iter().all(|r| r.id() != Some(id.as_str())));
}

#[tokio::test]
async fn test_ids_unique_across_inserts_and_deletes() {
    let mut store = SchoolStore::local();
    let mut seen: HashSet<String> = ["s1", "s2"].iter().map(|s| s.to_string()).collect();

    for i in 0..20 {
        let inserted = store
            .insert(
                "students",
                Record::default().field("Name", format!("Student {}", i)),
            )
            .await
            .into_value()
            .unwrap();
        let id = inserted.id().unwrap().to_string();
        assert!(!id.is_empty());
        assert!(seen.insert(id.clone()), "id {} was issued twice", id);

        // 每隔幾筆刪掉一筆，讓筆數與已發出的 id 脫鉤
        if i % 3 == 0 {
            store.delete("students", &id).await;
        }
    }
}

#[tokio::test]
async fn test_unknown_collections_list_empty() {
    let store = SchoolStore::local();

    for name in ["classes", "STUDENTS", "teacher", "students.json"] {
        let outcome = store.list(name).await;
        assert!(!outcome.is_degraded());
        assert!(outcome.value().is_empty(), "{} should be empty", name);
    }
}
