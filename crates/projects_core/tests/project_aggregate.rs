use projects_core::db::open_db;
use projects_core::{
    Decimal2, Material, Project, ProjectId, ProjectService, RepoError, ServiceError,
    SqliteConnectionProvider, SqliteProjectRepository, Step,
};
use rusqlite::Connection;
use std::collections::HashSet;
use tempfile::TempDir;

type Service = ProjectService<SqliteProjectRepository<SqliteConnectionProvider>>;

fn setup() -> (TempDir, SqliteConnectionProvider, Service) {
    let dir = tempfile::tempdir().unwrap();
    let provider = SqliteConnectionProvider::new(dir.path().join("projects.sqlite3"));
    let service = ProjectService::new(SqliteProjectRepository::try_new(provider.clone()).unwrap());
    (dir, provider, service)
}

fn new_project(service: &Service, name: &str) -> ProjectId {
    service
        .add_project(Project::new(name))
        .unwrap()
        .project_id
        .unwrap()
}

fn count(conn: &Connection, sql: &str) -> i64 {
    conn.query_row(sql, [], |row| row.get(0)).unwrap()
}

#[test]
fn fetch_by_id_returns_complete_aggregate() {
    let (_dir, _provider, service) = setup();
    let project_id = new_project(&service, "Garden bed");
    let other_id = new_project(&service, "Other");

    for (name, cost) in [("soil", "12.00"), ("boards", "8.75"), ("screws", "0.10")] {
        let material = Material::new(name, Some(2), Some(cost.parse().unwrap()));
        service.add_material_to_project(project_id, &material).unwrap();
    }
    for (order, text) in ["cut boards", "assemble frame"].iter().enumerate() {
        service
            .add_step_to_project(project_id, &Step::new(*text, order as i32 + 1))
            .unwrap();
    }
    for name in ["Garden", "Outdoor", "Wood"] {
        service.add_category_to_project(project_id, name).unwrap();
    }
    service
        .add_material_to_project(other_id, &Material::new("paint", None, None))
        .unwrap();
    service
        .add_step_to_project(other_id, &Step::new("unrelated", 1))
        .unwrap();
    service.add_category_to_project(other_id, "Paint").unwrap();

    let loaded = service.fetch_project_by_id(project_id).unwrap();
    assert_eq!(loaded.materials.len(), 3);
    assert_eq!(loaded.steps.len(), 2);
    assert_eq!(loaded.categories.len(), 3);

    let step_ids: Vec<i64> = loaded.steps.iter().map(|s| s.step_id.unwrap()).collect();
    let mut sorted = step_ids.clone();
    sorted.sort_unstable();
    assert_eq!(step_ids, sorted);
    assert_eq!(loaded.steps[0].step_text, "cut boards");
    assert_eq!(loaded.steps[1].step_order, 2);

    let category_names: HashSet<&str> = loaded
        .categories
        .iter()
        .map(|c| c.category_name.as_str())
        .collect();
    assert_eq!(category_names, HashSet::from(["Garden", "Outdoor", "Wood"]));

    let total: i64 = loaded
        .materials
        .iter()
        .filter_map(|m| m.cost)
        .map(Decimal2::hundredths)
        .sum();
    assert_eq!(total, 2085);
}

#[test]
fn attaching_to_missing_project_raises_not_found_without_writes() {
    let (_dir, provider, service) = setup();

    let err = service
        .add_material_to_project(99, &Material::new("lumber", Some(1), None))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(99)));

    let err = service
        .add_step_to_project(99, &Step::new("dig", 1))
        .unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(99)));

    let err = service.add_category_to_project(99, "Outdoor").unwrap_err();
    assert!(matches!(err, ServiceError::ProjectNotFound(99)));

    let conn = open_db(provider.path()).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM material;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM step;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM category;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_category;"), 0);
}

#[test]
fn failed_link_insert_rolls_back_new_category() {
    let (_dir, provider, service) = setup();
    let project_id = new_project(&service, "Deck");

    let conn = open_db(provider.path()).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER reject_links
         BEFORE INSERT ON project_category
         BEGIN
            SELECT RAISE(ABORT, 'link rejected');
         END;",
    )
    .unwrap();

    let err = service
        .add_category_to_project(project_id, "Outdoor")
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Repo(RepoError::Storage {
            operation: "project_category_link",
            ..
        })
    ));

    assert_eq!(
        count(
            &conn,
            "SELECT COUNT(*) FROM category WHERE category_name = 'Outdoor';"
        ),
        0
    );
    assert!(service.fetch_all_categories().unwrap().is_empty());
}

#[test]
fn category_names_are_reused_across_projects() {
    let (_dir, provider, service) = setup();
    let deck = new_project(&service, "Deck");
    let shed = new_project(&service, "Shed");

    service.add_category_to_project(deck, "Outdoor").unwrap();
    service.add_category_to_project(shed, "Outdoor").unwrap();
    service.add_category_to_project(shed, "Wood").unwrap();

    let categories = service.fetch_all_categories().unwrap();
    let names: Vec<&str> = categories.iter().map(|c| c.category_name.as_str()).collect();
    assert_eq!(names, vec!["Outdoor", "Wood"]);
    assert!(categories[0].category_id < categories[1].category_id);

    let deck_loaded = service.fetch_project_by_id(deck).unwrap();
    let shed_loaded = service.fetch_project_by_id(shed).unwrap();
    assert_eq!(
        deck_loaded.categories[0].category_id,
        shed_loaded.categories[0].category_id
    );

    let conn = open_db(provider.path()).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_category;"), 3);
}

#[test]
fn linking_same_category_twice_is_a_storage_error() {
    let (_dir, _provider, service) = setup();
    let project_id = new_project(&service, "Deck");

    service.add_category_to_project(project_id, "Outdoor").unwrap();
    let err = service
        .add_category_to_project(project_id, "Outdoor")
        .unwrap_err();
    assert!(matches!(err, ServiceError::Repo(RepoError::Storage { .. })));

    let loaded = service.fetch_project_by_id(project_id).unwrap();
    assert_eq!(loaded.categories.len(), 1);
    assert_eq!(service.fetch_all_categories().unwrap().len(), 1);
}

#[test]
fn category_names_are_matched_exactly() {
    let (_dir, _provider, service) = setup();
    let project_id = new_project(&service, "Deck");

    service.add_category_to_project(project_id, "Outdoor").unwrap();
    service.add_category_to_project(project_id, " Outdoor").unwrap();

    let names: Vec<String> = service
        .fetch_all_categories()
        .unwrap()
        .into_iter()
        .map(|c| c.category_name)
        .collect();
    assert_eq!(names, vec!["Outdoor", " Outdoor"]);
}

#[test]
fn deleting_project_cascades_to_children_but_keeps_categories() {
    let (_dir, provider, service) = setup();
    let project_id = new_project(&service, "Deck");
    service
        .add_material_to_project(project_id, &Material::new("lumber", Some(20), None))
        .unwrap();
    service
        .add_step_to_project(project_id, &Step::new("frame", 1))
        .unwrap();
    service.add_category_to_project(project_id, "Outdoor").unwrap();

    service.delete_project(project_id).unwrap();

    let conn = open_db(provider.path()).unwrap();
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM material;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM step;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM project_category;"), 0);
    assert_eq!(count(&conn, "SELECT COUNT(*) FROM category;"), 1);
}
