use chrono::{DateTime, Duration, Local, TimeZone};
use tempfile::tempdir;
use todopane::app::App;
use todopane::filter::Filter;
use todopane::storage::{FileStore, KeyValueStore};
use todopane::store::{TODOS_KEY, TaskStore};
use todopane::task::REMINDER_FORMAT;

fn noon() -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap()
}

fn create(app: &mut App, title: &str, reminder: Option<&str>) {
    app.open_new_form();
    let form = app.form_mut().expect("form open");
    form.set_title(title);
    if let Some(reminder) = reminder {
        form.set_reminder(reminder);
    }
    app.submit_form(noon());
    assert!(app.form().is_none(), "form closes after a valid save");
}

#[test]
fn buy_milk_lifecycle_persists_to_disk() {
    let temp = tempdir().expect("tempdir");
    let store = TaskStore::load(Box::new(FileStore::open(temp.path()).expect("open")));
    let mut app = App::new(store);

    create(&mut app, "Buy milk", None);
    assert_eq!(app.store().len(), 1);
    let id = app.store().tasks()[0].id.clone();
    assert!(!app.store().tasks()[0].completed);

    app.toggle_completed(&id);
    assert!(app.store().get(&id).unwrap().completed);

    app.set_filter(Filter::Completed);
    let shown: Vec<_> = app.view(noon()).visible.iter().map(|t| t.id.clone()).collect();
    assert_eq!(shown, vec![id.clone()]);

    // Reopen from disk: the write-through kept the completed task
    let reopened = TaskStore::load(Box::new(FileStore::open(temp.path()).expect("reopen")));
    assert_eq!(reopened.tasks(), app.store().tasks());

    app.request_delete(&id);
    app.confirm_delete(true);
    assert!(app.store().is_empty());
    assert!(app.view(noon()).is_empty());

    let raw = FileStore::open(temp.path()).unwrap().get(TODOS_KEY).unwrap();
    assert_eq!(raw.as_deref(), Some("[]"));
}

#[test]
fn reminder_leaves_upcoming_once_time_passes() {
    let temp = tempdir().expect("tempdir");
    let mut app = App::new(TaskStore::load(Box::new(FileStore::open(temp.path()).unwrap())));
    let reminder = (noon() + Duration::hours(1)).format(REMINDER_FORMAT).to_string();
    create(&mut app, "Stand-up", Some(&reminder));
    let before = app.store().tasks().to_vec();

    app.set_filter(Filter::Upcoming);
    assert_eq!(app.view(noon()).visible.len(), 1);
    assert!(app.view(noon() + Duration::minutes(61)).visible.is_empty());
    assert_eq!(app.store().tasks(), before.as_slice());
}

#[test]
fn empty_title_edit_is_rejected() {
    let temp = tempdir().expect("tempdir");
    let mut app = App::new(TaskStore::load(Box::new(FileStore::open(temp.path()).unwrap())));
    create(&mut app, "Original", None);
    let id = app.store().tasks()[0].id.clone();

    app.open_edit_form(&id);
    app.form_mut().unwrap().set_title("");
    app.submit_form(noon());

    assert_eq!(app.store().get(&id).unwrap().title, "Original");
    assert!(app.form().is_some());
    assert_eq!(app.alert(), Some("Title cannot be empty."));
}

#[test]
fn search_only_narrows_the_all_filter() {
    let temp = tempdir().expect("tempdir");
    let mut app = App::new(TaskStore::load(Box::new(FileStore::open(temp.path()).unwrap())));
    create(&mut app, "Foobar", None);
    create(&mut app, "Unrelated", None);
    let unrelated = app.store().tasks()[0].id.clone();
    app.toggle_completed(&unrelated);

    app.set_search("foo");
    assert_eq!(app.view(noon()).visible.len(), 1);

    app.set_filter(Filter::Completed);
    let visible = app.view(noon()).visible.iter().map(|t| t.title.clone()).collect::<Vec<_>>();
    assert_eq!(visible, vec!["Unrelated".to_string()]);
}

#[test]
fn theme_is_not_persisted() {
    let temp = tempdir().expect("tempdir");
    let mut app = App::new(TaskStore::load(Box::new(FileStore::open(temp.path()).unwrap())));
    app.toggle_theme();
    create(&mut app, "x", None);

    let raw = FileStore::open(temp.path()).unwrap().get(TODOS_KEY).unwrap().unwrap();
    assert!(!raw.contains("theme"));
    let fresh = App::new(TaskStore::load(Box::new(FileStore::open(temp.path()).unwrap())));
    assert_eq!(fresh.theme(), todopane::theme::Theme::Light);
}
