//! End-to-end checklist persistence against a file-backed database.
//!
//! Each "session" opens the database and handbook afresh, the way separate
//! runs of the reader would.

use std::time::Instant;

use handbook::checklist::{scope_for_path, CHECKLIST_KEY};
use handbook::platform::Capabilities;
use handbook::storage::RecordStore;
use handbook::{ChecklistStore, Handbook, HandbookController, Settings, Storage};
use tempfile::TempDir;

const TRIP: &str = "\
# Autumn in Kansai

## Flights
Outbound `JL 123` from Taipei
Return `JL 124`

---

## Packing
- [ ] Passport
- [ ] Rail pass `JR-7781`
- [x] Already packed socks

---

## Last day
- [ ] Return the pocket wifi
";

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("kansai.md"), TRIP).unwrap();
        Self { dir }
    }

    fn handbook_path(&self) -> std::path::PathBuf {
        self.dir.path().join("kansai.md")
    }

    fn storage(&self) -> Storage {
        Storage::open(self.dir.path().join("data").join("handbook.db")).unwrap()
    }

    fn session<'a>(&self, storage: &'a Storage) -> HandbookController<&'a Storage> {
        let path = self.handbook_path();
        let handbook = Handbook::load(&path).unwrap();
        let scope = scope_for_path(&path).unwrap();
        HandbookController::new(
            handbook,
            ChecklistStore::new(storage, scope),
            Capabilities::unavailable(),
            Settings::default(),
            Instant::now(),
        )
        .unwrap()
    }
}

#[test]
fn test_checked_entries_survive_restart() {
    let fixture = Fixture::new();
    {
        let storage = fixture.storage();
        let mut controller = fixture.session(&storage);
        assert_eq!(controller.checklist().len(), 3);

        let now = Instant::now();
        controller.toggle_entry(0, now);
        controller.toggle_entry(2, now);
    }

    let storage = fixture.storage();
    let controller = fixture.session(&storage);
    assert_eq!(controller.checklist().states(), &[true, false, true]);

    let scope = scope_for_path(&fixture.handbook_path()).unwrap();
    let record = storage.read_record(&scope, CHECKLIST_KEY).unwrap();
    assert_eq!(record.as_deref(), Some("[true,false,true]"));
}

#[test]
fn test_corrupt_record_starts_unchecked() {
    let fixture = Fixture::new();
    let scope = scope_for_path(&fixture.handbook_path()).unwrap();
    {
        let storage = fixture.storage();
        storage
            .write_record(&scope, CHECKLIST_KEY, "[true, \"yes\"]")
            .unwrap();
    }

    let storage = fixture.storage();
    let mut controller = fixture.session(&storage);
    assert_eq!(controller.checklist().states(), &[false, false, false]);

    // The next toggle overwrites the corrupt record.
    controller.toggle_entry(1, Instant::now());
    let record = storage.read_record(&scope, CHECKLIST_KEY).unwrap();
    assert_eq!(record.as_deref(), Some("[false,true,false]"));
}

#[test]
fn test_reset_forgets_saved_state() {
    let fixture = Fixture::new();
    let storage = fixture.storage();
    {
        let mut controller = fixture.session(&storage);
        controller.toggle_entry(0, Instant::now());
    }

    let scope = scope_for_path(&fixture.handbook_path()).unwrap();
    assert!(ChecklistStore::new(&storage, scope).reset().unwrap());

    let controller = fixture.session(&storage);
    assert_eq!(controller.checklist().checked_count(), 0);
}

#[test]
fn test_handbooks_keep_separate_checklists() {
    let fixture = Fixture::new();
    let other = fixture.dir.path().join("osaka.md");
    std::fs::write(&other, "- [ ] Takoyaki\n- [ ] Castle\n").unwrap();
    let storage = fixture.storage();

    {
        let mut controller = fixture.session(&storage);
        controller.toggle_entry(0, Instant::now());
    }

    let handbook = Handbook::load(&other).unwrap();
    let controller = HandbookController::new(
        handbook,
        ChecklistStore::new(&storage, scope_for_path(&other).unwrap()),
        Capabilities::unavailable(),
        Settings::default(),
        Instant::now(),
    )
    .unwrap();
    assert_eq!(controller.checklist().states(), &[false, false]);
    assert_eq!(storage.stats().unwrap().total_scopes, 1);
}

#[test]
fn test_render_reflects_saved_checks() {
    let fixture = Fixture::new();
    let storage = fixture.storage();
    let mut controller = fixture.session(&storage);
    controller.toggle_entry(1, Instant::now());

    let text = controller
        .handbook()
        .render_plain(controller.checklist().states());
    assert!(text.starts_with("Autumn in Kansai"));
    assert!(text.contains("[ ] Passport"));
    assert!(text.contains("[x] Rail pass JR-7781"));
    assert!(text.contains("- [x] Already packed socks"));
    assert!(text.contains("[3/3] Last day"));
}
