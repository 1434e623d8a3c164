use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;
use userbook_core::{
    ChangeNotifier, KeyValueMedium, MediumResult, MemoryMedium, NewUser, PersistentStore,
    ReactiveUserStore, StoreUserRepository, UserFilter, UserPatch, UserRepository,
};

/// Medium whose next `get` after `arm` returns its value only after a
/// rendezvous and a delay, simulating a slow read.
struct StalledMedium {
    inner: MemoryMedium,
    armed: AtomicBool,
    rendezvous: Barrier,
}

impl StalledMedium {
    fn new() -> Self {
        Self {
            inner: MemoryMedium::new(),
            armed: AtomicBool::new(false),
            rendezvous: Barrier::new(2),
        }
    }

    fn arm(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }
}

impl KeyValueMedium for StalledMedium {
    fn get(&self, key: &str) -> MediumResult<Option<String>> {
        let value = self.inner.get(key)?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.rendezvous.wait();
            thread::sleep(Duration::from_millis(300));
        }
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> MediumResult<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> MediumResult<()> {
        self.inner.remove(key)
    }
}

fn person(first_name: &str, education: &str) -> NewUser {
    NewUser {
        first_name: first_name.to_string(),
        education: education.to_string(),
        availability_date: "10-10-2030".to_string(),
        ..NewUser::default()
    }
}

#[test]
fn instances_sharing_a_notifier_stay_in_sync() {
    let medium = MemoryMedium::new();
    let notifier = ChangeNotifier::new();
    let first = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(medium.clone()),
        notifier.clone(),
    ));
    let second = ReactiveUserStore::open(PersistentStore::new(Arc::new(medium), notifier));

    let created = first.add(person("Ann", "Diploma")).unwrap();
    assert_eq!(second.snapshot().as_slice(), &[created.clone()]);

    second
        .update(
            created.id,
            &UserPatch {
                last_name: Some("Lee".to_string()),
                ..UserPatch::default()
            },
        )
        .unwrap();
    assert_eq!(first.snapshot()[0].last_name, "Lee");

    first.remove(created.id).unwrap();
    assert!(second.is_empty());
}

#[test]
fn instances_with_separate_notifiers_converge_only_on_reload() {
    let medium = MemoryMedium::new();
    let tab_a = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(medium.clone()),
        ChangeNotifier::new(),
    ));
    let tab_b = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(medium),
        ChangeNotifier::new(),
    ));

    tab_a.add(person("Ann", "Diploma")).unwrap();
    assert_eq!(tab_a.len(), 1);
    assert!(tab_b.is_empty());

    tab_b.reload();
    assert_eq!(tab_b.len(), 1);
}

#[test]
fn concurrent_writers_without_coordination_are_last_write_wins() {
    let medium = MemoryMedium::new();
    let store_a = PersistentStore::new(Arc::new(medium.clone()), ChangeNotifier::new());
    let store_b = PersistentStore::new(Arc::new(medium), ChangeNotifier::new());
    let repo = StoreUserRepository::new(store_a.clone());
    let created = repo.create(person("Ann", "Diploma")).unwrap();

    let stale = store_b.read();
    store_a
        .modify(|users| users[0].first_name = "Annie".to_string())
        .unwrap();
    store_b.write(&stale).unwrap();

    assert_eq!(repo.get(created.id).unwrap().first_name, "Ann");
}

#[test]
fn failed_lookup_mutations_still_reload() {
    let reactive = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(MemoryMedium::new()),
        ChangeNotifier::new(),
    ));
    let before = reactive.generation();

    assert!(reactive.update(404, &UserPatch::default()).unwrap().is_none());
    assert!(!reactive.remove(404).unwrap());

    // Each call reloads from its own path and from the change signal.
    assert_eq!(reactive.generation(), before + 4);
}

#[test]
fn filtered_view_reads_the_cache() {
    let reactive = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(MemoryMedium::new()),
        ChangeNotifier::new(),
    ));
    let ann = reactive.add(person("Ann", "Bachelor's Degree")).unwrap();
    let bo = reactive.add(person("Bo", "High School")).unwrap();

    let all = reactive.filtered(&UserFilter::default());
    assert_eq!(all, vec![ann.clone(), bo]);

    let degree = UserFilter::new(None, Some("DEGREE".to_string()));
    assert_eq!(reactive.filtered(&degree), vec![ann]);
}

#[test]
fn snapshot_subscription_can_be_disposed() {
    let reactive = ReactiveUserStore::open(PersistentStore::new(
        Arc::new(MemoryMedium::new()),
        ChangeNotifier::new(),
    ));
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let subscription = reactive.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    reactive.reload();
    subscription.unsubscribe();
    reactive.reload();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn subscriber_reading_snapshot_sees_new_cache() {
    let reactive = Arc::new(ReactiveUserStore::open(PersistentStore::new(
        Arc::new(MemoryMedium::new()),
        ChangeNotifier::new(),
    )));
    let observed = Arc::new(AtomicUsize::new(0));

    let weak = Arc::downgrade(&reactive);
    let seen = observed.clone();
    let _sub = reactive.subscribe(move || {
        if let Some(store) = weak.upgrade() {
            seen.store(store.len(), Ordering::SeqCst);
        }
    });

    reactive.add(person("Ann", "Diploma")).unwrap();
    assert_eq!(observed.load(Ordering::SeqCst), 1);
}

#[test]
fn slow_reload_does_not_overwrite_newer_cache() {
    let medium = Arc::new(StalledMedium::new());
    let reactive = Arc::new(ReactiveUserStore::open(PersistentStore::new(
        medium.clone(),
        ChangeNotifier::new(),
    )));

    medium.arm();
    let background = reactive.clone();
    let slow_reload = thread::spawn(move || background.reload());

    medium.rendezvous.wait();
    reactive.add(person("Ann", "Diploma")).unwrap();
    slow_reload.join().unwrap();

    let persisted = StoreUserRepository::new(PersistentStore::new(
        medium.clone(),
        ChangeNotifier::new(),
    ))
    .list();
    assert_eq!(persisted.len(), 1);
    assert_eq!(reactive.snapshot().as_slice(), persisted.as_slice());
}
