//! Observed properties inside torn-down components.

use std::sync::Arc;

use autorelease_component::prelude::*;
use autorelease_extras::Observed;
use parking_lot::Mutex;

#[derive(Component)]
struct Profile {
    name: Observed<String>,
    online: Observed<bool>,
    #[component(skip)]
    seen: Arc<Mutex<Vec<String>>>,
    state: InstanceState,
}

#[auto_release]
impl Profile {
    #[subscribes]
    fn track_name(&self) -> Subscription {
        let seen = Arc::clone(&self.seen);
        self.name
            .observe()
            .subscribe(move |name: &String| seen.lock().push(name.clone()))
    }

    #[subscribes]
    fn track_both(&self) -> (Subscription, Subscription) {
        (
            self.name.observe().subscribe(|_| {}),
            self.online.observe().subscribe(|_| {}),
        )
    }
}

fn profile() -> Profile {
    Profile {
        name: Observed::new(String::from("Hello")),
        online: Observed::default(),
        seen: Arc::new(Mutex::new(Vec::new())),
        state: InstanceState::new(),
    }
}

#[test]
fn listeners_are_released_on_teardown() {
    let mut profile = profile();
    profile.track_name().unwrap();
    profile.track_both().unwrap();
    assert_eq!(profile.name.observe().listener_count(), 2);
    assert_eq!(profile.online.observe().listener_count(), 1);

    profile.name.set(String::from("Observable"));
    profile.on_destroy().unwrap();
    profile.name.set(String::from("after teardown"));

    assert_eq!(*profile.seen.lock(), ["Hello", "Observable"]);
    assert_eq!(profile.name.observe().listener_count(), 0);
    assert_eq!(profile.online.observe().listener_count(), 0);
}

#[test]
fn observed_fields_are_not_releasable_properties() {
    let profile = profile();
    assert!(find_all_releasable(&profile).is_empty());
}

#[tokio::test]
async fn watchers_see_the_latest_value() {
    let profile = Arc::new(profile());
    let mut online = profile.online.observe().watch();

    let writer = Arc::clone(&profile);
    tokio::spawn(async move { writer.online.set(true) })
        .await
        .unwrap();

    online.changed().await.unwrap();
    assert!(*online.borrow_and_update());
    assert!(profile.online.get());
}
