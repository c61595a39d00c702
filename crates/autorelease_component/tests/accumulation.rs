//! Property tests for bucket accumulation and teardown.
//!
//! 1. k calls of a collecting method append k results, never replacing earlier ones.
//! 2. The enumeration query sees every collected item plus the properties.
//! 3. Teardown releases each collected item exactly once, then the original runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use autorelease_component::prelude::*;
use proptest::prelude::*;

struct Counted {
    releases: AtomicUsize,
}

impl Releasable for Counted {
    fn release(&self) -> Result<(), ReleaseError> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn counted() -> Arc<Counted> {
    Arc::new(Counted {
        releases: AtomicUsize::new(0),
    })
}

#[derive(Component)]
struct Source {
    properties: Vec<Arc<Counted>>,
    #[component(skip)]
    issued: parking_lot::Mutex<Vec<Arc<Counted>>>,
    teardowns: usize,
    state: InstanceState,
}

#[auto_release]
impl Source {
    #[subscribes]
    fn one(&self) -> Arc<Counted> {
        let item = counted();
        self.issued.lock().push(Arc::clone(&item));
        item
    }

    #[subscribes]
    fn batch(&self, size: usize) -> Vec<Arc<Counted>> {
        let items: Vec<_> = (0..size).map(|_| counted()).collect();
        self.issued.lock().extend(items.iter().cloned());
        items
    }

    fn on_destroy(&mut self) {
        self.teardowns += 1;
    }
}

fn source(properties: usize) -> Source {
    Source {
        properties: (0..properties).map(|_| counted()).collect(),
        issued: parking_lot::Mutex::new(Vec::new()),
        teardowns: 0,
        state: InstanceState::new(),
    }
}

proptest! {
    #[test]
    fn single_results_accumulate(calls in 0usize..32, properties in 0usize..4) {
        let instance = source(properties);
        for call in 1..=calls {
            instance.one().unwrap();
            prop_assert_eq!(instance.state.bucket_len("one"), call);
        }
        prop_assert!(find_all_releasable(&instance).len() >= calls);
        prop_assert_eq!(find_all_releasable(&instance).len(), calls + properties);
    }

    #[test]
    fn batches_accumulate(sizes in proptest::collection::vec(1usize..6, 0..12)) {
        let instance = source(0);
        let mut expected = 0;
        for size in &sizes {
            instance.batch(*size).unwrap();
            expected += size;
            prop_assert_eq!(instance.state.bucket_len("batch"), expected);
        }
    }

    #[test]
    fn teardown_releases_each_item_once(
        singles in 0usize..16,
        sizes in proptest::collection::vec(1usize..4, 0..6),
        properties in 0usize..4,
    ) {
        let mut instance = source(properties);
        for _ in 0..singles {
            instance.one().unwrap();
        }
        for size in &sizes {
            instance.batch(*size).unwrap();
        }

        instance.on_destroy().unwrap();
        instance.on_destroy().unwrap();

        for item in instance.issued.lock().iter().chain(&instance.properties) {
            prop_assert_eq!(item.releases.load(Ordering::SeqCst), 1);
        }
        prop_assert_eq!(instance.teardowns, 2);
        prop_assert!(find_all_releasable(&instance).len() == properties);
    }
}
