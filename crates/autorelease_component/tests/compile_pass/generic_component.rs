use autorelease_component::prelude::*;

#[derive(Component)]
struct Slot<T: MaybeReleasable> {
    current: T,
    label: String,
    state: InstanceState,
}

#[auto_release]
impl<T: MaybeReleasable> Slot<T> {
    #[subscribes(ignore_missing)]
    fn replace<U: Into<String>>(&mut self, label: U) -> Option<Subscription> {
        self.label = label.into();
        None
    }
}

fn main() {
    let mut slot = Slot {
        current: Subscription::new(|| {}),
        label: String::new(),
        state: InstanceState::new(),
    };
    let current = slot.current.clone();

    slot.replace("next").unwrap();
    Teardown::teardown(&mut slot).unwrap();

    assert!(current.is_closed());
}
