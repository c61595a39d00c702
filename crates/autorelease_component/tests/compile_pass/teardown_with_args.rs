use autorelease_component::{Component, InstanceState, ReleaseError, Subscription, auto_release, subscribes};

#[derive(Component)]
struct Session(Vec<Subscription>, #[component(state)] InstanceState);

#[auto_release(teardown = "end")]
impl Session {
    #[subscribes]
    pub fn watch(&self, mut count: usize) -> Vec<Subscription> {
        count = count.max(1);
        (0..count).map(|_| Subscription::new(|| {})).collect()
    }

    /// Ends the session.
    pub fn end(&mut self, reason: &'static str) -> &'static str {
        reason
    }
}

fn main() -> Result<(), ReleaseError> {
    let mut session = Session(vec![Subscription::new(|| {})], InstanceState::new());
    let watched = session.watch(2).map_err(|err| ReleaseError::failed("session", err.to_string()))?;

    assert_eq!(session.end("done")?, "done");
    assert!(watched.iter().all(Subscription::is_closed));
    Ok(())
}
