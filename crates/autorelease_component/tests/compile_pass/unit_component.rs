use autorelease_component::{AutoRelease, Component, auto_release, find_all_releasable};

#[derive(Component)]
struct Marker;

#[auto_release(teardown = "shutdown")]
impl Marker {}

fn main() {
    let mut marker = Marker;
    assert!(marker.instance_state().is_none());
    assert!(find_all_releasable(&marker).is_empty());
    assert_eq!(Marker::SETTINGS.teardown(), "shutdown");
    marker.shutdown().unwrap();
}
