//! LoggingObserver tests.

use std::sync::Arc;

use dockwatch_daemon::observer::LoggingObserver;
use dockwatch_docker::ContainerObserver;

#[test]
fn test_counts_start_and_die() {
    let observer = LoggingObserver::new();
    observer.container_started("a1");
    observer.container_started("b2");
    observer.container_died("a1");

    assert_eq!(observer.counts(), (2, 1));
}

#[test]
fn test_usable_as_shared_trait_object() {
    let observer = Arc::new(LoggingObserver::new());
    let shared: Arc<dyn ContainerObserver> = observer.clone();

    std::thread::scope(|s| {
        for _ in 0..4 {
            let shared = Arc::clone(&shared);
            s.spawn(move || shared.container_died("c3"));
        }
    });

    assert_eq!(observer.counts(), (0, 4));
}
