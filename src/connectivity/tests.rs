use super::{ConnectivityMonitor, NetworkCapabilities, Transport};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

fn wifi() -> Option<NetworkCapabilities> {
    Some(NetworkCapabilities {
        transports: vec![Transport::Wifi],
        internet: true,
    })
}

fn cellular() -> Option<NetworkCapabilities> {
    Some(NetworkCapabilities {
        transports: vec![Transport::Cellular],
        internet: true,
    })
}

#[test]
fn online_requires_internet_and_a_qualifying_transport() {
    let (_tx, rx) = watch::channel(wifi());
    assert!(ConnectivityMonitor::new(rx).is_online());

    // Captive portal: Wi-Fi without internet capability.
    let (_tx, rx) = watch::channel(Some(NetworkCapabilities {
        transports: vec![Transport::Wifi],
        internet: false,
    }));
    assert!(!ConnectivityMonitor::new(rx).is_online());

    // Internet declared over a non-qualifying transport only.
    let (_tx, rx) = watch::channel(Some(NetworkCapabilities {
        transports: vec![Transport::Other],
        internet: true,
    }));
    assert!(!ConnectivityMonitor::new(rx).is_online());

    let (_tx, rx) = watch::channel(None);
    assert!(!ConnectivityMonitor::new(rx).is_online());
}

struct Edges {
    available: Arc<AtomicUsize>,
    lost: Arc<AtomicUsize>,
}

fn started(monitor: &ConnectivityMonitor) -> (Edges, super::MonitorHandle) {
    let available = Arc::new(AtomicUsize::new(0));
    let lost = Arc::new(AtomicUsize::new(0));
    let handle = {
        let available = Arc::clone(&available);
        let lost = Arc::clone(&lost);
        monitor.start(
            move || {
                available.fetch_add(1, Ordering::SeqCst);
            },
            move || {
                lost.fetch_add(1, Ordering::SeqCst);
            },
        )
    };
    (Edges { available, lost }, handle)
}

async fn settle() {
    sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn fires_only_on_boundary_crossings() {
    let (tx, rx) = watch::channel(wifi());
    let monitor = ConnectivityMonitor::new(rx);
    let (edges, _handle) = started(&monitor);
    settle().await;

    // Wi-Fi to cellular: still online, no edge.
    tx.send(cellular()).unwrap();
    settle().await;
    assert_eq!(edges.available.load(Ordering::SeqCst), 0);
    assert_eq!(edges.lost.load(Ordering::SeqCst), 0);

    tx.send(None).unwrap();
    settle().await;
    assert_eq!(edges.lost.load(Ordering::SeqCst), 1);

    tx.send(wifi()).unwrap();
    settle().await;
    assert_eq!(edges.available.load(Ordering::SeqCst), 1);
    assert_eq!(edges.lost.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn start_does_not_fire_for_the_initial_state() {
    let (_tx, rx) = watch::channel(wifi());
    let monitor = ConnectivityMonitor::new(rx);
    let (edges, _handle) = started(&monitor);
    settle().await;

    assert_eq!(edges.available.load(Ordering::SeqCst), 0);
    assert_eq!(edges.lost.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn stop_silences_further_edges() {
    let (tx, rx) = watch::channel(wifi());
    let monitor = ConnectivityMonitor::new(rx);
    let (edges, handle) = started(&monitor);
    settle().await;

    handle.stop();
    handle.stop(); // idempotent

    tx.send(None).unwrap();
    tx.send(wifi()).unwrap();
    settle().await;

    assert_eq!(edges.available.load(Ordering::SeqCst), 0);
    assert_eq!(edges.lost.load(Ordering::SeqCst), 0);
}
