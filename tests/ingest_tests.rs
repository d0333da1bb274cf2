use std::net::Ipv4Addr;

use rxft8::audio::ingest::{interface_ipv4, open_feed};
use rxft8::config::FeedConfig;

fn feed(interface: &str, port: u16) -> FeedConfig {
    FeedConfig {
        base_frequency_hz: 14_074_000,
        multicast_group: Ipv4Addr::new(239, 255, 74, 1),
        port,
        interface: interface.into(),
    }
}

#[test]
fn test_unknown_interface_has_no_address() {
    assert_eq!(interface_ipv4("no-such-iface0"), None);
}

#[tokio::test]
async fn test_bad_interface_falls_back_to_default() {
    // Join problems are only logged; the socket is still usable
    let socket = open_feed(&feed("no-such-iface0", 0)).expect("bind should succeed");
    let addr = socket.local_addr().unwrap();
    assert!(addr.ip().is_unspecified());
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_receivers_share_the_port() {
    let first = open_feed(&feed("lo", 0)).unwrap();
    let port = first.local_addr().unwrap().port();

    let second = open_feed(&feed("lo", port)).expect("second receiver on the same port");
    assert_eq!(second.local_addr().unwrap().port(), port);
}
