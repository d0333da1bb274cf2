//! Multicast PCM feed

use std::net::{Ipv4Addr, SocketAddrV4, UdpSocket as StdUdpSocket};
use std::os::fd::AsRawFd;

use nix::ifaddrs::getifaddrs;
use nix::sys::socket::{bind, setsockopt, socket, sockopt, AddressFamily, SockFlag, SockType, SockaddrIn};
use tokio::net::UdpSocket;
use tracing::{info, warn};

use crate::config::FeedConfig;
use crate::error::IngestError;

/// Largest datagram we accept from the feed.
pub const MAX_DATAGRAM: usize = 65_536;

/// First IPv4 address assigned to the named interface.
pub fn interface_ipv4(name: &str) -> Option<Ipv4Addr> {
    let addrs = getifaddrs().ok()?;
    addrs
        .filter(|ifa| ifa.interface_name == name)
        .find_map(|ifa| {
            ifa.address
                .as_ref()
                .and_then(|addr| addr.as_sockaddr_in())
                .map(|sin| Ipv4Addr::from(sin.ip()))
        })
}

/// UDP socket on `0.0.0.0:port` with SO_REUSEADDR, so receivers for several
/// base frequencies can listen to the same feed.
fn bind_shared(port: u16) -> Result<StdUdpSocket, IngestError> {
    let to_err = |e: nix::Error| IngestError::Bind {
        port,
        reason: e.to_string(),
    };

    let fd = socket(AddressFamily::Inet, SockType::Datagram, SockFlag::empty(), None).map_err(to_err)?;
    setsockopt(&fd, sockopt::ReuseAddr, &true).map_err(to_err)?;
    let addr = SockaddrIn::from(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, port));
    bind(fd.as_raw_fd(), &addr).map_err(to_err)?;

    let socket = StdUdpSocket::from(fd);
    socket.set_nonblocking(true).map_err(|e| IngestError::Bind {
        port,
        reason: e.to_string(),
    })?;
    Ok(socket)
}

/// Bind and join the configured group.
///
/// A bad interface name falls back to the default interface, and a failed
/// join is only logged: the socket is returned either way. Only a bind
/// failure is reported to the caller.
pub fn open_feed(feed: &FeedConfig) -> Result<UdpSocket, IngestError> {
    let socket = bind_shared(feed.port)?;
    let socket = UdpSocket::from_std(socket).map_err(|e| IngestError::Bind {
        port: feed.port,
        reason: e.to_string(),
    })?;

    if let Err(e) = join(&socket, feed) {
        warn!("{}", e);
    }
    Ok(socket)
}

fn join(socket: &UdpSocket, feed: &FeedConfig) -> Result<(), IngestError> {
    let group = feed.multicast_group;
    if !group.is_multicast() {
        return Err(IngestError::InvalidGroup(group.to_string()));
    }

    match interface_ipv4(&feed.interface) {
        Some(iface) => {
            socket
                .join_multicast_v4(group, iface)
                .map_err(|e| IngestError::Join(format!("{} on interface {}: {}", group, feed.interface, e)))?;
            info!("Joined multicast group {}:{} on {} ({})", group, feed.port, feed.interface, iface);
        }
        None => {
            warn!("Invalid network interface: {}", feed.interface);
            warn!("Attempting to join multicast group on default interface");
            socket
                .join_multicast_v4(group, Ipv4Addr::UNSPECIFIED)
                .map_err(|e| IngestError::Join(format!("{}: {}", group, e)))?;
            info!("Joined multicast group {}:{} on default interface", group, feed.port);
        }
    }
    Ok(())
}
