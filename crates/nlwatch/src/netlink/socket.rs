//! Non-blocking NETLINK_ROUTE socket.

use std::io;
use std::os::unix::io::{AsRawFd, RawFd};

use netlink_sys::{Socket, SocketAddr, protocols};

use super::error::Result;
use super::events::Subscriptions;
use super::monitor::{Datagram, Transport};

/// rtnetlink socket joined to the multicast groups of a [`Subscriptions`].
///
/// Reads never block: an empty queue surfaces as
/// [`io::ErrorKind::WouldBlock`] and the receive loop decides when to try
/// again.
pub struct RouteSocket {
    socket: Socket,
    /// Local port ID (assigned by kernel).
    pid: u32,
}

impl RouteSocket {
    /// Open, bind and subscribe.
    pub fn new(subscriptions: &Subscriptions) -> Result<Self> {
        let mut socket = Socket::new(protocols::NETLINK_ROUTE)?;
        socket.set_non_blocking(true)?;

        // Bind to get a port ID
        let mut addr = SocketAddr::new(0, 0);
        socket.bind(&addr)?;
        socket.get_address(&mut addr)?;
        let pid = addr.port_number();

        for group in subscriptions.groups() {
            socket.add_membership(group)?;
        }
        tracing::debug!(pid, groups = ?subscriptions.groups(), "route socket ready");

        Ok(Self { socket, pid })
    }

    /// Get the local port ID.
    pub fn pid(&self) -> u32 {
        self.pid
    }
}

impl Transport for RouteSocket {
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Datagram> {
        // SAFETY: an all-zero sockaddr_nl is a valid value.
        let mut sender: libc::sockaddr_nl = unsafe { std::mem::zeroed() };
        let mut sender_len = std::mem::size_of::<libc::sockaddr_nl>() as libc::socklen_t;

        // SAFETY: buf is valid for writes of buf.len() bytes, and sender /
        // sender_len describe a live sockaddr_nl owned by this frame.
        let ret = unsafe {
            libc::recvfrom(
                self.socket.as_raw_fd(),
                buf.as_mut_ptr().cast(),
                buf.len(),
                libc::MSG_DONTWAIT,
                (&mut sender as *mut libc::sockaddr_nl).cast(),
                &mut sender_len,
            )
        };
        if ret < 0 {
            return Err(io::Error::last_os_error());
        }

        Ok(Datagram {
            len: ret as usize,
            sender_len: sender_len as usize,
        })
    }
}

impl AsRawFd for RouteSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.socket.as_raw_fd()
    }
}

/// Multicast groups for NETLINK_ROUTE.
pub mod rtnetlink_groups {
    pub const RTNLGRP_LINK: u32 = 1;
    pub const RTNLGRP_IPV4_IFADDR: u32 = 5;
    pub const RTNLGRP_IPV4_ROUTE: u32 = 7;
}
