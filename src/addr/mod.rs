//! Address families and the endpoint's address record.
//!
//! Three families are supported:
//! - `Domain::Local` — Unix domain sockets (same machine only)
//! - `Domain::Ipv4` — Internet Protocol version 4
//! - `Domain::Ipv6` — Internet Protocol version 6

mod ipv4;
mod ipv6;
mod unix;
pub(crate) mod resolve;

use std::fmt;

pub use self::ipv4::SocketAddrV4;
pub use self::ipv6::SocketAddrV6;
pub use self::unix::UnixAddr;
pub use self::resolve::lookup_host;

/// Address family an endpoint is created in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
	Local,
	Ipv4,
	Ipv6,
}

impl Domain {
	/// Returns the libc constant for this address family.
	#[inline]
	pub fn raw(self) -> libc::c_int {
		match self {
			Domain::Local => libc::AF_UNIX,
			Domain::Ipv4 => libc::AF_INET,
			Domain::Ipv6 => libc::AF_INET6,
		}
	}

	pub(crate) fn from_raw(family: libc::c_int) -> Option<Self> {
		match family {
			libc::AF_UNIX => Some(Domain::Local),
			libc::AF_INET => Some(Domain::Ipv4),
			libc::AF_INET6 => Some(Domain::Ipv6),
			_ => None,
		}
	}
}

/// Resolved network address of an endpoint.
///
/// Tagged by family, so the stored bytes always match the tag.
/// Starts out as `Unspecified` until a host is resolved or the endpoint is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddrRecord {
	/// No host yet; only a port may have been set.
	Unspecified { port: u16 },
	V4(SocketAddrV4),
	V6(SocketAddrV6),
	Unix(UnixAddr),
}

impl Default for AddrRecord {
	fn default() -> Self {
		AddrRecord::Unspecified { port: 0 }
	}
}

impl AddrRecord {
	/// Wildcard address ("any local address") of `domain` with `port`.
	///
	/// Local sockets have no wildcard, so `Domain::Local` yields `None`.
	pub fn any(domain: Domain, port: u16) -> Option<Self> {
		match domain {
			Domain::Ipv4 => Some(AddrRecord::V4(SocketAddrV4::new([0; 4], port))),
			Domain::Ipv6 => Some(AddrRecord::V6(SocketAddrV6::new([0; 16], port))),
			Domain::Local => None,
		}
	}

	/// Family of the stored address, if one is stored.
	pub fn family(&self) -> Option<Domain> {
		match self {
			AddrRecord::Unspecified { .. } => None,
			AddrRecord::V4(_) => Some(Domain::Ipv4),
			AddrRecord::V6(_) => Some(Domain::Ipv6),
			AddrRecord::Unix(_) => Some(Domain::Local),
		}
	}

	/// Port in host byte order. Unix addresses have none.
	pub fn port(&self) -> Option<u16> {
		match self {
			AddrRecord::Unspecified { port } => Some(*port),
			AddrRecord::V4(addr) => Some(addr.port()),
			AddrRecord::V6(addr) => Some(addr.port()),
			AddrRecord::Unix(_) => None,
		}
	}

	/// Replaces the port, keeping the host. No-op for Unix addresses.
	pub fn set_port(&mut self, port: u16) {
		match self {
			AddrRecord::Unspecified { port: p } => *p = port,
			AddrRecord::V4(addr) => addr.set_port(port),
			AddrRecord::V6(addr) => addr.set_port(port),
			AddrRecord::Unix(_) => {}
		}
	}

	/// IP address bytes: 4 for IPv4, 16 for IPv6. Empty for Unix and
	/// unspecified records.
	pub fn ip_bytes(&self) -> &[u8] {
		match self {
			AddrRecord::V4(addr) => addr.ip_ref(),
			AddrRecord::V6(addr) => addr.ip_ref(),
			AddrRecord::Unspecified { .. } | AddrRecord::Unix(_) => &[],
		}
	}

	/// Same host, different port.
	pub(crate) fn with_port(&self, port: u16) -> Self {
		let mut addr = self.clone();
		addr.set_port(port);
		addr
	}
}

impl fmt::Display for AddrRecord {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			AddrRecord::Unspecified { port } => write!(f, "<unspecified>:{}", port),
			AddrRecord::V4(addr) => fmt::Display::fmt(addr, f),
			AddrRecord::V6(addr) => fmt::Display::fmt(addr, f),
			AddrRecord::Unix(addr) => fmt::Display::fmt(addr, f),
		}
	}
}

impl From<SocketAddrV4> for AddrRecord {
	fn from(addr: SocketAddrV4) -> Self {
		AddrRecord::V4(addr)
	}
}

impl From<SocketAddrV6> for AddrRecord {
	fn from(addr: SocketAddrV6) -> Self {
		AddrRecord::V6(addr)
	}
}

impl From<UnixAddr> for AddrRecord {
	fn from(addr: UnixAddr) -> Self {
		AddrRecord::Unix(addr)
	}
}

impl From<std::net::SocketAddr> for AddrRecord {
	fn from(addr: std::net::SocketAddr) -> Self {
		match addr {
			std::net::SocketAddr::V4(v4) => AddrRecord::V4(SocketAddrV4::new(v4.ip().octets(), v4.port())),
			std::net::SocketAddr::V6(v6) => AddrRecord::V6(
				SocketAddrV6::with_scope(v6.ip().octets(), v6.port(), v6.scope_id()),
			),
		}
	}
}

/// Trait for address types that can be converted to raw sockaddr for syscalls.
pub trait ToSockAddr {
	/// Calls `f` with a pointer to the raw sockaddr and its size.
	///
	/// The raw struct lives on this stack frame, so the pointer is only
	/// valid inside the closure. Returns `None` if the address cannot be
	/// expressed (Unix path too long, no host set).
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R;
}

impl ToSockAddr for AddrRecord {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		match self {
			AddrRecord::Unspecified { .. } => None,
			AddrRecord::V4(addr) => addr.with_raw(f),
			AddrRecord::V6(addr) => addr.with_raw(f),
			AddrRecord::Unix(addr) => addr.with_raw(f),
		}
	}
}

/// Trait for address types that can be created from raw sockaddr.
pub trait FromSockAddr: Sized {
	/// Creates address from raw sockaddr storage.
	///
	/// # Safety
	/// `addr` must point to at least `len` readable bytes.
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self>;
}

impl FromSockAddr for SocketAddrV4 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_in) };
		Some(Self::from_raw(raw))
	}
}

impl FromSockAddr for SocketAddrV6 {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sockaddr_in6>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_in6) };
		Some(Self::from_raw(raw))
	}
}

impl FromSockAddr for UnixAddr {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if len < std::mem::size_of::<libc::sa_family_t>() as libc::socklen_t {
			return None;
		}
		let raw = unsafe { &*(addr as *const libc::sockaddr_un) };
		Some(Self::from_raw(raw, len))
	}
}

impl FromSockAddr for AddrRecord {
	unsafe fn from_sockaddr(addr: *const libc::sockaddr, len: libc::socklen_t) -> Option<Self> {
		if addr.is_null() || len < std::mem::size_of::<libc::sa_family_t>() as libc::socklen_t {
			return None;
		}
		let family = unsafe { (*addr).sa_family } as libc::c_int;
		unsafe {
			match Domain::from_raw(family)? {
				Domain::Ipv4 => SocketAddrV4::from_sockaddr(addr, len).map(AddrRecord::V4),
				Domain::Ipv6 => SocketAddrV6::from_sockaddr(addr, len).map(AddrRecord::V6),
				Domain::Local => UnixAddr::from_sockaddr(addr, len).map(AddrRecord::Unix),
			}
		}
	}
}
