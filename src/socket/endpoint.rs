use std::os::fd::{AsRawFd, FromRawFd, IntoRawFd, OwnedFd, RawFd};
use crate::addr::{AddrRecord, Domain, FromSockAddr, ToSockAddr, UnixAddr};
use crate::addr::resolve::resolve;
use crate::error::{Result, SocketError, errno};
use super::Transport;
use super::options::{socket_domain, socket_transport};

/// Backlog used by [`Endpoint::listen`] unless configured otherwise.
pub const DEFAULT_BACKLOG: i32 = 5;

/// Largest buffer [`Endpoint::read`] allocates for one call.
pub const MAX_READ_SIZE: usize = 1 << 20;

/// One OS socket and its configuration.
///
/// Owns its descriptor exclusively and closes it exactly once, either in
/// [`Endpoint::close`] or on drop. Not `Clone`: two owners would double-close.
///
/// Lifecycle: `new` → `bind` + `listen` (server) or `connect` (client) →
/// `read`/`write`/`accept` → dropped. Operations issued in the wrong state
/// are passed to the kernel, which rejects them.
#[derive(Debug)]
pub struct Endpoint {
	/// `None` is the invalid descriptor (`-1`).
	fd: Option<OwnedFd>,
	domain: Option<Domain>,
	transport: Option<Transport>,
	port: Option<u16>,
	backlog: i32,
	addr: AddrRecord,
}

impl Default for Endpoint {
	/// An endpoint without a descriptor. Dropping it does nothing.
	fn default() -> Self {
		Self {
			fd: None,
			domain: None,
			transport: None,
			port: None,
			backlog: DEFAULT_BACKLOG,
			addr: AddrRecord::default(),
		}
	}
}

impl Endpoint {
	/// Creates a new socket of `domain` and `transport` with the default protocol.
	pub fn new(domain: Domain, transport: Transport) -> Result<Self> {
		Self::with_protocol(domain, transport, 0)
	}

	/// Creates a new socket with an explicit protocol number.
	///
	/// The socket is created with `SOCK_CLOEXEC` (close on exec).
	pub fn with_protocol(domain: Domain, transport: Transport, protocol: i32) -> Result<Self> {
		let fd = unsafe {
			libc::socket(domain.raw(), transport.raw() | libc::SOCK_CLOEXEC, protocol)
		};
		if fd == -1 {
			return Err(SocketError::Create { errno: errno() });
		}
		log::debug!("[endpoint fd={fd}] created {domain:?}/{transport:?} protocol={protocol}");

		Ok(Self {
			fd: Some(unsafe { OwnedFd::from_raw_fd(fd) }),
			domain: Some(domain),
			transport: Some(transport),
			port: None,
			backlog: DEFAULT_BACKLOG,
			addr: AddrRecord::default(),
		})
	}

	/// Returns the raw file descriptor, or -1 once closed.
	#[inline]
	pub fn as_raw_fd(&self) -> RawFd {
		self.fd.as_ref().map_or(-1, |fd| fd.as_raw_fd())
	}

	/// True while the endpoint holds an open descriptor.
	pub fn is_valid(&self) -> bool {
		self.fd.is_some()
	}

	pub fn domain(&self) -> Option<Domain> {
		self.domain
	}

	pub fn transport(&self) -> Option<Transport> {
		self.transport
	}

	/// Port passed to the last successful [`bind`](Self::bind).
	pub fn port(&self) -> Option<u16> {
		self.port
	}

	pub fn backlog(&self) -> i32 {
		self.backlog
	}

	/// Sets the backlog used by [`listen`](Self::listen).
	pub fn set_backlog(&mut self, backlog: i32) {
		self.backlog = backlog;
	}

	/// The address record: the target after `connect`, the local
	/// wildcard after `bind`.
	pub fn addr(&self) -> &AddrRecord {
		&self.addr
	}

	/// Resolves `host` into the address record, keeping the current port.
	///
	/// IPv4 answers are stored IPv4-mapped on an IPv6 endpoint. An IPv6-only
	/// name on an IPv4 endpoint is stored as IPv6 and fails at connect.
	/// Fails with [`SocketError::Resolve`] if the name has no address.
	pub fn resolve_host(&mut self, host: &str) -> Result<()> {
		let port = self.addr.port().unwrap_or(0);
		self.addr = resolve(host, self.domain)?.with_port(port);
		Ok(())
	}

	/// Sets the port of the address record.
	pub fn set_port(&mut self, port: u16) {
		self.addr.set_port(port);
	}

	/// Binds to the wildcard address of the endpoint's domain on `port`.
	///
	/// Port 0 lets the kernel pick; [`port`](Self::port) then reports the
	/// chosen one. Local endpoints have no ports, use
	/// [`bind_path`](Self::bind_path) for them.
	pub fn bind(&mut self, port: u16) -> Result<()> {
		let Some(addr) = self.domain.and_then(|domain| AddrRecord::any(domain, port)) else {
			return Err(SocketError::Bind {
				errno: libc::EAFNOSUPPORT,
				addr: format!("*:{port}"),
			});
		};
		self.bind_addr(addr)?;

		let port = if port == 0 {
			self.local_addr()?.port().unwrap_or(0)
		} else {
			port
		};
		self.port = Some(port);
		self.addr.set_port(port);
		Ok(())
	}

	/// Binds a local endpoint to a Unix socket path or abstract name.
	pub fn bind_path(&mut self, path: &UnixAddr) -> Result<()> {
		self.bind_addr(AddrRecord::Unix(path.clone()))
	}

	fn bind_addr(&mut self, addr: AddrRecord) -> Result<()> {
		let fd = self.as_raw_fd();
		let result = addr.with_raw(|ptr, len| unsafe { libc::bind(fd, ptr, len) });

		match result {
			Some(-1) => Err(SocketError::Bind {
				errno: errno(),
				addr: addr.to_string(),
			}),
			Some(_) => {
				log::debug!("[endpoint fd={fd}] bound to {addr}");
				self.addr = addr;
				Ok(())
			}
			None => Err(SocketError::InvalidAddress {
				reason: "address too long",
			}),
		}
	}

	/// Marks the socket passive with the configured backlog.
	pub fn listen(&self) -> Result<()> {
		self.listen_with_backlog(self.backlog)
	}

	/// Marks the socket passive with an explicit backlog.
	pub fn listen_with_backlog(&self, backlog: i32) -> Result<()> {
		let result = unsafe { libc::listen(self.as_raw_fd(), backlog) };
		if result == -1 {
			return Err(SocketError::Listen { errno: errno(), backlog });
		}
		log::debug!("[endpoint fd={}] listening (backlog={backlog})", self.as_raw_fd());
		Ok(())
	}

	/// Blocks until a client connects.
	///
	/// The returned endpoint owns the new connection's descriptor and
	/// copies this endpoint's domain, transport, port and address record.
	pub fn accept(&self) -> Result<Endpoint> {
		let fd = unsafe {
			libc::accept4(
				self.as_raw_fd(),
				std::ptr::null_mut(),
				std::ptr::null_mut(),
				libc::SOCK_CLOEXEC,
			)
		};
		if fd == -1 {
			return Err(SocketError::Accept { errno: errno() });
		}
		log::debug!("[endpoint fd={}] accepted fd={fd}", self.as_raw_fd());
		Ok(self.adopt(unsafe { OwnedFd::from_raw_fd(fd) }))
	}

	/// Like [`accept`](Self::accept), also returning the client's address.
	pub fn accept_with_addr(&self) -> Result<(Endpoint, AddrRecord)> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let fd = unsafe {
			libc::accept4(
				self.as_raw_fd(),
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
				libc::SOCK_CLOEXEC,
			)
		};
		if fd == -1 {
			return Err(SocketError::Accept { errno: errno() });
		}
		let peer = self.adopt(unsafe { OwnedFd::from_raw_fd(fd) });

		let addr = unsafe {
			AddrRecord::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
				.ok_or(SocketError::InvalidAddress { reason: "invalid client address" })?
		};
		log::debug!("[endpoint fd={}] accepted fd={fd} from {addr}", self.as_raw_fd());
		Ok((peer, addr))
	}

	fn adopt(&self, fd: OwnedFd) -> Endpoint {
		Endpoint {
			fd: Some(fd),
			domain: self.domain,
			transport: self.transport,
			port: self.port,
			backlog: self.backlog,
			addr: self.addr.clone(),
		}
	}

	/// Resolves `host`, sets `port` and connects. Blocks until the
	/// kernel completes or fails the connection.
	///
	/// On a datagram endpoint this only fixes the default peer.
	pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
		self.resolve_host(host)?;
		self.set_port(port);
		self.connect_addr(&self.addr)
	}

	/// Connects a local endpoint to a Unix socket path or abstract name.
	pub fn connect_path(&mut self, path: &UnixAddr) -> Result<()> {
		let addr = AddrRecord::Unix(path.clone());
		self.connect_addr(&addr)?;
		self.addr = addr;
		Ok(())
	}

	fn connect_addr(&self, addr: &AddrRecord) -> Result<()> {
		let fd = self.as_raw_fd();
		let result = addr.with_raw(|ptr, len| unsafe { libc::connect(fd, ptr, len) });

		match result {
			Some(-1) => Err(SocketError::Connect {
				errno: errno(),
				addr: addr.to_string(),
			}),
			Some(_) => {
				log::debug!("[endpoint fd={fd}] connected to {addr}");
				Ok(())
			}
			None => Err(SocketError::InvalidAddress {
				reason: "no host set or address too long",
			}),
		}
	}

	/// Reads up to `max_size` bytes.
	///
	/// Returns exactly the bytes received. An empty vector means the peer
	/// closed the stream. Requests above [`MAX_READ_SIZE`] are clamped to it.
	pub fn read(&self, max_size: usize) -> Result<Vec<u8>> {
		let len = max_size.min(MAX_READ_SIZE);
		let mut buf = Vec::new();
		buf.try_reserve_exact(len)
			.map_err(|_| SocketError::Read { errno: libc::ENOMEM })?;
		buf.resize(len, 0);
		let n = self.read_into(&mut buf)?;
		buf.truncate(n);
		Ok(buf)
	}

	/// Reads into `buf`, returning the number of bytes received.
	pub fn read_into(&self, buf: &mut [u8]) -> Result<usize> {
		let n = unsafe {
			libc::read(
				self.as_raw_fd(),
				buf.as_mut_ptr() as *mut libc::c_void,
				buf.len(),
			)
		};

		if n == -1 {
			return Err(SocketError::Read { errno: errno() });
		}
		log::trace!("[endpoint fd={}] read {n} bytes", self.as_raw_fd());
		Ok(n as usize)
	}

	/// Issues a single write and returns how many bytes the kernel took.
	///
	/// A short count is returned as-is, not retried.
	pub fn write(&self, buf: &[u8]) -> Result<usize> {
		let n = unsafe {
			libc::write(
				self.as_raw_fd(),
				buf.as_ptr() as *const libc::c_void,
				buf.len(),
			)
		};

		if n == -1 {
			return Err(SocketError::Write { errno: errno() });
		}
		log::trace!("[endpoint fd={}] wrote {n}/{} bytes", self.as_raw_fd(), buf.len());
		Ok(n as usize)
	}

	/// Shuts down one or both directions of a connected socket.
	pub fn shutdown(&self, how: Shutdown) -> Result<()> {
		let how = match how {
			Shutdown::Read => libc::SHUT_RD,
			Shutdown::Write => libc::SHUT_WR,
			Shutdown::ReadWrite => libc::SHUT_RDWR,
		};

		let result = unsafe { libc::shutdown(self.as_raw_fd(), how) };
		if result == -1 {
			Err(SocketError::SetOption { errno: errno(), option: "shutdown" })
		} else {
			Ok(())
		}
	}

	/// Returns the local address the kernel assigned (`getsockname`).
	pub fn local_addr(&self) -> Result<AddrRecord> {
		self.query_addr(libc::getsockname, "SO_SOCKNAME")
	}

	/// Returns the remote address of a connected socket (`getpeername`).
	pub fn peer_addr(&self) -> Result<AddrRecord> {
		self.query_addr(libc::getpeername, "SO_PEERNAME")
	}

	fn query_addr(
		&self,
		call: unsafe extern "C" fn(libc::c_int, *mut libc::sockaddr, *mut libc::socklen_t) -> libc::c_int,
		option: &'static str,
	) -> Result<AddrRecord> {
		let mut storage: libc::sockaddr_storage = unsafe { std::mem::zeroed() };
		let mut len = std::mem::size_of::<libc::sockaddr_storage>() as libc::socklen_t;

		let result = unsafe {
			call(
				self.as_raw_fd(),
				&mut storage as *mut _ as *mut libc::sockaddr,
				&mut len,
			)
		};
		if result == -1 {
			return Err(SocketError::GetOption { errno: errno(), option });
		}

		unsafe {
			AddrRecord::from_sockaddr(&storage as *const _ as *const libc::sockaddr, len)
				.ok_or(SocketError::InvalidAddress { reason: "invalid address" })
		}
	}

	/// Closes the descriptor now. Later operations fail with `EBADF`;
	/// calling it again does nothing.
	pub fn close(&mut self) {
		if let Some(fd) = self.fd.take() {
			log::debug!("[endpoint fd={}] closed", fd.as_raw_fd());
			drop(fd);
		}
	}
}

impl Drop for Endpoint {
	fn drop(&mut self) {
		self.close();
	}
}

/// Which direction(s) [`Endpoint::shutdown`] closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shutdown {
	Read,   // SHUT_RD
	Write,  // SHUT_WR
	ReadWrite,   // SHUT_RDWR
}

impl From<OwnedFd> for Endpoint {
	/// Adopts an open descriptor. Domain and transport are asked from the
	/// kernel; they stay unknown if it cannot tell.
	fn from(fd: OwnedFd) -> Self {
		let domain = socket_domain(&fd);
		let transport = socket_transport(&fd);
		Self {
			fd: Some(fd),
			domain,
			transport,
			port: None,
			backlog: DEFAULT_BACKLOG,
			addr: AddrRecord::default(),
		}
	}
}

impl AsRawFd for Endpoint {
	fn as_raw_fd(&self) -> RawFd {
		Endpoint::as_raw_fd(self)
	}
}

impl FromRawFd for Endpoint {
	/// Wraps an existing descriptor without validating it.
	/// A negative descriptor yields an invalid endpoint.
	unsafe fn from_raw_fd(fd: RawFd) -> Self {
		if fd < 0 {
			return Self::default();
		}
		Self::from(unsafe { OwnedFd::from_raw_fd(fd) })
	}
}

impl IntoRawFd for Endpoint {
	fn into_raw_fd(mut self) -> RawFd {
		self.fd.take().map_or(-1, IntoRawFd::into_raw_fd)
	}
}

impl std::io::Read for Endpoint {
	fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
		Ok(self.read_into(buf)?)
	}
}

impl std::io::Write for Endpoint {
	fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
		Ok(Endpoint::write(self, buf)?)
	}

	fn flush(&mut self) -> std::io::Result<()> {
		Ok(())  // nothing buffered in user space
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn socket_pair(transport: Transport) -> (Endpoint, Endpoint) {
		let mut fds = [0; 2];
		let rc = unsafe {
			libc::socketpair(libc::AF_UNIX, transport.raw() | libc::SOCK_CLOEXEC, 0, fds.as_mut_ptr())
		};
		assert_eq!(rc, 0, "socketpair failed");
		unsafe { (Endpoint::from_raw_fd(fds[0]), Endpoint::from_raw_fd(fds[1])) }
	}

	#[test]
	fn default_endpoint_is_invalid_and_drops_quietly() {
		let ep = Endpoint::default();
		assert!(!ep.is_valid());
		assert_eq!(ep.as_raw_fd(), -1);
		assert_eq!(ep.backlog(), DEFAULT_BACKLOG);
		drop(ep);
	}

	#[test]
	fn wrapping_a_negative_descriptor_is_invalid() {
		let ep = unsafe { Endpoint::from_raw_fd(-1) };
		assert!(!ep.is_valid());
		assert_eq!(ep.into_raw_fd(), -1);
	}

	#[test]
	fn wrapped_descriptor_learns_domain_and_transport() {
		let (a, b) = socket_pair(Transport::Stream);
		assert_eq!(a.domain(), Some(Domain::Local));
		assert_eq!(a.transport(), Some(Transport::Stream));
		assert_ne!(a.as_raw_fd(), b.as_raw_fd());
	}

	#[test]
	fn pair_exchanges_bytes() {
		let (a, b) = socket_pair(Transport::Stream);
		assert_eq!(a.write(b"ping").unwrap(), 4);
		assert_eq!(b.read(16).unwrap(), b"ping");
	}

	#[test]
	fn read_returns_at_most_max_size() {
		let (a, b) = socket_pair(Transport::Stream);
		a.write(b"hello").unwrap();
		assert_eq!(b.read(2).unwrap(), b"he");
		assert_eq!(b.read(5).unwrap(), b"llo");
	}

	#[test]
	fn oversized_read_is_clamped() {
		let (a, b) = socket_pair(Transport::Stream);
		a.write(b"hi").unwrap();
		assert_eq!(b.read(usize::MAX).unwrap(), b"hi");

		a.write(b"again").unwrap();
		assert_eq!(b.read(MAX_READ_SIZE + 1).unwrap(), b"again");
	}

	#[test]
	fn read_after_close_fails_with_ebadf() {
		let (mut a, _b) = socket_pair(Transport::Stream);
		a.close();
		a.close();
		let err = a.read(1).unwrap_err();
		assert!(matches!(err, SocketError::Read { errno: libc::EBADF }));
		let err = a.write(b"x").unwrap_err();
		assert!(matches!(err, SocketError::Write { errno: libc::EBADF }));
	}

	#[test]
	fn datagram_pair_keeps_boundaries() {
		let (a, b) = socket_pair(Transport::Datagram);
		a.write(b"one").unwrap();
		a.write(b"two").unwrap();
		assert_eq!(b.read(64).unwrap(), b"one");
		assert_eq!(b.read(64).unwrap(), b"two");
	}

	#[test]
	fn bind_on_local_domain_needs_a_path() {
		let mut ep = Endpoint::new(Domain::Local, Transport::Stream).unwrap();
		let err = ep.bind(8080).unwrap_err();
		assert!(matches!(err, SocketError::Bind { errno: libc::EAFNOSUPPORT, .. }));
	}

	#[test]
	fn connect_without_host_is_rejected_before_the_kernel() {
		let ep = Endpoint::new(Domain::Ipv4, Transport::Stream).unwrap();
		let err = ep.connect_addr(&AddrRecord::Unspecified { port: 80 }).unwrap_err();
		assert!(matches!(err, SocketError::InvalidAddress { .. }));
	}

	#[test]
	fn io_traits_delegate() {
		use std::io::{Read, Write};
		let (mut a, mut b) = socket_pair(Transport::Stream);
		a.write_all(b"via std").unwrap();
		a.flush().unwrap();
		let mut buf = [0u8; 7];
		b.read_exact(&mut buf).unwrap();
		assert_eq!(&buf, b"via std");
	}
}
