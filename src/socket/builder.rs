use std::os::fd::AsRawFd;
use crate::addr::Domain;
use crate::error::Result;
use super::{
	Endpoint, Transport, DEFAULT_BACKLOG,
	set_reuse_addr, set_reuse_port, set_tcp_nodelay,
	set_recv_buffer_size, set_send_buffer_size,
};

/// Buffer size configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct BufferConfig {
	pub recv: Option<usize>,
	pub send: Option<usize>,
}

impl BufferConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn recv(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self
	}

	pub fn send(mut self, size: usize) -> Self {
		self.send = Some(size);
		self
	}

	pub fn both(mut self, size: usize) -> Self {
		self.recv = Some(size);
		self.send = Some(size);
		self
	}

	fn apply<S: AsRawFd>(&self, socket: &S) -> Result<()> {
		if let Some(size) = self.recv {
			set_recv_buffer_size(socket, size)?;
		}
		if let Some(size) = self.send {
			set_send_buffer_size(socket, size)?;
		}
		Ok(())
	}
}

/// Address reuse configuration. Both off by default, like a plain socket.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReuseConfig {
	pub addr: bool,
	pub port: bool,
}

impl ReuseConfig {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn addr(mut self, enable: bool) -> Self {
		self.addr = enable;
		self
	}

	pub fn port(mut self, enable: bool) -> Self {
		self.port = enable;
		self
	}

	fn apply<S: AsRawFd>(&self, socket: &S) -> Result<()> {
		if self.addr {
			set_reuse_addr(socket, true)?;
		}
		if self.port {
			set_reuse_port(socket, true)?;
		}
		Ok(())
	}
}

/// Builder for endpoints that need options set before bind/connect.
///
/// # Example
/// ```no_run
/// use unisock::{Domain, Transport, EndpointBuilder, ReuseConfig};
///
/// let mut server = EndpointBuilder::new(Domain::Ipv4, Transport::Stream)
///     .reuse(ReuseConfig::new().addr(true))
///     .backlog(128)
///     .build()?;
/// server.bind(8080)?;
/// server.listen()?;
/// # Ok::<(), unisock::SocketError>(())
/// ```
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
	domain: Domain,
	transport: Transport,
	protocol: i32,
	backlog: i32,
	reuse: ReuseConfig,
	nodelay: bool,
	buffers: BufferConfig,
}

impl EndpointBuilder {
	pub fn new(domain: Domain, transport: Transport) -> Self {
		Self {
			domain,
			transport,
			protocol: 0,
			backlog: DEFAULT_BACKLOG,
			reuse: ReuseConfig::default(),
			nodelay: false,
			buffers: BufferConfig::default(),
		}
	}

	/// Set the protocol number passed to `socket()`. Default: 0.
	pub fn protocol(mut self, protocol: i32) -> Self {
		self.protocol = protocol;
		self
	}

	/// Set listen backlog. Default: 5.
	pub fn backlog(mut self, backlog: i32) -> Self {
		self.backlog = backlog;
		self
	}

	/// Set address reuse options.
	pub fn reuse(mut self, config: ReuseConfig) -> Self {
		self.reuse = config;
		self
	}

	/// Disable Nagle's algorithm. Only applied to IPv4/IPv6 streams.
	pub fn tcp_nodelay(mut self, enable: bool) -> Self {
		self.nodelay = enable;
		self
	}

	/// Set buffer sizes.
	pub fn buffers(mut self, config: BufferConfig) -> Self {
		self.buffers = config;
		self
	}

	/// Creates the endpoint and applies every option.
	///
	/// If an option fails the half-configured socket is closed.
	pub fn build(self) -> Result<Endpoint> {
		let mut endpoint = Endpoint::with_protocol(self.domain, self.transport, self.protocol)?;
		endpoint.set_backlog(self.backlog);

		self.reuse.apply(&endpoint)?;
		let is_tcp = self.transport == Transport::Stream && self.domain != Domain::Local;
		if is_tcp && self.nodelay {
			set_tcp_nodelay(&endpoint, true)?;
		}
		self.buffers.apply(&endpoint)?;

		Ok(endpoint)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::socket::recv_buffer_size;

	#[test]
	fn defaults_match_plain_endpoint() {
		let ep = EndpointBuilder::new(Domain::Ipv4, Transport::Stream).build().unwrap();
		assert_eq!(ep.backlog(), DEFAULT_BACKLOG);
		assert_eq!(ep.domain(), Some(Domain::Ipv4));
		assert_eq!(ep.transport(), Some(Transport::Stream));
	}

	#[test]
	fn applies_backlog_and_buffers() {
		let ep = EndpointBuilder::new(Domain::Ipv4, Transport::Datagram)
			.backlog(64)
			.buffers(BufferConfig::new().both(16 * 1024))
			.build()
			.unwrap();
		assert_eq!(ep.backlog(), 64);
		assert!(recv_buffer_size(&ep).unwrap() >= 16 * 1024);
	}

	#[test]
	fn nodelay_is_skipped_for_local_streams() {
		let ep = EndpointBuilder::new(Domain::Local, Transport::Stream)
			.tcp_nodelay(true)
			.build();
		assert!(ep.is_ok());
	}
}
