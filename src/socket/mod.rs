mod endpoint;
mod options;
mod builder;

pub use self::endpoint::{Endpoint, Shutdown, DEFAULT_BACKLOG, MAX_READ_SIZE};
pub use self::options::{set_reuse_addr, set_reuse_port, set_tcp_nodelay,
						set_recv_buffer_size, set_send_buffer_size,
						recv_buffer_size, take_error};
pub use self::builder::{EndpointBuilder, BufferConfig, ReuseConfig};

/// Transport kind of an endpoint.
///
/// - `Stream` — reliable, ordered byte stream (TCP-like)
/// - `Datagram` — unreliable, unordered packets (UDP-like)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transport {
	Stream,
	Datagram,
}

impl Transport {
	/// Returns the libc constant for this socket type.
	#[inline]
	pub fn raw(self) -> libc::c_int {
		match self {
			Transport::Stream => libc::SOCK_STREAM,
			Transport::Datagram => libc::SOCK_DGRAM,
		}
	}

	pub(crate) fn from_raw(ty: libc::c_int) -> Option<Self> {
		match ty {
			libc::SOCK_STREAM => Some(Transport::Stream),
			libc::SOCK_DGRAM => Some(Transport::Datagram),
			_ => None,
		}
	}
}

/*
  ┌───────────┬─────────────┬────────────────────────────────────────┐
  │ Transport │  Constant   │               Guarantees               │
  ├───────────┼─────────────┼────────────────────────────────────────┤
  │ Stream    │ SOCK_STREAM │ Ordered, reliable, no boundaries       │
  ├───────────┼─────────────┼────────────────────────────────────────┤
  │ Datagram  │ SOCK_DGRAM  │ Fast, no guarantees, packet boundaries │
  └───────────┴─────────────┴────────────────────────────────────────┘
*/
