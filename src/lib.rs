//! A blocking wrapper around one OS socket.
//!
//! [`Endpoint`] owns a single descriptor and covers the whole lifecycle:
//! create, resolve, bind, listen, accept, connect, read, write, close.
//! The descriptor is released when the endpoint is dropped.
//!
//! ```no_run
//! use unisock::{Domain, Endpoint, Transport};
//!
//! let mut client = Endpoint::new(Domain::Ipv4, Transport::Stream)?;
//! client.connect("localhost", 7000)?;
//! client.write(b"hello")?;
//! let reply = client.read(1024)?;
//! # let _ = reply;
//! # Ok::<(), unisock::SocketError>(())
//! ```

pub mod socket;
mod addr;
mod error;

pub use self::error::{Result, SocketError, errno};
pub use self::addr::{Domain, AddrRecord, SocketAddrV4, SocketAddrV6, UnixAddr,
					 ToSockAddr, FromSockAddr, lookup_host};
pub use self::socket::{Endpoint, Transport, Shutdown, DEFAULT_BACKLOG, MAX_READ_SIZE,
					   EndpointBuilder, BufferConfig, ReuseConfig,
					   set_reuse_addr, set_reuse_port, set_tcp_nodelay,
					   set_recv_buffer_size, set_send_buffer_size,
					   recv_buffer_size, take_error};
