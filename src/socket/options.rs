use std::os::fd::AsRawFd;
use crate::addr::Domain;
use crate::error::{Result, SocketError, errno};
use super::Transport;

fn set_int_option<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
	val: libc::c_int,
	option: &'static str,
) -> Result<()> {
	let result = unsafe {
		libc::setsockopt(
			socket.as_raw_fd(),
			level,
			name,
			&val as *const _ as *const libc::c_void,
			std::mem::size_of::<libc::c_int>() as libc::socklen_t,
		)
	};
	if result == -1 {
		Err(SocketError::SetOption { errno: errno(), option })
	} else {
		Ok(())
	}
}

fn get_int_option<S: AsRawFd>(
	socket: &S,
	level: libc::c_int,
	name: libc::c_int,
	option: &'static str,
) -> Result<libc::c_int> {
	let mut val: libc::c_int = 0;
	let mut len = std::mem::size_of::<libc::c_int>() as libc::socklen_t;
	let result = unsafe {
		libc::getsockopt(
			socket.as_raw_fd(),
			level,
			name,
			&mut val as *mut _ as *mut libc::c_void,
			&mut len,
		)
	};
	if result == -1 {
		Err(SocketError::GetOption { errno: errno(), option })
	} else {
		Ok(val)
	}
}

/// Sizes above `c_int::MAX` are rejected with `EINVAL` instead of wrapping.
fn set_size_option<S: AsRawFd>(
	socket: &S,
	name: libc::c_int,
	size: usize,
	option: &'static str,
) -> Result<()> {
	let size = libc::c_int::try_from(size)
		.map_err(|_| SocketError::SetOption { errno: libc::EINVAL, option })?;
	set_int_option(socket, libc::SOL_SOCKET, name, size, option)
}

/// Sets SO_REUSEADDR on a socket.
///
/// Allows binding to an address that's in TIME_WAIT state.
/// Essential for server restarts.
pub fn set_reuse_addr<S: AsRawFd>(socket: &S, enable: bool) -> Result<()> {
	set_int_option(socket, libc::SOL_SOCKET, libc::SO_REUSEADDR, enable as libc::c_int, "SO_REUSEADDR")
}

/// Sets SO_REUSEPORT on a socket.
///
/// Allows multiple sockets to bind the same port.
pub fn set_reuse_port<S: AsRawFd>(socket: &S, enable: bool) -> Result<()> {
	set_int_option(socket, libc::SOL_SOCKET, libc::SO_REUSEPORT, enable as libc::c_int, "SO_REUSEPORT")
}

/// Sets TCP_NODELAY on a socket.
///
/// Disables Nagle's algorithm — sends data immediately.
pub fn set_tcp_nodelay<S: AsRawFd>(socket: &S, enable: bool) -> Result<()> {
	set_int_option(socket, libc::IPPROTO_TCP, libc::TCP_NODELAY, enable as libc::c_int, "TCP_NODELAY")
}

/// Sets receive buffer size (SO_RCVBUF).
///
/// Kernel typically doubles this value internally.
pub fn set_recv_buffer_size<S: AsRawFd>(socket: &S, size: usize) -> Result<()> {
	set_size_option(socket, libc::SO_RCVBUF, size, "SO_RCVBUF")
}

/// Sets send buffer size (SO_SNDBUF).
///
/// Kernel typically doubles this value internally.
pub fn set_send_buffer_size<S: AsRawFd>(socket: &S, size: usize) -> Result<()> {
	set_size_option(socket, libc::SO_SNDBUF, size, "SO_SNDBUF")
}

/// Returns the receive buffer size the kernel actually uses.
pub fn recv_buffer_size<S: AsRawFd>(socket: &S) -> Result<usize> {
	get_int_option(socket, libc::SOL_SOCKET, libc::SO_RCVBUF, "SO_RCVBUF").map(|v| v as usize)
}

/// Reads and clears the pending socket error (SO_ERROR).
///
/// `None` when no error is pending.
pub fn take_error<S: AsRawFd>(socket: &S) -> Result<Option<std::io::Error>> {
	let error = get_int_option(socket, libc::SOL_SOCKET, libc::SO_ERROR, "SO_ERROR")?;
	if error == 0 {
		Ok(None)
	} else {
		Ok(Some(std::io::Error::from_raw_os_error(error)))
	}
}

/// Address family the kernel created `socket` with (SO_DOMAIN).
pub(crate) fn socket_domain<S: AsRawFd>(socket: &S) -> Option<Domain> {
	get_int_option(socket, libc::SOL_SOCKET, libc::SO_DOMAIN, "SO_DOMAIN")
		.ok()
		.and_then(Domain::from_raw)
}

/// Socket type the kernel created `socket` with (SO_TYPE).
pub(crate) fn socket_transport<S: AsRawFd>(socket: &S) -> Option<Transport> {
	get_int_option(socket, libc::SOL_SOCKET, libc::SO_TYPE, "SO_TYPE")
		.ok()
		.and_then(Transport::from_raw)
}
