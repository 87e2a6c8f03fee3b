use std::fmt;
use crate::addr::ToSockAddr;

/// Unix domain socket address (file path or abstract name).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UnixAddr {
	path: Vec<u8>,
	/// True if this is an abstract socket (Linux-only, no filesystem entry).
	is_abstract: bool,
}

/// Offset of `sun_path` inside `sockaddr_un`.
const PATH_OFFSET: usize = std::mem::offset_of!(libc::sockaddr_un, sun_path);

impl UnixAddr {
	/// Creates a new Unix address from a filesystem path.
	pub fn new<P: AsRef<[u8]>>(path: P) -> Self {
		Self {
			path: path.as_ref().to_vec(),
			is_abstract: false,
		}
	}

	/// Creates an abstract socket address (Linux-only).
	///
	/// Abstract names have no filesystem entry and vanish with the last
	/// socket that uses them.
	pub fn abstract_socket<P: AsRef<[u8]>>(name: P) -> Self {
		Self {
			path: name.as_ref().to_vec(),
			is_abstract: true,
		}
	}

	/// Returns true if this is an abstract socket.
	pub fn is_abstract(&self) -> bool {
		self.is_abstract
	}

	/// Returns the path bytes (without the leading NUL of abstract names).
	pub fn path(&self) -> &[u8] {
		&self.path
	}

	/// Converts to the raw sockaddr_un and the length to pass to the kernel.
	///
	/// `None` if the path does not fit into `sun_path`.
	pub(crate) fn to_raw(&self) -> Option<(libc::sockaddr_un, libc::socklen_t)> {
		let mut addr: libc::sockaddr_un = unsafe { std::mem::zeroed() };
		addr.sun_family = libc::AF_UNIX as libc::sa_family_t;

		// Abstract names start after a NUL; filesystem paths end with one.
		let start = usize::from(self.is_abstract);
		if start + self.path.len() >= addr.sun_path.len() {
			return None;
		}
		for (slot, &byte) in addr.sun_path[start..].iter_mut().zip(&self.path) {
			*slot = byte as libc::c_char;
		}

		// Either way one NUL byte is counted next to the name.
		let used = self.path.len() + 1;
		Some((addr, (PATH_OFFSET + used) as libc::socklen_t))
	}

	/// Creates from raw sockaddr_un; `len` is the size the kernel reported.
	pub(crate) fn from_raw(raw: &libc::sockaddr_un, len: libc::socklen_t) -> Self {
		let used = (len as usize)
			.saturating_sub(PATH_OFFSET)
			.min(raw.sun_path.len());
		let bytes: Vec<u8> = raw.sun_path[..used].iter().map(|&c| c as u8).collect();

		match bytes.split_first() {
			Some((&0, name)) => Self::abstract_socket(name),
			_ => {
				let end = bytes.iter().position(|&c| c == 0).unwrap_or(bytes.len());
				Self::new(&bytes[..end])
			}
		}
	}
}

impl fmt::Display for UnixAddr {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let path = String::from_utf8_lossy(&self.path);
		if self.is_abstract {
			write!(f, "@{}", path)
		} else {
			write!(f, "{}", path)
		}
	}
}

impl ToSockAddr for UnixAddr {
	fn with_raw<F, R>(&self, f: F) -> Option<R>
	where
		F: FnOnce(*const libc::sockaddr, libc::socklen_t) -> R,
	{
		let (raw, len) = self.to_raw()?;
		let ptr = &raw as *const _ as *const libc::sockaddr;
		Some(f(ptr, len))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn abstract_name_round_trips() {
		let addr = UnixAddr::abstract_socket("unisock-test");
		let (raw, len) = addr.to_raw().unwrap();
		assert_eq!(raw.sun_path[0], 0);
		assert_eq!(len as usize, PATH_OFFSET + 1 + "unisock-test".len());
		assert_eq!(UnixAddr::from_raw(&raw, len), addr);
	}

	#[test]
	fn filesystem_path_round_trips() {
		let addr = UnixAddr::new("/tmp/unisock.sock");
		let (raw, len) = addr.to_raw().unwrap();
		assert_eq!(UnixAddr::from_raw(&raw, len), addr);
		assert_eq!(addr.to_string(), "/tmp/unisock.sock");
	}

	#[test]
	fn rejects_path_longer_than_sun_path() {
		let long = vec![b'a'; 200];
		assert!(UnixAddr::new(&long).to_raw().is_none());
		assert!(UnixAddr::abstract_socket(&long).with_raw(|_, _| ()).is_none());
	}
}
