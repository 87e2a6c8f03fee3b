use std::ffi::{CStr, CString};
use crate::addr::{AddrRecord, Domain, FromSockAddr};
use crate::error::{Result, SocketError};

/// Owns the list returned by `getaddrinfo()`; frees it on drop.
struct AddrInfoList(*mut libc::addrinfo);

impl AddrInfoList {
	fn iter(&self) -> impl Iterator<Item = &libc::addrinfo> {
		let mut cur = self.0;
		std::iter::from_fn(move || {
			if cur.is_null() {
				return None;
			}
			let info = unsafe { &*cur };
			cur = info.ai_next;
			Some(info)
		})
	}
}

impl Drop for AddrInfoList {
	fn drop(&mut self) {
		if !self.0.is_null() {
			unsafe { libc::freeaddrinfo(self.0) };
		}
	}
}

/// Resolves `host` to every IPv4/IPv6 address the system resolver knows.
///
/// Accepts names from DNS or the hosts file, and numeric literals of
/// either family. Ports in the returned records are 0.
pub fn lookup_host(host: &str) -> Result<Vec<AddrRecord>> {
	let no_such_host = |reason: String| SocketError::Resolve {
		host: host.to_owned(),
		reason,
	};

	let c_host = CString::new(host)
		.map_err(|_| no_such_host("host name contains a NUL byte".into()))?;

	let mut hints: libc::addrinfo = unsafe { std::mem::zeroed() };
	hints.ai_family = libc::AF_UNSPEC;
	// One entry per address instead of one per socket type.
	hints.ai_socktype = libc::SOCK_STREAM;

	let mut res: *mut libc::addrinfo = std::ptr::null_mut();
	let rc = unsafe { libc::getaddrinfo(c_host.as_ptr(), std::ptr::null(), &hints, &mut res) };
	let list = AddrInfoList(res);
	if rc != 0 {
		let reason = unsafe { CStr::from_ptr(libc::gai_strerror(rc)) }
			.to_string_lossy()
			.into_owned();
		return Err(no_such_host(reason));
	}

	let mut found = Vec::new();
	for info in list.iter() {
		let addr = unsafe { AddrRecord::from_sockaddr(info.ai_addr, info.ai_addrlen) };
		if let Some(addr @ (AddrRecord::V4(_) | AddrRecord::V6(_))) = addr {
			if !found.contains(&addr) {
				found.push(addr);
			}
		}
	}
	Ok(found)
}

/// Resolves `host` to a single address for an endpoint of `domain`.
///
/// The first result in `domain`'s family wins. An IPv6 endpoint given only
/// IPv4 answers gets the first one as an IPv4-mapped address. Otherwise the
/// resolver's first answer is used, and a family mismatch surfaces at connect.
pub(crate) fn resolve(host: &str, domain: Option<Domain>) -> Result<AddrRecord> {
	let mut found = lookup_host(host)?;
	if found.is_empty() {
		return Err(SocketError::Resolve {
			host: host.to_owned(),
			reason: "no IPv4 or IPv6 address".into(),
		});
	}

	let pick = domain
		.and_then(|d| found.iter().position(|addr| addr.family() == Some(d)))
		.unwrap_or(0);
	let addr = match (domain, found.swap_remove(pick)) {
		(Some(Domain::Ipv6), AddrRecord::V4(v4)) => AddrRecord::V6(v4.to_ipv6_mapped()),
		(_, addr) => addr,
	};
	log::trace!("resolved {host} -> {addr}");
	Ok(addr)
}
