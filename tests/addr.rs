//! Host resolution and the endpoint's address record.

use unisock::{lookup_host, AddrRecord, Domain, Endpoint, SocketAddrV4, SocketError, Transport};

#[test]
fn localhost_resolves() {
	let addrs = lookup_host("localhost").unwrap();
	assert!(!addrs.is_empty());
	assert!(addrs.iter().all(|a| matches!(a, AddrRecord::V4(_) | AddrRecord::V6(_))));
	assert!(addrs.iter().all(|a| a.port() == Some(0)));
}

#[test]
fn resolve_host_populates_the_record() {
	let mut ep = Endpoint::new(Domain::Ipv4, Transport::Stream).unwrap();
	assert_eq!(ep.addr(), &AddrRecord::Unspecified { port: 0 });

	ep.resolve_host("localhost").unwrap();
	assert_eq!(ep.addr().family(), Some(Domain::Ipv4));
	assert_eq!(ep.addr().ip_bytes(), &[127, 0, 0, 1]);
}

#[test]
fn literal_addresses_resolve_to_their_own_family() {
	let mut ep = Endpoint::new(Domain::Ipv4, Transport::Stream).unwrap();
	ep.resolve_host("10.1.2.3").unwrap();
	assert_eq!(ep.addr(), &AddrRecord::V4(SocketAddrV4::new([10, 1, 2, 3], 0)));

	// An IPv6 literal stays IPv6 even on an IPv4 endpoint; all 16 bytes are kept.
	ep.resolve_host("2001:db8::7").unwrap();
	assert_eq!(ep.addr().family(), Some(Domain::Ipv6));
	assert_eq!(ep.addr().ip_bytes(), &"2001:db8::7".parse::<std::net::Ipv6Addr>().unwrap().octets());
}

#[test]
fn port_survives_resolution() {
	let mut ep = Endpoint::new(Domain::Ipv4, Transport::Stream).unwrap();
	ep.set_port(8080);
	ep.resolve_host("127.0.0.1").unwrap();
	assert_eq!(ep.addr(), &AddrRecord::V4(SocketAddrV4::localhost(8080)));

	ep.set_port(9090);
	assert_eq!(ep.addr().port(), Some(9090));
	assert_eq!(ep.addr().to_string(), "127.0.0.1:9090");
}

#[test]
fn unknown_host_is_reported() {
	let mut ep = Endpoint::new(Domain::Ipv4, Transport::Stream).unwrap();
	ep.set_port(80);
	let err = ep.resolve_host("unisock-no-such-host.invalid").unwrap_err();
	assert!(matches!(&err, SocketError::Resolve { host, .. } if host == "unisock-no-such-host.invalid"));
	assert!(err.to_string().starts_with("no such host"));

	// A failed lookup leaves the record untouched.
	assert_eq!(ep.addr(), &AddrRecord::Unspecified { port: 80 });
}

#[test]
fn record_converts_from_std_addresses() {
	let v6: std::net::SocketAddr = "[::1]:443".parse().unwrap();
	let record = AddrRecord::from(v6);
	assert_eq!(record.family(), Some(Domain::Ipv6));
	assert_eq!(record.port(), Some(443));
	assert_eq!(record.to_string(), "[::1]:443");
}
