//! Address parsing and normalization through the public API.

use std::net::IpAddr;

use nodekit::net::{
    is_loopback_alias, Address, AddressError, HostPort, HostResolver, ResolveError,
    StaticResolver, NULL_ADDRESS,
};

fn resolver() -> StaticResolver {
    StaticResolver("172.16.4.9".parse().unwrap())
}

/// Resolver that always fails, like a machine without network configuration.
struct Offline;

impl HostResolver for Offline {
    fn local_ip(&self) -> Result<IpAddr, ResolveError> {
        Err(ResolveError::Io(std::io::Error::new(
            std::io::ErrorKind::NetworkUnreachable,
            "no route",
        )))
    }
}

#[test]
fn non_loopback_hosts_are_unchanged() {
    for (host, port) in [("node-1", 4801), ("10.0.0.5", 0), ("a:b", 65535), ("db", -1)] {
        let addr = Address::with_resolver(host, port, &resolver()).unwrap();
        assert_eq!(addr.host(), host);
        assert_eq!(addr.port(), port);
        assert_eq!(addr.to_string(), format!("{host}:{port}"));
    }
}

#[test]
fn parse_examples() {
    let addr = Address::parse_with("10.0.0.5:8080", &resolver()).unwrap();
    assert_eq!((addr.host(), addr.port()), ("10.0.0.5", 8080));

    let addr = Address::parse_with("myhost:with:colons:9090", &resolver()).unwrap();
    assert_eq!((addr.host(), addr.port()), ("myhost:with:colons", 9090));
}

#[test]
fn parse_localhost_uses_resolved_ip() {
    let addr = Address::parse_with("localhost:7000", &resolver()).unwrap();
    assert_eq!(addr.host(), "172.16.4.9");
    assert_eq!(addr.port(), 7000);
    assert!(!is_loopback_alias(addr.host()));
}

#[test]
fn invalid_format_errors() {
    assert!(matches!(Address::parse_with("", &resolver()), Err(AddressError::Missing)));
    assert!(matches!(Address::from_optional(None), Err(AddressError::Missing)));

    for text in ["noport", "host:abc"] {
        let err = Address::parse_with(text, &resolver()).unwrap_err();
        assert!(err.is_invalid_format(), "{text}");
        assert_eq!(err.to_string(), format!("can't parse host-and-port string from: {text}"));
    }

    let err = Address::parse_with("host:4294967296", &resolver()).unwrap_err();
    assert_eq!(err.to_string(), "can't parse port from: host:4294967296");
}

#[test]
fn syntax_errors_do_not_resolve() {
    let err = Address::parse_with("localhost:", &Offline).unwrap_err();
    assert!(err.is_invalid_format());
}

#[test]
fn resolution_failure_propagates() {
    let err = Address::parse_with("127.0.1.1:80", &Offline).unwrap_err();
    assert!(matches!(err, AddressError::Resolution(ResolveError::Io(_))));
    assert!(!err.is_invalid_format());

    let addr = Address::parse_with("node-1:80", &Offline).unwrap();
    assert_eq!(addr.host(), "node-1");
}

#[test]
fn text_form_round_trips() {
    let samples = [
        Address::unresolved("10.0.0.5", 8080),
        Address::unresolved("node:with:colons", 1),
        Address::unresolved("fe80::1", 7946),
        Address::with_resolver("localhost", 4801, &resolver()).unwrap(),
        NULL_ADDRESS,
    ];
    for addr in samples {
        let back = Address::parse_with(&addr.to_string(), &Offline).unwrap();
        assert_eq!(back, addr);
    }
}

#[test]
fn null_address_text() {
    assert_eq!(NULL_ADDRESS.to_string(), "nullhost:0");
    assert_eq!(NULL_ADDRESS.host(), "nullhost");
    assert_eq!(NULL_ADDRESS.port(), 0);
}

#[test]
fn host_port_then_resolve() {
    let pair = HostPort::parse("127.0.0.1:9000").unwrap();
    assert_eq!(pair.host, "127.0.0.1");

    let unresolved = Address::from(pair.clone());
    assert_eq!(unresolved.host(), "127.0.0.1");

    let resolved = pair.resolve(&resolver()).unwrap();
    assert_eq!(resolved.to_string(), "172.16.4.9:9000");
}

#[test]
fn bound_loopback_socket_is_normalized() {
    let local: std::net::SocketAddr = "127.0.0.1:4801".parse().unwrap();
    let addr = Address::from_socket_addr(local, &resolver()).unwrap();
    assert!(!is_loopback_alias(addr.host()));
    assert_eq!(addr.to_string(), "172.16.4.9:4801");

    assert!(matches!(
        Address::from_socket_addr(local, &Offline),
        Err(AddressError::Resolution(_))
    ));
}
