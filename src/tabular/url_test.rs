use crate::errors::UsageError;
use crate::tabular::{ConnectionUrl, DEFAULT_PORT, Driver};

#[test]
fn parses_host_and_port() {
    let url = ConnectionUrl::parse("scidb://db.example.com:5239").unwrap();
    assert_eq!(url.host, "db.example.com");
    assert_eq!(url.port, 5239);
}

#[test]
fn port_defaults_to_1239() {
    let url = ConnectionUrl::parse("scidb://localhost/").unwrap();
    assert_eq!(url.host, "localhost");
    assert_eq!(url.port, DEFAULT_PORT);
    assert_eq!(DEFAULT_PORT, 1239);
}

#[test]
fn accepts_jdbc_prefix_and_ipv6() {
    let url = ConnectionUrl::parse("jdbc:scidb://[::1]:1240").unwrap();
    assert_eq!(url.host, "::1");
    assert_eq!(url.port, 1240);
    assert!(Driver::accepts_url("jdbc:scidb://127.0.0.1"));
}

#[test]
fn rejects_malformed_urls() {
    for url in [
        "postgres://localhost",
        "scidb://",
        "scidb://host:port",
        "scidb://host:1239/db",
        "scidb://host:99999",
        "scidb://ho st",
    ] {
        assert!(
            matches!(ConnectionUrl::parse(url), Err(UsageError::InvalidUrl(_))),
            "{} should be rejected",
            url
        );
        if url != "scidb://host:99999" {
            assert!(!Driver::accepts_url(url));
        }
    }
}
