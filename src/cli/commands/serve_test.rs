// `run()` blocks until Ctrl-C; the router it serves is covered in src/api.

use std::net::IpAddr;
use std::path::Path;

use crate::api::ServerConfig;
use crate::cli::commands::serve::banner;

#[test]
fn test_banner_lists_endpoints_and_database() {
    let config = ServerConfig {
        host: "0.0.0.0".parse::<IpAddr>().unwrap(),
        port: 8080,
        verbosity: 2,
    };

    let text = banner(&config, Path::new("/tmp/taskchat/taskchat.db"));
    assert!(text.contains("http://0.0.0.0:8080/mcp"));
    assert!(text.contains("http://0.0.0.0:8080/health"));
    assert!(text.contains("/tmp/taskchat/taskchat.db"));
}

#[test]
fn test_banner_with_ipv6_host() {
    let config = ServerConfig {
        host: "::1".parse::<IpAddr>().unwrap(),
        ..Default::default()
    };

    let text = banner(&config, Path::new("taskchat.db"));
    assert!(text.contains("http://[::1]:3838/mcp"));
}
