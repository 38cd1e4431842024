//! Web server command.

use console::style;

use crate::config::Config;

/// Start the web server.
pub async fn cmd_serve(config: &Config, bind: &str) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(bind);

    println!(
        "{} Starting listcrawl server at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(config, &host, port).await
}

const DEFAULT_PORT: u16 = 9003;

/// Parse a bind address that can be:
/// - Just a port: "9003" -> 0.0.0.0:9003
/// - Just a host: "127.0.0.1" -> 127.0.0.1:9003
/// - Host and port: "127.0.0.1:8080"
fn parse_bind_address(bind: &str) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("0.0.0.0".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(parse_bind_address("8080"), ("0.0.0.0".to_string(), 8080));
        assert_eq!(
            parse_bind_address("127.0.0.1:9100"),
            ("127.0.0.1".to_string(), 9100)
        );
        assert_eq!(
            parse_bind_address("localhost"),
            ("localhost".to_string(), 9003)
        );
    }
}
