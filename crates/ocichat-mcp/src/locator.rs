//! Tool-server locator parsing and transport selection.

use crate::error::McpError;

/// Where the tool server lives and how to reach it.
///
/// A closed set: either a streamable-HTTP endpoint or a local script run
/// over stdio. Parsing never spawns a process or opens a socket; it only
/// decides which transport `Transport::connect` will build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerLocator {
    /// Network endpoint speaking streamable HTTP.
    Url(String),
    /// Local script spawned as a child process over stdio.
    Stdio { command: String, args: Vec<String> },
}

impl ServerLocator {
    /// Parse a locator string: an `http(s)://` URL, a `.py` script, or a
    /// `.js` script. Anything else is rejected.
    pub fn parse(locator: &str) -> Result<Self, McpError> {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            return Ok(Self::Url(locator.to_string()));
        }
        if locator.ends_with(".py") {
            return Ok(Self::Stdio {
                command: python_launcher().to_string(),
                args: vec![locator.to_string()],
            });
        }
        if locator.ends_with(".js") {
            return Ok(Self::Stdio {
                command: "node".to_string(),
                args: vec![locator.to_string()],
            });
        }
        Err(McpError::InvalidLocator {
            locator: locator.to_string(),
        })
    }

    /// Human-readable form for logs and error messages.
    pub fn display(&self) -> String {
        match self {
            Self::Url(url) => url.clone(),
            Self::Stdio { command, args } => format!("{command} {}", args.join(" ")),
        }
    }
}

/// The launcher for `.py` servers. Plain `python` resolves on Windows;
/// elsewhere the version-pinned launcher matches the deployed interpreter.
fn python_launcher() -> &'static str {
    if cfg!(windows) { "python" } else { "python3.12" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_http_and_https_urls() {
        assert_eq!(
            ServerLocator::parse("http://localhost:8000/mcp").unwrap(),
            ServerLocator::Url("http://localhost:8000/mcp".to_string())
        );
        assert!(matches!(
            ServerLocator::parse("https://tools.example.com/mcp").unwrap(),
            ServerLocator::Url(_)
        ));
    }

    #[test]
    fn parses_python_script() {
        let locator = ServerLocator::parse("servers/weather.py").unwrap();
        match locator {
            ServerLocator::Stdio { command, args } => {
                assert_eq!(command, python_launcher());
                assert_eq!(args, vec!["servers/weather.py"]);
            }
            other => panic!("expected stdio locator, got {other:?}"),
        }
    }

    #[test]
    fn parses_node_script() {
        let locator = ServerLocator::parse("build/index.js").unwrap();
        match locator {
            ServerLocator::Stdio { command, args } => {
                assert_eq!(command, "node");
                assert_eq!(args, vec!["build/index.js"]);
            }
            other => panic!("expected stdio locator, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unrecognized_locators() {
        for bad in ["server.txt", "server", "ftp://host/mcp", "weather.py.bak"] {
            match ServerLocator::parse(bad) {
                Err(McpError::InvalidLocator { locator }) => assert_eq!(locator, bad),
                other => panic!("expected InvalidLocator for {bad}, got {other:?}"),
            }
        }
    }
}
