use std::io;

use thiserror::Error;

use crate::model::config::HttpConfig;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{url} answered with HTTP {code}")]
    Status { url: String, code: u16 },

    #[error("{url}: {message}")]
    Transport { url: String, message: String },

    #[error("{url}: unreadable body: {source}")]
    Body {
        url: String,
        #[source]
        source: io::Error,
    },
}

/// Read-only text retrieval. One attempt per call, no retries.
pub trait Fetch {
    fn get_text(&self, url: &str) -> Result<String, FetchError>;
}

/// Blocking HTTP client with bounded connect/read timeouts.
pub struct HttpFetcher {
    agent: ureq::Agent,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(config.connect_timeout())
            .timeout_read(config.read_timeout())
            .user_agent(&config.user_agent)
            .build();
        Self { agent }
    }
}

impl Fetch for HttpFetcher {
    fn get_text(&self, url: &str) -> Result<String, FetchError> {
        tracing::debug!("GET {url}");

        let response = self.agent.get(url).call().map_err(|err| match err {
            ureq::Error::Status(code, _) => FetchError::Status {
                url: url.to_string(),
                code,
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: url.to_string(),
                message: transport_message(&transport),
            },
        })?;

        response.into_string().map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }
}

/// ureq's own `Display` repeats the URL, so only the kind and cause are kept.
fn transport_message(transport: &ureq::Transport) -> String {
    let mut message = transport.kind().to_string();
    if let Some(detail) = transport.message() {
        message.push_str(": ");
        message.push_str(detail);
    }
    if let Some(cause) = std::error::Error::source(transport) {
        message.push_str(&format!(": {cause}"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::thread;
    use std::time::{Duration, Instant};

    fn fetcher() -> HttpFetcher {
        HttpFetcher::new(&HttpConfig {
            connect_timeout_secs: 1,
            read_timeout_secs: 1,
            user_agent: "winstrap-test".to_string(),
        })
    }

    fn read_request(stream: &mut TcpStream) {
        let mut request = Vec::new();
        let mut chunk = [0u8; 512];
        while !request.windows(4).any(|window| window == b"\r\n\r\n") {
            match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => request.extend_from_slice(&chunk[..n]),
            }
        }
    }

    /// Serve one connection: answer with `reply`, or hold it open silently.
    fn serve_once(reply: Option<&'static str>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        thread::spawn(move || {
            let Ok((mut stream, _)) = listener.accept() else {
                return;
            };
            read_request(&mut stream);
            match reply {
                Some(reply) => {
                    let _ = stream.write_all(reply.as_bytes());
                }
                None => thread::sleep(Duration::from_secs(5)),
            }
        });
        format!("http://{addr}/releases")
    }

    #[test]
    fn body_is_returned_on_success() {
        let url = serve_once(Some(
            "HTTP/1.1 200 OK\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]",
        ));

        assert_eq!(fetcher().get_text(&url).unwrap(), "[]");
    }

    #[test]
    fn not_found_is_a_status_error() {
        let url = serve_once(Some(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
        ));

        let err = fetcher().get_text(&url).unwrap_err();

        assert!(matches!(err, FetchError::Status { code: 404, .. }));
        assert_eq!(err.to_string(), format!("{url} answered with HTTP 404"));
    }

    #[test]
    fn stalled_peer_times_out_as_transport_error() {
        let url = serve_once(None);
        let started = Instant::now();

        let err = fetcher().get_text(&url).unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn refused_connection_names_the_url_once() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/releases", listener.local_addr().unwrap());
        drop(listener);

        let err = fetcher().get_text(&url).unwrap_err();

        assert!(matches!(err, FetchError::Transport { .. }));
        assert_eq!(err.to_string().matches(url.as_str()).count(), 1);
    }
}
