//! Stand-ins for the service under test
//!
//! Real HTTP servers (wiremock) that play the two nginx servers: one
//! answering `GET /` with a welcome page, one answering with an error.
//!
//! # Example
//!
//! ```no_run
//! use readyprobe_testkit::mock::MockSite;
//!
//! # async fn example() {
//! let site = MockSite::new().with_error(200, "not an error").start().await;
//! println!("success server on {}:{}", site.host(), site.success_port());
//! assert_eq!(site.error_requests().await, 0);
//! # }
//! ```

use std::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Text the success server is expected to serve
pub const WELCOME_TEXT: &str = "Welcome from Nginx on port 8080";

/// Page served by the success server by default
pub const WELCOME_PAGE: &str = "<!DOCTYPE html>\n<html>\n<head><title>Success</title></head>\n<body>\n<h1>Welcome from Nginx on port 8080</h1>\n</body>\n</html>\n";

/// Page served by the error server by default
pub const ERROR_PAGE: &str = "<html>\n<head><title>500 Internal Server Error</title></head>\n<body>\n<center><h1>500 Internal Server Error</h1></center>\n</body>\n</html>\n";

/// Canned answer for `GET /`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockResponse {
    pub status: u16,
    pub body: String,
}

impl MockResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    fn template(&self) -> ResponseTemplate {
        ResponseTemplate::new(self.status).set_body_string(self.body.clone())
    }
}

/// Builder for a success/error server pair
#[derive(Debug, Clone)]
pub struct MockSite {
    pub success: MockResponse,
    pub error: MockResponse,
}

impl Default for MockSite {
    fn default() -> Self {
        Self {
            success: MockResponse::new(200, WELCOME_PAGE),
            error: MockResponse::new(500, ERROR_PAGE),
        }
    }
}

impl MockSite {
    /// A site that behaves as expected: 200 + welcome page, 500
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_success(mut self, status: u16, body: impl Into<String>) -> Self {
        self.success = MockResponse::new(status, body);
        self
    }

    pub fn with_error(mut self, status: u16, body: impl Into<String>) -> Self {
        self.error = MockResponse::new(status, body);
        self
    }

    /// Start both servers on ephemeral ports
    pub async fn start(self) -> RunningSite {
        let success = serve(MockServer::start().await, &self.success).await;
        let error = serve(MockServer::start().await, &self.error).await;
        RunningSite { success, error }
    }
}

/// Serve `response` for `GET /` from a server bound to `port`
///
/// For simulating a service that comes up late.
pub async fn serve_on(port: u16, response: &MockResponse) -> MockServer {
    let listener =
        TcpListener::bind(("127.0.0.1", port)).expect("Failed to bind mock server port");
    let server = MockServer::builder().listener(listener).start().await;
    serve(server, response).await
}

async fn serve(server: MockServer, response: &MockResponse) -> MockServer {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(response.template())
        .mount(&server)
        .await;
    server
}

/// Both servers, running
pub struct RunningSite {
    pub success: MockServer,
    pub error: MockServer,
}

impl RunningSite {
    /// Host both servers listen on
    pub fn host(&self) -> String {
        self.success.address().ip().to_string()
    }

    pub fn success_port(&self) -> u16 {
        self.success.address().port()
    }

    pub fn error_port(&self) -> u16 {
        self.error.address().port()
    }

    /// Requests the success server has seen so far
    pub async fn success_requests(&self) -> usize {
        request_count(&self.success).await
    }

    /// Requests the error server has seen so far
    pub async fn error_requests(&self) -> usize {
        request_count(&self.error).await
    }
}

async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}

/// A localhost port nothing is listening on
///
/// Binds an ephemeral port and releases it; another process could grab it
/// in between, which is acceptable in tests.
pub fn unused_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind ephemeral port");
    listener
        .local_addr()
        .expect("Failed to read local address")
        .port()
}
