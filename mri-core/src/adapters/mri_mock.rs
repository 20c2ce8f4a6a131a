//! Mock MRI API server for testing
//!
//! Serves the `api.asp` endpoint the extraction reads, routed on the `$api`
//! query parameter:
//! - bank list, property list and unit list are paged with `$skiptoken`,
//!   each page pointing at the next through a percent-encoded `nextLink`
//! - the bank account mapping answers per `EntityId`
//!
//! Requests without the expected `Authorization` header get a 401 with a
//! structured error body. An endpoint can be told to fail its first N
//! requests with a 503.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use serde_json::{json, Value as JsonValue};
use url::Url;

pub const API_PATH: &str = "/MRIAPIServices/api.asp";

/// Data and behavior of the mock server
#[derive(Debug, Clone, Default)]
pub struct MockMriConfig {
    /// `$api` name -> pages, for unscoped paged endpoints
    pub paged: HashMap<String, Vec<Vec<JsonValue>>>,
    /// `$api` name -> scoping param name, for endpoints paged per scope value
    pub scope_params: HashMap<String, String>,
    /// (`$api` name, scope value) -> pages
    pub scoped: HashMap<(String, String), Vec<Vec<JsonValue>>>,
    /// Exact `Authorization` value required; any value passes when unset
    pub expected_auth: Option<String>,
    /// `$api` name -> number of leading requests answered with 503
    pub fail_first: HashMap<String, usize>,
}

impl MockMriConfig {
    pub fn pages(mut self, api: &str, pages: Vec<Vec<JsonValue>>) -> Self {
        self.paged.insert(api.to_string(), pages);
        self
    }

    pub fn scoped_pages(
        mut self,
        api: &str,
        param: &str,
        value: &str,
        pages: Vec<Vec<JsonValue>>,
    ) -> Self {
        self.scope_params.insert(api.to_string(), param.to_string());
        self.scoped.insert((api.to_string(), value.to_string()), pages);
        self
    }

    pub fn expect_auth(mut self, value: impl Into<String>) -> Self {
        self.expected_auth = Some(value.into());
        self
    }

    pub fn fail_first(mut self, api: &str, times: usize) -> Self {
        self.fail_first.insert(api.to_string(), times);
        self
    }
}

/// A request received by the mock, query decoded
#[derive(Debug, Clone)]
pub struct MockRequest {
    pub api: String,
    pub query: Vec<(String, String)>,
    pub authorization: Option<String>,
}

impl MockRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Shared {
    config: MockMriConfig,
    base_url: String,
    failures: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<MockRequest>>,
}

/// Mock MRI server for testing
pub struct MockMriServer {
    port: u16,
    running: Arc<AtomicBool>,
    shared: Arc<Shared>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockMriServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockMriConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let shared = Arc::new(Shared {
            failures: Mutex::new(config.fail_first.clone()),
            config,
            base_url: format!("http://127.0.0.1:{}", port),
            requests: Mutex::new(Vec::new()),
        });
        let shared_clone = shared.clone();

        // Non-blocking so the loop can observe shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let shared = shared_clone.clone();
                        thread::spawn(move || handle_connection(stream, &shared));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            shared,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn base_url(&self) -> String {
        self.shared.base_url.clone()
    }

    /// Requests received so far, in arrival order
    pub fn requests(&self) -> Vec<MockRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    pub fn requests_to(&self, api: &str) -> Vec<MockRequest> {
        self.requests().into_iter().filter(|r| r.api == api).collect()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockMriServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_request(stream: &mut TcpStream) -> Option<String> {
    let _ = stream.set_nonblocking(false);
    let mut data = Vec::new();
    let mut buffer = [0; 4096];
    loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
        if data.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    Some(String::from_utf8_lossy(&data).into_owned())
}

fn handle_connection(mut stream: TcpStream, shared: &Shared) {
    let Some(raw) = read_request(&mut stream) else {
        return;
    };

    let target = raw
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("");
    let Ok(url) = Url::parse(&format!("{}{}", shared.base_url, target)) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
        return;
    };

    let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    let authorization = raw.lines().find_map(|line| {
        let (name, value) = line.split_once(':')?;
        name.trim()
            .eq_ignore_ascii_case("authorization")
            .then(|| value.trim().to_string())
    });
    let request = MockRequest {
        api: query
            .iter()
            .find(|(k, _)| k == "$api")
            .map(|(_, v)| v.clone())
            .unwrap_or_default(),
        query,
        authorization,
    };
    shared.requests.lock().unwrap().push(request.clone());

    if url.path() != API_PATH {
        send_response(&mut stream, 404, "Not Found", r#"{"error": "Endpoint not found"}"#);
        return;
    }

    if let Some(expected) = &shared.config.expected_auth {
        if request.authorization.as_deref() != Some(expected.as_str()) {
            send_response(
                &mut stream,
                401,
                "Unauthorized",
                r#"{"error": {"code": "Unauthorized", "message": "Invalid credentials"}}"#,
            );
            return;
        }
    }

    {
        let mut failures = shared.failures.lock().unwrap();
        if let Some(remaining) = failures.get_mut(&request.api) {
            if *remaining > 0 {
                *remaining -= 1;
                drop(failures);
                send_response(
                    &mut stream,
                    503,
                    "Service Unavailable",
                    r#"{"error": {"code": "ServerBusy", "message": "Try again later"}}"#,
                );
                return;
            }
        }
    }

    let body = page_body(shared, &request);
    send_response(&mut stream, 200, "OK", &body.to_string());
}

/// `{"value": [...], "nextLink": ...}` for the requested page
fn page_body(shared: &Shared, request: &MockRequest) -> JsonValue {
    let config = &shared.config;
    let (pages, scope) = match config.scope_params.get(&request.api) {
        Some(param) => {
            let value = request.param(param).unwrap_or_default().to_string();
            let pages = config.scoped.get(&(request.api.clone(), value.clone()));
            (pages, Some((param.clone(), value)))
        }
        None => (config.paged.get(&request.api), None),
    };

    let index: usize = request
        .param("$skiptoken")
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);
    let Some(pages) = pages else {
        return json!({"value": [], "nextLink": null});
    };
    let value = pages.get(index).cloned().unwrap_or_default();

    let next_link = if index + 1 < pages.len() {
        let scope = scope
            .map(|(name, value)| format!("&{}={}", name, value))
            .unwrap_or_default();
        JsonValue::String(format!(
            "{}{}?%24api={}&%24format=json&%24skiptoken={}{}",
            shared.base_url,
            API_PATH,
            request.api,
            index + 1,
            scope
        ))
    } else {
        JsonValue::Null
    };

    json!({"value": value, "nextLink": next_link})
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::rest::RestClient;
    use crate::config::Config;
    use crate::domain::result::Error;
    use crate::domain::CallErrorKind;
    use crate::services::extraction::ExtractionService;
    use crate::services::logging::MemorySink;
    use std::time::Duration;

    const BANK: &str = "MRI_S-PMAP_Bank";
    const PROPERTY: &str = "MRI_S-PMRM_PropertyIDByNameOrAddress";
    const BANK_ACCOUNT: &str = "MRI_S-PMAP_BankAccountMapping";
    const UNIT: &str = "MRI_S-PMRM_UnitVacancyInformation";

    fn config_with_base(base_url: String) -> Config {
        let mut config = Config {
            base_url,
            timeout_secs: Some(5),
            ..Default::default()
        };
        config.credentials.client_id = "C1".to_string();
        config.credentials.database_name = "DB".to_string();
        config.credentials.api_username = "svc".to_string();
        config.credentials.developer_key = "dev".to_string();
        config.credentials.password = "pw".to_string();
        config
    }

    fn config_for(server: &MockMriServer) -> Config {
        config_with_base(server.base_url())
    }

    fn expected_auth() -> String {
        let config = config_with_base(String::new());
        config.credentials.auth_header().as_str().to_string()
    }

    fn service_for(config: &Config) -> (ExtractionService, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let client =
            RestClient::with_timeout(Some(Duration::from_secs(5)), sink.clone()).unwrap();
        (
            ExtractionService::new(config, Arc::new(client), sink.clone()),
            sink,
        )
    }

    fn acme() -> MockMriConfig {
        MockMriConfig::default()
            .pages(BANK, vec![vec![json!({"BankID": 1, "BankName": "Acme"})]])
            .pages(
                PROPERTY,
                vec![vec![json!({"EntityId": 10, "PropertyID": "P1", "PropertyName": "Tower"})]],
            )
            .scoped_pages(BANK_ACCOUNT, "EntityId", "10", vec![vec![json!({"BankID": 1})]])
            .scoped_pages(
                UNIT,
                "PROPERTYID",
                "P1",
                vec![vec![json!({"UnitID": "U1"})], vec![json!({"UnitID": "U2"})]],
            )
            .expect_auth(expected_auth())
    }

    #[test]
    fn test_full_extraction_against_mock() {
        let server = MockMriServer::start(acme()).unwrap();
        let config = config_for(&server);
        let (service, _) = service_for(&config);

        let extraction = service.run().unwrap();

        assert_eq!(extraction.banks.get("1"), Some("Acme"));
        assert_eq!(extraction.properties.len(), 1);
        assert_eq!(extraction.properties[0].bank, vec!["Acme".to_string()]);
        let units: Vec<&str> = extraction
            .units
            .iter()
            .map(|u| u["UnitID"].as_str().unwrap())
            .collect();
        assert_eq!(units, vec!["U1", "U2"]);
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_requests_carry_query_and_auth() {
        let server = MockMriServer::start(acme()).unwrap();
        let config = config_for(&server);
        let (service, _) = service_for(&config);

        service.run().unwrap();

        for request in server.requests() {
            assert_eq!(request.param("$format"), Some("json"));
            assert_eq!(request.authorization.as_deref(), Some(expected_auth().as_str()));
        }
        let property = &server.requests_to(PROPERTY)[0];
        assert_eq!(property.param("$top"), Some("100"));
        let association = &server.requests_to(BANK_ACCOUNT)[0];
        assert_eq!(association.param("EntityId"), Some("10"));
    }

    #[test]
    fn test_follows_encoded_cursor() {
        let banks = (1..=5)
            .map(|i| vec![json!({"BankID": i, "BankName": format!("Bank {}", i)})])
            .collect();
        let server = MockMriServer::start(MockMriConfig::default().pages(BANK, banks)).unwrap();
        let config = config_for(&server);
        let (service, _) = service_for(&config);

        let fetched = service.fetch_bank_map().unwrap();

        assert_eq!(fetched.banks.len(), 5);
        let tokens: Vec<Option<String>> = server
            .requests_to(BANK)
            .iter()
            .map(|r| r.param("$skiptoken").map(str::to_string))
            .collect();
        assert_eq!(
            tokens,
            vec![
                None,
                Some("1".to_string()),
                Some("2".to_string()),
                Some("3".to_string()),
                Some("4".to_string())
            ]
        );
    }

    #[test]
    fn test_cursor_keeps_property_scope() {
        let server = MockMriServer::start(acme()).unwrap();
        let config = config_for(&server);
        let (service, _) = service_for(&config);

        let fetched = service.fetch_units(&["P1".to_string()]);

        assert_eq!(fetched.units.len(), 2);
        let requests = server.requests_to(UNIT);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].param("PROPERTYID"), Some("P1"));
        assert_eq!(requests[1].param("$skiptoken"), Some("1"));
    }

    #[test]
    fn test_wrong_credentials_abort_with_server_error() {
        let server = MockMriServer::start(acme().expect_auth("Basic bm9wZQ==")).unwrap();
        let config = Config {
            max_retries: 1,
            ..config_for(&server)
        };
        let (service, sink) = service_for(&config);

        let err = service.run().unwrap_err();

        match &err {
            Error::Pagination {
                endpoint,
                attempts,
                source,
            } => {
                assert_eq!(endpoint, BANK);
                assert_eq!(*attempts, 2);
                assert_eq!(source.kind(), CallErrorKind::Server);
                assert_eq!(source.status(), Some(401));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err
            .to_string()
            .contains(r#"{"message": "Unauthorized", "detail": "Invalid credentials"}"#));
        assert_eq!(sink.named("page_failed").len(), 2);
        assert!(server.requests_to(PROPERTY).is_empty());
    }

    #[test]
    fn test_transient_failures_are_retried() {
        let server = MockMriServer::start(acme().fail_first(BANK, 2)).unwrap();
        let config = config_for(&server);
        let (service, sink) = service_for(&config);

        let extraction = service.run().unwrap();

        assert_eq!(extraction.banks.len(), 1);
        assert_eq!(server.requests_to(BANK).len(), 3);
        let failed = sink.named("page_failed");
        assert_eq!(failed.len(), 2);
        assert_eq!(failed[0].event.status, Some(503));
    }

    #[test]
    fn test_failing_unit_endpoint_becomes_warning() {
        let server = MockMriServer::start(acme().fail_first(UNIT, 10)).unwrap();
        let config = Config {
            max_retries: 0,
            ..config_for(&server)
        };
        let (service, _) = service_for(&config);

        let extraction = service.run().unwrap();

        assert_eq!(extraction.properties.len(), 1);
        assert!(extraction.units.is_empty());
        assert_eq!(extraction.warnings.len(), 1);
        assert!(extraction.warnings[0].contains("P1"));
    }
}
