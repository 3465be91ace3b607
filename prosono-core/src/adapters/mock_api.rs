//! Mock ProSono backend for testing
//!
//! A small HTTP server that simulates the ProSono API so session and survey
//! flows can be exercised end-to-end without a real deployment. It implements
//! the same response shapes as the real backend:
//!
//! - POST /auth/login returns { accessToken, tokenType }
//! - POST /auth/refresh returns { token, refreshToken }
//! - GET /user returns the full user record
//! - the three evaluation endpoints return { id }
//! - /daily-surveys returns the stored record or 404
//!
//! Failure switches in `MockConfig` simulate per-endpoint outages, and every
//! received request is recorded for payload assertions.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use serde_json::{json, Value as JsonValue};

/// Mock ProSono server for testing
pub struct MockProsonoServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

/// One request as received by the mock server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: JsonValue,
}

/// Configuration for mock behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// POST /auth/login returns 401
    pub fail_login: bool,
    /// GET /user returns 500
    pub fail_user_fetch: bool,
    /// POST /my-sleep-surveys returns 500
    pub fail_attitude: bool,
    /// POST /cleveland-surveys returns 500
    pub fail_frequency: bool,
    /// POST /surveys returns 500
    pub fail_knowledge: bool,
    /// POST /auth/refresh returns 401
    pub fail_refresh: bool,
    /// POST /auth/register returns 409
    pub duplicate_registration: bool,
    /// GET /daily-surveys returns 404
    pub no_daily_survey: bool,
    /// Offset applied to the exp claim of issued tokens
    /// (negative = issue already-expired tokens)
    pub token_exp_offset_secs: i64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            fail_login: false,
            fail_user_fetch: false,
            fail_attitude: false,
            fail_frequency: false,
            fail_knowledge: false,
            fail_refresh: false,
            duplicate_registration: false,
            no_daily_survey: true,
            token_exp_offset_secs: 3600,
        }
    }
}

/// Build an unsigned JWT-shaped token whose exp claim is `offset_secs` from now
pub fn issue_token(offset_secs: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let exp = Utc::now().timestamp() + offset_secs;
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"sub":"user-1","exp":{exp}}}"#));
    format!("{header}.{payload}.mock-signature")
}

/// The full user record the mock's GET /user returns
pub fn sample_user() -> JsonValue {
    json!({
        "id": "user-1",
        "email": "ana@example.com",
        "firstName": "Ana",
        "lastName": "Silva",
        "birthDate": "2009-06-01",
        "gender": "F",
        "school": "Escola Secundária",
        "schoolYear": 10,
        "status": "sleep_tracking",
        "evaluationSurveys": [],
        "dailySurveys": {
            "target": 14,
            "dates": [],
            "streak": 0,
            "meanSleepDuration": {"last7Days": null, "last15Days": null, "last30Days": null},
            "meanWakeTime": {"last7Days": null, "last15Days": null, "last30Days": null},
            "meanBedtime": {"last7Days": null, "last15Days": null, "last30Days": null},
            "meanTimeToSleep": {"last7Days": null, "last15Days": null, "last30Days": null},
            "meanNightAwakenings": {"last7Days": null, "last15Days": null, "last30Days": null},
            "meanSleepQuality": {"last7Days": null, "last15Days": null, "last30Days": null}
        },
        "createdAt": "2024-11-01T10:00:00Z",
        "updatedAt": "2024-12-27T08:30:00Z"
    })
}

impl MockProsonoServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let requests: Arc<Mutex<Vec<RecordedRequest>>> = Arc::new(Mutex::new(Vec::new()));
        let requests_clone = requests.clone();

        // Non-blocking accept loop so stop() can shut the thread down
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let reqs = requests_clone.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg, &reqs);
                        });
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
            thread_handle: Some(thread_handle),
            requests,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Base URL for pointing an `ApiClient` at this server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Everything received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Requests for one method + path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockProsonoServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(
    mut stream: TcpStream,
    config: &MockConfig,
    requests: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
    let Some((method, path, headers, body)) = read_request(&mut stream) else {
        send_response(&mut stream, 400, "Bad Request", r#"{"message":"bad request"}"#);
        return;
    };

    let body_json: JsonValue = serde_json::from_str(&body).unwrap_or(JsonValue::Null);
    requests
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            body: body_json.clone(),
        });

    let has_bearer = headers.to_lowercase().contains("authorization: bearer ");

    match (method.as_str(), path.as_str()) {
        ("POST", "/auth/login") => {
            if config.fail_login {
                send_json(&mut stream, 401, &json!({"message": "Invalid credentials"}));
            } else {
                let token = issue_token(config.token_exp_offset_secs);
                send_json(
                    &mut stream,
                    200,
                    &json!({"accessToken": token, "tokenType": "bearer"}),
                );
            }
        }
        ("POST", "/auth/register") => {
            if config.duplicate_registration {
                send_json(
                    &mut stream,
                    409,
                    &json!({"message": "Email already registered"}),
                );
            } else {
                send_json(&mut stream, 200, &json!({}));
            }
        }
        ("POST", "/auth/refresh") => {
            if config.fail_refresh {
                send_json(
                    &mut stream,
                    401,
                    &json!({"message": "Invalid refresh token"}),
                );
            } else {
                let token = issue_token(3600);
                send_json(
                    &mut stream,
                    200,
                    &json!({"token": token, "refreshToken": "rotated-refresh-token"}),
                );
            }
        }
        ("POST", "/auth/logout") => {
            send_json(&mut stream, 200, &json!({}));
        }
        ("GET", "/user") => {
            if !has_bearer {
                send_json(&mut stream, 401, &json!({"message": "Not authenticated"}));
            } else if config.fail_user_fetch {
                send_json(&mut stream, 500, &json!({"message": "Internal server error"}));
            } else {
                send_json(&mut stream, 200, &sample_user());
            }
        }
        ("PUT", "/user") => {
            if !has_bearer {
                send_json(&mut stream, 401, &json!({"message": "Not authenticated"}));
            } else {
                // Overlay the submitted fields on the canonical record
                let mut user = sample_user();
                if let (Some(user_obj), Some(update)) =
                    (user.as_object_mut(), body_json.as_object())
                {
                    for (key, value) in update {
                        user_obj.insert(key.clone(), value.clone());
                    }
                }
                send_json(&mut stream, 200, &user);
            }
        }
        ("POST", "/my-sleep-surveys") => {
            if config.fail_attitude {
                send_json(&mut stream, 500, &json!({"message": "Internal server error"}));
            } else {
                send_json(&mut stream, 200, &json!({"id": 101}));
            }
        }
        ("POST", "/cleveland-surveys") => {
            if config.fail_frequency {
                send_json(&mut stream, 500, &json!({"message": "Internal server error"}));
            } else {
                send_json(&mut stream, 200, &json!({"id": 202}));
            }
        }
        ("POST", "/surveys") => {
            if config.fail_knowledge {
                send_json(&mut stream, 500, &json!({"message": "Internal server error"}));
            } else {
                send_json(&mut stream, 200, &json!({"id": 303}));
            }
        }
        ("POST", "/daily-surveys") => {
            send_json(
                &mut stream,
                200,
                &json!({
                    "id": "daily-1",
                    "createdAt": "2024-12-26T08:00:00Z",
                    "updatedAt": "2024-12-26T08:00:00Z"
                }),
            );
        }
        ("GET", "/daily-surveys") => {
            if config.no_daily_survey {
                send_json(&mut stream, 404, &json!({"message": "No daily survey found"}));
            } else {
                send_json(
                    &mut stream,
                    200,
                    &json!({
                        "id": 1,
                        "horaLevantasteHoje": "07:30",
                        "horaDeitasteOntem": "23:00",
                        "tempoAteAdormecer": 15,
                        "vezesAcordasteNoite": 1,
                        "horasQueDormiste": 480,
                        "qualidadeSonoNoite": 4,
                        "surveyDate": "2024-12-26"
                    }),
                );
            }
        }
        _ => {
            send_json(&mut stream, 404, &json!({"message": "Endpoint not found"}));
        }
    }
}

/// Read one HTTP/1.1 request: request line, headers, then Content-Length bytes
fn read_request(stream: &mut TcpStream) -> Option<(String, String, String, String)> {
    let mut raw = Vec::new();
    let mut buffer = [0u8; 1024];

    // Read until the end of the headers
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        raw.extend_from_slice(&buffer[..n]);
        if let Some(pos) = find_header_end(&raw) {
            break pos;
        }
        if raw.len() > 64 * 1024 {
            return None;
        }
    };

    let head = String::from_utf8_lossy(&raw[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next()?;
    let mut parts = request_line.split_whitespace();
    let method = parts.next()?.to_string();
    let path = parts.next()?.split('?').next()?.to_string();

    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    // Read the remainder of the body
    let mut body_bytes = raw[header_end + 4..].to_vec();
    while body_bytes.len() < content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        body_bytes.extend_from_slice(&buffer[..n]);
    }

    let body = String::from_utf8_lossy(&body_bytes[..content_length.min(body_bytes.len())])
        .to_string();
    Some((method, path, head, body))
}

fn find_header_end(raw: &[u8]) -> Option<usize> {
    raw.windows(4).position(|w| w == b"\r\n\r\n")
}

fn send_json(stream: &mut TcpStream, status: u16, body: &JsonValue) {
    let text = body.to_string();
    let status_text = match status {
        200 => "OK",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        _ => "Error",
    };
    send_response(stream, status, status_text, &text);
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
