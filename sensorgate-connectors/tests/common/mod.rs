//! Shared fixtures for sensorgate-connectors integration tests
//!
//! Provides:
//! - A one-shot-per-response HTTP registry on a loopback port
//! - Catalog documents in both accepted shapes

#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpListener;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

/// Two source types as a bare array
pub const SOURCE_TYPES: &str = r#"[
  {
    "id": "weather_station",
    "name": "Weather station",
    "channels": [
      { "id": "temperature", "frequency_hz": 1.0, "unit": "celsius" },
      { "id": "wind_speed",  "frequency_hz": 4.0, "unit": "m/s" }
    ]
  },
  {
    "id": "air_quality",
    "name": "Air quality monitor",
    "channels": [
      { "id": "pm2_5", "frequency_hz": 0.2, "unit": "ug/m3" }
    ]
  }
]"#;

/// Sources wrapped in a paging envelope
pub const SOURCES: &str = r#"{
  "total": 2,
  "items": [
    { "id": "ws-roof", "name": "Roof", "source_type_id": "weather_station" },
    { "id": "aq-yard", "name": "Yard", "source_type_id": "air_quality" }
  ]
}"#;

/// Loopback registry answering each connection with the next scripted response
pub struct ScriptedRegistry {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
    handle: Option<JoinHandle<()>>,
}

impl ScriptedRegistry {
    /// Serve `responses` in order, one connection each, then stop listening
    pub fn start(responses: Vec<(u16, String)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = Arc::clone(&requests);
        let handle = std::thread::spawn(move || {
            for (status, body) in responses {
                let (mut stream, _) = match listener.accept() {
                    Ok(conn) => conn,
                    Err(_) => return,
                };
                seen.lock().unwrap().push(read_head(&mut stream));

                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });

        Self {
            base_url,
            requests,
            handle: Some(handle),
        }
    }

    /// Request heads received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait until every scripted response was served
    pub fn finish(mut self) -> Vec<String> {
        if let Some(handle) = self.handle.take() {
            handle.join().unwrap();
        }
        self.requests()
    }
}

fn read_head(stream: &mut impl Read) -> String {
    let mut head = Vec::new();
    let mut byte = [0u8; 1];
    while !head.ends_with(b"\r\n\r\n") {
        match stream.read(&mut byte) {
            Ok(1) => head.push(byte[0]),
            _ => break,
        }
    }
    String::from_utf8_lossy(&head).into_owned()
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}
