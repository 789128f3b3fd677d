//! One-shot HTTP responder for client tests.
//!
//! Serves the queued responses in order, one per connection, and records each request it saw.

use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
pub struct MockResponse {
	pub status: u16,
	pub body: String,
}

impl MockResponse {
	pub fn json(status: u16, body: serde_json::Value) -> Self {
		Self {
			status,
			body: body.to_string(),
		}
	}

	pub fn text(status: u16, body: &str) -> Self {
		Self {
			status,
			body: body.to_string(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
	pub method: String,
	/// Path and query exactly as sent.
	pub target: String,
	pub headers: Vec<(String, String)>,
	pub body: String,
}

impl RecordedRequest {
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers
			.iter()
			.find(|(k, _)| k.eq_ignore_ascii_case(name))
			.map(|(_, v)| v.as_str())
	}
}

pub struct MockServer {
	base_url: String,
	requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockServer {
	pub async fn start(responses: Vec<MockResponse>) -> Self {
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let addr = listener.local_addr().unwrap();
		let requests = Arc::new(Mutex::new(Vec::new()));

		let recorded = requests.clone();
		tokio::spawn(async move {
			for response in responses {
				let Ok((stream, _)) = listener.accept().await else {
					return;
				};
				handle(stream, response, &recorded).await;
			}
		});

		Self {
			base_url: format!("http://{}", addr),
			requests,
		}
	}

	pub fn url(&self) -> &str {
		&self.base_url
	}

	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.lock().unwrap().clone()
	}
}

/// Address nothing listens on.
pub async fn closed_port_url() -> String {
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	drop(listener);
	format!("http://{}", addr)
}

async fn handle(
	mut stream: TcpStream,
	response: MockResponse,
	recorded: &Arc<Mutex<Vec<RecordedRequest>>>,
) {
	let mut buf = Vec::new();
	let mut chunk = [0u8; 4096];
	let header_end = loop {
		let n = stream.read(&mut chunk).await.unwrap();
		if n == 0 {
			return;
		}
		buf.extend_from_slice(&chunk[..n]);
		if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
			break pos + 4;
		}
	};

	let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
	let mut lines = head.split("\r\n");
	let request_line = lines.next().unwrap_or_default();
	let mut parts = request_line.split_whitespace();
	let method = parts.next().unwrap_or_default().to_string();
	let target = parts.next().unwrap_or_default().to_string();
	let headers: Vec<(String, String)> = lines
		.filter_map(|line| line.split_once(':'))
		.map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
		.collect();

	let content_length = headers
		.iter()
		.find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
		.and_then(|(_, v)| v.parse::<usize>().ok())
		.unwrap_or(0);
	while buf.len() < header_end + content_length {
		let n = stream.read(&mut chunk).await.unwrap();
		if n == 0 {
			break;
		}
		buf.extend_from_slice(&chunk[..n]);
	}
	let body = String::from_utf8_lossy(&buf[header_end..]).to_string();

	recorded.lock().unwrap().push(RecordedRequest {
		method,
		target,
		headers,
		body,
	});

	let reply = format!(
		"HTTP/1.1 {} Mock\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
		response.status,
		response.body.len(),
		response.body
	);
	stream.write_all(reply.as_bytes()).await.unwrap();
	stream.shutdown().await.ok();
}
