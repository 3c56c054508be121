//! SAPI client flows against a local HTTP server speaking just enough of the
//! protocol.
extern crate annealers;
extern crate annealers_dwave;
extern crate base64;
extern crate serde_json;

use annealers::prelude::*;
use annealers_dwave::encoder::{encode_qp, ProblemData};
use annealers_dwave::prelude::*;
use annealers_dwave::property::ProblemType;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

struct FakeSapi {
	endpoint: String,
	/// `(request line, body)` of every request, in arrival order.
	log: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeSapi {
	/// Serve every request with `handler(method, path, body) -> (status, json)`.
	async fn start<F>(handler: F) -> Self
	where
		F: Fn(&str, &str, &str) -> (u16, String) + Send + Sync + 'static,
	{
		let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
		let endpoint = format!("http://{}", listener.local_addr().unwrap());
		let log = Arc::new(Mutex::new(Vec::new()));
		let handler = Arc::new(handler);
		let requests = log.clone();
		tokio::spawn(async move {
			while let Ok((mut socket, _)) = listener.accept().await {
				let handler = handler.clone();
				let requests = requests.clone();
				tokio::spawn(async move {
					let mut buf = Vec::new();
					let mut chunk = [0u8; 4096];
					let header_end = loop {
						let n = socket.read(&mut chunk).await.unwrap();
						if n == 0 {
							return;
						}
						buf.extend_from_slice(&chunk[..n]);
						if let Some(p) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
							break p + 4;
						}
					};
					let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
					let length = head
						.lines()
						.filter_map(|l| l.split_once(':'))
						.find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
						.and_then(|(_, v)| v.trim().parse::<usize>().ok())
						.unwrap_or(0);
					while buf.len() < header_end + length {
						let n = socket.read(&mut chunk).await.unwrap();
						if n == 0 {
							break;
						}
						buf.extend_from_slice(&chunk[..n]);
					}
					let body = String::from_utf8_lossy(&buf[header_end..]).into_owned();
					let mut words = head.split_whitespace();
					let method = words.next().unwrap_or_default().to_owned();
					let path = words.next().unwrap_or_default().to_owned();
					requests
						.lock()
						.unwrap()
						.push((format!("{} {}", method, path), body.clone()));

					let (status, reply) = (*handler)(&method, &path, &body);
					let reason = match status {
						200 => "OK",
						401 => "Unauthorized",
						404 => "Not Found",
						_ => "Internal Server Error",
					};
					let response = format!(
						"HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
						status,
						reason,
						reply.len(),
						reply
					);
					socket.write_all(response.as_bytes()).await.unwrap();
					let _ = socket.shutdown().await;
				});
			}
		});
		Self { endpoint, log }
	}

	fn config(&self) -> DWaveConfig {
		DWaveConfig::new().token("TOKEN").endpoint(self.endpoint.clone())
	}

	fn session(&self) -> DWaveSession {
		let mut session = DWaveSession::new(&self.config()).unwrap();
		session.poll_backoff_min = Duration::from_millis(5);
		session
	}

	fn requests(&self) -> Vec<String> {
		self.log.lock().unwrap().iter().map(|(r, _)| r.clone()).collect()
	}

	fn body_of(&self, request: &str) -> Value {
		let log = self.log.lock().unwrap();
		let (_, body) = log.iter().find(|(r, _)| r == request).unwrap();
		serde_json::from_str(body).unwrap()
	}
}

fn empty_problem() -> ProblemData {
	encode_qp(&[0], &[], &BTreeMap::new(), &BTreeMap::new(), 0.0).unwrap()
}

fn b64_i32(v: &[i32]) -> String {
	base64::encode(&v.iter().flat_map(|i| i.to_le_bytes().to_vec()).collect::<Vec<_>>())
}

fn b64_f64(v: &[f64]) -> String {
	base64::encode(&v.iter().flat_map(|f| f.to_le_bytes().to_vec()).collect::<Vec<_>>())
}

/// Two samples over qubits 0 and 4: (+1, -1) three times, (-1, +1) twice.
/// The reported energies are deliberately wrong.
fn answer(active: &[i32]) -> Value {
	json!({
		"format": "qp",
		"active_variables": b64_i32(active),
		"energies": b64_f64(&[99.0, 99.0]),
		"solutions": base64::encode(&[0b1000_0000u8, 0b0100_0000]),
		"num_occurrences": b64_i32(&[3, 2]),
	})
}

fn solver(id: &str, status: &str, load: f64, category: &str) -> Value {
	json!({
		"id": id,
		"status": status,
		"avg_load": load,
		"properties": {
			"supported_problem_types": ["ising", "qubo"],
			"category": category,
			"chip_id": format!("{}_chip", id),
			"num_reads_range": [1, 100],
			"qubits": [0, 1, 4],
			"couplers": [[0, 4], [1, 4]],
		}
	})
}

#[tokio::test]
async fn failed_problem_reports_the_error_message() {
	let sapi = FakeSapi::start(|_: &str, _: &str, _: &str| {
		(200, json!([{"id": "p1", "status": "FAILED", "error_message": "boom"}]).to_string())
	})
	.await;
	let r = sapi
		.session()
		.submit_problem("S", &empty_problem(), ProblemType::Ising, &Map::new())
		.await;
	assert!(matches!(r, Err(ApiError::Problem(ref m)) if m == "boom"));
	assert_eq!(sapi.requests(), vec!["POST /problems/"]);
}

#[tokio::test]
async fn cancelled_problem() {
	let sapi = FakeSapi::start(|method: &str, _: &str, _: &str| match method {
		"POST" => (200, json!([{"id": "p4", "status": "PENDING"}]).to_string()),
		_ => (200, json!([{"id": "p4", "status": "CANCELLED"}]).to_string()),
	})
	.await;
	let r = sapi
		.session()
		.submit_problem("S", &empty_problem(), ProblemType::Ising, &Map::new())
		.await;
	assert!(matches!(r, Err(ApiError::Cancelled(ref id)) if id == "p4"));
	assert_eq!(sapi.requests(), vec!["POST /problems/", "GET /problems/?id=p4"]);
}

#[tokio::test]
async fn completed_problem_without_answer_is_fetched() {
	let sapi = FakeSapi::start(|method: &str, path: &str, _: &str| match (method, path) {
		("POST", _) => (200, json!([{"id": "p2", "status": "PENDING"}]).to_string()),
		("GET", "/problems/?id=p2") => (200, json!([{"id": "p2", "status": "COMPLETED"}]).to_string()),
		("GET", "/problems/p2/") => (
			200,
			json!({"id": "p2", "status": "COMPLETED", "answer": answer(&[0, 4])}).to_string(),
		),
		_ => (404, "{}".to_owned()),
	})
	.await;
	let done = sapi
		.session()
		.submit_problem("S", &empty_problem(), ProblemType::Ising, &Map::new())
		.await
		.unwrap();
	assert_eq!(done.id, "p2");
	assert_eq!(done.answer["format"], "qp");
	assert_eq!(
		sapi.requests(),
		vec!["POST /problems/", "GET /problems/?id=p2", "GET /problems/p2/"]
	);
}

#[tokio::test]
async fn polling_timeout_cancels_the_problem() {
	let sapi = FakeSapi::start(|method: &str, _: &str, _: &str| match method {
		"DELETE" => (200, "{}".to_owned()),
		_ => (200, json!([{"id": "p3", "status": "PENDING"}]).to_string()),
	})
	.await;
	let mut session = sapi.session();
	session.polling_timeout = Some(Duration::from_millis(100));
	let r = session
		.submit_problem("S", &empty_problem(), ProblemType::Ising, &Map::new())
		.await;
	assert!(matches!(r, Err(ApiError::Timeout(ref id)) if id == "p3"));
	let requests = sapi.requests();
	assert_eq!(requests.first().map(String::as_str), Some("POST /problems/"));
	assert!(requests.iter().any(|r| r == "GET /problems/?id=p3"));
	assert_eq!(requests.last().map(String::as_str), Some("DELETE /problems/p3/"));
}

#[tokio::test]
async fn timeout_bounds_the_wait_and_survives_a_failed_cancel() {
	let sapi = FakeSapi::start(|method: &str, _: &str, _: &str| match method {
		"DELETE" => (500, "{}".to_owned()),
		_ => (200, json!([{"id": "p6", "status": "PENDING"}]).to_string()),
	})
	.await;
	let mut session = sapi.session();
	session.poll_backoff_min = Duration::from_secs(30);
	session.polling_timeout = Some(Duration::from_millis(200));
	let started = Instant::now();
	let r = session
		.submit_problem("S", &empty_problem(), ProblemType::Ising, &Map::new())
		.await;
	assert!(matches!(r, Err(ApiError::Timeout(_))));
	assert!(started.elapsed() < Duration::from_secs(10));
	assert_eq!(sapi.requests().last().map(String::as_str), Some("DELETE /problems/p6/"));
}

#[tokio::test]
async fn rejected_token() {
	let sapi = FakeSapi::start(|_: &str, _: &str, _: &str| {
		(401, json!({"error_code": 401, "error_msg": "Invalid token"}).to_string())
	})
	.await;
	let r = sapi.session().list_solvers().await;
	assert!(matches!(r, Err(ApiError::Auth(ref m)) if m.starts_with("401")));
}

#[tokio::test]
async fn connect_picks_least_loaded_online_qpu() {
	let sapi = FakeSapi::start(|_: &str, path: &str, _: &str| match path {
		"/solvers/remote/" => (
			200,
			json!([
				solver("offline", "OFFLINE", 0.0, "qpu"),
				solver("busy", "ONLINE", 0.9, "qpu"),
				solver("idle", "ONLINE", 0.1, "qpu"),
				solver("hybrid", "ONLINE", 0.0, "hybrid"),
			])
			.to_string(),
		),
		_ => (404, "{}".to_owned()),
	})
	.await;
	let sampler = DWaveSampler::connect(&sapi.config()).await.unwrap();
	assert_eq!(sampler.id(), "idle");
	assert_eq!(sampler.chip_id(), "idle_chip");

	let software = sapi.config().client(SolverCategory::Software);
	assert!(matches!(
		DWaveSampler::connect(&software).await,
		Err(ApiError::NotFound(_))
	));
	let unknown = sapi.config().solver("Advantage_system9.9");
	assert!(matches!(
		DWaveSampler::connect(&unknown).await,
		Err(ApiError::NotFound(_))
	));
}

async fn fake_qpu(active: &'static [i32]) -> FakeSapi {
	FakeSapi::start(move |method: &str, path: &str, _: &str| match (method, path) {
		("GET", "/solvers/remote/fake/") => (200, solver("fake", "ONLINE", 0.0, "qpu").to_string()),
		("POST", "/problems/") => (
			200,
			json!([{"id": "p5", "status": "COMPLETED", "answer": answer(active)}]).to_string(),
		),
		_ => (404, "{}".to_owned()),
	})
	.await
}

#[tokio::test]
async fn sample_async_recomputes_energies_on_the_model() {
	let sapi = fake_qpu(&[0, 4]).await;
	let sampler = DWaveSampler::connect(&sapi.config().solver("fake"))
		.await
		.unwrap()
		.with_num_reads(5);
	let model: BinaryQuadraticModel<usize> =
		BinaryQuadraticModel::from_ising(vec![], vec![((0, 4), 1.0)], 0.0).unwrap();
	let set = sampler.sample_async(&model).await.unwrap();
	assert_eq!(set.variables(), &[0, 4]);
	assert_eq!(set.energies(), vec![-1.0, -1.0]);
	assert_eq!(set.num_samples(), 5);
	assert_eq!(set.info["problem_id"], "p5");
	assert_eq!(set.info["solver"], "fake");

	let body = sapi.body_of("POST /problems/");
	assert_eq!(body[0]["solver"], "fake");
	assert_eq!(body[0]["type"], "ising");
	assert_eq!(body[0]["params"]["num_reads"], 5);
	assert_eq!(body[0]["data"]["format"], "qp");
}

#[tokio::test]
async fn sample_async_rejects_answers_over_other_qubits() {
	let sapi = fake_qpu(&[0, 1]).await;
	let sampler = DWaveSampler::connect(&sapi.config().solver("fake")).await.unwrap();
	let model: BinaryQuadraticModel<usize> =
		BinaryQuadraticModel::from_ising(vec![], vec![((0, 4), 1.0)], 0.0).unwrap();
	assert!(matches!(
		sampler.sample_async(&model).await,
		Err(ApiError::Decode(_))
	));
}

#[tokio::test]
async fn num_reads_outside_the_solver_range() {
	let sapi = fake_qpu(&[0, 4]).await;
	let sampler = DWaveSampler::connect(&sapi.config().solver("fake"))
		.await
		.unwrap()
		.with_num_reads(1000);
	let r = sampler.sample_ising(&BTreeMap::new(), &BTreeMap::new()).await;
	assert!(matches!(r, Err(ApiError::Problem(_))));
	assert!(!sapi.requests().iter().any(|r| r.starts_with("POST")));
}
