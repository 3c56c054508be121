use crate::encoder::ProblemData;
use crate::profile::DWaveConfig;
use crate::property::{ProblemType, SolverInfo};
use crate::{ApiError, Result};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Proxy, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("annealers_dwave/", env!("CARGO_PKG_VERSION"));

/// Status of a submitted problem, as returned by `/problems/`.
#[derive(Deserialize, Debug)]
struct ProblemStatus {
	id: String,
	status: String,
	#[serde(default)]
	error_message: Option<String>,
	#[serde(default)]
	answer: Option<Value>,
}

/// Answer of a completed problem.
#[derive(Clone, Debug)]
pub struct CompletedProblem {
	pub id: String,
	pub answer: Value,
}

/// Authenticated connection to a SAPI endpoint.
#[derive(Debug)]
pub struct DWaveSession {
	client: Client,
	endpoint: String,
	/// Give up (and cancel the problem) after waiting this long.
	pub polling_timeout: Option<Duration>,
	pub poll_backoff_min: Duration,
	pub poll_backoff_max: Duration,
}

impl DWaveSession {
	pub fn new(config: &DWaveConfig) -> Result<Self> {
		let token = config
			.token
			.as_deref()
			.ok_or_else(|| ApiError::Auth("no API token configured".to_owned()))?;
		let mut headers = HeaderMap::new();
		headers.insert(
			"x-auth-token",
			HeaderValue::from_str(token)
				.map_err(|_| ApiError::Auth("token is not a valid header value".to_owned()))?,
		);
		let mut builder = Client::builder()
			.user_agent(USER_AGENT)
			.default_headers(headers)
			.timeout(config.request_timeout);
		if let Some(proxy) = &config.proxy {
			builder = builder.proxy(Proxy::all(proxy.as_str())?);
		}
		Ok(Self {
			client: builder.build()?,
			endpoint: config.endpoint_url().trim_end_matches('/').to_owned(),
			polling_timeout: config.polling_timeout,
			poll_backoff_min: Duration::from_millis(50),
			poll_backoff_max: Duration::from_secs(60),
		})
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	async fn check(resp: Response) -> Result<Response> {
		let status = resp.status();
		if status.is_success() {
			return Ok(resp);
		}
		let body = resp.text().await.unwrap_or_default();
		debug!(%status, %body, "SAPI request failed");
		match status {
			StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
				Err(ApiError::Auth(format!("{} {}", status, body)))
			}
			_ => Err(ApiError::Api(format!("{} {}", status, body))),
		}
	}

	async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
		let url = format!("{}{}", self.endpoint, path);
		debug!(%url, "GET");
		let resp = Self::check(self.client.get(&url).send().await?).await?;
		Ok(resp.json::<T>().await?)
	}

	pub async fn list_solvers(&self) -> Result<Vec<SolverInfo>> {
		self.get("/solvers/remote/").await
	}

	pub async fn get_solver(&self, name: &str) -> Result<SolverInfo> {
		match self.get(&format!("/solvers/remote/{}/", name)).await {
			Err(ApiError::Api(msg)) if msg.starts_with("404") => {
				Err(ApiError::NotFound(name.to_owned()))
			}
			o => o,
		}
	}

	/// Submit a problem and wait for its answer.
	pub async fn submit_problem(
		&self,
		solver: &str,
		data: &ProblemData,
		problem_type: ProblemType,
		params: &Map<String, Value>,
	) -> Result<CompletedProblem> {
		#[derive(Serialize)]
		struct RequestBody<'a> {
			data: &'a ProblemData,
			#[serde(rename = "type")]
			problem_type: ProblemType,
			solver: &'a str,
			params: &'a Map<String, Value>,
		}
		let body = RequestBody {
			data,
			problem_type,
			solver,
			params,
		};
		let url = format!("{}/problems/", self.endpoint);
		debug!(%url, solver, "POST problem");
		let resp = Self::check(self.client.post(&url).json(&[body]).send().await?).await?;
		let mut status = resp
			.json::<Vec<ProblemStatus>>()
			.await?
			.pop()
			.ok_or_else(|| ApiError::Api("empty response to problem submission".to_owned()))?;
		let started = Instant::now();
		let mut backoff = self.poll_backoff_min;
		loop {
			debug!(id = %status.id, status = %status.status, "problem status");
			match status.status.as_str() {
				"COMPLETED" => match status.answer {
					Some(answer) => {
						return Ok(CompletedProblem {
							id: status.id,
							answer,
						})
					}
					None => {
						status = self.get(&format!("/problems/{}/", status.id)).await?;
						if status.status == "COMPLETED" && status.answer.is_none() {
							return Err(ApiError::Decode(format!("problem {} has no answer", status.id)));
						}
					}
				},
				"FAILED" => {
					let id = status.id;
					return Err(ApiError::Problem(
						status
							.error_message
							.unwrap_or_else(|| format!("problem {} failed", id)),
					));
				}
				"CANCELLED" => return Err(ApiError::Cancelled(status.id)),
				"PENDING" | "IN_PROGRESS" => {
					let mut delay = backoff;
					if let Some(timeout) = self.polling_timeout {
						let elapsed = started.elapsed();
						if elapsed >= timeout {
							warn!(id = %status.id, "polling timed out, cancelling problem");
							if let Err(e) = self.cancel_problem(&status.id).await {
								warn!(id = %status.id, error = %e, "cannot cancel problem");
							}
							return Err(ApiError::Timeout(status.id));
						}
						delay = std::cmp::min(delay, timeout - elapsed);
					}
					tokio::time::sleep(delay).await;
					backoff = std::cmp::min(backoff * 2, self.poll_backoff_max);
					let id = status.id;
					status = self
						.get::<Vec<ProblemStatus>>(&format!("/problems/?id={}", id))
						.await?
						.pop()
						.ok_or_else(|| ApiError::NotFound(id))?;
				}
				o => return Err(ApiError::Api(format!("unknown problem status {}", o))),
			}
		}
	}

	pub async fn cancel_problem(&self, id: &str) -> Result<()> {
		let url = format!("{}/problems/{}/", self.endpoint, id);
		debug!(%url, "DELETE");
		Self::check(self.client.delete(&url).send().await?).await?;
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn token_is_required() {
		assert!(matches!(
			DWaveSession::new(&DWaveConfig::new()),
			Err(ApiError::Auth(_))
		));
	}

	#[test]
	fn endpoint_is_normalized() {
		let config = DWaveConfig::new().token("abc").endpoint("https://example.com/sapi/");
		let session = DWaveSession::new(&config).unwrap();
		assert_eq!(session.endpoint(), "https://example.com/sapi");
	}

	#[test]
	fn problem_status_parses() {
		let s: ProblemStatus = serde_json::from_str(
			r#"{"id": "abc", "status": "PENDING", "submitted_on": "2021-01-01T00:00:00Z", "type": "ising"}"#,
		)
		.unwrap();
		assert_eq!(s.id, "abc");
		assert!(s.answer.is_none());
	}
}
