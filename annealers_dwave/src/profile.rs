//! `dwave.conf` profiles and `DWAVE_*` environment overrides.
use crate::property::SolverCategory;
use crate::{ApiError, Result};
use ini::Ini;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://cloud.dwavesys.com/sapi";
const CONFIG_FILE_NAME: &str = "dwave.conf";

macro_rules! builder_pattern {
	($name: ident) => {
		/// Builder function for property $name.
		///
		/// # Args
		/// * ~$name~ - Set property `$name`.
		pub fn $name<'a, S: Into<Cow<'a, str>>>(mut self, $name: S) -> Self {
			self.$name = Some($name.into().into_owned());
			self
		}
	};
	($name: ident, $typ: ty) => {
		/// Builder function for property $name.
		///
		/// # Args
		/// * ~$name~ - Set property `$name`.
		pub fn $name<T: Into<$typ>>(mut self, $name: T) -> Self {
			self.$name = Some($name.into());
			self
		}
	};
}

fn in_dir<P: AsRef<Path>>(dir: P) -> PathBuf {
	let mut buf = PathBuf::from(shellexpand::tilde(&dir.as_ref().to_string_lossy()).into_owned());
	buf.push("dwave");
	buf.push(CONFIG_FILE_NAME);
	buf
}

/// Candidate config files, system wide first.
#[cfg(windows)]
pub fn get_dwave_path() -> Vec<PathBuf> {
	let mut v = Vec::new();
	if let Ok(dir) = std::env::var("ALLUSERSPROFILE") {
		v.push(in_dir(dir));
	}
	if let Ok(dir) = std::env::var("LOCALAPPDATA") {
		v.push(in_dir(dir));
	}
	v.push(PathBuf::from(CONFIG_FILE_NAME));
	v
}

/// Candidate config files, system wide first.
#[cfg(target_os = "macos")]
pub fn get_dwave_path() -> Vec<PathBuf> {
	vec![
		in_dir("/Library/Application Support"),
		in_dir("~/Library/Application Support"),
		PathBuf::from(CONFIG_FILE_NAME),
	]
}

/// Candidate config files, system wide first.
#[cfg(all(unix, not(target_os = "macos")))]
pub fn get_dwave_path() -> Vec<PathBuf> {
	let system = std::env::var("XDG_CONFIG_DIRS").unwrap_or_else(|_| "/etc/xdg".to_owned());
	let mut v = std::env::split_paths(&system)
		.collect::<Vec<_>>()
		.into_iter()
		.rev()
		.map(in_dir)
		.collect::<Vec<_>>();
	v.push(in_dir(
		std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| "~/.config".to_owned()),
	));
	v.push(PathBuf::from(CONFIG_FILE_NAME));
	v
}

/// Connection settings of the SAPI client.
#[derive(Clone, Debug, PartialEq)]
pub struct DWaveConfig {
	pub endpoint: Option<String>,
	pub token: Option<String>,
	/// Solver name. Without one the least loaded online solver of `client` is
	/// used.
	pub solver: Option<String>,
	pub client: Option<SolverCategory>,
	pub proxy: Option<String>,
	/// Timeout of a single HTTP request.
	pub request_timeout: Duration,
	/// How long to wait for a submitted problem before cancelling it.
	pub polling_timeout: Option<Duration>,
}

impl Default for DWaveConfig {
	fn default() -> Self {
		Self {
			endpoint: None,
			token: None,
			solver: None,
			client: None,
			proxy: None,
			request_timeout: Duration::from_secs(60),
			polling_timeout: None,
		}
	}
}

impl DWaveConfig {
	pub fn new() -> Self {
		Self::default()
	}

	builder_pattern!(endpoint);
	builder_pattern!(token);
	builder_pattern!(solver);
	builder_pattern!(proxy);
	builder_pattern!(client, SolverCategory);

	pub fn endpoint_url(&self) -> &str {
		self.endpoint.as_deref().unwrap_or(DEFAULT_ENDPOINT)
	}

	/// Load the settings from D-Wave's config files and the environment.
	///
	/// Args:
	/// * `file` - Load settings from given file only. If None,
	///   `DWAVE_CONFIG_FILE` or every existing file of [`get_dwave_path`] is
	///   read, later files overriding earlier ones.
	/// * `profile` - Section to use. If None, `DWAVE_PROFILE`, then the
	///   `profile` key of `[defaults]`, then the first section.
	pub fn load(file: Option<&Path>, profile: Option<&str>) -> Result<Self> {
		Self::load_with(file, profile, |k| std::env::var(k).ok())
	}

	/// [`DWaveConfig::load`] with a custom environment lookup.
	pub fn load_with<F>(file: Option<&Path>, profile: Option<&str>, env: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let explicit = file
			.map(Path::to_path_buf)
			.or_else(|| env("DWAVE_CONFIG_FILE").map(PathBuf::from))
			.map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()));
		let files = match explicit {
			Some(path) => {
				if !path.exists() {
					return Err(ApiError::LoadConfig(format!(
						"config file {} does not exist",
						path.display()
					)));
				}
				vec![path]
			}
			None => get_dwave_path().into_iter().filter(|p| p.exists()).collect(),
		};
		let profile = profile.map(str::to_owned).or_else(|| env("DWAVE_PROFILE"));

		let mut ret = Self::default();
		let mut profile_found = false;
		for path in files.iter() {
			debug!(path = %path.display(), "reading D-Wave config");
			let ini = Ini::load_from_file(path)?;
			profile_found |= ret.apply_ini(&ini, profile.as_deref())?;
		}
		if let Some(profile) = &profile {
			if !files.is_empty() && !profile_found {
				return Err(ApiError::LoadConfig(format!("profile {} not found", profile)));
			}
		}
		ret.apply_env(env)?;
		Ok(ret)
	}

	/// Apply the `[defaults]` section and the selected profile of `ini`.
	/// Returns whether `profile` was found.
	pub fn apply_ini(&mut self, ini: &Ini, profile: Option<&str>) -> Result<bool> {
		let defaults = ini.section(Some("defaults"));
		let section = match profile {
			Some(p) => Some(p.to_owned()),
			None => defaults
				.and_then(|d| d.get("profile"))
				.map(str::to_owned)
				.or_else(|| {
					ini.sections()
						.flatten()
						.find(|s| *s != "defaults")
						.map(str::to_owned)
				}),
		};
		let selected = section.as_ref().and_then(|s| ini.section(Some(s.as_str())));
		for props in defaults.into_iter().chain(selected) {
			for (key, value) in props.iter() {
				self.set(key, value)?;
			}
		}
		Ok(selected.is_some())
	}

	fn apply_env<F: Fn(&str) -> Option<String>>(&mut self, env: F) -> Result<()> {
		for &(var, key) in [
			("DWAVE_API_ENDPOINT", "endpoint"),
			("DWAVE_API_TOKEN", "token"),
			("DWAVE_API_SOLVER", "solver"),
			("DWAVE_API_CLIENT", "client"),
			("DWAVE_API_PROXY", "proxy"),
		]
		.iter()
		{
			if let Some(value) = env(var) {
				self.set(key, &value)?;
			}
		}
		Ok(())
	}

	fn set(&mut self, key: &str, value: &str) -> Result<()> {
		let value = value.trim();
		let seconds = |v: &str| -> Result<Duration> {
			v.parse::<f64>()
				.ok()
				.filter(|s| s.is_finite() && *s >= 0.0)
				.map(Duration::from_secs_f64)
				.ok_or_else(|| ApiError::LoadConfig(format!("bad {}: {}", key, v)))
		};
		match key {
			"endpoint" => self.endpoint = Some(value.to_owned()),
			"token" => self.token = Some(value.to_owned()),
			"solver" => self.solver = Some(value.to_owned()),
			"proxy" => self.proxy = Some(value.to_owned()),
			"client" => {
				self.client = Some(value.parse().map_err(ApiError::LoadConfig)?);
			}
			"request_timeout" => self.request_timeout = seconds(value)?,
			"polling_timeout" => self.polling_timeout = Some(seconds(value)?),
			// "profile" in [defaults], headers, ...
			_ => (),
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn no_env(_: &str) -> Option<String> {
		None
	}

	#[test]
	fn profile_selection() {
		let ini = Ini::load_from_str(
			"[defaults]\nendpoint = https://example.com/sapi\nprofile = prod\n\n[dev]\ntoken = DEV\n\n[prod]\ntoken = PROD\nclient = qpu\n",
		)
		.unwrap();
		let mut c = DWaveConfig::new();
		assert!(c.apply_ini(&ini, None).unwrap());
		assert_eq!(c.token.as_deref(), Some("PROD"));
		assert_eq!(c.client, Some(SolverCategory::Qpu));
		assert_eq!(c.endpoint_url(), "https://example.com/sapi");

		let mut c = DWaveConfig::new();
		assert!(c.apply_ini(&ini, Some("dev")).unwrap());
		assert_eq!(c.token.as_deref(), Some("DEV"));
		assert!(!DWaveConfig::new().apply_ini(&ini, Some("none")).unwrap());
	}

	#[test]
	fn first_section_without_defaults() {
		let ini = Ini::load_from_str("[a]\nsolver = X\n[b]\nsolver = Y\n").unwrap();
		let mut c = DWaveConfig::new();
		c.apply_ini(&ini, None).unwrap();
		assert_eq!(c.solver.as_deref(), Some("X"));
	}

	#[test]
	fn bad_values() {
		let ini = Ini::load_from_str("[a]\nclient = gpu\n").unwrap();
		assert!(matches!(
			DWaveConfig::new().apply_ini(&ini, None),
			Err(ApiError::LoadConfig(_))
		));
		let ini = Ini::load_from_str("[a]\npolling_timeout = soon\n").unwrap();
		assert!(DWaveConfig::new().apply_ini(&ini, None).is_err());
	}

	#[test]
	fn missing_explicit_file() {
		let r = DWaveConfig::load_with(Some(Path::new("/nonexistent/dwave.conf")), None, no_env);
		assert!(matches!(r, Err(ApiError::LoadConfig(_))));
	}

	#[test]
	fn builder() {
		let c = DWaveConfig::new().token("T").solver(String::from("S")).client(SolverCategory::Software);
		assert_eq!(c.token.as_deref(), Some("T"));
		assert_eq!(c.solver.as_deref(), Some("S"));
		assert_eq!(c.endpoint_url(), DEFAULT_ENDPOINT);
	}
}
