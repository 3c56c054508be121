extern crate annealers_dwave;
extern crate tempfile;

use annealers_dwave::prelude::*;
use std::io::Write;
use std::time::Duration;

fn write_config(content: &str) -> tempfile::NamedTempFile {
	let mut file = tempfile::NamedTempFile::new().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file
}

const CONFIG: &str = "\
[defaults]
endpoint = https://example.com/sapi

[prod]
token = ABC-123
solver = Advantage_system1.1
polling_timeout = 2.5

[test]
token = TEST
client = sw
";

#[test]
fn load_first_profile() {
	let file = write_config(CONFIG);
	let config = DWaveConfig::load_with(Some(file.path()), None, |_| None).unwrap();
	assert_eq!(config.token.as_deref(), Some("ABC-123"));
	assert_eq!(config.solver.as_deref(), Some("Advantage_system1.1"));
	assert_eq!(config.endpoint_url(), "https://example.com/sapi");
	assert_eq!(config.polling_timeout, Some(Duration::from_millis(2500)));
}

#[test]
fn load_named_profile_with_env_override() {
	let file = write_config(CONFIG);
	let config = DWaveConfig::load_with(Some(file.path()), None, |k| match k {
		"DWAVE_PROFILE" => Some("test".to_owned()),
		"DWAVE_API_TOKEN" => Some("FROM-ENV".to_owned()),
		_ => None,
	})
	.unwrap();
	assert_eq!(config.token.as_deref(), Some("FROM-ENV"));
	assert_eq!(config.client, Some(SolverCategory::Software));
	assert_eq!(config.solver, None);
}

#[test]
fn unknown_profile() {
	let file = write_config(CONFIG);
	assert!(matches!(
		DWaveConfig::load_with(Some(file.path()), Some("missing"), |_| None),
		Err(ApiError::LoadConfig(_))
	));
}

#[test]
fn config_file_from_env() {
	let file = write_config("[only]\ntoken = T\n");
	let path = file.path().to_string_lossy().into_owned();
	let config = DWaveConfig::load_with(None, None, |k| {
		if k == "DWAVE_CONFIG_FILE" {
			Some(path.clone())
		} else {
			None
		}
	})
	.unwrap();
	assert_eq!(config.token.as_deref(), Some("T"));
}
