extern crate annealers_dwave;
extern crate maxcut;

use annealers_dwave::ApiError;
use maxcut::config::GraphChoice;
use maxcut::{Demo, RunConfig};

async fn run(config: RunConfig) -> String {
	let mut out = Vec::new();
	Demo::new(config).run(&mut out).await.unwrap();
	String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn prints_every_classical_result() {
	let config = RunConfig {
		seed: Some(7),
		skip_qpu: true,
		..RunConfig::default()
	};
	let text = run(config).await;
	assert_eq!(text.matches("The model that we are going to solve is").count(), 2);
	assert_eq!(text.matches("The exact solution is").count(), 2);
	assert_eq!(text.matches("The solution with simulated annealing is").count(), 2);
	assert!(!text.contains("quantum annealer"));
	assert!(text.contains("BinaryQuadraticModel({0: 0.0, 1: 0.0}, {(0, 1): 1.0}, 0.0, 'SPIN')"));
	assert!(text.contains("['SPIN', 4 rows, 4 samples, 2 variables]"));
	assert!(text.contains("['SPIN', 32 rows, 32 samples, 5 variables]"));
	assert!(text.contains("['SPIN', 10 rows, 10 samples, 5 variables]"));
}

#[tokio::test]
async fn missing_token_ends_the_run() {
	let config = RunConfig {
		graph: GraphChoice::SingleEdge,
		sa_reads: 3,
		..RunConfig::default()
	};
	assert!(config.dwave.token.is_none());
	let mut out = Vec::new();
	let r = Demo::new(config).run(&mut out).await;
	assert!(matches!(r, Err(maxcut::Error::Api(ApiError::Auth(_)))));
	let text = String::from_utf8(out).unwrap();
	assert!(text.contains("['SPIN', 3 rows, 3 samples, 2 variables]"));
	assert!(!text.contains("D-Wave"));
}

#[tokio::test]
async fn zero_sa_reads_is_an_error() {
	let config = RunConfig {
		sa_reads: 0,
		skip_qpu: true,
		..RunConfig::default()
	};
	let mut out = Vec::new();
	let r = Demo::new(config).run(&mut out).await;
	assert!(matches!(r, Err(maxcut::Error::Solver(_))));
}

#[tokio::test]
#[ignore]
async fn full_demo_with_qpu() {
	let cli = <maxcut::Cli as clap::Parser>::parse_from(vec!["maxcut", "--qpu-reads", "100"]);
	let config = RunConfig::from_cli(&cli).unwrap();
	let text = run(config).await;
	assert_eq!(
		text.matches("The solution obtained by D-Wave's quantum annealer").count(),
		2
	);
}
