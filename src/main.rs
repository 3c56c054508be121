use clap::Parser;
use maxcut::{Cli, Demo, RunConfig};
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn init_logging(level: &str) {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(true).with_writer(std::io::stderr))
		.init();
}

async fn run(cli: &Cli) -> maxcut::Result<()> {
	let config = RunConfig::from_cli(cli)?;
	let stdout = std::io::stdout();
	let mut out = stdout.lock();
	Demo::new(config).run(&mut out).await
}

#[tokio::main]
async fn main() {
	let cli = Cli::parse();
	init_logging(&cli.log_level);
	if let Err(e) = run(&cli).await {
		error!(error = %e, "maxcut demo failed");
		std::process::exit(1);
	}
}
