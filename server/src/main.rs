use tracing::error;
use xiver::config::Config;

#[tokio::main]
async fn main() {
	tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_target(false)
		.init();

	let config = Config::from_env();
	if let Err(err) = xiver::run(config).await {
		error!("xiver stopped: {}", err);
		std::process::exit(1);
	}
}

// vim: ts=4
