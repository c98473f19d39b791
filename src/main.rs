use argh::FromArgs;
use env_logger::Builder;
use log::LevelFilter;
use neptune_cloner::aws;
use neptune_cloner::cloner::{CloneOptions, ClusterCloner};
use neptune_cloner::constants::{
    DEFAULT_INSTANCE_CLASS, DEFAULT_MAX_ATTEMPTS, DEFAULT_POLL_DELAY_SECS,
};
use neptune_cloner::error::Result;
use std::time::Duration;

#[derive(FromArgs)]
/// Clone a Neptune cluster, bring up a writer instance on the clone, and
/// delete the clone once both are available.
struct Args {
    /// identifier of the source cluster to clone
    #[argh(positional)]
    cluster_id: String,

    /// instance class for the clone's writer instance
    #[argh(option, default = "DEFAULT_INSTANCE_CLASS.to_string()")]
    instance_class: String,

    /// seconds to sleep between availability polls
    #[argh(option, default = "DEFAULT_POLL_DELAY_SECS")]
    poll_delay: u64,

    /// maximum number of availability polls per resource
    #[argh(option, default = "DEFAULT_MAX_ATTEMPTS")]
    max_attempts: u32,

    /// aws region for control-plane calls
    #[argh(option)]
    region: Option<String>,

    /// arn of a role to assume for control-plane calls
    #[argh(option)]
    assume_role: Option<String>,

    /// set logging verbosity [trace|debug|info|warn|error]. If the environment
    /// variable `RUST_LOG` is present, it overrides the default logging
    /// behavior. See https://docs.rs/env_logger/latest
    #[argh(option, default = "LevelFilter::Info")]
    log_level: LevelFilter,
}

#[tokio::main]
async fn main() {
    let args: Args = argh::from_env();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = aws::sdk_config(&args.region, &args.assume_role).await;
    let client = aws_sdk_neptune::Client::new(&config);

    let options = CloneOptions {
        instance_class: args.instance_class,
        poll_delay: Duration::from_secs(args.poll_delay),
        max_attempts: args.max_attempts,
    };
    ClusterCloner::new(&client, options)
        .run(&args.cluster_id)
        .await
}

/// Initialize the logger with the value passed by `--log-level` (or its
/// default) when the `RUST_LOG` environment variable is not present. If
/// present, the `RUST_LOG` environment variable overrides `--log-level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .init();
        }
    }
}
