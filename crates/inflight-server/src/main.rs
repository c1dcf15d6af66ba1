//! `inflight-server` binary

use std::path::PathBuf;
use std::sync::Arc;

use inflight_core::{CancellationRefund, Config};
use inflight_server::Server;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Command line options
#[derive(Debug)]
struct Opts {
    /// Configuration of the reservation system
    config: Config,
}

fn fail(message: &str) -> ! {
    eprintln!("Error: {message}");
    std::process::exit(1);
}

impl Opts {
    fn from_args() -> Self {
        let mut opts = Opts {
            config: Config::default(),
        };

        let mut option: Option<String> = None;
        for arg in std::env::args().skip(1) {
            if let Some(opt) = option {
                match opt.as_str() {
                    "-port" => {
                        opts.config.port = arg
                            .parse()
                            .unwrap_or_else(|_| fail("-port takes a decimal u16"))
                    }
                    "-host" => opts.config.host = arg,
                    "-seed" => opts.config.seed = Some(PathBuf::from(arg)),
                    "-tier3-refund" => {
                        opts.config.cancellation_refund = arg.parse().unwrap_or_else(|_| {
                            fail("-tier3-refund takes `legacy` or `list-price`")
                        })
                    }
                    _ => fail(&format!("ignoring unknown option {opt}")),
                }
                option = None;
            } else {
                option = Some(arg);
            }
        }
        if let Some(opt) = option {
            fail(&format!("ignoring leftover option {opt}"));
        }

        opts
    }
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "inflight_server=info,inflight_engine=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let opts = Opts::from_args();
    let config = opts.config;
    if config.cancellation_refund == CancellationRefund::ListPrice {
        tracing::info!("tier 3 cancellations refund 75% of the list price");
    }

    let dispatcher = match inflight_engine::launch(&config) {
        Ok(dispatcher) => Arc::new(dispatcher),
        Err(err) => {
            error!(%err, "could not launch the engine");
            std::process::exit(1);
        }
    };
    let server = match Server::bind((config.host.as_str(), config.port), dispatcher) {
        Ok(server) => server,
        Err(err) => {
            error!(%err, host = %config.host, port = config.port, "could not bind");
            std::process::exit(1);
        }
    };
    server.serve();
}
