use anyhow::Context;
use cartograph::config::CartographConfig;
use cartograph::health::HealthProber;
use cartograph::telemetry;
use cartograph::topology;
use cartograph::upstream::RouteCatalogClient;

enum CliCommand {
    Run {
        config_path: Option<String>,
        upstream: Option<String>,
    },
    Snapshot {
        config_path: Option<String>,
        upstream: Option<String>,
    },
    Help,
    SnapshotHelp,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    match parse_cli_args()? {
        CliCommand::Run {
            config_path,
            upstream,
        } => {
            telemetry::init_tracing().context("failed to initialise telemetry")?;

            let mut config = CartographConfig::load_from(config_path.as_deref())
                .context("failed to load configuration")?;
            if let Some(base_url) = upstream {
                config.upstream.base_url = base_url;
            }

            let app = cartograph::app::TopologyApp::initialise(config)
                .context("failed to construct application")?;

            app.run().await.context("application runtime error")
        }
        CliCommand::Snapshot {
            config_path,
            upstream,
        } => run_snapshot_command(config_path, upstream).await,
        CliCommand::Help => {
            print_help();
            Ok(())
        }
        CliCommand::SnapshotHelp => {
            print_snapshot_help();
            Ok(())
        }
    }
}

fn parse_cli_args() -> anyhow::Result<CliCommand> {
    let mut args = std::env::args().skip(1);
    let Some(first) = args.next() else {
        return Ok(CliCommand::Run {
            config_path: None,
            upstream: None,
        });
    };

    if first == "snapshot" {
        return parse_snapshot_args(args);
    }

    let mut config_path = None;
    let mut upstream = None;
    let mut pending = Some(first);

    loop {
        let arg = match pending.take() {
            Some(value) => value,
            None => match args.next() {
                Some(value) => value,
                None => break,
            },
        };

        match arg.as_str() {
            "-c" | "--config" => {
                if config_path.is_some() {
                    anyhow::bail!("config path specified multiple times");
                }
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected path after {arg}"))?;
                config_path = Some(value);
            }
            "-u" | "--upstream" => {
                if upstream.is_some() {
                    anyhow::bail!("upstream base url specified multiple times");
                }
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected url after {arg}"))?;
                upstream = Some(value);
            }
            "-h" | "--help" => return Ok(CliCommand::Help),
            other => anyhow::bail!("unrecognised argument `{other}`"),
        }
    }

    Ok(CliCommand::Run {
        config_path,
        upstream,
    })
}

fn parse_snapshot_args<I>(args: I) -> anyhow::Result<CliCommand>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut config_path = None;
    let mut upstream = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-c" | "--config" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected path after {arg}"))?;
                config_path = Some(value);
            }
            "-u" | "--upstream" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("expected url after {arg}"))?;
                upstream = Some(value);
            }
            "-h" | "--help" => return Ok(CliCommand::SnapshotHelp),
            other => anyhow::bail!("unrecognised snapshot argument `{other}`"),
        }
    }

    Ok(CliCommand::Snapshot {
        config_path,
        upstream,
    })
}

/// One fetch → build → probe pass, printed as JSON. No presenter server, no
/// layout restore; meant for scripting and debugging against a live backend.
async fn run_snapshot_command(
    config_path: Option<String>,
    upstream: Option<String>,
) -> anyhow::Result<()> {
    let mut config = CartographConfig::load_from(config_path.as_deref())
        .context("failed to load configuration")?;
    if let Some(base_url) = upstream {
        config.upstream.base_url = base_url;
    }

    let catalog = RouteCatalogClient::new(&config.upstream.base_url)
        .with_context(|| format!("invalid upstream base url {}", config.upstream.base_url))?;
    let prober = HealthProber::new();

    let routes = catalog.collect().await;
    let mut graph = topology::build(&routes);
    let statuses = prober.probe_graph(&graph).await;
    graph.apply_health(&statuses);

    println!(
        "{}",
        serde_json::to_string_pretty(&graph).context("failed to encode topology snapshot")?
    );
    Ok(())
}

fn print_help() {
    println!(
        "\
Usage: cartograph [OPTIONS]
       cartograph snapshot [OPTIONS]

Options:
  -c, --config <PATH>    Path to a cartograph config file
  -u, --upstream <URL>   Override the upstream route API base url
  -h, --help             Print this help message

Snapshot:
  Fetch the route catalog once, build and probe the topology, and print it
  as JSON to stdout.
"
    );
}

fn print_snapshot_help() {
    println!(
        "\
Usage: cartograph snapshot [OPTIONS]

Options:
  -c, --config <PATH>    Path to a cartograph config file
  -u, --upstream <URL>   Override the upstream route API base url
  -h, --help             Print this help message
"
    );
}
