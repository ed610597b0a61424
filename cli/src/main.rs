mod commands;
mod headers;
mod shell;
mod terminal;

use std::time::Duration;

use commands::{CommandLine, Commands, fetch, probe, scan};
use probr_common::config::Config;
use probr_core::proxy;
use terminal::{logging, print};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init();

    let cfg = Config {
        delay: Duration::from_millis(commands.delay),
        timeout: Duration::from_secs(commands.timeout),
        proxy: commands.proxy.clone(),
        no_banner: commands.no_banner,
    };

    print::banner(cfg.no_banner);

    let header_set = headers::load(commands.headers.as_deref())?;

    if let Some(proxy) = &cfg.proxy {
        print::header("testing proxy connectivity");
        proxy::precheck(proxy, cfg.timeout).await?;
    }

    match commands.command {
        Commands::Probe { url } => {
            print::header("single target probe");
            probe::probe(&url, &header_set, &cfg, &commands.error_log).await
        }
        Commands::Scan { file } => {
            print::header("starting batch scan");
            scan::scan(
                &file,
                &commands.output,
                &commands.error_log,
                &header_set,
                &cfg,
            )
            .await
        }
        Commands::Fetch { provider, key } => {
            print::header("downloading candidates");
            fetch::fetch(provider, key, &cfg).await
        }
    }
}
