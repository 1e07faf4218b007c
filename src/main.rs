// Entrypoint for the DBaaS walkthrough.
// - Sets up logging, loads the configuration and opens the EM connection.
// - Runs the procedure; a missing template or zone ends the run normally.

use anyhow::Context;
use dbaas_demo::api::EmConnection;
use dbaas_demo::config::Config;
use dbaas_demo::procedure::{Outcome, Procedure, StepBoundary};
use dbaas_demo::ui::{NoPause, PressEnter, SpinnerSleeper};
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Defaults are the demo values; see `Config::from_lookup` for the
    // `DBAAS_*` variables that override them.
    let config = Config::from_env().context("Failed to load configuration")?;
    let em = EmConnection::new(&config).context("Failed to create EM connection")?;
    info!(url = em.base_url(), "Created EM Connection");

    let mut boundary: Box<dyn StepBoundary> = if config.interactive {
        Box::new(PressEnter)
    } else {
        Box::new(NoPause)
    };
    let outcome = Procedure::new(&em, &config)
        .run(boundary.as_mut(), &mut SpinnerSleeper)
        .context("DBaaS walkthrough failed")?;

    match outcome {
        Outcome::Completed(done) => {
            info!(status = %done.instance.status, waits = done.waits, "API test completed.")
        }
        Outcome::TemplateNotFound(name) => info!(template = %name, "Stopped: no such service template"),
        Outcome::ZoneNotFound(name) => info!(zone = %name, "Stopped: no such zone for the template"),
        Outcome::RequestRejected => info!("Stopped: the provisioning request was not accepted"),
    }
    Ok(())
}
