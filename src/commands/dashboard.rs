use anyhow::Result;
use chrono::Utc;
use tracing::info;

use crate::cli::DashboardArgs;
use crate::commands::artifacts::{write_charts, write_run_artifacts};
use crate::controller::Controller;
use crate::trigger::Trigger;
use crate::util::now_utc_string;

pub fn run(args: DashboardArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();

    let mut controller = Controller::new(&args.pipeline.data, args.pipeline.options());
    let mut outcomes = Vec::with_capacity(Trigger::ALL.len());
    for trigger in Trigger::ALL {
        outcomes.push(controller.fire(trigger)?);
    }

    let replaced = outcomes
        .iter()
        .filter(|outcome| outcome.replaced_existing)
        .count();
    info!(
        triggers = outcomes.len(),
        charts = controller.registry().len(),
        replaced,
        "dashboard completed"
    );

    let charts: Vec<_> = controller.registry().charts().collect();
    write_charts(&charts, &args.output)?;

    if args.output.write {
        write_run_artifacts(
            &args.output.output_dir,
            started_ts,
            started_at,
            &outcomes,
            controller.registry(),
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests;
