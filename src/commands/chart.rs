use anyhow::{Context, Result, bail};
use chrono::Utc;

use crate::cli::ChartArgs;
use crate::commands::artifacts::{write_charts, write_run_artifacts};
use crate::controller::Controller;
use crate::trigger::PipelineRequest;
use crate::util::now_utc_string;

pub fn run(args: ChartArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();

    let mut controller = Controller::new(&args.pipeline.data, args.pipeline.options());
    let outcome = match (args.trigger, args.category) {
        (Some(trigger), _) => controller.fire(trigger)?,
        (None, Some(category)) => {
            controller.execute(PipelineRequest::new(category, args.metric))?
        }
        (None, None) => bail!("either --trigger or --category is required"),
    };

    let chart = controller
        .registry()
        .get(outcome.request.target)
        .context("chart target was not bound after pipeline run")?;
    write_charts(&[chart], &args.output)?;

    if args.output.write {
        write_run_artifacts(
            &args.output.output_dir,
            started_ts,
            started_at,
            std::slice::from_ref(&outcome),
            controller.registry(),
        )?;
    }

    Ok(())
}
