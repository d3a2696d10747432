use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::aggregate::EmptyGroupPolicy;
use crate::controller::PipelineOptions;
use crate::model::{CategoryField, MetricField};
use crate::normalize::IssuePolicy;
use crate::trigger::Trigger;

#[derive(Parser, Debug)]
#[command(
    name = "evalchart",
    version,
    about = "Average course evaluation scores by category and chart them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Chart(ChartArgs),
    Dashboard(DashboardArgs),
    Inspect(InspectArgs),
}

#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    #[arg(long, default_value = "files/website_data.csv")]
    pub data: PathBuf,

    #[arg(long, value_enum, default_value_t = IssuePolicy::Default)]
    pub on_issue: IssuePolicy,

    #[arg(long, value_enum, default_value_t = EmptyGroupPolicy::Keep)]
    pub empty_groups: EmptyGroupPolicy,
}

impl PipelineArgs {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            issue_policy: self.on_issue,
            empty_groups: self.empty_groups,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    #[arg(long, default_value_t = 72)]
    pub width: usize,

    #[arg(long, default_value_t = false)]
    pub write: bool,

    #[arg(long, default_value = ".cache/evalchart")]
    pub output_dir: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct ChartArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long, value_enum, conflicts_with = "category")]
    pub trigger: Option<Trigger>,

    #[arg(long, value_enum)]
    pub category: Option<CategoryField>,

    #[arg(long, value_enum, default_value_t = MetricField::EvalWorkshop)]
    pub metric: MetricField,
}

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_accepts_browser_trigger_ids() {
        let cli = Cli::try_parse_from(["evalchart", "chart", "--trigger", "classInstructorBtn"])
            .expect("trigger id should parse");
        let Commands::Chart(args) = cli.command else {
            panic!("expected chart command");
        };
        assert_eq!(args.trigger, Some(Trigger::ClassInstructorBtn));
        assert_eq!(args.pipeline.data, PathBuf::from("files/website_data.csv"));
        assert_eq!(args.output.format, OutputFormat::Text);
    }

    #[test]
    fn chart_rejects_trigger_with_category() {
        let result = Cli::try_parse_from([
            "evalchart",
            "chart",
            "--trigger",
            "gender-btn",
            "--category",
            "target",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn dashboard_parses_policies() {
        let cli = Cli::try_parse_from([
            "evalchart",
            "dashboard",
            "--on-issue",
            "reject",
            "--empty-groups",
            "drop",
            "--format",
            "json",
        ])
        .expect("dashboard flags should parse");
        let Commands::Dashboard(args) = cli.command else {
            panic!("expected dashboard command");
        };
        let options = args.pipeline.options();
        assert_eq!(options.issue_policy, IssuePolicy::Reject);
        assert_eq!(options.empty_groups, EmptyGroupPolicy::Drop);
        assert_eq!(args.output.format, OutputFormat::Json);
    }
}
