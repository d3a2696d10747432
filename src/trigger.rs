use clap::ValueEnum;
use serde::Serialize;

use crate::model::{CategoryField, MetricField};

/// One of the two physical chart surfaces. Each metric draws onto its own.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartTarget {
    Chart,
    InstructorChart,
}

impl ChartTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Chart => "chart",
            Self::InstructorChart => "instructorChart",
        }
    }

    pub fn for_metric(metric: MetricField) -> Self {
        match metric {
            MetricField::EvalWorkshop => Self::Chart,
            MetricField::EvalInstructor => Self::InstructorChart,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub struct PipelineRequest {
    pub category: CategoryField,
    pub metric: MetricField,
    pub target: ChartTarget,
}

impl PipelineRequest {
    pub fn new(category: CategoryField, metric: MetricField) -> Self {
        Self {
            category,
            metric,
            target: ChartTarget::for_metric(metric),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Trigger {
    #[value(alias = "genderBtn")]
    GenderBtn,
    #[value(alias = "classBtn")]
    ClassBtn,
    #[value(alias = "targetBtn")]
    TargetBtn,
    #[value(alias = "performBtn")]
    PerformBtn,
    #[value(alias = "genderInstructorBtn")]
    GenderInstructorBtn,
    #[value(alias = "classInstructorBtn")]
    ClassInstructorBtn,
    #[value(alias = "targetInstructorBtn")]
    TargetInstructorBtn,
    #[value(alias = "performInstructorBtn")]
    PerformInstructorBtn,
}

impl Trigger {
    pub const ALL: [Trigger; 8] = [
        Self::GenderBtn,
        Self::ClassBtn,
        Self::TargetBtn,
        Self::PerformBtn,
        Self::GenderInstructorBtn,
        Self::ClassInstructorBtn,
        Self::TargetInstructorBtn,
        Self::PerformInstructorBtn,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::GenderBtn => "genderBtn",
            Self::ClassBtn => "classBtn",
            Self::TargetBtn => "targetBtn",
            Self::PerformBtn => "performBtn",
            Self::GenderInstructorBtn => "genderInstructorBtn",
            Self::ClassInstructorBtn => "classInstructorBtn",
            Self::TargetInstructorBtn => "targetInstructorBtn",
            Self::PerformInstructorBtn => "performInstructorBtn",
        }
    }

    pub fn request(self) -> PipelineRequest {
        let (category, metric) = match self {
            Self::GenderBtn => (CategoryField::Gender, MetricField::EvalWorkshop),
            Self::ClassBtn => (CategoryField::SocialClass, MetricField::EvalWorkshop),
            Self::TargetBtn => (CategoryField::Target, MetricField::EvalWorkshop),
            Self::PerformBtn => (CategoryField::Perform, MetricField::EvalWorkshop),
            Self::GenderInstructorBtn => (CategoryField::Gender, MetricField::EvalInstructor),
            Self::ClassInstructorBtn => (CategoryField::SocialClass, MetricField::EvalInstructor),
            Self::TargetInstructorBtn => (CategoryField::Target, MetricField::EvalInstructor),
            Self::PerformInstructorBtn => (CategoryField::Perform, MetricField::EvalInstructor),
        };
        PipelineRequest::new(category, metric)
    }
}
