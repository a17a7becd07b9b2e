use std::env;
use std::fs;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use serde_json::json;

use submission_roster::domain::{
    Assignment, AssignmentMeta, CustomGradeStatus, DifferentiationTag, GradeableRow,
};
use submission_roster::services::submission_filter::{
    FilterCriteria, SearchMode, SubmissionListFilter,
};
use submission_roster::services::submission_list::{
    build_submission_list, ListOptions, SubmissionListQuery,
};
use submission_roster::services::submission_sort::SubmissionSortOrder;

/// Same layout as an assignment export, with the course collections inlined.
#[derive(Debug, Deserialize)]
struct Snapshot {
    assignment: Assignment,
    #[serde(default)]
    submissions: Vec<GradeableRow>,
    #[serde(default)]
    custom_grade_statuses: Vec<CustomGradeStatus>,
    #[serde(default)]
    differentiation_tags: Vec<DifferentiationTag>,
}

#[derive(Debug, Default)]
struct Args {
    snapshot: String,
    category: Option<String>,
    threshold: Option<f64>,
    search: String,
    case_insensitive: bool,
    sort: Option<SubmissionSortOrder>,
}

const VALUE_CATEGORIES: [&str; 2] = ["ABOVE_VALUE", "BELOW_VALUE"];

fn main() -> Result<()> {
    let args = parse_args(env::args().skip(1))?;

    let payload = fs::read_to_string(&args.snapshot)
        .with_context(|| format!("Failed to read {}", args.snapshot))?;
    let snapshot: Snapshot = serde_json::from_str(&payload)
        .with_context(|| format!("Invalid snapshot JSON in {}", args.snapshot))?;

    let filter = parse_filter(args.category.as_deref(), args.threshold)?;
    let query = SubmissionListQuery {
        criteria: FilterCriteria {
            filter,
            search: args.search,
            search_mode: if args.case_insensitive {
                SearchMode::CaseInsensitive
            } else {
                SearchMode::CaseSensitive
            },
            ..FilterCriteria::default()
        },
        sort: args.sort,
    };

    let meta =
        AssignmentMeta::from_assignment(&snapshot.assignment, &snapshot.custom_grade_statuses);
    let list = build_submission_list(
        &snapshot.submissions,
        &meta,
        &snapshot.differentiation_tags,
        &query,
        ListOptions::default(),
    );

    println!("{}", serde_json::to_string_pretty(&list)?);
    Ok(())
}

fn parse_filter(category: Option<&str>, threshold: Option<f64>) -> Result<SubmissionListFilter> {
    let Some(category) = category else {
        return Ok(SubmissionListFilter::All);
    };

    let category_name = category.to_ascii_uppercase();
    if threshold.is_none() && VALUE_CATEGORIES.contains(&category_name.as_str()) {
        return Err(anyhow!("--threshold is required for {category_name}"));
    }
    let value = match threshold {
        Some(threshold) => json!({ "category": category_name, "threshold": threshold }),
        None => json!({ "category": category_name }),
    };
    serde_json::from_value(value).with_context(|| format!("Invalid category {category}"))
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut snapshot = None;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--snapshot" => {
                snapshot = Some(args.next().ok_or_else(|| anyhow!("--snapshot missing value"))?);
            }
            "--category" => {
                parsed.category =
                    Some(args.next().ok_or_else(|| anyhow!("--category missing value"))?);
            }
            "--threshold" => {
                let raw = args.next().ok_or_else(|| anyhow!("--threshold missing value"))?;
                let threshold: f64 =
                    raw.parse().with_context(|| format!("Invalid threshold {raw}"))?;
                if !threshold.is_finite() {
                    return Err(anyhow!("Threshold must be a finite number, got {raw}"));
                }
                parsed.threshold = Some(threshold);
            }
            "--search" => {
                parsed.search = args.next().ok_or_else(|| anyhow!("--search missing value"))?;
            }
            "--case-insensitive" => parsed.case_insensitive = true,
            "--sort" => {
                let raw = args.next().ok_or_else(|| anyhow!("--sort missing value"))?;
                parsed.sort = Some(
                    SubmissionSortOrder::parse(&raw)
                        .ok_or_else(|| anyhow!("Unknown sort order: {raw}"))?,
                );
            }
            _ => return Err(anyhow!("Unknown argument: {arg}")),
        }
    }

    parsed.snapshot = snapshot.ok_or_else(|| anyhow!("--snapshot is required"))?;
    Ok(parsed)
}
