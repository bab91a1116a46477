use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::eligibility;
use crate::models::{SavedScholarship, Scholarship, StatusSummary, UserProfile};
use crate::scoring::{self, RecommendPolicy};
use crate::search::{self, DEADLINE_WINDOW_DAYS};

pub fn summarize_saved(saved: &[SavedScholarship]) -> Vec<StatusSummary> {
    let mut summaries: Vec<StatusSummary> = Vec::new();

    for record in saved {
        match summaries.iter_mut().find(|summary| summary.status == record.status) {
            Some(summary) => summary.count += 1,
            None => summaries.push(StatusSummary {
                status: record.status,
                count: 1,
            }),
        }
    }

    summaries.sort_by(|a, b| b.count.cmp(&a.count));
    summaries
}

fn format_amount(scholarship: &Scholarship) -> String {
    format!(
        "{:.0} {} ({})",
        scholarship.amount.value,
        scholarship.amount.currency,
        scholarship.amount.kind.as_str()
    )
}

pub fn build_report(
    profile: Option<&UserProfile>,
    scholarships: &[Scholarship],
    saved: &[SavedScholarship],
    policy: RecommendPolicy,
    now: DateTime<Utc>,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Scholarship Match Report");
    let _ = writeln!(output, "Generated {}", now.format("%Y-%m-%d"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Profile");

    match profile {
        Some(profile) => {
            let academic = &profile.academic_info;
            let _ = writeln!(
                output,
                "- {} student in {}, GPA {:.2}",
                academic.study_level, academic.major, academic.gpa
            );
            if let Some(institution) = &academic.institution {
                let _ = writeln!(output, "- Institution: {institution}");
            }
            let _ = writeln!(output, "- Citizenship: {}", profile.personal_info.citizenship);
        }
        None => {
            let _ = writeln!(output, "No profile on file; showing featured scholarships.");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recommended Scholarships");

    let recommended = scoring::recommend_for(scholarships, profile, policy);
    if recommended.is_empty() {
        let _ = writeln!(output, "No scholarships match this profile.");
    } else {
        for entry in recommended.iter().take(10) {
            let scholarship = entry.scholarship;
            let verdict = match profile {
                Some(profile) => {
                    let failed = eligibility::failed_dimensions(scholarship, profile);
                    if failed.is_empty() {
                        "eligible".to_string()
                    } else {
                        let labels: Vec<&str> = failed.iter().map(|dimension| dimension.label()).collect();
                        format!("misses {}", labels.join(", "))
                    }
                }
                None => "featured".to_string(),
            };
            let _ = writeln!(
                output,
                "- {} by {}: {}% match, {} ({}), due {}",
                scholarship.name,
                scholarship.provider,
                entry.score,
                format_amount(scholarship),
                verdict,
                scholarship.deadline.format("%Y-%m-%d")
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Deadlines In The Next {DEADLINE_WINDOW_DAYS} Days");

    let mut upcoming: Vec<&Scholarship> = scholarships
        .iter()
        .filter(|scholarship| search::deadline_within(scholarship, now, DEADLINE_WINDOW_DAYS))
        .collect();
    upcoming.sort_by(|a, b| a.deadline.cmp(&b.deadline));

    if upcoming.is_empty() {
        let _ = writeln!(output, "No deadlines in this window.");
    } else {
        for scholarship in upcoming {
            let days_left = (scholarship.deadline - now).num_days();
            let _ = writeln!(
                output,
                "- {} closes {} ({} days left)",
                scholarship.name,
                scholarship.deadline.format("%Y-%m-%d"),
                days_left
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Saved Scholarships");

    if saved.is_empty() {
        let _ = writeln!(output, "Nothing saved yet.");
    } else {
        for summary in summarize_saved(saved) {
            let _ = writeln!(output, "### {} ({})", summary.status, summary.count);
            for record in saved.iter().filter(|record| record.status == summary.status) {
                let name = scholarships
                    .iter()
                    .find(|scholarship| scholarship.id == record.scholarship_id)
                    .map(|scholarship| scholarship.name.as_str())
                    .unwrap_or(record.scholarship_id.as_str());
                match &record.notes {
                    Some(notes) => {
                        let _ = writeln!(output, "- {name}: {notes}");
                    }
                    None => {
                        let _ = writeln!(output, "- {name}");
                    }
                }
            }
        }
    }

    output
}
