use std::fmt;

use serde::Serialize;
use serde_json::Value;
use slipway_core::ResultStatus;

/// Why a task is being diagnosed.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureCause {
    /// The service reported the task terminated unsuccessfully.
    RemoteFailure,
    /// The local time budget ran out with the task last seen running.
    TimedOut,
}

impl FailureCause {
    pub fn describe(&self) -> &'static str {
        match self {
            Self::RemoteFailure => "has failed",
            Self::TimedOut => "has timed out",
        }
    }
}

/// One diagnostic emission, in report order.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportEntry {
    /// Heads the report: the failed or timed-out parent task, with its
    /// record exactly as the service returned it.
    Summary {
        action: String,
        cause: FailureCause,
        record: Value,
    },
    /// A sub-task of the failed parent, with its result state.
    Subtask {
        task_id: String,
        action: String,
        result: ResultStatus,
    },
    /// A step message flagged as an error, payload verbatim.
    FailedStep { message: Value },
    /// A sub-task whose message stream held no flagged step.
    NoFailedSteps { task_id: String },
    /// Diagnosis could not finish; entries above it are all that could be
    /// gathered.
    Incomplete { detail: String },
}

/// Ordered diagnostic report for a failed or timed-out task.
///
/// Rendering is deterministic: the same entries always produce the same
/// text, with JSON payloads printed with sorted keys.
#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FailureReport {
    entries: Vec<ReportEntry>,
}

impl FailureReport {
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    pub(crate) fn push(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }

    /// Detail of the inconsistency that cut diagnosis short, if any.
    pub fn incomplete(&self) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            ReportEntry::Incomplete { detail } => Some(detail.as_str()),
            _ => None,
        })
    }

    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            match entry {
                ReportEntry::Summary {
                    action,
                    cause,
                    record,
                } => {
                    writeln!(f, "{} task {}", action, cause.describe())?;
                    writeln!(f, "{}", pretty(record))?;
                }
                ReportEntry::Subtask {
                    task_id,
                    action,
                    result,
                } => {
                    writeln!(
                        f,
                        "{} subtask {} is in {} state",
                        action,
                        task_id,
                        result.as_str()
                    )?;
                }
                ReportEntry::FailedStep { message } => {
                    writeln!(f, "{}", pretty(message))?;
                }
                ReportEntry::NoFailedSteps { task_id } => {
                    writeln!(f, "No failed step detected for subtask {}", task_id)?;
                }
                ReportEntry::Incomplete { detail } => {
                    writeln!(f, "Diagnosis incomplete: {}", detail)?;
                }
            }
        }
        Ok(())
    }
}

// serde_json's default map keeps keys sorted, so this is stable across
// renderings of the same report.
fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_report() -> FailureReport {
        let mut report = FailureReport::default();
        report.push(ReportEntry::Summary {
            action: "deploy_nodes".to_string(),
            cause: FailureCause::RemoteFailure,
            record: json!({"task_id": "t-1", "status": "terminated"}),
        });
        report.push(ReportEntry::Subtask {
            task_id: "t-2".to_string(),
            action: "apply_node_storage".to_string(),
            result: ResultStatus::Failure,
        });
        report.push(ReportEntry::FailedStep {
            message: json!({"error": true, "message": "Disk sda not found"}),
        });
        report
    }

    #[test]
    fn test_summary_names_action_and_cause() {
        let rendered = sample_report().render();
        assert!(rendered.contains("deploy_nodes task has failed"));
    }

    #[test]
    fn test_timeout_summary_wording_differs() {
        let mut report = FailureReport::default();
        report.push(ReportEntry::Summary {
            action: "deploy_nodes".to_string(),
            cause: FailureCause::TimedOut,
            record: json!({}),
        });
        assert!(report.render().contains("deploy_nodes task has timed out"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let report = sample_report();
        assert_eq!(report.render(), report.render());
    }

    #[test]
    fn test_incomplete_marker_is_exposed() {
        let mut report = sample_report();
        assert!(report.incomplete().is_none());
        report.push(ReportEntry::Incomplete {
            detail: "subtask t-3 missing from inventory snapshot".to_string(),
        });
        assert_eq!(
            report.incomplete(),
            Some("subtask t-3 missing from inventory snapshot")
        );
        assert!(report.render().contains("Diagnosis incomplete"));
    }

    #[test]
    fn test_step_payload_rendered_verbatim() {
        let rendered = sample_report().render();
        assert!(rendered.contains("Disk sda not found"));
    }
}
