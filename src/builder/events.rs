//! Build event types for JSON output.
//!
//! With `--json`, every step of a run is reported as one JSON object per
//! line on stdout. Events are tagged by `reason`:
//!
//! - `build-plan`: the packages about to be built
//! - `dependency-graph`: the resolved dependency edges (`foundry plan --graph`)
//! - `package-step`: one export/build/upload finished (or would run, in a
//!   dry run)
//! - `build-finished`: the run is over
//!
//! New fields may be added; existing fields are not renamed or removed.

use serde::Serialize;

/// An event emitted while executing a plan.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "reason")]
pub enum BuildEvent {
    #[serde(rename = "build-plan")]
    Plan {
        /// Qualified references, in build order
        packages: Vec<String>,
        /// Already-built packages that were skipped
        cached: Vec<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        upload_remote: Option<String>,
    },

    #[serde(rename = "dependency-graph")]
    Graph { edges: Vec<GraphEdge> },

    #[serde(rename = "package-step")]
    Step {
        package: String,
        /// `export`, `build` or `upload`
        step: String,
        success: bool,
        /// The command line, present for dry runs
        #[serde(skip_serializing_if = "Option::is_none")]
        command: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    #[serde(rename = "build-finished")]
    Finished {
        success: bool,
        duration_ms: u64,
        built: u64,
        uploaded: u64,
    },
}

/// One edge of the dependency graph, as qualified references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GraphEdge {
    pub dependency: String,
    pub dependent: String,
}

impl BuildEvent {
    /// A step that ran (or would run) successfully.
    pub fn step_ok(package: impl ToString, step: &str, command: Option<String>) -> Self {
        BuildEvent::Step {
            package: package.to_string(),
            step: step.to_string(),
            success: true,
            command,
            message: None,
        }
    }

    /// A step that failed.
    pub fn step_failed(package: impl ToString, step: &str, message: impl Into<String>) -> Self {
        BuildEvent::Step {
            package: package.to_string(),
            step: step.to_string(),
            success: false,
            command: None,
            message: Some(message.into()),
        }
    }

    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(event: &BuildEvent) -> String {
        serde_json::to_string(event).unwrap()
    }

    #[test]
    fn test_plan_serialization() {
        let event = BuildEvent::Plan {
            packages: vec!["libbar/1.0@foundry/stable".to_string()],
            cached: vec![],
            upload_remote: None,
        };
        let json = encode(&event);
        assert!(json.contains("\"reason\":\"build-plan\""));
        assert!(json.contains("libbar/1.0@foundry/stable"));
        assert!(!json.contains("upload_remote"));
    }

    #[test]
    fn test_graph_serialization() {
        let event = BuildEvent::Graph {
            edges: vec![GraphEdge {
                dependency: "libbar/1.0@foundry/stable".to_string(),
                dependent: "libfoo/1.0@foundry/stable".to_string(),
            }],
        };
        let value = event.to_value();
        assert_eq!(value["reason"], "dependency-graph");
        assert_eq!(value["edges"][0]["dependency"], "libbar/1.0@foundry/stable");
        assert_eq!(value["edges"][0]["dependent"], "libfoo/1.0@foundry/stable");
    }

    #[test]
    fn test_step_serialization() {
        let json = encode(&BuildEvent::step_ok("libfoo/1.0@foundry/stable", "build", None));
        assert!(json.contains("\"reason\":\"package-step\""));
        assert!(json.contains("\"step\":\"build\""));
        assert!(json.contains("\"success\":true"));
        assert!(!json.contains("command"));

        let json = encode(&BuildEvent::step_failed(
            "libfoo/1.0@foundry/stable",
            "upload",
            "refused",
        ));
        assert!(json.contains("\"success\":false"));
        assert!(json.contains("\"message\":\"refused\""));
    }

    #[test]
    fn test_finished_serialization() {
        let event = BuildEvent::Finished {
            success: true,
            duration_ms: 2340,
            built: 2,
            uploaded: 0,
        };
        let value = event.to_value();
        assert_eq!(value["reason"], "build-finished");
        assert_eq!(value["duration_ms"], 2340);
        assert_eq!(value["built"], 2);
    }
}
