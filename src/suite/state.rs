use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Scenario execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
}

/// State for a single scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub status: ScenarioStatus,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub evidence: Vec<String>,
}

impl ScenarioState {
    pub fn new(index: usize, name: &str, description: &str) -> Self {
        Self {
            index,
            name: name.to_string(),
            description: description.to_string(),
            status: ScenarioStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            evidence: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(ScenarioStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(ScenarioStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = ScenarioStatus::Skipped { reason };
    }

    fn finish(&mut self, status: ScenarioStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> ScenarioStateReport {
        ScenarioStateReport {
            index: self.index,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
            evidence: self.evidence.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioStateReport {
    pub index: usize,
    pub name: String,
    pub description: String,
    pub status: ScenarioStatus,
    pub duration_ms: Option<u64>,
    pub evidence: Vec<String>,
}

/// Global state for one suite run
#[derive(Debug, Clone)]
pub struct SuiteState {
    pub session_id: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl SuiteState {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> TestSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;

        for scenario in &self.scenarios {
            match scenario.status {
                ScenarioStatus::Passed => passed += 1,
                ScenarioStatus::Failed { .. } => failed += 1,
                ScenarioStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        TestSummary {
            session_id: self.session_id.clone(),
            total: self.scenarios.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> SuiteReport {
        SuiteReport {
            session_id: self.session_id.clone(),
            scenarios: self.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestSummary {
    pub session_id: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuiteReport {
    pub session_id: String,
    pub scenarios: Vec<ScenarioStateReport>,
    pub summary: TestSummary,
}
