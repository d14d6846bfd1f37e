pub mod events;
pub mod evidence;
pub mod form;
pub mod scenario;
pub mod state;

use anyhow::Result;
use colored::Colorize;
use thiserror::Error;
use uuid::Uuid;

pub use events::*;
pub use state::*;

use crate::driver::traits::BrowserDriver;
use crate::report::types::TestResults;
use crate::suite::evidence::EvidenceSink;
use crate::suite::form::ContactForm;
use crate::suite::scenario::Scenario;
use crate::utils::config::SuiteConfig;

/// How a scenario fails. Driver errors cover everything the browser session
/// itself reports, assertion and timeout variants carry the message shown
/// to the user.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("{0}")]
    Assertion(String),

    #[error("Element #{id} not present after {timeout_ms}ms")]
    ElementTimeout { id: String, timeout_ms: u64 },

    #[error(transparent)]
    Driver(#[from] anyhow::Error),
}

/// Resolve a browser session and run the scenario suite with it. A session
/// that cannot be constructed downgrades every scenario to skipped, the
/// absence of a browser is an infrastructure problem, not a test failure.
pub async fn run_suite(
    config: SuiteConfig,
    filter: Option<Scenario>,
    report_enabled: bool,
) -> Result<TestSummary> {
    let (driver, unavailable) = match crate::driver::resolve(&config).await {
        Ok(driver) => (Some(driver), None),
        Err(e) => {
            println!("{} Browser session unavailable: {}", "⚠".yellow(), e);
            (None, Some(format!("Browser session unavailable: {}", e)))
        }
    };

    let mut runner = SuiteRunner::new(driver, unavailable, config, filter, report_enabled);
    runner.run().await
}

pub struct SuiteRunner {
    driver: Option<Box<dyn BrowserDriver>>,
    unavailable: Option<String>,
    config: SuiteConfig,
    form: ContactForm,
    session: SuiteState,
    evidence: EvidenceSink,
    emitter: EventEmitter,
    filter: Option<Scenario>,
    report_enabled: bool,
}

impl SuiteRunner {
    pub fn new(
        driver: Option<Box<dyn BrowserDriver>>,
        unavailable: Option<String>,
        config: SuiteConfig,
        filter: Option<Scenario>,
        report_enabled: bool,
    ) -> Self {
        let (emitter, receiver) = EventEmitter::new();

        // Start console listener in background
        tokio::spawn(ConsoleEventListener::listen(receiver));

        let form = ContactForm::from_config(&config);
        let evidence = EvidenceSink::new(&config.output_dir);

        Self {
            driver,
            unavailable,
            config,
            form,
            session: SuiteState::new(&Uuid::new_v4().to_string()),
            evidence,
            emitter,
            filter,
            report_enabled,
        }
    }

    /// Subscribe to suite execution events
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    pub fn state(&self) -> &SuiteState {
        &self.session
    }

    pub async fn run(&mut self) -> Result<TestSummary> {
        self.session.start();
        self.emitter.emit(TestEvent::SessionStarted {
            session_id: self.session.session_id.clone(),
        });

        let scenarios: Vec<Scenario> = match self.filter {
            Some(scenario) => vec![scenario],
            None => Scenario::ALL.to_vec(),
        };

        for (index, scenario) in scenarios.iter().enumerate() {
            let mut scenario_state =
                ScenarioState::new(index, scenario.name(), scenario.description());

            self.emitter.emit(TestEvent::ScenarioStarted {
                index,
                name: scenario.name().to_string(),
            });

            match self.driver {
                None => {
                    let reason = self
                        .unavailable
                        .clone()
                        .unwrap_or_else(|| "Browser session unavailable".to_string());
                    scenario_state.skip(reason.clone());
                    self.emitter.emit(TestEvent::ScenarioSkipped { index, reason });
                }
                Some(ref driver) => {
                    scenario_state.start();

                    // One scenario failing never stops the next, each one
                    // re-navigates and stands alone.
                    match scenario
                        .run(driver.as_ref(), &self.form, &self.config, &self.evidence)
                        .await
                    {
                        Ok(()) => {
                            scenario_state.pass();
                            self.emitter.emit(TestEvent::ScenarioPassed {
                                index,
                                duration_ms: scenario_state.duration_ms.unwrap_or(0),
                            });
                        }
                        Err(e) => {
                            let error_msg = e.to_string();
                            scenario_state.fail(error_msg.clone());
                            self.emitter.emit(TestEvent::ScenarioFailed {
                                index,
                                error: error_msg,
                                duration_ms: scenario_state.duration_ms.unwrap_or(0),
                            });
                        }
                    }

                    scenario_state.evidence = self
                        .evidence
                        .drain_captured()
                        .iter()
                        .map(|p| p.display().to_string())
                        .collect();
                }
            }

            self.session.add_scenario(scenario_state);
        }

        self.finish().await
    }

    /// Finish the session, generate reports and tear the session down
    async fn finish(&mut self) -> Result<TestSummary> {
        self.session.finish();
        let summary = self.session.summary();

        self.emitter.emit(TestEvent::SessionFinished {
            summary: summary.clone(),
        });

        // Small delay to ensure SessionFinished is rendered before reports
        tokio::time::sleep(tokio::time::Duration::from_millis(200)).await;

        if self.report_enabled {
            let report_data = self.session.to_report();
            let results = TestResults {
                session_id: report_data.session_id.clone(),
                scenarios: report_data.scenarios,
                summary: report_data.summary,
                generated_at: chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            };

            std::fs::create_dir_all(&self.config.output_dir)?;
            let report_path = self.config.output_dir.join("test-results.json");
            let json = serde_json::to_string_pretty(&results)?;
            std::fs::write(&report_path, json)?;

            println!(
                "\n{} JSON report saved to: {}",
                "📄".to_string().blue(),
                report_path.display().to_string().cyan()
            );

            crate::report::junit::write_report(&results, &self.config.output_dir)?;
        }

        if let Some(ref driver) = self.driver {
            if let Err(e) = driver.close().await {
                log::warn!("Session teardown failed: {}", e);
            }
        }

        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    const FIRST: &str = "wpforms-2234-field_1";
    const LAST: &str = "wpforms-2234-field_1-last";
    const EMAIL: &str = "wpforms-2234-field_2";
    const MESSAGE: &str = "wpforms-2234-field_3";
    const SUBMIT: &str = "wpforms-submit-2234";

    const PAGE_IDS: [&str; 5] = [FIRST, LAST, EMAIL, MESSAGE, SUBMIT];

    fn test_config() -> (SuiteConfig, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SuiteConfig::default();
        config.output_dir = dir.path().to_path_buf();
        (config, dir)
    }

    #[tokio::test]
    async fn test_unavailable_session_skips_every_scenario() {
        let (config, _dir) = test_config();
        let mut runner = SuiteRunner::new(
            None,
            Some("Browser session unavailable: no browser found".to_string()),
            config,
            None,
            false,
        );

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.skipped, 4);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.passed, 0);

        for scenario in &runner.state().scenarios {
            assert!(matches!(
                scenario.status,
                ScenarioStatus::Skipped { ref reason } if reason.contains("no browser found")
            ));
        }
    }

    #[tokio::test]
    async fn test_full_sequence_passes_against_valid_form() {
        let (config, _dir) = test_config();
        let driver = MockDriver::with_validation(&PAGE_IDS, SUBMIT, &[FIRST, LAST, EMAIL]);
        let mut runner = SuiteRunner::new(Some(Box::new(driver)), None, config, None, false);

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 4);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.skipped, 0);
    }

    #[tokio::test]
    async fn test_run_emits_lifecycle_events() {
        let (config, _dir) = test_config();
        let driver = MockDriver::new(&PAGE_IDS, SUBMIT);
        let mut runner = SuiteRunner::new(
            Some(Box::new(driver)),
            None,
            config,
            Some(Scenario::PageLoad),
            false,
        );
        let mut receiver = runner.subscribe();

        runner.run().await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = receiver.try_recv() {
            events.push(event);
        }

        assert_eq!(events.len(), 4);
        assert!(matches!(events[0], TestEvent::SessionStarted { .. }));
        assert!(matches!(events[1], TestEvent::ScenarioStarted { index: 0, .. }));
        assert!(matches!(events[2], TestEvent::ScenarioPassed { .. }));
        assert!(matches!(events[3], TestEvent::SessionFinished { .. }));
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_later_scenarios() {
        let (config, _dir) = test_config();
        // Email input never renders, which breaks every form interaction
        let driver = MockDriver::new(&[FIRST, LAST, MESSAGE, SUBMIT], SUBMIT);
        let mut runner = SuiteRunner::new(Some(Box::new(driver)), None, config, None, false);

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.total, 4);
        assert_eq!(summary.passed, 1);
        assert_eq!(summary.failed, 3);

        // Every scenario was attempted, none left pending
        for scenario in &runner.state().scenarios {
            assert!(!matches!(scenario.status, ScenarioStatus::Pending));
        }
    }

    #[tokio::test]
    async fn test_repeat_run_is_idempotent() {
        let (config, _dir) = test_config();

        let mut first_runner = SuiteRunner::new(
            Some(Box::new(MockDriver::new(&PAGE_IDS, SUBMIT))),
            None,
            config.clone(),
            Some(Scenario::FieldPresence),
            false,
        );
        let first = first_runner.run().await.unwrap();

        let mut second_runner = SuiteRunner::new(
            Some(Box::new(MockDriver::new(&PAGE_IDS, SUBMIT))),
            None,
            config,
            Some(Scenario::FieldPresence),
            false,
        );
        let second = second_runner.run().await.unwrap();

        assert_eq!(first.passed, second.passed);
        assert_eq!(first.failed, second.failed);
        assert_eq!(first.skipped, second.skipped);
    }

    #[tokio::test]
    async fn test_reports_written_when_enabled() {
        let (config, dir) = test_config();
        let driver = MockDriver::new(&PAGE_IDS, SUBMIT);
        let mut runner = SuiteRunner::new(
            Some(Box::new(driver)),
            None,
            config,
            Some(Scenario::PageLoad),
            true,
        );

        let summary = runner.run().await.unwrap();
        assert_eq!(summary.passed, 1);

        let json_path = dir.path().join("test-results.json");
        assert!(json_path.exists());
        let parsed: TestResults =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed.scenarios.len(), 1);
        assert_eq!(parsed.scenarios[0].name, "page_load");

        assert!(dir.path().join("junit.xml").exists());
    }
}
