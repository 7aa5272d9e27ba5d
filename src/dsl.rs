//! Free functions building every test element.
//!
//! Import them all with `use jmeter_dsl::dsl::*;` and combine them with the
//! [`children!`](crate::children) macro. Containers validate their children
//! when built, hence the `Result` returns.

use std::time::Duration;

use crate::elements::assertions::DslResponseAssertion;
use crate::elements::configs::DslCsvDataSet;
use crate::elements::controllers::{DslSimpleController, DslTransactionController, ForLoopController};
use crate::elements::extractors::DslRegexExtractor;
use crate::elements::http::{DslHttpCache, DslHttpCookies, DslHttpSampler, HttpHeaders};
use crate::elements::listeners::{JtlWriter, ResponseFileSaver, ResultsTreeVisualizer};
use crate::elements::preprocessors::DslJsr223PreProcessor;
use crate::elements::samplers::{DslDummySampler, DslFlowControlAction};
use crate::elements::test_plan::DslTestPlan;
use crate::elements::thread_group::DslThreadGroup;
use crate::elements::timers::{DslConstantTimer, DslSynchronizingTimer, DslUniformRandomTimer};
use crate::elements::TestElement;
use crate::error::Result;
use crate::stages::Param;

pub fn test_plan(children: Vec<Box<dyn TestElement>>) -> Result<DslTestPlan> {
    DslTestPlan::new(children)
}

/// `threads` threads, each running its children `iterations` times.
pub fn thread_group(
    threads: impl Into<Param<u32>>,
    iterations: impl Into<Param<u32>>,
    children: Vec<Box<dyn TestElement>>,
) -> Result<DslThreadGroup> {
    DslThreadGroup::with_iterations(None, threads, iterations, children)
}

/// `threads` threads running their children for `duration`.
pub fn thread_group_for(
    threads: impl Into<Param<u32>>,
    duration: impl Into<Param<Duration>>,
    children: Vec<Box<dyn TestElement>>,
) -> Result<DslThreadGroup> {
    DslThreadGroup::with_duration(None, threads, duration, children)
}

/// Empty thread group, to be shaped with `ramp_to`, `hold_for` and
/// `hold_iterating`.
pub fn thread_group_named(name: Option<&str>) -> DslThreadGroup {
    DslThreadGroup::new(name)
}

pub fn dummy_sampler(response_body: &str) -> DslDummySampler {
    DslDummySampler::new(response_body)
}

pub fn dummy_sampler_named(name: &str, response_body: &str) -> DslDummySampler {
    DslDummySampler::named(Some(name), response_body)
}

pub fn http_sampler(url: &str) -> DslHttpSampler {
    DslHttpSampler::new(None, url)
}

pub fn http_sampler_named(name: &str, url: &str) -> DslHttpSampler {
    DslHttpSampler::new(Some(name), url)
}

pub fn http_headers() -> HttpHeaders {
    HttpHeaders::new()
}

pub fn http_cookies() -> DslHttpCookies {
    DslHttpCookies::new()
}

pub fn http_cache() -> DslHttpCache {
    DslHttpCache::new()
}

pub fn transaction(name: &str, children: Vec<Box<dyn TestElement>>) -> Result<DslTransactionController> {
    DslTransactionController::new(name, children)
}

pub fn simple_controller(children: Vec<Box<dyn TestElement>>) -> Result<DslSimpleController> {
    DslSimpleController::new(None, children)
}

/// `count` may be a literal or an expression such as `${ITERATIONS}`.
pub fn for_loop_controller(count: &str, children: Vec<Box<dyn TestElement>>) -> Result<ForLoopController> {
    ForLoopController::new(None, count, children)
}

pub fn constant_timer(duration: impl Into<Param<Duration>>) -> DslConstantTimer {
    DslConstantTimer::of(duration)
}

pub fn uniform_random_timer(minimum: Duration, maximum: Duration) -> DslUniformRandomTimer {
    DslUniformRandomTimer::new(minimum, maximum)
}

pub fn synchronizing_timer() -> DslSynchronizingTimer {
    DslSynchronizingTimer
}

pub fn thread_pause(duration: impl Into<Param<Duration>>) -> DslFlowControlAction {
    DslFlowControlAction::pause_thread(duration)
}

pub fn response_assertion() -> DslResponseAssertion {
    DslResponseAssertion::new(None)
}

pub fn regex_extractor(variable_name: &str, regex: &str) -> DslRegexExtractor {
    DslRegexExtractor::new(variable_name, regex)
}

pub fn csv_data_set(csv_file: &str) -> DslCsvDataSet {
    DslCsvDataSet::new(csv_file)
}

pub fn jsr223_pre_processor(script: &str) -> DslJsr223PreProcessor {
    DslJsr223PreProcessor::new(None, script)
}

/// Results file inside `directory`, named after the run unless renamed.
pub fn jtl_writer(directory: &str) -> JtlWriter {
    JtlWriter::new(directory, None)
}

pub fn response_file_saver(file_name_prefix: &str) -> ResponseFileSaver {
    ResponseFileSaver::new(file_name_prefix)
}

pub fn results_tree_visualizer() -> ResultsTreeVisualizer {
    ResultsTreeVisualizer::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::serializer::to_yaml_string;
    use crate::children;
    use crate::error::DslError;

    #[test]
    fn test_plan_from_free_functions() {
        let plan = test_plan(children![
            http_headers().header("X-Test", "1"),
            thread_group(2, 10, children![
                http_sampler("http://localhost").children(children![
                    response_assertion().contains_substrings(&["OK"]),
                    regex_extractor("ID", "id=(\\d+)"),
                ]).unwrap(),
                thread_pause(Duration::from_millis(500)),
            ]).unwrap(),
            jtl_writer("results"),
        ])
        .unwrap();
        let yaml = to_yaml_string(&plan).unwrap();
        assert!(yaml.starts_with("!testPlan"));
        for tag in [
            "!httpHeaders",
            "!threadGroup",
            "!httpSampler",
            "!responseAssertion",
            "!regexExtractor",
            "!threadPause",
            "!jtlWriter",
        ] {
            assert!(yaml.contains(tag), "missing {} in {}", tag, yaml);
        }
    }

    #[test]
    fn test_sampler_rejected_directly_under_plan() {
        let err = test_plan(children![dummy_sampler("ok")]).unwrap_err();
        assert!(matches!(err, DslError::UnsupportedChild { .. }));
    }

    #[test]
    fn test_controllers_accept_thread_group_children() {
        let tg = thread_group_for(1, Duration::from_secs(5), children![
            transaction("login", children![
                dummy_sampler("ok"),
                constant_timer(Duration::from_millis(100)),
            ]).unwrap(),
            for_loop_controller("3", children![simple_controller(children![
                dummy_sampler_named("inner", "ok"),
            ]).unwrap()]).unwrap(),
        ]);
        assert!(tg.is_ok());
    }
}
