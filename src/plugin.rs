//! Plugin runs: argument checks, one search cycle, and the status to report.
//!
//! The service is built by a caller-supplied `connect` closure so nothing
//! remote is touched until the arguments have been validated.

use log::{error, info};
use std::future::Future;

use crate::config::{CheckCli, MetricCli, SearchRequest};
use crate::error::Result;
use crate::executor::Sleeper;
use crate::metric::{default_scheme, emit, Clock};
use crate::result_count;
use crate::service::SearchService;
use crate::status::{AlertStatus, PluginOutput};
use crate::threshold::{evaluate, Direction, Evaluation, Thresholds};

pub const CHECK_PLUGIN: &str = "CheckSplunkResultCount";
pub const METRIC_PLUGIN: &str = "MetricSplunkResultCount";

pub async fn run_check<S, F, Fut, Z>(cli: &CheckCli, connect: F, sleeper: Z) -> Result<Evaluation>
where
    S: SearchService,
    F: FnOnce(SearchRequest) -> Fut,
    Fut: Future<Output = Result<S>>,
    Z: Sleeper,
{
    // Reject bad arguments before touching Splunk
    let thresholds = Thresholds {
        warning: cli.warn,
        critical: cli.crit,
        direction: cli.compmethod.parse::<Direction>()?,
    };
    let request = cli.connection.search_request()?;
    info!(
        "Checking '{}' on {}:{} ({} warn={} crit={})",
        request.job_name,
        request.host,
        request.port,
        thresholds.direction,
        thresholds.warning,
        thresholds.critical
    );

    let service = connect(request.clone()).await?;
    let count = result_count(&service, &request, sleeper).await?;
    evaluate(count, &thresholds)
}

pub fn check_output(result: Result<Evaluation>) -> PluginOutput {
    match result {
        Ok(evaluation) => PluginOutput::new(CHECK_PLUGIN, evaluation.status, evaluation.message),
        Err(e) => {
            error!("{}", e);
            PluginOutput::unknown(CHECK_PLUGIN, &e)
        }
    }
}

/// Returns the metric line to print; the caller writes it before the status.
pub async fn run_metric<S, F, Fut, Z, C>(
    cli: &MetricCli,
    connect: F,
    sleeper: Z,
    clock: &C,
) -> Result<String>
where
    S: SearchService,
    F: FnOnce(SearchRequest) -> Fut,
    Fut: Future<Output = Result<S>>,
    Z: Sleeper,
    C: Clock,
{
    let request = cli.connection.search_request()?;
    let scheme = cli.scheme.clone().unwrap_or_else(default_scheme);
    info!(
        "Measuring '{}' on {}:{} under {}",
        request.job_name, request.host, request.port, scheme
    );

    let service = connect(request.clone()).await?;
    let count = result_count(&service, &request, sleeper).await?;
    Ok(emit(&scheme, &request.job_name, count, clock))
}

/// A successful metric run reports OK silently once the line is out.
pub fn metric_output(result: Result<String>) -> (Option<String>, PluginOutput) {
    match result {
        Ok(line) => (Some(line), PluginOutput::silent(METRIC_PLUGIN, AlertStatus::Ok)),
        Err(e) => {
            error!("{}", e);
            (None, PluginOutput::unknown(METRIC_PLUGIN, &e))
        }
    }
}
