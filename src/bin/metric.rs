use splunk_result_count::api::SplunkClient;
use splunk_result_count::config::{parse_cli, MetricCli};
use splunk_result_count::executor::TokioSleeper;
use splunk_result_count::logging;
use splunk_result_count::metric::SystemClock;
use splunk_result_count::plugin::{metric_output, run_metric, METRIC_PLUGIN};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_cli::<MetricCli>(METRIC_PLUGIN) {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let _ = logging::init(cli.connection.verbose, cli.connection.log_file.as_deref());

    let result = run_metric(
        &cli,
        |request| async move { SplunkClient::connect(&request).await },
        TokioSleeper,
        &SystemClock,
    )
    .await;

    let (line, output) = metric_output(result);
    if let Some(line) = line {
        println!("{}", line);
    }
    output.print_and_exit()
}
