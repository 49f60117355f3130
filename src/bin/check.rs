use splunk_result_count::api::SplunkClient;
use splunk_result_count::config::{parse_cli, CheckCli};
use splunk_result_count::executor::TokioSleeper;
use splunk_result_count::logging;
use splunk_result_count::plugin::{check_output, run_check, CHECK_PLUGIN};
use std::process::ExitCode;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match parse_cli::<CheckCli>(CHECK_PLUGIN) {
        Ok(cli) => cli,
        Err(code) => return code,
    };
    let _ = logging::init(cli.connection.verbose, cli.connection.log_file.as_deref());

    let result = run_check(
        &cli,
        |request| async move { SplunkClient::connect(&request).await },
        TokioSleeper,
    )
    .await;
    check_output(result).print_and_exit()
}
