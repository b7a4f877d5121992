#![cfg(unix)]

mod common;
use crate::common::{init_tracing, scheduler, sh, start, wait_for_pid};

use std::error::Error;
use std::time::{Duration, Instant};

use sqltools::connection::Invocation;
use sqltools::exec::{CommandOutcome, RunState, Watchdog, TIMEOUT_ADVISORY};
use sqltools::history::HistoryBuffer;
use sqltools_test_utils::builders::{shell_descriptor, DescriptorBuilder};
use sqltools_test_utils::recording::{OutcomeRecorder, RecordingNotifier};

type TestResult = Result<(), Box<dyn Error>>;

#[tokio::test]
async fn watchdog_kills_a_command_that_outlives_the_timeout() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_millis(200), 10, &notifier);

    let started = Instant::now();
    let handle = sched.run(sh("exec sleep 5", "select pg_sleep(5)"), recorder.callback());
    let pid = wait_for_pid(&handle).await;

    assert_eq!(recorder.next().await, CommandOutcome::Killed);
    handle.wait().await;

    assert!(started.elapsed() < Duration::from_secs(4), "kill took too long");
    assert_eq!(notifier.messages(), vec![TIMEOUT_ADVISORY.to_string()]);

    let path = handle.temp_path().ok_or("temp path was not recorded")?;
    assert!(!path.exists());

    if cfg!(target_os = "linux") {
        assert!(!std::path::Path::new(&format!("/proc/{pid}")).exists());
    }
    Ok(())
}

#[tokio::test]
async fn fast_command_finishes_before_the_watchdog() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_millis(300), 10, &notifier);

    let handle = sched.run(sh("echo ok", "select 1"), recorder.callback());
    assert_eq!(recorder.next().await, CommandOutcome::Success("ok\n".to_string()));
    handle.wait().await;

    // Past the deadline: the watchdog must have disarmed.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(notifier.messages().is_empty());
    assert!(recorder.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn watchdog_leaves_an_exited_cli_alone_while_its_output_drains() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_millis(200), 10, &notifier);

    // The CLI exits at once; its background child keeps stdout open past
    // the deadline.
    let started = Instant::now();
    let handle = sched.run(sh("(sleep 3 &); echo done", "select 1"), recorder.callback());

    assert_eq!(recorder.next().await, CommandOutcome::Success("done\n".to_string()));
    handle.wait().await;
    assert!(started.elapsed() < Duration::from_secs(2));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(notifier.messages().is_empty(), "advisory shown for a finished command");
    assert!(recorder.drain().is_empty());
    Ok(())
}

#[tokio::test]
async fn disarmed_watchdog_never_stops_the_command() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();

    let handle = start(sh("exec sleep 5", "select 1"), &notifier, &recorder);
    let watchdog = Watchdog::arm(Duration::from_millis(100), handle.clone());
    watchdog.disarm();

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.state(), RunState::Running);
    assert!(notifier.messages().is_empty());

    assert!(handle.stop());
    assert_eq!(recorder.next().await, CommandOutcome::Killed);
    handle.wait().await;
    Ok(())
}

#[tokio::test]
async fn watchdog_task_ends_with_its_command() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();

    let handle = start(
        Invocation::new(vec!["cat".to_string()], "select 1"),
        &notifier,
        &recorder,
    );
    let watchdog = Watchdog::arm(Duration::from_secs(30), handle.clone());

    assert_eq!(recorder.next().await, CommandOutcome::Success("select 1".to_string()));
    handle.wait().await;

    for _ in 0..100 {
        if watchdog.is_finished() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(watchdog.is_finished(), "watchdog outlived its command");
    assert!(notifier.messages().is_empty());
    Ok(())
}

#[tokio::test]
async fn list_tables_parses_the_second_pipe_field() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::<Vec<String>>::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);

    let conn = shell_descriptor(r"printf '|public.users|\n(2 rows)\n|public.orders|\n'")
        .query("desc", "select table_name from tables", &[])
        .build();

    sched.list_tables(&conn, recorder.callback())?;

    assert_eq!(
        recorder.next().await,
        CommandOutcome::Success(vec!["public.users".to_string(), "public.orders".to_string()])
    );
    assert!(sched.history().is_empty(), "listing must not touch history");
    Ok(())
}

#[tokio::test]
async fn list_columns_forwards_cli_errors() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::<Vec<String>>::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);

    let conn = shell_descriptor("echo 'permission denied' >&2")
        .query("columns", "select column_name from columns", &[])
        .build();

    sched.list_columns(&conn, recorder.callback())?;

    assert_eq!(
        recorder.next().await,
        CommandOutcome::ExternalError("permission denied\n".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn query_options_are_inserted_after_the_executable() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);

    // `sh -e -c 'cat'`: the option must come before the args template.
    let conn = shell_descriptor("cat")
        .query("desc table", "describe %s", &["-e"])
        .build();

    sched.describe_table(&conn, "users", recorder.callback())?;

    assert_eq!(
        recorder.next().await,
        CommandOutcome::Success("describe users".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn table_records_renders_table_and_limit() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);

    let conn = DescriptorBuilder::new("cat")
        .rows_limit(25)
        .query("show records", "select * from {0} limit {1}", &[])
        .build();

    sched.table_records(&conn, "orders", recorder.callback())?;

    assert_eq!(
        recorder.next().await,
        CommandOutcome::Success("select * from orders limit 25".to_string())
    );
    Ok(())
}

#[tokio::test]
async fn execute_prepends_before_queries_and_records_history() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);

    let conn = DescriptorBuilder::new("cat")
        .before("set search_path to app;")
        .build();

    sched.execute(
        &conn,
        vec!["select 1;".to_string(), "select 2;".to_string()],
        None,
        recorder.callback(),
    )?;

    let expected = "set search_path to app;\nselect 1;\nselect 2;";
    assert_eq!(
        recorder.next().await,
        CommandOutcome::Success(expected.to_string())
    );
    assert_eq!(sched.history().entries(), vec![expected.to_string()]);
    Ok(())
}

#[tokio::test]
async fn execute_unescapes_quotes_for_listed_extensions() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);
    let conn = DescriptorBuilder::new("cat").build();

    let query = r#"select \"name\" from users where id = \'1\'"#.to_string();

    sched.execute(&conn, vec![query.clone()], Some("php".to_string()), recorder.callback())?;
    assert_eq!(
        recorder.next().await,
        CommandOutcome::Success(r#"select "name" from users where id = '1'"#.to_string())
    );

    sched.execute(&conn, vec![query.clone()], Some("sql".to_string()), recorder.callback())?;
    assert_eq!(recorder.next().await, CommandOutcome::Success(query));
    Ok(())
}

#[tokio::test]
async fn missing_query_template_fails_before_anything_runs() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let recorder = OutcomeRecorder::<Vec<String>>::new();
    let sched = scheduler(Duration::from_secs(5), 10, &notifier);
    let conn = DescriptorBuilder::new("cat").build();

    let err = sched
        .list_tables(&conn, recorder.callback())
        .err()
        .ok_or("expected an error")?;
    assert!(err.to_string().contains("'desc'"), "unexpected error: {err}");
    Ok(())
}

#[tokio::test]
async fn concurrent_executions_all_land_in_history() -> TestResult {
    init_tracing();
    let notifier = RecordingNotifier::new();
    let mut recorder = OutcomeRecorder::new();
    let sched = scheduler(Duration::from_secs(5), 100, &notifier);
    let conn = DescriptorBuilder::new("cat").build();

    let mut handles = Vec::new();
    for i in 0..20 {
        handles.push(sched.execute(
            &conn,
            vec![format!("select {i};")],
            None,
            recorder.callback(),
        )?);
    }
    for handle in &handles {
        handle.wait().await;
    }

    assert_eq!(recorder.drain().len(), 20);
    let history: HistoryBuffer = sched.history().clone();
    assert_eq!(history.len(), 20);
    for i in 0..20 {
        assert!(history.entries().contains(&format!("select {i};")));
    }
    Ok(())
}
