use std::time::Duration;

use chorus_lib::dispatch::{ActionError, Dispatcher};
use chorus_lib::execute::{
  BuildError, BuildEvent, CommandKind, ExecuteConfig, ExecuteError, Interrupt, Orchestrator, Silent,
};
use chorus_lib::staleness::Staleness;

use super::common::{Project, started_commands, started_targets};

const PROG: &str = r#"
variables:
  CC: cat
targets:
  prog:
    deps: [a.o, b.o]
    cmds:
      - "${CC} ${^} > ${@}"
      - "echo ${@} >> log"
  a.o:
    deps: [a.c]
    cmds:
      - "cp ${<} ${@}"
      - "echo ${@} >> log"
  b.o:
    deps: [b.c]
    cmds:
      - "cp ${<} ${@}"
      - "echo ${@} >> log"
"#;

fn prog_project() -> Project {
  let project = Project::new(PROG);
  project.write("a.c", "a\n");
  project.write("b.c", "b\n");
  project.age("a.c", Duration::from_secs(120));
  project.age("b.c", Duration::from_secs(120));
  project
}

// =============================================================================
// Incremental builds
// =============================================================================

#[tokio::test]
async fn clean_build_then_no_op_then_partial_rebuild() {
  let project = prog_project();

  let (result, events) = project.build(&["prog"]).await;
  assert_eq!(result.unwrap().built, vec!["a.o", "b.o", "prog"]);
  assert_eq!(
    started_commands(&events),
    vec!["cp a.c a.o", "echo a.o >> log", "cp b.c b.o", "echo b.o >> log", "cat a.o b.o > prog", "echo prog >> log"]
  );

  let (result, events) = project.build(&["prog"]).await;
  let summary = result.unwrap();
  assert!(summary.built.is_empty());
  assert_eq!(summary.up_to_date, vec!["a.o", "b.o", "prog"]);
  assert!(started_commands(&events).is_empty());

  for product in ["a.o", "b.o", "prog"] {
    project.age(product, Duration::from_secs(60));
  }
  project.write("b.c", "b2\n");

  let (result, events) = project.build(&["prog"]).await;
  assert_eq!(result.unwrap().built, vec!["b.o", "prog"]);
  assert!(events.contains(&BuildEvent::TargetStarted {
    target: "b.o".to_string(),
    reason: Staleness::DependencyNewer("b.c".to_string()),
  }));
  assert!(events.contains(&BuildEvent::TargetStarted {
    target: "prog".to_string(),
    reason: Staleness::DependencyNewer("b.o".to_string()),
  }));
  assert_eq!(project.log(), vec!["a.o", "b.o", "prog", "b.o", "prog"]);
  assert_eq!(std::fs::read_to_string(project.root().join("prog")).unwrap(), "a\nb2\n");
}

#[tokio::test]
async fn each_target_runs_at_most_once_per_run() {
  let project = Project::new(
    r#"
targets:
  all:
    deps: [app, tests, lib]
    cmds: ["echo all >> log"]
  app:
    deps: [lib]
    phony: true
    cmds: ["echo app >> log"]
  tests:
    deps: [lib, app]
    phony: true
    cmds: ["echo tests >> log"]
  lib:
    phony: true
    cmds: ["echo lib >> log"]
"#,
  );

  let (result, events) = project.build(&["all", "lib", "app"]).await;

  result.unwrap();
  assert_eq!(project.log(), vec!["lib", "app", "tests", "all"]);
  assert_eq!(started_targets(&events), vec!["lib", "app", "tests", "all"]);
}

#[tokio::test]
async fn events_for_one_target_are_ordered() {
  let project = Project::new("targets:\n  _t:\n    cmds: [\"true\"]\n");

  let (result, events) = project.build(&["_t"]).await;
  result.unwrap();

  assert_eq!(events.len(), 5);
  assert_eq!(
    events[0],
    BuildEvent::TargetStarted {
      target: "_t".to_string(),
      reason: Staleness::AlwaysStale,
    }
  );
  assert_eq!(
    events[1],
    BuildEvent::CommandStarted {
      target: "_t".to_string(),
      command: "true".to_string(),
      kind: CommandKind::Shell,
    }
  );
  assert!(matches!(events[2], BuildEvent::CommandSucceeded { .. }));
  assert_eq!(
    events[3],
    BuildEvent::TargetFinished {
      target: "_t".to_string()
    }
  );
  assert!(matches!(events[4], BuildEvent::RunFinished { .. }));
}

// =============================================================================
// Failures
// =============================================================================

#[tokio::test]
async fn failure_in_second_of_three_commands() {
  let project = Project::new(
    r#"
targets:
  all:
    deps: [step]
    cmds: ["echo all >> log"]
  step:
    cmds:
      - "echo one >> log"
      - "exit 7"
      - "echo three >> log"
"#,
  );

  let (result, events) = project.build(&["all"]).await;

  match result {
    Err(BuildError::Command {
      target,
      source: ExecuteError::CmdFailed { cmd, code },
    }) => {
      assert_eq!(target, "step");
      assert_eq!(cmd, "exit 7");
      assert_eq!(code, Some(7));
    }
    other => panic!("expected command failure, got {other:?}"),
  }
  assert_eq!(project.log(), vec!["one"]);
  assert!(!events.iter().any(|e| matches!(e, BuildEvent::TargetFinished { .. })));
  assert!(!started_targets(&events).contains(&"all"));
}

#[tokio::test]
async fn earlier_targets_stay_built_after_failure() {
  let project = Project::new(
    r#"
targets:
  all:
    deps: [good, bad]
  good:
    cmds: ["touch good"]
  bad:
    cmds: ["false"]
"#,
  );

  let (result, _) = project.build(&["all"]).await;

  assert!(matches!(result, Err(BuildError::Command { ref target, .. }) if target == "bad"));
  assert!(project.root().join("good").exists());
}

// =============================================================================
// Internal commands
// =============================================================================

#[tokio::test]
async fn header_actions_through_build_file() {
  let project = Project::new(
    r#"
targets:
  firmware:
    phony: true
    cmds:
      - "internal: load_nvm apps.txt"
      - "cp core/kernel/nvm/nvm.h patched.h"
      - "internal: restore_nvm"
"#,
  );
  project.write("core/kernel/nvm/nvm.h", "static const char apps[] = \"\";\n");
  project.write("apps.txt", "one\ntwo\n");

  let (result, events) = project.build(&["firmware"]).await;

  result.unwrap();
  assert_eq!(
    std::fs::read_to_string(project.root().join("patched.h")).unwrap(),
    "static const char apps[] = \"one \\n\" \"two\";\n"
  );
  assert_eq!(
    std::fs::read_to_string(project.root().join("core/kernel/nvm/nvm.h")).unwrap(),
    "static const char apps[] = \"\";\n"
  );
  let internal: Vec<_> = events
    .iter()
    .filter_map(|e| match e {
      BuildEvent::CommandSucceeded {
        command,
        kind: CommandKind::Internal,
        ..
      } => Some(command.as_str()),
      _ => None,
    })
    .collect();
  assert_eq!(internal, vec!["load_nvm apps.txt", "restore_nvm"]);
}

#[tokio::test]
async fn custom_action_registry() {
  let project = Project::new("targets:\n  _t:\n    cmds: [\"internal: fail loudly\"]\n");
  let mut dispatcher = Dispatcher::new();
  dispatcher.register("fail", |args: &str, _: &std::path::Path| -> Result<(), ActionError> {
    Err(ActionError::Unknown(args.to_string()))
  });

  let result = Orchestrator::new(&project.config, &dispatcher, ExecuteConfig::new(project.root()), &mut Silent)
    .run(&["_t"])
    .await;

  assert!(matches!(
    result,
    Err(BuildError::Action { ref command, .. }) if command == "fail loudly"
  ));
}

// =============================================================================
// Interrupts
// =============================================================================

#[tokio::test]
async fn interrupt_stops_running_command_and_later_targets() {
  let project = Project::new(
    r#"
targets:
  all:
    deps: [slow]
    cmds: ["echo all >> log"]
  slow:
    phony: true
    cmds:
      - "echo start >> log"
      - "sleep 30"
      - "echo never >> log"
"#,
  );
  let dispatcher = Dispatcher::builtin();
  let (handle, interrupt) = Interrupt::new();

  tokio::spawn(async move {
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.trigger();
  });

  let started = std::time::Instant::now();
  let result = Orchestrator::new(&project.config, &dispatcher, ExecuteConfig::new(project.root()), &mut Silent)
    .with_interrupt(interrupt)
    .run(&["all"])
    .await;

  assert!(matches!(result, Err(BuildError::Interrupted)));
  assert!(started.elapsed() < Duration::from_secs(10));
  assert_eq!(project.log(), vec!["start"]);
}
