use chorus_lib::execute::BuildError;
use chorus_lib::graph::GraphError;

use super::common::{Project, started_commands};

#[tokio::test]
async fn cycle_runs_nothing() {
  let project = Project::new(
    r#"
targets:
  first:
    phony: true
    cmds: ["echo first >> log"]
  x:
    deps: [y]
    cmds: ["echo x >> log"]
  y:
    deps: [z]
    cmds: ["echo y >> log"]
  z:
    deps: [x]
    cmds: ["echo z >> log"]
"#,
  );

  let (result, events) = project.build(&["first", "x"]).await;

  match result {
    Err(BuildError::Graph(GraphError::Cycle { chain })) => assert_eq!(chain, vec!["x", "y", "z", "x"]),
    other => panic!("expected cycle, got {other:?}"),
  }
  assert!(events.is_empty());
  assert!(project.log().is_empty());
}

#[tokio::test]
async fn undefined_request_runs_nothing() {
  let project = Project::new("targets:\n  ok:\n    phony: true\n    cmds: [\"echo ok >> log\"]\n");

  let (result, events) = project.build(&["ok", "missing"]).await;

  assert!(matches!(
    result,
    Err(BuildError::Graph(GraphError::UndefinedTarget(ref name))) if name == "missing"
  ));
  assert!(started_commands(&events).is_empty());
  assert!(project.log().is_empty());
}

#[tokio::test]
async fn undeclared_dependency_is_a_plain_file() {
  let project = Project::new("targets:\n  out:\n    deps: [in.txt]\n    cmds: [\"cp in.txt out\"]\n");
  project.write("in.txt", "data");

  let (result, _) = project.build(&["out"]).await;

  assert_eq!(result.unwrap().built, vec!["out"]);
  assert_eq!(std::fs::read_to_string(project.root().join("out")).unwrap(), "data");
}

#[tokio::test]
async fn missing_default_target() {
  let project = Project::new("targets:\n  prog:\n    cmds: [\"true\"]\n");

  let (result, _) = project.build(&["all"]).await;

  let err = result.unwrap_err();
  assert!(matches!(err, BuildError::Graph(GraphError::UndefinedDefaultTarget)));
  assert_eq!(err.to_string(), "no `all` target defined; name a target to build");
}

#[tokio::test]
async fn variables_expand_with_date_and_automatics() {
  let project = Project::new(
    r#"
variables:
  OUT: dist/${@}
  STAMP: ${DATE}
targets:
  _pkg:
    deps: [src.txt]
    cmds:
      - "mkdir -p dist"
      - "echo ${STAMP} ${<} > ${OUT}"
"#,
  );

  let (result, events) = project.build(&["_pkg"]).await;

  result.unwrap();
  assert_eq!(started_commands(&events)[1], "echo 2024-03-01 src.txt > dist/_pkg");
  assert_eq!(
    std::fs::read_to_string(project.root().join("dist/_pkg")).unwrap(),
    "2024-03-01 src.txt\n"
  );
}
