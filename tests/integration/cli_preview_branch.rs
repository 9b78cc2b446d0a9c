use crate::common;

#[test]
fn preview_branch_prints_the_derived_branch() {
  let mut cmd = common::bin();
  cmd.args(["preview-branch", "--team", "dev team", "--leader", "alice  jones"]);
  cmd.assert().success().stdout("DEV_TEAM_ALICE_JONES_AI_Fix\n");
}

#[test]
fn preview_branch_handles_single_names() {
  let mut cmd = common::bin();
  cmd.args(["preview-branch", "--team", "Neo", "--leader", "Trinity"]);
  cmd.assert().success().stdout("NEO_TRINITY_AI_Fix\n");
}
