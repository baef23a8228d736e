use crate::toml_utils::{LocalCrate, ROOT_TOML};

#[test]
fn test_path_dependencies_are_members() {
    let non_member_path_crates: Vec<_> = ROOT_TOML
        .workspace_path_dependencies()
        .filter(|LocalCrate { path, .. }| !ROOT_TOML.members().contains(path))
        .collect();
    assert!(
        non_member_path_crates.is_empty(),
        "The following crates are path dependencies but not members of the workspace: \
         {non_member_path_crates:?}."
    );
}

#[test]
fn test_version_alignment() {
    let workspace_version = ROOT_TOML.workspace_version();
    let crates_with_incorrect_version: Vec<_> = ROOT_TOML
        .workspace_path_dependencies()
        .filter(|LocalCrate { version, .. }| version.as_deref() != Some(workspace_version))
        .collect();
    assert!(
        crates_with_incorrect_version.is_empty(),
        "The following crates have versions different from the workspace version \
         '{workspace_version}': {crates_with_incorrect_version:?}."
    );
}

#[test]
fn test_members_depend_on_local_crates_through_the_workspace() {
    for (member, cargo_toml) in ROOT_TOML.member_cargo_tomls() {
        let crate_paths: Vec<_> = cargo_toml.crate_path_dependencies().collect();
        assert!(
            crate_paths.is_empty(),
            "{member} has direct path dependencies instead of workspace ones: {crate_paths:?}."
        );
    }
}
