use std::path::PathBuf;

use crate::toml_utils::{INHERITED, ROOT_TOML};

#[test]
fn test_package_names_match_directory() {
    let mismatched_packages: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter_map(|(path_str, toml)| {
            let path = PathBuf::from(&path_str);
            let directory_name = path.file_name()?.to_str()?;
            match toml.package.get("name").and_then(toml::Value::as_str) {
                Some(package_name) if package_name == directory_name => None,
                _ => Some(path_str),
            }
        })
        .collect();
    assert!(
        mismatched_packages.is_empty(),
        "The following crates have package names that do not match their directory names, or are \
         missing a name field: {mismatched_packages:?}."
    );
}

#[test]
fn test_members_use_workspace_lints() {
    let members_without_lints: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(_, toml)| toml.lints.as_ref() != Some(&*INHERITED))
        .map(|(path, _)| path)
        .collect();
    assert!(
        members_without_lints.is_empty(),
        "The following crates do not inherit the workspace lints: {members_without_lints:?}."
    );
}

#[test]
fn test_members_inherit_workspace_version() {
    let members_with_own_version: Vec<_> = ROOT_TOML
        .member_cargo_tomls()
        .into_iter()
        .filter(|(_, toml)| toml.package.get("version") != Some(&*INHERITED))
        .map(|(path, _)| path)
        .collect();
    assert!(
        members_with_own_version.is_empty(),
        "The following crates do not use `version.workspace = true`: {members_with_own_version:?}."
    );
}
