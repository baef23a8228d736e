use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;

/// A dependency entry: either a version string or a table.
type Dependencies = HashMap<String, toml::Value>;

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct Package {
    version: String,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct WorkspaceFields {
    package: Package,
    members: Vec<String>,
    dependencies: Dependencies,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CargoToml {
    workspace: WorkspaceFields,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct CrateCargoToml {
    pub(crate) package: HashMap<String, toml::Value>,
    dependencies: Option<Dependencies>,
    #[serde(rename = "dev-dependencies")]
    dev_dependencies: Option<Dependencies>,
    pub(crate) lints: Option<toml::Value>,
}

#[derive(Debug)]
pub(crate) struct LocalCrate {
    pub(crate) path: String,
    pub(crate) version: Option<String>,
}

/// The value of a `key.workspace = true` entry.
pub(crate) static INHERITED: LazyLock<toml::Value> =
    LazyLock::new(|| toml::from_str("workspace = true").unwrap());

pub(crate) static ROOT_TOML: LazyLock<CargoToml> = LazyLock::new(|| {
    toml::from_str(include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/../Cargo.toml"))).unwrap()
});

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("..")
}

fn path_dependencies<'a>(
    dependencies: impl Iterator<Item = &'a toml::Value> + 'a,
) -> impl Iterator<Item = LocalCrate> + 'a {
    dependencies.filter_map(|value| {
        let path = value.get("path")?.as_str()?.to_string();
        let version = value.get("version").and_then(toml::Value::as_str).map(String::from);
        Some(LocalCrate { path, version })
    })
}

impl CargoToml {
    pub(crate) fn members(&self) -> &Vec<String> {
        &self.workspace.members
    }

    pub(crate) fn workspace_version(&self) -> &str {
        &self.workspace.package.version
    }

    pub(crate) fn workspace_path_dependencies(&self) -> impl Iterator<Item = LocalCrate> + '_ {
        path_dependencies(self.workspace.dependencies.values())
    }

    /// The parsed Cargo.toml of every member, keyed by the member path.
    pub(crate) fn member_cargo_tomls(&self) -> Vec<(String, CrateCargoToml)> {
        self.members().iter().map(|member| (member.clone(), read_cargo_toml(member))).collect()
    }
}

impl CrateCargoToml {
    /// Local crates referenced directly by path instead of through the workspace.
    pub(crate) fn crate_path_dependencies(&self) -> impl Iterator<Item = LocalCrate> + '_ {
        let regular = self.dependencies.iter().flat_map(HashMap::values);
        let dev = self.dev_dependencies.iter().flat_map(HashMap::values);
        path_dependencies(regular.chain(dev))
    }
}

pub(crate) fn read_cargo_toml(member: &str) -> CrateCargoToml {
    let cargo_toml_path = workspace_root().join(member).join("Cargo.toml");
    let cargo_toml_content = fs::read_to_string(&cargo_toml_path)
        .unwrap_or_else(|err| panic!("Failed to read {cargo_toml_path:?}: {err}"));
    toml::from_str(&cargo_toml_content)
        .unwrap_or_else(|err| panic!("Failed to parse {cargo_toml_path:?}: {err}"))
}
