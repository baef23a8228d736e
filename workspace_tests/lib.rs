mod package_integrity_test;
mod toml_utils;
mod version_integrity_test;
