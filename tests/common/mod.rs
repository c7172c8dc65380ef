//! Common test utilities for Typesync CLI tests

use std::fs;
use std::path::Path;

/// Create a minimal project layout: schema, one page embedding a named
/// query, and a config with a short debounce so watch tests stay fast.
pub fn setup_project(dir: &Path) {
    fs::write(
        dir.join("schema.graphql"),
        "type Site { title: String }\ntype Query { site: Site }\n",
    )
    .unwrap();

    fs::create_dir_all(dir.join("src/pages")).unwrap();
    fs::write(
        dir.join("src/pages/index.tsx"),
        "const data = useStaticQuery(graphql`query PageQuery { site { title } }`);\n",
    )
    .unwrap();

    fs::write(
        dir.join("typesync.toml"),
        "[watch]\ndebounce_ms = 200\n",
    )
    .unwrap();
}
