use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

use treefold::creases::CreasesGraph;

/// What went into an artifact and what came out of it.
pub struct Payload {
    pub params: Value,
    pub stats: Value,
}

impl Payload {
    pub fn new(params: Value) -> Self {
        Self {
            params,
            stats: Value::Null,
        }
    }

    /// Attach size and assignment counts of a finished pattern.
    pub fn with_pattern(mut self, g: &CreasesGraph) -> Self {
        let [m, v, u, unknown, b] = g.assignment_histogram();
        self.stats = json!({
            "nodes": g.graph().node_count(),
            "edges": g.graph().edge_count(),
            "faces": g.faces().len(),
            "molecules": g.molecules().len(),
            "assignments": {"M": m, "V": v, "F": u, "U": unknown, "B": b}
        });
        self
    }
}

/// Write `<artifact>.provenance.json` with the code revision, callsite,
/// params, pattern stats and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let mut doc = report_block();
    doc["callsite"] = json!({"file": callsite.file(), "line": callsite.line()});
    doc["params"] = payload.params;
    doc["stats"] = payload.stats;
    doc["outputs"] = json!([artifact.to_string_lossy()]);
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

/// Build identity shared by `report` and every sidecar.
pub fn report_block() -> Value {
    json!({
        "code_rev": current_git_rev(),
        "treefold_version": treefold::VERSION,
        "samples": treefold::samples::NAMES,
    })
}

fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("pattern"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

pub fn current_git_rev() -> String {
    if let Some(from_env) = option_env!("GIT_COMMIT").filter(|s| !s.is_empty()) {
        return from_env.to_string();
    }
    if let Ok(env_override) = std::env::var("GIT_COMMIT") {
        if !env_override.is_empty() {
            return env_override;
        }
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn provenance_path_replaces_extension() {
        let derived = provenance_path(Path::new("/tmp/out/bone.fold"));
        assert_eq!(derived, Path::new("/tmp/out/bone.provenance.json"));
    }

    #[test]
    fn sidecar_records_pattern_stats() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("star.fold");
        let g = treefold::samples::four_leaf_star()
            .unwrap()
            .crease_pattern()
            .unwrap();
        let payload = Payload::new(json!({"sample": "four-leaf-star"})).with_pattern(&g);
        let prov_path = write_sidecar(&artifact, payload).unwrap();
        assert!(prov_path.exists());
        let parsed: Value = serde_json::from_slice(&fs::read(prov_path).unwrap()).unwrap();
        assert_eq!(parsed["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(parsed["params"]["sample"], "four-leaf-star");
        assert_eq!(parsed["stats"]["assignments"]["M"], 5);
        assert_eq!(parsed["stats"]["assignments"]["B"], 8);
        assert_eq!(parsed["treefold_version"], treefold::VERSION);
    }
}
