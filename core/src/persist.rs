use crate::error::{Result, StoreError};
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::{Engine, EngineConfig, EngineStats};
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetaFile {
    pub version: u32,
    pub num_docs: usize,
    pub num_terms: usize,
    pub num_topics: usize,
    pub created_at: String,
}

pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn snapshot(&self) -> PathBuf { self.root.join("snapshot.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// True when a snapshot has been written under this root.
    pub fn exists(&self) -> bool { self.snapshot().is_file() }
}

fn read_all(path: &Path) -> Result<Vec<u8>> {
    let mut f = File::open(path).map_err(StoreError::io(path))?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(StoreError::io(path))?;
    Ok(buf)
}

fn write_all(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut f = File::create(path).map_err(StoreError::io(path))?;
    f.write_all(bytes).map_err(StoreError::io(path))?;
    Ok(())
}

pub fn save_snapshot(paths: &IndexPaths, snapshot: &Snapshot) -> Result<()> {
    create_dir_all(&paths.root).map_err(StoreError::io(&paths.root))?;
    let bytes = bincode::serialize(snapshot).map_err(StoreError::Encode)?;
    write_all(&paths.snapshot(), &bytes)
}

pub fn load_snapshot(paths: &IndexPaths) -> Result<Snapshot> {
    let buf = read_all(&paths.snapshot())?;
    let snapshot: Snapshot = bincode::deserialize(&buf).map_err(StoreError::Decode)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion { found: snapshot.version, expected: SNAPSHOT_VERSION });
    }
    Ok(snapshot)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root).map_err(StoreError::io(&paths.root))?;
    let json = serde_json::to_string_pretty(meta)?;
    write_all(&paths.meta(), json.as_bytes())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let buf = read_all(&paths.meta())?;
    let meta: MetaFile = serde_json::from_slice(&buf)?;
    Ok(meta)
}

/// Writes the engine's snapshot and a metadata file describing it.
pub fn save_engine(paths: &IndexPaths, engine: &Engine, created_at: &str) -> Result<MetaFile> {
    save_state(paths, &engine.export_state(), &engine.stats(), created_at)
}

/// Writes an already exported snapshot, so callers can release the engine
/// before touching the disk.
pub fn save_state(paths: &IndexPaths, snapshot: &Snapshot, stats: &EngineStats, created_at: &str) -> Result<MetaFile> {
    save_snapshot(paths, snapshot)?;
    let meta = MetaFile {
        version: SNAPSHOT_VERSION,
        num_docs: stats.documents,
        num_terms: stats.terms,
        num_topics: stats.topics,
        created_at: created_at.to_string(),
    };
    save_meta(paths, &meta)?;
    tracing::info!(root = %paths.root.display(), num_docs = meta.num_docs, "saved index");
    Ok(meta)
}

pub fn load_engine(paths: &IndexPaths, config: EngineConfig) -> Result<Engine> {
    Engine::from_snapshot(load_snapshot(paths)?, config)
}
