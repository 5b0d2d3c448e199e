//! Render-hash regression helpers.
//!
//! A scenario is run live while every state is rendered and hashed. The `TimeMachine` is saved as
//! JSON, loaded back, replayed frame by frame, and the replay hashes must match the live ones.
//! Hash lists can also be pinned as goldens under `tests/goldens/`.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{GameLogic, HeadlessRunner, TimeMachine, surface::SurfaceSize};

/// Environment flag helper: accepts `1/true/yes/on` (case-insensitive).
pub fn env_flag(name: &str) -> bool {
    std::env::var(name)
        .ok()
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(false)
}

/// If set, regression tests may rewrite golden files in place.
pub fn update_goldens_enabled() -> bool {
    env_flag("FLOWGRID_UPDATE_GOLDENS")
}

pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[macro_export]
macro_rules! regression_golden_path {
    ($name:expr) => {{
        let base = $crate::regression::sanitize_filename($name);
        ::std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("goldens")
            .join(format!("{base}.json"))
    }};
}

pub fn rgba_sha256_hex(rgba: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(rgba);
    hex::encode(hasher.finalize())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrameHashGolden {
    pub version: u32,
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub hash_alg: String,
    /// One hash per recorded state.
    pub hashes: Vec<String>,
}

impl FrameHashGolden {
    pub fn new(name: impl Into<String>, size: SurfaceSize, hashes: Vec<String>) -> Self {
        Self {
            version: 1,
            name: name.into(),
            width: size.width,
            height: size.height,
            hash_alg: "sha256".to_string(),
            hashes,
        }
    }
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, msg)
}

pub fn load_golden_json(path: impl AsRef<Path>) -> io::Result<FrameHashGolden> {
    let path = path.as_ref();
    let reader = io::BufReader::new(fs::File::open(path)?);
    serde_json::from_reader(reader)
        .map_err(|e| invalid(format!("failed parsing golden json {}: {e}", path.display())))
}

pub fn save_golden_json(path: impl AsRef<Path>, golden: &FrameHashGolden) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let mut writer = io::BufWriter::new(fs::File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, golden).map_err(io::Error::other)?;
    writer.flush()
}

/// Compares against the golden at `path`, writing it when missing or when `update` is set.
pub fn assert_or_update_golden_json(
    path: impl AsRef<Path>,
    golden: &FrameHashGolden,
    update: bool,
) -> io::Result<()> {
    let path = path.as_ref();
    let exists = path.exists();

    if update || !exists {
        save_golden_json(path, golden)?;
        info!(path = %path.display(), created = !exists, "golden written");
        return Ok(());
    }

    let expected = load_golden_json(path)?;
    if expected.version != golden.version
        || expected.hash_alg != golden.hash_alg
        || expected.width != golden.width
        || expected.height != golden.height
    {
        return Err(invalid(format!(
            "golden metadata mismatch at {}: expected v{} {} {}x{}, got v{} {} {}x{} \
             (set FLOWGRID_UPDATE_GOLDENS=1 to rewrite)",
            path.display(),
            expected.version,
            expected.hash_alg,
            expected.width,
            expected.height,
            golden.version,
            golden.hash_alg,
            golden.width,
            golden.height
        )));
    }

    if expected.hashes.len() != golden.hashes.len() {
        return Err(invalid(format!(
            "golden frame count mismatch at {}: expected {}, got {}",
            path.display(),
            expected.hashes.len(),
            golden.hashes.len()
        )));
    }

    if let Some(i) = first_mismatch(&expected.hashes, &golden.hashes) {
        return Err(invalid(format!(
            "golden mismatch at {} (frame {i}): expected {}, got {} \
             (set FLOWGRID_UPDATE_GOLDENS=1 to rewrite)",
            path.display(),
            expected.hashes[i],
            golden.hashes[i]
        )));
    }

    Ok(())
}

fn first_mismatch(a: &[String], b: &[String]) -> Option<usize> {
    a.iter().zip(b).position(|(x, y)| x != y)
}

#[derive(Debug, Clone)]
pub struct RecordReplayHashes {
    pub state_json: PathBuf,
    pub hashes: Vec<String>,
}

/// Runs `inputs` live, hashing a render of every state, saves the `TimeMachine` to
/// `out_dir/<name>.json`, then reloads and replays it and checks every frame hash matches.
pub fn record_then_replay_hashes<G, Render>(
    name: &str,
    out_dir: impl AsRef<Path>,
    game: G,
    inputs: impl IntoIterator<Item = G::Input>,
    size: SurfaceSize,
    mut render: Render,
) -> io::Result<RecordReplayHashes>
where
    G: GameLogic + Clone,
    G::State: Serialize + DeserializeOwned,
    Render: FnMut(&G::State, &mut [u8], SurfaceSize),
{
    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    let state_json = out_dir.join(format!("{}.json", sanitize_filename(name)));

    let mut buf = vec![0u8; size.rgba_len()];
    let mut hash_state = |state: &G::State| {
        buf.fill(0);
        render(state, &mut buf, size);
        rgba_sha256_hex(&buf)
    };

    let mut live = HeadlessRunner::new(game.clone());
    let mut live_hashes = vec![hash_state(live.state())];
    for input in inputs {
        live.step(input);
        live_hashes.push(hash_state(live.state()));
    }
    live.timemachine().save_json_file(&state_json)?;

    let tm = TimeMachine::<G::State>::load_json_file(&state_json)?;
    let mut replay = HeadlessRunner::from_timemachine(game, tm);
    let mut replay_hashes = Vec::with_capacity(live_hashes.len());
    for frame in 0..replay.history().len() {
        replay.seek(frame);
        replay_hashes.push(hash_state(replay.state()));
    }

    if replay_hashes.len() != live_hashes.len() {
        return Err(invalid(format!(
            "replay produced {} frames, live produced {}",
            replay_hashes.len(),
            live_hashes.len()
        )));
    }
    if let Some(i) = first_mismatch(&live_hashes, &replay_hashes) {
        return Err(invalid(format!("replay frame {i} differed from live render")));
    }

    Ok(RecordReplayHashes {
        state_json,
        hashes: live_hashes,
    })
}
