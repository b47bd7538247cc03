//! Safetensors I/O for sessions and split outputs.
//!
//! Reader: parses a session container with the kinematics, the sample clock
//! (`nip_time`) and the trial markers (`trial_start_idxs`, `trial_stop_idxs`;
//! despite the names these hold timestamps on the `nip_time` clock).
//!
//! Writer: `split.safetensors` with the stitched index streams and gathered
//! kinematics, plus `trials.json` with the per-trial coordinates and the
//! split report.
use anyhow::{bail, Context, Result};
use ndarray::{Array2, ArrayView2};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use crate::split::{SplitReport, SplitResult, TrialInfo};

// ── Low-level safetensors parser ──────────────────────────────────────────────

struct Container {
    bytes: Vec<u8>,
    header: HashMap<String, serde_json::Value>,
    data_start: usize,
}

impl Container {
    fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("reading {}", path.display()))?;
        if bytes.len() < 8 {
            bail!("{}: safetensors file too small", path.display());
        }
        let mut len = [0u8; 8];
        len.copy_from_slice(&bytes[..8]);
        let n = usize::try_from(u64::from_le_bytes(len)).context("bad header length")?;
        let data_start = 8usize.checked_add(n).context("bad header length")?;
        let header_bytes = bytes.get(8..data_start).context("truncated safetensors header")?;
        let header: HashMap<String, serde_json::Value> = serde_json::from_slice(header_bytes)
            .context("failed to parse safetensors header")?;
        Ok(Self { bytes, header, data_start })
    }

    fn entry(&self, key: &str) -> Result<&serde_json::Value> {
        self.header.get(key).with_context(|| format!("missing '{key}' key"))
    }

    fn shape(&self, key: &str) -> Result<Vec<usize>> {
        self.entry(key)?["shape"]
            .as_array()
            .with_context(|| format!("'{key}': missing shape"))?
            .iter()
            .map(|v| v.as_u64().map(|d| d as usize).context("non-integer dimension"))
            .collect()
    }

    fn raw(&self, key: &str) -> Result<(&str, &[u8])> {
        let entry = self.entry(key)?;
        let dtype = entry["dtype"].as_str().with_context(|| format!("'{key}': missing dtype"))?;
        let offsets = entry["data_offsets"]
            .as_array()
            .with_context(|| format!("'{key}': missing data_offsets"))?;
        let (s, e) = match offsets.as_slice() {
            [s, e] => (
                s.as_u64().context("bad offset")? as usize,
                e.as_u64().context("bad offset")? as usize,
            ),
            _ => bail!("'{key}': data_offsets must have two entries"),
        };
        let (s, e) = match (self.data_start.checked_add(s), self.data_start.checked_add(e)) {
            (Some(s), Some(e)) => (s, e),
            _ => bail!("'{key}': data_offsets overflow"),
        };
        let data = self
            .bytes
            .get(s..e)
            .with_context(|| format!("'{key}': data out of bounds"))?;
        Ok((dtype, data))
    }

    /// Any numeric tensor, flattened and cast to f64.
    fn read_f64(&self, key: &str) -> Result<Vec<f64>> {
        let (dtype, raw) = self.raw(key)?;
        Ok(match dtype {
            "F32" => raw.chunks_exact(4)
                .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                .collect(),
            "F64" => raw.chunks_exact(8).map(|b| f64::from_le_bytes(le8(b))).collect(),
            "I32" => raw.chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64)
                .collect(),
            "I64" => raw.chunks_exact(8).map(|b| i64::from_le_bytes(le8(b)) as f64).collect(),
            "U64" => raw.chunks_exact(8).map(|b| u64::from_le_bytes(le8(b)) as f64).collect(),
            other => bail!("'{key}': unsupported dtype {other}"),
        })
    }

    /// Any numeric tensor, flattened and cast to i64 (floats truncate).
    fn read_i64(&self, key: &str) -> Result<Vec<i64>> {
        let (dtype, raw) = self.raw(key)?;
        Ok(match dtype {
            "I64" => raw.chunks_exact(8).map(|b| i64::from_le_bytes(le8(b))).collect(),
            "U64" => raw.chunks_exact(8).map(|b| u64::from_le_bytes(le8(b)) as i64).collect(),
            "I32" => raw.chunks_exact(4)
                .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]) as i64)
                .collect(),
            _ => self.read_f64(key)?.into_iter().map(|v| v as i64).collect(),
        })
    }
}

fn le8(b: &[u8]) -> [u8; 8] {
    let mut out = [0u8; 8];
    out.copy_from_slice(b);
    out
}

// ── Session ───────────────────────────────────────────────────────────────────

/// One recording session, ready for
/// [`generate_train_test_split`](crate::generate_train_test_split).
///
/// Kinematics stored as F64 are narrowed to `f32` on load, so thresholds are
/// compared at `f32` precision: an F64 value within half an `f32` ulp above
/// the threshold rounds onto it and fails the strict `>` test.
#[derive(Debug, Clone)]
pub struct SessionData {
    /// [N, D] kinematic samples.
    pub kinematics: Array2<f32>,
    /// [N] sample clock (`nip_time`).
    pub timestamps: Vec<i64>,
    pub trial_start_timestamps: Vec<i64>,
    pub trial_stop_timestamps: Vec<i64>,
}

impl SessionData {
    /// Load kinematics, clock and markers from a single container.
    pub fn load(path: &Path) -> Result<Self> {
        let c = Container::open(path)?;
        let (kinematics, timestamps) = read_kinematics(&c)?;
        let (trial_start_timestamps, trial_stop_timestamps) = read_markers(&c)?;
        Ok(Self { kinematics, timestamps, trial_start_timestamps, trial_stop_timestamps })
    }

    /// Load from separate kinematics and events containers.
    pub fn load_pair(kinematics_path: &Path, events_path: &Path) -> Result<Self> {
        let (kinematics, timestamps) = read_kinematics(&Container::open(kinematics_path)?)
            .with_context(|| format!("loading {}", kinematics_path.display()))?;
        let (trial_start_timestamps, trial_stop_timestamps) =
            read_markers(&Container::open(events_path)?)
                .with_context(|| format!("loading {}", events_path.display()))?;
        Ok(Self { kinematics, timestamps, trial_start_timestamps, trial_stop_timestamps })
    }
}

fn read_kinematics(c: &Container) -> Result<(Array2<f32>, Vec<i64>)> {
    let shape = c.shape("kinematics")?;
    let (n, d) = match shape.as_slice() {
        [n, d] => (*n, *d),
        [n] => (*n, 1),
        _ => bail!("kinematics must be 1-D or 2-D, got shape {shape:?}"),
    };
    let values: Vec<f32> = c.read_f64("kinematics")?.into_iter().map(|v| v as f32).collect();
    let kinematics = Array2::from_shape_vec((n, d), values)?;
    let timestamps = c.read_i64("nip_time")?;
    Ok((kinematics, timestamps))
}

fn read_markers(c: &Container) -> Result<(Vec<i64>, Vec<i64>)> {
    Ok((c.read_i64("trial_start_idxs")?, c.read_i64("trial_stop_idxs")?))
}

// ── Generic safetensors builder ───────────────────────────────────────────────

/// Simple safetensors file writer for F32 and I64 tensors.
///
/// ```rust,no_run
/// use kinsplit::io::StWriter;
/// use std::path::Path;
/// let mut w = StWriter::new();
/// w.add_f32("signal", &[1.0f32, 2.0, 3.0], &[3, 1]);
/// w.add_i64("nip_time", &[0, 1, 2], &[3]);
/// w.write(Path::new("/tmp/out.safetensors")).unwrap();
/// ```
#[derive(Default)]
pub struct StWriter {
    entries: Vec<(String, Vec<u8>, &'static str, Vec<usize>)>,
}

impl StWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_f32(&mut self, name: &str, data: &[f32], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "F32", shape.to_vec()));
    }

    pub fn add_f32_arr2(&mut self, name: &str, arr: &Array2<f32>) {
        let data: Vec<f32> = arr.iter().copied().collect();
        self.add_f32(name, &data, &[arr.nrows(), arr.ncols()]);
    }

    pub fn add_i64(&mut self, name: &str, data: &[i64], shape: &[usize]) {
        let bytes: Vec<u8> = data.iter().flat_map(|v| v.to_le_bytes()).collect();
        self.entries.push((name.to_string(), bytes, "I64", shape.to_vec()));
    }

    pub fn add_indices(&mut self, name: &str, idxs: &[usize]) {
        let data: Vec<i64> = idxs.iter().map(|&i| i as i64).collect();
        self.add_i64(name, &data, &[data.len()]);
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        use std::io::Write;
        let mut header_map = serde_json::Map::new();
        let mut offset: usize = 0;
        for (name, data, dtype, shape) in &self.entries {
            header_map.insert(name.clone(), serde_json::json!({
                "dtype": dtype,
                "shape": shape,
                "data_offsets": [offset, offset + data.len()],
            }));
            offset += data.len();
        }
        let hdr_bytes = serde_json::to_vec(&header_map)?;
        let pad = (8 - hdr_bytes.len() % 8) % 8;
        let padded: Vec<u8> = hdr_bytes.into_iter()
            .chain(std::iter::repeat(b' ').take(pad))
            .collect();
        let mut f = std::fs::File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        f.write_all(&(padded.len() as u64).to_le_bytes())?;
        f.write_all(&padded)?;
        for (_, data, _, _) in &self.entries {
            f.write_all(data)?;
        }
        Ok(())
    }
}

// ── Split writer ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct TrialsFile<'a> {
    train: &'a [TrialInfo],
    test: &'a [TrialInfo],
    report: &'a SplitReport,
}

/// Write `split.safetensors` and `trials.json` into `dir`.
///
/// `split.safetensors` keys: `train_idxs`, `test_idxs` ([M] I64) and
/// `train_kinematics`, `test_kinematics` ([M, D] F32).
pub fn write_split(split: &SplitResult, kinematics: ArrayView2<f32>, dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;

    let mut w = StWriter::new();
    w.add_indices("train_idxs", &split.train_idxs);
    w.add_indices("test_idxs", &split.test_idxs);
    w.add_f32_arr2("train_kinematics", &split.train_kinematics(kinematics));
    w.add_f32_arr2("test_kinematics", &split.test_kinematics(kinematics));
    w.write(&dir.join("split.safetensors"))?;

    let trials = TrialsFile { train: &split.train_info, test: &split.test_info, report: &split.report };
    let json = serde_json::to_vec_pretty(&trials)?;
    std::fs::write(dir.join("trials.json"), json).context("writing trials.json")?;
    Ok(())
}
