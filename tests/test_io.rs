mod common;
use common::SessionBuilder;
use kinsplit::io::{write_split, SessionData, StWriter};
use kinsplit::{generate_train_test_split, SplitConfig};

fn tmp_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("kinsplit_it_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_session(b: &SessionBuilder, kin_path: &std::path::Path, events_path: &std::path::Path) {
    let n = b.kinematics.nrows();
    let ts = b.timestamps();

    let mut w = StWriter::new();
    w.add_f32_arr2("kinematics", &b.kinematics);
    w.add_i64("nip_time", &ts, &[n, 1]);
    w.write(kin_path).unwrap();

    let mut w = StWriter::new();
    w.add_i64("trial_start_idxs", &b.starts, &[b.starts.len()]);
    w.add_i64("trial_stop_idxs", &b.stops, &[b.stops.len()]);
    w.write(events_path).unwrap();
}

#[test]
fn load_split_write_round_trip() {
    let dir = tmp_dir("round_trip");
    let b = SessionBuilder::new(600, 2)
        .repeat(0, 5, &[(0, 0.5)])
        .repeat(300, 5, &[(1, -0.5)]);
    let (kin, ev) = (dir.join("kinematics.safetensors"), dir.join("events.safetensors"));
    write_session(&b, &kin, &ev);

    let session = SessionData::load_pair(&kin, &ev).unwrap();
    assert_eq!(session.kinematics, b.kinematics);
    assert_eq!(session.trial_start_timestamps, b.starts);

    let split = generate_train_test_split(
        session.kinematics.view(),
        &session.timestamps,
        &session.trial_start_timestamps,
        &session.trial_stop_timestamps,
        &SplitConfig::default(),
    )
    .unwrap();
    let out = dir.join("out");
    write_split(&split, session.kinematics.view(), &out).unwrap();

    let json: serde_json::Value =
        serde_json::from_slice(&std::fs::read(out.join("trials.json")).unwrap()).unwrap();
    let train = json["train"].as_array().unwrap();
    assert_eq!(train.len(), split.train_info.len());
    assert_eq!(train[0]["gesture_id"], "dof_1_pos");
    assert_eq!(train[0]["relative_start_idx"], 0);
    assert_eq!(json["report"]["n_pairs"], 10);

    // split.safetensors header
    let bytes = std::fs::read(out.join("split.safetensors")).unwrap();
    let n = u64::from_le_bytes(bytes[..8].try_into().unwrap()) as usize;
    let header: serde_json::Value = serde_json::from_slice(&bytes[8..8 + n]).unwrap();
    assert_eq!(header["train_idxs"]["dtype"], "I64");
    assert_eq!(header["train_idxs"]["shape"][0], split.train_idxs.len());
    assert_eq!(header["train_kinematics"]["shape"][1], 2);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn gathered_rows_match_indices() {
    let b = SessionBuilder::new(400, 1).repeat(0, 4, &[(0, 0.5)]);
    let split = generate_train_test_split(
        b.kinematics.view(), &b.timestamps(), &b.starts, &b.stops, &SplitConfig::default(),
    )
    .unwrap();
    let x = split.train_kinematics(b.kinematics.view());
    assert_eq!(x.nrows(), split.train_idxs.len());
    for (row, &idx) in split.train_idxs.iter().enumerate() {
        approx::assert_abs_diff_eq!(x[[row, 0]], b.kinematics[[idx, 0]]);
    }
    // All gathered samples fall inside trials, so they carry the plateau.
    approx::assert_abs_diff_eq!(x.sum(), 0.5 * x.len() as f32, epsilon = 1e-4);
}
