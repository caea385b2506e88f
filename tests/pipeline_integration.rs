//! End-to-end tests on the local filesystem
//!
//! Tests the full flow: JSON fixture tree → session → pipeline → partitioned Parquet

use arrow::array::{Array, Int32Array, Int64Array, StringArray, TimestampMillisecondArray};
use arrow::record_batch::RecordBatch;
use clap::Parser;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{json, Value};
use sparkify_etl::cli::{Cli, Runner};
use sparkify_etl::config::JobConfig;
use sparkify_etl::output::{ObjectStoreSink, SUCCESS_MARKER};
use sparkify_etl::pipeline::{self, Stages};
use sparkify_etl::tables::all_tables;
use sparkify_etl::Session;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TS: i64 = 1_541_440_293_796;

// ============================================================================
// Fixtures
// ============================================================================

fn write_json(root: &Path, relative: &str, records: &[Value]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let body: Vec<String> = records.iter().map(Value::to_string).collect();
    fs::write(path, body.join("\n")).unwrap();
}

fn song(song_id: &str, artist_id: &str, artist_name: &str, year: i64) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": 35.14968,
        "artist_longitude": -90.04892,
        "artist_location": "Memphis, TN",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": format!("{song_id} title"),
        "duration": 152.92036,
        "year": year
    })
}

fn event(user_id: &str, page: &str, artist: &str, ts: i64, session_id: i64) -> Value {
    json!({
        "artist": artist,
        "firstName": "Jacob",
        "gender": "M",
        "lastName": "Klein",
        "level": "paid",
        "location": "Tampa-St. Petersburg-Clearwater, FL",
        "page": page,
        "sessionId": session_id,
        "song": "Some song",
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Macintosh)",
        "userId": user_id
    })
}

fn fixture_tree() -> TempDir {
    let input = tempfile::tempdir().unwrap();
    let root = input.path();
    write_json(root, "song_data/A/A/A/TRAAAAK128F9318786.json", &[song("SO1", "AR1", "Elena", 2004)]);
    write_json(root, "song_data/A/A/B/TRAABCL128F4286650.json", &[song("SO2", "AR1", "Elena", 2004)]);
    write_json(root, "song_data/A/B/A/TRABACN128F425B784.json", &[song("SO3", "AR2", "AC/DC", 0)]);
    write_json(
        root,
        "log-data/2018/11/2018-11-05-events.json",
        &[
            event("10", "NextSong", "AC/DC", TS, 1),
            event("10", "Logout", "AC/DC", TS + 1_000, 1),
            event("15", "NextSong", "Unknown Artist", TS + 2_000, 2),
        ],
    );
    write_json(
        root,
        "log-data/2018/12/2018-12-01-events.json",
        &[event("15", "NextSong", "Elena", 1_543_622_400_000, 7)],
    );
    input
}

fn config(input: &Path, output: &Path) -> JobConfig {
    JobConfig {
        input: input.to_str().unwrap().to_string(),
        output: output.to_str().unwrap().to_string(),
        ..JobConfig::default()
    }
}

fn parquet_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        if path.is_dir() {
            files.extend(parquet_files(&path));
        } else if path.extension().is_some_and(|ext| ext == "parquet") {
            files.push(path);
        }
    }
    files.sort();
    files
}

fn read_file(path: &Path) -> RecordBatch {
    let file = fs::File::open(path).unwrap();
    let builder = ParquetRecordBatchReaderBuilder::try_new(file).unwrap();
    let schema = builder.schema().clone();
    let batches: Vec<RecordBatch> = builder.build().unwrap().map(|b| b.unwrap()).collect();
    arrow::compute::concat_batches(&schema, &batches).unwrap()
}

fn partition_value<'a>(path: &'a Path, column: &str) -> &'a str {
    path.components()
        .filter_map(|c| c.as_os_str().to_str())
        .find_map(|segment| segment.strip_prefix(&format!("{column}=")))
        .unwrap()
}

fn column<'a, T: 'static>(batch: &'a RecordBatch, name: &str) -> &'a T {
    batch
        .column_by_name(name)
        .unwrap()
        .as_any()
        .downcast_ref::<T>()
        .unwrap()
}

async fn run_all(input: &Path, output: &Path) -> pipeline::RunStats {
    let session = Session::bootstrap(config(input, output)).unwrap();
    let sink = ObjectStoreSink::new(session.output().clone(), session.writer_config());
    pipeline::run(&session, &sink, Stages::All).await.unwrap()
}

// ============================================================================
// End-to-End Tests
// ============================================================================

#[tokio::test]
async fn test_full_run_writes_partitioned_tables() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    let stats = run_all(input.path(), output.path()).await;

    assert_eq!(stats.song_files, 3);
    assert_eq!(stats.log_files, 2);
    assert_eq!(stats.play_events, 3);

    for table in all_tables() {
        assert!(output.path().join(table.name).join(SUCCESS_MARKER).is_file());
    }
    assert!(output
        .path()
        .join("songs/year=2004/artist_id=AR1/part-00000.parquet")
        .is_file());
    assert!(output
        .path()
        .join("songs/year=0/artist_id=AR2/part-00000.parquet")
        .is_file());
    assert!(output.path().join("artists/part-00000.parquet").is_file());
    assert!(output.path().join("users/part-00000.parquet").is_file());
}

#[tokio::test]
async fn test_partition_directories_match_row_values() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    run_all(input.path(), output.path()).await;

    for file in parquet_files(&output.path().join("songs")) {
        let batch = read_file(&file);
        assert!(batch.column_by_name("year").is_none());
        assert!(batch.column_by_name("artist_id").is_none());
        assert!(batch.num_rows() > 0);
        let year = partition_value(&file, "year");
        let artist = partition_value(&file, "artist_id");
        assert!(["2004", "0"].contains(&year));
        assert!(["AR1", "AR2"].contains(&artist));
    }

    for table in ["time", "songplays"] {
        for file in parquet_files(&output.path().join(table)) {
            let batch = read_file(&file);
            let year: i32 = partition_value(&file, "year").parse().unwrap();
            let month: u32 = partition_value(&file, "month").parse().unwrap();
            let starts = column::<TimestampMillisecondArray>(&batch, "start_time");
            for i in 0..starts.len() {
                let start = starts.value_as_datetime(i).unwrap();
                assert_eq!(chrono::Datelike::year(&start), year);
                assert_eq!(chrono::Datelike::month(&start), month);
            }
        }
    }
}

#[tokio::test]
async fn test_songplays_content() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    run_all(input.path(), output.path()).await;

    let files = parquet_files(&output.path().join("songplays"));
    assert_eq!(files.len(), 2);

    let november = read_file(&output.path().join("songplays/year=2018/month=11/part-00000.parquet"));
    assert_eq!(november.num_rows(), 1);
    assert_eq!(column::<StringArray>(&november, "song_id").value(0), "SO3");
    assert_eq!(column::<StringArray>(&november, "artist_id").value(0), "AR2");
    assert_eq!(column::<StringArray>(&november, "userId").value(0), "10");
    assert_eq!(column::<Int64Array>(&november, "sessionId").value(0), 1);
    assert_eq!(
        column::<TimestampMillisecondArray>(&november, "start_time").value(0),
        TS
    );

    // One event fans out to both of Elena's songs
    let december = read_file(&output.path().join("songplays/year=2018/month=12/part-00000.parquet"));
    let songs = column::<StringArray>(&december, "song_id");
    let mut ids: Vec<&str> = (0..songs.len()).map(|i| songs.value(i)).collect();
    ids.sort_unstable();
    assert_eq!(ids, vec!["SO1", "SO2"]);

    let plays = column::<Int64Array>(&december, "songplay_id");
    assert_ne!(plays.value(0), plays.value(1));
}

#[tokio::test]
async fn test_time_fields_for_known_timestamp() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    run_all(input.path(), output.path()).await;

    let time = read_file(&output.path().join("time/year=2018/month=11/part-00000.parquet"));
    let starts = column::<TimestampMillisecondArray>(&time, "start_time");
    let row = (0..starts.len()).find(|&i| starts.value(i) == TS).unwrap();

    assert_eq!(column::<Int32Array>(&time, "hour").value(row), 17);
    assert_eq!(column::<Int32Array>(&time, "day").value(row), 5);
    assert_eq!(column::<Int32Array>(&time, "week").value(row), 45);
    assert_eq!(column::<Int32Array>(&time, "weekday").value(row), 2);
    // Logout event at TS + 1s is not a play
    assert_eq!(starts.len(), 2);
}

#[tokio::test]
async fn test_second_run_replaces_output() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    run_all(input.path(), output.path()).await;

    let stale = output.path().join("songs/year=1999/artist_id=OLD/part-00000.parquet");
    fs::create_dir_all(stale.parent().unwrap()).unwrap();
    fs::write(&stale, b"stale").unwrap();
    let before = parquet_files(output.path());

    run_all(input.path(), output.path()).await;
    assert!(!stale.exists());
    let after = parquet_files(output.path());
    assert_eq!(after.len(), before.len() - 1);
}

#[tokio::test]
async fn test_cli_run_with_config_file() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();
    let lake = output.path().join("lake");

    let config_path = output.path().join("job.yaml");
    fs::write(
        &config_path,
        format!(
            "input: {}\noutput: {}\nparquet:\n  compression: zstd\n",
            input.path().display(),
            lake.display()
        ),
    )
    .unwrap();

    let cli = Cli::try_parse_from([
        "sparkify-etl",
        "--config",
        config_path.to_str().unwrap(),
        "run",
        "--stage",
        "songs",
    ])
    .unwrap();
    Runner::new(cli).run().await.unwrap();

    assert!(lake.join("songs").join(SUCCESS_MARKER).is_file());
    assert!(lake.join("artists").join(SUCCESS_MARKER).is_file());
    assert!(!lake.join("songplays").exists());
}

#[tokio::test]
async fn test_cli_dry_run_writes_nothing() {
    let input = fixture_tree();
    let output = tempfile::tempdir().unwrap();

    let cli = Cli::try_parse_from([
        "sparkify-etl",
        "run",
        "--input",
        input.path().to_str().unwrap(),
        "--output",
        output.path().to_str().unwrap(),
        "--dry-run",
    ])
    .unwrap();
    Runner::new(cli).run().await.unwrap();

    assert!(parquet_files(output.path()).is_empty());
}
