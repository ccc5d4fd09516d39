use clap::Parser;
use fanload::engine::{
    Cli, base_name, destination_key, glob_match, is_os_hidden_file, setup_opts,
    should_include_in_listing,
};
use fanload::utils::{apply_file_to_opts, parse_fanload_toml};
use fanload::{
    CsvManifest, ErrorPolicy, Job, LocalStore, ManifestSink, NullStore, Opts, StorageConnect,
    StorageSink,
};
use std::path::{Path, PathBuf};

// --- destination_key / base_name ---

#[test]
fn test_destination_key_is_label_slash_name() {
    assert_eq!(destination_key("apple", "img_01.jpg"), "apple/img_01.jpg");
}

#[test]
fn test_base_name_of_nested_path() {
    assert_eq!(
        base_name(Path::new("/train/apples/img_01.jpg")),
        Some("img_01.jpg".to_string())
    );
}

#[test]
fn test_base_name_of_root_is_none() {
    assert_eq!(base_name(Path::new("/")), None);
}

#[cfg(target_os = "linux")]
#[test]
fn test_base_name_of_non_utf8_name_is_none() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;
    let path = Path::new("/train").join(OsStr::from_bytes(b"\xff.jpg"));
    assert_eq!(base_name(&path), None);
}

// --- glob_match / listing filter ---

#[test]
fn test_glob_match_literal() {
    assert!(glob_match("notes.txt", "notes.txt"));
    assert!(!glob_match("notes.txt", "notes.tx"));
}

#[test]
fn test_glob_match_star() {
    assert!(glob_match("*.log", "foo.log"));
    assert!(glob_match("*.log", ".log"));
    assert!(!glob_match("*.log", "foo.log.txt"));
    assert!(glob_match("img_*", "img_01.jpg"));
    assert!(glob_match("*", ""));
}

#[test]
fn test_glob_match_question_mark() {
    assert!(glob_match("img_0?.jpg", "img_07.jpg"));
    assert!(!glob_match("img_0?.jpg", "img_0.jpg"));
}

#[test]
fn test_glob_match_multiple_stars() {
    assert!(glob_match("*_*.jpg", "img_01.jpg"));
    assert!(glob_match("a*b*c", "aXbYbZc"));
    assert!(!glob_match("a*b*c", "aXbYbZ"));
    assert!(glob_match("**", "anything"));
}

#[test]
fn test_glob_match_many_stars_on_long_name_returns() {
    let name = "a".repeat(200);
    assert!(!glob_match("*a*a*a*a*a*a*b", &name));
    assert!(glob_match("*a*a*a*a*a*a*", &name));
}

#[test]
fn test_os_hidden_files() {
    assert!(is_os_hidden_file(".DS_Store"));
    assert!(is_os_hidden_file("Thumbs.db"));
    assert!(is_os_hidden_file("._img_01.jpg"));
    assert!(is_os_hidden_file(".Trash-1000"));
    assert!(!is_os_hidden_file("img_01.jpg"));
    assert!(!is_os_hidden_file(".env"));
}

#[test]
fn test_should_include_in_listing() {
    let exclude = vec!["*.tmp".to_string()];
    assert!(should_include_in_listing("img_01.jpg", &exclude));
    assert!(!should_include_in_listing("upload.tmp", &exclude));
    assert!(!should_include_in_listing(".DS_Store", &[]));
}

// --- Job parsing ---

#[test]
fn test_job_from_str() {
    let job: Job = "apple=train/apples@apples-bucket".parse().unwrap();
    assert_eq!(job.label, "apple");
    assert_eq!(job.source, PathBuf::from("train/apples"));
    assert_eq!(job.destination, "apples-bucket");
}

#[test]
fn test_job_from_str_last_at_splits_destination() {
    let job: Job = "tomato=data/me@home/tomatoes@bucket".parse().unwrap();
    assert_eq!(job.source, PathBuf::from("data/me@home/tomatoes"));
    assert_eq!(job.destination, "bucket");
}

#[test]
fn test_job_from_str_rejects_malformed() {
    assert!("apple".parse::<Job>().is_err());
    assert!("apple=train/apples".parse::<Job>().is_err());
    assert!("=train@bucket".parse::<Job>().is_err());
    assert!("apple=train@".parse::<Job>().is_err());
}

// --- config file ---

const SAMPLE_TOML: &str = r#"
[settings]
workers = 8
on_error = "continue"
strict = true
exclude = ["*.tmp"]
store = "objects"

[[jobs]]
label = "apple"
source = "train/apples"
destination = "apples"

[[jobs]]
label = "tomato"
source = "train/tomatoes"
destination = "tomatoes"
"#;

#[test]
fn test_toml_applies_settings_and_jobs() {
    let dir = Path::new("/work");
    let file = parse_fanload_toml(SAMPLE_TOML, &dir.join(".fanload.toml")).unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts, dir);

    assert_eq!(opts.workers, 8);
    assert_eq!(opts.error_policy, ErrorPolicy::Continue);
    assert!(opts.strict);
    assert!(!opts.follow_links);
    assert_eq!(opts.exclude, vec!["*.tmp".to_string()]);
    assert_eq!(opts.store_root, Some(PathBuf::from("/work/objects")));
    assert_eq!(opts.jobs.len(), 2);
    assert_eq!(opts.jobs[1].source, PathBuf::from("/work/train/tomatoes"));
    assert_eq!(opts.jobs[1].label, "tomato");
}

#[test]
fn test_toml_empty_keeps_defaults() {
    let file = parse_fanload_toml("", Path::new(".fanload.toml")).unwrap();
    let mut opts = Opts::default();
    apply_file_to_opts(&file, &mut opts, Path::new("."));
    assert_eq!(opts.workers, 4);
    assert_eq!(opts.error_policy, ErrorPolicy::FailFast);
    assert!(opts.jobs.is_empty());
}

#[test]
fn test_toml_invalid_is_none() {
    assert!(parse_fanload_toml("[settings]\nworkers = \"many\"", Path::new("x.toml")).is_none());
}

#[test]
fn test_cli_overrides_file() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".fanload.toml"), SAMPLE_TOML).unwrap();
    let cli = Cli::parse_from([
        "fanload",
        "out.csv",
        "-w",
        "2",
        "--on-error",
        "fail-fast",
        "-j",
        "pear=pears@pear-bucket",
    ]);
    let opts = setup_opts(&cli, dir.path());
    assert_eq!(opts.workers, 2);
    assert_eq!(opts.error_policy, ErrorPolicy::FailFast);
    // From the file, untouched by flags.
    assert!(opts.strict);
    assert_eq!(opts.jobs.len(), 1);
    assert_eq!(opts.jobs[0].label, "pear");
}

#[test]
fn test_cli_rejects_zero_workers() {
    assert!(Cli::try_parse_from(["fanload", "out.csv", "-w", "0"]).is_err());
}

// --- sinks ---

#[test]
fn test_local_store_rejects_escaping_keys() {
    let store = LocalStore::new("/store");
    assert!(store.object_path("apples", "../../etc/passwd").is_err());
    assert!(store.object_path("..", "apple/x.jpg").is_err());
    assert_eq!(
        store.object_path("apples", "apple/x.jpg").unwrap(),
        PathBuf::from("/store/apples/apple/x.jpg")
    );
}

#[test]
fn test_local_store_put_writes_object() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let mut session = store.connect().unwrap();
    let n = session
        .put("apples", "apple/a.jpg", &mut "hello".as_bytes())
        .unwrap();
    assert_eq!(n, 5);
    assert_eq!(
        std::fs::read_to_string(dir.path().join("apples/apple/a.jpg")).unwrap(),
        "hello"
    );
}

/// Yields a few bytes, then fails.
struct BrokenReader {
    sent: bool,
}

impl std::io::Read for BrokenReader {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if self.sent {
            return Err(std::io::Error::other("disk went away"));
        }
        self.sent = true;
        buf[..3].copy_from_slice(b"abc");
        Ok(3)
    }
}

#[test]
fn test_local_store_failed_read_leaves_nothing_behind() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    let mut session = store.connect().unwrap();
    let err = session
        .put("apples", "apple/a.jpg", &mut BrokenReader { sent: false })
        .unwrap_err();
    assert!(format!("{err:#}").contains("disk went away"), "{err:#}");
    assert!(!dir.path().join("apples/apple/a.jpg").exists());
    assert!(!dir.path().join("apples/apple/a.jpg.part").exists());
}

#[test]
fn test_local_store_failed_rename_removes_part_file() {
    let dir = tempfile::tempdir().unwrap();
    // A non-empty directory where the object should land makes the rename fail.
    let blocker = dir.path().join("apples/apple/a.jpg");
    std::fs::create_dir_all(&blocker).unwrap();
    std::fs::write(blocker.join("inner"), "x").unwrap();

    let store = LocalStore::new(dir.path());
    let mut session = store.connect().unwrap();
    assert!(
        session
            .put("apples", "apple/a.jpg", &mut "hello".as_bytes())
            .is_err()
    );
    assert!(!dir.path().join("apples/apple/a.jpg.part").exists());
    assert!(blocker.join("inner").exists());
}

#[test]
fn test_local_store_url_is_absolute_for_relative_root() {
    let store = LocalStore::new("objects");
    let url = store.object_url("apples", "apple/a.jpg");
    let expected = std::env::current_dir().unwrap().join("objects");
    assert_eq!(url, format!("file://{}/apples/apple/a.jpg", expected.display()));
    assert!(url.starts_with("file:///"), "{url}");
}

#[test]
fn test_null_store_reads_everything() {
    let mut session = NullStore.connect().unwrap();
    let n = session.put("b", "k", &mut &[0u8; 1000][..]).unwrap();
    assert_eq!(n, 1000);
    assert_eq!(NullStore.object_url("b", "apple/x.jpg"), "null://b/apple/x.jpg");
}

#[test]
fn test_csv_manifest_rows() {
    let mut manifest = CsvManifest::new(Vec::new());
    manifest
        .append_row(&["gs://apples/apple/a.jpg", "apple"])
        .unwrap();
    manifest
        .append_row(&["gs://apples/apple/b,c.jpg", "apple"])
        .unwrap();
    manifest.flush().unwrap();
    let out = String::from_utf8(manifest.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "gs://apples/apple/a.jpg,apple");
    assert_eq!(lines[1], "\"gs://apples/apple/b,c.jpg\",apple");
}
