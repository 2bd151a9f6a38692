use blankhunter_core::{load_options, scan_and_write, ScanOptions};
use serde_json::Value;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::tempdir;

fn populate(root: &Path) {
    fs::write(root.join("a.txt"), "clean text").unwrap();
    fs::write(root.join("b.txt"), "tab\there\u{00A0}nbsp").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("c.md"), "zero\u{200B}width").unwrap();
    fs::write(root.join("d.bin"), b"\x00\x01\xC2\xA0").unwrap();
}

fn run(root: &Path, opts: &ScanOptions) -> (Value, blankhunter_core::ScanStats) {
    let mut out: Vec<u8> = Vec::new();
    let stats = scan_and_write(root, &mut out, opts).unwrap();
    (serde_json::from_slice(&out).unwrap(), stats)
}

#[test]
fn serial_scan_reports_files_in_path_order() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let opts = ScanOptions { threads: Some(1), ..ScanOptions::default() };
    let (report, stats) = run(dir.path(), &opts);

    let items = report.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["path"], "b.txt");
    assert_eq!(items[0]["impostors"][0]["code_point"], "U+0009");
    assert_eq!(items[0]["impostors"][1]["name"], "NON-BREAKING SPACE");
    assert_eq!(items[1]["impostors"][0]["name"], "ZERO WIDTH SPACE");
    assert!(items[1].get("fixed").is_none());

    assert_eq!(stats.files_scanned, 3);
    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_with_impostors, 2);
    assert_eq!(stats.files_fixed, 0);
}

#[test]
fn parallel_scan_matches_serial_output() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    for i in 0..20 {
        fs::write(dir.path().join(format!("n{:02}.txt", i)), format!("{}\u{2007}{}", i, i)).unwrap();
    }
    let serial = run(dir.path(), &ScanOptions { threads: Some(1), ..ScanOptions::default() });
    let parallel = run(dir.path(), &ScanOptions { threads: Some(4), ..ScanOptions::default() });
    assert_eq!(serial.0, parallel.0);
    assert_eq!(serial.1, parallel.1);
    assert_eq!(parallel.1.files_with_impostors, 22);
}

#[test]
fn fix_rewrites_affected_files() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let opts = ScanOptions { threads: Some(2), fix: true, ..ScanOptions::default() };
    let (report, stats) = run(dir.path(), &opts);

    assert_eq!(stats.files_fixed, 2);
    assert_eq!(report[0]["fixed"], true);
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "tab here nbsp");
    assert_eq!(fs::read_to_string(dir.path().join("sub").join("c.md")).unwrap(), "zero width");
    // 二进制文件保持原样
    assert_eq!(fs::read(dir.path().join("d.bin")).unwrap(), b"\x00\x01\xC2\xA0");
}

#[test]
fn depth_and_size_limits_skip_files() {
    let dir = tempdir().unwrap();
    populate(dir.path());
    let opts = ScanOptions { threads: Some(1), max_depth: Some(1), max_file_size: Some(12), ..ScanOptions::default() };
    let (report, stats) = run(dir.path(), &opts);
    // sub/c.md 超出深度；b.txt 超出大小
    assert_eq!(report.as_array().unwrap().len(), 0);
    assert_eq!(stats.files_skipped, 2);
    assert_eq!(stats.files_scanned, 1);
}

#[test]
fn missing_directory_is_an_error() {
    let mut out: Vec<u8> = Vec::new();
    assert!(scan_and_write(Path::new("/no/such/dir"), &mut out, &ScanOptions::default()).is_err());
}

#[test]
fn options_load_from_toml_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("blankhunter.toml");
    fs::write(&path, "[scan]\nthreads = 3\nfix = true\n").unwrap();
    let opts = load_options(&path).unwrap();
    assert_eq!(opts.threads, Some(3));
    assert!(opts.fix);
    assert!(opts.skip_binary);
}

/// 写完 "[" 之后就报错的输出端（模拟磁盘写满）
struct FullDisk {
    written: usize,
}

impl Write for FullDisk {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        if self.written >= 1 {
            return Err(io::Error::new(io::ErrorKind::Other, "no space left on device"));
        }
        self.written += 1;
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn report_failure_stops_rewriting_files() {
    for threads in [1, 4] {
        let dir = tempdir().unwrap();
        let original = "x\u{00A0}y";
        for i in 0..12 {
            fs::write(dir.path().join(format!("n{:02}.txt", i)), original).unwrap();
        }
        let opts = ScanOptions { threads: Some(threads), fix: true, ..ScanOptions::default() };
        let mut sink = FullDisk { written: 0 };
        assert!(scan_and_write(dir.path(), &mut sink, &opts).is_err());

        // 只有写报告项失败的那一个文件可能已被改写，其后的文件都保持原样
        for i in 1..12 {
            let content = fs::read_to_string(dir.path().join(format!("n{:02}.txt", i))).unwrap();
            assert_eq!(content, original, "threads={} file n{:02}", threads, i);
        }
    }
}

#[cfg(unix)]
#[test]
fn fix_keeps_executable_bit() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let script = dir.path().join("run.sh");
    fs::write(&script, "echo\u{00A0}hi\n").unwrap();
    fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();

    let opts = ScanOptions { threads: Some(1), fix: true, ..ScanOptions::default() };
    let (_, stats) = run(dir.path(), &opts);

    assert_eq!(stats.files_fixed, 1);
    assert_eq!(fs::read_to_string(&script).unwrap(), "echo hi\n");
    assert_eq!(fs::metadata(&script).unwrap().permissions().mode() & 0o777, 0o755);
}
