//! Integration tests for pagecache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use pagecache::cache::{CacheStore, CACHE_FILE_SUFFIX};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use std::time::{Duration, SystemTime};
    use tempfile::TempDir;

    /// URL on a closed local port: any network access fails fast
    const OFFLINE_URL: &str = "http://127.0.0.1:9/cached-page";

    /// Command isolated from the user's config file
    fn pagecache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("pagecache");
        cmd.arg("--config")
            .arg(temp.path().join("config.toml"))
            .env_remove("PAGECACHE_DIR");
        cmd
    }

    fn cache_dir(temp: &TempDir) -> std::path::PathBuf {
        temp.path().join("cache")
    }

    fn seed(dir: &Path, url: &str, payload: &[u8]) -> std::path::PathBuf {
        let store = CacheStore::new(dir, Duration::ZERO);
        let path = store.path_for(url);
        store.write(&path, payload).unwrap();
        path
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Download pages"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("pagecache"));
    }

    #[test]
    fn path_is_stable_for_equivalent_urls() {
        let temp = TempDir::new().unwrap();
        let dir = cache_dir(&temp);

        let first = pagecache(&temp)
            .args(["path", "HTTPS://Example.com:443/a"])
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success()
            .stdout(predicate::str::ends_with(format!("{}\n", CACHE_FILE_SUFFIX)))
            .get_output()
            .stdout
            .clone();

        let second = pagecache(&temp)
            .args(["path", "https://example.com/a"])
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success()
            .get_output()
            .stdout
            .clone();

        assert_eq!(first, second);
        assert!(String::from_utf8(first).unwrap().starts_with(dir.to_str().unwrap()));
    }

    #[test]
    fn invalid_url_fails_with_hint() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .args(["get", "not-a-url"])
            .arg("--cache-dir")
            .arg(cache_dir(&temp))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid URL"))
            .stderr(predicate::str::contains("Hint:"));
    }

    #[test]
    fn get_serves_cached_page_without_network() {
        let temp = TempDir::new().unwrap();
        let dir = cache_dir(&temp);
        seed(&dir, OFFLINE_URL, b"<p>from disk</p>");

        pagecache(&temp)
            .args(["get", OFFLINE_URL])
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success()
            .stdout("<p>from disk</p>")
            .stderr(predicate::str::contains("from cache"));
    }

    #[test]
    fn get_writes_output_file() {
        let temp = TempDir::new().unwrap();
        let dir = cache_dir(&temp);
        seed(&dir, OFFLINE_URL, b"saved");
        let out = temp.path().join("page.html");

        pagecache(&temp)
            .args(["get", OFFLINE_URL, "-o"])
            .arg(&out)
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success();

        assert_eq!(fs::read(&out).unwrap(), b"saved");
    }

    #[test]
    fn get_unreachable_origin_fails() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .args(["get", "http://127.0.0.1:9/never-cached"])
            .arg("--cache-dir")
            .arg(cache_dir(&temp))
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to fetch"));
    }

    #[test]
    fn clear_removes_only_cache_files() {
        let temp = TempDir::new().unwrap();
        let dir = cache_dir(&temp);
        let cached = seed(&dir, OFFLINE_URL, b"x");
        let foreign = dir.join("keep.txt");
        fs::write(&foreign, b"not a cache file").unwrap();

        pagecache(&temp)
            .arg("clear")
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success()
            .stderr(predicate::str::contains("Cache cleared"));

        assert!(!cached.exists());
        assert!(foreign.exists());
    }

    #[test]
    fn clean_removes_expired_pages() {
        let temp = TempDir::new().unwrap();
        let dir = cache_dir(&temp);
        let stale = seed(&dir, "https://example.com/stale", b"old");
        let fresh = seed(&dir, "https://example.com/fresh", b"new");
        fs::File::options()
            .write(true)
            .open(&stale)
            .unwrap()
            .set_modified(SystemTime::now() - Duration::from_secs(7200))
            .unwrap();

        pagecache(&temp)
            .args(["clean", "--max-age", "3600"])
            .arg("--cache-dir")
            .arg(&dir)
            .assert()
            .success()
            .stderr(predicate::str::contains("Removed 1 expired"));

        assert!(!stale.exists());
        assert!(fresh.exists());
    }

    #[test]
    fn clean_without_expiry_warns() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .args(["clean", "--max-age", "0"])
            .arg("--cache-dir")
            .arg(cache_dir(&temp))
            .assert()
            .success()
            .stderr(predicate::str::contains("never expire"));
    }

    #[test]
    fn config_path_uses_flag() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cache]"));
    }

    #[test]
    fn config_init_then_invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        pagecache(&temp).args(["config", "init"]).assert().success();
        assert!(temp.path().join("config.toml").exists());

        fs::write(temp.path().join("config.toml"), "[cache\n").unwrap();
        pagecache(&temp)
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }
}
