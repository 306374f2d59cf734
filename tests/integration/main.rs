//! Integration tests for mixpod

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    fn mixpod() -> Command {
        let mut cmd = cargo_bin_cmd!("mixpod");
        cmd.env_remove("MIXPOD_CONFIG").env("MIXPOD_PLAIN", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        mixpod()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("upstream"));
    }

    #[test]
    fn version_displays() {
        mixpod()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("mixpod"));
    }

    #[test]
    fn config_path_uses_explicit_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.toml");

        mixpod()
            .arg("--config")
            .arg(&path)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("custom.toml"));
    }

    #[test]
    fn config_path_prefers_local_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mixpod.toml"), "").unwrap();

        mixpod()
            .current_dir(temp.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("mixpod.toml"));
    }

    #[test]
    fn config_show_lists_sections() {
        let temp = TempDir::new().unwrap();

        mixpod()
            .current_dir(temp.path())
            .arg("--config")
            .arg(temp.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[upstream]"))
            .stdout(predicate::str::contains("[container]"));
    }

    #[test]
    fn config_init_refuses_overwrite() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");

        mixpod()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(path.is_file());

        mixpod()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .failure()
            .code(1)
            .stderr(predicate::str::contains("already exists"))
            .stderr(predicate::str::contains("--force"));
    }

    #[test]
    fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("mixpod.toml"), "[upstream\n").unwrap();

        mixpod()
            .current_dir(temp.path())
            .arg("mounts")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid configuration"));
    }

    #[test]
    fn mounts_reduce_configured_paths() {
        let work = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        fs::create_dir(work.path().join("local-rpms")).unwrap();
        fs::write(outside.path().join("Swupd_Root.pem"), "cert").unwrap();

        let config = format!(
            "[builder]\ncert = \"{}\"\n\n[mixer]\nlocal_rpm_dir = \"{}\"\n",
            outside.path().join("Swupd_Root.pem").display(),
            work.path().join("local-rpms").display(),
        );
        fs::write(work.path().join("mixpod.toml"), config).unwrap();

        let output = mixpod()
            .current_dir(work.path())
            .args(["mounts", "--format", "json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let mounts: Vec<String> = serde_json::from_slice(&output.stdout).unwrap();
        let mut expected = vec![
            work.path().display().to_string(),
            outside.path().display().to_string(),
        ];
        expected.sort();
        assert_eq!(mounts, expected);
    }

    #[test]
    fn run_requires_command() {
        mixpod().arg("run").assert().failure().code(2);
    }

    #[test]
    fn native_run_passes_exit_code_through() {
        let temp = TempDir::new().unwrap();

        mixpod()
            .current_dir(temp.path())
            .args(["run", "--native", "--", "sh", "-c", "echo native; exit 3"])
            .assert()
            .code(3)
            .stdout(predicate::str::contains("native"));
    }

    #[test]
    fn native_run_success() {
        let temp = TempDir::new().unwrap();

        mixpod()
            .current_dir(temp.path())
            .args(["run", "--native", "--", "true"])
            .assert()
            .success();
    }
}

mod runner_tests {
    use async_trait::async_trait;
    use mixpod::config::Config;
    use mixpod::image::archive::archive_remote_path;
    use mixpod::orchestration::{CliRuntime, ProcessOutput, ProcessRunner};
    use mixpod::runner::{ContainerRunner, RunStage};
    use mixpod::upstream::UpstreamSource;
    use mixpod::{MixpodError, MixpodResult};
    use std::collections::HashMap;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Docker stand-in with an initially empty image store
    #[derive(Default)]
    struct Docker {
        images: Mutex<Vec<String>>,
        calls: Mutex<Vec<Vec<String>>>,
    }

    impl Docker {
        fn calls_to(&self, subcommand: &str) -> Vec<Vec<String>> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|call| call.first().map(String::as_str) == Some(subcommand))
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl ProcessRunner for Docker {
        async fn output(&self, _program: &str, args: &[String]) -> MixpodResult<ProcessOutput> {
            self.calls.lock().unwrap().push(args.to_vec());

            let mut output = ProcessOutput {
                code: Some(0),
                ..Default::default()
            };
            match args.first().map(String::as_str) {
                Some("images") => {
                    if self.images.lock().unwrap().contains(&args[2]) {
                        output.stdout = "4c7b2d19e0aa\n".to_string();
                    }
                }
                Some("build") => self.images.lock().unwrap().push(args[2].clone()),
                _ => {}
            }
            Ok(output)
        }

        async fn status(&self, _program: &str, args: &[String]) -> MixpodResult<i32> {
            self.calls.lock().unwrap().push(args.to_vec());
            Ok(0)
        }
    }

    /// Upstream server with one format and its first release's archive
    struct Mirror {
        texts: HashMap<String, String>,
        archive: Vec<u8>,
        downloads: Mutex<usize>,
    }

    impl Mirror {
        fn new() -> Self {
            let texts = [
                ("/latest", "30120"),
                ("/update/30120/format", "30"),
                ("/update/version/format30/first", "29990"),
                ("/update/version/format30/latest", "30120"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

            Self {
                texts,
                archive: b"rootfs".to_vec(),
                downloads: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl UpstreamSource for Mirror {
        async fn fetch_text(&self, remote_path: &str) -> MixpodResult<String> {
            self.texts
                .get(remote_path)
                .cloned()
                .ok_or_else(|| MixpodError::UpstreamFetch {
                    url: remote_path.to_string(),
                    reason: "http status: 404".to_string(),
                })
        }

        async fn fetch_to_file(&self, remote_path: &str, dest: &Path) -> MixpodResult<()> {
            assert_eq!(remote_path, archive_remote_path("29990"));
            *self.downloads.lock().unwrap() += 1;
            std::fs::write(dest, &self.archive).map_err(|e| MixpodError::io("writing archive", e))
        }
    }

    #[tokio::test]
    async fn second_run_reuses_image() {
        let cwd = TempDir::new().unwrap();
        let config = Config::default();
        let docker = Arc::new(Docker::default());
        let runtime = CliRuntime::new("docker", docker.clone());
        let mirror = Mirror::new();
        let command = vec!["mixer".to_string(), "versions".to_string()];

        let mut first = ContainerRunner::new(&config, cwd.path(), &runtime, &mirror);
        first.run_in_container(&command).await.unwrap();
        assert_eq!(first.stage(), RunStage::Succeeded);

        let mut second = ContainerRunner::new(&config, cwd.path(), &runtime, &mirror);
        second.run_in_container(&command).await.unwrap();

        assert_eq!(docker.calls_to("build").len(), 1);
        assert_eq!(docker.calls_to("run").len(), 2);
        assert_eq!(*mirror.downloads.lock().unwrap(), 1);
        assert!(cwd.path().join("docker/mixer-30/mixer.tar.xz").is_file());

        let run = &docker.calls_to("run")[1];
        assert!(run.contains(&"mixer-tools/mixer:30".to_string()));
        assert_eq!(run.last().unwrap(), "versions");
    }
}
