//! End-to-end tests of the `confrev` binary.
//!
//! Every test runs in an isolated home and config directory. None of them
//! reaches a real host: commands that would are rejected locally, pointed
//! at an unroutable API base, or served by a local mock server.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

struct Sandbox {
    home: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            home: TempDir::new().unwrap(),
        }
    }

    fn config_file(&self) -> std::path::PathBuf {
        self.home.path().join("confrev.toml")
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("confrev").unwrap();
        cmd.current_dir(self.home.path())
            .env("HOME", self.home.path())
            .env("XDG_CONFIG_HOME", self.home.path().join("xdg"))
            .env("CONFREV_CONFIG", self.config_file())
            .env_remove("CONFREV_TOKEN")
            .env_remove("CONFREV_LOG");
        cmd
    }
}

mod help {
    use super::*;

    #[test]
    fn help_lists_commands() {
        Sandbox::new()
            .cmd()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("rollback"))
            .stdout(predicate::str::contains("diff"))
            .stdout(predicate::str::contains("branch"));
    }

    #[test]
    fn version_flag() {
        Sandbox::new()
            .cmd()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::starts_with("confrev "));
    }

    #[test]
    fn bash_completion() {
        Sandbox::new()
            .cmd()
            .args(["completion", "bash"])
            .assert()
            .success()
            .stdout(predicate::str::contains("_confrev"));
    }
}

mod config {
    use super::*;

    #[test]
    fn set_then_get_global_key() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "log.level", "debug"])
            .assert()
            .success();

        assert!(sandbox.config_file().exists());
        sandbox
            .cmd()
            .args(["config", "get", "log.level"])
            .assert()
            .success()
            .stdout("debug\n");
    }

    #[test]
    fn list_shows_defaults() {
        Sandbox::new()
            .cmd()
            .args(["config", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("api_base = https://api.github.com"))
            .stdout(predicate::str::contains("branch = main"));
    }

    #[test]
    fn invalid_value_is_rejected() {
        let sandbox = Sandbox::new();
        sandbox
            .cmd()
            .args(["config", "set", "interactive", "maybe"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("interactive must be true or false"));
        assert!(!sandbox.config_file().exists());
    }

    #[test]
    fn unknown_key_is_rejected() {
        Sandbox::new()
            .cmd()
            .args(["config", "get", "trunk"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
    }

    #[test]
    fn repo_key_needs_a_checkout() {
        Sandbox::new()
            .cmd()
            .args(["config", "set", "branch", "staging"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("run inside a git checkout"));
    }

    #[test]
    fn repo_key_is_written_inside_checkout() {
        let sandbox = Sandbox::new();
        let checkout = sandbox.home.path().join("work");
        git2::Repository::init(&checkout).unwrap();

        sandbox
            .cmd()
            .arg("--cwd")
            .arg(&checkout)
            .args(["config", "set", "branch", "staging"])
            .assert()
            .success();

        assert!(checkout.join(".git/confrev/config.toml").exists());
        sandbox
            .cmd()
            .arg("--cwd")
            .arg(&checkout)
            .args(["config", "get", "branch"])
            .assert()
            .success()
            .stdout("staging\n");
    }
}

mod remote {
    use super::*;

    /// Sandbox whose API base cannot be reached.
    fn offline() -> Sandbox {
        let sandbox = Sandbox::new();
        std::fs::write(
            sandbox.config_file(),
            "api_base = \"http://127.0.0.1:9\"\ninteractive = false\n",
        )
        .unwrap();
        sandbox
    }

    #[test]
    fn deleting_main_is_refused_locally() {
        offline()
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .args(["branch", "delete", "main", "--repo", "acme/config", "-y"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("protected"));
    }

    #[test]
    fn destructive_commands_need_confirmation() {
        offline()
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .args(["branch", "delete", "staging", "--repo", "acme/config"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--yes"));
    }

    #[test]
    fn mutations_require_a_message() {
        offline()
            .cmd()
            .args(["rm", "app.toml", "--repo", "acme/config"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("--message"));
    }

    #[test]
    fn blank_message_fails_before_any_request() {
        let sandbox = offline();
        sandbox
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .args(["rm", "app.toml", "--repo", "acme/config", "-m", "   ", "-y"])
            .assert()
            .code(2)
            .stderr(predicate::str::contains("commit message cannot be empty"));
        sandbox
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .args(["edit", "app.toml", "--repo", "acme/config", "-m", "   "])
            .write_stdin("port = 1\n")
            .assert()
            .code(2)
            .stderr(predicate::str::contains("commit message cannot be empty"));
    }

    #[test]
    fn missing_token_is_reported() {
        offline()
            .cmd()
            .args(["files", "--repo", "acme/config"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Not authenticated"));
    }

    #[test]
    fn repository_must_be_known() {
        offline()
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .arg("files")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Cannot determine the repository"));
    }
}

mod edit {
    use super::*;
    use base64::prelude::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test(flavor = "multi_thread")]
    async fn unchanged_content_commits_nothing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/config/contents/app.toml"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "app.toml",
                "path": "app.toml",
                "sha": "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
                "type": "file",
                "encoding": "base64",
                "content": BASE64_STANDARD.encode("port = 1\n"),
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let sandbox = Sandbox::new();
        std::fs::write(
            sandbox.config_file(),
            format!("api_base = \"{}\"\ninteractive = false\n", server.uri()),
        )
        .unwrap();

        sandbox
            .cmd()
            .env("CONFREV_TOKEN", "x")
            .args(["edit", "app.toml", "--repo", "acme/config", "-m", "Touch"])
            .write_stdin("port = 1\n")
            .assert()
            .success()
            .stdout("No changes.\n");
    }
}
