#![allow(dead_code)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Temporary HOME plus a private PATH directory of logging stub programs.
pub struct Sandbox {
    _td: tempfile::TempDir,
    pub home: PathBuf,
    pub bin: PathBuf,
    pub log: PathBuf,
    pub etc_shells: PathBuf,
}

impl Sandbox {
    pub fn new() -> Self {
        let td = tempfile::tempdir().expect("tmpdir");
        let home = td.path().join("home");
        let bin = td.path().join("bin");
        std::fs::create_dir_all(&home).unwrap();
        std::fs::create_dir_all(&bin).unwrap();
        std::os::unix::fs::symlink("/bin/sh", bin.join("sh")).unwrap();
        let log = td.path().join("stub.log");
        std::fs::write(&log, "").unwrap();
        let etc_shells = td.path().join("shells");
        std::fs::write(&etc_shells, "/bin/sh\n").unwrap();
        Sandbox {
            home,
            bin,
            log,
            etc_shells,
            _td: td,
        }
    }

    /// Write an executable stub that logs `<name> <args>` then runs `body`.
    pub fn stub(&self, name: &str, body: &str) {
        let p = self.bin.join(name);
        let script = format!("#!/bin/sh\necho \"${{0##*/}} $*\" >> \"$STUB_LOG\"\n{body}\n");
        std::fs::write(&p, script).unwrap();
        std::fs::set_permissions(&p, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    /// Stubs that behave like the real tools closely enough for the bootstrap.
    pub fn standard_stubs(&self) {
        self.stub("apt-get", "");
        self.stub("sudo", "exec \"$@\"");
        self.stub(
            "git",
            "if [ \"$1\" = clone ]; then /bin/mkdir -p \"$4\"; fi",
        );
        // `curl -fsSL -o <file> <url>` writes an installer that creates $ZSH and a default .zshrc
        self.stub(
            "curl",
            "if [ \"$2\" = -o ]; then printf '%s\\n' '/bin/mkdir -p \"$ZSH\"' '[ -f \"$HOME/.zshrc\" ] || printf \"plugins=(git)\\\\n\" > \"$HOME/.zshrc\"' > \"$3\"; fi",
        );
        self.stub(
            "tee",
            "while IFS= read -r l; do printf '%s\\n' \"$l\" >> \"$2\"; done",
        );
        self.stub("chsh", "");
    }

    pub fn stub_zsh(&self) {
        self.stub("zsh", "");
    }

    pub fn framework_dir(&self) -> PathBuf {
        self.home.join(".oh-my-zsh")
    }

    pub fn plugin_dir(&self, name: &str) -> PathBuf {
        self.framework_dir().join("custom").join("plugins").join(name)
    }

    pub fn zshrc(&self) -> PathBuf {
        self.home.join(".zshrc")
    }

    pub fn install_everything(&self) {
        self.stub_zsh();
        std::fs::create_dir_all(self.plugin_dir("zsh-autosuggestions")).unwrap();
        std::fs::create_dir_all(self.plugin_dir("zsh-syntax-highlighting")).unwrap();
    }

    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_shellstrap"));
        cmd.env_clear()
            .env("PATH", &self.bin)
            .env("HOME", &self.home)
            .env("XDG_RUNTIME_DIR", self.home.parent().unwrap_or(Path::new("/tmp")))
            .env("STUB_LOG", &self.log)
            .env("SHELLSTRAP_ETC_SHELLS", &self.etc_shells)
            .env("NO_COLOR", "1");
        cmd
    }

    pub fn run(&self, args: &[&str]) -> Output {
        self.command().args(args).output().expect("run shellstrap")
    }

    pub fn log_text(&self) -> String {
        std::fs::read_to_string(&self.log).unwrap_or_default()
    }

    pub fn clear_log(&self) {
        std::fs::write(&self.log, "").unwrap();
    }
}

pub fn stderr(out: &Output) -> String {
    String::from_utf8_lossy(&out.stderr).to_string()
}
