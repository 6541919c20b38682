use std::process::ExitCode;
use std::time::Duration;

use shellstrap::bootstrap::{self, Options};
use shellstrap::check::{check, CheckReport};
use shellstrap::config::Settings;
use shellstrap::pipeline::{Report, StepOutcome};
use shellstrap::util::SystemRunner;

use crate::banner::print_startup_banner;
use crate::cli::Cli;

fn load_settings() -> Result<Settings, ExitCode> {
    Settings::from_env().map_err(|e| {
        shellstrap::log_error_stderr(shellstrap::color_enabled_stderr(), &e.to_string());
        ExitCode::from(shellstrap::exit_code_for_error(&e))
    })
}

pub(crate) fn run_bootstrap(cli: &Cli) -> ExitCode {
    let use_err = shellstrap::color_enabled_stderr();
    let settings = match load_settings() {
        Ok(s) => s,
        Err(code) => return code,
    };

    // Dry runs write nothing, so they do not need the lock.
    let lock = if shellstrap::should_acquire_lock() && !cli.dry_run {
        match shellstrap::acquire_lock() {
            Ok(l) => {
                if cli.verbose {
                    shellstrap::log_info_stderr(
                        use_err,
                        &format!("lock: {}", l.path().display()),
                    );
                }
                Some(l)
            }
            Err(e) => {
                shellstrap::log_error_stderr(use_err, &e.to_string());
                return ExitCode::from(shellstrap::exit_code_for_error(&e));
            }
        }
    } else {
        None
    };

    print_startup_banner(cli.dry_run);
    let options = Options::from_arg(&cli.change_shell);
    let runner = SystemRunner::new(Duration::from_secs(cli.command_timeout))
        .dry_run(cli.dry_run)
        .verbose(cli.verbose);

    let result = bootstrap::run(&settings, options, &runner);
    drop(lock);
    match result {
        Ok(report) => {
            print_summary(&report);
            if report.install_count() == 0 && !cli.dry_run {
                shellstrap::log_ok_stderr(use_err, "Everything was already in place.");
            } else {
                shellstrap::log_ok_stderr(use_err, "Done. Open a new terminal to use zsh.");
            }
            ExitCode::from(0)
        }
        Err(failure) => {
            shellstrap::log_error_stderr(use_err, &failure.to_string());
            shellstrap::log_warn_stderr(
                use_err,
                "completed steps are kept; re-run shellstrap after fixing the problem",
            );
            ExitCode::from(shellstrap::exit_code_for_error(&failure.source))
        }
    }
}

fn print_summary(report: &Report) {
    let use_err = shellstrap::color_enabled_stderr();
    eprintln!();
    shellstrap::log_info_stderr(use_err, "Summary");
    for (name, outcome) in &report.entries {
        let code = match outcome {
            StepOutcome::Installed | StepOutcome::Patched | StepOutcome::Changed => "\x1b[32m",
            StepOutcome::Warned(_) => "\x1b[33m",
            _ => "\x1b[90m",
        };
        eprintln!(
            "  {:<32} {}",
            name,
            shellstrap::paint(use_err, code, &outcome.to_string())
        );
    }
    eprintln!();
}

pub(crate) fn run_check(cli: &Cli) -> ExitCode {
    let settings = match load_settings() {
        Ok(s) => s,
        Err(code) => return code,
    };
    let runner = SystemRunner::default();
    let report = check(&settings, &runner);

    if cli.json {
        match serde_json::to_string_pretty(&report) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                shellstrap::log_error_stderr(shellstrap::color_enabled_stderr(), &e.to_string());
                return ExitCode::from(1);
            }
        }
    } else {
        print_check_table(&report);
    }

    if report.all_present() {
        ExitCode::from(0)
    } else {
        ExitCode::from(1)
    }
}

fn print_check_table(report: &CheckReport) {
    let use_out = shellstrap::color_enabled_stdout();
    let mark = |ok: bool| {
        if ok {
            shellstrap::paint(use_out, "\x1b[32m", "ok     ")
        } else {
            shellstrap::paint(use_out, "\x1b[31m", "missing")
        }
    };
    println!("platform:        {}", report.platform.as_str());
    println!(
        "package manager: {}",
        report
            .package_manager
            .map(|pm| pm.program())
            .unwrap_or("(none found)")
    );
    println!(
        "login shell:     {}",
        report.login_shell.as_deref().unwrap_or("(unknown)")
    );
    println!();
    for c in &report.components {
        println!("  {}  {:<32} {}", mark(c.present), c.name, c.target);
    }
    println!(
        "  {}  {:<32} {}",
        mark(report.zshrc_lists_plugins),
        "zshrc plugins",
        report.zshrc.display()
    );
}
