pub(crate) fn print_startup_banner(dry_run: bool) {
    let version = env!("CARGO_PKG_VERSION");
    let use_err = shellstrap::color_enabled_stderr();
    eprintln!();
    eprintln!("──────────────────────────────────────────────────────────────");
    eprintln!(
        "{}",
        shellstrap::paint(
            use_err,
            "\x1b[1m",
            &format!("  shellstrap v{version}  -  zsh + oh-my-zsh bootstrap")
        )
    );
    eprintln!("──────────────────────────────────────────────────────────────");
    eprintln!(
        "  host: {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    if dry_run {
        eprintln!("  mode: dry-run (nothing is executed or written)");
    }
    eprintln!();
}
