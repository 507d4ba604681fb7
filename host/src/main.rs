mod commands;

use anyhow::{Context, Result};

use lino::{BridgeConfig, Error};

fn main() -> Result<()> {
    let config = BridgeConfig::load();
    lino::setup_with(&config).context("failed to set up the line-editing engine")?;
    lino::catch_break(true);

    lino::set_completion_callback(|buffer: &str, completions: &mut lino::Completions<'_>| {
        for candidate in commands::complete(buffer) {
            if let Err(e) = completions.add(candidate) {
                eprintln!("[linosh] completion dropped: {e}");
            }
        }
    });
    lino::set_hints_callback(commands::hint);

    println!("linosh (type \"help\" for commands, Ctrl-D to exit)");

    loop {
        match lino::read_line("linosh> ") {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = lino::history_add(line);
                if !commands::dispatch(line, &config)? {
                    break;
                }
            }
            Ok(None) => break,
            Err(Error::Interrupted) => {
                println!("^C");
            }
            Err(e) => return Err(e).context("read-line failed"),
        }
    }

    if let Some(path) = config.history_file.as_ref() {
        let status = lino::history_save(&path.to_string_lossy())
            .context("failed to save history")?;
        if status != 0 {
            eprintln!(
                "[linosh] failed to save history to {} (status {status})",
                path.display()
            );
        }
    }

    Ok(())
}
