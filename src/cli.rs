use crate::pipeline::{inspect_workbook, run_build, INSPECT_ROW_LIMIT};
use crate::settings::Settings;

const USAGE: &str = "usage: lootcase <build|inspect> [config.yaml]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Inspect,
}

pub fn parse_command(args: &[String]) -> Option<Command> {
    match args.get(1).map(String::as_str) {
        Some("build") => Some(Command::Build),
        Some("inspect") => Some(Command::Inspect),
        _ => None,
    }
}

pub fn run_with_args(args: &[String]) -> i32 {
    let Some(command) = parse_command(args) else {
        eprintln!("{USAGE}");
        return 2;
    };
    if args.len() > 3 {
        eprintln!("{USAGE}");
        return 2;
    }

    let settings = match Settings::load(args.get(2).map(String::as_str)) {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("config error: {err}");
            return 1;
        }
    };

    match command {
        Command::Build => handle_build(&settings),
        Command::Inspect => handle_inspect(&settings),
    }
}

fn handle_build(settings: &Settings) -> i32 {
    match run_build(settings) {
        Ok(outcome) => {
            let report = &outcome.report;
            println!(
                "config written to {} (cases={}, groups={}, rewards={}, unresolved={})",
                outcome.output_path.display(),
                report.cases,
                report.groups,
                report.rewards,
                report.unresolved.len()
            );
            for entry in &report.unresolved {
                eprintln!(
                    "- row {}: reward '{}' not found, written under an empty key",
                    entry.row, entry.reward_name
                );
            }
            0
        }
        Err(err) => {
            eprintln!("build failed: {err}");
            1
        }
    }
}

fn handle_inspect(settings: &Settings) -> i32 {
    match inspect_workbook(settings, INSPECT_ROW_LIMIT) {
        Ok(preview) => {
            println!(
                "Sheets ({}): {}",
                preview.sheet_names.len(),
                preview.sheet_names.join(", ")
            );
            for sheet in &preview.sheets {
                println!(
                    "\n{}: {} used rows x {} cols",
                    sheet.name, sheet.used_rows, sheet.width
                );
                for (number, cells) in &sheet.rows {
                    println!("  {}: {}", number, cells.join(" | "));
                }
            }
            0
        }
        Err(err) => {
            eprintln!("inspect failed: {err}");
            1
        }
    }
}
