use colored::{ColoredString, Colorize};
use log::{Level, LevelFilter, SetLoggerError};

/// Workspace crates log from info up, everything else only warnings and errors
const LOCAL_CRATES: [&str; 4] = ["signage", "signage_core", "signage_collab", "signage_server"];

pub fn init_logger() -> Result<(), SetLoggerError> {
    let dispatch = LOCAL_CRATES.iter().fold(
        fern::Dispatch::new().level(LevelFilter::Warn),
        |dispatch, name| dispatch.level_for(*name, LevelFilter::Info),
    );

    dispatch
        .format(|out, message, record| {
            let now = chrono::Local::now();

            out.finish(format_args!(
                "{:^5} {} {:^8} {}",
                badge(record.level()),
                now.format("%H:%M:%S").to_string().bright_black(),
                target_label(record.target()),
                message
            ))
        })
        .chain(std::io::stdout())
        .apply()
}

/// The crate a record comes from, colored for workspace crates
fn target_label(target: &str) -> ColoredString {
    let module = target.split("::").next().unwrap_or_default();

    match module {
        "signage" => "SIGNAGE".bright_cyan(),
        "signage_core" => "CORE".blue(),
        "signage_collab" => "COLLAB".bright_purple(),
        "signage_server" => "SERVER".bright_green(),
        other => other.clear(),
    }
}

fn badge(level: Level) -> ColoredString {
    match level {
        Level::Error => " ERR ".black().on_red().bold(),
        Level::Warn => " WRN ".black().on_yellow().bold(),
        Level::Info => " INF ".black().on_blue().bold(),
        Level::Debug => " DBG ".white().on_black(),
        Level::Trace => " TRC ".normal(),
    }
}
