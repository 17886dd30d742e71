use clap::Parser;
use log::debug;
use theme_selector::{find_theme, run_handoff, Action, Args, Config, MenuSource, Selector};

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_filter = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    let config_path = args.config.clone().unwrap_or_else(Config::default_path);
    debug!("Loading config from {:?}", config_path);
    let config = Config::load(&config_path)?;
    let themes = config.themes();
    let selector = Selector::from_config(&config)?;
    let theme_override = args.theme_str.as_deref();

    let selection = match &args.action {
        Action::Theme => selector
            .select(&MenuSource::Themes(&themes), theme_override)?
            .map(|item| item.name),
        Action::Wallpaper { theme, video } => {
            let theme = find_theme(&themes, theme.as_deref())?;
            selector
                .select(&MenuSource::wallpapers(theme, *video), theme_override)?
                .map(|item| item.source_path.to_string_lossy().into_owned())
        }
        Action::Pregenerate => {
            let report = selector.pregenerate(&themes)?;
            println!(
                "Thumbnail generation complete: {} cached, {} generated, {} placeholders",
                report.cached, report.generated, report.placeholders
            );
            return Ok(());
        }
    };

    let Some(selection) = selection else {
        debug!("Nothing was selected");
        return Ok(());
    };

    println!("{}", selection);

    if let Some(command) = &args.command {
        run_handoff(command, &selection)?;
    }

    Ok(())
}
