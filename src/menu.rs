use crate::config::Config;
use crate::error::{Result, ScraperError};
use crate::types::InputMode;
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};

fn prompt_err(e: dialoguer::Error) -> ScraperError {
    ScraperError::Prompt(e.to_string())
}

/// Asks for whichever of thread count, input mode and ignore flag the
/// config file and command line left unset.
pub fn complete(config: &mut Config) -> Result<()> {
    let theme = ColorfulTheme::default();

    if config.threads.is_none() {
        let threads: usize = Input::with_theme(&theme)
            .with_prompt("Enter amount of threads")
            .default(4)
            .validate_with(|n: &usize| if *n > 0 { Ok(()) } else { Err("must be at least 1") })
            .interact_text()
            .map_err(prompt_err)?;
        config.threads = Some(threads);
    }

    if config.mode.is_none() {
        let export = config.data_dir.join(&config.export_file);
        let links = config.data_dir.join(&config.links_file);
        let items = [
            format!("Telegram history json file ({})", export.display()),
            format!("My own list of links ({})", links.display()),
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("Select links origin file")
            .items(&items)
            .default(InputMode::Export.menu_index())
            .interact()
            .map_err(prompt_err)?;
        config.mode = Some(if choice == InputMode::List.menu_index() {
            InputMode::List
        } else {
            InputMode::Export
        });
    }

    if config.use_ignore_list.is_none() {
        let ignore = config.data_dir.join(&config.ignore_file);
        let use_ignore = Confirm::with_theme(&theme)
            .with_prompt(format!("Take into account links from {}?", ignore.display()))
            .default(false)
            .interact()
            .map_err(prompt_err)?;
        config.use_ignore_list = Some(use_ignore);
    }

    Ok(())
}
