//! `copysmith init`: write the example user config

use crate::config::UserConfig;
use anyhow::Result;
use console::style;

pub fn run() -> Result<()> {
    let path = UserConfig::init_user_config()?;
    println!(
        "{} {}",
        style("Config ready at").green(),
        path.display()
    );
    println!("Edit it to set your backend, model, and pipeline defaults.");
    Ok(())
}
