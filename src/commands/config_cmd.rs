use tutorbot::config::Config;

pub fn show_config(config: &Config) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(&config.redacted())?;
    println!("{}", yaml);
    Ok(())
}
