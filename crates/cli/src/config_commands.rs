use {
    anyhow::{Context, Result},
    hublink_config::HublinkConfig,
    std::path::Path,
};

/// Load from `path` when given, otherwise from the standard locations.
pub fn load(path: Option<&Path>) -> Result<HublinkConfig> {
    match path {
        Some(path) => hublink_config::load_config(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(hublink_config::discover_and_load()),
    }
}

pub fn handle_check(path: Option<&Path>) -> Result<()> {
    match path.map(Path::to_path_buf).or_else(hublink_config::find_config_file) {
        Some(found) => eprintln!("Checking {}\n", found.display()),
        None => eprintln!("No config file found; checking defaults.\n"),
    }

    let config = load(path)?;
    config.validate()?;
    println!("{config:#?}");
    println!("endpoint: {}", config.hub.endpoint()?);
    eprintln!("\nNo issues found.");
    Ok(())
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, std::io::Write};

    #[test]
    fn loads_explicit_path() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[boundary]\nname = \"tg-main\"\nplatform = \"telegram\"\n\n[hub]\nsecret = \"s3cret\""
        )
        .unwrap();

        let config = load(Some(file.path())).unwrap();
        assert_eq!(config.boundary.name, "tg-main");
        let printed = format!("{config:?}");
        assert!(printed.contains("[REDACTED]"));
        assert!(!printed.contains("s3cret"));
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(Some(&dir.path().join("nope.toml"))).is_err());
    }
}
