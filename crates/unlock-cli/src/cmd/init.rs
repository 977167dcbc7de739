use anyhow::Context;
use std::path::Path;
use unlock_core::{config::Config, io, paths, timing::TimingConfig};

pub fn run(root: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let store_name = name
        .map(str::to_string)
        .or_else(|| {
            root.file_name()
                .map(|n| n.to_string_lossy().into_owned())
        })
        .unwrap_or_else(|| "unlockhub".to_string());

    println!("Initializing store in: {}", root.display());

    let dirs = [
        paths::STORE_DIR,
        paths::CATALOG_DIR,
        paths::DEVICES_DIR,
        paths::USERS_DIR,
        paths::PAYMENTS_DIR,
        paths::TICKETS_DIR,
    ];
    for dir in dirs {
        let p = root.join(dir);
        io::ensure_dir(&p).with_context(|| format!("failed to create {}", p.display()))?;
    }

    let config_path = paths::config_path(root);
    if !config_path.exists() {
        let cfg = Config::new(&store_name);
        cfg.save(root).context("failed to write config.yaml")?;
        println!("  created: {}", paths::CONFIG_FILE);
    } else {
        println!("  exists:  {}", paths::CONFIG_FILE);
    }

    let timing_path = paths::timing_path(root);
    if !timing_path.exists() {
        TimingConfig::default()
            .save(root)
            .context("failed to write timing.yaml")?;
        println!("  created: {}", paths::TIMING_FILE);
    } else {
        println!("  exists:  {}", paths::TIMING_FILE);
    }

    println!("\nStore '{store_name}' is ready.");
    Ok(())
}
