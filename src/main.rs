use anyhow::Context;
use campus_companion::CliOptions;
use clap::Parser;

fn main() -> anyhow::Result<()> {
    let options = CliOptions::parse();
    let report = campus_companion::run(options).context("theme engine run failed")?;

    let snapshot = report.snapshot;
    let identity = report
        .identity
        .as_ref()
        .map_or_else(|| "signed out".to_string(), ToString::to_string);
    println!("user:        {identity}");
    println!("language:    {}", report.language);
    println!("preference:  {}", snapshot.preference);
    println!("active mode: {}", snapshot.active_mode);
    println!("background:  {}", snapshot.theme.background);
    println!("primary:     {}", snapshot.theme.primary);
    if !report.settled {
        println!("(storage did not answer in time; showing provisional theme)");
    }
    Ok(())
}
