use dragon_cfg::{ConfigFile, PathTree};

fn main() -> Result<(), dragon_cfg::ConfigError> {
    let path = std::env::temp_dir().join("dragon-cfg-demo.json");
    let mut config = ConfigFile::open(&path)?;

    let runs: u64 = config.get_or_set("stats.runs", 0)?;
    config.set("stats.runs", runs + 1)?;
    let name: String = config.get_or_set("app.name", "demo".to_string())?;

    if let Some(stats) = config.subset("stats")? {
        println!("stats: {}", stats.flat());
    }
    println!("{name} has run {} time(s)", runs + 1);
    println!("{config}");

    config.save()
}
