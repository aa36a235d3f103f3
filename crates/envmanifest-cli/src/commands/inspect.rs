use super::{json_pretty, load_manifest, EXIT_SUCCESS};
use std::path::Path;

pub fn run(manifest_path: &Path, json: bool) -> Result<u8, String> {
    let env = load_manifest(manifest_path)?;
    if json {
        println!("{}", json_pretty(&env)?);
        return Ok(EXIT_SUCCESS);
    }

    println!("name:          {}", env.name());
    println!(
        "channels:      {}",
        env.channels()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("dependencies:  {}", env.dependencies().len());

    let mut current: Option<&str> = None;
    for dep in env.dependencies() {
        let group = dep.group.as_deref();
        if let Some(heading) = group.filter(|g| Some(*g) != current) {
            println!();
            for line in heading.lines() {
                println!("  # {line}");
            }
        }
        current = group;
        match &dep.comment {
            Some(comment) => println!("  {dep}  ({comment})"),
            None => println!("  {dep}"),
        }
    }
    Ok(EXIT_SUCCESS)
}
