use std::path::Path;

pub fn run(
    catalog: &Path,
    class: Option<&str>,
    method: Option<&str>,
    config: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = crate::load_config(config)?;
    let graph = crate::load_graph(catalog, &config)?.graph;

    if let Some(name) = class {
        let infos: Vec<_> = graph
            .classes_named(name)
            .into_iter()
            .filter_map(|idx| graph.class_info(idx))
            .collect();
        if infos.is_empty() {
            return Err(format!("no class named '{}'", name).into());
        }
        println!("{}", serde_json::to_string_pretty(&infos)?);
    } else if let Some(name) = method {
        let infos: Vec<_> = graph
            .methods_named(name)
            .iter()
            .filter_map(|&idx| graph.method_info(idx))
            .collect();
        if infos.is_empty() {
            let similar: Vec<String> = graph
                .similar_methods(name, 10)
                .into_iter()
                .map(|idx| graph.name_of(idx).to_string())
                .collect();
            return Err(format!(
                "no class declares '{}'; similar: [{}]",
                name,
                similar.join(", ")
            )
            .into());
        }
        println!("{}", serde_json::to_string_pretty(&infos)?);
    }
    Ok(())
}
