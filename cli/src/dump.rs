use clap::ArgMatches;
use incept_googlenet::*;

/// One line per node in evaluation order, followed by its indented info.
pub fn dump_lines(model: &RunnableModel) -> InceptResult<Vec<String>> {
    let mut lines = vec![];
    for &id in model.order() {
        let node = model.node(id);
        let inputs: Vec<String> =
            node.inputs.iter().map(|&i| model.node(i).name.clone()).collect();
        if inputs.is_empty() {
            lines.push(node.to_string());
        } else {
            lines.push(format!("{} <- {}", node, inputs.join(", ")));
        }
        for info in node.op.info()? {
            lines.push(format!("    * {info}"));
        }
    }
    Ok(lines)
}

pub fn handle(matches: &ArgMatches) -> InceptResult<()> {
    let mut config = EngineConfig::default();
    if let Some(weights) = matches.value_of("weights") {
        config = config.with_npz(weights);
    }
    let net = GoogLeNet::new(&config)?;
    for line in dump_lines(net.model())? {
        println!("{line}");
    }
    Ok(())
}
