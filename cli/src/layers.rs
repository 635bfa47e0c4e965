use anyhow::{Context, format_err};
use clap::ArgMatches;
use incept_googlenet::*;

/// Parse `HxW`, or a single number for a square image.
pub fn parse_size(s: &str) -> InceptResult<(usize, usize)> {
    let parse = |d: &str| d.trim().parse::<usize>().with_context(|| format!("Invalid size {:?}", s));
    let (h, w) = match s.split_once(['x', 'X']) {
        Some((h, w)) => (parse(h)?, parse(w)?),
        None => {
            let side = parse(s)?;
            (side, side)
        }
    };
    if h == 0 || w == 0 {
        return Err(format_err!("Invalid size {:?}: sides must be positive", s));
    }
    Ok((h, w))
}

pub fn handle(matches: &ArgMatches) -> InceptResult<()> {
    let size = parse_size(matches.value_of("size").unwrap_or("224x224"))?;
    let net = GoogLeNet::new(&EngineConfig::default())?;
    for (name, shape) in net.layer_shapes(size, &LAYERS)? {
        let shape: Vec<String> = shape.iter().map(|d| d.to_string()).collect();
        println!("{:<16} {}", name, shape.join("x"));
    }
    Ok(())
}
