use box_packer::engine::PackingConfig;
use box_packer::request::{ContainerInput, ItemInput, PackOutput, PackRequest};
use box_packer::types::{LabelOrientation, PackingMode};
use clap::Parser;
use tracing::Level;

#[derive(Parser)]
#[command(name = "box_packer", about = "3D box packing planner")]
struct Cli {
    /// Full packing request as a JSON file
    #[arg(long, conflicts_with_all = ["containers", "items"])]
    input: Option<std::path::PathBuf>,

    /// Containers as LxWxH:qty (e.g. 60x40x50:2)
    #[arg(long = "container", num_args = 1..)]
    containers: Vec<String>,

    /// Items as LxWxH:qty (e.g. 10x10x30:4 20x15x10:8)
    #[arg(long = "items", num_args = 1..)]
    items: Vec<String>,

    /// Label orientation for every --container
    #[arg(long, default_value = "auto")]
    orientation: LabelOrientation,

    /// Packing method for every --container: space, weight, or quantity
    #[arg(long, default_value = "space")]
    method: PackingMode,

    /// Maximum container weight in kg (weight method only)
    #[arg(long)]
    max_weight: Option<f64>,

    /// Unit count above which the fast first-fit strategy is used
    #[arg(long, default_value_t = PackingConfig::DEFAULT_SIMPLE_THRESHOLD)]
    simple_threshold: u64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Log engine decisions to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn parse_dimensions(s: &str) -> Result<[f64; 3], String> {
    let parts: Vec<&str> = s.split('x').collect();
    if parts.len() != 3 {
        return Err(format!("invalid dimensions '{}', expected LxWxH", s));
    }
    let mut dim = [0.0; 3];
    for (slot, part) in dim.iter_mut().zip(&parts) {
        *slot = part
            .parse::<f64>()
            .map_err(|_| format!("invalid dimension '{}' in '{}'", part, s))?;
    }
    Ok(dim)
}

fn parse_entry(s: &str) -> Result<(String, [f64; 3], u32), String> {
    let parts: Vec<&str> = s.split(':').collect();
    if parts.len() != 2 {
        return Err(format!("invalid entry '{}', expected LxWxH:qty", s));
    }
    let dim = parse_dimensions(parts[0])?;
    let qty = parts[1]
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity in '{}'", s))?;
    Ok((parts[0].to_string(), dim, qty))
}

fn request_from_args(cli: &Cli) -> Result<PackRequest, String> {
    let items = cli
        .items
        .iter()
        .map(|s| {
            let (id, dim, qty) = parse_entry(s)?;
            Ok(ItemInput {
                id,
                qty,
                dim,
                thickness: None,
                oe_number: None,
                product_net_weight: None,
                product_gross_weight: None,
                box_net_weight: None,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    let containers = cli
        .containers
        .iter()
        .map(|s| {
            let (id, dim, qty) = parse_entry(s)?;
            Ok(ContainerInput {
                id,
                qty,
                dim,
                thickness: None,
                label_orientation: cli.orientation,
                packing_method: cli.method,
                max_weight: cli.max_weight,
                container_net_weight: None,
                container_gross_weight: None,
                order_box_number: None,
            })
        })
        .collect::<Result<Vec<_>, String>>()?;

    Ok(PackRequest { items, containers })
}

fn load_request(cli: &Cli) -> Result<PackRequest, String> {
    match &cli.input {
        Some(path) => {
            let data = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
            PackRequest::from_json(&data).map_err(|e| e.to_string())
        }
        None => request_from_args(cli),
    }
}

fn print_summary(output: &PackOutput) {
    for (i, container) in output.containers.iter().enumerate() {
        println!("Container {} ({} {}):", i + 1, container.id, container.dim);
        for item in &container.items {
            println!("  {} {} @ ({}, {}, {}) [{}]", item.id, item.dim, item.pos.length, item.pos.width, item.pos.height, item.rot);
        }
        println!("  utilization {:.1}%", container.utilization * 100.0);
        println!();
    }

    if !output.unpacked_items.is_empty() {
        println!("Unpacked:");
        for item in &output.unpacked_items {
            println!("  {} {}", item.id, item.dim);
        }
        println!();
    }

    let count = output.containers.len();
    println!(
        "Summary: {} container{} used, {} packed, {} unpacked",
        count,
        if count == 1 { "" } else { "s" },
        output.packed_count(),
        output.unpacked_items.len(),
    );
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    let request = load_request(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let config = PackingConfig::default().with_simple_threshold(cli.simple_threshold);
    let output = request.pack(config).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    if cli.json {
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_summary(&output);
    }
}
