use clap::Parser;
use std::fs;
use std::time::Duration;
use swirl_lib::swirl_generate::swirl_sheet;
use swirl_lib::{Config, FileSink, MemorySink, Swirl, SwirlError, Vendor};

const SWIRL_INTRO: &str = r#"
       _____         _      __
      / ___/      __(_)____/ /
      \__ \ | /| / / / ___/ /
     ___/ / |/ |/ / / /  / /
    /____/|__/|__/_/_/  /_/

    Welcome to Swirl - debounced CSS rules, rendered by Rust!
"#;

#[derive(Parser)]
#[command(name = "Swirl")]
#[command(about = "Replay a CSS file through the Swirl rule engine")]
struct Args {
    /// Input stylesheet.
    input: String,

    /// Output stylesheet.
    output: String,

    /// Vendor prefix for prefixed-only properties (webkit, moz, ms, o).
    #[arg(long)]
    vendor: Option<String>,

    /// Debounce window in milliseconds.
    #[arg(long, default_value_t = 16)]
    window_ms: u64,

    /// Indent the written stylesheet.
    #[arg(long)]
    pretty: bool,
}

fn run(args: &Args) -> Result<(), SwirlError> {
    let vendor = args
        .vendor
        .as_deref()
        .map(str::parse::<Vendor>)
        .transpose()?;
    let config = Config::default()
        .with_window(Duration::from_millis(args.window_ms))
        .with_vendor(vendor);
    log::debug!("{:?}", config);
    let swirl = Swirl::new(config);

    let css_content = fs::read_to_string(&args.input)?;
    log::info!("Successfully read {} ({} bytes)", args.input, css_content.len());

    if args.pretty {
        let sink = MemorySink::new();
        swirl_sheet::generate(&swirl, &css_content, sink.clone())?;
        let compact = sink.contents().unwrap_or_default();
        fs::write(&args.output, swirl_sheet::prettify(&compact)?)?;
    } else {
        let sheet = swirl_sheet::generate(&swirl, &css_content, FileSink::new(&args.output))?;
        if sheet.write_count() == 0 {
            // Nothing rendered; still leave an (empty) output behind.
            fs::write(&args.output, "")?;
        }
    }
    log::info!("Wrote {}", args.output);
    Ok(())
}

fn main() {
    env_logger::init();
    println!("{}", SWIRL_INTRO);

    // parse the args given in terminal
    let args: Args = Args::parse();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
