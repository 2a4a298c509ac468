//! Add a text watermark to a single image.
//!
//! Usage:
//! ```sh
//! cargo run --example add_watermark -- input.jpg "(c) me" output.png
//! ```

use std::env;
use std::path::{Path, PathBuf};
use std::process;

use text_watermark::{Anchor, Compositor, CompositorConfig, Session, WatermarkSpec};

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 4 {
        eprintln!("Usage: {} <input> <text> <output>", args[0]);
        process::exit(1);
    }

    let mut session = Session::new(Compositor::new(CompositorConfig::from_env()));
    session.set_spec(WatermarkSpec::new(args[2].as_str()).with_anchor(Anchor::BottomRight));

    match run(&mut session, &args[1], &args[3]) {
        Ok(path) => println!("Done: {}", path.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

fn run(session: &mut Session, input: &str, output: &str) -> text_watermark::Result<PathBuf> {
    session.load(Path::new(input))?;
    session.apply()?;
    session.export(Path::new(output))
}
